//! Layered dotfiles symlink engine.
//!
//! Manages a user's configuration files by computing and applying symlinks
//! from one or more layered source trees to destinations under `$HOME` or
//! `/`. Later layers override earlier ones, enabling a "shared defaults +
//! host override" model.
//!
//! The public API is organised around the plan lifecycle:
//!
//! - **[`plan`]** — scan layers, merge with override precedence, remap, and
//!   persist the resulting [`Plan`](plan::Plan)
//! - **[`config`]** — per-directory `.dotlink.json` settings (mappings,
//!   excludes, link-folders, hooks)
//! - **[`apply`]** — the idempotent, privilege-aware symlink state machine
//! - **[`check`]** — read-only verification of a plan against the filesystem
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod check;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod platform;
