//! Domain-specific error types for the dotlink engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`], [`PlanError`])
//! while command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotlinkError
//! ├── Config(ConfigError) — source config reading and JSON parsing
//! ├── Plan(PlanError)     — source validation and tree scanning
//! └── Store(StoreError)   — plan file persistence
//! ```
//!
//! Skip conditions (missing source file at apply time, already-correct link)
//! are deliberately *not* errors; the applier records them as counters and
//! continues with the rest of the batch.

// The aggregate error is part of the library surface; command handlers
// convert the sub-errors to `anyhow::Error` directly, so the binary build
// never names it.
#![allow(dead_code)]

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the dotlink engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum DotlinkError {
    /// Source-configuration error (reading or parsing a `.dotlink.json`).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan-generation error (invalid source path, scan failure).
    #[error("Plan generation error: {0}")]
    Plan(#[from] PlanError),

    /// Plan-file persistence error (read, write, parse).
    #[error("Plan file error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that arise from loading per-directory source configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file or walking
    /// subdirectories in search of one.
    #[error("IO error reading config at {}: {source}", .path.display())]
    Io {
        /// Path to the file or directory that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file contains invalid JSON.
    #[error("invalid JSON in config file {}: {source}", .path.display())]
    Parse {
        /// Path to the offending config file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// An `exclude` entry is not a valid glob pattern.
    #[error("invalid exclude pattern '{pattern}' in {}: {source}", .path.display())]
    Glob {
        /// Directory whose config declared the pattern.
        path: PathBuf,
        /// The offending pattern.
        pattern: String,
        /// Underlying glob compilation error.
        source: globset::Error,
    },
}

/// Errors that arise during plan generation.
///
/// Validation failures abort generation before anything partial is written.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A given source path does not exist.
    #[error("source path does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    /// A given source path (or a `home`/`root` subtree) is not a directory.
    #[error("source path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The current user's home directory could not be determined.
    #[error("home directory could not be determined")]
    NoHomeDir,

    /// An I/O error occurred while resolving or walking a source tree.
    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        /// Path being resolved or walked.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Loading a source configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that arise from reading or writing the plan file itself.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The plan file could not be read.
    #[error("failed to read plan file {}: {source}", .path.display())]
    Read {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plan file could not be written.
    #[error("failed to write plan file {}: {source}", .path.display())]
    Write {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plan file contains invalid JSON or an unexpected shape.
    #[error("failed to parse plan file {}: {source}", .path.display())]
    Parse {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The plan could not be serialized.
    #[error("failed to serialize plan: {source}")]
    Encode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
