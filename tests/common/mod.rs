// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed layered-source fixture so each
// integration test can set up isolated layers and a fake home directory
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotlink_cli::config::CONFIG_FILE_NAME;
use dotlink_cli::logging::Logger;
use dotlink_cli::plan::{Generator, Plan};

/// An isolated layered-source fixture backed by a [`tempfile::TempDir`].
///
/// Layers live under the temp root next to a `home-dest` directory that
/// stands in for the user's home, so generated targets stay inside the
/// fixture. The directory is deleted on drop.
pub struct TestEnv {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl TestEnv {
    /// Create a fixture with an empty home-destination directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        // Canonicalized so paths compare equal to the generator's resolved
        // sources.
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        std::fs::create_dir_all(root.join("home-dest")).expect("create home dir");
        Self { _dir: dir, root }
    }

    /// The fixture root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The stand-in home directory targets are computed against.
    pub fn home(&self) -> PathBuf {
        self.root.join("home-dest")
    }

    /// Ensure a layer directory exists and return its path.
    pub fn layer(&self, name: &str) -> PathBuf {
        let layer = self.root.join(name);
        std::fs::create_dir_all(&layer).expect("create layer dir");
        layer
    }

    /// Write a file under `<layer>/<rel>`, creating parents.
    pub fn file(&self, layer: &str, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(layer).join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parents");
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Write a `.dotlink.json` in the directory `<root>/<dir_rel>`.
    pub fn config(&self, dir_rel: &str, json: &str) {
        let dir = self.root.join(dir_rel);
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join(CONFIG_FILE_NAME), json).expect("write config");
    }

    /// Generate a plan over `layers` with targets based at the fixture home.
    pub fn generate(&self, layers: &[PathBuf]) -> Plan {
        let log = Logger::new(false);
        let generator = Generator::with_home(&log, self.home());
        generator.generate(layers).expect("generate plan")
    }
}
