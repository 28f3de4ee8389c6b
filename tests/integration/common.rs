//! Common utilities for integration tests

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use std::io::Write;
use std::path::PathBuf;
use zip::write::{FileOptions, ZipWriter};

/// Isolated environment for one test
pub struct TestContext {
    pub temp: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.child("config").path()).unwrap();
        Self { temp }
    }

    /// Directory the `dirs` crate resolves as the config dir for the binary
    pub fn config_dir(&self) -> PathBuf {
        if cfg!(target_os = "linux") || cfg!(target_os = "windows") {
            self.temp.child("config").to_path_buf()
        } else {
            self.temp.path().join("Library").join("Application Support")
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("ziprepo").join("config.yaml")
    }

    pub fn write_config(&self, yaml: &str) {
        let path = self.config_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, yaml).unwrap();
    }

    /// A `ziprepo` command with the config dir redirected and no ambient token
    pub fn ziprepo(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("ziprepo").unwrap();
        cmd.current_dir(self.temp.path());
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("RUST_LOG");

        let config_dir = self.temp.child("config").to_path_buf();
        if cfg!(target_os = "windows") {
            cmd.env("APPDATA", &config_dir);
            cmd.env("USERPROFILE", self.temp.path());
        } else if cfg!(target_os = "linux") {
            cmd.env("XDG_CONFIG_HOME", &config_dir);
            cmd.env("HOME", self.temp.path());
        } else {
            cmd.env("HOME", self.temp.path());
        }

        cmd
    }

    /// Write a ZIP archive into the temp dir and return its path
    pub fn zip(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.temp.child(name).to_path_buf();
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (entry, content) in entries {
            if entry.ends_with('/') {
                zip.add_directory(*entry, FileOptions::default()).unwrap();
            } else {
                zip.start_file(*entry, FileOptions::default()).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
        path
    }
}
