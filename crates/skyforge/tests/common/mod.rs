//! Helpers shared by the CLI integration tests

#![allow(dead_code, deprecated)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding a settings file that points the audit log inside it
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_settings("actor: ci\naudit_log: audit.jsonl\n")
    }

    pub fn with_settings(settings: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skyforge.yaml"), settings).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// `skyforge` running inside the workspace with logging quiet
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("skyforge").unwrap();
        cmd.current_dir(self.path())
            .env("SKYFORGE_CONFIG_PATH", self.path().join("skyforge.yaml"))
            .env("RUST_LOG", "warn")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Parsed audit log lines
    pub fn audit_events(&self) -> Vec<serde_json::Value> {
        let content = std::fs::read_to_string(self.path().join("audit.jsonl")).unwrap_or_default();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
