// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// 临时 git 仓库形式的 ports 树
pub struct TestTree {
    pub dir: TempDir,
}

impl TestTree {
    /// 创建空仓库，系统中没有 git 时返回 `None`
    pub fn init() -> Option<Self> {
        let available = Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !available {
            eprintln!("git not available, skipping");
            return None;
        }

        let tree = Self {
            dir: TempDir::new().unwrap(),
        };
        tree.git(&["init", "-q"]);
        tree.git(&["config", "user.email", "ports@example.org"]);
        tree.git(&["config", "user.name", "Ports Committer"]);
        tree.git(&["config", "commit.gpgsign", "false"]);
        Some(tree)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn write(&self, path: &str, contents: &str) {
        let full: PathBuf = self.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }

    pub fn remove(&self, path: &str) {
        fs::remove_dir_all(self.path().join(path)).unwrap();
    }

    /// 提交全部改动并返回提交哈希
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }
}
