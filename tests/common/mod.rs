#![allow(dead_code)]

use anyhow::{anyhow, Context, Result};
use pushguard::git::GitRepository;
use pushguard::Revision;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A throwaway repository driven through the git command line.
pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    pub fn init() -> Result<Self> {
        let repo = Self {
            dir: TempDir::new()?,
        };
        repo.git(&["init", "-q"])?;
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=Test User",
                "-c",
                "user.email=test@test.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(self.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    /// Write `file`, stage it and commit with exactly `message`.
    pub fn commit(&self, file: &str, content: &str, message: &str) -> Result<Revision> {
        let path = self.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        self.git(&["add", file])?;

        let message_file = self.path().join(".git").join("TEST_MSG");
        fs::write(&message_file, message)?;
        self.git(&[
            "commit",
            "-q",
            "--cleanup=verbatim",
            "-F",
            message_file.to_str().context("non-utf8 temp path")?,
        ])?;

        self.head()
    }

    pub fn head(&self) -> Result<Revision> {
        Ok(self.git(&["rev-parse", "HEAD"])?.parse()?)
    }

    pub fn open(&self) -> Result<GitRepository> {
        Ok(GitRepository::open(self.path())?)
    }
}
