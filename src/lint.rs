// Source linting
//
// Each linted commit gets its own freshly created temporary directory. The
// commit's tree is written there, the configured command runs against it, and
// the directory is removed before lint() returns, whatever happened in between.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use crate::config::LintConfig;
use crate::error::{BackendError, Violation};
use crate::git::Backend;
use crate::revision::Revision;

/// An exclusively owned scratch directory holding one commit's tree.
///
/// Dropping it removes the directory recursively; [`Workspace::release`] does the
/// same but reports a failed removal.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn acquire() -> Result<Self, BackendError> {
        let dir = tempfile::Builder::new()
            .prefix("pushguard-")
            .tempdir()
            .map_err(|e| BackendError::io(std::env::temp_dir(), e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn release(self) -> Result<(), BackendError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| BackendError::io(path, e))
    }
}

pub struct SourceLinter<'a> {
    config: &'a LintConfig,
}

impl<'a> SourceLinter<'a> {
    pub fn new(config: &'a LintConfig) -> Self {
        Self { config }
    }

    pub fn lint(&self, backend: &dyn Backend, rev: Revision) -> Result<(), Violation> {
        let commit = rev.short();
        let backend_violation = |source| Violation::Backend {
            commit: commit.clone(),
            source,
        };

        let workspace = Workspace::acquire().map_err(backend_violation)?;
        tracing::debug!(commit = %commit, dir = %workspace.path().display(), "workspace acquired");

        let outcome = self.lint_in(backend, rev, workspace.path());
        let released = workspace.release();

        // A lint failure is more useful to the pusher than a cleanup failure.
        outcome?;
        released.map_err(backend_violation)
    }

    fn lint_in(&self, backend: &dyn Backend, rev: Revision, dir: &Path) -> Result<(), Violation> {
        let commit = rev.short();

        backend
            .archive_tree(rev, dir)
            .map_err(|source| Violation::Backend {
                commit: commit.clone(),
                source,
            })?;

        if let Some(marker) = &self.config.marker {
            if !dir.join(marker).exists() {
                tracing::info!(commit = %commit, marker = %marker, "no lint marker in tree, skipping lint");
                return Ok(());
            }
        }

        let (success, output) =
            run_command(&self.config.command, dir).map_err(|source| Violation::Backend {
                commit: commit.clone(),
                source,
            })?;

        if !success {
            tracing::debug!(commit = %commit, output = %output, "lint failed");
            return Err(Violation::Lint { commit, output });
        }

        Ok(())
    }
}

/// Run `argv` followed by `.` inside `dir`, returning whether it exited 0 and its
/// combined stdout and stderr.
fn run_command(argv: &[String], dir: &Path) -> Result<(bool, String), BackendError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(BackendError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty lint command"),
        });
    };

    let output = Command::new(program)
        .args(args)
        .arg(".")
        .current_dir(dir)
        .output()
        .map_err(|source| BackendError::Spawn {
            program: program.clone(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok((output.status.success(), text))
}
