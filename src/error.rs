//! Error taxonomy for the push gate.
//!
//! Every rejection of a push is a [`Violation`]. Failures of the version-control
//! backend or of an auxiliary tool are [`BackendError`]s, which the component
//! that called the backend wraps into a `Violation` so the hook has one path
//! for "reject this push".

use std::io;
use std::path::PathBuf;

use crate::branch::BranchRule;
use crate::message::Rule;

#[derive(Debug, thiserror::Error)]
pub enum Violation {
    #[error("Bad branch name ({name}): {rule}")]
    BranchName { name: String, rule: BranchRule },

    #[error("Bad commit message ({commit}): {rule}")]
    CommitMessage { commit: String, rule: Rule },

    #[error("Lint failed ({commit}):\n{output}")]
    Lint { commit: String, output: String },

    #[error("Cannot resolve new commits of {refname}: {source}")]
    Resolution {
        refname: String,
        #[source]
        source: BackendError,
    },

    #[error("Cannot check commit ({commit}): {source}")]
    Backend {
        commit: String,
        #[source]
        source: BackendError,
    },
}

impl Violation {
    /// Short identifier of the commit this violation is about, if any.
    pub fn commit(&self) -> Option<&str> {
        match self {
            Violation::CommitMessage { commit, .. }
            | Violation::Lint { commit, .. }
            | Violation::Backend { commit, .. } => Some(commit),
            Violation::BranchName { .. } | Violation::Resolution { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid revision: {0:?}")]
    InvalidRevision(String),

    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {output}")]
    Tool {
        program: String,
        status: String,
        output: String,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackendError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackendError::Io {
            path: path.into(),
            source,
        }
    }
}
