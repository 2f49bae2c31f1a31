//! Push check orchestration.
//!
//! Ref updates are processed in input order. For every created or updated branch
//! the name is validated once, then each new commit (oldest first) has its message
//! validated and, when linting is enabled, its tree linted. The first violation
//! ends the whole check: later commits and later refs are never looked at.

use std::io::{self, Write};

use crate::branch::BranchNameValidator;
use crate::config::Config;
use crate::error::Violation;
use crate::git::Backend;
use crate::lint::SourceLinter;
use crate::message::MessageValidator;
use crate::mood::MoodOracle;
use crate::report::Reporter;
use crate::resolve::Resolver;
use crate::revision::Revision;
use crate::update::RefUpdate;

/// Outcome of one check.
#[derive(Debug)]
pub enum Verdict {
    Accepted,
    Rejected(Violation),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Process exit status for the hook: 0 accepts the push, 1 rejects it.
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Accepted => 0,
            Verdict::Rejected(_) => 1,
        }
    }
}

impl From<Result<(), Violation>> for Verdict {
    fn from(result: Result<(), Violation>) -> Self {
        match result {
            Ok(()) => Verdict::Accepted,
            Err(violation) => Verdict::Rejected(violation),
        }
    }
}

pub struct PushChecker<'a> {
    config: &'a Config,
    backend: &'a dyn Backend,
    oracle: &'a dyn MoodOracle,
}

impl<'a> PushChecker<'a> {
    pub fn new(config: &'a Config, backend: &'a dyn Backend, oracle: &'a dyn MoodOracle) -> Self {
        Self {
            config,
            backend,
            oracle,
        }
    }

    /// Check the push and write the full report. Only a failure to write the
    /// report header or footer is an error here; violations are in the verdict.
    pub fn run<W: Write>(
        &self,
        updates: &[RefUpdate],
        reporter: &mut Reporter<W>,
    ) -> io::Result<Verdict> {
        reporter.begin()?;
        let verdict = Verdict::from(self.check(updates, reporter));
        if let Verdict::Rejected(violation) = &verdict {
            tracing::info!(commit = ?violation.commit(), "push rejected: {violation}");
        }
        reporter.finish(&verdict)?;
        Ok(verdict)
    }

    pub fn check<W: Write>(
        &self,
        updates: &[RefUpdate],
        reporter: &mut Reporter<W>,
    ) -> Result<(), Violation> {
        let branches = BranchNameValidator::new(&self.config.policy.branch);
        let resolver = Resolver::new(self.backend, self.config.policy.revisions);
        let messages = MessageValidator::new(&self.config.policy.message, self.oracle);
        let linter = self
            .config
            .lint
            .enabled
            .then(|| SourceLinter::new(&self.config.lint));

        for update in updates {
            if update.is_deletion() {
                tracing::debug!(refname = %update.refname, "skipping deletion");
                continue;
            }
            // Tags and notes pass through unchecked.
            if !update.is_branch() {
                tracing::debug!(refname = %update.refname, "skipping non-branch ref");
                continue;
            }

            reporter.progress(format_args!("Checking branch name {}...", update.refname));
            branches.check(&update.refname)?;

            let revisions =
                resolver
                    .new_commits(update)
                    .map_err(|source| Violation::Resolution {
                        refname: update.refname.clone(),
                        source,
                    })?;
            if revisions.is_empty() {
                // A new branch with no commits of its own.
                reporter.progress(format_args!("No new commits on {}", update.refname));
                continue;
            }

            for rev in revisions {
                self.check_commit(rev, &messages, linter.as_ref(), reporter)?;
            }
        }

        Ok(())
    }

    fn check_commit<W: Write>(
        &self,
        rev: Revision,
        messages: &MessageValidator<'_>,
        linter: Option<&SourceLinter<'_>>,
        reporter: &mut Reporter<W>,
    ) -> Result<(), Violation> {
        let commit = rev.short();

        reporter.progress(format_args!("Checking message of commit {rev}..."));
        let message = self
            .backend
            .commit_message(rev)
            .map_err(|source| Violation::Backend {
                commit: commit.clone(),
                source,
            })?;
        messages.check(&commit, &message)?;

        if let Some(linter) = linter {
            reporter.progress(format_args!("Linting commit {rev}..."));
            linter.lint(self.backend, rev)?;
        }

        Ok(())
    }
}
