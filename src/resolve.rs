//! Which commits does a ref update introduce?

use crate::config::{RevisionPolicy, Scope, Strategy};
use crate::error::BackendError;
use crate::git::Backend;
use crate::revision::Revision;
use crate::update::{RefUpdate, BRANCH_PREFIX};

pub struct Resolver<'a> {
    backend: &'a dyn Backend,
    policy: RevisionPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(backend: &'a dyn Backend, policy: RevisionPolicy) -> Self {
        Self { backend, policy }
    }

    /// New commits of `update`, oldest first. With [`Scope::Latest`] only the newest one.
    pub fn new_commits(&self, update: &RefUpdate) -> Result<Vec<Revision>, BackendError> {
        let exclude = match self.policy.strategy {
            Strategy::Ancestry if update.is_creation() => {
                // History already accepted on another branch is not checked again.
                self.tips_except(BRANCH_PREFIX, &update.refname)?
            }
            Strategy::Ancestry => vec![update.old],
            Strategy::Unreachable => self.tips_except("refs/", "")?,
        };

        let mut revisions = self.backend.rev_list(&[update.new], &exclude)?;
        tracing::debug!(
            refname = %update.refname,
            excluded = exclude.len(),
            found = revisions.len(),
            "resolved new commits"
        );

        if self.policy.scope == Scope::Latest {
            revisions = revisions.pop().into_iter().collect();
        }

        Ok(revisions)
    }

    /// Tips of every ref under `prefix` other than `refname`, deduplicated.
    fn tips_except(&self, prefix: &str, refname: &str) -> Result<Vec<Revision>, BackendError> {
        let mut tips: Vec<Revision> = self
            .backend
            .ref_tips(prefix)?
            .into_iter()
            .filter(|(name, _)| name != refname)
            .map(|(_, rev)| rev)
            .collect();
        tips.sort();
        tips.dedup();
        Ok(tips)
    }
}
