// Ref updates as git hands them to a pre-receive hook, one per stdin line:
//
//   <old-revision> SP <new-revision> SP <ref-name> LF

use anyhow::{anyhow, Context, Result};
use std::io::BufRead;

use crate::revision::Revision;

pub const BRANCH_PREFIX: &str = "refs/heads/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub old: Revision,
    pub new: Revision,
    pub refname: String,
}

impl RefUpdate {
    pub fn new(old: Revision, new: Revision, refname: impl Into<String>) -> Self {
        Self {
            old,
            new,
            refname: refname.into(),
        }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [old, new, refname] = fields.as_slice() else {
            return Err(anyhow!(
                "Expected '<old> <new> <ref>' but got {} field(s): {:?}",
                fields.len(),
                line
            ));
        };

        Ok(Self {
            old: old.parse()?,
            new: new.parse()?,
            refname: refname.to_string(),
        })
    }

    /// Read every non-blank line of `input`.
    pub fn read_all(input: impl BufRead) -> Result<Vec<Self>> {
        let mut updates = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read push input")?;
            if line.trim().is_empty() {
                continue;
            }
            let update =
                Self::parse(&line).with_context(|| format!("Bad push input line {}", index + 1))?;
            updates.push(update);
        }
        Ok(updates)
    }

    pub fn is_creation(&self) -> bool {
        self.old.is_zero()
    }

    pub fn is_deletion(&self) -> bool {
        self.new.is_zero()
    }

    pub fn is_branch(&self) -> bool {
        self.refname.starts_with(BRANCH_PREFIX)
    }

    /// Ref name with the branch namespace stripped.
    pub fn branch_name(&self) -> &str {
        self.refname
            .strip_prefix(BRANCH_PREFIX)
            .unwrap_or(&self.refname)
    }
}
