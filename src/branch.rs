// Branch naming policy
//
// A branch name (with refs/heads/ stripped) must be ASCII, start with a lowercase
// letter, end with a lowercase letter or digit, and use only lowercase letters,
// digits, '-', '/' (and '.' when the policy allows it) in between.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::config::BranchPolicy;
use crate::error::Violation;
use crate::update::BRANCH_PREFIX;

const PATTERN_WITH_DOTS: &str = r"^[a-z]{1}[-a-z0-9/.]+[a-z0-9]{1}$";
const PATTERN_WITHOUT_DOTS: &str = r"^[a-z]{1}[-a-z0-9/]+[a-z0-9]{1}$";

static WITH_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN_WITH_DOTS).expect("Invalid PATTERN_WITH_DOTS"));

static WITHOUT_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN_WITHOUT_DOTS).expect("Invalid PATTERN_WITHOUT_DOTS"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchRule {
    AsciiOnly,
    Pattern(&'static str),
}

impl fmt::Display for BranchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchRule::AsciiOnly => f.write_str("Use only ascii characters"),
            BranchRule::Pattern(pattern) => write!(f, "Match the regex {:?}", pattern),
        }
    }
}

pub struct BranchNameValidator {
    pattern: &'static str,
    regex: &'static Regex,
}

impl BranchNameValidator {
    pub fn new(policy: &BranchPolicy) -> Self {
        if policy.allow_dots {
            Self {
                pattern: PATTERN_WITH_DOTS,
                regex: &WITH_DOTS,
            }
        } else {
            Self {
                pattern: PATTERN_WITHOUT_DOTS,
                regex: &WITHOUT_DOTS,
            }
        }
    }

    /// Check a fully-qualified ref name (or a bare branch name).
    pub fn check(&self, refname: &str) -> Result<(), Violation> {
        let name = refname.strip_prefix(BRANCH_PREFIX).unwrap_or(refname);

        self.rule_for(name).map_or(Ok(()), |rule| {
            Err(Violation::BranchName {
                name: name.to_string(),
                rule,
            })
        })
    }

    fn rule_for(&self, name: &str) -> Option<BranchRule> {
        if !name.is_ascii() {
            return Some(BranchRule::AsciiOnly);
        }

        if !self.regex.is_match(name) {
            return Some(BranchRule::Pattern(self.pattern));
        }

        None
    }
}
