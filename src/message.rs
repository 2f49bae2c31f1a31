//! Commit message style rules.
//!
//! Rules run in a fixed order and the first one that fails is reported; nothing
//! after it is evaluated. Lines starting with the comment marker are dropped
//! before any line-based rule sees the message.
//!
//! | # | Rule                                             |
//! |---|--------------------------------------------------|
//! | 1 | whole message is ASCII (when required)           |
//! | 2 | body lines fit the body width                    |
//! | 3 | no trailing whitespace (body or all lines)       |
//! | 4 | subject is not empty                             |
//! | 5 | merge subjects match the merge pattern           |
//! | 6 | subject fits the subject limit                   |
//! | 7 | subject starts with a capitalized word           |
//! | 8 | subject ends with a letter or digit              |
//! | 9 | subject has more than one word                   |
//! | 10| subject starts with an imperative verb           |
//! | 11| subject and body are separated by a blank line   |
//!
//! Merge commits skip rules 6 to 10.

use std::fmt;

use crate::config::{MessagePolicy, TrailingWhitespace};
use crate::error::{BackendError, Violation};
use crate::mood::MoodOracle;

const MERGE_PREFIXES: [&str; 2] = ["Merge branch ", "Merge commit "];

/// The part-of-speech lookup misclassifies this one.
const ALWAYS_IMPERATIVE: &str = "Refactor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    AsciiOnly,
    BodyLineLength(usize),
    TrailingWhitespace,
    EmptySubject,
    MergeSubject(String),
    SubjectLength(usize),
    Capitalize,
    SubjectEnding,
    SingleWord,
    ImperativeMood,
    BlankLine,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::AsciiOnly => "ascii-only",
            Rule::BodyLineLength(_) => "body-line-length",
            Rule::TrailingWhitespace => "trailing-whitespace",
            Rule::EmptySubject => "empty-subject",
            Rule::MergeSubject(_) => "merge-subject",
            Rule::SubjectLength(_) => "subject-length",
            Rule::Capitalize => "capitalize",
            Rule::SubjectEnding => "subject-ending",
            Rule::SingleWord => "single-word",
            Rule::ImperativeMood => "imperative-mood",
            Rule::BlankLine => "blank-line",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::AsciiOnly => f.write_str("Use only ascii characters"),
            Rule::BodyLineLength(limit) => write!(f, "Wrap the body at {limit} characters"),
            Rule::TrailingWhitespace => f.write_str("Remove trailing whitespace"),
            Rule::EmptySubject => f.write_str("Do not make subject line empty"),
            Rule::MergeSubject(pattern) => write!(
                f,
                "Subject line for merge commits must match regex {pattern:?}"
            ),
            Rule::SubjectLength(limit) => {
                write!(f, "Limit the subject line to {limit} characters")
            }
            Rule::Capitalize => f.write_str("Capitalize the subject line"),
            Rule::SubjectEnding => f.write_str("Do not end the subject line with a period"),
            Rule::SingleWord => f.write_str("Do not write single worded commits"),
            Rule::ImperativeMood => f.write_str("Use the imperative mood in the subject line"),
            Rule::BlankLine => f.write_str("Separate subject from body with a blank line"),
        }
    }
}

/// A raw message split into its non-comment lines.
#[derive(Debug, Clone)]
pub struct CommitMessage<'a> {
    lines: Vec<&'a str>,
}

impl<'a> CommitMessage<'a> {
    pub fn parse(raw: &'a str, comment_char: char) -> Self {
        let lines = raw
            .lines()
            .filter(|line| !line.starts_with(comment_char))
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn subject(&self) -> &'a str {
        self.lines.first().copied().unwrap_or("")
    }

    pub fn body(&self) -> &[&'a str] {
        self.lines.get(1..).unwrap_or(&[])
    }

    pub fn is_merge(&self) -> bool {
        let subject = self.subject();
        MERGE_PREFIXES.iter().any(|prefix| subject.starts_with(prefix))
    }
}

pub struct MessageValidator<'a> {
    policy: &'a MessagePolicy,
    oracle: &'a dyn MoodOracle,
}

impl<'a> MessageValidator<'a> {
    pub fn new(policy: &'a MessagePolicy, oracle: &'a dyn MoodOracle) -> Self {
        Self { policy, oracle }
    }

    /// Validate the message of `commit` (its short identifier is used in the report).
    pub fn check(&self, commit: &str, raw: &str) -> Result<(), Violation> {
        match self.first_violation(raw) {
            Ok(None) => Ok(()),
            Ok(Some(rule)) => Err(Violation::CommitMessage {
                commit: commit.to_string(),
                rule,
            }),
            Err(source) => Err(Violation::Backend {
                commit: commit.to_string(),
                source,
            }),
        }
    }

    /// The first rule `raw` breaks, or `None` when it passes. Only the mood lookup can error.
    pub fn first_violation(&self, raw: &str) -> Result<Option<Rule>, BackendError> {
        let policy = self.policy;
        let message = CommitMessage::parse(raw, policy.comment_char);

        if policy.require_ascii && !raw.is_ascii() {
            return Ok(Some(Rule::AsciiOnly));
        }

        let body = message.body();
        if body
            .iter()
            .any(|line| line.chars().count() > policy.body_max_length)
        {
            return Ok(Some(Rule::BodyLineLength(policy.body_max_length)));
        }

        let whitespace_checked: &[&str] = match policy.trailing_whitespace {
            TrailingWhitespace::Body => body,
            TrailingWhitespace::All => message.lines(),
        };
        if whitespace_checked
            .iter()
            .any(|line| line.trim_end() != *line)
        {
            return Ok(Some(Rule::TrailingWhitespace));
        }

        let subject = message.subject();
        if subject.trim().is_empty() {
            return Ok(Some(Rule::EmptySubject));
        }

        if message.is_merge() {
            if !policy.merge_subject.is_match(subject) {
                return Ok(Some(Rule::MergeSubject(
                    policy.merge_subject.as_str().to_string(),
                )));
            }
        } else if let Some(rule) = self.subject_violation(subject)? {
            return Ok(Some(rule));
        }

        Ok(separator_violation(message.lines()))
    }

    fn subject_violation(&self, subject: &str) -> Result<Option<Rule>, BackendError> {
        let policy = self.policy;

        if subject.chars().count() > policy.subject_max_length {
            return Ok(Some(Rule::SubjectLength(policy.subject_max_length)));
        }

        let words: Vec<&str> = subject.split_whitespace().collect();
        let first_word = words.first().copied().unwrap_or("");
        if !is_capitalized(first_word) {
            return Ok(Some(Rule::Capitalize));
        }

        let ends_well = subject
            .chars()
            .last()
            .is_some_and(|c| c.is_alphanumeric() || (policy.allow_closing_paren && c == ')'));
        if !ends_well {
            return Ok(Some(Rule::SubjectEnding));
        }

        if words.len() < 2 {
            return Ok(Some(Rule::SingleWord));
        }

        if first_word != ALWAYS_IMPERATIVE && !self.oracle.is_imperative(first_word)? {
            return Ok(Some(Rule::ImperativeMood));
        }

        Ok(None)
    }
}

/// Alphabetic, first letter upper-case and the rest lower-case.
fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() && first.is_uppercase() => {
            chars.all(|c| c.is_alphabetic() && !c.is_uppercase())
        }
        _ => false,
    }
}

fn separator_violation(lines: &[&str]) -> Option<Rule> {
    if lines.len() <= 2 {
        return None;
    }

    if !lines[1].trim().is_empty() {
        return Some(Rule::BlankLine);
    }

    // A blank separator followed only by more blank lines is fine; otherwise the
    // body must start right after the single separator line.
    let only_blank = lines[1..].iter().all(|line| line.is_empty());
    if !only_blank && lines[2].trim().is_empty() {
        return Some(Rule::BlankLine);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::mood::VerbList;
    use std::cell::RefCell;

    /// Records every word it is asked about.
    struct Recording {
        verbs: VerbList,
        asked: RefCell<Vec<String>>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                verbs: VerbList::new(["Fix", "Add", "Merge", "Remove"]),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl MoodOracle for Recording {
        fn is_imperative(&self, word: &str) -> Result<bool, BackendError> {
            self.asked.borrow_mut().push(word.to_string());
            self.verbs.is_imperative(word)
        }
    }

    struct Broken;

    impl MoodOracle for Broken {
        fn is_imperative(&self, _word: &str) -> Result<bool, BackendError> {
            Err(BackendError::Tool {
                program: "wordpos".to_string(),
                status: "exit status: 1".to_string(),
                output: "boom".to_string(),
            })
        }
    }

    fn first(policy: &Policy, raw: &str) -> Option<Rule> {
        let oracle = Recording::new();
        MessageValidator::new(&policy.message, &oracle)
            .first_violation(raw)
            .unwrap()
    }

    fn modern(raw: &str) -> Option<Rule> {
        first(&Policy::modern(), raw)
    }

    #[test]
    fn test_well_formed_message_passes() {
        assert_eq!(modern("Fix login bug\n"), None);
        assert_eq!(
            modern("Fix login bug\n\nThe session cookie was never refreshed.\nNow it is.\n"),
            None
        );
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        assert_eq!(
            modern("# Please enter the commit message\nFix login bug\n# trailing comment   \n"),
            None
        );
    }

    #[test]
    fn test_ascii_only() {
        assert_eq!(modern("Fix café bug\n"), Some(Rule::AsciiOnly));

        let mut policy = Policy::modern();
        policy.message.require_ascii = false;
        assert_eq!(first(&policy, "Fix café bug\n"), None);
    }

    #[test]
    fn test_body_line_length() {
        let long_line = "x".repeat(73);
        assert_eq!(
            modern(&format!("Fix login bug\n\n{long_line}\n")),
            Some(Rule::BodyLineLength(72))
        );
        assert_eq!(modern(&format!("Fix login bug\n\n{}\n", "x".repeat(72))), None);
    }

    #[test]
    fn test_trailing_whitespace_scope() {
        assert_eq!(
            modern("Fix login bug\n\nBody line \n"),
            Some(Rule::TrailingWhitespace)
        );
        assert_eq!(modern("Fix login bug \n"), Some(Rule::TrailingWhitespace));

        // Body-only scope lets the subject through to the ending rule instead.
        assert_eq!(
            first(&Policy::classic(), "Fix login bug \n"),
            Some(Rule::SubjectEnding)
        );
    }

    #[test]
    fn test_empty_subject() {
        assert_eq!(modern(""), Some(Rule::EmptySubject));
        assert_eq!(modern("# only a comment\n"), Some(Rule::EmptySubject));
        assert_eq!(
            first(&Policy::classic(), "   \n"),
            Some(Rule::EmptySubject)
        );
    }

    #[test]
    fn test_subject_length_per_preset() {
        let subject = format!("Fix {}", "a".repeat(56)); // 60 characters
        assert_eq!(modern(&subject), None);
        assert_eq!(
            first(&Policy::classic(), &subject),
            Some(Rule::SubjectLength(50))
        );
    }

    #[test]
    fn test_capitalization_is_checked_before_ending() {
        assert_eq!(modern("fix bug."), Some(Rule::Capitalize));
        assert_eq!(modern("FIX bug"), Some(Rule::Capitalize));
        assert_eq!(modern("Fix2 bug"), Some(Rule::Capitalize));
        assert_eq!(modern("Fix bug."), Some(Rule::SubjectEnding));
    }

    #[test]
    fn test_closing_paren_ending() {
        assert_eq!(modern("Fix bug (again)"), Some(Rule::SubjectEnding));

        let mut policy = Policy::modern();
        policy.message.allow_closing_paren = true;
        assert_eq!(first(&policy, "Fix bug (again)"), None);
    }

    #[test]
    fn test_single_word_subject() {
        assert_eq!(modern("Fix"), Some(Rule::SingleWord));
        assert_eq!(modern("Refactor"), Some(Rule::SingleWord));
    }

    #[test]
    fn test_imperative_mood() {
        assert_eq!(modern("Fixed login bug"), Some(Rule::ImperativeMood));
        assert_eq!(modern("Fix login bug"), None);
    }

    #[test]
    fn test_refactor_bypasses_lookup() {
        let policy = Policy::modern();
        let oracle = Recording::new();
        let validator = MessageValidator::new(&policy.message, &oracle);

        assert_eq!(validator.first_violation("Refactor auth").unwrap(), None);
        assert!(oracle.asked.borrow().is_empty());

        assert_eq!(validator.first_violation("Fix auth").unwrap(), None);
        assert_eq!(*oracle.asked.borrow(), vec!["Fix".to_string()]);
    }

    #[test]
    fn test_merge_subjects() {
        assert_eq!(modern("Merge branch 'x' into 'main'"), None);
        assert_eq!(modern("Merge branch 'feature/login' into main"), None);
        assert!(matches!(
            modern("Merge branch 'x' to 'main'"),
            Some(Rule::MergeSubject(_))
        ));

        let classic = Policy::classic();
        assert_eq!(first(&classic, "Merge branch 'x' into 'main'"), None);
        assert!(matches!(
            first(&classic, "Merge branch 'x' into main"),
            Some(Rule::MergeSubject(_))
        ));
    }

    #[test]
    fn test_merge_commits_skip_subject_rules() {
        let long = format!("Merge branch '{}' into 'main'", "x".repeat(80));
        let policy = Policy::modern();
        let oracle = Recording::new();
        let validator = MessageValidator::new(&policy.message, &oracle);

        assert_eq!(validator.first_violation(&long).unwrap(), None);
        assert!(oracle.asked.borrow().is_empty());
    }

    #[test]
    fn test_blank_separator() {
        assert_eq!(
            modern("Fix login bug\nNo blank line\nhere\n"),
            Some(Rule::BlankLine)
        );
        assert_eq!(
            modern("Fix login bug\n\n\nBody after two blanks\n"),
            Some(Rule::BlankLine)
        );
        // Only blank lines after the subject are fine.
        assert_eq!(modern("Fix login bug\n\n\n"), None);
        // Two lines are never checked for a separator.
        assert_eq!(modern("Fix login bug\nbody\n"), None);
    }

    #[test]
    fn test_merge_commits_still_need_separator() {
        assert_eq!(
            modern("Merge branch 'x' into 'main'\nconflicts:\nfile.rs\n"),
            Some(Rule::BlankLine)
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // Breaks the ascii, trailing whitespace, capitalization and ending rules at once.
        assert_eq!(modern("fïx bug. \n"), Some(Rule::AsciiOnly));
        assert_eq!(modern("fix bug. \n"), Some(Rule::TrailingWhitespace));
    }

    #[test]
    fn test_check_wraps_rule_in_violation() {
        let policy = Policy::modern();
        let oracle = Recording::new();
        let validator = MessageValidator::new(&policy.message, &oracle);

        let err = validator.check("deadbeef", "fix bug.").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad commit message (deadbeef): Capitalize the subject line"
        );
        assert_eq!(err.commit(), Some("deadbeef"));
    }

    #[test]
    fn test_lookup_failure_is_a_backend_violation() {
        let policy = Policy::modern();
        let validator = MessageValidator::new(&policy.message, &Broken);
        assert!(matches!(
            validator.check("deadbeef", "Fix login bug"),
            Err(Violation::Backend { .. })
        ));
    }

    #[test]
    fn test_rule_ids_are_stable() {
        assert_eq!(Rule::Capitalize.id(), "capitalize");
        assert_eq!(Rule::SubjectLength(70).id(), "subject-length");
    }

    #[test]
    fn test_parse_splits_subject_and_body() {
        let message = CommitMessage::parse("Subject\n# note\n\nBody\n", '#');
        assert_eq!(message.subject(), "Subject");
        assert_eq!(message.body(), &["", "Body"]);
        assert!(!message.is_merge());
        assert!(CommitMessage::parse("Merge commit 'abc' into main", '#').is_merge());
    }
}
