use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const CONFIG_FILE_NAME: &str = "pushguard.toml";

/// Named starting points for the policy. `classic` is the stricter early rule set,
/// `modern` the looser one most repositories use today.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Classic,
    #[default]
    Modern,
}

/// Which lines the trailing whitespace rule looks at.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrailingWhitespace {
    Body,
    All,
}

/// Accepted shape of a merge commit subject.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MergeSubjectStyle {
    /// `Merge branch '<name>' into '<name>'`
    Quoted,
    /// `Merge <description> into <target>`
    Described,
    /// `Merge <description> into <target>` or `... to <target>`
    Permissive,
}

impl MergeSubjectStyle {
    pub fn pattern(self) -> &'static str {
        match self {
            MergeSubjectStyle::Quoted => r"^Merge branch '[^']+' into '[^']+'$",
            MergeSubjectStyle::Described => r"^Merge .+ into [-a-z0-9/.']+$",
            MergeSubjectStyle::Permissive => r"^Merge .+ (into|to) [-a-z0-9/.']+$",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Ancestors of the new tip that are not ancestors of the old one. New branches
    /// exclude history already on any other branch.
    #[default]
    Ancestry,
    /// Ancestors of the new tip that no existing ref reaches. The old revision is ignored.
    Unreachable,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    pub allow_dots: bool,
}

#[derive(Debug, Clone)]
pub struct MessagePolicy {
    pub subject_max_length: usize,
    pub body_max_length: usize,
    pub require_ascii: bool,
    pub trailing_whitespace: TrailingWhitespace,
    pub merge_subject: Regex,
    pub allow_closing_paren: bool,
    pub comment_char: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevisionPolicy {
    pub strategy: Strategy,
    pub scope: Scope,
}

/// Rule settings for one invocation. Built once and handed to every validator.
#[derive(Debug, Clone)]
pub struct Policy {
    pub branch: BranchPolicy,
    pub message: MessagePolicy,
    pub revisions: RevisionPolicy,
}

impl Policy {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self::classic(),
            Preset::Modern => Self::modern(),
        }
    }

    pub fn classic() -> Self {
        Self {
            branch: BranchPolicy { allow_dots: false },
            message: MessagePolicy {
                subject_max_length: 50,
                body_max_length: 72,
                require_ascii: true,
                trailing_whitespace: TrailingWhitespace::Body,
                merge_subject: builtin_regex(MergeSubjectStyle::Quoted),
                allow_closing_paren: false,
                comment_char: '#',
            },
            revisions: RevisionPolicy::default(),
        }
    }

    pub fn modern() -> Self {
        Self {
            branch: BranchPolicy { allow_dots: true },
            message: MessagePolicy {
                subject_max_length: 70,
                body_max_length: 72,
                require_ascii: true,
                trailing_whitespace: TrailingWhitespace::All,
                merge_subject: builtin_regex(MergeSubjectStyle::Described),
                allow_closing_paren: false,
                comment_char: '#',
            },
            revisions: RevisionPolicy::default(),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::modern()
    }
}

static QUOTED_MERGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(MergeSubjectStyle::Quoted.pattern()).expect("Invalid quoted merge pattern")
});

static DESCRIBED_MERGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(MergeSubjectStyle::Described.pattern()).expect("Invalid described merge pattern")
});

static PERMISSIVE_MERGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(MergeSubjectStyle::Permissive.pattern()).expect("Invalid permissive merge pattern")
});

/// Shared compiled pattern for a built-in style.
fn builtin_regex(style: MergeSubjectStyle) -> Regex {
    match style {
        MergeSubjectStyle::Quoted => QUOTED_MERGE.clone(),
        MergeSubjectStyle::Described => DESCRIBED_MERGE.clone(),
        MergeSubjectStyle::Permissive => PERMISSIVE_MERGE.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    pub enabled: bool,
    pub command: Vec<String>,
    pub marker: Option<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: vec!["flake8".to_string()],
            marker: None,
        }
    }
}

/// Merged configuration (file settings over preset defaults)
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: Policy,
    pub lint: LintConfig,
    pub mood_command: Vec<String>,
    /// Fixed verb list used instead of `mood_command` when set.
    pub imperative_words: Option<Vec<String>>,
    pub report_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            lint: LintConfig::default(),
            mood_command: default_mood_command(),
            imperative_words: None,
            report_title: "CHECKING PUSH".to_string(),
        }
    }
}

fn default_mood_command() -> Vec<String> {
    ["wordpos", "-vb", "get"].map(String::from).to_vec()
}

/// On-disk shape of `pushguard.toml`. Every field is optional and falls back to the preset.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub preset: Option<Preset>,

    #[serde(default)]
    pub branch: BranchSection,

    #[serde(default)]
    pub message: MessageSection,

    #[serde(default)]
    pub revisions: RevisionsSection,

    #[serde(default)]
    pub lint: LintSection,

    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BranchSection {
    pub allow_dots: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MessageSection {
    pub subject_max_length: Option<usize>,
    pub body_max_length: Option<usize>,
    pub require_ascii: Option<bool>,
    pub trailing_whitespace: Option<TrailingWhitespace>,
    pub merge_subject: Option<MergeSubjectStyle>,
    pub merge_subject_pattern: Option<String>,
    pub allow_closing_paren: Option<bool>,
    pub comment_char: Option<char>,
    pub mood_command: Option<Vec<String>>,
    pub imperative_words: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RevisionsSection {
    pub strategy: Option<Strategy>,
    pub scope: Option<Scope>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LintSection {
    pub enabled: Option<bool>,
    pub command: Option<Vec<String>>,
    pub marker: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    pub title: Option<String>,
}

impl Config {
    /// Load configuration with precedence: explicit path > `<git-dir>/pushguard.toml` > defaults
    pub fn load(explicit: Option<&Path>, git_dir: Option<&Path>) -> Result<Self> {
        let path: Option<PathBuf> = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => git_dir
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .filter(|path| path.exists()),
        };

        let Some(path) = path else {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            return Ok(Self::default());
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).context("Failed to parse configuration")?;
        Self::merge(file)
    }

    fn merge(file: FileConfig) -> Result<Self> {
        let mut config = Self {
            policy: Policy::preset(file.preset.unwrap_or_default()),
            ..Self::default()
        };

        let branch = &mut config.policy.branch;
        if let Some(allow_dots) = file.branch.allow_dots {
            branch.allow_dots = allow_dots;
        }

        let message = &mut config.policy.message;
        let section = file.message;
        if let Some(limit) = section.subject_max_length {
            message.subject_max_length = limit;
        }
        if let Some(limit) = section.body_max_length {
            message.body_max_length = limit;
        }
        if let Some(require_ascii) = section.require_ascii {
            message.require_ascii = require_ascii;
        }
        if let Some(scope) = section.trailing_whitespace {
            message.trailing_whitespace = scope;
        }
        if let Some(style) = section.merge_subject {
            message.merge_subject = builtin_regex(style);
        }
        if let Some(pattern) = section.merge_subject_pattern {
            message.merge_subject = Regex::new(&pattern)
                .with_context(|| format!("Invalid merge_subject_pattern {:?}", pattern))?;
        }
        if let Some(allow) = section.allow_closing_paren {
            message.allow_closing_paren = allow;
        }
        if let Some(marker) = section.comment_char {
            message.comment_char = marker;
        }
        if let Some(command) = section.mood_command {
            anyhow::ensure!(!command.is_empty(), "message.mood_command must not be empty");
            config.mood_command = command;
        }
        config.imperative_words = section.imperative_words;

        let revisions = &mut config.policy.revisions;
        if let Some(strategy) = file.revisions.strategy {
            revisions.strategy = strategy;
        }
        if let Some(scope) = file.revisions.scope {
            revisions.scope = scope;
        }

        if let Some(enabled) = file.lint.enabled {
            config.lint.enabled = enabled;
        }
        if let Some(command) = file.lint.command {
            anyhow::ensure!(!command.is_empty(), "lint.command must not be empty");
            config.lint.command = command;
        }
        config.lint.marker = file.lint.marker;

        if let Some(title) = file.report.title {
            config.report_title = title;
        }

        Ok(config)
    }
}
