//! Imperative-mood lookup.
//!
//! The message validator asks a [`MoodOracle`] whether the first word of a
//! subject is a base-form verb. Production hooks shell out to a part-of-speech
//! tool; a fixed word list can stand in for it where no such tool is installed.

use std::collections::HashSet;
use std::process::Command;

use crate::error::BackendError;

pub trait MoodOracle {
    fn is_imperative(&self, word: &str) -> Result<bool, BackendError>;
}

/// Runs `<argv...> <word>` and accepts the word when the tool echoes it back.
///
/// With the default `wordpos -vb get` this is a verb lookup in WordNet.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    argv: Vec<String>,
}

impl CommandOracle {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl MoodOracle for CommandOracle {
    fn is_imperative(&self, word: &str) -> Result<bool, BackendError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(BackendError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let output = Command::new(program)
            .args(args)
            .arg(word)
            .output()
            .map_err(|source| BackendError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::Tool {
                program: program.clone(),
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let accepted = stdout.trim() == word;
        tracing::debug!(word, accepted, "imperative lookup");
        Ok(accepted)
    }
}

/// A fixed set of accepted verbs.
#[derive(Debug, Clone, Default)]
pub struct VerbList {
    words: HashSet<String>,
}

impl VerbList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| capitalize(w.as_ref())).collect(),
        }
    }
}

impl MoodOracle for VerbList {
    fn is_imperative(&self, word: &str) -> Result<bool, BackendError> {
        Ok(self.words.contains(&capitalize(word)))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
