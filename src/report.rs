// Operator-facing report
//
// git relays whatever a pre-receive hook writes to stderr back to the pusher,
// prefixed with "remote:". The report is one block:
//
//   ====...====
//   CHECKING PUSH
//   ----...----
//   <progress lines>
//   OK | <violation>
//   ====...====

use std::fmt::Display;
use std::io::{self, Write};

use crate::check::Verdict;

pub const RULE_WIDTH: usize = 80;

pub struct Reporter<W: Write> {
    out: W,
    title: String,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out,
            title: title.into(),
        }
    }

    pub fn begin(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "{}", self.title)?;
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    /// One progress line. Best effort: a closed stream must not fail the check.
    pub fn progress(&mut self, message: impl Display) {
        if let Err(e) = writeln!(self.out, "{message}").and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "dropped progress line");
        }
    }

    pub fn finish(&mut self, verdict: &Verdict) -> io::Result<()> {
        match verdict {
            Verdict::Accepted => writeln!(self.out, "OK")?,
            Verdict::Rejected(violation) => writeln!(self.out, "{violation}")?,
        }
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
