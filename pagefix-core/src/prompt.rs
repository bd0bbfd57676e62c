use crate::interrupt::AwaitingAnswer;
use crate::scanner::Proposal;
use anyhow::{Context, Result};
use nu_ansi_term::Color as AnsiColor;
use std::io::{BufRead, Write};

/// A reply to "rename this file?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Yes to this one and every remaining proposal
    All,
    /// No to this one and every remaining proposal
    Quit,
}

impl Answer {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Self::Yes),
            "n" | "no" | "" => Some(Self::No),
            "a" | "all" => Some(Self::All),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Source of answers for interactive mode.
pub trait Confirm {
    fn confirm(&mut self, proposal: &Proposal) -> Result<Answer>;
}

/// Asks on `writer` and reads replies line by line from `reader`.
/// End of input counts as [`Answer::Quit`].
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
    use_color: bool,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W, use_color: bool) -> Self {
        Self {
            reader,
            writer,
            use_color,
        }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, proposal: &Proposal) -> Result<Answer> {
        let _waiting = AwaitingAnswer::start();
        loop {
            if self.use_color {
                write!(
                    self.writer,
                    "Rename {} -> {}? [y/N/a/q]: ",
                    AnsiColor::Red.paint(proposal.location.to_string()),
                    AnsiColor::Green.paint(proposal.to.as_str())
                )?;
            } else {
                write!(
                    self.writer,
                    "Rename {} -> {}? [y/N/a/q]: ",
                    proposal.location, proposal.to
                )?;
            }
            self.writer.flush().context("Failed to flush prompt")?;

            let mut input = String::new();
            let read = self
                .reader
                .read_line(&mut input)
                .context("Failed to read user input")?;
            if read == 0 {
                writeln!(self.writer)?;
                return Ok(Answer::Quit);
            }

            match Answer::parse(&input) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.writer, "Please answer y, n, a or q.")?,
            }
        }
    }
}
