//! Interactive input plumbing.
//!
//! The controller never touches stdin directly; it reads through an
//! [`InputSource`] so the whole flow can be driven by a script in tests.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Where the walkthrough gets its answers from.
pub trait InputSource {
    /// Prompt for and read one line of input, trimmed.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Prompt for a secret; terminal echo is suppressed when supported.
    fn read_password(&mut self, prompt: &str) -> Result<String>;
}

/// Reads from the process's stdin/tty.
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        std::io::stdout().flush().context("failed to flush prompt")?;
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            // EOF: retry loops must not spin on a closed stdin.
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    fn read_password(&mut self, prompt: &str) -> Result<String> {
        rpassword::prompt_password(prompt).context("failed to read password")
    }
}

/// Canned answers for tests.
pub struct ScriptedInput {
    answers: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.answers
            .pop_front()
            .with_context(|| format!("script ran out of answers at prompt {prompt:?}"))
    }

    fn read_password(&mut self, prompt: &str) -> Result<String> {
        self.read_line(prompt)
    }
}
