//! User interaction for dexa.
//! Confirmation questions go through the `Prompter` trait so that callers can
//! be exercised without a terminal.

use dialoguer::Confirm;

use crate::error::{Error, Result};

/// Asks the user yes/no questions.
pub trait Prompter {
    /// Asks `prompt` and returns the answer.
    ///
    /// # Arguments
    /// * `skip` - Answer yes without asking
    /// * `prompt` - Question shown to the user
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| Error::IoError(std::io::Error::other(e.to_string())))
    }
}

/// Prompter returning a fixed answer. Used where no terminal is attached.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompter(pub bool);

impl Prompter for FixedPrompter {
    fn confirm(&self, skip: bool, _prompt: String) -> Result<bool> {
        Ok(skip || self.0)
    }
}
