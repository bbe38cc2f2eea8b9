use std::io::{self, BufRead};

use anyhow::{Context, Result};

use crate::models::DownloadPlan;

pub const CONFIRM_QUESTION: &str = "Start the download? (y/n): ";

/// Gate between planning and downloading.
pub trait Confirm {
    fn confirm(&mut self, plan: &DownloadPlan) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&DownloadPlan) -> bool,
{
    fn confirm(&mut self, plan: &DownloadPlan) -> Result<bool> {
        Ok(self(plan))
    }
}

/// Reads one answer line from a reader (stdin for the CLI).
pub struct LineConfirm<R> {
    input: R,
}

impl LineConfirm<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineConfirm<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for LineConfirm<R> {
    fn confirm(&mut self, _plan: &DownloadPlan) -> Result<bool> {
        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .context("read confirmation answer")?;
        Ok(is_affirmative(&answer))
    }
}

/// Only a lone `y` or `Y` counts as yes.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("y")
}
