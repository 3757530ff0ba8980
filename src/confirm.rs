use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScanError;

pub trait ConfirmationService {
    fn confirm(&self, prompt: &str) -> Result<bool, ScanError>;

    fn notify_error(&self, message: &str) -> Result<(), ScanError>;
}

impl<C: ConfirmationService + ?Sized> ConfirmationService for &C {
    fn confirm(&self, prompt: &str) -> Result<bool, ScanError> {
        (**self).confirm(prompt)
    }

    fn notify_error(&self, message: &str) -> Result<(), ScanError> {
        (**self).notify_error(message)
    }
}

impl<C: ConfirmationService + ?Sized> ConfirmationService for Box<C> {
    fn confirm(&self, prompt: &str) -> Result<bool, ScanError> {
        (**self).confirm(prompt)
    }

    fn notify_error(&self, message: &str) -> Result<(), ScanError> {
        (**self).notify_error(message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Ask,
    Overwrite,
    Skip,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Ask => write!(f, "ask"),
            DuplicatePolicy::Overwrite => write!(f, "overwrite"),
            DuplicatePolicy::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    answer: bool,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }

    pub fn overwrite() -> Self {
        Self::new(true)
    }

    pub fn skip() -> Self {
        Self::new(false)
    }
}

impl ConfirmationService for AutoConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool, ScanError> {
        warn!(answer = self.answer, "{prompt}");
        Ok(self.answer)
    }

    fn notify_error(&self, message: &str) -> Result<(), ScanError> {
        eprintln!("error: {message}");
        Ok(())
    }
}
