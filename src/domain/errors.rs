use thiserror::Error;

/// Failure to read a display string back into a wire value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Misconfigured page sequence handed to the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Wizard needs at least one page")]
    EmptyPageList,
    #[error("Unknown wizard page: {0}")]
    UnknownPage(String),
}

pub type FormatResult<T> = Result<T, FormatError>;
