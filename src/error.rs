//! Error types shared across the crate.
//!
//! Internally everything is an `anyhow::Error`. At the command boundary errors are classified
//! with [`IntoResult::pub_result`] so that the CLI and MCP surfaces can tell a bad request apart
//! from a broken database.

use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure, as seen by a caller of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or the config file is missing or malformed.
    Config,
    /// A query or statement against the SQLite database failed.
    Database,
    /// The caller supplied invalid input.
    Request,
    /// A report could not be produced from the ledger, e.g. too little data to forecast.
    Report,
    /// The MCP service failed to start or stopped unexpectedly.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// An error that has been tagged with an [`ErrorType`].
pub struct PubError {
    error_type: ErrorType,
    source: Error,
}

impl PubError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for PubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = &*self.source;
        Some(source)
    }
}

/// Returns the [`ErrorType`] an error was tagged with, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<PubError>().map(PubError::error_type)
}

/// Converts a result into a crate `Result` whose error is tagged with an [`ErrorType`].
///
/// An error that is already tagged keeps its original type, so the innermost classification
/// wins.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let source: Error = e.into();
            if source.is::<PubError>() {
                source
            } else {
                Error::new(PubError { error_type, source })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_tags_error() {
        let result: Result<()> = Err(anyhow!("boom"));
        let err = result.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Database));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_pub_result_keeps_inner_type() {
        let result: Result<()> = Err(anyhow!("bad month"));
        let err = result
            .pub_result(ErrorType::Request)
            .pub_result(ErrorType::Database)
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[test]
    fn test_untagged_error_has_no_type() {
        let err = anyhow!("plain");
        assert_eq!(error_type(&err), None);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Report.to_string(), "report");
    }
}
