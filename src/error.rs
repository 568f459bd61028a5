//! Error taxonomy for invoice-flow.
//!
//! Every error here is recovered at the action handler that produced it and
//! shown as a popup notice; nothing propagates past the interactive loop.

use thiserror::Error;

/// Rejections of the add-item form. Validation runs before any mutation, so
/// a failed add leaves the line-item collection untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

/// Failures of PDF document generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("add at least one item to the invoice first")]
    NoItems,

    #[error("could not write the invoice file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the tabular export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no invoice items to export")]
    NoItems,

    #[error("could not write the export file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Io(std::io::Error::other(err))
    }
}

/// Outcomes of an email send, kept coarse on purpose: the wizard only needs
/// to tell a bad credential apart from everything else.
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("authentication failed; check the sender address and app password")]
    Auth,

    #[error("failed to send email: {0}")]
    Transport(String),

    #[error("email send cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_field() {
        assert_eq!(
            ValidationError::MissingField("Item").to_string(),
            "Item is required"
        );
        assert_eq!(
            ValidationError::NotANumber("Quantity").to_string(),
            "Quantity must be a number"
        );
    }

    #[test]
    fn csv_errors_fold_into_io() {
        let err = csv::Writer::from_path("/nonexistent/dir/out.csv").unwrap_err();
        let export: ExportError = err.into();
        assert!(matches!(export, ExportError::Io(_)));
    }
}
