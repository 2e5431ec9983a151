//! Error types for the admin area
//!
//! Display strings are shown to the user as-is.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AdminError {
    #[error("Please select a collection")]
    NoCollection,

    #[error("Please select at least one photo")]
    NoFiles,

    /// Only common web image formats are accepted
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Please log in first")]
    NotAuthenticated,
}

pub type AdminResult<T> = Result<T, AdminError>;
