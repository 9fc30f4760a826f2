//! Error types for wire encoding and normalization.

use crate::envelope::Fault;

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Wire error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a SOAP fault.
    #[error("Remote fault: {0}")]
    Fault(Fault),

    /// A required element is missing from the response.
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// An address carries a type code outside the address role table.
    #[error("Unknown address type code: {0}")]
    UnknownAddressType(String),

    /// A role name outside the address role table.
    #[error("Unknown address role: {0}")]
    UnknownRole(String),

    /// The upload endpoint returned a line that could not be parsed.
    #[error("Malformed upload response: {0}")]
    MalformedUpload(String),
}

impl Error {
    /// Returns the fault if this error carries one.
    #[must_use]
    pub const fn as_fault(&self) -> Option<&Fault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}
