//! Error types for client operations.

use std::io;
use zimbra_wire::Fault;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP-level failure: the request did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a usable body.
    #[error("HTTP status {status}")]
    Status {
        /// Status code.
        status: u16,
    },

    /// Connection-level failure reported by a custom transport.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(#[source] zimbra_wire::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(#[source] zimbra_wire::Error),
}

/// Authentication failure.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The auth request did not complete.
    #[error("Authentication transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected the credentials or the account.
    #[error("Authentication rejected: {0}")]
    Rejected(Fault),

    /// The server accepted the request but returned no token.
    #[error("No authentication token in response")]
    MissingToken,
}

/// Attachment upload failure.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The item has no basename or its content could not be read.
    #[error("Invalid upload source for {basename:?}: {reason}")]
    InvalidSource {
        /// Item basename.
        basename: String,
        /// What went wrong.
        reason: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// The upload service answered with a non-200 code.
    #[error("Upload of {basename:?} rejected with code {status_code}")]
    Rejected {
        /// Item basename.
        basename: String,
        /// Code reported by the upload service.
        status_code: u16,
    },

    /// The upload service answered with an unparseable line.
    #[error("Malformed upload response for {basename:?}: {source}")]
    MalformedResponse {
        /// Item basename.
        basename: String,
        /// Parse error.
        #[source]
        source: zimbra_wire::Error,
    },

    /// The upload request did not complete.
    #[error("Upload transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The session holds no token.
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Attachment download failure.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The content request did not complete.
    #[error("Download of message {message_id} part {part} failed: {source}")]
    Transport {
        /// Message id.
        message_id: String,
        /// Part path.
        part: String,
        /// Underlying failure.
        #[source]
        source: TransportError,
    },

    /// The server has no such part.
    #[error("Message {message_id} part {part} not found")]
    NotFound {
        /// Message id.
        message_id: String,
        /// Part path.
        part: String,
    },

    /// The session holds no token.
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Message send failure.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The send request did not complete.
    #[error("Send transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected the message.
    #[error("Send rejected: {0}")]
    Fault(Fault),

    /// An attachment could not be uploaded.
    #[error("Attachment upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The session holds no token.
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server returned a fault.
    #[error("Remote fault: {0}")]
    Fault(Fault),

    /// Authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Upload failure.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Download failure.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Send failure.
    #[error(transparent)]
    Send(#[from] SendError),

    /// Response normalization failure.
    #[error("Wire error: {0}")]
    Wire(#[from] zimbra_wire::Error),

    /// The session holds no token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The response lacks the expected element.
    #[error("No {0} in response")]
    MissingResponse(String),

    /// Invalid URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Outcome of a single SOAP exchange, converted into the public errors.
#[derive(Debug)]
pub(crate) enum CallError {
    Transport(TransportError),
    Fault(Fault),
    NotAuthenticated,
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<CallError> for Error {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(e) => Self::Transport(e),
            CallError::Fault(fault) => Self::Fault(fault),
            CallError::NotAuthenticated => Self::NotAuthenticated,
        }
    }
}

impl From<CallError> for AuthError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(e) => Self::Transport(e),
            CallError::Fault(fault) => Self::Rejected(fault),
            // Login never requires an existing token.
            CallError::NotAuthenticated => Self::MissingToken,
        }
    }
}

impl From<CallError> for SendError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(e) => Self::Transport(e),
            CallError::Fault(fault) => Self::Fault(fault),
            CallError::NotAuthenticated => Self::NotAuthenticated,
        }
    }
}
