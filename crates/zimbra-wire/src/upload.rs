//! Upload endpoint response parsing.
//!
//! With `fmt=raw` the upload service answers with a single line:
//!
//! ```text
//! 200,'null','d5d2a3a4-...:2b4e...'
//! ```
//!
//! Fields are comma-separated and optionally quoted with `'`.

use crate::error::{Error, Result};

/// Status code of a successful upload.
pub const UPLOAD_OK: u16 = 200;

const QUOTE: char = '\'';

/// Parsed upload response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Status code reported by the upload service.
    pub status: u16,
    /// Client request id echoed back, `None` for `null`.
    pub request_id: Option<String>,
    /// Server-assigned attachment id.
    pub attachment_id: String,
}

impl UploadReceipt {
    /// Returns true if the upload was accepted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == UPLOAD_OK
    }
}

/// Splits a line on commas outside `'` quotes and unquotes each field.
fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if quoted && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if quoted {
        return Err(Error::MalformedUpload(format!("unterminated quote in {line:?}")));
    }
    fields.push(current);
    Ok(fields)
}

/// Parses an upload response.
///
/// A non-200 status still parses; the attachment id may then be empty.
///
/// # Errors
///
/// Returns `Error::MalformedUpload` when the line has no numeric status, or
/// when a successful status comes without an attachment id.
pub fn parse_upload_response(raw: &str) -> Result<UploadReceipt> {
    let line = raw.trim();
    let fields = split_fields(line)?;

    let status = fields
        .first()
        .map(|code| code.trim())
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| Error::MalformedUpload(format!("no status code in {line:?}")))?;

    let request_id = fields
        .get(1)
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && *id != "null")
        .map(str::to_string);

    let attachment_id = fields
        .get(2)
        .map(|id| id.trim().to_string())
        .unwrap_or_default();

    if status == UPLOAD_OK && attachment_id.is_empty() {
        return Err(Error::MalformedUpload(format!(
            "no attachment id in {line:?}"
        )));
    }

    Ok(UploadReceipt {
        status,
        request_id,
        attachment_id,
    })
}
