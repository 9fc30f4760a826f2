//! MIME part tree walks: body lookup and attachment collection.

use crate::wire::WirePart;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::fmt;

/// Content disposition of an attachment part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Displayed inline (e.g. embedded images).
    Inline,
    /// Regular attachment.
    Attachment,
}

impl Disposition {
    /// Parses a wire disposition. Only the exact values count.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "inline" => Some(Self::Inline),
            "attachment" => Some(Self::Attachment),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary body of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    /// Part path.
    pub part: String,
    /// Content type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: Option<u64>,
    /// Body text.
    pub content: Option<String>,
}

/// An attachment found in a message part tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Part path, e.g. `"2.1"`.
    pub part: String,
    /// Disposition.
    pub disposition: Disposition,
    /// Content type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: Option<u64>,
    /// Decoded filename.
    pub basename: String,
    /// Filename without its extension.
    pub stem: String,
    /// Extension, without the dot.
    pub extension: Option<String>,
}

impl Attachment {
    /// Builds an attachment from a part with a known disposition.
    #[must_use]
    pub fn from_part(part: &WirePart, disposition: Disposition) -> Self {
        let basename = part
            .filename
            .as_deref()
            .map(decode_filename)
            .unwrap_or_default();
        let (stem, extension) = split_filename(&basename);

        Self {
            part: part.part.clone(),
            disposition,
            mime_type: part.content_type.clone(),
            size_bytes: part.size,
            stem: stem.to_string(),
            extension: extension.map(str::to_string),
            basename,
        }
    }
}

/// Percent-decodes a filename once.
#[must_use]
pub fn decode_filename(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Splits a filename at its last dot.
#[must_use]
pub fn split_filename(basename: &str) -> (&str, Option<&str>) {
    match basename.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (basename, None),
    }
}

/// Finds the first part marked as body, depth-first.
///
/// A matching part's children are not searched.
#[must_use]
pub fn find_body(parts: &[WirePart]) -> Option<Body> {
    for part in parts {
        if part.is_body() {
            return Some(Body {
                part: part.part.clone(),
                mime_type: part.content_type.clone(),
                size_bytes: part.size,
                content: part.content.clone(),
            });
        }
        if let Some(body) = find_body(&part.parts) {
            return Some(body);
        }
    }
    None
}

/// Collects every inline or attachment part in pre-order.
///
/// Children are always visited, so a container with a disposition is listed
/// before its own attachment descendants.
#[must_use]
pub fn find_attachments(parts: &[WirePart]) -> Vec<Attachment> {
    let mut attachments = Vec::new();
    collect_attachments(parts, &mut attachments);
    attachments
}

fn collect_attachments(parts: &[WirePart], out: &mut Vec<Attachment>) {
    for part in parts {
        if let Some(disposition) = part.disposition.as_deref().and_then(Disposition::from_wire) {
            out.push(Attachment::from_part(part, disposition));
        }
        collect_attachments(&part.parts, out);
    }
}
