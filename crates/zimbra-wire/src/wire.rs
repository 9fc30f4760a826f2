//! Raw wire objects as returned by the server.
//!
//! Field names follow the server's abbreviations and every field the server
//! may leave out is an `Option` (or an empty list).

use crate::folder::Folder;
use serde::Deserialize;
use serde_json::Value;

/// A message in a search or fetch response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireMessage {
    /// User-scoped message id.
    pub id: String,
    /// `Message-ID` header, with angle brackets.
    #[serde(default)]
    pub mid: Option<String>,
    /// Folder id.
    #[serde(default, rename = "l")]
    pub folder_id: Option<String>,
    /// Conversation id.
    #[serde(default, rename = "cid")]
    pub conversation_id: Option<String>,
    /// Date in milliseconds since the Unix epoch.
    #[serde(default, rename = "d")]
    pub date: Option<i64>,
    /// Subject.
    #[serde(default, rename = "su")]
    pub subject: Option<String>,
    /// Addresses in wire order.
    #[serde(default, rename = "e")]
    pub addresses: Vec<WireAddress>,
    /// Body fragment.
    #[serde(default, rename = "fr")]
    pub fragment: Option<String>,
    /// Flag codes, e.g. `"ua"`.
    #[serde(default, rename = "f")]
    pub flags: Option<String>,
    /// Size in bytes.
    #[serde(default, rename = "s")]
    pub size: Option<u64>,
    /// Top-level MIME parts.
    #[serde(default, rename = "mp")]
    pub parts: Vec<WirePart>,
}

/// An address entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireAddress {
    /// Address type code (see [`AddressRole`](crate::AddressRole)).
    #[serde(rename = "t")]
    pub kind: String,
    /// Email address.
    #[serde(rename = "a")]
    pub address: String,
    /// Display name.
    #[serde(default, rename = "d")]
    pub display: Option<String>,
    /// Personal name.
    #[serde(default, rename = "p")]
    pub personal: Option<String>,
}

/// A node of the MIME part tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePart {
    /// Dot-separated position, e.g. `"2.1"`.
    pub part: String,
    /// Content type.
    #[serde(default, rename = "ct")]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[serde(default, rename = "s")]
    pub size: Option<u64>,
    /// Content disposition.
    #[serde(default, rename = "cd")]
    pub disposition: Option<String>,
    /// Filename, possibly percent-encoded.
    #[serde(default)]
    pub filename: Option<String>,
    /// Body marker. Kept untyped, see [`WirePart::is_body`].
    #[serde(default)]
    pub body: Option<Value>,
    /// Inline content.
    #[serde(default)]
    pub content: Option<String>,
    /// Child parts.
    #[serde(default, rename = "mp")]
    pub parts: Vec<WirePart>,
}

impl WirePart {
    /// Returns true only when the body marker is JSON `true`.
    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self.body, Some(Value::Bool(true)))
    }
}

/// `AuthResponse` element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Auth token, `[{"_content": "..."}]` on the wire.
    #[serde(default)]
    pub auth_token: Option<Value>,
    /// CSRF token, present when requested.
    #[serde(default)]
    pub csrf_token: Option<Value>,
    /// Token lifetime in milliseconds.
    #[serde(default)]
    pub lifetime: Option<u64>,
}

/// `SearchResponse` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Matching messages.
    #[serde(default, rename = "m")]
    pub messages: Vec<WireMessage>,
    /// Whether more results are available past this page.
    #[serde(default)]
    pub more: Option<bool>,
    /// Offset of this page.
    #[serde(default)]
    pub offset: Option<u32>,
}

/// `GetMsgResponse` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetMsgResponse {
    /// Requested message (a single item on the wire).
    #[serde(default, rename = "m")]
    pub messages: Vec<WireMessage>,
}

/// `SendMsgResponse` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMsgResponse {
    /// Saved copy of the sent message.
    #[serde(default, rename = "m")]
    pub messages: Vec<SentMessage>,
}

/// Minimal view of a sent message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentMessage {
    /// Id of the saved copy.
    #[serde(default)]
    pub id: Option<String>,
}

/// `GetFolderResponse` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetFolderResponse {
    /// Requested folder (a single item on the wire).
    #[serde(default, rename = "folder")]
    pub folders: Vec<Folder>,
}
