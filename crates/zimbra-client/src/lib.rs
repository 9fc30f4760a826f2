//! # zimbra-client
//!
//! Async client for the Zimbra JSON-SOAP API.
//!
//! This crate drives the server: it authenticates, searches, explores folders,
//! transfers attachments and sends mail. Wire formats and response
//! normalization live in [`zimbra_wire`], re-exported here.
//!
//! ## Features
//!
//! - **Sessions**: password login, token and CSRF handling, re-authentication
//! - **Mailbox**: search with paging and ordering, folder listing, message lookup
//! - **Attachments**: upload from memory, files or streams; download by part
//! - **Sending**: recipients by role, body, flags, pending or uploaded attachments
//! - **Pluggable transport**: `reqwest` by default, any [`Transport`] for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use zimbra_client::{ClientConfig, HttpTransport, SearchOptions, SearchSpec, Session};
//!
//! let config = ClientConfig::new("https://zimbra.example.net")?.with_locale("en_US");
//! let mut session =
//!     Session::authenticate(HttpTransport::new(), config, "user@example.net", "secret").await?;
//!
//! let spec = SearchSpec::new().field("in", "/Inbox").field("has", "attachment");
//! for message in session.search(&spec, &SearchOptions::default()).await? {
//!     println!("{} {}", message.id, message.subject);
//!     for file in session.download_all(&message).await? {
//!         println!("  {} ({} bytes)", file.attachment.basename, file.payload.len());
//!     }
//! }
//! ```
//!
//! ### Sending with an attachment
//!
//! ```ignore
//! use zimbra_client::{OutgoingMessage, Recipients, UploadItem};
//!
//! let message = OutgoingMessage::new(
//!     Recipients::new().to("alice@example.com").cc("bob@example.com"),
//!     "Report",
//!     "Attached.",
//! )
//! .with_attachment(UploadItem::from_path("report.pdf"));
//!
//! let result = session.send(message).await?;
//! println!("saved as {:?}", result.message_id);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
mod error;
pub mod mailbox;
pub mod session;
pub mod transfer;
pub mod transport;

pub use compose::{OutgoingAttachment, OutgoingMessage, Recipients, SendResult};
pub use config::ClientConfig;
pub use error::{
    AuthError, DownloadError, Error, Result, SendError, TransportError, UploadError,
};
pub use mailbox::SearchOptions;
pub use session::Session;
pub use transfer::{DownloadedAttachment, UploadItem, UploadSource, UploadedAttachment};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};

pub use zimbra_wire;
pub use zimbra_wire::{
    AddressRole, Attachment, Body, Fault, Flag, Folder, Message, SearchSpec, SortBy,
};
