//! # zimbra-wire
//!
//! Wire format and response normalization for the Zimbra JSON-SOAP API.
//!
//! This crate performs no I/O. It builds request envelopes, renders search
//! queries, and turns the server's abbreviated objects into a stable model.
//!
//! ## Features
//!
//! - **Envelopes**: `_jsns` / `_content` conventions, auth-token header, fault decoding
//! - **Search queries**: ordered field and bare terms rendered to the query language
//! - **Code tables**: address roles and message flags, both directions
//! - **Normalization**: message addresses, body lookup, attachment collection
//! - **Folders**: recursive folder tree from `GetFolderResponse`
//! - **Uploads**: the quasi-CSV line returned by the upload service
//!
//! ## Quick Start
//!
//! ### Building a request
//!
//! ```ignore
//! use zimbra_wire::{Namespace, Request, SearchSpec, build_query};
//!
//! let query = build_query(&SearchSpec::new().field("in", "/Inbox").term("invoice"));
//! let request = Request::new("SearchRequest", Namespace::Mail)
//!     .attr("types", "message")
//!     .text("query", query);
//!
//! let bytes = request.encode(Some(&auth_token))?;
//! ```
//!
//! ### Normalizing a response
//!
//! ```ignore
//! use zimbra_wire::{Response, SearchResponse, normalize_message};
//!
//! let response = Response::decode(&bytes)?;
//! let search: SearchResponse = response.require("SearchResponse")?;
//!
//! for wire in search.messages {
//!     let message = normalize_message(wire)?;
//!     println!("{} {}", message.timestamp.unwrap_or_default(), message.subject);
//!     for attachment in &message.attachments {
//!         println!("  {} ({})", attachment.basename, attachment.part);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod envelope;
mod error;
pub mod folder;
pub mod message;
pub mod part;
pub mod query;
pub mod tables;
pub mod upload;
pub mod wire;

pub use envelope::{Fault, Namespace, Request, Response, text, text_content};
pub use error::{Error, Result};
pub use folder::Folder;
pub use message::{Addresses, Message, format_timestamp, normalize_message, normalize_message_in};
pub use part::{Attachment, Body, Disposition, find_attachments, find_body};
pub use query::{SearchSpec, SearchTerm, SortBy, build_query};
pub use tables::{AddressRole, Flag};
pub use upload::{UploadReceipt, parse_upload_response};
pub use wire::{
    AuthResponse, GetFolderResponse, GetMsgResponse, SearchResponse, SendMsgResponse,
    WireAddress, WireMessage, WirePart,
};
