//! Message composition and sending.

use serde_json::{Value, json};
use tracing::{debug, info};
use zimbra_wire::{AddressRole, Flag, Namespace, Request, SendMsgResponse};

use crate::error::{SendError, TransportError};
use crate::session::Session;
use crate::transfer::{UploadItem, UploadedAttachment};
use crate::transport::Transport;

/// Default body content type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Recipients with their roles, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients(Vec<(AddressRole, String)>);

impl Recipients {
    /// Creates an empty recipient list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one address under a role.
    #[must_use]
    pub fn add(mut self, role: AddressRole, address: impl Into<String>) -> Self {
        self.0.push((role, address.into()));
        self
    }

    /// Adds several addresses under a role.
    #[must_use]
    pub fn extend<I, S>(mut self, role: AddressRole, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .extend(addresses.into_iter().map(|address| (role, address.into())));
        self
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn to(self, address: impl Into<String>) -> Self {
        self.add(AddressRole::To, address)
    }

    /// Adds a carbon-copy recipient.
    #[must_use]
    pub fn cc(self, address: impl Into<String>) -> Self {
        self.add(AddressRole::Cc, address)
    }

    /// Adds a blind carbon-copy recipient.
    #[must_use]
    pub fn bcc(self, address: impl Into<String>) -> Self {
        self.add(AddressRole::Bcc, address)
    }

    /// Adds an address under a role given by name (`"to"`, `"reply-to"`, ...).
    ///
    /// # Errors
    ///
    /// Returns `UnknownRole` if the name is not a known role.
    pub fn add_named(self, role: &str, address: impl Into<String>) -> zimbra_wire::Result<Self> {
        let role: AddressRole = role.parse()?;
        Ok(self.add(role, address))
    }

    /// Returns the addresses for a role.
    #[must_use]
    pub fn get(&self, role: AddressRole) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, address)| address.as_str())
            .collect()
    }

    /// Returns true if there are no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the wire list `[{t, a}, ...]`, in insertion order.
    #[must_use]
    pub fn to_wire(&self) -> Vec<Value> {
        self.0
            .iter()
            .map(|(role, address)| json!({ "t": role.code(), "a": address }))
            .collect()
    }
}

/// An attachment to send.
#[derive(Debug)]
pub enum OutgoingAttachment {
    /// Already on the server.
    Uploaded(UploadedAttachment),
    /// Uploaded during `send`.
    Pending(UploadItem),
}

impl From<UploadedAttachment> for OutgoingAttachment {
    fn from(uploaded: UploadedAttachment) -> Self {
        Self::Uploaded(uploaded)
    }
}

impl From<UploadItem> for OutgoingAttachment {
    fn from(item: UploadItem) -> Self {
        Self::Pending(item)
    }
}

/// A message to send.
#[derive(Debug)]
pub struct OutgoingMessage {
    /// Recipients.
    pub recipients: Recipients,
    /// Subject.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Body content type.
    pub content_type: String,
    /// Flags to set on the saved copy.
    pub flags: Vec<Flag>,
    /// Attachments.
    pub attachments: Vec<OutgoingAttachment>,
}

impl OutgoingMessage {
    /// Creates a plain-text message.
    #[must_use]
    pub fn new(
        recipients: Recipients,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipients,
            subject: subject.into(),
            body: body.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            flags: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Sets the body content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Adds a flag.
    #[must_use]
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: impl Into<OutgoingAttachment>) -> Self {
        self.attachments.push(attachment.into());
        self
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    /// Id of the saved copy, when the server returns one.
    pub message_id: Option<String>,
    /// Raw `SendMsgResponse`.
    pub response: Value,
}

/// Builds the `SendMsgRequest`. `attach` is omitted when there are no ids.
pub(crate) fn build_send_request(message: &OutgoingMessage, attachment_ids: &[String]) -> Request {
    let flags: String = message.flags.iter().map(|flag| flag.code()).collect();

    let mut m = json!({
        "e": message.recipients.to_wire(),
        "su": message.subject,
        "f": flags,
        "mp": {
            "ct": message.content_type,
            "content": { "_content": message.body },
        },
    });
    if !attachment_ids.is_empty() {
        m["attach"] = json!({ "aid": attachment_ids.join(",") });
    }

    Request::new("SendMsgRequest", Namespace::Mail)
        .attr("noSave", 0)
        .attr("fetchSavedMsg", 1)
        .element("m", m)
}

impl<T: Transport> Session<T> {
    /// Sends a message, uploading pending attachments first.
    ///
    /// # Errors
    ///
    /// - `SendError::NotAuthenticated` without a token
    /// - `SendError::Upload` if an attachment upload fails; nothing is sent
    /// - `SendError::Fault` if the server rejects the message
    /// - `SendError::Transport` if a request fails
    pub async fn send(&mut self, mut message: OutgoingMessage) -> Result<SendResult, SendError> {
        if !self.is_authenticated() {
            return Err(SendError::NotAuthenticated);
        }

        let mut attachment_ids = Vec::with_capacity(message.attachments.len());
        for attachment in &mut message.attachments {
            let id = match attachment {
                OutgoingAttachment::Uploaded(uploaded) => uploaded.attachment_id.clone(),
                OutgoingAttachment::Pending(item) => self.upload_one(item).await?.attachment_id,
            };
            attachment_ids.push(id);
        }

        let request = build_send_request(&message, &attachment_ids);
        debug!(
            subject = %message.subject,
            attachments = attachment_ids.len(),
            "Sending message"
        );

        let response = self.call(&request).await?;
        let sent: SendMsgResponse = response
            .require("SendMsgResponse")
            .map_err(TransportError::Malformed)?;
        let message_id = sent.messages.into_iter().next().and_then(|m| m.id);
        let raw = response.raw("SendMsgResponse").cloned().unwrap_or_default();

        info!(message_id = message_id.as_deref(), "Message sent");
        Ok(SendResult {
            message_id,
            response: raw,
        })
    }
}
