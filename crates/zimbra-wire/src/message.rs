//! Normalized message model.

use crate::error::{Error, Result};
use crate::part::{Attachment, Body, find_attachments, find_body};
use crate::tables::{AddressRole, Flag};
use crate::wire::{WireAddress, WireMessage};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Display format of message timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Addresses grouped by role.
///
/// Every role of the address table is present, possibly with no addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addresses(BTreeMap<AddressRole, Vec<String>>);

impl Addresses {
    /// Creates a mapping with an empty list for every role.
    #[must_use]
    pub fn new() -> Self {
        Self(AddressRole::ALL.iter().map(|role| (*role, Vec::new())).collect())
    }

    /// Groups wire addresses by role, keeping wire order within a role.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownAddressType` for a code outside the table.
    pub fn from_wire(addresses: &[WireAddress]) -> Result<Self> {
        let mut grouped = Self::new();
        for address in addresses {
            let role = AddressRole::from_code(&address.kind)
                .ok_or_else(|| Error::UnknownAddressType(address.kind.clone()))?;
            grouped.push(role, address.address.clone());
        }
        Ok(grouped)
    }

    /// Appends an address.
    pub fn push(&mut self, role: AddressRole, address: String) {
        self.0.entry(role).or_default().push(address);
    }

    /// Returns the addresses for a role.
    #[must_use]
    pub fn get(&self, role: AddressRole) -> &[String] {
        self.0.get(&role).map_or(&[], Vec::as_slice)
    }

    /// Iterates over roles in table order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressRole, &[String])> {
        self.0.iter().map(|(role, list)| (*role, list.as_slice()))
    }
}

impl Default for Addresses {
    fn default() -> Self {
        Self::new()
    }
}

/// A normalized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// User-scoped message id.
    pub id: String,
    /// `Message-ID` without angle brackets, usable as `msgid:` search term.
    pub server_message_id: Option<String>,
    /// Folder id.
    pub folder_id: Option<String>,
    /// Conversation id.
    pub conversation_id: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, whole seconds.
    pub timestamp: Option<String>,
    /// Subject, empty when absent.
    pub subject: String,
    /// Addresses by role.
    pub addresses: Addresses,
    /// Body fragment, empty when absent.
    pub fragment: String,
    /// Raw flag codes, empty when absent.
    pub flags: String,
    /// Size in bytes.
    pub size_bytes: Option<u64>,
    /// Primary body.
    pub body: Option<Body>,
    /// Attachments in document order.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Decodes the flag string.
    pub fn flags(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::parse_all(&self.flags)
    }

    /// Returns true if the flag is set.
    #[must_use]
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag.code())
    }

    /// Returns the sender addresses.
    #[must_use]
    pub fn from(&self) -> &[String] {
        self.addresses.get(AddressRole::From)
    }

    /// Returns the primary recipients.
    #[must_use]
    pub fn to(&self) -> &[String] {
        self.addresses.get(AddressRole::To)
    }
}

/// Formats an epoch-milliseconds timestamp in `tz`.
///
/// Milliseconds are truncated to whole seconds.
#[must_use]
pub fn format_timestamp<Tz>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    DateTime::from_timestamp(millis / 1000, 0)
        .map(|utc| utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
}

fn strip_angle_brackets(mid: &str) -> &str {
    let mid = mid.strip_prefix('<').unwrap_or(mid);
    mid.strip_suffix('>').unwrap_or(mid)
}

/// Normalizes a wire message, formatting its timestamp in local time.
///
/// # Errors
///
/// Returns `Error::UnknownAddressType` for an address outside the table.
pub fn normalize_message(wire: WireMessage) -> Result<Message> {
    normalize_message_in(wire, &Local)
}

/// Normalizes a wire message, formatting its timestamp in `tz`.
///
/// # Errors
///
/// Returns `Error::UnknownAddressType` for an address outside the table.
pub fn normalize_message_in<Tz>(wire: WireMessage, tz: &Tz) -> Result<Message>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let addresses = Addresses::from_wire(&wire.addresses)?;
    let body = find_body(&wire.parts);
    let attachments = find_attachments(&wire.parts);

    Ok(Message {
        server_message_id: wire
            .mid
            .as_deref()
            .map(|mid| strip_angle_brackets(mid).to_string()),
        timestamp: wire.date.and_then(|millis| format_timestamp(millis, tz)),
        id: wire.id,
        folder_id: wire.folder_id,
        conversation_id: wire.conversation_id,
        subject: wire.subject.unwrap_or_default(),
        addresses,
        fragment: wire.fragment.unwrap_or_default(),
        flags: wire.flags.unwrap_or_default(),
        size_bytes: wire.size,
        body,
        attachments,
    })
}
