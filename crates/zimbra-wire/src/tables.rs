//! Code tables for address roles and message flags.
//!
//! The wire format abbreviates address types and message flags to one or two
//! letters. Each table below is the single source for both directions.

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Role of an address on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressRole {
    /// Sender (`f`).
    From,
    /// Primary recipient (`t`).
    To,
    /// Carbon copy (`c`).
    Cc,
    /// Blind carbon copy (`b`).
    Bcc,
    /// Reply-To (`r`).
    ReplyTo,
    /// Sender header, also used for read receipts (`s`).
    Sender,
    /// Read-receipt notification (`n`).
    Notification,
    /// Resent-From (`rf`).
    ResentFrom,
}

/// `(code, role, name)` rows of the address table.
const ADDRESS_TABLE: [(&str, AddressRole, &str); 8] = [
    ("f", AddressRole::From, "from"),
    ("t", AddressRole::To, "to"),
    ("c", AddressRole::Cc, "cc"),
    ("b", AddressRole::Bcc, "bcc"),
    ("r", AddressRole::ReplyTo, "reply-to"),
    ("s", AddressRole::Sender, "sender"),
    ("n", AddressRole::Notification, "notification"),
    ("rf", AddressRole::ResentFrom, "resent-from"),
];

impl AddressRole {
    /// All roles in table order.
    pub const ALL: [Self; 8] = [
        Self::From,
        Self::To,
        Self::Cc,
        Self::Bcc,
        Self::ReplyTo,
        Self::Sender,
        Self::Notification,
        Self::ResentFrom,
    ];

    const fn row(self) -> (&'static str, Self, &'static str) {
        ADDRESS_TABLE[self as usize]
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.row().0
    }

    /// Returns the role name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.row().2
    }

    /// Looks up a role by wire code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        ADDRESS_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, role, _)| *role)
    }

    /// Looks up a role by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ADDRESS_TABLE
            .iter()
            .find(|(_, _, n)| n.eq_ignore_ascii_case(name))
            .map(|(_, role, _)| *role)
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AddressRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownRole(s.to_string()))
    }
}

/// Message state flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    /// `u`
    Unread,
    /// `f`
    Flagged,
    /// `a`
    HasAttachment,
    /// `r`
    Replied,
    /// `s`
    SentByMe,
    /// `w`
    Forwarded,
    /// `v`
    CalendarInvite,
    /// `d`
    Draft,
    /// `x`
    ImapDeleted,
    /// `n`
    NotificationSent,
    /// `!`
    Urgent,
    /// `?`
    LowPriority,
    /// `+`
    Priority,
}

const FLAG_TABLE: [(char, Flag, &str); 13] = [
    ('u', Flag::Unread, "Unread"),
    ('f', Flag::Flagged, "Flagged"),
    ('a', Flag::HasAttachment, "Has attachment"),
    ('r', Flag::Replied, "Replied"),
    ('s', Flag::SentByMe, "Sent by me"),
    ('w', Flag::Forwarded, "Forwarded"),
    ('v', Flag::CalendarInvite, "Calendar invite"),
    ('d', Flag::Draft, "Draft"),
    ('x', Flag::ImapDeleted, "IMAP-Deleted"),
    ('n', Flag::NotificationSent, "Notification sent"),
    ('!', Flag::Urgent, "Urgent"),
    ('?', Flag::LowPriority, "Low-priority"),
    ('+', Flag::Priority, "Priority"),
];

impl Flag {
    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> char {
        FLAG_TABLE[self as usize].0
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        FLAG_TABLE[self as usize].2
    }

    /// Looks up a flag by wire code.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        FLAG_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, flag, _)| *flag)
    }

    /// Decodes a flag string, skipping unknown codes.
    pub fn parse_all(flags: &str) -> impl Iterator<Item = Self> + '_ {
        flags.chars().filter_map(Self::from_code)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
