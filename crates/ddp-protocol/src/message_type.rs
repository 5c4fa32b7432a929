//! Message discriminator
//!
//! Every DDP payload carries a `"msg"` field naming its variant. The ordinal
//! order and the spelling of each name below are the wire contract: peers
//! speaking the same protocol compare these strings byte for byte.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProtocolError;

/// Number of message types in the protocol
pub const MESSAGE_TYPE_COUNT: usize = 17;

/// Wire names, indexed by ordinal
const NAMES: [&str; MESSAGE_TYPE_COUNT] = [
    "connect",
    "connected",
    "failed",
    "ping",
    "pong",
    "sub",
    "unsub",
    "nosub",
    "added",
    "changed",
    "removed",
    "ready",
    "addedBefore",
    "movedBefore",
    "method",
    "result",
    "updated",
];

/// Message type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageType {
    /// Client handshake
    Connect = 0,
    /// Handshake accepted
    Connected = 1,
    /// Handshake rejected (version mismatch)
    Failed = 2,
    /// Heartbeat ping
    Ping = 3,
    /// Heartbeat reply
    Pong = 4,
    /// Subscribe to a publication
    Sub = 5,
    /// Tear down a subscription
    UnSub = 6,
    /// Subscription refused or stopped
    NoSub = 7,
    /// Document added to a collection
    Added = 8,
    /// Document fields changed
    Changed = 9,
    /// Document removed
    Removed = 10,
    /// Subscriptions have delivered their initial data
    Ready = 11,
    /// Document added to an ordered view
    AddedBefore = 12,
    /// Document moved within an ordered view
    MovedBefore = 13,
    /// Remote method call
    Method = 14,
    /// Remote method return value or error
    Result = 15,
    /// Method side effects are visible in collection data
    Updated = 16,
}

/// Protocol phase a message type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `connect`, `connected`, `failed`
    Handshake,
    /// `ping`, `pong`
    Heartbeat,
    /// `sub`, `unsub`, `nosub`, `ready`
    Subscription,
    /// `added`, `changed`, `removed`, `addedBefore`, `movedBefore`
    CollectionSync,
    /// `method`, `result`, `updated`
    RemoteInvocation,
}

impl MessageType {
    /// Every message type in ordinal order
    pub const ALL: [MessageType; MESSAGE_TYPE_COUNT] = [
        MessageType::Connect,
        MessageType::Connected,
        MessageType::Failed,
        MessageType::Ping,
        MessageType::Pong,
        MessageType::Sub,
        MessageType::UnSub,
        MessageType::NoSub,
        MessageType::Added,
        MessageType::Changed,
        MessageType::Removed,
        MessageType::Ready,
        MessageType::AddedBefore,
        MessageType::MovedBefore,
        MessageType::Method,
        MessageType::Result,
        MessageType::Updated,
    ];

    /// Convert to the ordinal
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Convert from the ordinal
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        NAMES[*self as usize]
    }

    /// Wire name for a raw ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal` is not below [`MESSAGE_TYPE_COUNT`]. Ordinals
    /// never come off the wire, so an out-of-range value is a caller bug.
    pub fn name_of(ordinal: u8) -> &'static str {
        NAMES[ordinal as usize]
    }

    /// Render the discriminator as a JSON string literal (quoted).
    pub fn encode(&self) -> Vec<u8> {
        let name = self.as_str();
        let mut out = Vec::with_capacity(name.len() + 2);
        out.push(b'"');
        out.extend_from_slice(name.as_bytes());
        out.push(b'"');
        out
    }

    /// Parse a discriminator from its JSON string literal form.
    ///
    /// Anything that is not a JSON string with an exact name match fails
    /// with [`ProtocolError::UnknownMessageType`] carrying the raw input.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        match serde_json::from_slice::<String>(bytes) {
            Ok(name) => name.parse(),
            Err(_) => Err(ProtocolError::UnknownMessageType(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    /// Protocol phase this message type belongs to
    pub fn phase(&self) -> Phase {
        match self {
            MessageType::Connect | MessageType::Connected | MessageType::Failed => {
                Phase::Handshake
            }
            MessageType::Ping | MessageType::Pong => Phase::Heartbeat,
            MessageType::Sub | MessageType::UnSub | MessageType::NoSub | MessageType::Ready => {
                Phase::Subscription
            }
            MessageType::Added
            | MessageType::Changed
            | MessageType::Removed
            | MessageType::AddedBefore
            | MessageType::MovedBefore => Phase::CollectionSync,
            MessageType::Method | MessageType::Result | MessageType::Updated => {
                Phase::RemoteInvocation
            }
        }
    }
}

impl FromStr for MessageType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .position(|name| *name == s)
            .map(|ordinal| Self::ALL[ordinal])
            .ok_or_else(|| ProtocolError::UnknownMessageType(s.to_string()))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
