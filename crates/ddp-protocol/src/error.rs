//! Protocol error types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message_type::MessageType;
use crate::serde_utils;

/// Errors that can occur while encoding or decoding messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The `msg` discriminator did not match any known message type
    #[error("Unknown message type: {0:?}")]
    UnknownMessageType(String),

    /// The payload has no `msg` field
    #[error("Missing message type field")]
    MissingMessageType,

    /// The payload is valid JSON but not an object
    #[error("Message is not a JSON object")]
    NotAnObject,

    /// The discriminator was accepted but the fields do not fit the variant
    #[error("Malformed {msg_type} message: {source}")]
    Malformed {
        msg_type: MessageType,
        source: serde_json::Error,
    },

    /// Frame exceeds the configured maximum size
    #[error("Payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Error reported by a peer inside `nosub` and `result` messages.
///
/// This is passive data: the message layer never interprets it, only
/// carries it through encode/decode unchanged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}")]
#[serde(rename_all = "camelCase")]
pub struct DdpError {
    /// Short error code (`"404"`, `"not-authorized"`, ...)
    #[serde(
        rename = "error",
        default,
        deserialize_with = "serde_utils::string_or_number"
    )]
    pub code: String,

    /// Human-readable reason
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub reason: String,

    /// Optional free-text detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Error classifier, e.g. `"Meteor.Error"`
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub error_type: String,

    /// Echo of the input that caused the failure, kept for diagnostics
    #[serde(
        default,
        deserialize_with = "serde_utils::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub offending_message: Option<Value>,
}

impl DdpError {
    /// Create an error with a code and reason
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
            message: None,
            error_type: String::new(),
            offending_message: None,
        }
    }

    /// Attach a free-text message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the error classifier
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    /// Attach the offending input
    pub fn with_offending_message(mut self, offending: Value) -> Self {
        self.offending_message = Some(offending);
        self
    }
}
