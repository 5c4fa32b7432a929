//! ddp-protocol: Message model for the DDP data-sync protocol
//!
//! This crate defines the messages a client and server exchange over a
//! persistent channel (typically a WebSocket): handshake, heartbeats,
//! subscription lifecycle, collection updates and remote method calls,
//! together with their JSON wire encoding. Transport, subscription
//! bookkeeping and dispatch are left to the caller.

pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod message_type;
pub mod serde_utils;
pub mod version;

pub use codec::{decode, decode_str, decode_value, encode, encode_to_vec, MessageCodec};
pub use config::CodecConfig;
pub use error::{ConfigError, DdpError, ProtocolError};
pub use message::{
    Added, AddedBefore, Changed, Connect, Connected, Failed, Fields, Message, Method,
    MethodResult, MovedBefore, NoSub, Ping, Pong, Ready, Removed, Sub, TypedMessage, UnSub,
    Updated,
};
pub use message_type::{MessageType, Phase};
pub use serde_json::Value;
pub use version::{PROTOCOL_VERSION, SUPPORTED_VERSIONS};
