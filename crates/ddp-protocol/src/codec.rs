//! JSON codec for protocol messages
//!
//! [`encode`] and [`decode`] convert single messages to and from their JSON
//! text, for transports that already deliver whole payloads (WebSocket
//! text frames). [`MessageCodec`] adds newline-delimited framing for byte
//! streams.

use bytes::{BufMut, BytesMut};
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::CodecConfig;
use crate::error::ProtocolError;
use crate::message::Message;
use crate::message_type::MessageType;

/// Frame delimiter used by [`MessageCodec`]
const DELIMITER: u8 = b'\n';

/// Encode a message to its JSON text
pub fn encode(message: &Message) -> Result<String, ProtocolError> {
    let text = serde_json::to_string(message)?;
    tracing::trace!(msg = %message.message_type(), len = text.len(), "Encoded message");
    Ok(text)
}

/// Encode a message to JSON bytes
pub fn encode_to_vec(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    encode(message).map(String::into_bytes)
}

/// Decode a message from JSON bytes
pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_value(value)
}

/// Decode a message from JSON text
pub fn decode_str(text: &str) -> Result<Message, ProtocolError> {
    decode(text.as_bytes())
}

/// Decode a message from an already parsed JSON value.
///
/// The discriminator is resolved first, so an unknown `msg` is reported as
/// [`ProtocolError::UnknownMessageType`] rather than a generic serde error.
/// Fields not used by the variant are ignored.
pub fn decode_value(value: Value) -> Result<Message, ProtocolError> {
    let msg_type = peek_message_type(&value)?;

    let message = serde_json::from_value(value).map_err(|source| {
        tracing::debug!(msg = %msg_type, error = %source, "Malformed message");
        ProtocolError::Malformed { msg_type, source }
    })?;

    tracing::trace!(msg = %msg_type, "Decoded message");
    Ok(message)
}

/// Read the `msg` discriminator of a JSON payload without decoding the rest
pub fn peek_message_type(value: &Value) -> Result<MessageType, ProtocolError> {
    let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

    match object.get("msg") {
        None => Err(ProtocolError::MissingMessageType),
        Some(Value::String(name)) => name.parse().map_err(|err| {
            tracing::debug!(msg = %name, "Unknown message type");
            err
        }),
        Some(other) => {
            tracing::debug!(msg = %other, "Non-string message type");
            Err(ProtocolError::UnknownMessageType(other.to_string()))
        }
    }
}

/// Codec framing messages as newline-delimited JSON
#[derive(Debug)]
pub struct MessageCodec {
    /// Maximum encoded size of one message
    max_frame_size: usize,
    /// Bytes of the buffer already searched for a delimiter
    next_index: usize,
    /// Skipping the rest of an oversize frame
    discarding: bool,
}

impl MessageCodec {
    /// Create a codec with the default configuration
    pub fn new() -> Self {
        Self::with_config(&CodecConfig::default())
    }

    /// Create a codec from a configuration
    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            max_frame_size: config.max_frame_size,
            next_index: 0,
            discarding: false,
        }
    }

    /// Maximum encoded size of one message
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn check_size(&self, size: usize) -> Result<(), ProtocolError> {
        if size > self.max_frame_size {
            tracing::debug!(size, max = self.max_frame_size, "Frame too large");
            return Err(ProtocolError::PayloadTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a trailing carriage return left by `\r\n` delimiters
fn trim_frame(frame: &[u8]) -> &[u8] {
    frame.strip_suffix(b"\r").unwrap_or(frame)
}

fn is_blank(frame: &[u8]) -> bool {
    frame.iter().all(u8::is_ascii_whitespace)
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let delimiter = src[self.next_index..]
                .iter()
                .position(|b| *b == DELIMITER)
                .map(|offset| self.next_index + offset);

            let Some(end) = delimiter else {
                // A trailing `\r` may be the first half of a `\r\n` delimiter
                let size = trim_frame(&src[..]).len();
                if size > self.max_frame_size {
                    // Drop what we have and skip to the next delimiter
                    src.clear();
                    self.next_index = 0;
                    if !self.discarding {
                        self.discarding = true;
                        self.check_size(size)?;
                    }
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(end + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            let frame = trim_frame(&line[..end]);
            if is_blank(frame) {
                continue;
            }
            self.check_size(frame.len())?;

            return decode(frame).map(Some);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        // Final frame without a trailing delimiter
        let rest = src.split_to(src.len());
        self.next_index = 0;
        if std::mem::take(&mut self.discarding) {
            return Ok(None);
        }

        let frame = trim_frame(&rest);
        if is_blank(frame) {
            return Ok(None);
        }
        decode(frame).map(Some)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Message>::encode(self, &message, dst)
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = encode_to_vec(message)?;
        self.check_size(payload.len())?;

        dst.reserve(payload.len() + 1);
        dst.extend_from_slice(&payload);
        dst.put_u8(DELIMITER);

        Ok(())
    }
}
