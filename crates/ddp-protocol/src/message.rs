//! Message types for the DDP protocol
//!
//! Each message is a flat JSON object whose `msg` field names the variant,
//! with the variant's own fields alongside it:
//!
//! ```text
//! {"msg":"sub","id":"1","name":"todos","params":[]}
//! ```
//!
//! # Message Flow
//!
//! 1. Client sends `connect`, server answers `connected` or `failed`
//! 2. Either side may send `ping`; the other echoes the id in `pong`
//! 3. Client sends `sub`; server streams collection data (`added`,
//!    `changed`, `removed`, `addedBefore`, `movedBefore`) and then `ready`,
//!    or refuses with `nosub`. `unsub` tears a subscription down.
//! 4. Client sends `method`; server answers with exactly one `result` and,
//!    separately, `updated` once the method's writes are reflected in the
//!    collection data
//!
//! The tag is never stored: it is a function of the variant, so a payload
//! shape and its discriminator cannot drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DdpError;
use crate::message_type::MessageType;
use crate::serde_utils;
use crate::version::{PROTOCOL_VERSION, SUPPORTED_VERSIONS};

/// Document field map
pub type Fields = Map<String, Value>;

/// Client handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connect {
    /// Session to resume, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Proposed protocol version
    pub version: String,
    /// Versions the client supports, in order of preference
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub support: Vec<String>,
}

impl Connect {
    /// Handshake proposing the newest protocol version
    pub fn latest(session: Option<String>) -> Self {
        Self {
            session,
            version: PROTOCOL_VERSION.to_string(),
            support: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Handshake accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connected {
    pub session: String,
}

/// Handshake rejected; carries the version the server would accept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failed {
    pub version: String,
}

/// Heartbeat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    /// Correlation token; `None` is an uncorrelated keepalive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Heartbeat reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pong {
    /// Echo of the ping's correlation token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Subscribe to a publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sub {
    pub id: String,
    /// Publication name
    pub name: String,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub params: Vec<Value>,
}

/// Tear down a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnSub {
    pub id: String,
}

/// Subscription refused, or stopped by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoSub {
    pub id: String,
    /// Why the subscription failed; absent when it simply ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DdpError>,
}

/// Document added to a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Added {
    pub collection: String,
    pub id: String,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub fields: Fields,
}

/// Partial document update.
///
/// `fields` holds new or updated values; `cleared` names fields that were
/// removed. A field in neither list is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changed {
    pub collection: String,
    pub id: String,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub fields: Fields,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub cleared: Vec<String>,
}

/// Document removed from a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removed {
    pub collection: String,
    pub id: String,
}

/// Subscriptions that have delivered their initial data set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ready {
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub subs: Vec<String>,
}

/// Document added to an ordered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedBefore {
    pub collection: String,
    pub id: String,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub fields: Fields,
    /// Document that now follows this one; `None` appends at the end.
    /// Always written, as `null` when `None`.
    #[serde(default)]
    pub before: Option<String>,
}

/// Document moved within an ordered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovedBefore {
    pub collection: String,
    pub id: String,
    /// Document that now follows this one; `None` moves it to the end
    #[serde(default)]
    pub before: Option<String>,
}

/// Remote method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Method name
    pub method: String,
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub params: Vec<Value>,
    /// Call id, echoed by `result` and listed in `updated`
    pub id: String,
    /// Seed for replaying pseudo-random values on the server
    #[serde(
        default,
        deserialize_with = "serde_utils::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub random_seed: Option<Value>,
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Id of the `method` call this answers
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DdpError>,
    /// Return value. `Some(Value::Null)` is an explicit `null`; `None`
    /// means the method returned nothing and the key is left out.
    #[serde(
        default,
        deserialize_with = "serde_utils::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
}

impl MethodResult {
    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Split into the call's return value or its error
    pub fn into_result(self) -> Result<Option<Value>, DdpError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}

/// Method calls whose writes are now visible in collection data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Updated {
    #[serde(default, deserialize_with = "serde_utils::null_as_default")]
    pub methods: Vec<String>,
}

/// Protocol messages
///
/// The serde tags below must spell the same names as the `MessageType`
/// table; `test_message_type_matches_wire_tag` checks every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", rename_all = "camelCase")]
pub enum Message {
    Connect(Connect),
    Connected(Connected),
    Failed(Failed),
    Ping(Ping),
    Pong(Pong),
    Sub(Sub),
    #[serde(rename = "unsub")]
    UnSub(UnSub),
    #[serde(rename = "nosub")]
    NoSub(NoSub),
    Added(Added),
    Changed(Changed),
    Removed(Removed),
    Ready(Ready),
    AddedBefore(AddedBefore),
    MovedBefore(MovedBefore),
    Method(Method),
    Result(MethodResult),
    Updated(Updated),
}

impl Message {
    /// Get the message type for this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Connect(_) => MessageType::Connect,
            Message::Connected(_) => MessageType::Connected,
            Message::Failed(_) => MessageType::Failed,
            Message::Ping(_) => MessageType::Ping,
            Message::Pong(_) => MessageType::Pong,
            Message::Sub(_) => MessageType::Sub,
            Message::UnSub(_) => MessageType::UnSub,
            Message::NoSub(_) => MessageType::NoSub,
            Message::Added(_) => MessageType::Added,
            Message::Changed(_) => MessageType::Changed,
            Message::Removed(_) => MessageType::Removed,
            Message::Ready(_) => MessageType::Ready,
            Message::AddedBefore(_) => MessageType::AddedBefore,
            Message::MovedBefore(_) => MessageType::MovedBefore,
            Message::Method(_) => MessageType::Method,
            Message::Result(_) => MessageType::Result,
            Message::Updated(_) => MessageType::Updated,
        }
    }

    /// Whether this message is of the given type
    pub fn is(&self, msg_type: MessageType) -> bool {
        self.message_type() == msg_type
    }

    /// `(collection, id)` of the document a collection-sync message addresses
    pub fn document_key(&self) -> Option<(&str, &str)> {
        match self {
            Message::Added(m) => Some((&m.collection, &m.id)),
            Message::Changed(m) => Some((&m.collection, &m.id)),
            Message::Removed(m) => Some((&m.collection, &m.id)),
            Message::AddedBefore(m) => Some((&m.collection, &m.id)),
            Message::MovedBefore(m) => Some((&m.collection, &m.id)),
            _ => None,
        }
    }

    /// `connect` proposing `version`, optionally resuming `session`
    pub fn connect(
        session: Option<String>,
        version: impl Into<String>,
        support: Vec<String>,
    ) -> Self {
        Message::Connect(Connect {
            session,
            version: version.into(),
            support,
        })
    }

    /// `connected` for an established session
    pub fn connected(session: impl Into<String>) -> Self {
        Message::Connected(Connected {
            session: session.into(),
        })
    }

    /// `failed`, naming the version the server would accept
    pub fn failed(version: impl Into<String>) -> Self {
        Message::Failed(Failed {
            version: version.into(),
        })
    }

    /// `ping`, with an optional correlation id
    pub fn ping(id: Option<String>) -> Self {
        Message::Ping(Ping { id })
    }

    /// `pong` echoing a ping's id
    pub fn pong(id: Option<String>) -> Self {
        Message::Pong(Pong { id })
    }

    /// `sub` to publication `name`
    pub fn sub(id: impl Into<String>, name: impl Into<String>, params: Vec<Value>) -> Self {
        Message::Sub(Sub {
            id: id.into(),
            name: name.into(),
            params,
        })
    }

    /// `unsub` for subscription `id`
    pub fn unsub(id: impl Into<String>) -> Self {
        Message::UnSub(UnSub { id: id.into() })
    }

    /// `nosub` for subscription `id`
    pub fn nosub(id: impl Into<String>, error: Option<DdpError>) -> Self {
        Message::NoSub(NoSub {
            id: id.into(),
            error,
        })
    }

    /// `added` document
    pub fn added(collection: impl Into<String>, id: impl Into<String>, fields: Fields) -> Self {
        Message::Added(Added {
            collection: collection.into(),
            id: id.into(),
            fields,
        })
    }

    /// `changed`: `fields` set or updated, `cleared` removed
    pub fn changed(
        collection: impl Into<String>,
        id: impl Into<String>,
        fields: Fields,
        cleared: Vec<String>,
    ) -> Self {
        Message::Changed(Changed {
            collection: collection.into(),
            id: id.into(),
            fields,
            cleared,
        })
    }

    /// `removed` document
    pub fn removed(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Message::Removed(Removed {
            collection: collection.into(),
            id: id.into(),
        })
    }

    /// `ready` for the listed subscriptions
    pub fn ready(subs: Vec<String>) -> Self {
        Message::Ready(Ready { subs })
    }

    /// `addedBefore`; `before: None` appends at the end
    pub fn added_before(
        collection: impl Into<String>,
        id: impl Into<String>,
        fields: Fields,
        before: Option<String>,
    ) -> Self {
        Message::AddedBefore(AddedBefore {
            collection: collection.into(),
            id: id.into(),
            fields,
            before,
        })
    }

    /// `movedBefore`; `before: None` moves to the end
    pub fn moved_before(
        collection: impl Into<String>,
        id: impl Into<String>,
        before: Option<String>,
    ) -> Self {
        Message::MovedBefore(MovedBefore {
            collection: collection.into(),
            id: id.into(),
            before,
        })
    }

    /// `method` call with call id `id`
    pub fn method(
        method: impl Into<String>,
        params: Vec<Value>,
        id: impl Into<String>,
        random_seed: Option<Value>,
    ) -> Self {
        Message::Method(Method {
            method: method.into(),
            params,
            id: id.into(),
            random_seed,
        })
    }

    /// `result` answering method call `id`
    pub fn result(id: impl Into<String>, error: Option<DdpError>, result: Option<Value>) -> Self {
        Message::Result(MethodResult {
            id: id.into(),
            error,
            result,
        })
    }

    /// `updated` for the listed method calls
    pub fn updated(methods: Vec<String>) -> Self {
        Message::Updated(Updated { methods })
    }
}

/// A concrete message payload with a fixed message type
pub trait TypedMessage: Into<Message> {
    /// Message type of every value of this payload
    const MESSAGE_TYPE: MessageType;

    fn message_type(&self) -> MessageType {
        Self::MESSAGE_TYPE
    }
}

macro_rules! typed_messages {
    ($($payload:ident => $variant:ident),* $(,)?) => {
        $(
            impl TypedMessage for $payload {
                const MESSAGE_TYPE: MessageType = MessageType::$variant;
            }

            impl From<$payload> for Message {
                fn from(payload: $payload) -> Self {
                    Message::$variant(payload)
                }
            }
        )*
    };
}

typed_messages! {
    Connect => Connect,
    Connected => Connected,
    Failed => Failed,
    Ping => Ping,
    Pong => Pong,
    Sub => Sub,
    UnSub => UnSub,
    NoSub => NoSub,
    Added => Added,
    Changed => Changed,
    Removed => Removed,
    Ready => Ready,
    AddedBefore => AddedBefore,
    MovedBefore => MovedBefore,
    Method => Method,
    MethodResult => Result,
    Updated => Updated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    /// One instance of every variant, in ordinal order
    fn samples() -> Vec<Message> {
        vec![
            Message::connect(None, "1", vec!["1".into(), "pre2".into()]),
            Message::connected("abc"),
            Message::failed("1"),
            Message::ping(Some("p1".into())),
            Message::pong(None),
            Message::sub("1", "todos", vec![json!(10)]),
            Message::unsub("1"),
            Message::nosub("1", None),
            Message::added("todos", "t1", fields(json!({"title": "milk"}))),
            Message::changed("todos", "t1", Fields::new(), vec!["done".into()]),
            Message::removed("todos", "t1"),
            Message::ready(vec!["1".into()]),
            Message::added_before("todos", "t2", Fields::new(), Some("t1".into())),
            Message::moved_before("todos", "t2", None),
            Message::method("add", vec![json!(1), json!(2)], "m1", None),
            Message::result("m1", None, Some(json!(3))),
            Message::updated(vec!["m1".into()]),
        ]
    }

    #[test]
    fn test_message_type_matches_wire_tag() {
        let samples = samples();
        assert_eq!(samples.len(), MessageType::ALL.len());
        for (message, expected) in samples.iter().zip(MessageType::ALL) {
            assert_eq!(message.message_type(), expected);
            let value = serde_json::to_value(message).unwrap();
            assert_eq!(value["msg"], json!(expected.as_str()));
        }
    }

    #[test]
    fn test_typed_message_constant() {
        assert_eq!(MethodResult::MESSAGE_TYPE, MessageType::Result);
        let sub = Sub {
            id: "1".into(),
            name: "todos".into(),
            params: vec![],
        };
        assert_eq!(sub.message_type(), MessageType::Sub);
        let message: Message = sub.into();
        assert!(message.is(MessageType::Sub));
    }

    #[test]
    fn test_flat_layout() {
        let value = serde_json::to_value(Message::removed("todos", "t1")).unwrap();
        assert_eq!(
            value,
            json!({"msg": "removed", "collection": "todos", "id": "t1"})
        );
    }

    #[test]
    fn test_before_null_is_written() {
        let value = serde_json::to_value(Message::moved_before("todos", "t2", None)).unwrap();
        assert_eq!(
            value,
            json!({"msg": "movedBefore", "collection": "todos", "id": "t2", "before": null})
        );
    }

    #[test]
    fn test_method_random_seed_key() {
        let value = serde_json::to_value(Message::method(
            "insert",
            vec![],
            "2",
            Some(json!("seed")),
        ))
        .unwrap();
        assert_eq!(value["randomSeed"], json!("seed"));

        let value = serde_json::to_value(Message::method("insert", vec![], "2", None)).unwrap();
        assert!(value.get("randomSeed").is_none());
    }

    #[test]
    fn test_connect_latest() {
        let connect = Connect::latest(None);
        assert_eq!(connect.version, PROTOCOL_VERSION);
        assert_eq!(connect.support, vec!["1", "pre2", "pre1"]);
        let value = serde_json::to_value(Message::from(connect)).unwrap();
        assert!(value.get("session").is_none());
    }

    #[test]
    fn test_document_key() {
        let message = Message::changed("todos", "t1", Fields::new(), vec![]);
        assert_eq!(message.document_key(), Some(("todos", "t1")));
        assert_eq!(Message::ready(vec![]).document_key(), None);
    }

    #[test]
    fn test_method_result_into_result() {
        let ok = MethodResult {
            id: "1".into(),
            error: None,
            result: Some(json!({"n": 1})),
        };
        assert!(!ok.is_error());
        assert_eq!(ok.into_result().unwrap(), Some(json!({"n": 1})));

        let failed = MethodResult {
            id: "2".into(),
            error: Some(DdpError::new("500", "Internal server error")),
            result: None,
        };
        assert!(failed.is_error());
        assert_eq!(failed.into_result().unwrap_err().code, "500");
    }
}
