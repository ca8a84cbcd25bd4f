//! Message objects
//!
//! A message is one decoded unit of protocol input. Its payload is a
//! structured JSON value; when the payload is a JSON object its entries are
//! the message's named fields. What the fields mean is decided by whoever
//! routes the message, not by this crate.

use crate::descriptor::TypeKind;
use crate::error::ObjectError;
use crate::object::{typed_handle, Body, ObjectRef};
use core_types::MessageId;
use serde_json::{Map, Value};

/// Decoded message payload
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    body: Value,
}

impl Message {
    /// Creates a message around `body`
    pub fn new(body: Value) -> Self {
        Self {
            id: MessageId::new(),
            body,
        }
    }

    /// Creates a message from named fields
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self::new(Value::Object(fields))
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Returns the named fields, if the payload is a JSON object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.body.as_object()
    }

    /// Returns one named field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Checks whether the payload is a structurally empty container
    pub fn is_empty(&self) -> bool {
        is_structurally_empty(&self.body)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::from_fields(Map::new())
    }
}

/// Checks whether `value` is `{}` or `[]`
pub fn is_structurally_empty(value: &Value) -> bool {
    match value {
        Value::Object(fields) => fields.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

typed_handle!(
    /// Handle to a Message object
    MessageRef,
    TypeKind::Message
);

impl MessageRef {
    /// Wraps `message` in a new object
    pub fn new(message: Message) -> Self {
        Self(ObjectRef::with_body(Body::Message(message)))
    }

    /// Returns the message's id
    pub fn message_id(&self) -> Result<MessageId, ObjectError> {
        self.0.run(|message| message.id())
    }

    /// Returns a copy of the payload
    pub fn body(&self) -> Result<Value, ObjectError> {
        self.0.run(|message| message.body().clone())
    }

    /// Returns a copy of one named field
    pub fn field(&self, name: &str) -> Result<Option<Value>, ObjectError> {
        self.0.run(|message| message.field(name).cloned())
    }

    /// Returns a copy of the whole message
    pub fn to_message(&self) -> Result<Message, ObjectError> {
        self.0.run(Message::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MESSAGE_TYPE;
    use serde_json::json;

    #[test]
    fn test_message_fields() {
        let message = Message::new(json!({"action": "focus", "window": 3}));
        assert_eq!(message.field("action"), Some(&json!("focus")));
        assert_eq!(message.fields().map(|fields| fields.len()), Some(2));
        assert!(message.field("missing").is_none());
        assert!(!message.is_empty());
    }

    #[test]
    fn test_non_object_payload_has_no_fields() {
        let message = Message::new(json!([1, 2, 3]));
        assert!(message.fields().is_none());
        assert!(message.field("0").is_none());
    }

    #[test]
    fn test_structurally_empty() {
        assert!(is_structurally_empty(&json!({})));
        assert!(is_structurally_empty(&json!([])));
        assert!(!is_structurally_empty(&json!(null)));
        assert!(!is_structurally_empty(&json!({"a": 1})));
        assert!(Message::default().is_empty());
    }

    #[test]
    fn test_message_ref_accessors() {
        let message = Message::new(json!({"action": "close"}));
        let id = message.id();
        let handle = MessageRef::new(message);

        assert_eq!(handle.descriptor(), &MESSAGE_TYPE);
        assert_eq!(handle.message_id(), Ok(id));
        assert_eq!(handle.field("action"), Ok(Some(json!("close"))));
        assert_eq!(handle.body(), Ok(json!({"action": "close"})));
    }

    #[test]
    fn test_run_delivers_message() {
        let handle = MessageRef::new(Message::new(json!({"n": 2})));
        let doubled = handle
            .run(|message| message.field("n").and_then(Value::as_i64).map(|n| n * 2))
            .unwrap();
        assert_eq!(doubled, Some(4));
    }

    #[test]
    fn test_messages_hash_by_identity() {
        let a = MessageRef::new(Message::new(json!({"same": true})));
        let b = MessageRef::new(Message::new(json!({"same": true})));
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_dump_includes_payload() {
        let handle = MessageRef::new(Message::new(json!({"k": "v"})));
        let dump = handle.dump().unwrap();
        assert!(dump.starts_with("Message obj#"));
        assert!(dump.contains(r#"{"k":"v"}"#));
    }
}
