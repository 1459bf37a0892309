//! The JSON records exchanged with the server once per frame.

use std::collections::{BTreeMap, HashMap};

use tinyjson::JsonValue;

use crate::error::TransportError;

/// Keyboard state sent to the server: `"key<code>"` for every key that is
/// currently held down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboundState {
    keys: BTreeMap<String, bool>,
}

fn key_name(code: u32) -> String {
    format!("key{code}")
}

impl OutboundState {
    pub fn key_down(&mut self, code: u32) {
        self.keys.insert(key_name(code), true);
    }

    /// Removing a key that isn't held is a no-op.
    pub fn key_up(&mut self, code: u32) {
        self.keys.remove(&key_name(code));
    }

    pub fn is_pressed(&self, code: u32) -> bool {
        self.keys.get(&key_name(code)).copied().unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.keys.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        let object: HashMap<String, JsonValue> = self
            .keys
            .iter()
            .map(|(key, &pressed)| (key.clone(), JsonValue::Boolean(pressed)))
            .collect();
        JsonValue::Object(object)
            .stringify()
            .map_err(|err| TransportError::Serialize(err.to_string()))
    }

    /// Parses an object of booleans, as written by [`OutboundState::to_json`].
    pub fn from_json(json: &str) -> Result<OutboundState, TransportError> {
        let value: JsonValue = json
            .parse()
            .map_err(|err: tinyjson::JsonParseError| TransportError::MalformedResponse(err.to_string()))?;
        let JsonValue::Object(object) = value else {
            return Err(TransportError::MalformedResponse(
                "expected a JSON object".to_string(),
            ));
        };
        let mut keys = BTreeMap::new();
        for (key, value) in object {
            let JsonValue::Boolean(pressed) = value else {
                return Err(TransportError::MalformedResponse(format!(
                    "value of \"{key}\" is not a boolean"
                )));
            };
            keys.insert(key, pressed);
        }
        Ok(OutboundState { keys })
    }
}

/// Whatever the server last answered with. The scene stores it without
/// interpreting it.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundState(JsonValue);

impl Default for InboundState {
    fn default() -> Self {
        InboundState(JsonValue::Null)
    }
}

impl InboundState {
    pub fn new(value: JsonValue) -> InboundState {
        InboundState(value)
    }

    pub fn from_json(json: &str) -> Result<InboundState, TransportError> {
        json.parse()
            .map(InboundState)
            .map_err(|err: tinyjson::JsonParseError| TransportError::MalformedResponse(err.to_string()))
    }

    pub fn value(&self) -> &JsonValue {
        &self.0
    }

    /// Looks up a top-level field if the state is a JSON object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match &self.0 {
            JsonValue::Object(object) => object.get(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_round_trips_through_json() {
        let mut state = OutboundState::default();
        state.key_down(65);
        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"key65":true}"#);
        assert_eq!(OutboundState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn empty_outbound_is_empty_object() {
        assert_eq!(OutboundState::default().to_json().unwrap(), "{}");
    }

    #[test]
    fn key_up_removes_key() {
        let mut state = OutboundState::default();
        state.key_down(65);
        state.key_down(65);
        assert_eq!(state.len(), 1);
        state.key_up(65);
        assert_eq!(state.get("key65"), None);
        state.key_up(65);
        state.key_up(66);
        assert!(state.is_empty());
    }

    #[test]
    fn rejects_non_boolean_keys() {
        assert!(matches!(
            OutboundState::from_json(r#"{"key65": 1}"#),
            Err(TransportError::MalformedResponse(_))
        ));
        assert!(OutboundState::from_json("[true]").is_err());
    }

    #[test]
    fn inbound_parses_any_json() {
        let inbound = InboundState::from_json(r#"{"score": 3, "players": []}"#).unwrap();
        assert_eq!(inbound.get("score"), Some(&JsonValue::Number(3.0)));
        assert_eq!(inbound.get("missing"), None);
        assert!(InboundState::from_json("{not json").is_err());
        assert_eq!(InboundState::default().value(), &JsonValue::Null);
    }
}
