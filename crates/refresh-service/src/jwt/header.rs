use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JOSE header: an ordered JSON object of header parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoseHeader(Map<String, Value>);

impl JoseHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style parameter insertion.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn algorithm(&self) -> Option<&str> {
        self.get_str("alg")
    }

    pub fn key_id(&self) -> Option<&str> {
        self.get_str("kid")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Map<String, Value>> for JoseHeader {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
