use serde::Serialize;

use super::case::{KeyEncodingStrategy, NilEncodingStrategy};
use crate::error::DataError;
use crate::value::Value;

/// Turns a serializable struct into ordered `(column, value)` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowEncoder {
    pub key_strategy: KeyEncodingStrategy,
    pub nil_strategy: NilEncodingStrategy,
}

impl RowEncoder {
    pub fn new(key_strategy: KeyEncodingStrategy, nil_strategy: NilEncodingStrategy) -> Self {
        Self {
            key_strategy,
            nil_strategy,
        }
    }

    /// Encode `model`, preserving the struct's field order.
    pub fn encode<T: Serialize + ?Sized>(&self, model: &T) -> Result<Vec<(String, Value)>, DataError> {
        let json = serde_json::to_value(model).map_err(|e| DataError::Encode(e.to_string()))?;
        let serde_json::Value::Object(map) = json else {
            return Err(DataError::Encode(format!(
                "expected a struct, got {}",
                json_kind(&json)
            )));
        };
        let mut out = Vec::with_capacity(map.len());
        for (key, value) in map {
            if value.is_null() && self.nil_strategy == NilEncodingStrategy::Omit {
                continue;
            }
            out.push((self.key_strategy.apply(&key), Value::from(value)));
        }
        Ok(out)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
