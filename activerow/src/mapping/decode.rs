use std::collections::HashMap;

use serde::de::DeserializeOwned;

use super::case::{from_snake_case, to_snake_case, KeyDecodingStrategy};
use super::introspect::field_names;
use crate::database::Row;
use crate::error::DataError;

/// Turns result rows into any `DeserializeOwned` type by column name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowDecoder {
    pub key_strategy: KeyDecodingStrategy,
}

impl RowDecoder {
    pub fn new(key_strategy: KeyDecodingStrategy) -> Self {
        Self { key_strategy }
    }

    pub fn decode<T: DeserializeOwned>(&self, row: &Row) -> Result<T, DataError> {
        let keys = self.key_map::<T>();
        decode_with(row, &keys)
    }

    /// Decode a batch of rows, resolving the column mapping once.
    pub fn decode_all<T: DeserializeOwned>(&self, rows: &[Row]) -> Result<Vec<T>, DataError> {
        let keys = self.key_map::<T>();
        rows.iter().map(|row| decode_with(row, &keys)).collect()
    }

    fn key_map<T: DeserializeOwned>(&self) -> KeyMap {
        match self.key_strategy {
            KeyDecodingStrategy::UseDefaultKeys => KeyMap::Verbatim,
            KeyDecodingStrategy::ConvertFromSnakeCase => KeyMap::Fields(
                field_names::<T>()
                    .iter()
                    .map(|field| (to_snake_case(field), *field))
                    .collect(),
            ),
        }
    }
}

enum KeyMap {
    Verbatim,
    /// snake_case column -> declared serde field name.
    Fields(HashMap<String, &'static str>),
}

impl KeyMap {
    fn field_for(&self, column: &str) -> String {
        match self {
            KeyMap::Verbatim => column.to_string(),
            KeyMap::Fields(fields) => match fields.get(column) {
                Some(field) => (*field).to_string(),
                None => from_snake_case(column),
            },
        }
    }
}

fn decode_with<T: DeserializeOwned>(row: &Row, keys: &KeyMap) -> Result<T, DataError> {
    let mut map = serde_json::Map::with_capacity(row.len());
    for (column, value) in row.iter() {
        map.insert(keys.field_for(column), value.to_json());
    }
    serde_json::from_value(serde_json::Value::Object(map))
        .map_err(|e| DataError::Decode(e.to_string()))
}
