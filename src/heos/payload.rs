use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::DecodeError;

pub type Record = BTreeMap<String, String>;

pub type PayloadResponse = Vec<Record>;

enum PayloadValue {
    Text(String),
    Number(f64),
}

impl PayloadValue {
    fn classify(key: &str, value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Number(ref number) => number
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| unexpected(key, &value)),
            other => Err(unexpected(key, &other)),
        }
    }

    fn render(self) -> String {
        match self {
            Self::Text(text) => text,
            // f64 Display is the shortest round-trip form and never uses an exponent.
            Self::Number(number) => number.to_string(),
        }
    }
}

fn unexpected(key: &str, value: &Value) -> DecodeError {
    DecodeError::UnexpectedValue {
        key: key.to_owned(),
        value: value.to_string(),
    }
}

/// Normalizes payload entries so every value is a string.
///
/// Strings are copied verbatim and numbers are rendered from their `f64`
/// value. Booleans, null, objects and arrays fail the whole payload.
pub fn parse_payload(entries: Vec<Map<String, Value>>) -> Result<PayloadResponse, DecodeError> {
    entries
        .into_iter()
        .map(|entry| {
            entry
                .into_iter()
                .map(|(key, value)| {
                    PayloadValue::classify(&key, value).map(|value| (key, value.render()))
                })
                .collect::<Result<Record, _>>()
        })
        .collect()
}
