use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid response json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed command: {command:?} is not a group/command path")]
    MalformedCommand { command: String },
    #[error("malformed message: {message}")]
    MalformedMessage { message: String },
    #[error("key {key}: value not string nor number: {value}")]
    UnexpectedValue { key: String, value: String },
}

/// Failure reported by the device itself in a `fail` response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device reported error {}: {text}", eid_label(.eid))]
pub struct DeviceError {
    pub eid: Option<i64>,
    pub text: String,
}

fn eid_label(eid: &Option<i64>) -> String {
    eid.map_or_else(|| "?".to_owned(), |eid| eid.to_string())
}
