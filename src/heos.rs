//! HEOS CLI response decoding.
//!
//! A device answers every command with a JSON envelope `{"heos": {...},
//! "payload": [...]}`. Two of its fields carry their own small grammars:
//! `heos.command` is a `group/command` path and `heos.message` is a
//! `key=value&key=value` string. Payload values arrive as strings or numbers
//! and are normalized to strings.
//!
//! Decoding is all-or-nothing: any stage that fails aborts the whole
//! response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

mod command;
mod error;
mod frame;
mod message;
mod payload;

pub use command::{parse_command, CommandIdentifier};
pub use error::{DecodeError, DeviceError};
pub use frame::trim_frame;
pub use message::{parse_message, Message};
pub use payload::{parse_payload, PayloadResponse, Record};

/// Message a device sends while a long-running command is still in flight.
pub const UNDER_PROCESS: &str = "command under process";

const SUCCESS: &str = "success";
const FAIL: &str = "fail";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub heos: HeosResponse,
    pub payload: PayloadResponse,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HeosResponse {
    pub command: CommandIdentifier,
    pub result: String,
    pub message: Message,
    /// `heos.message` as received, before pair parsing.
    #[serde(skip)]
    pub raw_message: String,
}

#[derive(Deserialize, Debug)]
struct Envelope {
    heos: Header,
    #[serde(default, deserialize_with = "null_as_default")]
    payload: Vec<Option<Map<String, Value>>>,
}

#[derive(Deserialize, Debug)]
struct Header {
    command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    result: String,
    #[serde(default, deserialize_with = "null_as_default")]
    message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<Header> for HeosResponse {
    type Error = DecodeError;

    fn try_from(header: Header) -> Result<Self, Self::Error> {
        Ok(Self {
            command: parse_command(&header.command)?,
            result: header.result,
            message: parse_message(&header.message)?,
            raw_message: header.message,
        })
    }
}

impl TryFrom<Envelope> for Response {
    type Error = DecodeError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        Ok(Self {
            heos: envelope.heos.try_into()?,
            payload: parse_payload(
                envelope
                    .payload
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            )?,
        })
    }
}

/// Decodes one raw response frame, ignoring trailing NUL padding.
pub fn decode(raw: &[u8]) -> Result<Response, DecodeError> {
    let frame = trim_frame(raw);
    trace!(
        len = frame.len(),
        padding = raw.len() - frame.len(),
        "decoding heos frame"
    );
    let envelope: Envelope = serde_json::from_slice(frame)?;
    let response = Response::try_from(envelope)?;
    debug!(
        command = %response.heos.command,
        result = %response.heos.result,
        records = response.payload.len(),
        "decoded heos response"
    );
    Ok(response)
}

impl HeosResponse {
    pub fn is_success(&self) -> bool {
        self.result == SUCCESS
    }

    pub fn is_failure(&self) -> bool {
        self.result == FAIL
    }

    /// Unsolicited change notifications live under the `event` group.
    pub fn is_event(&self) -> bool {
        self.command.group == "event"
    }

    pub fn is_under_process(&self) -> bool {
        self.raw_message.starts_with(UNDER_PROCESS)
    }

    /// The `eid`/`text` pair of a failed response.
    pub fn error(&self) -> Option<DeviceError> {
        if !self.is_failure() {
            return None;
        }
        Some(DeviceError {
            eid: self.message.get("eid").and_then(|eid| eid.parse().ok()),
            text: self.message.get("text").cloned().unwrap_or_default(),
        })
    }
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.heos.is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.heos.is_failure()
    }

    pub fn is_event(&self) -> bool {
        self.heos.is_event()
    }

    pub fn is_under_process(&self) -> bool {
        self.heos.is_under_process()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_envelope() {
        let raw = br#"{"heos":{"command":"player/get_players","result":"success","message":"pid=1&name=Zone"},"payload":[{"pid":1}]}"#;
        let response = decode(raw).unwrap();
        assert_eq!(
            response.heos.command,
            CommandIdentifier::new("player", "get_players")
        );
        assert_eq!(response.heos.result, "success");
        assert_eq!(response.heos.message["pid"], "1");
        assert_eq!(response.heos.message["name"], "Zone");
        assert_eq!(response.heos.raw_message, "pid=1&name=Zone");
        assert_eq!(response.payload.len(), 1);
        assert_eq!(response.payload[0]["pid"], "1");
        assert!(response.is_success());
        assert!(!response.is_failure());
    }

    #[test]
    fn missing_or_null_payload_is_empty() {
        let missing = decode(br#"{"heos":{"command":"system/heart_beat","result":"success","message":""}}"#)
            .unwrap();
        assert!(missing.payload.is_empty());
        let null = decode(br#"{"heos":{"command":"system/heart_beat","result":"success","message":""},"payload":null}"#)
            .unwrap();
        assert!(null.payload.is_empty());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let response = decode(
            br#"{"heos":{"command":"system/heart_beat","result":null,"message":null},"payload":[null,{"pid":1}]}"#,
        )
        .unwrap();
        assert_eq!(response.heos.result, "");
        assert_eq!(response.heos.raw_message, "");
        assert!(response.heos.message.is_empty());
        assert_eq!(response.payload.len(), 2);
        assert!(response.payload[0].is_empty());
        assert_eq!(response.payload[1]["pid"], "1");
    }

    #[test]
    fn event_without_result_decodes() {
        let response = decode(
            br#"{"heos":{"command":"event/player_state_changed","message":"pid=5&state=play"}}"#,
        )
        .unwrap();
        assert!(response.is_event());
        assert_eq!(response.heos.result, "");
        assert_eq!(response.heos.message["state"], "play");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let response = decode(
            br#"{"heos":{"command":"a/b","result":"success","message":"","extra":1},"options":[]}"#,
        )
        .unwrap();
        assert_eq!(response.heos.command.to_string(), "a/b");
    }

    #[test]
    fn mismatched_field_types_are_json_errors() {
        let err = decode(br#"{"heos":{"command":7,"result":"success","message":""}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        let err = decode(br#"{"heos":{"command":"a/b"},"payload":{"pid":1}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        let err = decode(br#"{"payload":[]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn empty_frame_is_json_error() {
        assert!(matches!(decode(b"\0\0").unwrap_err(), DecodeError::Json(_)));
    }

    #[test]
    fn stage_errors_propagate() {
        let err = decode(br#"{"heos":{"command":"heart_beat","result":"success","message":""}}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedCommand { .. }));
        let err = decode(br#"{"heos":{"command":"a/b","result":"success","message":"a=1&bad"}}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMessage { .. }));
        let err = decode(br#"{"heos":{"command":"a/b","message":""},"payload":[{"x":true}]}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedValue { ref key, .. } if key == "x"));
    }

    #[test]
    fn failure_exposes_device_error() {
        let response = decode(
            br#"{"heos":{"command":"player/get_player_info","result":"fail","message":"eid=2&text=ID Not Valid"}}"#,
        )
        .unwrap();
        assert!(response.is_failure());
        assert_eq!(
            response.heos.error(),
            Some(DeviceError {
                eid: Some(2),
                text: "ID Not Valid".to_owned(),
            })
        );
    }

    #[test]
    fn success_has_no_device_error() {
        let response =
            decode(br#"{"heos":{"command":"a/b","result":"success","message":""}}"#).unwrap();
        assert_eq!(response.heos.error(), None);
    }

    #[test]
    fn detects_under_process_acknowledgement() {
        let response = decode(
            br#"{"heos":{"command":"browse/browse","result":"success","message":"command under process"}}"#,
        )
        .unwrap();
        assert!(response.is_under_process());
        assert!(response.heos.message.is_empty());
    }
}
