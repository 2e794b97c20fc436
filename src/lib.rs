//! Decoder for responses of the HEOS CLI protocol spoken by Denon and
//! Marantz network audio devices.
//!
//! ```
//! let raw = b"{\"heos\":{\"command\":\"player/get_players\",\"result\":\"success\",\"message\":\"\"},\"payload\":[{\"pid\":1}]}\0\0";
//! let response = heos_decode::decode(raw).unwrap();
//! assert_eq!(response.heos.command.to_string(), "player/get_players");
//! assert_eq!(response.payload[0]["pid"], "1");
//! ```

pub mod heos;

pub use heos::{
    decode, CommandIdentifier, DecodeError, DeviceError, HeosResponse, Message, PayloadResponse,
    Record, Response,
};
