use std::collections::BTreeMap;

use super::error::DecodeError;

pub type Message = BTreeMap<String, String>;

/// Parses the `&`-delimited `key=value` string carried in `heos.message`.
///
/// Fewer than two pairs yields an empty map. Each pair splits on its first
/// `=` only, a repeated key keeps its last value, and a single pair without
/// `=` fails the whole message.
pub fn parse_message(raw: &str) -> Result<Message, DecodeError> {
    let pairs: Vec<&str> = raw.split('&').collect();
    if pairs.len() < 2 {
        return Ok(Message::new());
    }

    pairs
        .into_iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| DecodeError::MalformedMessage {
                    message: raw.to_owned(),
                })
        })
        .collect()
}
