use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::DecodeError;

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandIdentifier {
    pub group: String,
    pub command: String,
}

impl CommandIdentifier {
    pub fn new(group: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            command: command.into(),
        }
    }
}

impl fmt::Display for CommandIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.command)
    }
}

impl FromStr for CommandIdentifier {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}

/// Splits a command path on `/`, keeping the first two segments.
///
/// Segments past the second are ignored. A path without any `/` is rejected
/// with [`DecodeError::MalformedCommand`]; empty segments are kept as-is.
pub fn parse_command(raw: &str) -> Result<CommandIdentifier, DecodeError> {
    let mut segments = raw.split('/');
    match (segments.next(), segments.next()) {
        (Some(group), Some(command)) => Ok(CommandIdentifier::new(group, command)),
        _ => Err(DecodeError::MalformedCommand {
            command: raw.to_owned(),
        }),
    }
}
