use thiserror::Error;

use crate::bus::{BusError, Frame};

mod processor;
mod queue;

pub use processor::CommandProcessor;
pub use queue::{CommandConsumer, CommandQueue};

const SEND_KEYWORD: &str = "send";
// `send`, an id, and at least two payload bytes.
const MIN_SEND_TOKENS: usize = 4;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("send command needs at least {MIN_SEND_TOKENS} tokens, got {0}")]
    TooShort(usize),

    #[error("invalid numeric token {0:?}")]
    BadNumber(String),

    #[error("payload byte {0} out of range")]
    ByteRange(u32),

    #[error(transparent)]
    Frame(#[from] BusError),
}

/// A textual instruction travelling through the command queue. Created
/// by a producer, consumed exactly once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the `send <id> <byte>...` form. `Ok(None)` means the text
    /// is not a send command at all; such commands are inert.
    pub fn to_frame(&self) -> Result<Option<Frame>, CommandError> {
        let tokens: Vec<&str> = self.text.split_whitespace().collect();
        if tokens.first() != Some(&SEND_KEYWORD) {
            return Ok(None);
        }
        if tokens.len() < MIN_SEND_TOKENS {
            return Err(CommandError::TooShort(tokens.len()));
        }
        let id = parse_int(tokens[1])?;
        let data = tokens[2..]
            .iter()
            .map(|token| {
                let value = parse_int(token)?;
                u8::try_from(value).map_err(|_| CommandError::ByteRange(value))
            })
            .collect::<Result<Vec<u8>, CommandError>>()?;
        Ok(Some(Frame::new(id, &data)?))
    }
}

/// Integer literal, decimal or `0x`-prefixed hexadecimal.
fn parse_int(token: &str) -> Result<u32, CommandError> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse(),
    };
    parsed.map_err(|_| CommandError::BadNumber(token.to_owned()))
}
