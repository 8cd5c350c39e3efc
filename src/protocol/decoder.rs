//! Message decoding
//!
//! Turns the content of one frame into an ordered list of per-channel
//! integers. Tokens are separated by runs of ASCII whitespace; empty tokens
//! are skipped. A bad token only affects its own channel.

use super::is_separator;
use std::num::IntErrorKind;
use thiserror::Error;

/// Why a single token could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The token is a valid number but does not fit in `i64`
    #[error("value '{token}' out of range, saturated to {saturated}")]
    Overflow { token: String, saturated: i64 },

    /// The token is not a base-10 integer
    #[error("'{token}' is not an integer")]
    NotANumber { token: String },
}

impl DecodeError {
    /// The clamped value for overflowing tokens
    pub fn saturated(&self) -> Option<i64> {
        match self {
            DecodeError::Overflow { saturated, .. } => Some(*saturated),
            DecodeError::NotANumber { .. } => None,
        }
    }
}

/// Decode result for one channel position
pub type DecodedValue = Result<i64, DecodeError>;

/// Ordered per-channel values of one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    pub values: Vec<DecodedValue>,
}

impl DecodedMessage {
    /// Number of channel positions in this message
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of positions that failed to decode
    pub fn error_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_err()).count()
    }

    /// Successfully decoded values, `None` where a token failed
    pub fn ok_values(&self) -> Vec<Option<i64>> {
        self.values.iter().map(|v| v.as_ref().ok().copied()).collect()
    }
}

/// Decode one framed message into per-channel integers
pub fn decode_message(raw: &str) -> DecodedMessage {
    let values = raw
        .split(|c: char| c.is_ascii() && is_separator(c as u8))
        .filter(|token| !token.is_empty())
        .map(decode_token)
        .collect();
    DecodedMessage { values }
}

fn decode_token(token: &str) -> DecodedValue {
    token.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => DecodeError::Overflow {
            token: token.to_string(),
            saturated: i64::MAX,
        },
        IntErrorKind::NegOverflow => DecodeError::Overflow {
            token: token.to_string(),
            saturated: i64::MIN,
        },
        _ => DecodeError::NotANumber {
            token: token.to_string(),
        },
    })
}
