//! Wire protocol for incoming samples
//!
//! The device sends an ASCII stream in which every sample tick is framed as
//! a start marker, whitespace separated decimal integers (one per channel,
//! in fixed channel order) and an end marker:
//!
//! ```text
//! $512 300 128;
//! ```
//!
//! - [`ByteFramer`] turns arbitrary byte chunks into complete frames
//! - [`decode_message`] splits one frame into per-channel integers

pub mod decoder;
pub mod framer;

pub use decoder::{decode_message, DecodeError, DecodedMessage, DecodedValue};
pub use framer::{ByteFramer, FrameMode, FrameState, StartMarkerPolicy};

/// Default start-of-message marker
pub const START_MARKER: u8 = b'$';

/// Default end-of-message marker
pub const END_MARKER: u8 = b';';

/// Whitespace that separates values inside a message: space, tab, LF, CR,
/// vertical tab and form feed
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}
