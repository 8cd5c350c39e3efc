//! Byte-stream framing
//!
//! Extracts complete `$...;` messages from a raw byte stream. The transport
//! may split a message across any number of reads, so the framer carries
//! its [`FrameState`] between calls to [`ByteFramer::push`].
//!
//! Transition table:
//!
//! | mode              | byte          | action                                   |
//! |-------------------|---------------|------------------------------------------|
//! | `WaitingForStart` | start marker  | clear buffer, enter `InMessage`          |
//! | `WaitingForStart` | anything else | discard                                  |
//! | `InMessage`       | end marker    | emit buffer, clear it, `WaitingForStart` |
//! | `InMessage`       | digit / space | append to buffer                         |
//! | `InMessage`       | start marker  | depends on [`StartMarkerPolicy`]         |
//! | `InMessage`       | anything else | discard, stay `InMessage`                |

use super::{is_separator, END_MARKER, START_MARKER};
use serde::{Deserialize, Serialize};

/// What to do with a start marker that arrives before the end marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StartMarkerPolicy {
    /// Drop the partial message and start a new one at this marker
    #[default]
    Resync,
    /// Treat the marker like any other stray byte and keep accumulating
    Ignore,
}

impl std::fmt::Display for StartMarkerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartMarkerPolicy::Resync => write!(f, "Resync"),
            StartMarkerPolicy::Ignore => write!(f, "Ignore"),
        }
    }
}

/// Current position of the framer relative to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Discarding bytes until a start marker is seen
    #[default]
    WaitingForStart,
    /// Accumulating message content until the end marker
    InMessage,
}

/// Mutable decoder state carried across chunks
///
/// `buffer` is only non-empty while `mode` is [`FrameMode::InMessage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameState {
    pub mode: FrameMode,
    pub buffer: String,
}

/// Splits a byte stream into complete frames
#[derive(Debug, Clone)]
pub struct ByteFramer {
    state: FrameState,
    start_marker: u8,
    end_marker: u8,
    policy: StartMarkerPolicy,
    /// Partial messages abandoned because a new start marker arrived
    resyncs: u64,
}

impl Default for ByteFramer {
    fn default() -> Self {
        Self::new(START_MARKER, END_MARKER, StartMarkerPolicy::default())
    }
}

impl ByteFramer {
    /// Create a framer with explicit markers and mid-message start policy
    pub fn new(start_marker: u8, end_marker: u8, policy: StartMarkerPolicy) -> Self {
        Self {
            state: FrameState::default(),
            start_marker,
            end_marker,
            policy,
            resyncs: 0,
        }
    }

    /// Current framing state
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// Whether a message has been started but not terminated
    pub fn has_partial(&self) -> bool {
        self.state.mode == FrameMode::InMessage
    }

    /// Number of partial messages dropped by [`StartMarkerPolicy::Resync`]
    pub fn resync_count(&self) -> u64 {
        self.resyncs
    }

    pub fn policy(&self) -> StartMarkerPolicy {
        self.policy
    }

    /// Return to `WaitingForStart` and drop any partial message.
    ///
    /// Returns true if a partial message was discarded.
    pub fn reset(&mut self) -> bool {
        let had_partial = self.has_partial();
        self.state.mode = FrameMode::WaitingForStart;
        self.state.buffer.clear();
        self.resyncs = 0;
        had_partial
    }

    /// Feed a chunk of bytes, returning every frame completed by it in
    /// arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut frames = Vec::new();
        self.push_with(chunk, |frame| frames.push(frame.to_string()));
        frames
    }

    /// Feed a chunk of bytes, calling `on_frame` for every completed frame.
    ///
    /// The frame slice is only valid for the duration of the callback.
    pub fn push_with(&mut self, chunk: &[u8], mut on_frame: impl FnMut(&str)) {
        for &byte in chunk {
            match self.state.mode {
                FrameMode::WaitingForStart => {
                    if byte == self.start_marker {
                        self.state.mode = FrameMode::InMessage;
                        self.state.buffer.clear();
                    }
                }
                FrameMode::InMessage => {
                    if byte == self.end_marker {
                        self.state.mode = FrameMode::WaitingForStart;
                        on_frame(&self.state.buffer);
                        self.state.buffer.clear();
                    } else if byte == self.start_marker {
                        if self.policy == StartMarkerPolicy::Resync {
                            tracing::debug!(
                                "Start marker inside message, dropping {} buffered bytes",
                                self.state.buffer.len()
                            );
                            self.state.buffer.clear();
                            self.resyncs += 1;
                        }
                    } else if byte.is_ascii_digit() || is_separator(byte) {
                        self.state.buffer.push(byte as char);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_message;
    use proptest::prelude::*;

    #[test]
    fn test_single_message() {
        let mut framer = ByteFramer::default();
        assert_eq!(framer.push(b"$1 2 3;"), vec!["1 2 3"]);
        assert_eq!(framer.state().mode, FrameMode::WaitingForStart);
        assert!(framer.state().buffer.is_empty());
    }

    #[test]
    fn test_leading_garbage_is_discarded() {
        let mut framer = ByteFramer::default();
        assert_eq!(framer.push(b"12 noise;$7 8;"), vec!["7 8"]);
    }

    #[test]
    fn test_stray_characters_are_stripped() {
        let mut framer = ByteFramer::default();
        assert_eq!(framer.push(b"$1a0, 2x0;"), vec!["10 20"]);
    }

    #[test]
    fn test_vertical_tab_and_form_feed_are_kept() {
        let mut framer = ByteFramer::default();
        let frames = framer.push(b"$1\x0b2\x0c3;");
        assert_eq!(frames, vec!["1\u{b}2\u{c}3"]);
        assert_eq!(
            decode_message(&frames[0]).ok_values(),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_two_messages_in_one_chunk() {
        let mut framer = ByteFramer::default();
        assert_eq!(framer.push(b"$1 2;$3 4;"), vec!["1 2", "3 4"]);
    }

    #[test]
    fn test_message_split_across_chunks() {
        let mut framer = ByteFramer::default();
        assert!(framer.push(b"$51").is_empty());
        assert!(framer.has_partial());
        assert_eq!(framer.state().buffer, "51");
        assert!(framer.push(b"2 30").is_empty());
        assert_eq!(framer.push(b"0;\r\n"), vec!["512 300"]);
    }

    #[test]
    fn test_missing_terminator_never_emits() {
        let mut framer = ByteFramer::default();
        assert!(framer.push(b"$1 2 3 4 5 6").is_empty());
        assert!(framer.has_partial());
    }

    #[test]
    fn test_resync_on_second_start_marker() {
        let mut framer = ByteFramer::new(b'$', b';', StartMarkerPolicy::Resync);
        assert_eq!(framer.push(b"$1 2$3 4;"), vec!["3 4"]);
        assert_eq!(framer.resync_count(), 1);
    }

    #[test]
    fn test_ignore_second_start_marker() {
        let mut framer = ByteFramer::new(b'$', b';', StartMarkerPolicy::Ignore);
        assert_eq!(framer.push(b"$1 2$3 4;"), vec!["1 23 4"]);
        assert_eq!(framer.resync_count(), 0);
    }

    #[test]
    fn test_custom_markers() {
        let mut framer = ByteFramer::new(b'<', b'>', StartMarkerPolicy::Resync);
        assert_eq!(framer.push(b"$1;<5 6>"), vec!["5 6"]);
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut framer = ByteFramer::default();
        framer.push(b"$99 98");
        assert!(framer.reset());
        assert!(!framer.has_partial());
        // The tail of the old message must not leak into the next one
        assert!(framer.push(b" 97;").is_empty());
        assert_eq!(framer.push(b"$1;"), vec!["1"]);
        assert!(!framer.reset());
    }

    #[test]
    fn test_empty_message() {
        let mut framer = ByteFramer::default();
        assert_eq!(framer.push(b"$;"), vec![""]);
    }

    proptest! {
        #[test]
        fn test_chunk_boundary_independence(
            values in prop::collection::vec(0u32..100_000, 1..8),
            split in 0usize..64,
        ) {
            let body = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
            let wire = format!("xx${};yy", body).into_bytes();
            let split = split % (wire.len() + 1);

            let mut whole = ByteFramer::default();
            let expected = whole.push(&wire);

            let mut parts = ByteFramer::default();
            let mut got = parts.push(&wire[..split]);
            got.extend(parts.push(&wire[split..]));

            prop_assert_eq!(&got, &expected);
            prop_assert_eq!(got, vec![body]);
        }

        #[test]
        fn test_byte_at_a_time_matches_whole(
            wire in prop::collection::vec(prop::sample::select(b"$; 0123456789ab\n".to_vec()), 0..200),
        ) {
            let mut whole = ByteFramer::default();
            let expected = whole.push(&wire);

            let mut single = ByteFramer::default();
            let mut got = Vec::new();
            for b in &wire {
                got.extend(single.push(std::slice::from_ref(b)));
            }

            prop_assert_eq!(got, expected);
            prop_assert_eq!(whole.state(), single.state());
        }
    }
}
