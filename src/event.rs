//! Decoded events.
//!
//! Decode operations produce these records instead of printing; sinks in
//! [`crate::transcript`] turn them into output. The `Display` forms are the
//! plain transcript text.

use crate::input::InputEvent;
use serde::Serialize;
use std::fmt;

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Event counter value when the event id was read.
    pub index: u64,
    /// Event id, or the async kind byte for a nested sub-event.
    pub id: u8,
    pub name: &'static str,
    /// Sub-event of a legacy `EVENT_ASYNC` frame.
    pub nested: bool,
    pub detail: EventDetail,
}

/// Kind-specific payload of a decoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventDetail {
    /// Event without payload.
    None,
    /// Event without payload, reported as such.
    NoData,
    Instructions { delta: u32, total: u64 },
    CharWrite { result: u32, offset: u32 },
    AudioOut { value: u32 },
    Random { ret: u32, size: u32 },
    Clock { value: u64 },
    Checkpoint { checkpoint: u64, more_data: bool },
    /// Header of a legacy async frame.
    AsyncFrame { async_kind: u8, checkpoint: u8 },
    /// Bottom-half, one-shot or block operation id.
    AsyncOp { op_id: u64 },
    /// Legacy bottom-half step id.
    AsyncStep { step: u64 },
    CharRead { device: u8, data: Vec<u8> },
    Net { device: u8, flags: u32, size: u32 },
    Input(InputEvent),
}

impl fmt::Display for EventDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None | Self::AsyncFrame { .. } | Self::AsyncOp { .. } => Ok(()),
            Self::NoData => write!(f, "no data"),
            Self::Instructions { delta, total } => write!(f, "+ {delta} -> {total}"),
            Self::CharWrite { result, offset } => write!(f, "{offset} -> {result}"),
            Self::AudioOut { value } => write!(f, "{value}"),
            Self::Random { ret: 0, size } => write!(f, "{size} bytes"),
            Self::Random { size, .. } => write!(f, "{size} bytes (getrandom failed)"),
            Self::Clock { value } => write!(f, "{value:#x}"),
            Self::Checkpoint { more_data: true, .. } => write!(f, "more data follows"),
            Self::Checkpoint { more_data: false, .. } => write!(f, "no additional data"),
            Self::AsyncStep { step } => write!(f, "@ {step}"),
            Self::CharRead { device, data } => {
                write!(f, "device:{device:x} chars:{}", data.escape_ascii())
            }
            Self::Net {
                device,
                flags,
                size,
            } => write!(f, "net:{device:x} flags:{flags:x} bytes:{size}"),
            Self::Input(input) => write!(f, "{input}"),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nested {
            write!(f, "  {}({})", self.name, self.id)?;
        } else {
            write!(f, "{}:{}({})", self.index, self.name, self.id)?;
        }
        let detail = self.detail.to_string();
        if !detail.is_empty() {
            write!(f, " {detail}")?;
        }
        Ok(())
    }
}

/// Recoverable inconsistency found while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Warning {
    /// Async data names a checkpoint other than the current one.
    CheckpointMismatch { index: u64, expected: u64, found: u8 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckpointMismatch {
                expected, found, ..
            } => write!(
                f,
                "mismatch between checkpoint {expected} and async data {found}"
            ),
        }
    }
}
