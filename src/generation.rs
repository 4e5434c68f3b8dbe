//! Trace generations and their event tables.
//!
//! The event id byte means different things in different on-disk
//! generations: ids are reassigned whenever the recorder adds an event
//! kind, so a table is only valid for the generation it was written for.
//! Each table here is dense (the descriptor at index `i` has id `i`), which
//! makes lookup a bounds-checked index.

use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// How the payload of an event is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    /// `u32` instruction-count delta.
    Instruction,
    /// No payload, reported as "no data".
    Plain,
    /// No payload (interrupt, exception, shutdown).
    Marker,
    /// Legacy async frame: kind byte, checkpoint byte, sub-event payload.
    AsyncFrame,
    /// `u64` bottom-half operation id.
    AsyncBh,
    /// `u64` one-shot bottom-half operation id.
    AsyncBhOneshot,
    /// Input event with a nested tag structure.
    AsyncInput,
    /// `u8` device id and length-prefixed characters.
    AsyncCharRead,
    /// `u64` block operation id.
    AsyncBlock,
    /// `u8` device id, `u32` flags, length-prefixed packet (skipped).
    AsyncNet,
    /// `u32` result and `u32` offset.
    CharWrite,
    /// `u32` sample.
    AudioOut,
    /// `u32` return code, `u32` size, then `size` raw bytes (skipped).
    Random,
    /// `u64` clock value.
    Clock,
    /// Checkpoint that may be followed by async events.
    Checkpoint,
    /// No payload; start of checkpointing.
    CheckpointInit,
    /// No payload; end of the trace.
    End,
    /// Known kind this decoder cannot decode.
    Unimplemented,
}

/// One entry of an event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    pub id: u8,
    pub name: &'static str,
    pub kind: EventKind,
}

const fn ev(id: u8, name: &'static str, kind: EventKind) -> EventDescriptor {
    EventDescriptor { id, name, kind }
}

/// Ordered set of event descriptors for one generation.
#[derive(Debug, Clone, Copy)]
pub struct EventTable {
    events: &'static [EventDescriptor],
}

impl EventTable {
    /// Look up the descriptor for `id`.
    pub fn get(&self, id: u8) -> Option<&'static EventDescriptor> {
        self.events.get(usize::from(id)).filter(|d| d.id == id)
    }

    /// All descriptors, ordered by id.
    pub fn events(&self) -> &'static [EventDescriptor] {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A supported on-disk trace schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Generation {
    /// Pre-MTTCG layout; also the fallback for unrecognized versions.
    V5,
    /// Audio events added.
    V6,
    /// Shutdown causes added.
    V7,
    /// Async events flattened into top-level ids, random and end events.
    V12,
}

impl Generation {
    pub const VERSION_V5: u32 = 0xe0_2005;
    pub const VERSION_V6: u32 = 0xe0_2006;
    pub const VERSION_V7: u32 = 0xe0_2007;
    pub const VERSION_V12: u32 = 0xe0_200c;

    /// Every supported generation, oldest first.
    pub const ALL: [Generation; 4] = [Self::V5, Self::V6, Self::V7, Self::V12];

    /// Select the generation for a header's `format_version`.
    ///
    /// Unknown versions fall back to the oldest table. Ids are not additive
    /// across generations, so there is no attempt at forward compatibility.
    pub const fn from_version(version: u32) -> Self {
        match version {
            Self::VERSION_V12 => Self::V12,
            Self::VERSION_V7 => Self::V7,
            Self::VERSION_V6 => Self::V6,
            _ => Self::V5,
        }
    }

    /// The `format_version` this generation is written with.
    pub const fn version(self) -> u32 {
        match self {
            Self::V5 => Self::VERSION_V5,
            Self::V6 => Self::VERSION_V6,
            Self::V7 => Self::VERSION_V7,
            Self::V12 => Self::VERSION_V12,
        }
    }

    pub fn table(self) -> EventTable {
        let events: &'static [EventDescriptor] = match self {
            Self::V5 => V5_EVENTS,
            Self::V6 => V6_EVENTS,
            Self::V7 => V7_EVENTS,
            Self::V12 => V12_EVENTS,
        };
        EventTable { events }
    }

    /// First checkpoint event id in this generation's id space.
    pub const fn checkpoint_origin(self) -> u8 {
        match self {
            Self::V5 => 10,
            Self::V6 => 12,
            Self::V7 => 20,
            Self::V12 => 30,
        }
    }

    /// Ids that, directly after a checkpoint, mean async data follows.
    ///
    /// Older generations wrap every async event in a single `EVENT_ASYNC`
    /// id; V12 gives each async kind its own id.
    pub const fn async_ids(self) -> RangeInclusive<u8> {
        match self {
            Self::V5 | Self::V6 | Self::V7 => 3..=3,
            Self::V12 => 3..=9,
        }
    }

    /// Whether async events are nested inside an `EVENT_ASYNC` frame.
    pub const fn has_async_frames(self) -> bool {
        !matches!(self, Self::V12)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V5 => write!(f, "v5"),
            Self::V6 => write!(f, "v6"),
            Self::V7 => write!(f, "v7"),
            Self::V12 => write!(f, "v12"),
        }
    }
}

use EventKind::*;

static V5_EVENTS: &[EventDescriptor] = &[
    ev(0, "EVENT_INSTRUCTION", Instruction),
    ev(1, "EVENT_INTERRUPT", Marker),
    ev(2, "EVENT_EXCEPTION", Plain),
    ev(3, "EVENT_ASYNC", AsyncFrame),
    ev(4, "EVENT_SHUTDOWN", Unimplemented),
    ev(5, "EVENT_CHAR_WRITE", CharWrite),
    ev(6, "EVENT_CHAR_READ_ALL", Unimplemented),
    ev(7, "EVENT_CHAR_READ_ALL_ERROR", Unimplemented),
    ev(8, "EVENT_CLOCK_HOST", Clock),
    ev(9, "EVENT_CLOCK_VIRTUAL_RT", Clock),
    ev(10, "EVENT_CP_CLOCK_WARP_START", Checkpoint),
    ev(11, "EVENT_CP_CLOCK_WARP_ACCOUNT", Checkpoint),
    ev(12, "EVENT_CP_RESET_REQUESTED", Checkpoint),
    ev(13, "EVENT_CP_SUSPEND_REQUESTED", Checkpoint),
    ev(14, "EVENT_CP_CLOCK_VIRTUAL", Checkpoint),
    ev(15, "EVENT_CP_CLOCK_HOST", Checkpoint),
    ev(16, "EVENT_CP_CLOCK_VIRTUAL_RT", Checkpoint),
    ev(17, "EVENT_CP_INIT", CheckpointInit),
    ev(18, "EVENT_CP_RESET", Checkpoint),
];

static V6_EVENTS: &[EventDescriptor] = &[
    ev(0, "EVENT_INSTRUCTION", Instruction),
    ev(1, "EVENT_INTERRUPT", Marker),
    ev(2, "EVENT_EXCEPTION", Plain),
    ev(3, "EVENT_ASYNC", AsyncFrame),
    ev(4, "EVENT_SHUTDOWN", Unimplemented),
    ev(5, "EVENT_CHAR_WRITE", CharWrite),
    ev(6, "EVENT_CHAR_READ_ALL", Unimplemented),
    ev(7, "EVENT_CHAR_READ_ALL_ERROR", Unimplemented),
    ev(8, "EVENT_AUDIO_OUT", AudioOut),
    ev(9, "EVENT_AUDIO_IN", Unimplemented),
    ev(10, "EVENT_CLOCK_HOST", Clock),
    ev(11, "EVENT_CLOCK_VIRTUAL_RT", Clock),
    ev(12, "EVENT_CP_CLOCK_WARP_START", Checkpoint),
    ev(13, "EVENT_CP_CLOCK_WARP_ACCOUNT", Checkpoint),
    ev(14, "EVENT_CP_RESET_REQUESTED", Checkpoint),
    ev(15, "EVENT_CP_SUSPEND_REQUESTED", Checkpoint),
    ev(16, "EVENT_CP_CLOCK_VIRTUAL", Checkpoint),
    ev(17, "EVENT_CP_CLOCK_HOST", Checkpoint),
    ev(18, "EVENT_CP_CLOCK_VIRTUAL_RT", Checkpoint),
    ev(19, "EVENT_CP_INIT", CheckpointInit),
    ev(20, "EVENT_CP_RESET", Checkpoint),
];

static V7_EVENTS: &[EventDescriptor] = &[
    ev(0, "EVENT_INSTRUCTION", Instruction),
    ev(1, "EVENT_INTERRUPT", Marker),
    ev(2, "EVENT_EXCEPTION", Unimplemented),
    ev(3, "EVENT_ASYNC", AsyncFrame),
    ev(4, "EVENT_SHUTDOWN", Unimplemented),
    ev(5, "EVENT_SHUTDOWN_HOST_ERR", Unimplemented),
    ev(6, "EVENT_SHUTDOWN_HOST_QMP", Unimplemented),
    ev(7, "EVENT_SHUTDOWN_HOST_SIGNAL", Unimplemented),
    ev(8, "EVENT_SHUTDOWN_HOST_UI", Unimplemented),
    ev(9, "EVENT_SHUTDOWN_GUEST_SHUTDOWN", Unimplemented),
    ev(10, "EVENT_SHUTDOWN_GUEST_RESET", Unimplemented),
    ev(11, "EVENT_SHUTDOWN_GUEST_PANIC", Unimplemented),
    ev(12, "EVENT_SHUTDOWN___MAX", Unimplemented),
    ev(13, "EVENT_CHAR_WRITE", CharWrite),
    ev(14, "EVENT_CHAR_READ_ALL", Unimplemented),
    ev(15, "EVENT_CHAR_READ_ALL_ERROR", Unimplemented),
    ev(16, "EVENT_AUDIO_OUT", AudioOut),
    ev(17, "EVENT_AUDIO_IN", Unimplemented),
    ev(18, "EVENT_CLOCK_HOST", Clock),
    ev(19, "EVENT_CLOCK_VIRTUAL_RT", Clock),
    ev(20, "EVENT_CP_CLOCK_WARP_START", Checkpoint),
    ev(21, "EVENT_CP_CLOCK_WARP_ACCOUNT", Checkpoint),
    ev(22, "EVENT_CP_RESET_REQUESTED", Checkpoint),
    ev(23, "EVENT_CP_SUSPEND_REQUESTED", Checkpoint),
    ev(24, "EVENT_CP_CLOCK_VIRTUAL", Checkpoint),
    ev(25, "EVENT_CP_CLOCK_HOST", Checkpoint),
    ev(26, "EVENT_CP_CLOCK_VIRTUAL_RT", Checkpoint),
    ev(27, "EVENT_CP_INIT", CheckpointInit),
    ev(28, "EVENT_CP_RESET", Checkpoint),
];

static V12_EVENTS: &[EventDescriptor] = &[
    ev(0, "EVENT_INSTRUCTION", Instruction),
    ev(1, "EVENT_INTERRUPT", Marker),
    ev(2, "EVENT_EXCEPTION", Marker),
    ev(3, "EVENT_ASYNC_BH", AsyncBh),
    ev(4, "EVENT_ASYNC_BH_ONESHOT", AsyncBhOneshot),
    ev(5, "EVENT_ASYNC_INPUT", AsyncInput),
    ev(6, "EVENT_ASYNC_INPUT_SYNC", Plain),
    ev(7, "EVENT_ASYNC_CHAR_READ", AsyncCharRead),
    ev(8, "EVENT_ASYNC_BLOCK", AsyncBlock),
    ev(9, "EVENT_ASYNC_NET", AsyncNet),
    ev(10, "EVENT_SHUTDOWN", Marker),
    ev(11, "EVENT_SHUTDOWN_HOST_ERR", Marker),
    ev(12, "EVENT_SHUTDOWN_HOST_QMP_QUIT", Marker),
    ev(13, "EVENT_SHUTDOWN_HOST_QMP_RESET", Marker),
    ev(14, "EVENT_SHUTDOWN_HOST_SIGNAL", Marker),
    ev(15, "EVENT_SHUTDOWN_HOST_UI", Marker),
    ev(16, "EVENT_SHUTDOWN_GUEST_SHUTDOWN", Marker),
    ev(17, "EVENT_SHUTDOWN_GUEST_RESET", Marker),
    ev(18, "EVENT_SHUTDOWN_GUEST_PANIC", Marker),
    ev(19, "EVENT_SHUTDOWN_SUBSYS_RESET", Marker),
    ev(20, "EVENT_SHUTDOWN_SNAPSHOT_LOAD", Marker),
    ev(21, "EVENT_SHUTDOWN___MAX", Marker),
    ev(22, "EVENT_CHAR_WRITE", CharWrite),
    ev(23, "EVENT_CHAR_READ_ALL", Unimplemented),
    ev(24, "EVENT_CHAR_READ_ALL_ERROR", Unimplemented),
    ev(25, "EVENT_AUDIO_OUT", AudioOut),
    ev(26, "EVENT_AUDIO_IN", Unimplemented),
    ev(27, "EVENT_RANDOM", Random),
    ev(28, "EVENT_CLOCK_HOST", Clock),
    ev(29, "EVENT_CLOCK_VIRTUAL_RT", Clock),
    ev(30, "EVENT_CP_CLOCK_WARP_START", Checkpoint),
    ev(31, "EVENT_CP_CLOCK_WARP_ACCOUNT", Checkpoint),
    ev(32, "EVENT_CP_RESET_REQUESTED", Checkpoint),
    ev(33, "EVENT_CP_SUSPEND_REQUESTED", Checkpoint),
    ev(34, "EVENT_CP_CLOCK_VIRTUAL", Checkpoint),
    ev(35, "EVENT_CP_CLOCK_HOST", Checkpoint),
    ev(36, "EVENT_CP_CLOCK_VIRTUAL_RT", Checkpoint),
    ev(37, "EVENT_CP_INIT", CheckpointInit),
    ev(38, "EVENT_CP_RESET", Checkpoint),
    ev(39, "EVENT_END", End),
];

/// Sub-event carried inside a legacy `EVENT_ASYNC` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AsyncDescriptor {
    pub kind: u8,
    pub name: &'static str,
    /// Decode operation, expressed with the equivalent top-level kind.
    pub decode: EventKind,
}

static ASYNC_EVENTS: &[AsyncDescriptor] = &[
    AsyncDescriptor {
        kind: 0,
        name: "REPLAY_ASYNC_EVENT_BH",
        decode: AsyncBh,
    },
    AsyncDescriptor {
        kind: 1,
        name: "REPLAY_ASYNC_INPUT",
        decode: AsyncInput,
    },
    AsyncDescriptor {
        kind: 2,
        name: "REPLAY_ASYNC_INPUT_SYNC",
        decode: Plain,
    },
    AsyncDescriptor {
        kind: 3,
        name: "REPLAY_ASYNC_CHAR_READ",
        decode: AsyncCharRead,
    },
    AsyncDescriptor {
        kind: 4,
        name: "REPLAY_ASYNC_EVENT_BLOCK",
        decode: AsyncBlock,
    },
    AsyncDescriptor {
        kind: 5,
        name: "REPLAY_ASYNC_EVENT_NET",
        decode: AsyncNet,
    },
];

/// Look up a legacy async sub-event by its kind byte.
pub fn async_descriptor(kind: u8) -> Option<&'static AsyncDescriptor> {
    ASYNC_EVENTS.get(usize::from(kind))
}
