//! replay-dump: decoder for deterministic record/replay execution traces.
//!
//! A trace is a big-endian stream of framed events written by a virtual
//! machine's record/replay subsystem. Its schema has gone through several
//! on-disk generations in which event ids were reassigned, so the decoder
//! picks an event table from the version in the trace header and dispatches
//! every event id through it.
//!
//! # Layout
//!
//! ```text
//! [format_version: u32] [reserved: u64] [event id: u8] [payload] ...
//! ```
//!
//! # Architecture
//!
//! - [`ByteSource`] reads fixed-width big-endian integers and byte arrays
//! - [`EventCursor`] adds one-event lookahead with pushback
//! - [`Generation`] maps a format version to its [`EventTable`]
//! - [`DecodeContext`] dispatches an id to its payload decoder
//! - [`TraceDecoder`] runs the driver loop and feeds an [`EventSink`]
//!
//! # Quick Start
//!
//! ```no_run
//! use replay_dump::{decode_file, DumpConfig, PlainTranscript};
//!
//! let config = DumpConfig::builder().trace("replay.bin").build()?;
//! let mut out = PlainTranscript::new(std::io::stdout().lock());
//! let summary = decode_file(&config, &mut out)?;
//! println!("{} instructions", summary.total_instructions);
//! # Ok::<(), replay_dump::Error>(())
//! ```

mod builder;
pub mod cursor;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod event;
pub mod generation;
pub mod input;
pub mod source;
pub mod transcript;

pub use cursor::EventCursor;
pub use dispatch::{DecodeContext, Flow};
pub use driver::{
    decode_file, DumpConfig, DumpConfigBuilder, EventSink, Summary, Termination, TraceDecoder,
    TraceHeader,
};
pub use error::{BuilderError, DecodeError, DecodeFailure, DumpResult, Error};
pub use event::{EventDetail, EventRecord, Warning};
pub use generation::{EventDescriptor, EventKind, EventTable, Generation};
pub use input::InputEvent;
pub use source::ByteSource;
pub use transcript::{JsonLinesTranscript, PlainTranscript};
