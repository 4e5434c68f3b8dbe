//! Decode sessions and the driver loop.
//!
//! A [`TraceDecoder`] reads the trace header, selects the generation and
//! then pulls events through the cursor until an end event, a clean end of
//! stream, or a fatal error. Decoded events go to an [`EventSink`].
//!
//! # Example
//!
//! ```
//! use replay_dump::{ByteSource, EventRecord, Termination, TraceDecoder};
//!
//! // Header for 0xe0200c, one instruction event (+5), then EVENT_END.
//! let trace = [
//!     0x00, 0xe0, 0x20, 0x0c, 0, 0, 0, 0, 0, 0, 0, 0,
//!     0, 0, 0, 0, 5,
//!     39,
//! ];
//!
//! let mut decoder = TraceDecoder::new(ByteSource::from_slice(&trace)).unwrap();
//! let mut events: Vec<EventRecord> = Vec::new();
//! let summary = decoder.run(&mut events).unwrap();
//!
//! assert_eq!(summary.total_instructions, 5);
//! assert_eq!(summary.termination, Termination::EndEvent);
//! assert_eq!(events.len(), 2);
//! ```

use crate::builder::impl_builder;
use crate::cursor::EventCursor;
use crate::dispatch::{DecodeContext, Flow};
use crate::error::{DecodeError, DecodeFailure, Error};
use crate::event::{EventRecord, Warning};
use crate::generation::Generation;
use crate::source::ByteSource;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

/// The fixed header at the start of every trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceHeader {
    pub format_version: u32,
    pub reserved: u64,
}

impl TraceHeader {
    /// Encoded size in bytes.
    pub const SIZE: u64 = 12;

    pub fn read<R: Read>(source: &mut ByteSource<R>) -> Result<Self, DecodeError> {
        Ok(Self {
            format_version: source.read_u32()?,
            reserved: source.read_u64()?,
        })
    }
}

/// Receiver for the output of a decode session.
///
/// Returning an error from any method aborts the session.
pub trait EventSink {
    /// Called once, before the first event.
    fn header(&mut self, _header: &TraceHeader, _generation: Generation) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Called for every decoded event, including nested async sub-events.
    fn event(&mut self, record: &EventRecord) -> Result<(), DecodeError>;

    /// Called for recoverable inconsistencies.
    fn warning(&mut self, _warning: &Warning) -> Result<(), DecodeError> {
        Ok(())
    }
}

impl EventSink for Vec<EventRecord> {
    fn event(&mut self, record: &EventRecord) -> Result<(), DecodeError> {
        self.push(record.clone());
        Ok(())
    }
}

/// How a successful session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// An explicit end event was decoded.
    EndEvent,
    /// The stream ran out exactly at an event boundary.
    EndOfStream,
}

/// Outcome of a successful decode session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub header: TraceHeader,
    pub generation: Generation,
    /// Event ids read from the stream.
    pub events: u64,
    pub total_instructions: u64,
    pub offset: u64,
    pub size: u64,
    pub termination: Termination,
}

/// One decode session over one trace.
#[derive(Debug)]
pub struct TraceDecoder<R> {
    header: TraceHeader,
    context: DecodeContext<R>,
}

impl<R: Read> TraceDecoder<R> {
    /// Read the header and select the event table.
    pub fn new(source: ByteSource<R>) -> Result<Self, DecodeFailure> {
        Self::with_options(source, false, None)
    }

    /// Like [`new`](Self::new), with checkpoint strictness and an optional
    /// version that overrides the header's for table selection.
    pub fn with_options(
        mut source: ByteSource<R>,
        strict_checkpoints: bool,
        version_override: Option<u32>,
    ) -> Result<Self, DecodeFailure> {
        let header = TraceHeader::read(&mut source).map_err(|error| DecodeFailure {
            error,
            offset: source.offset(),
            size: source.size(),
        })?;
        let generation =
            Generation::from_version(version_override.unwrap_or(header.format_version));

        info!(
            version = format_args!("{:#x}", header.format_version),
            %generation,
            size = source.size(),
            "Decoding trace"
        );

        Ok(Self {
            header,
            context: DecodeContext::new(source, generation, strict_checkpoints),
        })
    }

    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    pub fn generation(&self) -> Generation {
        self.context.generation()
    }

    pub fn total_instructions(&self) -> u64 {
        self.context.total_instructions()
    }

    pub fn cursor(&self) -> &EventCursor<R> {
        self.context.cursor()
    }

    /// Decode one event. `Ok(None)` means the stream ended cleanly.
    pub fn step<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<Option<Flow>, DecodeError> {
        let Some(id) = self.context.cursor_mut().try_next_event()? else {
            return Ok(None);
        };
        self.context.dispatch(id, sink).map(Some)
    }

    /// Run the driver loop to completion.
    ///
    /// On failure the error carries the offset reached and the stream size.
    pub fn run<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<Summary, DecodeFailure> {
        sink.header(&self.header, self.generation())
            .map_err(|error| self.failure(error))?;

        let termination = loop {
            match self.step(sink) {
                Ok(Some(Flow::Continue)) => {}
                Ok(Some(Flow::Stop)) => break Termination::EndEvent,
                Ok(None) => break Termination::EndOfStream,
                Err(error) => return Err(self.failure(error)),
            }
        };

        let summary = self.summary(termination);
        info!(
            events = summary.events,
            total_instructions = summary.total_instructions,
            offset = summary.offset,
            size = summary.size,
            ?termination,
            "Trace decoded"
        );
        Ok(summary)
    }

    fn summary(&self, termination: Termination) -> Summary {
        let cursor = self.context.cursor();
        Summary {
            header: self.header,
            generation: self.generation(),
            events: cursor.event_count(),
            total_instructions: self.total_instructions(),
            offset: cursor.source().offset(),
            size: cursor.source().size(),
            termination,
        }
    }

    fn failure(&self, error: DecodeError) -> DecodeFailure {
        let source = self.context.cursor().source();
        DecodeFailure {
            error,
            offset: source.offset(),
            size: source.size(),
        }
    }
}

/// Configuration for decoding a trace file.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct DumpConfig {
    /// Path to the trace file.
    pub trace: PathBuf,

    /// Treat a checkpoint mismatch in async data as fatal (default: false).
    pub strict_checkpoints: bool,

    /// Select the event table by this version instead of the header's.
    pub version_override: Option<u32>,
}

impl_builder! {
    DumpConfig => DumpConfigBuilder {
        trace: PathBuf [required],
        strict_checkpoints: bool [or_default],
        version_override: u32 [optional],
    }
}

/// Decode the trace named by `config` into `sink`.
pub fn decode_file<S: EventSink + ?Sized>(config: &DumpConfig, sink: &mut S) -> Result<Summary, Error> {
    let source = ByteSource::open(&config.trace)?;
    let mut decoder =
        TraceDecoder::with_options(source, config.strict_checkpoints, config.version_override)?;
    Ok(decoder.run(sink)?)
}
