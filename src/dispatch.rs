//! Event dispatch and per-kind payload decoding.
//!
//! [`DecodeContext`] is the per-session state threaded through every decode
//! operation: the cursor, the active generation and the running instruction
//! total. Dispatch indexes the generation's table by id and matches on the
//! descriptor's [`EventKind`].

use crate::cursor::EventCursor;
use crate::driver::EventSink;
use crate::error::DecodeError;
use crate::event::{EventDetail, EventRecord, Warning};
use crate::generation::{async_descriptor, EventDescriptor, EventKind, EventTable, Generation};
use crate::input::InputEvent;
use crate::source::ByteSource;
use std::io::Read;
use tracing::{debug, warn};

/// Whether the driver loop should read another event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    Continue,
    Stop,
}

/// Mutable state of one decode session.
#[derive(Debug)]
pub struct DecodeContext<R> {
    cursor: EventCursor<R>,
    generation: Generation,
    table: EventTable,
    total_instructions: u64,
    strict_checkpoints: bool,
}

impl<R: Read> DecodeContext<R> {
    /// Start decoding events from `source`, which must be positioned just
    /// past the trace header.
    pub fn new(source: ByteSource<R>, generation: Generation, strict_checkpoints: bool) -> Self {
        Self {
            cursor: EventCursor::new(source, generation.checkpoint_origin()),
            generation,
            table: generation.table(),
            total_instructions: 0,
            strict_checkpoints,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Sum of all instruction deltas decoded so far.
    pub fn total_instructions(&self) -> u64 {
        self.total_instructions
    }

    pub fn cursor(&self) -> &EventCursor<R> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut EventCursor<R> {
        &mut self.cursor
    }

    /// Decode the event whose id was just read from the cursor.
    ///
    /// An id missing from the active table is fatal.
    pub fn dispatch<S: EventSink + ?Sized>(
        &mut self,
        id: u8,
        sink: &mut S,
    ) -> Result<Flow, DecodeError> {
        let desc = self
            .table
            .get(id)
            .ok_or(DecodeError::UnknownEvent { id })?;
        let index = self.cursor.event_count();
        debug!(id, name = desc.name, index, "Dispatching event");

        let detail = match desc.kind {
            EventKind::Checkpoint => self.decode_checkpoint()?,
            EventKind::AsyncFrame => return self.decode_async_frame(desc, index, sink),
            EventKind::Unimplemented => {
                return Err(DecodeError::UnhandledEvent { name: desc.name })
            }
            EventKind::End => {
                sink.event(&record(desc, index, EventDetail::None))?;
                return Ok(Flow::Stop);
            }
            kind => self.decode_payload(kind, desc.name)?,
        };

        sink.event(&record(desc, index, detail))?;
        Ok(Flow::Continue)
    }

    /// Decode a checkpoint and peek at the following id.
    ///
    /// The peeked id is always pushed back, so the next `next_event` returns
    /// it without advancing the event counter.
    fn decode_checkpoint(&mut self) -> Result<EventDetail, DecodeError> {
        let checkpoint = self.cursor.mark_checkpoint();
        let more_data = match self.cursor.try_next_event()? {
            Some(next) => {
                self.cursor.push_back(next);
                self.generation.async_ids().contains(&next)
            }
            None => false,
        };
        Ok(EventDetail::Checkpoint {
            checkpoint,
            more_data,
        })
    }

    /// Legacy `EVENT_ASYNC`: kind byte, checkpoint byte, then the sub-event.
    fn decode_async_frame<S: EventSink + ?Sized>(
        &mut self,
        desc: &'static EventDescriptor,
        index: u64,
        sink: &mut S,
    ) -> Result<Flow, DecodeError> {
        let source = self.cursor.source_mut();
        let async_kind = source.read_u8()?;
        let checkpoint = source.read_u8()?;
        sink.event(&record(
            desc,
            index,
            EventDetail::AsyncFrame {
                async_kind,
                checkpoint,
            },
        ))?;

        let expected = self.cursor.current_checkpoint();
        if u64::from(checkpoint) != expected {
            if self.strict_checkpoints {
                return Err(DecodeError::CheckpointMismatch {
                    expected,
                    found: checkpoint,
                });
            }
            warn!(index, expected, found = checkpoint, "Async data does not match checkpoint");
            sink.warning(&Warning::CheckpointMismatch {
                index,
                expected,
                found: checkpoint,
            })?;
        }

        let sub = async_descriptor(async_kind).ok_or(DecodeError::MalformedPayload {
            field: "async event kind",
            value: u32::from(async_kind),
        })?;
        let detail = match sub.decode {
            EventKind::AsyncBh => EventDetail::AsyncStep {
                step: self.cursor.source_mut().read_u64()?,
            },
            kind => self.decode_payload(kind, sub.name)?,
        };
        sink.event(&EventRecord {
            index,
            id: async_kind,
            name: sub.name,
            nested: true,
            detail,
        })?;
        Ok(Flow::Continue)
    }

    /// Decode a fixed or self-describing payload.
    fn decode_payload(
        &mut self,
        kind: EventKind,
        name: &'static str,
    ) -> Result<EventDetail, DecodeError> {
        let source = self.cursor.source_mut();
        let detail = match kind {
            EventKind::Instruction => {
                let delta = source.read_u32()?;
                self.total_instructions = self.total_instructions.saturating_add(u64::from(delta));
                EventDetail::Instructions {
                    delta,
                    total: self.total_instructions,
                }
            }
            EventKind::Marker | EventKind::CheckpointInit => EventDetail::None,
            EventKind::Plain => EventDetail::NoData,
            EventKind::AsyncBh | EventKind::AsyncBhOneshot | EventKind::AsyncBlock => {
                EventDetail::AsyncOp {
                    op_id: source.read_u64()?,
                }
            }
            EventKind::AsyncInput => EventDetail::Input(InputEvent::decode(source)?),
            EventKind::AsyncCharRead => EventDetail::CharRead {
                device: source.read_u8()?,
                data: source.read_length_prefixed_bytes()?,
            },
            EventKind::AsyncNet => {
                let device = source.read_u8()?;
                let flags = source.read_u32()?;
                let size = source.read_u32()?;
                source.skip(u64::from(size))?;
                EventDetail::Net {
                    device,
                    flags,
                    size,
                }
            }
            EventKind::CharWrite => EventDetail::CharWrite {
                result: source.read_u32()?,
                offset: source.read_u32()?,
            },
            EventKind::AudioOut => EventDetail::AudioOut {
                value: source.read_u32()?,
            },
            EventKind::Random => {
                let ret = source.read_u32()?;
                let size = source.read_u32()?;
                source.skip(u64::from(size))?;
                EventDetail::Random { ret, size }
            }
            EventKind::Clock => EventDetail::Clock {
                value: source.read_u64()?,
            },
            EventKind::Checkpoint
            | EventKind::AsyncFrame
            | EventKind::End
            | EventKind::Unimplemented => return Err(DecodeError::UnhandledEvent { name }),
        };
        Ok(detail)
    }
}

fn record(desc: &EventDescriptor, index: u64, detail: EventDetail) -> EventRecord {
    EventRecord {
        index,
        id: desc.id,
        name: desc.name,
        nested: false,
        detail,
    }
}
