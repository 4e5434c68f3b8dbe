//! One-event lookahead over a [`ByteSource`].
//!
//! Some decoders must look at the next event id to decide what they are
//! decoding. [`EventCursor::push_back`] hands such an id back so the next
//! [`EventCursor::next_event`] returns it without touching the stream.

use crate::error::DecodeError;
use crate::source::ByteSource;
use std::io::Read;

/// Event id reader with a single-slot pushback cache.
///
/// Owned by one decode session; nothing here is shared between sessions.
#[derive(Debug)]
pub struct EventCursor<R> {
    source: ByteSource<R>,
    cached_id: Option<u8>,
    from_cache: bool,
    event_count: u64,
    checkpoint_origin: u64,
    current_checkpoint: u64,
}

impl<R: Read> EventCursor<R> {
    /// Wrap a source positioned at the first event.
    pub fn new(source: ByteSource<R>, checkpoint_origin: u8) -> Self {
        Self {
            source,
            cached_id: None,
            from_cache: false,
            event_count: 0,
            checkpoint_origin: u64::from(checkpoint_origin),
            current_checkpoint: 0,
        }
    }

    /// Read the next event id, or return the pushed-back one.
    ///
    /// Only ids read from the stream advance the event counter.
    pub fn next_event(&mut self) -> Result<u8, DecodeError> {
        if self.from_cache {
            self.from_cache = false;
            if let Some(id) = self.cached_id {
                return Ok(id);
            }
        }
        let id = self.source.read_u8()?;
        self.cached_id = Some(id);
        self.event_count += 1;
        Ok(id)
    }

    /// Like [`next_event`](Self::next_event), but `None` at a clean end of
    /// stream (no pending id and no bytes left).
    pub fn try_next_event(&mut self) -> Result<Option<u8>, DecodeError> {
        if !self.from_cache && self.source.remaining() == 0 {
            return Ok(None);
        }
        self.next_event().map(Some)
    }

    /// Return `id` to the stream; the next read yields it again.
    pub fn push_back(&mut self, id: u8) {
        self.cached_id = Some(id);
        self.from_cache = true;
    }

    /// Record the checkpoint for the event id most recently read.
    ///
    /// Checkpoint kinds are numbered from the generation's origin id, so the
    /// checkpoint is the current id's distance from that origin.
    pub fn mark_checkpoint(&mut self) -> u64 {
        let id = self.cached_id.map_or(0, u64::from);
        self.current_checkpoint = id.saturating_sub(self.checkpoint_origin);
        self.current_checkpoint
    }

    /// Whether a pushed-back id is waiting.
    pub fn has_pending(&self) -> bool {
        self.from_cache
    }

    /// Number of ids read from the stream so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn current_checkpoint(&self) -> u64 {
        self.current_checkpoint
    }

    pub fn checkpoint_origin(&self) -> u64 {
        self.checkpoint_origin
    }

    pub fn source(&self) -> &ByteSource<R> {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut ByteSource<R> {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_count_stream_ids() {
        let data = [7u8, 8, 9];
        let mut cursor = EventCursor::new(ByteSource::from_slice(&data), 0);
        assert_eq!(cursor.next_event().unwrap(), 7);
        assert_eq!(cursor.next_event().unwrap(), 8);
        assert_eq!(cursor.event_count(), 2);
        assert_eq!(cursor.source().offset(), 2);
    }

    #[test]
    fn push_back_is_returned_without_reading() {
        let data = [1u8, 2, 3];
        let mut cursor = EventCursor::new(ByteSource::from_slice(&data), 0);
        assert_eq!(cursor.next_event().unwrap(), 1);
        let peeked = cursor.next_event().unwrap();
        assert_eq!(peeked, 2);
        assert_eq!(cursor.event_count(), 2);

        cursor.push_back(peeked);
        assert!(cursor.has_pending());
        assert_eq!(cursor.next_event().unwrap(), 2);
        assert!(!cursor.has_pending());
        assert_eq!(cursor.event_count(), 2);
        assert_eq!(cursor.source().offset(), 2);

        assert_eq!(cursor.next_event().unwrap(), 3);
        assert_eq!(cursor.event_count(), 3);
    }

    #[test]
    fn try_next_event_at_end() {
        let data = [5u8];
        let mut cursor = EventCursor::new(ByteSource::from_slice(&data), 0);
        assert_eq!(cursor.try_next_event().unwrap(), Some(5));
        assert_eq!(cursor.try_next_event().unwrap(), None);

        // A pending id is still delivered after the stream is drained.
        cursor.push_back(5);
        assert_eq!(cursor.try_next_event().unwrap(), Some(5));
        assert_eq!(cursor.try_next_event().unwrap(), None);
    }

    #[test]
    fn next_event_past_end_is_truncation() {
        let mut cursor = EventCursor::new(ByteSource::from_slice(&[]), 0);
        assert!(matches!(
            cursor.next_event(),
            Err(DecodeError::TruncatedInput { expected: 1, .. })
        ));
    }

    #[test]
    fn checkpoint_is_relative_to_origin() {
        let data = [30u8, 33];
        let mut cursor = EventCursor::new(ByteSource::from_slice(&data), 30);
        cursor.next_event().unwrap();
        assert_eq!(cursor.mark_checkpoint(), 0);
        cursor.next_event().unwrap();
        assert_eq!(cursor.mark_checkpoint(), 3);
        assert_eq!(cursor.current_checkpoint(), 3);
    }
}
