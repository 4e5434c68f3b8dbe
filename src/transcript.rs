//! Transcript writers.
//!
//! Two [`EventSink`]s: [`PlainTranscript`] writes the line-oriented
//! human-readable form, [`JsonLinesTranscript`] writes one JSON object per
//! line (NDJSON).

use crate::driver::{EventSink, Summary, TraceHeader};
use crate::error::{DecodeError, DecodeFailure};
use crate::event::{EventRecord, Warning};
use crate::generation::Generation;
use serde::Serialize;
use std::io::Write;

/// Writes the plain-text transcript.
///
/// ```text
/// HEADER: version 0xe0200c
/// 1:EVENT_INSTRUCTION(0) + 5 -> 5
/// 2:EVENT_END(39)
/// Reached 18 of 18 bytes
/// ```
pub struct PlainTranscript<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> PlainTranscript<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Write the closing line of a successful session.
    pub fn summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "Reached {} of {} bytes",
            summary.offset, summary.size
        )
    }

    /// Write the error and how far decoding got.
    pub fn failure(&mut self, failure: &DecodeFailure) -> std::io::Result<()> {
        writeln!(self.writer, "error {}", failure.error)?;
        writeln!(
            self.writer,
            "Reached {} of {} bytes",
            failure.offset, failure.size
        )
    }

    /// Flush buffered output and return the number of events written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.writer.flush()?;
        Ok(self.count)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<W: Write> EventSink for PlainTranscript<W> {
    fn header(&mut self, header: &TraceHeader, _generation: Generation) -> Result<(), DecodeError> {
        writeln!(self.writer, "HEADER: version {:#x}", header.format_version)?;
        Ok(())
    }

    fn event(&mut self, record: &EventRecord) -> Result<(), DecodeError> {
        writeln!(self.writer, "{record}")?;
        self.count += 1;
        Ok(())
    }

    fn warning(&mut self, warning: &Warning) -> Result<(), DecodeError> {
        writeln!(self.writer, "  {warning}")?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Header {
        format_version: u32,
        reserved: u64,
        generation: Generation,
    },
    Event(&'a EventRecord),
    Warning(&'a Warning),
    Summary(&'a Summary),
    Error {
        message: String,
        offset: u64,
        size: u64,
    },
}

/// Writes decoded events as NDJSON.
///
/// Every line is an object with a `"type"` field: `header`, `event`,
/// `warning`, then `summary` or `error`.
pub struct JsonLinesTranscript<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> JsonLinesTranscript<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    fn emit(&mut self, line: &Line<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")
    }

    pub fn summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        self.emit(&Line::Summary(summary))
    }

    pub fn failure(&mut self, failure: &DecodeFailure) -> std::io::Result<()> {
        self.emit(&Line::Error {
            message: failure.error.to_string(),
            offset: failure.offset,
            size: failure.size,
        })
    }

    /// Flush buffered output and return the number of events written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.writer.flush()?;
        Ok(self.count)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<W: Write> EventSink for JsonLinesTranscript<W> {
    fn header(&mut self, header: &TraceHeader, generation: Generation) -> Result<(), DecodeError> {
        self.emit(&Line::Header {
            format_version: header.format_version,
            reserved: header.reserved,
            generation,
        })?;
        Ok(())
    }

    fn event(&mut self, record: &EventRecord) -> Result<(), DecodeError> {
        self.emit(&Line::Event(record))?;
        self.count += 1;
        Ok(())
    }

    fn warning(&mut self, warning: &Warning) -> Result<(), DecodeError> {
        self.emit(&Line::Warning(warning))?;
        Ok(())
    }
}
