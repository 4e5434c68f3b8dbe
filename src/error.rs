//! Typed errors for replay-dump.
//!
//! Every decode failure is fatal to its session. The kinds are kept apart
//! so callers can tell an unsupported capture feature from a corrupt or
//! truncated trace.

use thiserror::Error;

/// Top-level error type for replay-dump operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Decoding stopped on a fatal error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeFailure),

    /// Configuration could not be built.
    #[error("Configuration error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error, e.g. the trace file could not be opened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single decode step.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The stream ended in the middle of a read.
    #[error("truncated input: needed {expected} bytes, {available} available")]
    TruncatedInput { expected: u64, available: u64 },

    /// The event id has no entry in the active generation's table.
    #[error("unknown event {id}")]
    UnknownEvent { id: u8 },

    /// The event kind is recognized but this decoder does not support it.
    #[error("{name} not handled")]
    UnhandledEvent { name: &'static str },

    /// A sub-kind tag is outside its known range.
    #[error("malformed payload: unknown {field} {value}")]
    MalformedPayload { field: &'static str, value: u32 },

    /// Async data carries a checkpoint id other than the current one
    /// (strict mode only).
    #[error("mismatch between checkpoint {expected} and async data {found}")]
    CheckpointMismatch { expected: u64, found: u8 },

    /// The underlying reader or an output sink failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fatal decode error together with how far the session got.
#[derive(Debug, Error)]
#[error("{error} (reached {offset} of {size} bytes)")]
pub struct DecodeFailure {
    /// What went wrong.
    #[source]
    pub error: DecodeError,
    /// Byte offset reached when the error occurred.
    pub offset: u64,
    /// Total size of the stream.
    pub size: u64,
}

/// Error building a configuration struct.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// A required field was not set.
    #[error("{builder}: missing required field '{field}'")]
    MissingRequiredField {
        builder: &'static str,
        field: &'static str,
    },
}

/// Result type alias using replay-dump's Error.
pub type DumpResult<T> = std::result::Result<T, Error>;
