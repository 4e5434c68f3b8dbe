//! Helpers for building trace byte streams in tests.

#![allow(dead_code)]

use replay_dump::Generation;

/// Big-endian trace writer.
#[derive(Default)]
pub struct TraceBuilder {
    bytes: Vec<u8>,
}

impl TraceBuilder {
    /// Start a trace with the given header version.
    pub fn new(version: u32) -> Self {
        Self::default().u32(version).u64(0)
    }

    pub fn for_generation(generation: Generation) -> Self {
        Self::new(generation.version())
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn raw(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    /// Event id byte.
    pub fn event(self, id: u8) -> Self {
        self.u8(id)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub const V12: u32 = 0xe0200c;
pub const V7: u32 = 0xe02007;
pub const V6: u32 = 0xe02006;
pub const V5: u32 = 0xe02005;

// V12 ids used across tests.
pub const V12_INSTRUCTION: u8 = 0;
pub const V12_INTERRUPT: u8 = 1;
pub const V12_ASYNC_BH: u8 = 3;
pub const V12_ASYNC_INPUT: u8 = 5;
pub const V12_ASYNC_CHAR_READ: u8 = 7;
pub const V12_ASYNC_NET: u8 = 9;
pub const V12_CHAR_WRITE: u8 = 22;
pub const V12_CHAR_READ_ALL: u8 = 23;
pub const V12_RANDOM: u8 = 27;
pub const V12_CLOCK_HOST: u8 = 28;
pub const V12_CP_CLOCK_WARP_START: u8 = 30;
pub const V12_CP_CLOCK_VIRTUAL: u8 = 34;
pub const V12_CP_INIT: u8 = 37;
pub const V12_END: u8 = 39;

// V6 ids.
pub const V6_INSTRUCTION: u8 = 0;
pub const V6_ASYNC: u8 = 3;
pub const V6_AUDIO_OUT: u8 = 8;
pub const V6_CLOCK_HOST: u8 = 10;
pub const V6_CP_CLOCK_WARP_START: u8 = 12;
pub const V6_CP_CLOCK_VIRTUAL: u8 = 16;
