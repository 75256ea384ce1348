//! Binary reading and writing utilities for the splix protocol.
//!
//! All multi-byte values are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Pack a track nibble and a color nibble into one map byte.
/// High nibble = trail owner, low nibble = tile owner/wall.
#[inline]
pub const fn pack_cell(track: u8, color: u8) -> u8 {
    ((track & 0x0F) << 4) | (color & 0x0F)
}

/// Split a map byte into its (track, color) nibbles.
#[inline]
pub const fn split_cell(byte: u8) -> (u8, u8) {
    ((byte >> 4) & 0x0F, byte & 0x0F)
}

/// A reader for parsing binary protocol messages.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Safe read that returns None if not enough data.
    #[inline]
    pub fn try_get_u8(&mut self) -> Option<u8> {
        (self.buf.remaining() >= 1).then(|| self.buf.get_u8())
    }

    #[inline]
    pub fn try_get_u16(&mut self) -> Option<u16> {
        (self.buf.remaining() >= 2).then(|| self.buf.get_u16_le())
    }

    #[inline]
    pub fn try_get_i16(&mut self) -> Option<i16> {
        (self.buf.remaining() >= 2).then(|| self.buf.get_i16_le())
    }

    #[inline]
    pub fn try_get_f32(&mut self) -> Option<f32> {
        (self.buf.remaining() >= 4).then(|| self.buf.get_f32_le())
    }

    #[inline]
    pub fn try_get_f64(&mut self) -> Option<f64> {
        (self.buf.remaining() >= 8).then(|| self.buf.get_f64_le())
    }

    /// Read `n` raw bytes, or None if fewer remain.
    pub fn try_get_bytes(&mut self, n: usize) -> Option<Bytes> {
        (self.buf.remaining() >= n).then(|| self.buf.copy_to_bytes(n))
    }
}

/// A writer for building binary protocol messages.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    #[inline]
    pub fn put_i16(&mut self, v: i16) {
        self.buf.put_i16_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    #[inline]
    pub fn put_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    /// Write raw bytes.
    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}
