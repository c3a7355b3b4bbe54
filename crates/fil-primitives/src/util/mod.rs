//! Utility types for binary serialization.
//!
//! Provides unsigned LEB128 varints (`UVarInt`, used by ID address payloads
//! and multiformats prefixes) and the `CborReader`/`CborWriter` pair used to
//! produce and consume the canonical DAG-CBOR form of messages. Only the
//! subset of CBOR that messages use is supported: unsigned and negative
//! integers, byte strings, and definite-length arrays. Every head is
//! written in its shortest form and the reader rejects anything else, so
//! decoding followed by encoding always reproduces the input bytes.

use crate::PrimitivesError;

/// Maximum encoded length of a `u64` as an unsigned LEB128 varint.
pub const MAX_UVARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// UVarInt
// ---------------------------------------------------------------------------

/// An unsigned LEB128 variable-length integer.
///
/// Seven bits per byte, least significant group first, high bit set on
/// every byte except the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UVarInt(pub u64);

impl UVarInt {
    /// Decode a varint from the start of a byte slice.
    ///
    /// # Arguments
    /// * `data` - Byte slice starting with a varint encoding.
    ///
    /// # Returns
    /// A tuple of `(UVarInt, bytes_consumed)`, or an error if the data is
    /// truncated, overflows a `u64`, or is not minimally encoded.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let mut value: u64 = 0;
        for (i, &b) in data.iter().enumerate() {
            if i >= MAX_UVARINT_LEN {
                return Err(PrimitivesError::VarIntTooLarge);
            }
            let low = (b & 0x7f) as u64;
            // The tenth byte can only contribute the top bit of a u64.
            if i == MAX_UVARINT_LEN - 1 && low > 1 {
                return Err(PrimitivesError::VarIntTooLarge);
            }
            value |= low << (7 * i);
            if b & 0x80 == 0 {
                if b == 0 && i > 0 {
                    return Err(PrimitivesError::NonMinimalVarInt);
                }
                return Ok((UVarInt(value), i + 1));
            }
        }
        Err(PrimitivesError::UnexpectedEof)
    }

    /// Return the encoded byte length of this varint.
    ///
    /// # Returns
    /// A value between 1 and 10.
    pub fn length(&self) -> usize {
        let bits = 64 - self.0.leading_zeros() as usize;
        bits.div_ceil(7).max(1)
    }

    /// Encode the varint into a new byte vector.
    ///
    /// # Returns
    /// A `Vec<u8>` of 1 to 10 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        let mut v = self.0;
        loop {
            let b = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.push(b);
                break;
            }
            out.push(b | 0x80);
        }
        out
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UVarInt {
    fn from(v: u64) -> Self {
        UVarInt(v)
    }
}

// ---------------------------------------------------------------------------
// CBOR major types
// ---------------------------------------------------------------------------

/// Major type 0: unsigned integer.
pub const MAJOR_UNSIGNED: u8 = 0;
/// Major type 1: negative integer (`-1 - n`).
pub const MAJOR_NEGATIVE: u8 = 1;
/// Major type 2: byte string.
pub const MAJOR_BYTES: u8 = 2;
/// Major type 4: array.
pub const MAJOR_ARRAY: u8 = 4;

// ---------------------------------------------------------------------------
// CborReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for canonical CBOR data.
///
/// Wraps a byte slice and maintains a read position. All `read_*` methods
/// check the major type they expect and reject non-minimal heads.
#[derive(Clone, Debug)]
pub struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CborReader<'a> {
    /// Create a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        CborReader { data, pos: 0 }
    }

    /// Read `n` raw bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_raw(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let end = self.pos.checked_add(n).ok_or(PrimitivesError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_raw(1)?[0])
    }

    fn read_be(&mut self, n: usize) -> Result<u64, PrimitivesError> {
        let bytes = self.read_raw(n)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Read a data item head and return `(major_type, argument)`.
    ///
    /// Indefinite lengths, reserved additional-info values and heads that
    /// are not in their shortest form are rejected.
    pub fn read_head(&mut self) -> Result<(u8, u64), PrimitivesError> {
        let initial = self.read_u8()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let (value, min) = match info {
            0..=23 => return Ok((major, info as u64)),
            24 => (self.read_be(1)?, 24),
            25 => (self.read_be(2)?, 0x100),
            26 => (self.read_be(4)?, 0x1_0000),
            27 => (self.read_be(8)?, 0x1_0000_0000),
            _ => {
                return Err(PrimitivesError::InvalidCbor(format!(
                    "unsupported additional info {}",
                    info
                )))
            }
        };
        if value < min {
            return Err(PrimitivesError::InvalidCbor(
                "non-canonical integer head".to_string(),
            ));
        }
        Ok((major, value))
    }

    /// Look at the next head without consuming it.
    pub fn peek_head(&self) -> Result<(u8, u64), PrimitivesError> {
        self.clone().read_head()
    }

    fn expect_major(&mut self, expected: u8, what: &str) -> Result<u64, PrimitivesError> {
        let (major, value) = self.read_head()?;
        if major != expected {
            return Err(PrimitivesError::InvalidCbor(format!(
                "expected {}, found major type {}",
                what, major
            )));
        }
        Ok(value)
    }

    /// Read an unsigned integer (major type 0).
    pub fn read_uint(&mut self) -> Result<u64, PrimitivesError> {
        self.expect_major(MAJOR_UNSIGNED, "unsigned integer")
    }

    /// Read a signed integer (major type 0 or 1) that fits in an `i64`.
    pub fn read_int(&mut self) -> Result<i64, PrimitivesError> {
        let (major, value) = self.read_head()?;
        let out_of_range = || PrimitivesError::InvalidCbor("integer out of i64 range".to_string());
        match major {
            MAJOR_UNSIGNED => i64::try_from(value).map_err(|_| out_of_range()),
            MAJOR_NEGATIVE => {
                let n = i64::try_from(value).map_err(|_| out_of_range())?;
                Ok(-1 - n)
            }
            other => Err(PrimitivesError::InvalidCbor(format!(
                "expected integer, found major type {}",
                other
            ))),
        }
    }

    /// Read a byte string (major type 2) and return a borrowed slice.
    pub fn read_byte_string(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.expect_major(MAJOR_BYTES, "byte string")?;
        let len = usize::try_from(len).map_err(|_| PrimitivesError::UnexpectedEof)?;
        self.read_raw(len)
    }

    /// Read a definite-length array head (major type 4) and return its length.
    pub fn read_array_header(&mut self) -> Result<u64, PrimitivesError> {
        self.expect_major(MAJOR_ARRAY, "array")
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// CborWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer producing canonical CBOR.
///
/// Wraps a `Vec<u8>`; every head is emitted in its shortest encoding.
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        CborWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        CborWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append a data item head in its shortest form.
    ///
    /// # Arguments
    /// * `major` - CBOR major type (0-7).
    /// * `value` - The head argument (integer value or length).
    pub fn write_head(&mut self, major: u8, value: u64) {
        let mt = major << 5;
        if value < 24 {
            self.buf.push(mt | value as u8);
        } else if value <= 0xff {
            self.buf.push(mt | 24);
            self.buf.push(value as u8);
        } else if value <= 0xffff {
            self.buf.push(mt | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= 0xffff_ffff {
            self.buf.push(mt | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(mt | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    /// Append an unsigned integer.
    pub fn write_uint(&mut self, value: u64) {
        self.write_head(MAJOR_UNSIGNED, value);
    }

    /// Append a signed integer, using major type 1 for negatives.
    pub fn write_int(&mut self, value: i64) {
        if value >= 0 {
            self.write_head(MAJOR_UNSIGNED, value as u64);
        } else {
            // -1 - value, computed without overflow for i64::MIN.
            self.write_head(MAJOR_NEGATIVE, !(value as u64));
        }
    }

    /// Append a byte string. An empty slice is written as `0x40`.
    pub fn write_byte_string(&mut self, bytes: &[u8]) {
        self.write_head(MAJOR_BYTES, bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Append a definite-length array head.
    pub fn write_array_header(&mut self, len: u64) {
        self.write_head(MAJOR_ARRAY, len);
    }

    /// Append bytes that are already valid CBOR.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for CborWriter {
    fn default() -> Self {
        Self::new()
    }
}
