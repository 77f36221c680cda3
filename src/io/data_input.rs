//! Data input abstractions and implementations
//!
//! Multi-byte integers are read in big-endian (network) order, the order in
//! which double-array dictionaries are stored on disk.

use std::io::Read;

use crate::error::{Result, SeadatError};

/// Trait for reading structured data from various sources
pub trait DataInput {
    /// Read a 32-bit unsigned integer in big-endian format
    fn read_u32(&mut self) -> Result<u32>;

    /// Read a 32-bit signed integer in big-endian format
    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }
}

/// DataInput implementation for byte slices
pub struct SliceDataInput<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceDataInput<'a> {
    /// Create a new SliceDataInput from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get the remaining bytes
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(SeadatError::unexpected_eof(format!(
                "need {} bytes at offset {}, only {} left",
                n,
                self.position,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(bytes)
    }
}

impl<'a> DataInput for SliceDataInput<'a> {
    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// DataInput implementation for std::io::Read types
pub struct ReaderDataInput<R> {
    reader: R,
}

impl<R: Read> ReaderDataInput<R> {
    /// Create a new ReaderDataInput from a Read type
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> DataInput for ReaderDataInput<R> {
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }
}

/// Convenience function to create a DataInput from a byte slice
pub fn from_slice(data: &[u8]) -> SliceDataInput<'_> {
    SliceDataInput::new(data)
}

/// Convenience function to create a DataInput from a reader
pub fn from_reader<R: Read>(reader: R) -> ReaderDataInput<R> {
    ReaderDataInput::new(reader)
}
