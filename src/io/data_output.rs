//! Data output abstractions and implementations
//!
//! Multi-byte integers are written in big-endian (network) order.

use std::io::Write;

use crate::error::Result;

/// Trait for writing structured data to various destinations
pub trait DataOutput {
    /// Write a 32-bit unsigned integer in big-endian format
    fn write_u32(&mut self, value: u32) -> Result<()>;

    /// Write a 32-bit signed integer in big-endian format
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_u32(value as u32)
    }

    /// Flush any buffered data to the underlying destination
    fn flush(&mut self) -> Result<()>;
}

/// DataOutput implementation for Vec<u8>
#[derive(Debug, Default)]
pub struct VecDataOutput {
    data: Vec<u8>,
}

impl VecDataOutput {
    /// Create a new VecDataOutput
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new VecDataOutput with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of bytes written
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no bytes have been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert into the underlying Vec<u8>
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl DataOutput for VecDataOutput {
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.data.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// DataOutput implementation for std::io::Write types
pub struct WriterDataOutput<W> {
    writer: W,
}

impl<W: Write> WriterDataOutput<W> {
    /// Create a new WriterDataOutput from a Write type
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Convert back to the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DataOutput for WriterDataOutput<W> {
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
