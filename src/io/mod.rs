//! Binary I/O primitives
//!
//! The double-array file format is a sequence of big-endian 32-bit integers;
//! these traits let the serializer write to and read from byte buffers, files
//! and compressed streams alike.

pub mod data_input;
pub mod data_output;

pub use data_input::{DataInput, ReaderDataInput, SliceDataInput};
pub use data_output::{DataOutput, VecDataOutput, WriterDataOutput};

pub use data_input::{from_reader, from_slice};
