//! Binary persistence of double arrays
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! i32 n
//! n × (i32 base[i], i32 check[i])
//! ```
//!
//! Values are never written. A caller restoring a [`DoubleArrayTrie`] supplies
//! the value table separately.
//!
//! Transitions are keyed by `char`. Arrays written by a UTF-16 code-unit
//! builder share the layout but agree on content only when every key lies in
//! the Basic Multilingual Plane; a supplementary character there spans two
//! surrogate transitions.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::config::{Config, DoubleArrayConfig};
use crate::error::{Result, SeadatError};
use crate::fsa::double_array::DoubleArray;
use crate::fsa::double_array_trie::DoubleArrayTrie;
use crate::io::{DataInput, DataOutput, ReaderDataInput, SliceDataInput, VecDataOutput, WriterDataOutput};

/// Upper bound on slots reserved before any cell has been read, so a corrupt
/// count cannot force a huge allocation up front
const MAX_PREALLOCATED_SLOTS: usize = 1 << 20;

impl DoubleArray {
    /// Write the logical range of the arrays
    pub fn save<O: DataOutput>(&self, output: &mut O) -> Result<()> {
        let count = i32::try_from(self.size)
            .map_err(|_| SeadatError::invalid_data(format!("size {} exceeds i32", self.size)))?;
        output.write_i32(count)?;
        for i in 0..self.size {
            output.write_i32(self.base[i])?;
            output.write_i32(self.check[i])?;
        }
        output.flush()
    }

    /// Read arrays, appending the default load margin of zeroed slots
    pub fn load<I: DataInput>(input: &mut I) -> Result<Self> {
        Self::load_with_margin(input, DoubleArrayConfig::default().load_margin)
    }

    /// Read arrays using the load margin from `config`
    pub fn load_with_config<I: DataInput>(input: &mut I, config: &DoubleArrayConfig) -> Result<Self> {
        config.validate()?;
        Self::load_with_margin(input, config.load_margin)
    }

    fn load_with_margin<I: DataInput>(input: &mut I, margin: usize) -> Result<Self> {
        let count = input.read_i32()?;
        let size = usize::try_from(count)
            .map_err(|_| SeadatError::invalid_data(format!("negative slot count {}", count)))?;

        let total = size
            .checked_add(margin)
            .filter(|&total| total <= i32::MAX as usize)
            .ok_or_else(|| {
                SeadatError::invalid_data(format!(
                    "{} slots plus a margin of {} exceed the addressable range",
                    size, margin
                ))
            })?;

        let reserve = size.min(MAX_PREALLOCATED_SLOTS);
        let mut base = Vec::with_capacity(reserve);
        let mut check = Vec::with_capacity(reserve);
        for _ in 0..size {
            base.push(input.read_i32()?);
            check.push(input.read_i32()?);
        }
        base.resize(total, 0);
        check.resize(total, 0);

        Ok(Self { base, check, size })
    }

    /// Serialize into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = VecDataOutput::with_capacity(4 + self.total_size());
        self.save(&mut output)?;
        Ok(output.into_vec())
    }

    /// Deserialize from a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::load(&mut SliceDataInput::new(bytes))
    }

    /// Write the arrays to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let result = File::create(path).map_err(SeadatError::from).and_then(|file| {
            let mut output = WriterDataOutput::new(BufWriter::new(file));
            self.save(&mut output)
        });
        match &result {
            Ok(()) => log::debug!("saved double array of {} slots to {}", self.size, path.display()),
            Err(e) => log::warn!("failed to save double array to {}: {}", path.display(), e),
        }
        result
    }

    /// Read arrays from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let result = File::open(path)
            .map_err(SeadatError::from)
            .and_then(|file| Self::load(&mut ReaderDataInput::new(BufReader::new(file))));
        log_load(path, &result);
        result
    }

    /// Write the arrays to a gzip-compressed file
    #[cfg(feature = "gzip")]
    pub fn save_to_gzip_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let path = path.as_ref();
        let result = File::create(path).map_err(SeadatError::from).and_then(|file| {
            let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            let mut output = WriterDataOutput::new(encoder);
            self.save(&mut output)?;
            output.into_inner().finish()?.flush()?;
            Ok(())
        });
        match &result {
            Ok(()) => log::debug!(
                "saved double array of {} slots to {} (gzip)",
                self.size,
                path.display()
            ),
            Err(e) => log::warn!("failed to save double array to {}: {}", path.display(), e),
        }
        result
    }

    /// Read arrays from a gzip-compressed file
    #[cfg(feature = "gzip")]
    pub fn load_from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        use flate2::read::GzDecoder;

        let path = path.as_ref();
        let result = File::open(path).map_err(SeadatError::from).and_then(|file| {
            let decoder = GzDecoder::new(BufReader::new(file));
            Self::load(&mut ReaderDataInput::new(decoder))
        });
        log_load(path, &result);
        result
    }
}

fn log_load(path: &Path, result: &Result<DoubleArray>) {
    match result {
        Ok(array) => log::debug!(
            "loaded double array of {} slots from {}",
            array.size(),
            path.display()
        ),
        Err(e) => log::warn!("failed to load double array from {}: {}", path.display(), e),
    }
}

impl<V> DoubleArrayTrie<V> {
    /// Write the arrays; the value table is not written
    pub fn save<O: DataOutput>(&self, output: &mut O) -> Result<()> {
        self.array().save(output)
    }

    /// Read arrays and bind them to `values`
    pub fn load<I: DataInput>(input: &mut I, values: Vec<V>) -> Result<Self> {
        Ok(Self::from_parts(DoubleArray::load(input)?, values))
    }

    /// Replace the arrays with ones read from `input`, keeping the values
    ///
    /// On failure the arrays are cleared and every query reports not-found
    /// until a later reload or rebuild succeeds.
    pub fn reload<I: DataInput>(&mut self, input: &mut I) -> Result<()> {
        match DoubleArray::load(input) {
            Ok(array) => {
                *self.array_mut() = array;
                Ok(())
            }
            Err(e) => {
                log::warn!("reload failed, trie cleared: {}", e);
                self.clear();
                Err(e)
            }
        }
    }

    /// Write the arrays to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.array().save_to_file(path)
    }

    /// Read arrays from a file and bind them to `values`
    pub fn load_from_file<P: AsRef<Path>>(path: P, values: Vec<V>) -> Result<Self> {
        Ok(Self::from_parts(DoubleArray::load_from_file(path)?, values))
    }

    /// Write the arrays to a gzip-compressed file
    #[cfg(feature = "gzip")]
    pub fn save_to_gzip_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.array().save_to_gzip_file(path)
    }

    /// Read arrays from a gzip-compressed file and bind them to `values`
    #[cfg(feature = "gzip")]
    pub fn load_from_gzip_file<P: AsRef<Path>>(path: P, values: Vec<V>) -> Result<Self> {
        Ok(Self::from_parts(DoubleArray::load_from_gzip_file(path)?, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fsa::DoubleArrayTrieBuilder;
    use crate::io::from_slice;

    fn sample() -> DoubleArray {
        DoubleArrayTrieBuilder::with_config(DoubleArrayConfig::memory_preset())
            .unwrap()
            .build(&["a", "ab", "b"])
            .unwrap()
    }

    #[test]
    fn test_layout_is_big_endian_pairs() {
        let array = sample();
        let bytes = array.to_bytes().unwrap();
        assert_eq!(bytes.len(), 4 + array.size() * 8);
        assert_eq!(&bytes[..4], &(array.size() as i32).to_be_bytes());
        assert_eq!(&bytes[4..8], &1i32.to_be_bytes());
        assert_eq!(&bytes[8..12], &array.check()[0].to_be_bytes());
    }

    #[test]
    fn test_round_trip_preserves_queries() {
        let array = sample();
        let loaded = DoubleArray::from_bytes(&array.to_bytes().unwrap()).unwrap();
        assert_eq!(loaded.size(), array.size());
        assert_eq!(loaded.capacity(), array.size() + 65535);
        for key in ["a", "ab", "b", "", "c", "abc", "ba"] {
            assert_eq!(loaded.exact_match(key), array.exact_match(key), "{:?}", key);
        }
    }

    #[test]
    fn test_load_margin_from_config() {
        let bytes = sample().to_bytes().unwrap();
        let config = DoubleArrayConfig {
            load_margin: 0,
            ..Default::default()
        };
        let loaded = DoubleArray::load_with_config(&mut from_slice(&bytes), &config).unwrap();
        assert_eq!(loaded.capacity(), loaded.size());
        assert_eq!(loaded.exact_match("ab"), Some(1));
    }

    #[test]
    fn test_oversized_margin_from_config_is_rejected() {
        let bytes = sample().to_bytes().unwrap();
        let config = DoubleArrayConfig {
            load_margin: usize::MAX,
            ..Default::default()
        };
        let err = DoubleArray::load_with_config(&mut from_slice(&bytes), &config).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_margin_overflow_is_invalid_data() {
        let array = sample();
        let bytes = array.to_bytes().unwrap();
        for margin in [usize::MAX, usize::MAX - array.size() + 1, i32::MAX as usize] {
            let err = DoubleArray::load_with_margin(&mut from_slice(&bytes), margin).unwrap_err();
            assert_eq!(err.category(), "data", "margin {}", margin);
        }
    }

    #[test]
    fn test_truncated_input_fails() {
        let bytes = sample().to_bytes().unwrap();
        for cut in [0, 3, 4, 9, bytes.len() - 1] {
            let err = DoubleArray::from_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.category(), "io");
        }
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let err = DoubleArray::from_bytes(&(-1i32).to_be_bytes()).unwrap_err();
        assert_eq!(err.category(), "data");
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let err = DoubleArray::from_bytes(&i32::MAX.to_be_bytes()).unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_reload_failure_clears_trie() {
        let array = sample();
        let bytes = array.to_bytes().unwrap();
        let mut trie = DoubleArrayTrie::from_parts(DoubleArray::new(), vec![1, 2, 3]);

        trie.reload(&mut from_slice(&bytes)).unwrap();
        assert_eq!(trie.get("ab"), Some(&2));

        assert!(trie.reload(&mut from_slice(&bytes[..10])).is_err());
        assert!(!trie.is_usable());
        assert_eq!(trie.get("ab"), None);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.dat");
        let trie = DoubleArrayTrie::from_parts(sample(), vec!["x", "y", "z"]);
        trie.save_to_file(&path).unwrap();

        let loaded = DoubleArrayTrie::load_from_file(&path, vec!["x", "y", "z"]).unwrap();
        assert_eq!(loaded.get("ab"), Some(&"y"));
        assert!(DoubleArray::load_from_file(dir.path().join("missing.dat")).is_err());
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_gzip_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.dat.gz");
        let array = sample();
        array.save_to_gzip_file(&path).unwrap();

        let loaded = DoubleArray::load_from_gzip_file(&path).unwrap();
        assert_eq!(loaded.exact_match("b"), Some(2));
        assert!(DoubleArray::load_from_file(&path)
            .map(|a| a.exact_match("b") != Some(2))
            .unwrap_or(true));
    }
}
