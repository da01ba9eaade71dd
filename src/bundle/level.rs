use anyhow::{Result, bail};
use std::fmt;

/// DEFLATE compression level for one bundle entry.
///
/// Always within `0..=9`. Level 0 stores the entry uncompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub const MIN: CompressionLevel = CompressionLevel(0);
    pub const MAX: CompressionLevel = CompressionLevel(9);
    pub const DEFAULT: CompressionLevel = CompressionLevel(6);

    pub fn new(level: u32) -> Result<Self> {
        if level > Self::MAX.0 as u32 {
            bail!("Compression level {} is out of range (0-9)", level);
        }
        Ok(Self(level as u8))
    }

    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for CompressionLevel {
    type Error = anyhow::Error;

    fn try_from(level: u32) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
