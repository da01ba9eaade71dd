//! ZIP archive writer.
//!
//! Produces a conventional single-disk ZIP that any standard unzip tool
//! can read: each entry is a Local File Header followed by its data, then
//! the Central Directory and the End of Central Directory record.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

use anyhow::{Result, bail};

use super::structures::*;

/// In-memory ZIP writer.
///
/// Entries are compressed as they are added and appended to the output
/// buffer in insertion order. [`finish`](Self::finish) appends the Central
/// Directory and returns the completed archive.
pub struct ZipWriter {
    out: Vec<u8>,
    entries: Vec<ZipFileEntry>,
}

impl ZipWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Append one file.
    ///
    /// Level 0 stores the data as-is; levels 1-9 DEFLATE it at that level.
    pub fn add(&mut self, name: &str, data: &[u8], level: u32) -> Result<()> {
        if level > 9 {
            bail!("Compression level {} is out of range (0-9)", level);
        }
        if self.entries.len() >= u16::MAX as usize {
            bail!("Too many entries for a non-ZIP64 archive");
        }

        let (compression_method, payload) = if level == 0 {
            (CompressionMethod::Stored, data.to_vec())
        } else {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
            encoder.write_all(data)?;
            (CompressionMethod::Deflate, encoder.finish()?)
        };

        let entry = ZipFileEntry {
            file_name: name.to_string(),
            flags: FLAG_UTF8,
            compression_method,
            compressed_size: payload.len() as u64,
            uncompressed_size: data.len() as u64,
            crc32: crc32fast::hash(data),
            lfh_offset: self.out.len() as u64,
            is_directory: false,
        };

        entry.write_lfh(&mut self.out)?;
        self.out.extend_from_slice(&payload);
        self.entries.push(entry);

        Ok(())
    }

    /// Write the Central Directory and return the finished archive.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cd_offset = self.out.len();
        for entry in &self.entries {
            entry.write_cdfh(&mut self.out)?;
        }
        let cd_size = self.out.len() - cd_offset;

        EndOfCentralDirectory::single_disk(
            self.entries.len() as u16,
            u32::try_from(cd_size)?,
            u32::try_from(cd_offset)?,
        )
        .write_to(&mut self.out)?;

        Ok(self.out)
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}
