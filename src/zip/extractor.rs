use flate2::read::DeflateDecoder;
use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Upper bound on buffer space reserved up front from a header's size field.
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

/// ZIP file extractor over an in-memory archive.
pub struct ZipExtractor<'a> {
    parser: ZipParser<'a>,
}

impl<'a> ZipExtractor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            parser: ZipParser::new(data),
        }
    }

    /// List all files in the archive
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files()
    }

    /// Decompress a single entry into memory.
    pub fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            bail!("Entry {} is encrypted", entry.file_name);
        }

        let raw = self.parser.raw_data(entry)?;
        let declared = entry.uncompressed_size;
        let mut buf = Vec::with_capacity((declared as usize).min(MAX_PREALLOCATION));

        match entry.compression_method {
            CompressionMethod::Stored => buf.extend_from_slice(raw),
            CompressionMethod::Deflate => {
                // One byte past the declared size is enough to detect a lie.
                DeflateDecoder::new(raw)
                    .take(declared + 1)
                    .read_to_end(&mut buf)
                    .with_context(|| format!("Failed to inflate {}", entry.file_name))?;
            }
            CompressionMethod::Unknown(method) => {
                bail!(
                    "Unsupported compression method {} for {}",
                    method,
                    entry.file_name
                );
            }
        }

        if buf.len() as u64 > declared {
            bail!(
                "{} inflates past its declared size of {} bytes",
                entry.file_name,
                declared
            );
        }
        if buf.len() as u64 != declared {
            bail!(
                "Size mismatch for {}: expected {} bytes, got {}",
                entry.file_name,
                declared,
                buf.len()
            );
        }

        Ok(buf)
    }

    /// Decompress every file in a single pass into a name to bytes table.
    ///
    /// Directory entries are skipped. Any failing entry fails the whole pass,
    /// so a returned table is always complete.
    pub fn extract_all(&self) -> Result<HashMap<String, Vec<u8>>> {
        let entries = self.list_files()?;
        let mut files = HashMap::with_capacity(entries.len());

        for entry in entries.iter().filter(|e| !e.is_directory) {
            let data = self.extract_to_memory(entry)?;
            files.insert(entry.file_name.clone(), data);
        }

        Ok(files)
    }
}
