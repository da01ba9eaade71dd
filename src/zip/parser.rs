//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures
//! from an archive that is already held in memory.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the blob's end
//! 2. Read the Central Directory to get metadata for all files
//! 3. For extraction, read each file's Local File Header to locate its data
//!
//! Every offset taken from the archive is bounds-checked against the blob,
//! so a truncated or corrupt archive produces an error instead of a panic.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use anyhow::{Result, bail};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Low-level ZIP parser over a borrowed archive blob.
///
/// Typically used through [`ZipExtractor`](super::ZipExtractor)
/// rather than directly.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(&blob);
/// for entry in parser.list_files()? {
///     let data = parser.raw_data(&entry)?;
///     // Inflate data...
/// }
/// ```
pub struct ZipParser<'a> {
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the simple case (no comment) and archives with
    /// comments by searching backwards for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in the blob).
    ///
    /// # Errors
    ///
    /// Returns an error if no valid EOCD can be found, indicating
    /// the blob is not a valid ZIP archive.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, usize)> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            bail!("Not a valid ZIP file");
        }

        // Common case first: no trailing comment.
        let offset = size - EndOfCentralDirectory::SIZE;
        let tail = &self.data[offset..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && tail[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(tail)?, offset));
        }

        let search_start = size.saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);
        let window = &self.data[search_start..];

        for i in (0..=window.len() - EndOfCentralDirectory::SIZE).rev() {
            if &window[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            // The comment length must account for exactly the remaining bytes.
            let comment_len = u16::from_le_bytes([window[i + 20], window[i + 21]]) as usize;
            if comment_len == window.len() - i - EndOfCentralDirectory::SIZE {
                let eocd = EndOfCentralDirectory::from_bytes(&window[i..])?;
                return Ok((eocd, search_start + i));
            }
        }

        bail!("Not a valid ZIP file")
    }

    /// List all entries in the archive, directories included.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is malformed, spans multiple
    /// disks, or uses ZIP64 extensions.
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        if eocd.is_zip64() {
            bail!("ZIP64 archives are not supported");
        }
        if eocd.is_multi_disk() {
            bail!("Multi-disk archives are not supported");
        }

        let cd_offset = eocd.cd_offset as usize;
        let cd_end = cd_offset + eocd.cd_size as usize;
        if cd_end > eocd_offset {
            bail!("Central Directory lies outside the archive");
        }

        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut cursor = Cursor::new(&self.data[cd_offset..cd_end]);

        for _ in 0..eocd.total_entries {
            entries.push(ZipFileEntry::read_cdfh(&mut cursor)?);
        }

        Ok(entries)
    }

    /// Get the actual data offset for a file entry.
    ///
    /// The Local File Header has variable-length fields (filename,
    /// extra field) that may differ from the Central Directory entry,
    /// so the header itself must be read.
    pub fn get_data_offset(&self, entry: &ZipFileEntry) -> Result<usize> {
        let lfh_offset = entry.lfh_offset as usize;
        let Some(lfh) = self.data.get(lfh_offset..lfh_offset + LFH_SIZE) else {
            bail!("Local File Header for {} is truncated", entry.file_name);
        };

        if &lfh[0..4] != LFH_SIGNATURE {
            bail!("Invalid Local File Header for {}", entry.file_name);
        }

        let mut cursor = Cursor::new(lfh);
        cursor.set_position(26); // Offset to filename length field

        let file_name_length = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as usize;

        Ok(lfh_offset + LFH_SIZE + file_name_length + extra_field_length)
    }

    /// Borrow the still-compressed bytes of an entry.
    pub fn raw_data(&self, entry: &ZipFileEntry) -> Result<&'a [u8]> {
        let start = self.get_data_offset(entry)?;
        let end = start + entry.compressed_size as usize;
        match self.data.get(start..end) {
            Some(raw) => Ok(raw),
            None => bail!("Data for {} is truncated", entry.file_name),
        }
    }
}
