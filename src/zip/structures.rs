use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use anyhow::{Result, bail};

/// General purpose flag bit 0: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;
/// General purpose flag bit 11: file name is UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// "Version made by" / "version needed" value for plain PKZIP 2.0 features.
pub const ZIP_VERSION: u16 = 20;

/// DOS date for 1980-01-01, the earliest representable day.
///
/// Every entry written by [`ZipWriter`](super::ZipWriter) carries this date and
/// a zero time so that identical inputs produce identical archives.
pub const DOS_EPOCH_DATE: u16 = (1 << 5) | 1;
pub const DOS_EPOCH_TIME: u16 = 0;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::Stored => "Stored",
            CompressionMethod::Deflate => "Defl",
            CompressionMethod::Unknown(_) => "Unk",
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Build the record for a single-disk archive.
    pub fn single_disk(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.disk_number)?;
        out.write_u16::<LittleEndian>(self.disk_with_cd)?;
        out.write_u16::<LittleEndian>(self.disk_entries)?;
        out.write_u16::<LittleEndian>(self.total_entries)?;
        out.write_u32::<LittleEndian>(self.cd_size)?;
        out.write_u32::<LittleEndian>(self.cd_offset)?;
        out.write_u16::<LittleEndian>(self.comment_len)?;
        Ok(())
    }

    /// ZIP64 archives mark the 16/32-bit fields as saturated.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }

    pub fn is_multi_disk(&self) -> bool {
        self.disk_number != 0 || self.disk_with_cd != 0 || self.disk_entries != self.total_entries
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Parsed ZIP file entry information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Read one central directory record, leaving the cursor on the next one.
    pub fn read_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig)?;
        if sig != CDFH_SIGNATURE {
            bail!("Invalid Central Directory File Header");
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let lfh_offset = cursor.read_u32::<LittleEndian>()?;

        if compressed_size == 0xFFFFFFFF
            || uncompressed_size == 0xFFFFFFFF
            || lfh_offset == 0xFFFFFFFF
        {
            bail!("ZIP64 entries are not supported");
        }

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes)?;
        let file_name = String::from_utf8_lossy(&file_name_bytes).into_owned();
        let is_directory = file_name.ends_with('/');

        // Extra fields and the comment carry nothing we use.
        let skip = extra_field_length as u64 + file_comment_length as u64;
        let next = cursor.position() + skip;
        if next > cursor.get_ref().len() as u64 {
            bail!("Central Directory truncated");
        }
        cursor.set_position(next);

        Ok(Self {
            file_name,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            crc32,
            lfh_offset: lfh_offset as u64,
            is_directory,
        })
    }

    /// Write this entry's local file header (without the data that follows it).
    pub fn write_lfh<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(LFH_SIGNATURE)?;
        out.write_u16::<LittleEndian>(ZIP_VERSION)?;
        self.write_common(out)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_all(self.file_name.as_bytes())?;
        Ok(())
    }

    /// Write this entry's central directory record.
    pub fn write_cdfh<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(CDFH_SIGNATURE)?;
        out.write_u16::<LittleEndian>(ZIP_VERSION)?; // version made by
        out.write_u16::<LittleEndian>(ZIP_VERSION)?; // version needed
        self.write_common(out)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_u16::<LittleEndian>(0)?; // comment length
        out.write_u16::<LittleEndian>(0)?; // disk number start
        out.write_u16::<LittleEndian>(0)?; // internal attributes
        out.write_u32::<LittleEndian>(0)?; // external attributes
        out.write_u32::<LittleEndian>(u32::try_from(self.lfh_offset)?)?;
        out.write_all(self.file_name.as_bytes())?;
        Ok(())
    }

    /// Fields shared verbatim by the local and central headers, from the
    /// flags up to and including the file name length.
    fn write_common<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u16::<LittleEndian>(self.flags)?;
        out.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        out.write_u16::<LittleEndian>(DOS_EPOCH_TIME)?;
        out.write_u16::<LittleEndian>(DOS_EPOCH_DATE)?;
        out.write_u32::<LittleEndian>(self.crc32)?;
        out.write_u32::<LittleEndian>(u32::try_from(self.compressed_size)?)?;
        out.write_u32::<LittleEndian>(u32::try_from(self.uncompressed_size)?)?;
        out.write_u16::<LittleEndian>(u16::try_from(self.file_name.len())?)?;
        Ok(())
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Percentage of space saved by compression.
    pub fn ratio(&self) -> u64 {
        if self.uncompressed_size == 0 || self.compressed_size >= self.uncompressed_size {
            0
        } else {
            100 - (self.compressed_size * 100 / self.uncompressed_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ZipFileEntry {
        ZipFileEntry {
            file_name: "die1.png".to_string(),
            flags: FLAG_UTF8,
            compression_method: CompressionMethod::Deflate,
            compressed_size: 10,
            uncompressed_size: 40,
            crc32: 0xDEADBEEF,
            lfh_offset: 123,
            is_directory: false,
        }
    }

    #[test]
    fn test_eocd_written_bytes_parse_back() {
        let eocd = EndOfCentralDirectory::single_disk(3, 150, 900);
        let mut buf = Vec::new();
        eocd.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), EndOfCentralDirectory::SIZE);
        assert_eq!(EndOfCentralDirectory::from_bytes(&buf).unwrap(), eocd);
        assert!(!eocd.is_zip64());
    }

    #[test]
    fn test_eocd_rejects_bad_signature() {
        let buf = [0u8; EndOfCentralDirectory::SIZE];
        assert!(EndOfCentralDirectory::from_bytes(&buf).is_err());
    }

    #[test]
    fn test_cdfh_layout() {
        let mut buf = Vec::new();
        entry().write_cdfh(&mut buf).unwrap();
        assert_eq!(buf.len(), CDFH_MIN_SIZE + "die1.png".len());

        let mut cursor = Cursor::new(buf.as_slice());
        let parsed = ZipFileEntry::read_cdfh(&mut cursor).unwrap();
        assert_eq!(parsed, entry());
        assert_eq!(cursor.position() as usize, buf.len());
    }

    #[test]
    fn test_lfh_layout() {
        let mut buf = Vec::new();
        entry().write_lfh(&mut buf).unwrap();
        assert_eq!(buf.len(), LFH_SIZE + "die1.png".len());
        assert_eq!(&buf[0..4], LFH_SIGNATURE);
        // File name length sits at offset 26.
        assert_eq!(u16::from_le_bytes([buf[26], buf[27]]), 8);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(entry().ratio(), 75);
        let empty = ZipFileEntry {
            uncompressed_size: 0,
            compressed_size: 0,
            ..entry()
        };
        assert_eq!(empty.ratio(), 0);
    }
}
