use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::ZipError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Bzip2,
    Lzma,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Bzip2 => 12,
            CompressionMethod::Lzma => 14,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Malformed("end of central directory record"));
        }

        // Skip the two disk number fields; multi-disk archives are not read.
        let mut cursor = Cursor::new(&data[8..]);

        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EOCDLocator {
    pub eocd64_offset: u64,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Malformed("ZIP64 end of central directory locator"));
        }

        let mut cursor = Cursor::new(&data[8..]);

        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EOCD {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Malformed("ZIP64 end of central directory record"));
        }

        // Record size, versions, disk numbers and per-disk entry count precede
        // the fields we need.
        let mut cursor = Cursor::new(&data[32..]);

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag: LZMA stream ends with an end-of-stream marker
pub const FLAG_LZMA_EOS: u16 = 1 << 1;

/// General purpose flag: name and comment are UTF-8 rather than CP437
pub const FLAG_UTF8: u16 = 1 << 11;

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub flags: u16,
    pub lfh_offset: u64,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Final path segment of the stored name.
    pub fn base_name(&self) -> &str {
        self.file_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eocd_bytes(total_entries: u16, cd_size: u32, cd_offset: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        buf.extend_from_slice(&[0, 0, 0, 0]);
        buf.extend_from_slice(&total_entries.to_le_bytes());
        buf.extend_from_slice(&total_entries.to_le_bytes());
        buf.extend_from_slice(&cd_size.to_le_bytes());
        buf.extend_from_slice(&cd_offset.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf
    }

    #[test]
    fn parses_eocd_fields() {
        let eocd = EndOfCentralDirectory::from_bytes(&eocd_bytes(3, 150, 1024)).unwrap();
        assert_eq!(eocd.total_entries, 3);
        assert_eq!(eocd.cd_size, 150);
        assert_eq!(eocd.cd_offset, 1024);
        assert!(!eocd.is_zip64());
    }

    #[test]
    fn saturated_eocd_fields_mean_zip64() {
        let eocd = EndOfCentralDirectory::from_bytes(&eocd_bytes(0xFFFF, 0, 0)).unwrap();
        assert!(eocd.is_zip64());
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut bytes = eocd_bytes(1, 46, 0);
        bytes[3] = 0x07;
        let err = EndOfCentralDirectory::from_bytes(&bytes).err().unwrap();
        assert!(err.is_structural());
    }

    #[test]
    fn compression_method_round_trips_unknown_codes() {
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_u16(12), CompressionMethod::Bzip2);
        assert_eq!(CompressionMethod::from_u16(14), CompressionMethod::Lzma);
        assert_eq!(CompressionMethod::from_u16(99).as_u16(), 99);
    }

    #[test]
    fn base_name_strips_directories() {
        let entry = ZipFileEntry {
            file_name: "LP32/CG/FOO.GIF".to_string(),
            compression_method: CompressionMethod::Stored,
            compressed_size: 0,
            uncompressed_size: 0,
            flags: 0,
            lfh_offset: 0,
            is_directory: false,
        };
        assert_eq!(entry.base_name(), "FOO.GIF");
    }
}
