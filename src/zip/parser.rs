//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//! 4. For extraction, read each file's Local File Header and data
//!
//! Every offset taken from the archive is checked against its size before
//! anything is allocated or read, so arbitrary bytes fail with a
//! structural [`ZipError`] instead of a panic or a huge allocation.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::io::ReadAt;

use super::error::ZipError;
use super::names::decode_name;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Header id of the ZIP64 extended information extra field.
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Low-level ZIP file parser.
///
/// Typically used through [`ZipExtractor`](super::ZipExtractor)
/// rather than directly.
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

/// Location of the Central Directory, from either EOCD flavour.
struct DirectoryLocation {
    offset: u64,
    size: u64,
    entries: u64,
    /// Length of any data in front of the archive proper
    base: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Returns the record together with its offset in the archive. Fails
    /// with [`ZipError::NotZip`] when no signature exists in the tail of
    /// the data.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64), ZipError> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            return Err(ZipError::NotZip);
        }

        // Common case: no archive comment, the record is the last 22 bytes.
        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader
            .read_exact_at(offset, &mut buf)
            .await
            .map_err(ZipError::reading("end of central directory record"))?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            return Ok((EndOfCentralDirectory::from_bytes(&buf)?, offset));
        }

        // Otherwise take the last signature in the area a comment could cover.
        // Its comment length is not checked against the bytes after it, so
        // archives with trailing data still open.
        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader
            .read_exact_at(search_start, &mut buf)
            .await
            .map_err(ZipError::reading("archive comment"))?;

        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        Err(ZipError::NotZip)
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Returns the record and its offset. The record is looked for right
    /// before the locator first, which stays correct when data was
    /// prepended to the archive, then at the offset the locator stores.
    pub async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<(Zip64EOCD, u64), ZipError> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or(ZipError::Malformed("ZIP64 end of central directory locator"))?;

        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        self.reader
            .read_exact_at(locator_offset, &mut locator_buf)
            .await
            .map_err(ZipError::reading("ZIP64 end of central directory locator"))?;
        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        if let Some(adjacent) = locator_offset.checked_sub(Zip64EOCD::MIN_SIZE as u64) {
            self.reader
                .read_exact_at(adjacent, &mut eocd64_buf)
                .await
                .map_err(ZipError::reading("ZIP64 end of central directory record"))?;
            if let Ok(eocd64) = Zip64EOCD::from_bytes(&eocd64_buf) {
                return Ok((eocd64, adjacent));
            }
        }

        self.reader
            .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
            .await
            .map_err(ZipError::reading("ZIP64 end of central directory record"))?;

        Ok((Zip64EOCD::from_bytes(&eocd64_buf)?, locator.eocd64_offset))
    }

    async fn locate_directory(&self) -> Result<DirectoryLocation, ZipError> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (offset, size, entries, directory_end) = if eocd.is_zip64() {
            let (eocd64, eocd64_offset) = self.read_zip64_eocd(eocd_offset).await?;
            (
                eocd64.cd_offset,
                eocd64.cd_size,
                eocd64.total_entries,
                eocd64_offset,
            )
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
                eocd_offset,
            )
        };

        // The directory ends where the end records begin. Any gap between
        // that and the stored offsets is data prepended to the archive,
        // which shifts every stored offset by the same amount.
        let base = directory_end
            .checked_sub(size)
            .and_then(|start| start.checked_sub(offset))
            .ok_or(ZipError::Malformed("central directory location"))?;

        let location = DirectoryLocation {
            offset: offset + base,
            size,
            entries,
            base,
        };

        // Each header takes at least CDFH_MIN_SIZE bytes of the directory.
        if location.entries > location.size / CDFH_MIN_SIZE as u64 {
            return Err(ZipError::Malformed("central directory entry count"));
        }

        debug!(
            offset = location.offset,
            size = location.size,
            entries = location.entries,
            prepended = location.base,
            zip64 = eocd.is_zip64(),
            comment_len = eocd.comment_len,
            "located central directory"
        );
        Ok(location)
    }

    /// List all entries of the archive, in Central Directory order.
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>, ZipError> {
        let location = self.locate_directory().await?;

        // The whole directory is small enough to read in one go.
        let mut cd_data = vec![0u8; location.size as usize];
        self.reader
            .read_exact_at(location.offset, &mut cd_data)
            .await
            .map_err(ZipError::reading("central directory"))?;

        let mut entries = Vec::with_capacity(location.entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for _ in 0..location.entries {
            let mut entry = Self::parse_cdfh(&mut cursor).map_err(|err| match err {
                ZipError::Truncated(_) => ZipError::Truncated("central directory file header"),
                other => other,
            })?;
            entry.lfh_offset = entry
                .lfh_offset
                .checked_add(location.base)
                .ok_or(ZipError::Malformed("local file header offset"))?;
            trace!(
                name = %entry.file_name,
                method = entry.compression_method.as_u16(),
                "parsed entry"
            );
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Parse a Central Directory File Header from a cursor.
    fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry, ZipError> {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig)?;
        if sig != CDFH_SIGNATURE {
            return Err(ZipError::Malformed("central directory file header"));
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let _crc32 = cursor.read_u32::<LittleEndian>()?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes)?;
        let file_name = decode_name(&file_name_bytes, flags);
        let is_directory = file_name.ends_with('/');

        let extra_field_end = cursor.position() + extra_field_length as u64;

        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>()?;
            let field_size = cursor.read_u16::<LittleEndian>()? as u64;
            let field_end = cursor.position() + field_size;

            if header_id == ZIP64_EXTRA_ID {
                // Only the fields saturated in the fixed header are present, in order.
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    compressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    lfh_offset = cursor.read_u64::<LittleEndian>()?;
                }
            }

            cursor.set_position(field_end);
        }

        // Skip the rest of the extra field and the file comment.
        cursor.set_position(extra_field_end + file_comment_length as u64);
        if cursor.position() > cursor.get_ref().len() as u64 {
            return Err(ZipError::Truncated("central directory file header"));
        }

        Ok(ZipFileEntry {
            file_name,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            flags,
            lfh_offset,
            is_directory,
        })
    }

    /// Get the offset of an entry's compressed data.
    ///
    /// The Local File Header carries its own name and extra lengths, which
    /// may differ from the Central Directory copy.
    pub async fn get_data_offset(&self, entry: &ZipFileEntry) -> Result<u64, ZipError> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader
            .read_exact_at(entry.lfh_offset, &mut lfh_buf)
            .await
            .map_err(ZipError::reading("local file header"))?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            return Err(ZipError::Malformed("local file header"));
        }

        let mut cursor = Cursor::new(&lfh_buf[26..]);
        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
