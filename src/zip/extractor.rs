use bzip2::read::BzDecoder;
use flate2::read::DeflateDecoder;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

use crate::io::ReadAt;

use super::error::ZipError;
use super::parser::ZipParser;
use super::structures::{CompressionMethod, FLAG_LZMA_EOS, ZipFileEntry};

/// Upper bound on the buffer reserved up front for a decompressed entry.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Length of the LZMA properties block stored in front of the stream.
const LZMA_PROPS_SIZE: usize = 5;

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all files in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>, ZipError> {
        self.parser.list_files().await
    }

    /// Read the raw (possibly compressed) bytes of an entry
    async fn read_raw(&self, entry: &ZipFileEntry) -> Result<Vec<u8>, ZipError> {
        let data_offset = self.parser.get_data_offset(entry).await?;

        let end = data_offset
            .checked_add(entry.compressed_size)
            .ok_or(ZipError::Malformed("entry size"))?;
        if end > self.parser.size() {
            return Err(ZipError::Truncated("entry data"));
        }

        let mut buf = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut buf)
            .await
            .map_err(ZipError::reading("entry data"))?;
        Ok(buf)
    }

    /// Extract file data to memory
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>, ZipError> {
        let decoded = match entry.compression_method {
            CompressionMethod::Stored => return self.read_raw(entry).await,
            CompressionMethod::Deflate => {
                let raw = self.read_raw(entry).await?;
                decode(entry, DeflateDecoder::new(raw.as_slice()))
            }
            CompressionMethod::Bzip2 => {
                let raw = self.read_raw(entry).await?;
                decode(entry, BzDecoder::new(raw.as_slice()))
            }
            CompressionMethod::Lzma => {
                let raw = self.read_raw(entry).await?;
                decode_lzma(entry, &raw)
            }
            CompressionMethod::Unknown(method) => {
                return Err(ZipError::UnsupportedCompression {
                    name: entry.file_name.clone(),
                    method,
                });
            }
        }
        .map_err(|source| ZipError::Decompress {
            name: entry.file_name.clone(),
            source,
        })?;

        debug!(
            name = %entry.file_name,
            method = entry.compression_method.as_u16(),
            compressed = entry.compressed_size,
            uncompressed = decoded.len(),
            "decompressed entry"
        );
        Ok(decoded)
    }
}

/// Drain a decoder into a buffer sized from the entry's declared length.
fn decode(entry: &ZipFileEntry, mut decoder: impl Read) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(entry.uncompressed_size.min(MAX_PREALLOCATION) as usize);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decode a ZIP LZMA payload.
///
/// ZIP stores a 2-byte encoder version, a 2-byte properties length and the
/// properties before the raw stream. liblzma reads the older `.lzma` layout
/// instead, which is the properties followed by the uncompressed size, so
/// that header is rebuilt in front of the stream.
fn decode_lzma(entry: &ZipFileEntry, raw: &[u8]) -> io::Result<Vec<u8>> {
    let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, msg.to_string());

    if raw.len() < 4 {
        return Err(invalid("LZMA header is truncated"));
    }
    let props_size = u16::from_le_bytes([raw[2], raw[3]]) as usize;
    if props_size != LZMA_PROPS_SIZE || raw.len() < 4 + props_size {
        return Err(invalid("LZMA properties are malformed"));
    }

    // With an end-of-stream marker the size is left unknown.
    let size = if entry.flags & FLAG_LZMA_EOS != 0 {
        u64::MAX
    } else {
        entry.uncompressed_size
    };
    let mut header = Vec::with_capacity(props_size + 8);
    header.extend_from_slice(&raw[4..4 + props_size]);
    header.extend_from_slice(&size.to_le_bytes());

    let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX).map_err(io::Error::other)?;
    let input = header.as_slice().chain(&raw[4 + props_size..]);
    decode(entry, xz2::read::XzDecoder::new_stream(input, stream))
}
