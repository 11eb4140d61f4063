//! ZIP archive parsing and extraction.
//!
//! The downloaded archive is held in memory and read through the
//! [`ReadAt`](crate::io::ReadAt) seam, so the same code reads any source
//! that supports random access.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`extractor`]: Decoding of entry payloads
//! - [`error`]: The [`ZipError`] type shared by all of the above
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED, DEFLATE, BZIP2 and LZMA methods
//! - Archives with data prepended (self-extractor stubs) or appended
//! - CP437 entry names when the UTF-8 flag is clear
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No CRC verification

mod error;
mod extractor;
mod names;
mod parser;
mod structures;

pub use error::ZipError;
pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
