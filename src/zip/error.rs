use std::io;

use thiserror::Error;

/// Errors raised while reading a ZIP container.
#[derive(Debug, Error)]
pub enum ZipError {
    /// No End of Central Directory record could be located.
    #[error("not a ZIP file: end of central directory record not found")]
    NotZip,

    /// A record was found but its contents are inconsistent.
    #[error("invalid {0}")]
    Malformed(&'static str),

    /// A record or payload extends past the end of the archive.
    #[error("unexpected end of archive while reading {0}")]
    Truncated(&'static str),

    #[error("unsupported compression method {method} for {name}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("failed to decompress {name}")]
    Decompress {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(io::Error),
}

impl ZipError {
    /// Whether the error means the bytes do not form a valid ZIP container,
    /// as opposed to a valid container we cannot decode.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ZipError::NotZip | ZipError::Malformed(_) | ZipError::Truncated(_)
        )
    }

    /// Map an I/O error raised while reading `what`.
    pub(crate) fn reading(what: &'static str) -> impl FnOnce(io::Error) -> ZipError {
        move |err| match err.kind() {
            io::ErrorKind::UnexpectedEof => ZipError::Truncated(what),
            _ => ZipError::Io(err),
        }
    }
}

impl From<io::Error> for ZipError {
    fn from(err: io::Error) -> Self {
        ZipError::reading("archive")(err)
    }
}
