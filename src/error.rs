//! Outcome taxonomy of a setup run.
//!
//! Every failure ends the run and maps to exactly one of three variants.
//! The `Display` form of each variant is the line printed to the user.

use std::error::Error as StdError;
use thiserror::Error;

use crate::io::FetchError;
use crate::zip::ZipError;

#[derive(Debug, Error)]
pub enum SetupError {
    /// The archive could not be downloaded
    #[error("Error downloading the file: {}", with_causes(.0))]
    Download(#[from] FetchError),

    /// The downloaded bytes are not a ZIP container
    #[error("Error: The downloaded file is not a valid zip file.")]
    InvalidArchive(#[source] ZipError),

    /// Anything else: filesystem failures, undecodable entries
    #[error("An unexpected error occurred: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

/// `err` followed by each of its sources, separated by `: `.
///
/// reqwest keeps the reason a request failed (refused connection, DNS,
/// TLS) in the source chain rather than in its own message.
fn with_causes(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<ZipError> for SetupError {
    fn from(err: ZipError) -> Self {
        if err.is_structural() {
            SetupError::InvalidArchive(err)
        } else {
            SetupError::Unexpected(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn download_message_carries_the_status() {
        let err = SetupError::from(FetchError::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://example.invalid/lp32.zip".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Error downloading the file: 404 Not Found for url: http://example.invalid/lp32.zip"
        );
    }

    #[test]
    fn structural_zip_errors_are_invalid_archive() {
        let err = SetupError::from(ZipError::NotZip);
        assert!(matches!(err, SetupError::InvalidArchive(_)));
        assert_eq!(
            err.to_string(),
            "Error: The downloaded file is not a valid zip file."
        );
    }

    #[test]
    fn decoding_errors_are_unexpected() {
        let err = SetupError::from(ZipError::UnsupportedCompression {
            name: "lp32/cg/a.gif".to_string(),
            method: 99,
        });
        assert!(matches!(err, SetupError::Unexpected(_)));
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: unsupported compression method 99 for lp32/cg/a.gif"
        );
    }

    #[test]
    fn unexpected_message_includes_the_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err = SetupError::from(anyhow::Error::new(io).context("failed to write cg/a.gif"));
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: failed to write cg/a.gif: permission denied"
        );
    }
}
