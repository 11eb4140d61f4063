//! # cgfetch
//!
//! Downloads the `lp32.zip` archive and extracts the GIF images stored
//! under its `lp32/cg/` directory into a local `cg/` directory, with
//! lowercased file names.
//!
//! The archive is fetched with a single HTTP GET, buffered in memory and
//! read with a small ZIP reader supporting STORED, DEFLATE, BZIP2 and LZMA
//! entries and ZIP64 archives. Every input of a run lives in [`SetupConfig`], whose default
//! holds the fixed source and destination, and the transport sits behind
//! the [`Fetch`] trait so runs can be driven from memory.
//!
//! ## Example
//!
//! ```no_run
//! use cgfetch::{HttpFetcher, Setup, SetupConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let setup = Setup::new(SetupConfig::default(), HttpFetcher::new()?);
//!     let report = setup.run().await?;
//!     println!("{} files in {}", report.extracted.len(), report.output_dir.display());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod setup;
pub mod zip;

pub use cli::Cli;
pub use config::SetupConfig;
pub use error::SetupError;
pub use io::{Fetch, FetchError, HttpFetcher, MemoryReader, ReadAt};
pub use setup::{Setup, SetupReport};
pub use zip::{ZipError, ZipExtractor, ZipFileEntry};
