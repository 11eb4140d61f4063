//! The download-and-extract pipeline.

use anyhow::Context;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, trace};

use crate::config::SetupConfig;
use crate::error::SetupError;
use crate::io::{Fetch, MemoryReader};
use crate::zip::{ZipExtractor, ZipFileEntry};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub output_dir: PathBuf,
    /// Names written under `output_dir`, in processing order. A name appears
    /// twice when a later entry overwrote an earlier one.
    pub extracted: Vec<String>,
}

/// Downloads the configured archive and extracts the matching entries.
pub struct Setup<F: Fetch> {
    config: SetupConfig,
    fetcher: F,
    quiet: bool,
}

impl<F: Fetch> Setup<F> {
    pub fn new(config: SetupConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            quiet: false,
        }
    }

    /// Suppress progress lines.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn progress<W: Write>(&self, out: &mut W, line: impl Display) -> anyhow::Result<()> {
        if !self.quiet {
            writeln!(out, "{line}").context("failed to write progress")?;
        }
        Ok(())
    }

    /// Run the whole pipeline once, printing progress on stdout.
    pub async fn run(&self) -> Result<SetupReport, SetupError> {
        self.run_with_output(&mut io::stdout()).await
    }

    /// Run the whole pipeline once, printing progress to `out`.
    ///
    /// The output directory is created first, then the archive is fetched
    /// and fully buffered, then every selected entry is written in archive
    /// order. The first failure ends the run; files written before it stay
    /// on disk.
    pub async fn run_with_output<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<SetupReport, SetupError> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        self.progress(out, format_args!("Downloading {}...", self.config.source_url))?;
        let body = self.fetcher.fetch(&self.config.source_url).await?;
        debug!(bytes = body.len(), "archive buffered");

        self.progress(out, "Extracting files...")?;
        let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(body)));
        let entries = extractor.list_files().await?;

        let mut report = SetupReport {
            output_dir: output_dir.clone(),
            extracted: Vec::new(),
        };

        for entry in &entries {
            if entry.is_directory || !self.config.selects(&entry.file_name) {
                trace!(name = %entry.file_name, "skipped");
                continue;
            }

            let file_name = output_file_name(entry);
            let data = extractor.extract_to_memory(entry).await?;

            let path = output_dir.join(&file_name);
            fs::write(&path, &data)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;

            debug!(name = %entry.file_name, path = %path.display(), bytes = data.len(), "extracted");
            self.progress(out, format_args!("  - Extracted: {file_name}"))?;
            report.extracted.push(file_name);
        }

        debug!(
            entries = entries.len(),
            extracted = report.extracted.len(),
            "extraction finished"
        );
        self.progress(out, "Setup complete.")?;
        Ok(report)
    }
}

/// Name an entry is written under: its last path segment, lowercased.
pub fn output_file_name(entry: &ZipFileEntry) -> String {
    entry.base_name().to_lowercase()
}
