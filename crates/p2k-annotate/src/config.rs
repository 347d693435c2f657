// Batch run configuration

use crate::lookup::SNAPSHOT_SUFFIX;
use p2k_common::{P2kError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = "gbk";
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".ko.out";
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory holding Prokka `.gbk` files
    pub input_dir: PathBuf,

    /// Directory for `.ko.out` files, created if missing
    pub output_dir: PathBuf,

    /// Gzip'd accession/KO table
    pub lookup_source: PathBuf,

    /// Input file extension, without the dot
    pub extension: String,

    /// Appended to the input file name to name its output
    pub output_suffix: String,

    /// Appended to the lookup source path to name its snapshot
    pub snapshot_suffix: String,

    /// Files processed at once
    pub concurrency: usize,

    /// Abort on the first failed file instead of continuing
    pub fail_fast: bool,

    /// Cold load even when a snapshot exists, then overwrite it
    pub rebuild_snapshot: bool,

    /// Log accessions with no KO codes at warn level
    pub report_unmatched: bool,

    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl BatchConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        lookup_source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            lookup_source: lookup_source.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            snapshot_suffix: SNAPSHOT_SUFFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            fail_fast: false,
            rebuild_snapshot: false,
            report_unmatched: false,
            show_progress: false,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_rebuild_snapshot(mut self, rebuild: bool) -> Self {
        self.rebuild_snapshot = rebuild;
        self
    }

    pub fn with_report_unmatched(mut self, report: bool) -> Self {
        self.report_unmatched = report;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(P2kError::config("concurrency must be at least 1"));
        }
        if self.extension.is_empty() {
            return Err(P2kError::config("input extension must not be empty"));
        }
        if self.output_suffix.is_empty() {
            // Output names must differ from input names
            return Err(P2kError::config("output suffix must not be empty"));
        }
        if !self.input_dir.is_dir() {
            return Err(P2kError::config(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }
        Ok(())
    }

    /// Output path for an input file: `<output_dir>/<file name><suffix>`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let mut name = input.file_name().unwrap_or(input.as_os_str()).to_owned();
        name.push(&self.output_suffix);
        self.output_dir.join(name)
    }
}
