// Batch driver
//
// Loads the lookup table once, then runs scan -> resolve -> write for every
// annotation file in the input directory. Files are independent, so they
// are processed in parallel on the blocking pool with the table shared
// read-only behind an Arc.

use crate::config::BatchConfig;
use crate::lookup::{self, LoadMode, LookupTable};
use crate::progress;
use crate::resolver::{self, ResolutionStats};
use crate::scanner::AnnotationFile;
use crate::writer;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use p2k_common::{P2kError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use walkdir::WalkDir;

/// Result of one annotation file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: ResolutionStats,
    pub lines_written: usize,
}

/// A file that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Totals for a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub files_found: usize,
    pub files_processed: usize,
    pub files: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
    pub totals: ResolutionStats,
    pub lines_written: usize,
    pub load_mode: LoadMode,
    pub duration_seconds: f64,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Annotation files directly inside `dir` with the given extension, by name
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| P2kError::file(dir, e.into()))?;
        if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(extension)) {
            inputs.push(entry.into_path());
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Scan, resolve and write a single annotation file
pub fn process_file(
    input: &Path,
    output: &Path,
    table: &LookupTable,
    report_unmatched: bool,
) -> Result<FileOutcome> {
    let _span = info_span!("file", input = %input.display()).entered();
    info!("Parsing annotation file");

    let file = AnnotationFile::open(input)?;
    debug!(lines = file.line_count(), "Annotation file read");
    let genes = file.scan()?;
    let resolution = resolver::resolve(genes, table);
    let stats = resolution.stats();

    if !resolution.unmatched.is_empty() {
        if report_unmatched {
            warn!(
                count = resolution.unmatched.len(),
                accessions = %resolution.unmatched.join(" "),
                "UniProtKB accessions without KO codes"
            );
        } else {
            debug!(count = resolution.unmatched.len(), "UniProtKB accessions without KO codes");
        }
    }

    let lines_written = writer::write(&resolution.records, output)?;
    info!(
        genes = stats.genes,
        matched = stats.matched,
        lines = lines_written,
        output = %output.display(),
        "Wrote KO assignments"
    );

    Ok(FileOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stats,
        lines_written,
    })
}

pub struct BatchDriver {
    config: BatchConfig,
}

impl BatchDriver {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Run the whole batch
    ///
    /// Per-file failures are collected in the summary unless `fail_fast` is
    /// set, in which case the first one is returned as the error. With
    /// `fail_fast`, files not yet started are skipped and files already in
    /// flight are allowed to finish before returning.
    pub async fn run(&self) -> Result<BatchSummary> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;

        std::fs::create_dir_all(&config.output_dir)
            .map_err(|e| P2kError::file(&config.output_dir, e))?;

        let inputs = discover_inputs(&config.input_dir, &config.extension)?;
        info!(
            count = inputs.len(),
            input_dir = %config.input_dir.display(),
            "{} .{} files found",
            inputs.len(),
            config.extension
        );

        let (table, load_mode) = self.load_table().await?;
        let table = Arc::new(table);

        let files_found = inputs.len();
        let bar = if config.show_progress {
            progress::create_file_progress(files_found as u64, "Assigning KO codes")
        } else {
            ProgressBar::hidden()
        };

        let aborted = Arc::new(AtomicBool::new(false));

        let mut results = stream::iter(inputs)
            .map(|input| {
                let table = Arc::clone(&table);
                let aborted = Arc::clone(&aborted);
                let output = config.output_path_for(&input);
                let report = config.report_unmatched;
                async move {
                    if aborted.load(Ordering::Acquire) {
                        return (input, None);
                    }
                    let task_input = input.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        process_file(&task_input, &output, &table, report)
                    })
                    .await
                    .map_err(|e| P2kError::Task(e.to_string()))
                    .and_then(|r| r);
                    (input, Some(result))
                }
            })
            .buffer_unordered(config.concurrency);

        let mut outcomes = Vec::with_capacity(files_found);
        let mut failures = Vec::new();
        let mut first_error = None;

        while let Some((input, result)) = results.next().await {
            bar.inc(1);
            let Some(result) = result else {
                debug!(input = %input.display(), "Skipped after earlier failure");
                continue;
            };
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if config.fail_fast => {
                    error!(input = %input.display(), error = %e, "File failed, aborting batch");
                    aborted.store(true, Ordering::Release);
                    first_error.get_or_insert(e);
                },
                Err(e) => {
                    error!(input = %input.display(), error = %e, "File failed, continuing");
                    failures.push(FileFailure {
                        input,
                        error: e.to_string(),
                    });
                },
            }
        }
        if let Some(e) = first_error {
            bar.abandon();
            return Err(e);
        }
        bar.finish_and_clear();

        let mut totals = ResolutionStats::default();
        for outcome in &outcomes {
            totals.merge(&outcome.stats);
        }
        outcomes.sort_by(|a, b| a.input.cmp(&b.input));
        failures.sort_by(|a, b| a.input.cmp(&b.input));

        let summary = BatchSummary {
            files_found,
            files_processed: outcomes.len(),
            lines_written: outcomes.iter().map(|o| o.lines_written).sum(),
            files: outcomes,
            failures,
            totals,
            load_mode,
            duration_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            files = summary.files_processed,
            failed = summary.failures.len(),
            genes = summary.totals.genes,
            matched = summary.totals.matched,
            unmatched = summary.totals.unmatched,
            "Batch complete in {:.2}s",
            summary.duration_seconds
        );
        Ok(summary)
    }

    async fn load_table(&self) -> Result<(LookupTable, LoadMode)> {
        let source = self.config.lookup_source.clone();
        let suffix = self.config.snapshot_suffix.clone();
        let rebuild = self.config.rebuild_snapshot;

        let spinner = if self.config.show_progress {
            progress::create_spinner("Loading UniProtKB -> KO table")
        } else {
            ProgressBar::hidden()
        };

        let loaded =
            tokio::task::spawn_blocking(move || lookup::load_or_build(&source, &suffix, rebuild))
                .await
                .map_err(|e| P2kError::Task(e.to_string()))?;
        spinner.finish_and_clear();

        let (table, mode) = loaded?;
        debug!(
            accessions = table.len(),
            codes = table.code_count(),
            mode = ?mode,
            "Lookup table ready"
        );
        Ok((table, mode))
    }
}
