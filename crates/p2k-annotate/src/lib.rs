//! prokka2kegg annotation library
//!
//! Assigns KEGG Orthology (KO) codes to Prokka-annotated genes using the
//! UniProtKB accessions in their similarity evidence.
//!
//! # Pipeline
//!
//! - **Scan** ([`scanner`]): pull `(locus_tag, UniProtKB accession)` pairs
//!   out of each CDS feature of a `.gbk` file
//! - **Load** ([`lookup`]): accession → KO table, from the gzip'd UniProt
//!   idmapping extract or from its JSON snapshot
//! - **Resolve** ([`resolver`]): attach KO codes to each gene
//! - **Write** ([`writer`]): `locus_tag<TAB>KO` lines
//!
//! [`batch`] runs the pipeline over a directory of annotation files.
//!
//! # Example
//!
//! ```no_run
//! use p2k_annotate::{load, resolve, scan, write};
//!
//! fn main() -> p2k_common::Result<()> {
//!     let table = load("idmapping_KO.tab.gz", false)?;
//!     let genes = scan("genome.gbk")?;
//!     let resolution = resolve(genes, &table);
//!     write(&resolution.records, "genome.gbk.ko.out")?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod batch;
pub mod config;
pub mod decompression;
pub mod lookup;
pub mod models;
pub mod progress;
pub mod resolver;
pub mod scanner;
pub mod writer;

pub use batch::{BatchDriver, BatchSummary};
pub use config::BatchConfig;
pub use lookup::{load, LoadMode, LookupTable};
pub use models::{GeneRecord, ResolvedRecord};
pub use resolver::{resolve, Resolution};
pub use scanner::{scan, AnnotationFile};
pub use writer::write;

use clap::Parser;
use std::path::PathBuf;

/// prokka2kegg - assign KO codes to Prokka genes via UniProtKB accessions
#[derive(Parser, Debug)]
#[command(name = "prokka2kegg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing Prokka *.gbk files
    #[arg(short, long, value_name = "INPUT_DIR", env = "P2K_INPUT")]
    pub input: PathBuf,

    /// Directory for *.ko.out files (created if missing)
    #[arg(short, long, value_name = "OUTPUT_DIR", env = "P2K_OUTPUT")]
    pub output: PathBuf,

    /// Gzip'd UniProtKB -> KO table (idmapping_KO.tab.gz); a JSON snapshot
    /// is written next to it on first use
    #[arg(short, long, value_name = "TABLE", env = "P2K_DATA")]
    pub data: PathBuf,

    /// Annotation files processed in parallel
    #[arg(short = 'j', long, env = "P2K_CONCURRENCY", default_value_t = config::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Input file extension
    #[arg(long, env = "P2K_EXTENSION", default_value = config::DEFAULT_EXTENSION)]
    pub extension: String,

    /// Stop at the first file that fails
    #[arg(long, env = "P2K_FAIL_FAST")]
    pub fail_fast: bool,

    /// Rebuild the snapshot from the compressed table
    #[arg(long)]
    pub rebuild_snapshot: bool,

    /// Log UniProtKB accessions that have no KO codes
    #[arg(long, env = "P2K_REPORT_UNMATCHED")]
    pub report_unmatched: bool,

    /// Write a JSON run summary to this path
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::new(&self.input, &self.output, &self.data)
            .with_extension(self.extension.as_str())
            .with_concurrency(self.concurrency)
            .with_fail_fast(self.fail_fast)
            .with_rebuild_snapshot(self.rebuild_snapshot)
            .with_report_unmatched(self.report_unmatched)
    }
}
