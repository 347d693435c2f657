// Prokka GenBank feature-table scanner
//
// Extracts (locus_tag, UniProtKB accession) pairs from CDS features. Only
// four line shapes matter; everything else in the file is skipped. The
// fixed column widths below are the GenBank feature-table layout: feature
// keys start at column 6, qualifiers at column 22.

use crate::models::GeneRecord;
use p2k_common::{P2kError, Result};
use std::iter::{Enumerate, FusedIterator};
use std::path::{Path, PathBuf};
use std::slice;
use tracing::{debug, trace};

/// 5 spaces + CDS feature key
const CDS_FEATURE: &str = "     CDS";
/// 21 spaces + qualifier keys
const LOCUS_TAG_QUALIFIER: &str = "                     /locus_tag=";
const SIMILAR_INFERENCE_QUALIFIER: &str = "                     /inference=\"similar";
const CODON_START_QUALIFIER: &str = "                     /codon_start";

const UNIPROTKB_MARKER: &str = "UniProtKB:";

pub fn is_feature_start(line: &str) -> bool {
    line.starts_with(CDS_FEATURE)
}

pub fn is_locus_tag_line(line: &str) -> bool {
    line.starts_with(LOCUS_TAG_QUALIFIER)
}

pub fn is_inference_line(line: &str) -> bool {
    line.starts_with(SIMILAR_INFERENCE_QUALIFIER)
}

pub fn is_codon_start_line(line: &str) -> bool {
    line.starts_with(CODON_START_QUALIFIER)
}

/// First double-quoted value on the line
fn extract_quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    Some(&line[start..start + len])
}

/// Text between `UniProtKB:` and the last double quote after it
///
/// `/inference="similar to AA sequence:UniProtKB:Q01465"` -> `Q01465`
fn extract_accession(line: &str) -> Option<&str> {
    let start = line.find(UNIPROTKB_MARKER)? + UNIPROTKB_MARKER.len();
    let rest = &line[start..];
    let end = rest.rfind('"')?;
    Some(&rest[..end])
}

/// Scanner position within the current CDS feature
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Outside any CDS feature
    #[default]
    Idle,
    /// Inside a CDS feature, locus tag not seen yet
    AwaitingLocusTag,
    /// Locus tag captured, waiting for similarity evidence or `/codon_start`
    AwaitingEvidence { local_id: String },
}

/// What a single line did to the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Line irrelevant in the current state
    Ignore,
    /// CDS feature opened
    Open,
    /// Another CDS started before the previous one was closed; the
    /// previous feature is dropped without a record
    Restart,
    /// Locus tag captured
    Capture,
    /// Feature closed
    Emit(GeneRecord),
}

impl ScanState {
    /// Apply one line. On error the line carried a recognized qualifier
    /// whose value could not be extracted.
    pub fn advance(&mut self, line: &str) -> std::result::Result<Transition, &'static str> {
        match std::mem::take(self) {
            ScanState::Idle => {
                if is_feature_start(line) {
                    *self = ScanState::AwaitingLocusTag;
                    Ok(Transition::Open)
                } else {
                    Ok(Transition::Ignore)
                }
            },
            ScanState::AwaitingLocusTag => {
                if is_locus_tag_line(line) {
                    let local_id =
                        extract_quoted(line).ok_or("locus tag qualifier has no quoted value")?;
                    if local_id.is_empty() {
                        return Err("locus tag qualifier is empty");
                    }
                    *self = ScanState::AwaitingEvidence {
                        local_id: local_id.to_string(),
                    };
                    Ok(Transition::Capture)
                } else {
                    *self = ScanState::AwaitingLocusTag;
                    if is_feature_start(line) {
                        Ok(Transition::Restart)
                    } else {
                        Ok(Transition::Ignore)
                    }
                }
            },
            ScanState::AwaitingEvidence { local_id } => {
                if is_inference_line(line) {
                    let accession = extract_accession(line)
                        .ok_or("similarity inference has no UniProtKB accession")?;
                    Ok(Transition::Emit(GeneRecord::new(
                        local_id,
                        Some(accession.to_string()),
                    )))
                } else if is_codon_start_line(line) {
                    Ok(Transition::Emit(GeneRecord::new(local_id, None)))
                } else if is_feature_start(line) {
                    debug!(%local_id, "CDS ended without evidence, dropped");
                    *self = ScanState::AwaitingLocusTag;
                    Ok(Transition::Restart)
                } else {
                    *self = ScanState::AwaitingEvidence { local_id };
                    Ok(Transition::Ignore)
                }
            },
        }
    }
}

/// An annotation file held in memory, scannable any number of times
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl AnnotationFile {
    /// Read a `.gbk` file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| P2kError::file(path, e))?;
        Ok(Self::from_text(path, &text))
    }

    /// Wrap text already in memory; `path` is only used in error messages
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lazily scan from the first line
    pub fn records(&self) -> Records<'_> {
        Records {
            path: &self.path,
            lines: self.lines.iter().enumerate(),
            state: ScanState::Idle,
            failed: false,
        }
    }

    /// Scan the whole file, stopping at the first malformed line
    pub fn scan(&self) -> Result<Vec<GeneRecord>> {
        self.records().collect()
    }
}

/// Gene records in file order
///
/// Yields at most one error, after which the iterator is exhausted.
pub struct Records<'a> {
    path: &'a Path,
    lines: Enumerate<slice::Iter<'a, String>>,
    state: ScanState,
    failed: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<GeneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        for (index, line) in self.lines.by_ref() {
            match self.state.advance(line) {
                Ok(Transition::Emit(record)) => return Some(Ok(record)),
                Ok(Transition::Restart) => {
                    trace!(path = %self.path.display(), line_number = index + 1, "CDS restarted");
                },
                Ok(_) => {},
                Err(message) => {
                    self.failed = true;
                    return Some(Err(P2kError::Parse {
                        path: self.path.to_path_buf(),
                        line_number: index + 1,
                        message: message.to_string(),
                    }));
                },
            }
        }

        if let ScanState::AwaitingEvidence { local_id } = std::mem::take(&mut self.state) {
            debug!(path = %self.path.display(), %local_id, "Feature ended without evidence, dropped");
        }
        None
    }
}

impl FusedIterator for Records<'_> {}

/// Scan a file into gene records
pub fn scan(path: impl AsRef<Path>) -> Result<Vec<GeneRecord>> {
    AnnotationFile::open(path)?.scan()
}
