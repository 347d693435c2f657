// UniProtKB accession -> KO code table
//
// Cold load reads the gzip'd two-column table produced from UniProt's
// idmapping.dat (`awk '$2=="KO" {print $1,$3}'`). Warm load reads the JSON
// snapshot written after a cold load, which is several times faster.

use crate::decompression::open_gzip;
use p2k_common::{P2kError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Default suffix appended to the table path to name its snapshot
pub const SNAPSHOT_SUFFIX: &str = ".json";

/// Read-only mapping from accession to KO codes
///
/// Codes keep table order, repeats included. Serializes as a plain JSON
/// object of arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupTable {
    entries: HashMap<String, Vec<String>>,
}

/// How a table was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Read from an existing snapshot
    Warm,
    /// Built from the compressed table and snapshotted
    Cold,
}

impl LookupTable {
    /// Build from (accession, code) pairs, appending in iteration order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        for (id, code) in pairs {
            entries.entry(id.into()).or_default().push(code.into());
        }
        Self { entries }
    }

    /// Cold load: stream-decode a gzip'd `accession<TAB>code` table
    pub fn from_gzip(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let table = Self::from_reader(open_gzip(path)?, path)?;

        info!(
            path = %path.display(),
            accessions = table.len(),
            codes = table.code_count(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Loaded lookup table from compressed source"
        );
        Ok(table)
    }

    /// Read `accession<TAB>code` rows; `source` names the input in errors
    ///
    /// Blank rows are skipped and columns past the second are ignored.
    pub fn from_reader<R: BufRead>(mut reader: R, source: &Path) -> Result<Self> {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        let mut line = String::new();
        let mut line_number = 0;

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| P2kError::file(source, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let row = line.trim();
            if row.is_empty() {
                continue;
            }

            let mut fields = row.split('\t');
            let (Some(id), Some(code)) = (fields.next(), fields.next()) else {
                return Err(P2kError::MalformedTable {
                    line_number,
                    line: row.to_string(),
                });
            };

            match entries.get_mut(id) {
                Some(codes) => codes.push(code.to_string()),
                None => {
                    entries.insert(id.to_string(), vec![code.to_string()]);
                },
            }
        }

        debug!(rows = line_number, accessions = entries.len(), "Parsed lookup rows");
        Ok(Self { entries })
    }

    /// Warm load: read a snapshot written by [`LookupTable::persist`]
    pub fn from_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let bytes = std::fs::read(path).map_err(|e| P2kError::file(path, e))?;
        let table: Self = serde_json::from_slice(&bytes)?;

        info!(
            path = %path.display(),
            accessions = table.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Loaded lookup table from snapshot"
        );
        Ok(table)
    }

    /// Write the snapshot atomically: a partial write never replaces `path`
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| P2kError::file(dir, e))?;
        let mut writer = BufWriter::new(staged);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| P2kError::file(path, e))?;

        let staged = writer
            .into_inner()
            .map_err(|e| P2kError::file(path, e.into_error()))?;
        staged.persist(path).map_err(|e| P2kError::file(path, e.error))?;

        debug!(path = %path.display(), accessions = self.len(), "Persisted lookup snapshot");
        Ok(())
    }

    /// KO codes for an accession; `None` means the accession is unknown
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.entries.get(id).map(Vec::as_slice)
    }

    /// Number of distinct accessions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total codes across all accessions
    pub fn code_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Driver-facing load: snapshot when `warm`, compressed table otherwise
pub fn load(path: impl AsRef<Path>, warm: bool) -> Result<LookupTable> {
    if warm {
        LookupTable::from_snapshot(path)
    } else {
        LookupTable::from_gzip(path)
    }
}

/// `idmapping_KO.tab.gz` + `.json` -> `idmapping_KO.tab.gz.json`
pub fn snapshot_path(source: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let mut name: OsString = source.as_ref().as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Use the snapshot next to `source` if present, otherwise cold load and
/// write one for next time
pub fn load_or_build(
    source: impl AsRef<Path>,
    suffix: &str,
    rebuild: bool,
) -> Result<(LookupTable, LoadMode)> {
    let source = source.as_ref();
    let snapshot = snapshot_path(source, suffix);

    if !rebuild && snapshot.is_file() {
        debug!(snapshot = %snapshot.display(), "Snapshot found");
        return Ok((LookupTable::from_snapshot(&snapshot)?, LoadMode::Warm));
    }

    if rebuild {
        debug!(snapshot = %snapshot.display(), "Rebuilding snapshot");
    }
    let table = LookupTable::from_gzip(source)?;
    table.persist(&snapshot)?;
    info!(snapshot = %snapshot.display(), "Wrote lookup snapshot for later runs");
    Ok((table, LoadMode::Cold))
}
