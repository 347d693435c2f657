// KO assignment output
//
// One `locus_tag<TAB>KO` line per code; genes without codes get a bare
// `locus_tag` line. No header.

use crate::models::ResolvedRecord;
use p2k_common::{P2kError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write records to any sink, returning the number of lines written
pub fn write_records<'a, I, W>(records: I, mut out: W) -> std::io::Result<usize>
where
    I: IntoIterator<Item = &'a ResolvedRecord>,
    W: Write,
{
    let mut lines = 0;
    for record in records {
        if record.codes.is_empty() {
            writeln!(out, "{}", record.local_id)?;
        } else {
            for code in &record.codes {
                writeln!(out, "{}\t{}", record.local_id, code)?;
            }
        }
        lines += record.line_count();
    }
    out.flush()?;
    Ok(lines)
}

/// Create (or truncate) `path` and write records to it
pub fn write<'a, I>(records: I, path: impl AsRef<Path>) -> Result<usize>
where
    I: IntoIterator<Item = &'a ResolvedRecord>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| P2kError::file(path, e))?;
    write_records(records, BufWriter::new(file)).map_err(|e| P2kError::file(path, e))
}
