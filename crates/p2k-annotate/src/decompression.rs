//! Streaming gzip input
//!
//! The UniProt → KO table is tens of millions of rows, so it is decoded
//! line by line rather than inflated into memory first.

use flate2::read::MultiGzDecoder;
use p2k_common::{P2kError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const READ_BUFFER_BYTES: usize = 256 * 1024;

/// Open a gzip file as a buffered line source
///
/// Concatenated gzip members are read through, as `gzip -c a b > c` and
/// bgzip produce them.
pub fn open_gzip(path: impl AsRef<Path>) -> Result<BufReader<MultiGzDecoder<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| P2kError::file(path, e))?;
    Ok(BufReader::with_capacity(
        READ_BUFFER_BYTES,
        MultiGzDecoder::new(file),
    ))
}
