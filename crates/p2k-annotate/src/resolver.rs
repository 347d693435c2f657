// KO resolution: join scanned genes against the lookup table

use crate::lookup::LookupTable;
use crate::models::{GeneRecord, ResolvedRecord};
use serde::Serialize;

/// Resolved genes plus the accessions that had no KO codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per input gene, in input order
    pub records: Vec<ResolvedRecord>,

    /// Accessions absent from the table, in encounter order, repeats kept
    pub unmatched: Vec<String>,
}

/// Counts for logging and the batch summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub genes: usize,
    pub matched: usize,
    pub without_accession: usize,
    pub unmatched: usize,
}

impl Resolution {
    pub fn stats(&self) -> ResolutionStats {
        let mut stats = ResolutionStats {
            genes: self.records.len(),
            unmatched: self.unmatched.len(),
            ..Default::default()
        };
        for record in &self.records {
            if !record.codes.is_empty() {
                stats.matched += 1;
            } else if record
                .external_id
                .as_deref()
                .is_none_or(|id| id.is_empty())
            {
                stats.without_accession += 1;
            }
        }
        stats
    }
}

impl ResolutionStats {
    /// Accumulate another file's counts
    pub fn merge(&mut self, other: &ResolutionStats) {
        self.genes += other.genes;
        self.matched += other.matched;
        self.without_accession += other.without_accession;
        self.unmatched += other.unmatched;
    }
}

/// Attach KO codes to each gene
///
/// Genes without an accession get no codes and no lookup. Accessions the
/// table does not know also get no codes and are listed in
/// [`Resolution::unmatched`].
pub fn resolve<I>(records: I, table: &LookupTable) -> Resolution
where
    I: IntoIterator<Item = GeneRecord>,
{
    let mut resolution = Resolution::default();

    for gene in records {
        let codes = match gene.lookup_key() {
            None => Vec::new(),
            Some(id) => match table.get(id) {
                Some(codes) => codes.to_vec(),
                None => {
                    resolution.unmatched.push(id.to_string());
                    Vec::new()
                },
            },
        };
        resolution.records.push(ResolvedRecord::from_gene(gene, codes));
    }

    resolution
}
