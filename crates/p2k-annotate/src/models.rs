// Records flowing through the scan -> resolve -> write pipeline

/// One coding-sequence feature as found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    /// The feature's `/locus_tag` value
    pub local_id: String,

    /// UniProtKB accession from similarity evidence, `None` when the feature
    /// closed on `/codon_start` without one
    pub external_id: Option<String>,
}

impl GeneRecord {
    pub fn new(local_id: impl Into<String>, external_id: Option<String>) -> Self {
        Self {
            local_id: local_id.into(),
            external_id,
        }
    }

    /// The identifier to join on, if any. An empty accession never matches.
    pub fn lookup_key(&self) -> Option<&str> {
        self.external_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A gene with its KO codes attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub local_id: String,
    pub external_id: Option<String>,

    /// KO codes in table order; empty when unknown
    pub codes: Vec<String>,
}

impl ResolvedRecord {
    pub fn from_gene(gene: GeneRecord, codes: Vec<String>) -> Self {
        Self {
            local_id: gene.local_id,
            external_id: gene.external_id,
            codes,
        }
    }

    /// Number of output lines this record produces
    pub fn line_count(&self) -> usize {
        self.codes.len().max(1)
    }
}
