use crate::{AlignmentRecord, AlignmentStore, ReadMapping, Result};
use crate::{Lineage, TaxonomyTable};
use crate::utils;

//-----------------------------------------------------------------------------

// Alignment store utilities.

// Creates an alignment with the fields that matter for the statistics.
#[allow(clippy::too_many_arguments)]
pub(crate) fn alignment(
    ref_start: usize, ref_end: usize, qry_start: usize, qry_end: usize,
    identity: f64, qry_total_len: usize, qry_cov_pct: f64,
    ref_id: &str, qry_id: &str
) -> AlignmentRecord {
    let ref_aln_len = ref_end - ref_start + 1;
    let qry_aln_len = qry_start.max(qry_end) - qry_start.min(qry_end) + 1;
    let ref_total_len = 1_000_000;
    AlignmentRecord {
        ref_start, ref_end, qry_start, qry_end,
        ref_aln_len, qry_aln_len, identity,
        ref_total_len, qry_total_len,
        ref_cov_pct: 100.0 * ref_aln_len as f64 / ref_total_len as f64,
        qry_cov_pct,
        ref_id: ref_id.to_string(),
        qry_id: qry_id.to_string(),
    }
}

pub(crate) fn store_from_records(records: Vec<AlignmentRecord>) -> AlignmentStore {
    let result = AlignmentStore::ingest(records);
    assert!(result.is_ok(), "Failed to build the store: {}", result.unwrap_err());
    result.unwrap().0
}

// Store built from `test-data/example.coords`.
pub(crate) fn example_store() -> AlignmentStore {
    let coords_file = utils::get_test_data("example.coords");
    let result = AlignmentStore::from_coords_file(&coords_file);
    assert!(result.is_ok(), "Failed to build the store from {}: {}", coords_file.display(), result.unwrap_err());
    result.unwrap().0
}

//-----------------------------------------------------------------------------

// Read mapping utilities.

pub(crate) fn mapping(read_id: &str, reference_id: &str, mapping_quality: u8, query_length: usize) -> Result<ReadMapping> {
    Ok(ReadMapping {
        read_id: read_id.to_string(),
        reference_id: reference_id.to_string(),
        mapping_quality,
        query_length,
    })
}

// Taxonomy from `test-data/phylogeny.tsv`.
pub(crate) fn example_taxonomy() -> TaxonomyTable {
    let filename = utils::get_test_data("phylogeny.tsv");
    let result = TaxonomyTable::read(&filename);
    assert!(result.is_ok(), "Failed to read taxonomy {}: {}", filename.display(), result.unwrap_err());
    result.unwrap()
}

// A lineage with values from strain to life.
pub(crate) fn lineage(values: [&str; 10]) -> Lineage {
    Lineage::new(values.map(String::from))
}

//-----------------------------------------------------------------------------
