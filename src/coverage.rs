//! Genome and contig coverage from non-overlapping alignment intervals.
//!
//! Both statistics use the same greedy left-to-right sweep over intervals sorted by key and start position.
//! Each key (a reference genome or a query contig) starts with an empty sweep.
//! An interval contained in the part already covered contributes nothing.
//! An interval overlapping the covered part contributes the bases past the previous end.
//! A disjoint interval contributes its full length.
//!
//! The two axes count the first interval of a key differently:
//!
//! * [`Axis::Reference`]: `(end - start) * identity + 1` for the first interval and `(end - start + 1) * identity` for later disjoint intervals.
//! * [`Axis::Query`]: `end - start` for the first interval and `end - start + 1` for later disjoint intervals.
//!
//! Reference-axis contributions are weighted by alignment identity and truncated to integers.
//! Overlapping intervals keep the identity of the interval that comes first in the sorted order.

use crate::{AlignmentStore, PurestAlignment, QueryInterval, Result};

use std::collections::BTreeMap;

use log::{debug, warn};


//-----------------------------------------------------------------------------

/// Number of non-overlapping reference bases covered by maximum-purity alignments, by genome.
pub type GenomeCoverage = BTreeMap<String, usize>;

/// Number of non-overlapping aligned bases in query coordinates, by contig.
pub type ContigAlignedBases = BTreeMap<String, usize>;

/// Maximum purity over the alignments of a contig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaxPurity {
    /// Purity of the purest alignment in `[0, 1]`.
    pub max_purity: f64,
    /// Total length of the contig as reported in the alignments.
    pub length: usize,
}

/// Maximum purity by contig.
pub type ContigMaxPurity = BTreeMap<String, MaxPurity>;

//-----------------------------------------------------------------------------

/// Coordinate axis for a coverage sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Reference coordinates with identity weighting.
    Reference,
    /// Query coordinates without weighting.
    Query,
}

/// Accumulates non-overlapping coverage over intervals sorted by key and start.
///
/// # Examples
///
/// ```
/// use asm_validate::coverage::{Axis, CoverageSweep};
///
/// let mut sweep = CoverageSweep::new(Axis::Query);
/// sweep.add("C1", 1, 200, 100.0);
/// sweep.add("C1", 150, 300, 100.0); // Partial overlap.
/// sweep.add("C1", 210, 250, 100.0); // Contained.
/// let covered = sweep.finish();
/// assert_eq!(covered["C1"], 199 + 100);
/// ```
#[derive(Clone, Debug)]
pub struct CoverageSweep {
    axis: Axis,
    covered: BTreeMap<String, usize>,
    // Current key and the largest end position seen for it.
    current: Option<(String, usize)>,
}

impl CoverageSweep {
    /// Creates an empty sweep over the given axis.
    pub fn new(axis: Axis) -> Self {
        CoverageSweep {
            axis,
            covered: BTreeMap::new(),
            current: None,
        }
    }

    // Length scaled by identity percentage and truncated.
    fn weighted(&self, len: usize, identity: f64) -> usize {
        match self.axis {
            Axis::Reference => (len as f64 * identity / 100.0) as usize,
            Axis::Query => len,
        }
    }

    /// Adds an inclusive interval `start..=end` for the key.
    ///
    /// Intervals must be added grouped by key and sorted by start within each key.
    /// `identity` is a percentage and only affects [`Axis::Reference`].
    pub fn add(&mut self, key: &str, start: usize, end: usize, identity: f64) {
        let prev_end = match &self.current {
            Some((current, prev_end)) if current == key => Some(*prev_end),
            _ => None,
        };

        let contribution = match prev_end {
            None => {
                if self.covered.contains_key(key) {
                    warn!("Intervals for {} are not grouped together", key);
                }
                let len = end.saturating_sub(start);
                match self.axis {
                    Axis::Reference => self.weighted(len, identity) + 1,
                    Axis::Query => len,
                }
            },
            Some(prev_end) if prev_end >= end => 0,
            Some(prev_end) if prev_end >= start => self.weighted(end - prev_end, identity),
            Some(_) => self.weighted(end - start + 1, identity),
        };
        *self.covered.entry(key.to_string()).or_insert(0) += contribution;

        // A contained interval does not move the covered end back.
        let new_end = prev_end.map_or(end, |prev_end| prev_end.max(end));
        self.current = Some((key.to_string(), new_end));
    }

    /// Returns the covered bases by key.
    pub fn finish(self) -> BTreeMap<String, usize> {
        self.covered
    }
}

//-----------------------------------------------------------------------------

/// Sweeps maximum-purity alignments on the reference axis.
///
/// The alignments must be sorted by reference name and start, as returned by [`AlignmentStore::max_purity_per_query`].
pub fn sweep_reference(alignments: &[PurestAlignment]) -> BTreeMap<String, usize> {
    let mut sweep = CoverageSweep::new(Axis::Reference);
    for aln in alignments {
        let record = &aln.record;
        sweep.add(&record.ref_id, record.ref_start, record.ref_end, record.identity);
    }
    sweep.finish()
}

/// Sweeps aligned intervals on the query axis.
///
/// The intervals must be sorted by query name and interval start, as returned by [`AlignmentStore::aligned_intervals`].
pub fn sweep_query(intervals: &[QueryInterval]) -> BTreeMap<String, usize> {
    let mut sweep = CoverageSweep::new(Axis::Query);
    for interval in intervals {
        sweep.add(&interval.record.qry_id, interval.start, interval.end, interval.record.identity);
    }
    sweep.finish()
}

//-----------------------------------------------------------------------------

/// Computes the genome contig coverage for each genome in `genome_lengths`.
///
/// For each contig of length at least `min_length`, only the alignments with maximum purity are used.
/// Genomes without such alignments get coverage 0.
/// Alignments to genomes missing from `genome_lengths` are ignored, and coverage is capped at genome length.
///
/// Passes through any database errors.
pub fn genome_contig_coverage(
    store: &AlignmentStore, min_length: usize, genome_lengths: &BTreeMap<String, usize>
) -> Result<GenomeCoverage> {
    let alignments = store.max_purity_per_query(min_length)?;
    debug!("Using {} maximum-purity alignments for genome coverage", alignments.len());
    let mut covered = sweep_reference(&alignments);

    let mut result = GenomeCoverage::new();
    for (genome, length) in genome_lengths.iter() {
        let mut bases = covered.remove(genome).unwrap_or(0);
        if bases > *length {
            warn!("Genome {}: covered bases {} exceed length {}", genome, bases, length);
            bases = *length;
        }
        result.insert(genome.clone(), bases);
    }
    for genome in covered.keys() {
        warn!("Genome {} is not in the reference statistics", genome);
    }

    Ok(result)
}

/// Computes the number of non-overlapping aligned bases for each contig of length at least `min_length`.
///
/// Passes through any database errors.
pub fn contig_aligned_bases(store: &AlignmentStore, min_length: usize) -> Result<ContigAlignedBases> {
    let intervals = store.aligned_intervals(min_length)?;
    Ok(sweep_query(&intervals))
}

/// Returns the maximum purity for each contig of length at least `min_length`.
///
/// Passes through any database errors.
pub fn contig_max_purity(store: &AlignmentStore, min_length: usize) -> Result<ContigMaxPurity> {
    let contigs = store.contig_max_purity(min_length)?;
    let result = contigs.into_iter().map(|contig| {
        (contig.qry_id, MaxPurity { max_purity: contig.max_purity, length: contig.length })
    }).collect();
    Ok(result)
}

//-----------------------------------------------------------------------------
