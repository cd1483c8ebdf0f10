//! Read-level purity and the lowest common ancestor of the reads in a contig.
//!
//! Each contig has two read distributions over the references (see [`ContigReads`]).
//! For each distribution, the dominant reference is the one with the most reads.
//! Read-level purity is the share of the dominant reference in the distribution.
//!
//! When the reads disagree, the ranks are walked from strain to life.
//! At each rank, the count is the sum over the references that share the dominant reference's value at that rank.
//! The lowest common ancestor (LCA) is the finest rank where the count reaches the total.

use crate::{ContigReads, Rank, Result, TaxonomyTable};

use std::collections::BTreeMap;
use std::fmt::Display;

use log::warn;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Read distribution of a contig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distribution {
    /// Reads mapping to a single reference.
    Unambiguous,
    /// All reads, counted once for each reference they map to.
    Ambiguous,
}

impl Distribution {
    /// Both distributions in report order.
    pub const ALL: [Distribution; 2] = [Distribution::Unambiguous, Distribution::Ambiguous];

    /// Returns the name of the distribution.
    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Unambiguous => "unambiguous",
            Distribution::Ambiguous => "ambiguous",
        }
    }

    /// Returns the read counts for this distribution.
    pub fn counts<'a>(&self, reads: &'a ContigReads) -> &'a BTreeMap<String, usize> {
        match self {
            Distribution::Unambiguous => &reads.unambiguous,
            Distribution::Ambiguous => &reads.ambiguous,
        }
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

//-----------------------------------------------------------------------------

/// Read-level purity of a read distribution.
///
/// # Examples
///
/// ```
/// use asm_validate::{Lineage, Rank, ReadPurity, TaxonomyTable};
/// use std::collections::BTreeMap;
///
/// let mut taxonomy = TaxonomyTable::new();
/// let lineage = |strain: &str, genus: &str| Lineage::new([
///     strain, "species", genus, "family", "order", "class", "phylum", "superphylum", "Bacteria", "Life"
/// ].map(String::from));
/// taxonomy.insert("G1", lineage("s1", "g1"));
/// taxonomy.insert("G2", lineage("s2", "g1"));
///
/// let counts = BTreeMap::from([(String::from("G1"), 3), (String::from("G2"), 1)]);
/// let purity = ReadPurity::classify(&counts, &taxonomy).unwrap().unwrap();
/// assert_eq!(purity.dominant_reference, "G1");
/// assert_eq!(purity.purity, 0.75);
/// assert_eq!(purity.lca, Some(Rank::Species));
/// assert_eq!(purity.rank_counts[Rank::Strain.index()], 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ReadPurity {
    /// Reference with the most reads.
    pub dominant_reference: String,
    /// Number of reads for the dominant reference.
    pub dominant_count: usize,
    /// Total number of reads in the distribution.
    pub total_count: usize,
    /// `dominant_count / total_count`.
    pub purity: f64,
    /// Reads explained by the dominant lineage at each rank, in the order of [`Rank::ALL`].
    pub rank_counts: [usize; Rank::COUNT],
    /// The finest rank explaining all reads, or `None` if not even `life` does.
    pub lca: Option<Rank>,
}

impl ReadPurity {
    /// Classifies a read distribution.
    ///
    /// The dominant reference is the one with the highest count, with ties broken by the smallest name.
    /// Returns `Ok(None)` if the distribution is empty.
    /// Returns [`crate::Error::MissingTaxonomy`] if the reads disagree and a reference has no lineage.
    pub fn classify(counts: &BTreeMap<String, usize>, taxonomy: &TaxonomyTable) -> Result<Option<Self>> {
        let mut dominant: Option<(&str, usize)> = None;
        let mut total_count = 0;
        for (reference, count) in counts.iter() {
            if *count == 0 {
                continue;
            }
            total_count += count;
            if dominant.map_or(true, |(_, best)| *count > best) {
                dominant = Some((reference.as_str(), *count));
            }
        }
        let Some((dominant_reference, dominant_count)) = dominant else {
            return Ok(None);
        };

        let mut rank_counts = [total_count; Rank::COUNT];
        let mut lca = Some(Rank::Strain);
        if dominant_count < total_count {
            let dominant_lineage = taxonomy.lineage(dominant_reference)?;
            let mut lineages = Vec::with_capacity(counts.len());
            for (reference, count) in counts.iter().filter(|(_, count)| **count > 0) {
                lineages.push((taxonomy.lineage(reference)?, *count));
            }

            lca = None;
            for rank in Rank::ALL {
                let value = dominant_lineage.get(rank);
                let explained: usize = lineages.iter()
                    .filter(|(lineage, _)| lineage.get(rank) == value)
                    .map(|(_, count)| count).sum();
                rank_counts[rank.index()] = explained;
                if explained >= total_count {
                    lca = Some(rank);
                    break;
                }
            }
        }

        Ok(Some(ReadPurity {
            dominant_reference: dominant_reference.to_string(),
            dominant_count,
            total_count,
            purity: dominant_count as f64 / total_count as f64,
            rank_counts,
            lca,
        }))
    }
}

//-----------------------------------------------------------------------------

/// Read-level purity of a contig for both distributions.
///
/// A distribution without reads or with a classification failure is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContigClassification {
    pub unambiguous: Option<ReadPurity>,
    pub ambiguous: Option<ReadPurity>,
}

impl ContigClassification {
    /// Returns the classification for the given distribution.
    pub fn get(&self, distribution: Distribution) -> Option<&ReadPurity> {
        match distribution {
            Distribution::Unambiguous => self.unambiguous.as_ref(),
            Distribution::Ambiguous => self.ambiguous.as_ref(),
        }
    }

    fn set(&mut self, distribution: Distribution, purity: Option<ReadPurity>) {
        match distribution {
            Distribution::Unambiguous => self.unambiguous = purity,
            Distribution::Ambiguous => self.ambiguous = purity,
        }
    }
}

/// Classifies the reads of each contig.
///
/// Classification failures are logged and the distribution is left empty.
pub fn classify_contigs<'a, I: IntoIterator<Item = (&'a str, &'a ContigReads)>>(
    contigs: I, taxonomy: &TaxonomyTable
) -> BTreeMap<String, ContigClassification> {
    let mut result = BTreeMap::new();
    for (contig, reads) in contigs {
        let mut classification = ContigClassification::default();
        for distribution in Distribution::ALL {
            match ReadPurity::classify(distribution.counts(reads), taxonomy) {
                Ok(purity) => classification.set(distribution, purity),
                Err(err) => warn!("Cannot classify {} reads for contig {}: {}", distribution, contig, err),
            }
        }
        result.insert(contig.to_string(), classification);
    }
    result
}

//-----------------------------------------------------------------------------

/// Number of chimeric contigs by LCA rank.
///
/// A contig is chimeric if its ambiguous read distribution has read-level purity below the threshold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChimericLca {
    /// Contigs by LCA rank, in the order of [`Rank::ALL`].
    pub by_rank: [usize; Rank::COUNT],
    /// Contigs without an LCA.
    pub unresolved: usize,
}

impl ChimericLca {
    /// Counts the chimeric contigs in the classifications.
    pub fn new(classifications: &BTreeMap<String, ContigClassification>, threshold: f64) -> Self {
        let mut result = ChimericLca::default();
        for purity in classifications.values().filter_map(|contig| contig.ambiguous.as_ref()) {
            if purity.purity >= threshold {
                continue;
            }
            match purity.lca {
                Some(rank) => result.by_rank[rank.index()] += 1,
                None => result.unresolved += 1,
            }
        }
        result
    }

    /// Returns the total number of chimeric contigs.
    pub fn total(&self) -> usize {
        self.by_rank.iter().sum::<usize>() + self.unresolved
    }
}

//-----------------------------------------------------------------------------
