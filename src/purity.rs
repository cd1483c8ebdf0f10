//! Assembly-wide purity and coverage ratios.

use crate::{AssemblyStats, ContigAlignedBases, ContigMaxPurity, Error, MaxPurity, Result};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Sums of purest and aligned bases with the ratios derived from them.
///
/// Each ratio is returned as a separate [`Result`], as the caller may want to report the other ratios even if one of the denominators is zero.
///
/// # Examples
///
/// ```
/// use asm_validate::{ContigAlignedBases, ContigMaxPurity, MaxPurity, PurityRatios};
///
/// let mut max_purity = ContigMaxPurity::new();
/// max_purity.insert(String::from("C1"), MaxPurity { max_purity: 0.5, length: 200 });
/// let mut aligned = ContigAlignedBases::new();
/// aligned.insert(String::from("C1"), 150);
///
/// let ratios = PurityRatios::new(&max_purity, &aligned, 400, 1000);
/// assert_eq!(ratios.sum_purest_bases(), 100.0);
/// assert_eq!(ratios.alignment_purity().unwrap(), 100.0 / 150.0);
/// assert_eq!(ratios.global_purity().unwrap(), 0.25);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PurityRatios {
    sum_purest_bases: f64,
    sum_aligned_bases: usize,
    total_assembly_bases: usize,
    total_reference_bases: usize,
}

impl PurityRatios {
    /// Computes the sums from per-contig statistics.
    ///
    /// # Arguments
    ///
    /// * `max_purity`: Maximum purity and length for each contig.
    /// * `aligned_bases`: Non-overlapping aligned bases for each contig.
    /// * `total_assembly_bases`: Total length of the contigs passing the length cutoff.
    /// * `total_reference_bases`: Total length of the reference genomes.
    pub fn new(
        max_purity: &ContigMaxPurity, aligned_bases: &ContigAlignedBases,
        total_assembly_bases: usize, total_reference_bases: usize
    ) -> Self {
        PurityRatios {
            sum_purest_bases: sum_purest_bases(max_purity.values()),
            sum_aligned_bases: aligned_bases.values().sum(),
            total_assembly_bases, total_reference_bases,
        }
    }

    /// Computes the sums over the contigs in the assembly.
    ///
    /// The alignment statistics select contigs by the query length in the alignments, while the assembly uses the number of nucleotides in the sequence.
    /// Contigs that are not in `assembly` are ignored, and the total assembly length is taken from it.
    pub fn for_assembly(
        max_purity: &ContigMaxPurity, aligned_bases: &ContigAlignedBases,
        assembly: &AssemblyStats, total_reference_bases: usize
    ) -> Self {
        let in_assembly = |contig: &str| assembly.contig(contig).is_some();
        PurityRatios {
            sum_purest_bases: sum_purest_bases(
                max_purity.iter().filter(|(contig, _)| in_assembly(contig.as_str())).map(|(_, purity)| purity)
            ),
            sum_aligned_bases: aligned_bases.iter().filter(|(contig, _)| in_assembly(contig.as_str())).map(|(_, bases)| *bases).sum(),
            total_assembly_bases: assembly.total_bases,
            total_reference_bases,
        }
    }

    /// Returns the sum of maximum purity times length over all contigs.
    pub fn sum_purest_bases(&self) -> f64 {
        self.sum_purest_bases
    }

    /// Returns the sum of non-overlapping aligned bases over all contigs.
    pub fn sum_aligned_bases(&self) -> usize {
        self.sum_aligned_bases
    }

    /// Returns the total length of the assembly.
    pub fn total_assembly_bases(&self) -> usize {
        self.total_assembly_bases
    }

    /// Returns the total length of the reference genomes.
    pub fn total_reference_bases(&self) -> usize {
        self.total_reference_bases
    }

    /// Purest bases divided by aligned bases.
    pub fn alignment_purity(&self) -> Result<f64> {
        ratio(self.sum_purest_bases, self.sum_aligned_bases, "alignment purity")
    }

    /// Purest bases divided by assembly length.
    pub fn global_purity(&self) -> Result<f64> {
        ratio(self.sum_purest_bases, self.total_assembly_bases, "global purity")
    }

    /// Aligned bases divided by assembly length.
    pub fn alignment_ratio(&self) -> Result<f64> {
        ratio(self.sum_aligned_bases as f64, self.total_assembly_bases, "alignment ratio")
    }

    /// Purest bases divided by total reference length.
    pub fn metagenome_coverage(&self) -> Result<f64> {
        ratio(self.sum_purest_bases, self.total_reference_bases, "metagenome coverage")
    }
}

// An empty float sum would be -0.0.
fn sum_purest_bases<'a, I: Iterator<Item = &'a MaxPurity>>(contigs: I) -> f64 {
    contigs.fold(0.0, |sum, contig| sum + contig.max_purity * contig.length as f64)
}

/// Returns `numerator / denominator` or [`Error::DivisionByZero`] naming the ratio.
pub fn ratio(numerator: f64, denominator: usize, name: &'static str) -> Result<f64> {
    if denominator == 0 {
        return Err(Error::DivisionByZero { ratio: name });
    }
    Ok(numerator / denominator as f64)
}

//-----------------------------------------------------------------------------
