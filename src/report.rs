//! Output tables.
//!
//! All tables are tab-separated with a header line and written with the `csv` crate.
//! Missing values are written as `-`.
//! Ratios and purities are written with six decimals.

use crate::{AssemblyStats, ChimericLca, ContigAlignedBases, ContigClassification, ContigMaxPurity};
use crate::{Distribution, GenomeCoverage, PurityRatios, Rank, ReferenceStats, Result};
use crate::utils;

use std::collections::BTreeMap;
use std::io::Write;

use csv::{QuoteStyle, Writer, WriterBuilder};
use log::warn;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Assembly statistics table.
pub const ASM_STATS: &str = "asm-stats.tsv";

/// Genome contig coverage table.
pub const GENOME_CONTIG_COVERAGE: &str = "genome-contig-coverage.tsv";

/// Contig purity table.
pub const CONTIG_PURITY: &str = "contig-purity.tsv";

/// LCA ranks of chimeric contigs.
pub const CHIMERIC_LCA: &str = "chimeric-lca.tsv";

// Name of the total row in the genome contig coverage table.
const TOTAL: &str = "Total";

// Name of the row for chimeric contigs without an LCA.
const UNRESOLVED: &str = "unresolved";

fn ratio_field(value: Option<f64>) -> String {
    utils::field_or_placeholder(value.map(|x| format!("{:.6}", x)))
}

fn table_writer<W: Write>(output: &mut W) -> Writer<&mut W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(output)
}

//-----------------------------------------------------------------------------

/// Writes the assembly statistics and assembly-wide ratios as a single row.
///
/// A ratio with a zero denominator is logged and written as `-`.
pub fn write_asm_stats<W: Write>(output: &mut W, stats: &AssemblyStats, ratios: &PurityRatios) -> Result<()> {
    let header = [
        "min_length", "contigs", "total_bases", "max_contig_length", "L50", "N50",
        "sum_purest_bases", "sum_aligned_bases", "total_reference_bases",
        "alignment_purity", "global_purity", "alignment_ratio", "metagenome_coverage",
    ];
    let mut writer = table_writer(output);
    writer.write_record(header)?;

    let mut row = vec![
        stats.cutoff.to_string(), stats.len().to_string(), stats.total_bases.to_string(),
        stats.max_contig_length.to_string(), stats.l50.to_string(), stats.n50.to_string(),
        format!("{:.6}", ratios.sum_purest_bases()), ratios.sum_aligned_bases().to_string(),
        ratios.total_reference_bases().to_string(),
    ];
    for ratio in [ratios.alignment_purity(), ratios.global_purity(), ratios.alignment_ratio(), ratios.metagenome_coverage()] {
        let value = match ratio {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("{}", err);
                None
            },
        };
        row.push(ratio_field(value));
    }
    writer.write_record(&row)?;
    writer.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------

/// Writes the genome contig coverage for each reference genome in file order, followed by a total row.
pub fn write_genome_coverage<W: Write>(output: &mut W, coverage: &GenomeCoverage, references: &ReferenceStats) -> Result<()> {
    let header = [
        "genome", "genome_contig_cov_bases", "genome_length", "genome_contig_cov_ratio",
        ReferenceStats::GC_CONTENT, ReferenceStats::RATIO_COVERED,
    ];
    let mut writer = table_writer(output);
    writer.write_record(header)?;

    let ratio = |covered: usize, length: usize| -> Option<f64> {
        if length == 0 { None } else { Some(covered as f64 / length as f64) }
    };
    let mut total_covered = 0;
    for genome in references.iter() {
        let covered = coverage.get(&genome.id).copied().unwrap_or(0);
        total_covered += covered;
        let row = [
            genome.id.clone(), covered.to_string(), genome.length.to_string(),
            ratio_field(ratio(covered, genome.length)),
            ratio_field(genome.gc_content), ratio_field(genome.ratio_covered),
        ];
        writer.write_record(&row)?;
    }

    let total_length = references.total_length();
    let row = [
        String::from(TOTAL), total_covered.to_string(), total_length.to_string(),
        ratio_field(ratio(total_covered, total_length)),
        ratio_field(None), ratio_field(None),
    ];
    writer.write_record(&row)?;
    writer.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------

/// Returns the header of the contig purity table.
pub fn contig_purity_header() -> Vec<String> {
    let mut header: Vec<String> = ["contig", "length", "GC_content", "max_purity", "aligned_bases"]
        .iter().map(|name| name.to_string()).collect();
    for distribution in Distribution::ALL {
        for field in ["read_purity", "dominant_strain", "dominant_reads", "total_reads", "lca"] {
            header.push(format!("{}_{}", distribution, field));
        }
        for rank in Rank::ALL {
            header.push(format!("{}_{}_reads", distribution, rank));
        }
    }
    header
}

/// Writes a row for each contig passing the length cutoff, in descending order by length.
///
/// Contigs without alignments have max purity `-` and zero aligned bases.
/// Read-level fields are `-` if there is no `classifications` or the distribution of the contig could not be classified.
pub fn write_contig_purity<W: Write>(
    output: &mut W,
    stats: &AssemblyStats, max_purity: &ContigMaxPurity, aligned_bases: &ContigAlignedBases,
    classifications: Option<&BTreeMap<String, ContigClassification>>
) -> Result<()> {
    let mut writer = table_writer(output);
    writer.write_record(contig_purity_header())?;

    for contig in stats.contigs.iter() {
        let mut row = vec![
            contig.name.clone(), contig.length.to_string(), format!("{:.4}", contig.gc_content),
            ratio_field(max_purity.get(&contig.name).map(|x| x.max_purity)),
            aligned_bases.get(&contig.name).copied().unwrap_or(0).to_string(),
        ];
        let classification = classifications.and_then(|x| x.get(&contig.name));
        for distribution in Distribution::ALL {
            match classification.and_then(|x| x.get(distribution)) {
                Some(purity) => {
                    row.push(format!("{:.6}", purity.purity));
                    row.push(purity.dominant_reference.clone());
                    row.push(purity.dominant_count.to_string());
                    row.push(purity.total_count.to_string());
                    row.push(utils::field_or_placeholder(purity.lca));
                    row.extend(purity.rank_counts.iter().map(|count| count.to_string()));
                },
                None => {
                    row.extend((0..5 + Rank::COUNT).map(|_| utils::field_or_placeholder(None::<usize>)));
                },
            }
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------

/// Writes the number of chimeric contigs for each LCA rank, followed by contigs without an LCA.
pub fn write_chimeric_lca<W: Write>(output: &mut W, lca: &ChimericLca) -> Result<()> {
    let mut writer = table_writer(output);
    writer.write_record(["lca", "contigs"])?;
    for rank in Rank::ALL {
        writer.write_record([rank.to_string(), lca.by_rank[rank.index()].to_string()])?;
    }
    writer.write_record([UNRESOLVED.to_string(), lca.unresolved.to_string()])?;
    writer.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------
