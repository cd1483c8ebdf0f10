//! End-to-end validation of an assembly.
//!
//! [`ValidationConfig`] lists the inputs and parameters of a run.
//! [`ValidationResults::compute`] computes all statistics and [`ValidationResults::write`] writes the output tables.
//! All computation happens before any output is written.

use crate::{AlignmentStore, AssemblyStats, ChimericLca, ContigAlignedBases, ContigClassification};
use crate::{ContigMaxPurity, ContigReadAssignment, GenomeCoverage, IngestStatus, PurityRatios};
use crate::{ReadMapping, ReadReferenceMap, ReferenceStats, Result, TaxonomyTable};
use crate::{classify, coverage, report, utils};
use crate::mapping::BamMappings;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Where the alignment store lives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// A SQLite cache next to the coords file, with extension `.sqlite` appended.
    #[default]
    BesideCoords,
    /// A SQLite cache in the given file.
    File(PathBuf),
    /// An in-memory database without a cache.
    Memory,
}

/// Inputs for read-level purity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadInputs {
    /// Reference phylogeny table.
    pub phylogeny: PathBuf,
    /// Reads mapped to the reference genomes.
    pub reference_bam: PathBuf,
    /// Reads mapped to the contigs.
    pub contig_bam: PathBuf,
}

/// Inputs and parameters of a validation run.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationConfig {
    /// nucmer coords file.
    pub coords: PathBuf,
    /// Reference-stats table.
    pub reference_stats: PathBuf,
    /// Contigs in FASTA format.
    pub contigs: PathBuf,
    /// Inputs for read-level purity, if it should be computed.
    pub reads: Option<ReadInputs>,
    /// Directory for the output tables.
    pub output_dir: PathBuf,
    /// Minimum length for contigs and aligned read bases.
    pub min_length: usize,
    /// Contigs with ambiguous read-level purity below this are chimeric.
    pub chimeric_threshold: f64,
    /// Alignment store location.
    pub cache: CacheMode,
    /// Rebuild the cache even if it exists.
    pub rebuild_cache: bool,
}

impl ValidationConfig {
    /// Default minimum length.
    pub const MIN_LENGTH: usize = 100;

    /// Default chimeric threshold.
    pub const CHIMERIC_THRESHOLD: f64 = 0.95;

    /// Extension appended to the coords file name for the default cache.
    pub const CACHE_EXTENSION: &'static str = "sqlite";

    /// Creates a configuration with default parameters and without read inputs.
    pub fn new<P, Q, R, S>(coords: P, reference_stats: Q, contigs: R, output_dir: S) -> Self
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
        S: AsRef<Path>,
    {
        ValidationConfig {
            coords: coords.as_ref().to_path_buf(),
            reference_stats: reference_stats.as_ref().to_path_buf(),
            contigs: contigs.as_ref().to_path_buf(),
            reads: None,
            output_dir: output_dir.as_ref().to_path_buf(),
            min_length: Self::MIN_LENGTH,
            chimeric_threshold: Self::CHIMERIC_THRESHOLD,
            cache: CacheMode::default(),
            rebuild_cache: false,
        }
    }

    /// Returns the cache file, or `None` for an in-memory store.
    pub fn cache_file(&self) -> Option<PathBuf> {
        match &self.cache {
            CacheMode::BesideCoords => {
                let mut name = self.coords.clone().into_os_string();
                name.push(".");
                name.push(Self::CACHE_EXTENSION);
                Some(PathBuf::from(name))
            },
            CacheMode::File(filename) => Some(filename.clone()),
            CacheMode::Memory => None,
        }
    }

    /// Opens the alignment store as configured.
    ///
    /// The cache is rebuilt if requested, and otherwise reused when it exists.
    pub fn load_store(&self) -> Result<AlignmentStore> {
        let Some(db_file) = self.cache_file() else {
            let (store, _) = AlignmentStore::from_coords_file(&self.coords)?;
            debug!("Using an in-memory alignment store");
            return Ok(store);
        };

        if self.rebuild_cache && AlignmentStore::exists(&db_file) {
            info!("Removing alignment cache {}", db_file.display());
            fs::remove_file(&db_file)?;
        }
        let (store, status) = AlignmentStore::open_or_create(&self.coords, &db_file)?;
        match status {
            IngestStatus::Created(report) => {
                debug!("Created cache {} ({} records, {} skipped)", db_file.display(), report.inserted, report.skipped);
            },
            IngestStatus::Reused => info!("The cache contains {} alignment records", store.records()),
        }
        Ok(store)
    }
}

//-----------------------------------------------------------------------------

/// Computes read-level purity for the contigs in the assembly.
///
/// `reference_mappings` are the reads mapped to the references, including secondary alignments, and `contig_mappings` the reads mapped to the contigs.
/// Only contigs passing the length cutoff of the assembly are classified.
pub fn read_level_purity<I, J>(
    reference_mappings: I, contig_mappings: J, taxonomy: &TaxonomyTable, assembly: &AssemblyStats, min_length: usize
) -> Result<BTreeMap<String, ContigClassification>>
where
    I: IntoIterator<Item = Result<ReadMapping>>,
    J: IntoIterator<Item = Result<ReadMapping>>,
{
    let references = ReadReferenceMap::build(reference_mappings)?;
    let assignment = ContigReadAssignment::build(contig_mappings, &references, min_length)?;
    let contigs = assignment.iter().filter(|(contig, _)| assembly.contig(contig).is_some());
    let classifications = classify::classify_contigs(contigs, taxonomy);
    info!("Classified reads for {} contigs", classifications.len());
    Ok(classifications)
}

//-----------------------------------------------------------------------------

/// All statistics from a validation run.
#[derive(Clone, Debug)]
pub struct ValidationResults {
    pub assembly: AssemblyStats,
    pub references: ReferenceStats,
    pub genome_coverage: GenomeCoverage,
    pub max_purity: ContigMaxPurity,
    pub aligned_bases: ContigAlignedBases,
    pub ratios: PurityRatios,
    /// Read-level purity by contig, if read inputs were given.
    pub classifications: Option<BTreeMap<String, ContigClassification>>,
    /// Chimeric contigs by LCA rank, if read inputs were given.
    pub chimeric_lca: Option<ChimericLca>,
}

impl ValidationResults {
    /// Computes the statistics from the configured inputs.
    ///
    /// Any missing or malformed input aborts the computation.
    pub fn compute(config: &ValidationConfig) -> Result<Self> {
        let assembly = AssemblyStats::from_file(&config.contigs, config.min_length)?;
        let references = ReferenceStats::read(&config.reference_stats)?;
        let store = config.load_store()?;
        Self::from_store(config, &store, assembly, references)
    }

    /// Computes the statistics using an existing alignment store.
    pub fn from_store(
        config: &ValidationConfig, store: &AlignmentStore, assembly: AssemblyStats, references: ReferenceStats
    ) -> Result<Self> {
        info!("Computing alignment statistics");
        let genome_coverage = coverage::genome_contig_coverage(store, config.min_length, &references.lengths())?;
        let max_purity = coverage::contig_max_purity(store, config.min_length)?;
        let aligned_bases = coverage::contig_aligned_bases(store, config.min_length)?;
        let ratios = PurityRatios::for_assembly(&max_purity, &aligned_bases, &assembly, references.total_length());

        let (classifications, chimeric_lca) = if let Some(reads) = &config.reads {
            info!("Computing read-level purity");
            let taxonomy = TaxonomyTable::read(&reads.phylogeny)?;
            let reference_mappings = BamMappings::open(&reads.reference_bam)?.with_secondary(true);
            let contig_mappings = BamMappings::open(&reads.contig_bam)?;
            let classifications = read_level_purity(
                reference_mappings, contig_mappings, &taxonomy, &assembly, config.min_length
            )?;
            let chimeric_lca = ChimericLca::new(&classifications, config.chimeric_threshold);
            info!("{} chimeric contigs", chimeric_lca.total());
            (Some(classifications), Some(chimeric_lca))
        } else {
            (None, None)
        };

        Ok(ValidationResults {
            assembly, references, genome_coverage, max_purity, aligned_bases, ratios,
            classifications, chimeric_lca,
        })
    }

    /// Writes the output tables into the directory, creating it if necessary.
    ///
    /// The chimeric LCA table is only written with read-level purity.
    pub fn write<P: AsRef<Path>>(&self, output_dir: P) -> Result<()> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        write_table(output_dir, report::ASM_STATS, |output| {
            report::write_asm_stats(output, &self.assembly, &self.ratios)
        })?;
        write_table(output_dir, report::GENOME_CONTIG_COVERAGE, |output| {
            report::write_genome_coverage(output, &self.genome_coverage, &self.references)
        })?;
        write_table(output_dir, report::CONTIG_PURITY, |output| {
            report::write_contig_purity(
                output, &self.assembly, &self.max_purity, &self.aligned_bases, self.classifications.as_ref()
            )
        })?;
        if let Some(chimeric_lca) = &self.chimeric_lca {
            write_table(output_dir, report::CHIMERIC_LCA, |output| {
                report::write_chimeric_lca(output, chimeric_lca)
            })?;
        }

        Ok(())
    }
}

fn write_table<F>(output_dir: &Path, name: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let filename = output_dir.join(name);
    info!("Writing {}", filename.display());
    let mut output = BufWriter::new(File::create(&filename)?);
    write(&mut output)?;
    output.flush()?;
    Ok(())
}

/// Runs the validation and writes the output tables into the configured directory.
pub fn run(config: &ValidationConfig) -> Result<ValidationResults> {
    let results = ValidationResults::compute(config)?;
    results.write(&config.output_dir)?;
    if let Some(size) = utils::file_size(config.output_dir.join(report::CONTIG_PURITY)) {
        info!("Contig purity table: {}", size);
    }
    Ok(results)
}

//-----------------------------------------------------------------------------
