//! # Metagenome assembly validation
//!
//! This crate computes statistics for validating a metagenome assembly against known reference genomes.
//! The assembled contigs are aligned to the references with `nucmer`, and the reads are mapped both to the references and to the contigs.
//!
//! # Alignment statistics
//!
//! The alignments from `show-coords` are loaded into an [`AlignmentStore`], which is a SQLite database.
//! By default, the database is cached next to the coords file and reused in later runs.
//!
//! Each alignment has a purity: the product of query coverage and identity as a fraction in `[0, 1]`.
//! For each contig, only the alignments with maximum purity are used for genome coverage.
//! See [`coverage`] for the non-overlapping interval sweeps behind [`GenomeCoverage`] and [`ContigAlignedBases`].
//! [`PurityRatios`] combines them into assembly-wide ratios.
//!
//! # Assembly statistics
//!
//! [`AssemblyStats`] contains L50/N50 and other statistics for the contigs passing a length cutoff.
//! Note that N50 is the 0-based rank of the contig at the midpoint rather than its length.
//!
//! # Read-level purity
//!
//! Read mappings are read from BAM files using [`BamMappings`].
//! [`ReadReferenceMap`] and [`ContigReadAssignment`] count the references of the reads mapping to each contig.
//! [`ReadPurity`] describes the dominant reference of a contig and the lowest common ancestor (LCA) of its reads in the [`TaxonomyTable`].
//!
//! # Running the validation
//!
//! See [`ValidationConfig`] and [`pipeline::run`].
//! The output tables are described in [`report`].

pub mod classify;
pub mod coords;
pub mod coverage;
pub mod error;
pub mod fasta;
pub mod mapping;
pub mod pipeline;
pub mod purity;
pub mod report;
pub mod store;
pub mod tables;
pub mod taxonomy;
pub mod utils;

pub use classify::{ChimericLca, ContigClassification, Distribution, ReadPurity};
pub use coords::AlignmentRecord;
pub use coverage::{ContigAlignedBases, ContigMaxPurity, GenomeCoverage, MaxPurity};
pub use error::{Error, Result};
pub use fasta::{AssemblyStats, ContigStats, FastaReader};
pub use mapping::{BamMappings, ContigReadAssignment, ContigReads, ReadMapping, ReadReferenceMap};
pub use pipeline::{CacheMode, ReadInputs, ValidationConfig, ValidationResults};
pub use purity::PurityRatios;
pub use store::{AlignmentStore, ContigPurity, IngestReport, IngestStatus, PurestAlignment, QueryInterval};
pub use tables::{ReferenceGenome, ReferenceStats};
pub use taxonomy::{Lineage, Rank, TaxonomyTable};

#[cfg(test)]
mod internal;
