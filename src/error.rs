//! Error type for assembly validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

//-----------------------------------------------------------------------------

/// Errors from building and querying validation statistics.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error when reading an input or writing an output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error passed through from the SQLite database.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Error when reading or writing a tab-separated table.
    #[error("table error: {0}")]
    Csv(#[from] csv::Error),

    /// A coords line that cannot be converted into an alignment record.
    #[error("malformed alignment record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A tabular input file without the expected structure.
    #[error("malformed table {}: {reason}", .file.display())]
    MalformedTable { file: PathBuf, reason: String },

    /// The database to be created already exists.
    #[error("database {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// The database was created by an incompatible version.
    #[error("unsupported database version: {found} (expected {expected})")]
    Version { found: String, expected: String },

    /// No contig passes the length cutoff.
    #[error("no contigs of length >= {cutoff}")]
    EmptyAssembly { cutoff: usize },

    /// A ratio with a zero denominator.
    #[error("cannot compute {ratio}: the denominator is zero")]
    DivisionByZero { ratio: &'static str },

    /// A reference without an entry in the taxonomy table.
    #[error("no taxonomy entry for {0}")]
    MissingTaxonomy(String),

    /// Error when reading a FASTA file.
    #[error("malformed FASTA record {record}: {reason}")]
    MalformedFasta { record: usize, reason: String },

    /// Error when reading a BAM file.
    #[error("BAM error: {0}")]
    Bam(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//-----------------------------------------------------------------------------
