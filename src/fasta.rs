//! FASTA reading and assembly statistics.
//!
//! FASTA files are read with [`noodles::fasta`], and the files may be gzip-compressed.
//! [`AssemblyStats`] summarizes the contigs passing a length cutoff.
//!
//! Contig length is the number of `acgtACGT` characters in the sequence.
//! Ambiguity codes and other characters are not counted.

use crate::{Error, Result};
use crate::utils;

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::Path;

use log::info;

use noodles::fasta;


//-----------------------------------------------------------------------------

/// A FASTA reader over a possibly compressed file.
pub type FastaReader = fasta::io::Reader<Box<dyn BufRead>>;

/// Opens a FASTA file, which may be gzip-compressed.
pub fn open<P: AsRef<Path>>(filename: P) -> Result<FastaReader> {
    let reader = utils::open_file(filename)?;
    Ok(fasta::io::Reader::new(reader))
}

/// Returns an iterator over the records in the reader.
///
/// Parse errors are reported as [`Error::MalformedFasta`] with the 1-based number of the record.
pub fn records<R: BufRead>(reader: &mut fasta::io::Reader<R>) -> impl Iterator<Item = Result<fasta::Record>> + '_ {
    reader.records().enumerate().map(|(i, record)| {
        record.map_err(|err| match err.kind() {
            io::ErrorKind::InvalidData => Error::MalformedFasta { record: i + 1, reason: err.to_string() },
            _ => Error::Io(err),
        })
    })
}

/// Returns the name of the record as a string.
pub fn record_name(record: &fasta::Record) -> String {
    String::from_utf8_lossy(record.name()).to_string()
}

//-----------------------------------------------------------------------------

/// Length and GC content of a contig.
#[derive(Clone, Debug, PartialEq)]
pub struct ContigStats {
    /// Contig name.
    pub name: String,
    /// Number of `acgtACGT` characters in the sequence.
    pub length: usize,
    /// Fraction of `cgCG` characters in the sequence.
    pub gc_content: f64,
}

impl ContigStats {
    /// Computes the statistics for a FASTA record.
    pub fn from_record(record: &fasta::Record) -> Self {
        let sequence: &[u8] = record.sequence().as_ref();
        ContigStats {
            name: record_name(record),
            length: utils::nucleotide_count(sequence),
            gc_content: utils::gc_fraction(sequence),
        }
    }
}

/// Statistics for the contigs of length at least the cutoff.
///
/// `l50` and `n50` describe the contig at which the cumulative length of the contigs, in descending length order, first reaches half of the total.
/// `l50` is the length of that contig and `n50` is its 0-based rank.
/// Note that `n50` is a contig count rather than a length here.
///
/// # Examples
///
/// ```
/// use asm_validate::{AssemblyStats, ContigStats};
///
/// let contigs = [500, 300, 300, 200].iter().enumerate().map(|(i, len)| ContigStats {
///     name: format!("contig{}", i), length: *len, gc_content: 0.5,
/// });
/// let stats = AssemblyStats::new(contigs, 100).unwrap();
/// assert_eq!(stats.total_bases, 1300);
/// assert_eq!(stats.l50, 300);
/// assert_eq!(stats.n50, 1);
/// assert_eq!(stats.max_contig_length, 500);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyStats {
    /// Length cutoff used for the contigs.
    pub cutoff: usize,
    /// Length of the contig where half of the total length is reached.
    pub l50: usize,
    /// Rank of the contig where half of the total length is reached.
    pub n50: usize,
    /// Total length of the contigs.
    pub total_bases: usize,
    /// Length of the longest contig.
    pub max_contig_length: usize,
    /// Contigs in descending order by length, with ties in input order.
    pub contigs: Vec<ContigStats>,
    index: HashMap<String, usize>,
}

impl AssemblyStats {
    /// Computes the statistics for the contigs of length at least `cutoff`.
    ///
    /// Returns [`Error::EmptyAssembly`] if no contig passes the cutoff.
    pub fn new<I: IntoIterator<Item = ContigStats>>(contigs: I, cutoff: usize) -> Result<Self> {
        let mut contigs: Vec<ContigStats> = contigs.into_iter().filter(|contig| contig.length >= cutoff).collect();
        if contigs.is_empty() {
            return Err(Error::EmptyAssembly { cutoff });
        }
        contigs.sort_by(|a, b| b.length.cmp(&a.length));

        let total_bases: usize = contigs.iter().map(|contig| contig.length).sum();
        let max_contig_length = contigs[0].length;
        let mut cumulative = 0;
        let mut n50 = contigs.len() - 1;
        for (rank, contig) in contigs.iter().enumerate() {
            cumulative += contig.length;
            if 2 * cumulative >= total_bases {
                n50 = rank;
                break;
            }
        }
        let l50 = contigs[n50].length;
        let index = contigs.iter().enumerate().map(|(i, contig)| (contig.name.clone(), i)).collect();

        Ok(AssemblyStats { cutoff, l50, n50, total_bases, max_contig_length, contigs, index })
    }

    /// Computes the statistics from a FASTA file.
    ///
    /// Returns an error if the file cannot be read or parsed, or if no contig passes the cutoff.
    pub fn from_file<P: AsRef<Path>>(filename: P, cutoff: usize) -> Result<Self> {
        info!("Reading contigs from {}", filename.as_ref().display());
        let mut reader = open(&filename)?;
        let stats = Self::from_reader(&mut reader, cutoff)?;
        info!("{} contigs of length >= {}, total {} bp", stats.len(), cutoff, stats.total_bases);
        Ok(stats)
    }

    /// Computes the statistics from the records in a FASTA reader.
    pub fn from_reader<R: BufRead>(reader: &mut fasta::io::Reader<R>, cutoff: usize) -> Result<Self> {
        let mut contigs = Vec::new();
        for record in records(reader) {
            contigs.push(ContigStats::from_record(&record?));
        }
        Self::new(contigs, cutoff)
    }

    /// Returns the number of contigs passing the cutoff.
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    /// Returns `true` if there are no contigs.
    ///
    /// This is always `false` for a successfully constructed object.
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Returns the statistics for the contig with the given name.
    pub fn contig(&self, name: &str) -> Option<&ContigStats> {
        self.index.get(name).map(|i| &self.contigs[*i])
    }

    /// Returns the length of the contig with the given name.
    pub fn contig_length(&self, name: &str) -> Option<usize> {
        self.contig(name).map(|contig| contig.length)
    }
}

//-----------------------------------------------------------------------------
