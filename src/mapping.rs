//! Read mappings and their assignment to references and contigs.
//!
//! Reads are mapped twice: once to the reference genomes and once to the assembled contigs.
//! [`ReadReferenceMap`] collects the references each read maps to.
//! [`ContigReadAssignment`] then counts, for each contig, the references of the reads mapping to it.
//!
//! Both structures consume iterators over `Result<ReadMapping>`.
//! [`BamMappings`] provides such an iterator over the mapped records in a BAM file.
//! By default, it only returns primary alignments.
//! The references a read maps to are usually listed in secondary and supplementary records, so they should be included when building a [`ReadReferenceMap`].

use crate::{Error, Result};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;


//-----------------------------------------------------------------------------

/// A read mapped to a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadMapping {
    /// Read name.
    pub read_id: String,
    /// Name of the sequence the read maps to.
    pub reference_id: String,
    /// Mapping quality, with 255 for missing values.
    pub mapping_quality: u8,
    /// Number of aligned read bases, excluding clipped bases.
    pub query_length: usize,
}

/// Mapping quality used for records without one.
pub const MISSING_MAPQ: u8 = 255;

//-----------------------------------------------------------------------------

/// An iterator over the mapped records in a BAM file.
///
/// Unmapped records are always skipped.
/// Secondary and supplementary alignments are skipped unless enabled with [`BamMappings::with_secondary`].
/// The iterator stops after the first error.
pub struct BamMappings<R: Read> {
    reader: bam::io::Reader<R>,
    reference_names: Vec<String>,
    record: bam::Record,
    records: usize,
    include_secondary: bool,
    finished: bool,
}

impl BamMappings<std::fs::File> {
    /// Opens a BAM file and reads the header.
    pub fn open<P: AsRef<Path>>(filename: P) -> Result<BamMappings<impl Read>> {
        info!("Reading mappings from {}", filename.as_ref().display());
        let reader = bam::io::reader::Builder::default().build_from_path(&filename)?;
        BamMappings::new(reader)
    }
}

impl<R: Read> BamMappings<R> {
    /// Creates an iterator over the given BAM reader, which must be positioned at the start of the file.
    pub fn new(mut reader: bam::io::Reader<R>) -> Result<Self> {
        let header = reader.read_header()?;
        let reference_names: Vec<String> = header.reference_sequences().keys().map(|name| name.to_string()).collect();
        debug!("BAM header has {} reference sequences", reference_names.len());
        Ok(BamMappings {
            reader,
            reference_names,
            record: bam::Record::default(),
            records: 0,
            include_secondary: false,
            finished: false,
        })
    }

    /// Includes or skips secondary and supplementary alignments.
    pub fn with_secondary(mut self, include: bool) -> Self {
        self.include_secondary = include;
        self
    }

    /// Returns the names of the reference sequences in the header.
    pub fn reference_names(&self) -> &[String] {
        &self.reference_names
    }

    /// Returns the number of records read so far, including the skipped ones.
    pub fn records(&self) -> usize {
        self.records
    }

    // Converts the current record into a mapping, or returns `None` if the record should be skipped.
    fn current_mapping(&self) -> Result<Option<ReadMapping>> {
        let record = &self.record;
        let flags = record.flags();
        if flags.is_unmapped() {
            return Ok(None);
        }
        if !self.include_secondary && (flags.is_secondary() || flags.is_supplementary()) {
            return Ok(None);
        }

        let reference = match record.reference_sequence_id() {
            Some(id) => id?,
            None => return Ok(None),
        };
        let reference_id = self.reference_names.get(reference).ok_or_else(|| {
            Error::Bam(format!("record {}: invalid reference sequence id {}", self.records, reference))
        })?;
        let read_id = record.name().ok_or_else(|| {
            Error::Bam(format!("record {}: missing read name", self.records))
        })?;
        let mapping_quality = record.mapping_quality().map_or(MISSING_MAPQ, |mapq| mapq.get());

        let mut query_length = 0;
        for op in record.cigar().iter() {
            let op = op?;
            match op.kind() {
                Kind::Match | Kind::Insertion | Kind::SequenceMatch | Kind::SequenceMismatch => query_length += op.len(),
                _ => (),
            }
        }

        Ok(Some(ReadMapping {
            read_id: String::from_utf8_lossy(read_id.as_bytes()).to_string(),
            reference_id: reference_id.clone(),
            mapping_quality,
            query_length,
        }))
    }
}

impl<R: Read> Iterator for BamMappings<R> {
    type Item = Result<ReadMapping>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.reader.read_record(&mut self.record) {
                Ok(0) => {
                    debug!("Read {} BAM records", self.records);
                    self.finished = true;
                },
                Ok(_) => {
                    self.records += 1;
                    match self.current_mapping() {
                        Ok(Some(mapping)) => return Some(Ok(mapping)),
                        Ok(None) => (),
                        Err(err) => {
                            self.finished = true;
                            return Some(Err(err));
                        },
                    }
                },
                Err(err) => {
                    self.finished = true;
                    return Some(Err(Error::Io(err)));
                },
            }
        }
        None
    }
}

//-----------------------------------------------------------------------------

/// References each read maps to with a positive mapping quality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadReferenceMap {
    reads: HashMap<String, BTreeSet<String>>,
}

impl ReadReferenceMap {
    /// Builds the map from read-to-reference mappings.
    ///
    /// Mappings with quality 0 are ignored.
    /// Passes through any errors from the iterator.
    pub fn build<I: IntoIterator<Item = Result<ReadMapping>>>(mappings: I) -> Result<Self> {
        let mut reads: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut used = 0;
        for mapping in mappings {
            let mapping = mapping?;
            if mapping.mapping_quality == 0 {
                continue;
            }
            reads.entry(mapping.read_id).or_default().insert(mapping.reference_id);
            used += 1;
        }
        let result = ReadReferenceMap { reads };
        info!("{} reference mappings for {} reads ({} ambiguous)", used, result.len(), result.ambiguous_reads());
        Ok(result)
    }

    /// Returns the number of reads.
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Returns `true` if there are no reads.
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Returns the references the read maps to.
    pub fn get(&self, read_id: &str) -> Option<&BTreeSet<String>> {
        self.reads.get(read_id)
    }

    /// Returns the number of reads mapping to more than one reference.
    pub fn ambiguous_reads(&self) -> usize {
        self.reads.values().filter(|references| references.len() > 1).count()
    }
}

//-----------------------------------------------------------------------------

/// Read counts by reference for a contig.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContigReads {
    /// Reads mapping to a single reference.
    pub unambiguous: BTreeMap<String, usize>,
    /// All reads, counted once for each reference they map to.
    pub ambiguous: BTreeMap<String, usize>,
}

impl ContigReads {
    /// Adds a read mapping to the given references.
    pub fn add(&mut self, references: &BTreeSet<String>) {
        if references.len() == 1 {
            for reference in references {
                *self.unambiguous.entry(reference.clone()).or_insert(0) += 1;
            }
        }
        for reference in references {
            *self.ambiguous.entry(reference.clone()).or_insert(0) += 1;
        }
    }
}

/// Read counts by reference for each contig.
///
/// # Examples
///
/// ```
/// use asm_validate::{ContigReadAssignment, ReadMapping, ReadReferenceMap};
///
/// let mapping = |read: &str, reference: &str| -> asm_validate::Result<ReadMapping> {
///     Ok(ReadMapping { read_id: read.to_string(), reference_id: reference.to_string(), mapping_quality: 60, query_length: 150 })
/// };
/// let references = ReadReferenceMap::build(vec![mapping("r1", "G1"), mapping("r2", "G1"), mapping("r2", "G2")]).unwrap();
/// let contigs = ContigReadAssignment::build(vec![mapping("r1", "C1"), mapping("r2", "C1")], &references, 100).unwrap();
///
/// let reads = contigs.get("C1").unwrap();
/// assert_eq!(reads.unambiguous.get("G1"), Some(&1));
/// assert_eq!(reads.ambiguous.get("G1"), Some(&2));
/// assert_eq!(reads.ambiguous.get("G2"), Some(&1));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContigReadAssignment {
    contigs: BTreeMap<String, ContigReads>,
}

impl ContigReadAssignment {
    /// Builds the assignment from read-to-contig mappings.
    ///
    /// A mapping is used if its mapping quality is positive, at least `min_length` read bases are aligned, and the read maps to the references.
    /// Passes through any errors from the iterator.
    pub fn build<I: IntoIterator<Item = Result<ReadMapping>>>(
        mappings: I, references: &ReadReferenceMap, min_length: usize
    ) -> Result<Self> {
        let mut contigs: BTreeMap<String, ContigReads> = BTreeMap::new();
        let (mut used, mut unknown) = (0, 0);
        for mapping in mappings {
            let mapping = mapping?;
            if mapping.mapping_quality == 0 || mapping.query_length < min_length {
                continue;
            }
            let Some(read_references) = references.get(&mapping.read_id) else {
                unknown += 1;
                continue;
            };
            contigs.entry(mapping.reference_id).or_default().add(read_references);
            used += 1;
        }
        info!("Assigned {} read mappings to {} contigs", used, contigs.len());
        if unknown > 0 {
            debug!("Skipped {} contig mappings for reads without reference mappings", unknown);
        }
        Ok(ContigReadAssignment { contigs })
    }

    /// Returns the number of contigs with assigned reads.
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    /// Returns `true` if no reads were assigned.
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Returns the read counts for the contig.
    pub fn get(&self, contig: &str) -> Option<&ContigReads> {
        self.contigs.get(contig)
    }

    /// Returns an iterator over the contigs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContigReads)> {
        self.contigs.iter().map(|(name, reads)| (name.as_str(), reads))
    }
}

//-----------------------------------------------------------------------------
