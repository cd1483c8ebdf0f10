//! Taxonomic ranks and the reference phylogeny table.
//!
//! The phylogeny table is tab-separated with a header line.
//! It must have a `fasta_name` column matching the reference sequence names and a column for each rank from `species` to `life`.
//! If the `strain` column is missing, the strain is the `fasta_name`.
//! Column names are matched case-insensitively.

use crate::{Error, Result};
use crate::tables::Table;

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use log::info;


//-----------------------------------------------------------------------------

/// A taxonomic rank, from the finest to the coarsest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Strain,
    Species,
    Genus,
    Family,
    Order,
    Class,
    Phylum,
    Superphylum,
    Superkingdom,
    Life,
}

impl Rank {
    /// Number of ranks.
    pub const COUNT: usize = 10;

    /// All ranks from the finest to the coarsest.
    pub const ALL: [Rank; Self::COUNT] = [
        Rank::Strain, Rank::Species, Rank::Genus, Rank::Family, Rank::Order,
        Rank::Class, Rank::Phylum, Rank::Superphylum, Rank::Superkingdom, Rank::Life,
    ];

    /// Returns the lowercase name of the rank, as used in table headers.
    pub fn name(&self) -> &'static str {
        match self {
            Rank::Strain => "strain",
            Rank::Species => "species",
            Rank::Genus => "genus",
            Rank::Family => "family",
            Rank::Order => "order",
            Rank::Class => "class",
            Rank::Phylum => "phylum",
            Rank::Superphylum => "superphylum",
            Rank::Superkingdom => "superkingdom",
            Rank::Life => "life",
        }
    }

    /// Returns the position of the rank in [`Rank::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Rank::ALL.iter().find(|rank| rank.name().eq_ignore_ascii_case(s)).copied().ok_or_else(|| {
            format!("unknown taxonomic rank: {}", s)
        })
    }
}

//-----------------------------------------------------------------------------

/// The taxonomic lineage of a reference, with a value for each rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lineage {
    values: [String; Rank::COUNT],
}

impl Lineage {
    /// Creates a lineage from values in the order of [`Rank::ALL`].
    pub fn new(values: [String; Rank::COUNT]) -> Self {
        Lineage { values }
    }

    /// Returns the value at the given rank.
    pub fn get(&self, rank: Rank) -> &str {
        &self.values[rank.index()]
    }

    /// Returns the strain name.
    pub fn strain(&self) -> &str {
        self.get(Rank::Strain)
    }
}

/// Lineages of reference sequences by `fasta_name`.
///
/// # Examples
///
/// ```
/// use asm_validate::{Rank, TaxonomyTable};
///
/// let input = "fasta_name\tspecies\tgenus\tfamily\torder\tclass\tphylum\tsuperphylum\tsuperkingdom\tlife\n\
///              ref1\tE. coli\tEscherichia\tEnterobacteriaceae\tEnterobacterales\tGammaproteobacteria\tProteobacteria\t-\tBacteria\tLife\n";
/// let taxonomy = TaxonomyTable::from_reader(input.as_bytes(), std::path::Path::new("phylogeny.tsv")).unwrap();
/// let lineage = taxonomy.get("ref1").unwrap();
/// assert_eq!(lineage.get(Rank::Strain), "ref1");
/// assert_eq!(lineage.get(Rank::Genus), "Escherichia");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxonomyTable {
    lineages: HashMap<String, Lineage>,
}

impl TaxonomyTable {
    /// Column with the reference sequence names.
    pub const FASTA_NAME: &'static str = "fasta_name";

    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the lineage for a reference.
    pub fn insert(&mut self, fasta_name: &str, lineage: Lineage) {
        self.lineages.insert(fasta_name.to_string(), lineage);
    }

    /// Reads the phylogeny table from a file, which may be gzip-compressed.
    ///
    /// Returns an error if the file cannot be read or if required columns are missing.
    pub fn read<P: AsRef<Path>>(filename: P) -> Result<Self> {
        info!("Reading reference phylogeny from {}", filename.as_ref().display());
        let table = Table::read(&filename)?;
        let result = Self::from_table(&table)?;
        info!("{} references with taxonomy", result.len());
        Ok(result)
    }

    /// Reads the phylogeny table from the given input.
    ///
    /// `file` is only used in error messages.
    pub fn from_reader<R: std::io::Read>(reader: R, file: &Path) -> Result<Self> {
        let table = Table::from_reader(reader, file)?;
        Self::from_table(&table)
    }

    fn from_table(table: &Table) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedTable { file: table.file().to_path_buf(), reason };
        let find = |name: &str| table.columns().iter().position(|column| column.eq_ignore_ascii_case(name));

        // The names are either in the id column or in a column of their own.
        let name_column = find(Self::FASTA_NAME);
        if name_column.is_none() {
            if let Some(id_column) = table.id_column() {
                if !id_column.eq_ignore_ascii_case(Self::FASTA_NAME) {
                    return Err(malformed(format!("missing column {}", Self::FASTA_NAME)));
                }
            }
        }

        // `None` for strain means that the strain is the name.
        let mut rank_columns: [Option<usize>; Rank::COUNT] = [None; Rank::COUNT];
        for rank in Rank::ALL {
            rank_columns[rank.index()] = find(rank.name());
            if rank != Rank::Strain && rank_columns[rank.index()].is_none() {
                return Err(malformed(format!("missing column {}", rank.name())));
            }
        }

        let mut result = TaxonomyTable::new();
        for (id, values) in table.iter() {
            let fasta_name = name_column.map_or(id, |i| values[i].as_str());
            let lineage = Rank::ALL.map(|rank| match rank_columns[rank.index()] {
                Some(i) => values[i].clone(),
                None => fasta_name.to_string(),
            });
            result.insert(fasta_name, Lineage::new(lineage));
        }

        Ok(result)
    }

    /// Returns the number of references.
    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }

    /// Returns the lineage of the reference.
    pub fn get(&self, fasta_name: &str) -> Option<&Lineage> {
        self.lineages.get(fasta_name)
    }

    /// Returns the lineage of the reference or [`Error::MissingTaxonomy`].
    pub fn lineage(&self, fasta_name: &str) -> Result<&Lineage> {
        self.get(fasta_name).ok_or_else(|| Error::MissingTaxonomy(fasta_name.to_string()))
    }
}

//-----------------------------------------------------------------------------
