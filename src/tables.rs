//! Tabular inputs with a header line and one row per named item.
//!
//! A [`Table`] is a tab-separated file read with the `csv` crate.
//! It has a header line with column names followed by rows where the first field is the row id.
//! The header may either name every column, or omit the name of the id column.
//! In the latter case, the number of names is one less than the number of fields in each row.
//!
//! [`ReferenceStats`] interprets the reference-stats table with columns `length`, `GC_content`, and `ratio_covered`.

use crate::{Error, Result};
use crate::utils;

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;


//-----------------------------------------------------------------------------

/// A tab-separated table with named columns and rows identified by the first field.
///
/// Rows are stored in file order.
/// Fields are trimmed, and blank lines are ignored.
///
/// # Examples
///
/// ```
/// use asm_validate::tables::Table;
/// use std::path::Path;
///
/// let input = "length\tGC_content\nG1\t1000\t0.5\nG2\t800\t0.4\n";
/// let table = Table::from_reader(input.as_bytes(), Path::new("ref.stats")).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get("G2", "length"), Some("800"));
/// assert_eq!(table.id_column(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    file: PathBuf,
    id_column: Option<String>,
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Reads a table from a file, which may be gzip-compressed.
    ///
    /// Returns an error if the file cannot be read or the table is malformed.
    pub fn read<P: AsRef<Path>>(filename: P) -> Result<Self> {
        let reader = utils::open_file(&filename)?;
        Self::from_reader(reader, filename.as_ref())
    }

    /// Reads a table from the given input.
    ///
    /// `file` is only used in error messages.
    /// Returns an error if the header is missing, if a row has the wrong number of fields, or if a row id occurs twice.
    pub fn from_reader<R: Read>(reader: R, file: &Path) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedTable { file: file.to_path_buf(), reason };
        let line_of = |record: &StringRecord| record.position().map_or(0, |pos| pos.line() as usize);

        // The header and the rows may have different widths.
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut records = reader.records().filter(|record| {
            record.as_ref().map_or(true, |record| record.iter().any(|field| !field.is_empty()))
        });
        let header = match records.next() {
            Some(record) => record?,
            None => return Err(malformed(String::from("missing header line"))),
        };
        let names: Vec<String> = header.iter().map(String::from).collect();

        let mut id_column: Option<Option<String>> = None;
        let mut rows: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let record = record?;
            let line_num = line_of(&record);

            // The first row determines whether the header names the id column.
            let width = match id_column {
                Some(None) => names.len() + 1,
                Some(Some(_)) => names.len(),
                None => {
                    if record.len() == names.len() + 1 {
                        id_column = Some(None);
                    } else if record.len() == names.len() && !names.is_empty() {
                        id_column = Some(Some(names[0].clone()));
                    } else {
                        return Err(malformed(format!(
                            "line {} has {} fields for {} column names", line_num, record.len(), names.len()
                        )));
                    }
                    record.len()
                },
            };
            if record.len() != width {
                return Err(malformed(format!("line {} has {} fields, expected {}", line_num, record.len(), width)));
            }

            let id = record[0].to_string();
            if index.contains_key(&id) {
                return Err(malformed(format!("duplicate row {} on line {}", id, line_num)));
            }
            index.insert(id.clone(), rows.len());
            rows.push((id, record.iter().skip(1).map(String::from).collect()));
        }

        let id_column = id_column.flatten();
        let columns = if id_column.is_some() { names[1..].to_vec() } else { names };
        Ok(Table {
            file: file.to_path_buf(),
            id_column, columns, rows, index,
        })
    }

    /// Returns the file the table was read from.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns the name of the id column, if the header includes it.
    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }

    /// Returns the names of the value columns in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the index of the value column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over row ids and values in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows.iter().map(|(id, values)| (id.as_str(), values.as_slice()))
    }

    /// Returns the values in the row with the given id.
    pub fn row(&self, id: &str) -> Option<&[String]> {
        self.index.get(id).map(|i| self.rows[*i].1.as_slice())
    }

    /// Returns the value in the given row and column.
    pub fn get(&self, id: &str, column: &str) -> Option<&str> {
        let column = self.column_index(column)?;
        self.row(id).map(|values| values[column].as_str())
    }

    // Parses a value with an error naming the row and the column.
    fn parse_value<T: FromStr>(&self, id: &str, column: &str, value: &str) -> Result<T> {
        value.parse::<T>().map_err(|_| Error::MalformedTable {
            file: self.file.clone(),
            reason: format!("invalid {} value for {}: {}", column, id, value),
        })
    }
}

//-----------------------------------------------------------------------------

/// Statistics for a reference genome.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceGenome {
    /// Genome name.
    pub id: String,
    /// Genome length in bases.
    pub length: usize,
    /// GC content, if the table has a `GC_content` column.
    pub gc_content: Option<f64>,
    /// Ratio of the genome covered by reads, if the table has a `ratio_covered` column.
    pub ratio_covered: Option<f64>,
}

/// The reference-stats table.
///
/// Genomes are stored in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceStats {
    genomes: Vec<ReferenceGenome>,
}

impl ReferenceStats {
    /// Column with genome lengths.
    pub const LENGTH: &'static str = "length";

    /// Column with GC content.
    pub const GC_CONTENT: &'static str = "GC_content";

    /// Column with the ratio covered by reads.
    pub const RATIO_COVERED: &'static str = "ratio_covered";

    /// Reads the reference-stats table from a tab-separated file.
    ///
    /// Returns an error if the file cannot be read, if the `length` column is missing, or if a value cannot be parsed.
    pub fn read<P: AsRef<Path>>(filename: P) -> Result<Self> {
        info!("Reading reference statistics from {}", filename.as_ref().display());
        let table = Table::read(&filename)?;
        let result = Self::from_table(&table)?;
        info!("{} reference genomes, total {} bp", result.len(), result.total_length());
        Ok(result)
    }

    /// Interprets a table as reference statistics.
    pub fn from_table(table: &Table) -> Result<Self> {
        let length = table.column_index(Self::LENGTH).ok_or_else(|| Error::MalformedTable {
            file: table.file().to_path_buf(),
            reason: format!("missing column {}", Self::LENGTH),
        })?;
        let gc_content = table.column_index(Self::GC_CONTENT);
        let ratio_covered = table.column_index(Self::RATIO_COVERED);

        let mut genomes = Vec::with_capacity(table.len());
        for (id, values) in table.iter() {
            let optional = |column: Option<usize>, name: &str| -> Result<Option<f64>> {
                match column {
                    Some(i) => table.parse_value(id, name, &values[i]).map(Some),
                    None => Ok(None),
                }
            };
            genomes.push(ReferenceGenome {
                id: id.to_string(),
                length: table.parse_value(id, Self::LENGTH, &values[length])?,
                gc_content: optional(gc_content, Self::GC_CONTENT)?,
                ratio_covered: optional(ratio_covered, Self::RATIO_COVERED)?,
            });
        }

        Ok(ReferenceStats { genomes })
    }

    /// Returns the number of genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Returns `true` if there are no genomes.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns an iterator over the genomes in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceGenome> {
        self.genomes.iter()
    }

    /// Returns the statistics for the genome with the given name.
    pub fn get(&self, id: &str) -> Option<&ReferenceGenome> {
        self.genomes.iter().find(|genome| genome.id == id)
    }

    /// Returns genome lengths by name.
    pub fn lengths(&self) -> BTreeMap<String, usize> {
        self.genomes.iter().map(|genome| (genome.id.clone(), genome.length)).collect()
    }

    /// Returns the total length of the genomes.
    pub fn total_length(&self) -> usize {
        self.genomes.iter().map(|genome| genome.length).sum()
    }
}

//-----------------------------------------------------------------------------
