//! Alignment records from nucmer `show-coords` output.
//!
//! The coords file is expected to be produced with `show-coords -rclTH` or equivalent options.
//! Each line contains 13 whitespace-separated fields in a fixed order:
//!
//! | Field | Name | Type |
//! |-------|------|------|
//! | 1 | `S1`: reference start | integer |
//! | 2 | `E1`: reference end | integer |
//! | 3 | `S2`: query start | integer |
//! | 4 | `E2`: query end | integer |
//! | 5 | `LEN1`: aligned length in the reference | integer |
//! | 6 | `LEN2`: aligned length in the query | integer |
//! | 7 | `IDY`: identity percentage | float in 0 to 100 |
//! | 8 | `LENR`: reference length | integer |
//! | 9 | `LENQ`: query length | integer |
//! | 10 | `COVR`: reference coverage percentage | float |
//! | 11 | `COVQ`: query coverage percentage | float |
//! | 12 | reference name | string |
//! | 13 | query name | string |
//!
//! Query coordinates are reversed (`S2 > E2`) for alignments to the reverse strand.

use crate::{Error, Result};

use std::fmt::Display;


//-----------------------------------------------------------------------------

/// A pairwise alignment between a reference genome and a query contig.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentRecord {
    /// Start of the alignment in the reference (1-based, inclusive).
    pub ref_start: usize,
    /// End of the alignment in the reference (1-based, inclusive).
    pub ref_end: usize,
    /// Start of the alignment in the query.
    pub qry_start: usize,
    /// End of the alignment in the query.
    pub qry_end: usize,
    /// Length of the aligned region in the reference.
    pub ref_aln_len: usize,
    /// Length of the aligned region in the query.
    pub qry_aln_len: usize,
    /// Alignment identity as a percentage.
    pub identity: f64,
    /// Total length of the reference sequence.
    pub ref_total_len: usize,
    /// Total length of the query sequence.
    pub qry_total_len: usize,
    /// Percentage of the reference covered by the alignment.
    pub ref_cov_pct: f64,
    /// Percentage of the query covered by the alignment.
    pub qry_cov_pct: f64,
    /// Reference sequence name.
    pub ref_id: String,
    /// Query sequence name.
    pub qry_id: String,
}

impl AlignmentRecord {
    /// Number of fields in a coords line.
    pub const FIELDS: usize = 13;

    /// Parses a coords line.
    ///
    /// `line_num` is the 1-based line number used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] if the line does not have 13 fields, a numeric field cannot be parsed, or the record fails validation.
    pub fn parse(line: &str, line_num: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != Self::FIELDS {
            return Err(malformed(line_num, format!("expected {} fields, found {}", Self::FIELDS, fields.len())));
        }

        let record = AlignmentRecord {
            ref_start: parse_usize(fields[0], "S1", line_num)?,
            ref_end: parse_usize(fields[1], "E1", line_num)?,
            qry_start: parse_usize(fields[2], "S2", line_num)?,
            qry_end: parse_usize(fields[3], "E2", line_num)?,
            ref_aln_len: parse_usize(fields[4], "LEN1", line_num)?,
            qry_aln_len: parse_usize(fields[5], "LEN2", line_num)?,
            identity: parse_f64(fields[6], "IDY", line_num)?,
            ref_total_len: parse_usize(fields[7], "LENR", line_num)?,
            qry_total_len: parse_usize(fields[8], "LENQ", line_num)?,
            ref_cov_pct: parse_f64(fields[9], "COVR", line_num)?,
            qry_cov_pct: parse_f64(fields[10], "COVQ", line_num)?,
            ref_id: fields[11].to_string(),
            qry_id: fields[12].to_string(),
        };
        record.validate().map_err(|reason| malformed(line_num, reason))?;

        Ok(record)
    }

    /// Checks that the percentages are within `[0, 100]` and the reference interval is not reversed.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=100.0).contains(&self.identity) {
            return Err(format!("identity {} is outside [0, 100]", self.identity));
        }
        if !(0.0..=100.0).contains(&self.qry_cov_pct) {
            return Err(format!("query coverage {} is outside [0, 100]", self.qry_cov_pct));
        }
        if !(0.0..=100.0).contains(&self.ref_cov_pct) {
            return Err(format!("reference coverage {} is outside [0, 100]", self.ref_cov_pct));
        }
        if self.ref_start > self.ref_end {
            return Err(format!("reference interval {}..{} is reversed", self.ref_start, self.ref_end));
        }
        Ok(())
    }

    /// Returns the purity of the alignment: query coverage times identity, as a fraction.
    pub fn purity(&self) -> f64 {
        purity(self.qry_cov_pct, self.identity)
    }

    /// Returns the alignment identity as a fraction.
    pub fn identity_fraction(&self) -> f64 {
        self.identity / 100.0
    }

    /// Returns the aligned interval in query coordinates, ignoring the strand.
    pub fn query_interval(&self) -> (usize, usize) {
        (self.qry_start.min(self.qry_end), self.qry_start.max(self.qry_end))
    }

    /// Returns `true` if the query is aligned to the reverse strand.
    pub fn is_reverse(&self) -> bool {
        self.qry_start > self.qry_end
    }
}

impl Display for AlignmentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f, "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.ref_start, self.ref_end, self.qry_start, self.qry_end,
            self.ref_aln_len, self.qry_aln_len, self.identity,
            self.ref_total_len, self.qry_total_len,
            self.ref_cov_pct, self.qry_cov_pct,
            self.ref_id, self.qry_id
        )
    }
}

/// Purity from coverage and identity percentages.
///
/// Both arguments are in `[0, 100]`, and the result is in `[0, 1]`.
pub fn purity(cov_pct: f64, identity: f64) -> f64 {
    cov_pct * identity / 10000.0
}

//-----------------------------------------------------------------------------

fn malformed(line: usize, reason: String) -> Error {
    Error::MalformedRecord { line, reason }
}

fn parse_usize(field: &str, name: &str, line_num: usize) -> Result<usize> {
    field.parse::<usize>().map_err(|x| {
        malformed(line_num, format!("invalid {} value {}: {}", name, field, x))
    })
}

fn parse_f64(field: &str, name: &str, line_num: usize) -> Result<f64> {
    let value = field.parse::<f64>().map_err(|x| {
        malformed(line_num, format!("invalid {} value {}: {}", name, field, x))
    })?;
    if !value.is_finite() {
        return Err(malformed(line_num, format!("invalid {} value {}", name, field)));
    }
    Ok(value)
}

//-----------------------------------------------------------------------------
