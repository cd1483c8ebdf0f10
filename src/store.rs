//! Alignment store: nucmer alignment records in an SQLite database.
//!
//! The store is built once and then used read-only.
//! It can live in memory or in a cache file next to the coords file, in which case later runs reuse the cache.
//!
//! ### Tables
//!
//! * `Tags`: key-value pairs with the cache version, the source file, and record counts.
//! * `Coords`: one row per alignment with an auto-generated integer primary key.
//!
//! `Coords` is indexed by query name and by reference position, which cover the queries in [`AlignmentStore`].

use crate::{AlignmentRecord, Error, Result};
use crate::utils;

use std::fs;
use std::io::BufRead;
use std::path::Path;

use log::{debug, info, warn};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};


//-----------------------------------------------------------------------------

/// An alignment with the maximum purity among the alignments of its query contig.
#[derive(Clone, Debug, PartialEq)]
pub struct PurestAlignment {
    /// Row identifier in the store.
    pub id: usize,
    /// The alignment.
    pub record: AlignmentRecord,
    /// Purity of the alignment.
    pub purity: f64,
}

/// An alignment with its strand-agnostic interval in query coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryInterval {
    /// Row identifier in the store.
    pub id: usize,
    /// The alignment.
    pub record: AlignmentRecord,
    /// Smaller query coordinate.
    pub start: usize,
    /// Larger query coordinate.
    pub end: usize,
}

/// Maximum purity over all alignments of a query contig.
#[derive(Clone, Debug, PartialEq)]
pub struct ContigPurity {
    /// Query contig name.
    pub qry_id: String,
    /// Maximum purity.
    pub max_purity: f64,
    /// Total length of the contig.
    pub length: usize,
}

/// Statistics from building the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of inserted records.
    pub inserted: usize,
    /// Number of malformed records that were skipped.
    pub skipped: usize,
}

/// Outcome of [`AlignmentStore::open_or_create`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestStatus {
    /// The cache was built from the coords file.
    Created(IngestReport),
    /// An existing cache was reused.
    Reused,
}

//-----------------------------------------------------------------------------

/// A database of nucmer alignments.
///
/// # Examples
///
/// ```
/// use asm_validate::{AlignmentRecord, AlignmentStore};
///
/// let lines = [
///     "1 100 1 100 100 100 100.00 5000 150 2.00 66.67 G1 C1",
///     "1 50 1 50 50 50 90.00 5000 150 1.00 33.33 G2 C1",
/// ];
/// let records = lines.iter().enumerate().map(|(i, line)| AlignmentRecord::parse(line, i + 1).unwrap());
/// let (store, report) = AlignmentStore::ingest(records).unwrap();
/// assert_eq!(report.inserted, 2);
/// assert_eq!(store.records(), 2);
///
/// let purest = store.max_purity_per_query(100).unwrap();
/// assert_eq!(purest.len(), 1);
/// assert_eq!(purest[0].record.ref_id, "G1");
/// ```
#[derive(Debug)]
pub struct AlignmentStore {
    connection: Connection,
    records: usize,
}

/// Using the store.
impl AlignmentStore {
    // Key for cache version.
    const KEY_VERSION: &'static str = "version";

    /// Current cache version.
    pub const VERSION: &'static str = "Coords cache v1";

    // Key for the source coords file.
    const KEY_SOURCE: &'static str = "source";

    // Key for record count.
    const KEY_RECORDS: &'static str = "records";

    // Key for skipped record count.
    const KEY_SKIPPED: &'static str = "skipped";

    // Record columns in the order used by `AlignmentRecord::FIELDS`, preceded by the row id.
    const COLUMNS: &'static str = "id, ref_start, ref_end, qry_start, qry_end, ref_aln_len, qry_aln_len, identity,
        ref_total_len, qry_total_len, ref_cov_pct, qry_cov_pct, ref_id, qry_id";

    /// Returns `true` if the database file exists.
    pub fn exists<P: AsRef<Path>>(filename: P) -> bool {
        utils::file_exists(filename)
    }

    /// Opens an existing cache file read-only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Version`] if the cache was created by an incompatible version.
    /// Passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(filename, flags)?;

        let version = get_tag(&connection, Self::KEY_VERSION)?.unwrap_or_default();
        if version != Self::VERSION {
            return Err(Error::Version { found: version, expected: Self::VERSION.to_string() });
        }
        let records = count_records(&connection)?;

        Ok(AlignmentStore { connection, records })
    }

    /// Returns the filename of the database, or [`None`] for an in-memory store.
    pub fn filename(&self) -> Option<&str> {
        match self.connection.path() {
            Some(path) if !path.is_empty() => Some(path),
            _ => None,
        }
    }

    /// Returns the size of the database file in a human-readable format.
    pub fn file_size(&self) -> Option<String> {
        let filename = self.filename()?;
        utils::file_size(filename)
    }

    /// Returns the number of alignment records in the store.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Returns the value of a tag stored in the database.
    pub fn get_tag(&self, key: &str) -> Result<Option<String>> {
        get_tag(&self.connection, key)
    }

    /// Returns the record with the given row identifier.
    pub fn get(&self, id: usize) -> Result<Option<AlignmentRecord>> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {} FROM Coords WHERE id = ?1", Self::COLUMNS
        ))?;
        let record = statement.query_row((id,), |row| record_from_row(row, 1)).optional()?;
        Ok(record)
    }
}

//-----------------------------------------------------------------------------

/// Building the store.
impl AlignmentStore {
    /// Builds an in-memory store from the given records.
    ///
    /// Records that fail [`AlignmentRecord::validate`] are logged and skipped.
    /// Passes through any database errors.
    pub fn ingest<I: IntoIterator<Item = AlignmentRecord>>(records: I) -> Result<(Self, IngestReport)> {
        let mut connection = Connection::open_in_memory()?;
        Self::create_tables(&mut connection)?;
        let records = records.into_iter().enumerate().map(|(i, record)| {
            record.validate().map(|_| record).map_err(|reason| Error::MalformedRecord { line: i + 1, reason })
        });
        let report = Self::insert_records(records, &mut connection)?;
        Self::insert_tags(None, &report, &mut connection)?;
        let records = count_records(&connection)?;
        Ok((AlignmentStore { connection, records }, report))
    }

    /// Builds an in-memory store from a coords file, which may be gzip-compressed.
    ///
    /// Malformed lines are logged and skipped.
    /// Returns an error if the file cannot be read and passes through any database errors.
    pub fn from_coords_file<P: AsRef<Path>>(coords_file: P) -> Result<(Self, IngestReport)> {
        info!("Loading alignments from {}", coords_file.as_ref().display());
        let reader = utils::open_file(&coords_file)?;
        let mut connection = Connection::open_in_memory()?;
        Self::create_tables(&mut connection)?;
        let report = Self::insert_lines(reader, &mut connection)?;
        Self::insert_tags(Some(coords_file.as_ref()), &report, &mut connection)?;
        let records = count_records(&connection)?;
        Ok((AlignmentStore { connection, records }, report))
    }

    /// Creates a cache file `db_file` from the coords file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the cache file already exists.
    /// Passes through any I/O and database errors.
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(coords_file: P, db_file: Q) -> Result<IngestReport> {
        let db_file = db_file.as_ref();
        info!("Creating alignment cache {}", db_file.display());
        if Self::exists(db_file) {
            return Err(Error::AlreadyExists(db_file.to_path_buf()));
        }

        // Do not leave a partial cache behind for the next run to reuse.
        let result = Self::build_cache(coords_file.as_ref(), db_file);
        if result.is_err() {
            let _ = fs::remove_file(db_file);
        }
        result
    }

    fn build_cache(coords_file: &Path, db_file: &Path) -> Result<IngestReport> {
        let reader = utils::open_file(coords_file)?;
        let mut connection = Connection::open(db_file)?;
        Self::create_tables(&mut connection)?;
        let report = Self::insert_lines(reader, &mut connection)?;
        Self::insert_tags(Some(coords_file), &report, &mut connection)?;
        debug!("Cache size: {}", utils::file_size(db_file).unwrap_or(String::from("unknown")));
        Ok(report)
    }

    /// Opens the cache file `db_file`, creating it from the coords file first if it does not exist.
    ///
    /// Returns the store and whether the cache was created or reused.
    /// See [`AlignmentStore::create`] and [`AlignmentStore::open`] for errors.
    pub fn open_or_create<P: AsRef<Path>, Q: AsRef<Path>>(coords_file: P, db_file: Q) -> Result<(Self, IngestStatus)> {
        let status = match Self::create(&coords_file, &db_file) {
            Ok(report) => IngestStatus::Created(report),
            Err(Error::AlreadyExists(filename)) => {
                info!("Reusing alignment cache {}", filename.display());
                IngestStatus::Reused
            },
            Err(err) => return Err(err),
        };
        let store = Self::open(&db_file)?;
        Ok((store, status))
    }

    fn create_tables(connection: &mut Connection) -> rusqlite::Result<()> {
        connection.execute(
            "CREATE TABLE Tags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        connection.execute(
            "CREATE TABLE Coords (
                id INTEGER PRIMARY KEY,
                ref_start INTEGER NOT NULL,
                ref_end INTEGER NOT NULL,
                qry_start INTEGER NOT NULL,
                qry_end INTEGER NOT NULL,
                ref_aln_len INTEGER NOT NULL,
                qry_aln_len INTEGER NOT NULL,
                identity REAL NOT NULL,
                ref_total_len INTEGER NOT NULL,
                qry_total_len INTEGER NOT NULL,
                ref_cov_pct REAL NOT NULL,
                qry_cov_pct REAL NOT NULL,
                ref_id TEXT NOT NULL,
                qry_id TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        Ok(())
    }

    fn insert_tags(source: Option<&Path>, report: &IngestReport, connection: &mut Connection) -> rusqlite::Result<()> {
        let transaction = connection.transaction()?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO Tags(key, value) VALUES (?1, ?2)"
            )?;
            insert.execute((Self::KEY_VERSION, Self::VERSION))?;
            if let Some(source) = source {
                insert.execute((Self::KEY_SOURCE, source.display().to_string()))?;
            }
            insert.execute((Self::KEY_RECORDS, report.inserted.to_string()))?;
            insert.execute((Self::KEY_SKIPPED, report.skipped.to_string()))?;
        }
        transaction.commit()
    }

    // Parses coords lines and inserts the valid records.
    fn insert_lines(reader: Box<dyn BufRead>, connection: &mut Connection) -> Result<IngestReport> {
        let records = reader.lines().enumerate().filter_map(|(i, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(AlignmentRecord::parse(&line, i + 1)),
            Err(err) => Some(Err(Error::from(err))),
        });
        Self::insert_records(records, connection)
    }

    fn insert_records<I: IntoIterator<Item = Result<AlignmentRecord>>>(records: I, connection: &mut Connection) -> Result<IngestReport> {
        info!("Inserting alignment records");

        let mut report = IngestReport::default();
        let transaction = connection.transaction()?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO
                    Coords(ref_start, ref_end, qry_start, qry_end, ref_aln_len, qry_aln_len, identity,
                        ref_total_len, qry_total_len, ref_cov_pct, qry_cov_pct, ref_id, qry_id)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            )?;
            for record in records {
                let record = match record {
                    Ok(record) => record,
                    Err(err @ Error::MalformedRecord { .. }) => {
                        warn!("Skipping {}", err);
                        report.skipped += 1;
                        continue;
                    },
                    Err(err) => return Err(err),
                };
                insert.execute(params![
                    record.ref_start, record.ref_end, record.qry_start, record.qry_end,
                    record.ref_aln_len, record.qry_aln_len, record.identity,
                    record.ref_total_len, record.qry_total_len,
                    record.ref_cov_pct, record.qry_cov_pct,
                    record.ref_id, record.qry_id
                ])?;
                report.inserted += 1;
            }
        }
        transaction.commit()?;

        connection.execute("CREATE INDEX CoordsByQuery ON Coords(qry_id)", ())?;
        connection.execute("CREATE INDEX CoordsByReference ON Coords(ref_id, ref_start)", ())?;

        info!("Inserted {} alignment records", report.inserted);
        if report.skipped > 0 {
            warn!("Skipped {} malformed alignment records", report.skipped);
        }
        Ok(report)
    }
}

//-----------------------------------------------------------------------------

/// Queries.
impl AlignmentStore {
    /// Returns the alignments with maximum purity for each query contig of length at least `min_length`.
    ///
    /// If several alignments of a contig share the maximum purity, all of them are returned.
    /// The alignments are sorted by reference name and reference start, with ties in insertion order.
    /// Passes through any database errors.
    pub fn max_purity_per_query(&self, min_length: usize) -> Result<Vec<PurestAlignment>> {
        let mut statement = self.connection.prepare(
            "SELECT c.id, c.ref_start, c.ref_end, c.qry_start, c.qry_end, c.ref_aln_len, c.qry_aln_len, c.identity,
                c.ref_total_len, c.qry_total_len, c.ref_cov_pct, c.qry_cov_pct, c.ref_id, c.qry_id, m.purity
            FROM Coords AS c
            JOIN (
                SELECT qry_id, MAX(qry_cov_pct * identity / 10000.0) AS purity
                FROM Coords
                GROUP BY qry_id
            ) AS m
            ON c.qry_id = m.qry_id AND c.qry_cov_pct * c.identity / 10000.0 = m.purity
            WHERE c.qry_total_len >= ?1
            ORDER BY c.ref_id ASC, c.ref_start ASC, c.id ASC"
        )?;
        let rows = statement.query_map((min_length,), |row| {
            Ok(PurestAlignment {
                id: row.get(0)?,
                record: record_from_row(row, 1)?,
                purity: row.get(14)?,
            })
        })?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(result)
    }

    /// Returns all alignments of query contigs of length at least `min_length` with their query intervals.
    ///
    /// The interval is strand-agnostic: `(min(qry_start, qry_end), max(qry_start, qry_end))`.
    /// The alignments are sorted by query name and interval start, with ties in insertion order.
    /// Passes through any database errors.
    pub fn aligned_intervals(&self, min_length: usize) -> Result<Vec<QueryInterval>> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {}, MIN(qry_start, qry_end) AS interval_start, MAX(qry_start, qry_end) AS interval_end
            FROM Coords
            WHERE qry_total_len >= ?1
            ORDER BY qry_id ASC, interval_start ASC, id ASC",
            Self::COLUMNS
        ))?;
        let rows = statement.query_map((min_length,), |row| {
            Ok(QueryInterval {
                id: row.get(0)?,
                record: record_from_row(row, 1)?,
                start: row.get(14)?,
                end: row.get(15)?,
            })
        })?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(result)
    }

    /// Returns the maximum purity for each query contig of length at least `min_length`, sorted by contig name.
    ///
    /// Passes through any database errors.
    pub fn contig_max_purity(&self, min_length: usize) -> Result<Vec<ContigPurity>> {
        let mut statement = self.connection.prepare(
            "SELECT qry_id, MAX(qry_cov_pct * identity / 10000.0), MAX(qry_total_len)
            FROM Coords
            WHERE qry_total_len >= ?1
            GROUP BY qry_id
            ORDER BY qry_id ASC"
        )?;
        let rows = statement.query_map((min_length,), |row| {
            Ok(ContigPurity {
                qry_id: row.get(0)?,
                max_purity: row.get(1)?,
                length: row.get(2)?,
            })
        })?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(result)
    }
}

//-----------------------------------------------------------------------------

// Reads the 13 record fields starting from column `first`.
fn record_from_row(row: &Row, first: usize) -> rusqlite::Result<AlignmentRecord> {
    Ok(AlignmentRecord {
        ref_start: row.get(first)?,
        ref_end: row.get(first + 1)?,
        qry_start: row.get(first + 2)?,
        qry_end: row.get(first + 3)?,
        ref_aln_len: row.get(first + 4)?,
        qry_aln_len: row.get(first + 5)?,
        identity: row.get(first + 6)?,
        ref_total_len: row.get(first + 7)?,
        qry_total_len: row.get(first + 8)?,
        ref_cov_pct: row.get(first + 9)?,
        qry_cov_pct: row.get(first + 10)?,
        ref_id: row.get(first + 11)?,
        qry_id: row.get(first + 12)?,
    })
}

fn get_tag(connection: &Connection, key: &str) -> Result<Option<String>> {
    let mut statement = connection.prepare(
        "SELECT value FROM Tags WHERE key = ?1"
    )?;
    let value: Option<String> = statement.query_row((key,), |row| row.get(0)).optional()?;
    Ok(value)
}

fn count_records(connection: &Connection) -> Result<usize> {
    let mut statement = connection.prepare("SELECT COUNT(*) FROM Coords")?;
    let count = statement.query_row((), |row| row.get::<_, usize>(0))?;
    Ok(count)
}

//-----------------------------------------------------------------------------
