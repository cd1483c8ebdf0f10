//! Utility functions and structures.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::io::{self, BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;


//-----------------------------------------------------------------------------

/// Returns the full file name for a specific test file.
pub fn get_test_data(filename: &'static str) -> PathBuf {
    let mut buf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    buf.push("test-data");
    buf.push(filename);
    buf
}

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 6] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0, "PiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

/// Returns `true` if the file appears to be gzip-compressed.
pub fn is_gzipped<P: AsRef<Path>>(filename: P) -> bool {
    let file = match File::open(filename) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0; 2];
    let len = reader.read(&mut magic).ok();
    len == Some(2) && magic == [0x1F, 0x8B]
}

/// Returns a buffered reader for the file, which may be gzip-compressed.
pub fn open_file<P: AsRef<Path>>(filename: P) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(&filename)?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------

// Nucleotide counting.

const fn generate_nucleotide_classes() -> [u8; 256] {
    let mut result = [0; 256];
    result[b'a' as usize] = 1; result[b'A' as usize] = 1;
    result[b't' as usize] = 1; result[b'T' as usize] = 1;
    result[b'c' as usize] = 2; result[b'C' as usize] = 2;
    result[b'g' as usize] = 2; result[b'G' as usize] = 2;
    result
}

// 0 = other, 1 = A/T, 2 = C/G.
const NUCLEOTIDE_CLASS: [u8; 256] = generate_nucleotide_classes();

/// Returns the number of `acgtACGT` characters in the sequence.
///
/// Ambiguity codes and any other characters are not counted.
pub fn nucleotide_count(sequence: &[u8]) -> usize {
    sequence.iter().filter(|&&c| NUCLEOTIDE_CLASS[c as usize] != 0).count()
}

/// Returns the number of `cgCG` characters in the sequence.
pub fn gc_count(sequence: &[u8]) -> usize {
    sequence.iter().filter(|&&c| NUCLEOTIDE_CLASS[c as usize] == 2).count()
}

/// Returns the fraction of `cgCG` characters among all characters in the sequence.
///
/// The denominator is the full sequence length, including ambiguity codes.
/// Returns `0.0` for an empty sequence.
pub fn gc_fraction(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    gc_count(sequence) as f64 / sequence.len() as f64
}

//-----------------------------------------------------------------------------

/// Formats an optional value for a TSV field, using `-` for a missing value.
pub fn field_or_placeholder<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => String::from("-"),
    }
}

//-----------------------------------------------------------------------------
