//! Utility functions and structures.

use std::fs::{self, File};
use std::path::Path;
use std::io::{BufRead, BufReader, Read};

use gbwt::Orientation;
use gbwt::support;

use flate2::read::MultiGzDecoder;

//-----------------------------------------------------------------------------

// Distance arithmetic.

/// Distance value for "no path exists".
///
/// The value is absorbing: adding anything to it yields [`UNREACHABLE`] again.
pub const UNREACHABLE: usize = usize::MAX;

/// Adds two distances, treating [`UNREACHABLE`] as infinity.
#[inline]
pub fn add_distance(a: usize, b: usize) -> usize {
    a.saturating_add(b)
}

/// Returns `value` or [`None`] if the value is [`UNREACHABLE`].
#[inline]
pub fn finite(value: usize) -> Option<usize> {
    if value == UNREACHABLE { None } else { Some(value) }
}

//-----------------------------------------------------------------------------

// Oriented node handles in the GBWT encoding.

/// Returns the other orientation.
#[inline]
pub fn flip_orientation(orientation: Orientation) -> Orientation {
    match orientation {
        Orientation::Forward => Orientation::Reverse,
        Orientation::Reverse => Orientation::Forward,
    }
}

/// Returns the handle for the same node in the other orientation.
#[inline]
pub fn flip_handle(handle: usize) -> usize {
    support::encode_node(support::node_id(handle), flip_orientation(support::node_orientation(handle)))
}

/// Returns `true` if the handle is in reverse orientation.
#[inline]
pub fn is_reverse(handle: usize) -> bool {
    support::node_orientation(handle) == Orientation::Reverse
}

/// Returns the handle for the node in forward orientation if `reverse` is `false`, or in reverse orientation otherwise.
#[inline]
pub fn oriented_handle(node_id: usize, reverse: bool) -> usize {
    let orientation = if reverse { Orientation::Reverse } else { Orientation::Forward };
    support::encode_node(node_id, orientation)
}

/// Returns a string representation of the handle using GAF walk notation (`>12`, `<12`).
pub fn handle_to_string(handle: usize) -> String {
    match support::node_orientation(handle) {
        Orientation::Forward => format!(">{}", support::node_id(handle)),
        Orientation::Reverse => format!("<{}", support::node_id(handle)),
    }
}

/// Parses a handle in GAF walk notation (`>12`, `<12`).
pub fn parse_handle(value: &str) -> Result<usize, String> {
    let orientation = match value.as_bytes().first() {
        Some(b'>') => Orientation::Forward,
        Some(b'<') => Orientation::Reverse,
        _ => return Err(format!("Invalid oriented node: {}", value)),
    };
    let node_id = value[1..].parse::<usize>().map_err(|err| {
        format!("Invalid node identifier in {}: {}", value, err)
    })?;
    if node_id == 0 {
        return Err(format!("Node identifiers must be positive: {}", value));
    }
    Ok(support::encode_node(node_id, orientation))
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
pub fn open_file<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, String> {
    let file = File::open(&filename).map_err(|x| x.to_string())?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
