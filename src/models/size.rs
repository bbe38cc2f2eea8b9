use thiserror::Error;

use super::catalog::ModelEntry;

/// Units are matched longest first so `B` never swallows `GB`.
const UNITS: [(&str, u64); 4] = [
    ("GB", 1024 * 1024 * 1024),
    ("MB", 1024 * 1024),
    ("KB", 1024),
    ("B", 1),
];

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid size label {label:?}")]
pub struct SizeParseError {
    pub label: String,
}

/// Converts a label such as `6.9GB` or `400 mb` into a byte count.
///
/// A label without a known unit is read as a raw integer byte count.
pub fn parse_size(label: &str) -> Result<u64, SizeParseError> {
    let normalized = label.trim().to_uppercase();
    let invalid = || SizeParseError {
        label: label.to_string(),
    };

    for (unit, multiplier) in UNITS {
        if let Some(number) = normalized.strip_suffix(unit) {
            let value: f64 = number.trim().parse().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid());
            }
            return Ok((value * multiplier as f64) as u64);
        }
    }

    normalized.parse::<u64>().map_err(|_| invalid())
}

pub fn total_size<'a, I>(entries: I) -> Result<u64, SizeParseError>
where
    I: IntoIterator<Item = &'a ModelEntry>,
{
    entries
        .into_iter()
        .try_fold(0u64, |sum, entry| Ok(sum + parse_size(entry.size)?))
}

#[must_use]
pub fn format_gib(bytes: u64) -> String {
    format!("{:.1}GB", bytes as f64 / BYTES_PER_GIB)
}
