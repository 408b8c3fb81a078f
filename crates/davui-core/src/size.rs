//! Parsing of human-readable sizes ("12.3 MiB") back into byte counts.
//!
//! The listing shows sizes already formatted by the server, so sorting by
//! size has to recover the numbers from the cell text.

use std::sync::LazyLock;

use regex::Regex;

/// Returned for text that does not contain a size. Sorts below every real size.
pub const UNPARSEABLE: f64 = -1.0;

/// Value, optional SI/binary prefix, optional `i`, optional `b`.
///
/// ASCII classes only so the pattern builds without the regex Unicode tables.
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)[ \t]?([kmgtpezyKMGTPEZY])?[iI]?[bB]?")
        .expect("size pattern is valid")
});

/// Power of 1024 for a unit prefix.
fn unit_power(prefix: char) -> Option<i32> {
    let power = match prefix.to_ascii_lowercase() {
        'k' => 1,
        'm' => 2,
        'g' => 3,
        't' => 4,
        'p' => 5,
        'e' => 6,
        'z' => 7,
        'y' => 8,
        _ => return None,
    };
    Some(power)
}

/// Parse the first size found in `text` into bytes.
///
/// Prefixes are always binary (`1 KB` and `1 KiB` both mean 1024 bytes).
/// Returns [`UNPARSEABLE`] when no number is present.
pub fn parse_size(text: &str) -> f64 {
    let Some(caps) = SIZE_PATTERN.captures(text) else {
        return UNPARSEABLE;
    };
    let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
        return UNPARSEABLE;
    };

    match caps
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .and_then(unit_power)
    {
        Some(power) => value * 1024f64.powi(power),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes() {
        assert_eq!(parse_size("12"), 12.0);
        assert_eq!(parse_size("0 B"), 0.0);
        assert_eq!(parse_size("512 B"), 512.0);
    }

    #[test]
    fn test_binary_units() {
        assert_eq!(parse_size("1.5 GiB"), 1.5 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(parse_size("12.3 MiB"), 12.3 * 1024.0 * 1024.0);
        assert_eq!(parse_size("2 KiB"), 2048.0);
        assert_eq!(parse_size("1 YiB"), 1024f64.powi(8));
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(parse_size("2k"), 2048.0);
        assert_eq!(parse_size("2K"), 2048.0);
        assert_eq!(parse_size("2kb"), 2048.0);
        assert_eq!(parse_size("2KB"), 2048.0);
        assert_eq!(parse_size("2KIB"), 2048.0);
        assert_eq!(parse_size("3tb"), 3.0 * 1024f64.powi(4));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_size(""), UNPARSEABLE);
        assert_eq!(parse_size("-"), UNPARSEABLE);
        assert_eq!(parse_size("unknown"), UNPARSEABLE);
    }

    #[test]
    fn test_unparseable_sorts_first() {
        let mut sizes = vec![parse_size("1 KiB"), parse_size("-"), parse_size("0 B")];
        sizes.sort_by(f64::total_cmp);
        assert_eq!(sizes, vec![UNPARSEABLE, 0.0, 1024.0]);
    }
}
