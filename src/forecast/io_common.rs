// Shared helpers for the input readers.

use std::path::Path;

/// Strips a leading UTF-8 byte order mark. Spreadsheet exports routinely
/// carry one in front of the header row.
pub fn trim_bom(contents: &str) -> &str {
    contents.strip_prefix('\u{feff}').unwrap_or(contents)
}

/// Case-insensitive check of a file extension.
pub fn has_extension(path: &str, extension: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Rounds to two decimals, the precision of the margins in the output table.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_bom() {
        assert_eq!(trim_bom("\u{feff}Geography,Year"), "Geography,Year");
        assert_eq!(trim_bom("Geography,Year"), "Geography,Year");
        assert_eq!(trim_bom(""), "");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("data/District2025PVIs.xlsx", "xlsx"));
        assert!(has_extension("DISTRICTS.XLSX", "xlsx"));
        assert!(!has_extension("districts.csv", "xlsx"));
        assert!(!has_extension("districts", "xlsx"));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(-15.4939), -15.49);
        assert_eq!(round2(5.7617), 5.76);
        assert_eq!(round2(0.678), 0.68);
        assert_eq!(round2(3.0), 3.0);
    }
}
