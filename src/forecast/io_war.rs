// Reader for the incumbent quality (WAR) table.

use std::collections::HashMap;

use log::{info, warn};
use snafu::{OptionExt, ResultExt};

use crate::forecast::io_common::trim_bom;
use crate::forecast::*;

/// Reads the WAR values of one election year, keyed by district.
///
/// The table is a long CSV with one row per district and year. Rows of other
/// years are skipped. When a district appears twice for the same year the
/// last row wins.
pub fn read_war_table(path: &str, year: i32) -> BForecastResult<HashMap<String, f64>> {
    let contents = std::fs::read_to_string(path).context(OpeningCsvSnafu { path })?;
    let mut reader = csv::Reader::from_reader(trim_bom(&contents).as_bytes());
    let header = reader.headers().context(CsvLineParseSnafu { path })?.clone();
    let geography_idx = header
        .iter()
        .position(|h| h.trim() == "Geography")
        .context(MissingColumnSnafu {
            column: "Geography",
            path,
        })?;
    let year_idx = header
        .iter()
        .position(|h| h.trim() == "Year")
        .context(MissingColumnSnafu {
            column: "Year",
            path,
        })?;
    let war_idx = header
        .iter()
        .position(|h| h.trim() == "Sortable")
        .context(MissingColumnSnafu {
            column: "Sortable",
            path,
        })?;

    let mut res: HashMap<String, f64> = HashMap::new();
    for (idx, line_r) in reader.records().enumerate() {
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        let district = line
            .get(geography_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim();
        if district.is_empty() {
            continue;
        }
        let year_raw = line
            .get(year_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim();
        let row_year: f64 = year_raw.parse().ok().context(BadYearSnafu {
            value: year_raw,
            lineno,
        })?;
        if row_year != year as f64 {
            continue;
        }
        let war_raw = line
            .get(war_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim();
        let war: f64 = war_raw.parse().ok().context(BadWarSnafu {
            value: war_raw,
            district,
            lineno,
        })?;
        if res.insert(district.to_string(), war).is_some() {
            warn!(
                "read_war_table: duplicate WAR row for {} in {} (line {}), keeping the last value",
                district, year, lineno
            );
        }
    }
    info!(
        "read_war_table: {} WAR values read for {} from {}",
        res.len(),
        year,
        path
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn reads_the_requested_year() {
        let path = temp_file(
            "housecast_war_ok.csv",
            "\u{feff}Geography,Year,Sortable\n\
             MT-02,2024,1.2\n\
             MT-02,2022,9.9\n\
             CA-11,2024,-0.4\n\
             NE-02,2020,3.3\n",
        );
        let table = read_war_table(&path, 2024).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["MT-02"], 1.2);
        assert_eq!(table["CA-11"], -0.4);
        assert!(!table.contains_key("NE-02"));
    }

    #[test]
    fn last_duplicate_row_wins() {
        let path = temp_file(
            "housecast_war_dups.csv",
            "Geography,Year,Sortable\n\
             MT-02,2024,1.2\n\
             MT-02,2024,2.5\n",
        );
        let table = read_war_table(&path, 2024).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["MT-02"], 2.5);
    }

    #[test]
    fn rejects_a_malformed_war_value() {
        let path = temp_file(
            "housecast_war_bad.csv",
            "Geography,Year,Sortable\nMT-02,2024,n/a\n",
        );
        let err = read_war_table(&path, 2024).unwrap_err();
        match *err {
            ForecastError::BadWar {
                ref value,
                ref district,
                lineno,
            } => {
                assert_eq!(value, "n/a");
                assert_eq!(district, "MT-02");
                assert_eq!(lineno, 2);
            }
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_a_malformed_year() {
        let path = temp_file(
            "housecast_war_bad_year.csv",
            "Geography,Year,Sortable\nMT-02,latest,1.0\n",
        );
        let err = read_war_table(&path, 2024).unwrap_err();
        assert!(matches!(*err, ForecastError::BadYear { .. }));
    }

    #[test]
    fn rejects_missing_columns() {
        let path = temp_file(
            "housecast_war_no_col.csv",
            "Geography,Season,Sortable\nMT-02,2024,1.0\n",
        );
        let err = read_war_table(&path, 2024).unwrap_err();
        match *err {
            ForecastError::MissingColumn { ref column, .. } => assert_eq!(column, "Year"),
            ref other => panic!("unexpected error {:?}", other),
        }
    }
}
