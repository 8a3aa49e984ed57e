// Writers and readers for the forecast table.

use std::fs;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::{whatever, ResultExt};
use text_diff::print_diff;

use crate::forecast::*;

/// One row of the forecast table, one per district.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub district_id: String,
    pub incumbent_2025: Option<String>,
    pub incumbent_party: Option<String>,
    /// The lean as written in the input, for example `D+5` or `EVEN`.
    pub pvi_string: String,
    pub pvi_numeric: f64,
    pub is_open_seat: bool,
    pub retirement_reason: Option<String>,
    pub war: f64,
    pub generic_ballot: f64,
    /// Point estimate of the Democratic margin, two decimals.
    pub predicted_margin: f64,
    /// `D` or `R`.
    pub predicted_winner: String,
    pub d_win_pct: f64,
    pub r_win_pct: f64,
    pub race_rating: String,
    /// True when the predicted winner differs from the 2025 incumbent party.
    pub potential_flip: bool,
    pub sim_avg_margin: f64,
    pub sim_margin_std: f64,
}

/// Writes the forecast table to `path` in CSV format.
///
/// The table is first written next to the target under a `.tmp` suffix and
/// renamed into place, so a failed run never leaves a truncated table at the
/// target path.
pub fn write_forecast(path: &str, records: &[ForecastRecord]) -> BForecastResult<()> {
    let tmp_path = format!("{}.tmp", path);
    let mut writer = csv::Writer::from_path(&tmp_path).context(OutputCreateSnafu {
        path: &tmp_path,
    })?;
    for record in records {
        writer.serialize(record).context(OutputWriteSnafu {
            path: &tmp_path,
        })?;
    }
    writer.flush().context(OutputPersistSnafu { path: &tmp_path })?;
    drop(writer);
    fs::rename(&tmp_path, path).context(OutputPersistSnafu { path })?;
    info!("write_forecast: {} districts written to {}", records.len(), path);
    Ok(())
}

/// Reads a forecast table back, for reference checks and downstream use.
pub fn read_forecast(path: &str) -> BForecastResult<Vec<ForecastRecord>> {
    let mut reader = csv::Reader::from_path(path).context(CsvLineParseSnafu { path })?;
    let records: Vec<ForecastRecord> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .context(CsvLineParseSnafu { path })?;
    Ok(records)
}

/// Writes the JSON run summary.
pub fn write_summary_json(path: &str, summary: &JSValue) -> BForecastResult<()> {
    let pretty = serde_json::to_string_pretty(summary).context(SerializingJsonSnafu {})?;
    fs::write(path, pretty).context(OutputPersistSnafu { path })?;
    info!("write_summary_json: summary written to {}", path);
    Ok(())
}

/// Compares the produced table against a reference copy, byte for byte.
pub fn check_reference(reference_path: &str, produced_path: &str) -> ForecastResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
        path: reference_path,
    })?;
    let produced = fs::read_to_string(produced_path).context(OpeningReferenceSnafu {
        path: produced_path,
    })?;
    if reference != produced {
        warn!("check_reference: differences detected with the reference file");
        print_diff(reference.as_str(), produced.as_str(), "\n");
        whatever!(
            "Difference detected between the produced forecast {} and the reference {}",
            produced_path,
            reference_path
        );
    }
    info!("check_reference: {} matches the reference", produced_path);
    Ok(())
}
