use log::{debug, info};

use race_forecasting::*;
use snafu::{prelude::*, Snafu};

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::forecast::io_common::round2;
use crate::forecast::io_out::ForecastRecord;
use crate::forecast::io_pvi::DistrictRow;

pub mod io_common;
pub mod io_out;
pub mod io_pvi;
pub mod io_war;
pub mod report;
pub mod retirements;
pub mod scrape;

/// Default location of the forecast table.
pub const DEFAULT_OUTPUT: &str = "house_2026_forecast.csv";

/// Default election year of the WAR values.
pub const DEFAULT_WAR_YEAR: i32 = 2024;

#[derive(Debug, Snafu)]
pub enum ForecastError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell type at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV data from {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: u64 },
    #[snafu(display("Column {column} is missing in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("District {district} (line {lineno}) has no partisan lean value"))]
    MissingPvi { district: String, lineno: u64 },
    #[snafu(display(
        "Cannot parse the partisan lean {value:?} of district {district} (line {lineno})"
    ))]
    BadPvi {
        value: String,
        district: String,
        lineno: u64,
    },
    #[snafu(display("Cannot parse the WAR value {value:?} of {district} (line {lineno})"))]
    BadWar {
        value: String,
        district: String,
        lineno: u64,
    },
    #[snafu(display("Cannot parse the year {value:?} at line {lineno}"))]
    BadYear { value: String, lineno: u64 },
    #[snafu(display(
        "District {district} is contested but has no WAR value for {year}. \
         Only open seats may miss one"
    ))]
    MissingWar { district: String, year: i32 },
    #[snafu(display("Model error: {source}"))]
    Model { source: ModelErrors },
    #[snafu(display("Error creating the output file {path}"))]
    OutputCreate { source: csv::Error, path: String },
    #[snafu(display("Error writing the output file {path}"))]
    OutputWrite { source: csv::Error, path: String },
    #[snafu(display("Error persisting the output file {path}"))]
    OutputPersist {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the run summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening the reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error building the HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("The request to {url} failed"))]
    HttpRequest { source: reqwest::Error, url: String },
    #[snafu(display("The request to {url} returned status {status}"))]
    HttpStatus { url: String, status: u16 },
    #[snafu(display("Error reading the response body from {url}"))]
    HttpBody { source: reqwest::Error, url: String },
    #[snafu(display("Invalid extraction pattern"))]
    BadPattern { source: regex::Error },
    #[snafu(display(
        "Could not locate a generic-ballot average in the page. \
         The page layout may have changed"
    ))]
    UnrecognisedPage {},
    #[snafu(display("The extracted generic-ballot value {value} is outside the plausible range"))]
    ImplausibleValue { value: f64 },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
pub type BForecastResult<T> = Result<T, Box<ForecastError>>;

/// Everything one forecast run needs besides the generic ballot.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub pvi_path: String,
    pub war_path: String,
    pub war_year: i32,
    pub simulations: u32,
    pub noise_sd: f64,
    pub seed: Option<u64>,
    pub out_path: String,
    pub summary_json_path: Option<String>,
    pub reference_path: Option<String>,
}

/// Runs the full forecast: reads the inputs, forecasts every district,
/// simulates the chamber, writes the table and prints the summary.
pub fn run_forecast(settings: &RunSettings, generic_ballot: f64) -> BForecastResult<()> {
    info!("run_forecast: settings: {:?}", settings);
    let districts = io_pvi::read_districts(&settings.pvi_path)?;
    let war_table = io_war::read_war_table(&settings.war_path, settings.war_year)?;

    let simulation_settings = SimulationSettings {
        simulations: settings.simulations,
        noise_sd: settings.noise_sd,
    };
    let mut forecaster = Forecaster::new(
        ModelCoefficients::FITTED_2020_2024,
        simulation_settings,
        settings.seed,
    )
    .context(ModelSnafu {})?;

    let records = forecast_districts(
        &districts,
        &war_table,
        generic_ballot,
        settings.war_year,
        &mut forecaster,
    )?;

    let margins: Vec<f64> = records.iter().map(|r| r.predicted_margin).collect();
    let house = forecaster.simulate_house(&margins).context(ModelSnafu {})?;

    io_out::write_forecast(&settings.out_path, &records)?;

    report::print_summary(
        &records,
        generic_ballot,
        &house,
        forecaster.coefficients(),
        &ModelDiagnostics::FITTED_2020_2024,
    );

    if let Some(summary_path) = &settings.summary_json_path {
        let summary = build_summary_js(&records, generic_ballot, &house);
        io_out::write_summary_json(summary_path, &summary)?;
    }

    // The reference check comes last so that a mismatch still leaves the
    // freshly produced table on disk for inspection.
    if let Some(reference_path) = &settings.reference_path {
        io_out::check_reference(reference_path, &settings.out_path)?;
    }
    Ok(())
}

/// Scrapes the current generic-ballot average and runs the forecast with it.
///
/// The fetch happens before anything is written: when it fails, the previous
/// forecast table is left in place untouched.
pub fn run_update(
    settings: &RunSettings,
    scrape_settings: &scrape::ScrapeSettings,
) -> BForecastResult<()> {
    let generic_ballot = scrape::fetch_generic_ballot(scrape_settings)?;
    run_forecast(settings, generic_ballot)
}

/// Forecasts every district and assembles the output rows, sorted from the
/// most competitive race to the least.
fn forecast_districts(
    districts: &[DistrictRow],
    war_table: &HashMap<String, f64>,
    generic_ballot: f64,
    war_year: i32,
    forecaster: &mut Forecaster,
) -> BForecastResult<Vec<ForecastRecord>> {
    info!(
        "forecast_districts: {} districts, {} simulations per race",
        districts.len(),
        forecaster.settings().simulations
    );
    let mut records: Vec<ForecastRecord> = Vec::with_capacity(districts.len());
    for row in districts {
        let open_seat = retirements::retirement(&row.district);
        let war = match &open_seat {
            Some(_) => {
                // Open seats run at the replacement level whatever the
                // departing incumbent scored.
                if let Some(filed) = war_table.get(&row.district) {
                    debug!(
                        "forecast_districts: {} is open, ignoring its WAR value {}",
                        row.district, filed
                    );
                }
                0.0
            }
            None => *war_table
                .get(&row.district)
                .context(MissingWarSnafu {
                    district: &row.district,
                    year: war_year,
                })?,
        };

        let forecast = forecaster
            .forecast_race(row.pvi, war, generic_ballot)
            .context(ModelSnafu {})?;
        let winner = forecast.predicted_winner.letter();
        let potential_flip = match &row.party {
            Some(party) => party != winner,
            None => false,
        };
        debug!(
            "forecast_districts: {}: margin {:.2}, D win {}%, {}",
            row.district, forecast.predicted_margin, forecast.simulation.d_win_pct, forecast.rating
        );

        records.push(ForecastRecord {
            district_id: row.district.clone(),
            incumbent_2025: row.incumbent.clone(),
            incumbent_party: row.party.clone(),
            pvi_string: row.pvi_raw.clone(),
            pvi_numeric: row.pvi,
            is_open_seat: open_seat.is_some(),
            retirement_reason: open_seat.map(|r| r.reason.to_string()),
            war,
            generic_ballot,
            predicted_margin: round2(forecast.predicted_margin),
            predicted_winner: winner.to_string(),
            d_win_pct: forecast.simulation.d_win_pct,
            r_win_pct: forecast.simulation.r_win_pct,
            race_rating: forecast.rating.to_string(),
            potential_flip,
            sim_avg_margin: forecast.simulation.avg_margin,
            sim_margin_std: forecast.simulation.margin_std,
        });
    }
    records.sort_by(|a, b| {
        a.predicted_margin
            .abs()
            .partial_cmp(&b.predicted_margin.abs())
            .unwrap_or(Ordering::Equal)
    });
    Ok(records)
}

/// Assembles the JSON run summary.
fn build_summary_js(
    records: &[ForecastRecord],
    generic_ballot: f64,
    house: &HouseSimulation,
) -> JSValue {
    let coefficients = ModelCoefficients::FITTED_2020_2024;
    let diagnostics = ModelDiagnostics::FITTED_2020_2024;
    let d_seats = records.iter().filter(|r| r.predicted_winner == "D").count();

    let mut ratings: JSMap<String, JSValue> = JSMap::new();
    for rating in Rating::ALL {
        let label = rating.to_string();
        let count = records.iter().filter(|r| r.race_rating == label).count();
        if count > 0 {
            ratings.insert(label, json!(count));
        }
    }

    let mut percentiles: JSMap<String, JSValue> = JSMap::new();
    for (pct, seats) in &house.d_percentiles {
        percentiles.insert(format!("p{}", pct), json!(seats));
    }

    json!({
        "generic_ballot": generic_ballot,
        "model": {
            "intercept": coefficients.intercept,
            "pvi": coefficients.pvi,
            "war": coefficients.war,
            "generic_ballot": coefficients.generic_ballot,
            "r_squared": diagnostics.r_squared,
            "rmse": diagnostics.rmse,
            "observations": diagnostics.observations,
            "years": diagnostics.years,
        },
        "point_estimate": {
            "d_seats": d_seats,
            "r_seats": records.len() - d_seats,
        },
        "house_simulation": {
            "simulations": house.simulations,
            "districts": house.districts,
            "majority": house.majority,
            "d_mean": house.d_mean,
            "d_median": house.d_median,
            "d_std": house.d_std,
            "d_min": house.d_min,
            "d_max": house.d_max,
            "d_majority_pct": house.d_majority_pct,
            "d_percentiles": percentiles,
        },
        "ratings": ratings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(name)
            .to_str()
            .unwrap()
            .to_string()
    }

    fn write_temp(name: &str, contents: &str) -> String {
        let path = temp_path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn district_row(district: &str, party: &str, pvi_raw: &str, pvi: f64) -> DistrictRow {
        DistrictRow {
            district: district.to_string(),
            incumbent: Some("Somebody".to_string()),
            party: Some(party.to_string()),
            pvi_raw: pvi_raw.to_string(),
            pvi,
        }
    }

    fn forecaster(seed: u64) -> Forecaster {
        Forecaster::new(
            ModelCoefficients::FITTED_2020_2024,
            SimulationSettings::DEFAULT_SETTINGS,
            Some(seed),
        )
        .unwrap()
    }

    #[test]
    fn open_seats_are_forecast_at_replacement_level() {
        init();
        // CA-11 is open in 2026. Its filed WAR value must be ignored.
        let rows = vec![district_row("CA-11", "D", "D+40", 40.0)];
        let war_table: HashMap<String, f64> = [("CA-11".to_string(), 3.5)].into_iter().collect();
        let records =
            forecast_districts(&rows, &war_table, 4.5, 2024, &mut forecaster(1)).unwrap();
        assert_eq!(records[0].war, 0.0);
        assert!(records[0].is_open_seat);
        assert_eq!(records[0].retirement_reason.as_deref(), Some("Retiring"));
        // -0.2425 + 1.0320 * 40 + 0.1876 * 4.5
        assert_eq!(records[0].predicted_margin, 41.88);
        assert_eq!(records[0].predicted_winner, "D");
        assert!(!records[0].potential_flip);
    }

    #[test]
    fn contested_districts_without_a_war_value_fail() {
        let rows = vec![district_row("MT-02", "R", "R+15", -15.0)];
        let war_table: HashMap<String, f64> = HashMap::new();
        let err = forecast_districts(&rows, &war_table, 4.5, 2024, &mut forecaster(1)).unwrap_err();
        match *err {
            ForecastError::MissingWar { ref district, year } => {
                assert_eq!(district, "MT-02");
                assert_eq!(year, 2024);
            }
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn records_are_sorted_by_competitiveness() {
        let rows = vec![
            district_row("CA-11", "D", "D+40", 40.0),
            district_row("MT-02", "R", "R+15", -15.0),
            district_row("NE-02", "R", "EVEN", 0.0),
        ];
        let war_table: HashMap<String, f64> = [("MT-02".to_string(), 1.2)].into_iter().collect();
        let records =
            forecast_districts(&rows, &war_table, 4.5, 2024, &mut forecaster(42)).unwrap();
        let districts: Vec<&str> = records.iter().map(|r| r.district_id.as_str()).collect();
        assert_eq!(districts, vec!["NE-02", "MT-02", "CA-11"]);
        let margins: Vec<f64> = records.iter().map(|r| r.predicted_margin).collect();
        assert_eq!(margins, vec![0.6, -15.49, 41.88]);
    }

    #[test]
    fn a_favored_challenger_marks_a_potential_flip() {
        // NE-02 is an even, open seat held by a Republican. In a D+4.5
        // national environment the model tips it Democratic.
        let rows = vec![district_row("NE-02", "R", "EVEN", 0.0)];
        let war_table: HashMap<String, f64> = HashMap::new();
        let records =
            forecast_districts(&rows, &war_table, 4.5, 2024, &mut forecaster(7)).unwrap();
        assert_eq!(records[0].predicted_margin, 0.6);
        assert_eq!(records[0].predicted_winner, "D");
        assert!(records[0].potential_flip);
        assert_eq!(records[0].race_rating, "Tilt D");
    }

    #[test]
    fn the_full_run_writes_a_readable_table() {
        init();
        let pvi_path = write_temp(
            "housecast_run_districts.csv",
            "Dist,2025 Incumbent,Party,2025 PVI\n\
             MT-02,Troy Downing,R,R+15\n\
             CA-11,Nancy Pelosi,D,D+40\n\
             NE-02,Don Bacon,R,EVEN\n",
        );
        let war_path = write_temp(
            "housecast_run_war.csv",
            "Geography,Year,Sortable\n\
             MT-02,2024,1.2\n\
             MT-02,2022,9.9\n\
             CA-11,2024,2.0\n",
        );
        let out_path = temp_path("housecast_run_out.csv");
        let summary_path = temp_path("housecast_run_summary.json");
        let settings = RunSettings {
            pvi_path,
            war_path,
            war_year: 2024,
            simulations: 1000,
            noise_sd: MODEL_RMSE,
            seed: Some(42),
            out_path: out_path.clone(),
            summary_json_path: Some(summary_path.clone()),
            reference_path: None,
        };
        run_forecast(&settings, 4.5).unwrap();

        let records = io_out::read_forecast(&out_path).unwrap();
        assert_eq!(records.len(), 3);
        // most competitive first
        assert_eq!(records[0].district_id, "NE-02");
        assert_eq!(records[0].generic_ballot, 4.5);
        assert!(records[0].is_open_seat);
        assert_eq!(records[0].war, 0.0);
        assert_eq!(records[0].race_rating, "Tilt D");
        assert!(records[0].potential_flip);

        let mt = records.iter().find(|r| r.district_id == "MT-02").unwrap();
        assert_eq!(mt.war, 1.2);
        assert_eq!(mt.predicted_margin, -15.49);
        assert_eq!(mt.predicted_winner, "R");
        assert!(mt.r_win_pct > 98.0);
        assert!(!mt.potential_flip);

        let ca = records.iter().find(|r| r.district_id == "CA-11").unwrap();
        assert_eq!(ca.race_rating, "Safe D");
        assert_eq!(ca.d_win_pct, 100.0);

        let summary: JSValue =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(summary["generic_ballot"], json!(4.5));
        assert_eq!(summary["point_estimate"]["d_seats"], json!(2));
        assert_eq!(summary["house_simulation"]["districts"], json!(3));
        assert_eq!(summary["model"]["observations"], json!(1157));
    }

    #[test]
    fn runs_with_the_same_seed_are_identical() {
        let pvi_path = write_temp(
            "housecast_seed_districts.csv",
            "Dist,2025 Incumbent,Party,2025 PVI\n\
             NE-02,Don Bacon,R,EVEN\n\
             MT-02,Troy Downing,R,R+15\n",
        );
        let war_path = write_temp(
            "housecast_seed_war.csv",
            "Geography,Year,Sortable\nMT-02,2024,1.2\n",
        );
        let out_a = temp_path("housecast_seed_out_a.csv");
        let out_b = temp_path("housecast_seed_out_b.csv");
        let mut settings = RunSettings {
            pvi_path,
            war_path,
            war_year: 2024,
            simulations: 500,
            noise_sd: MODEL_RMSE,
            seed: Some(7),
            out_path: out_a.clone(),
            summary_json_path: None,
            reference_path: None,
        };
        run_forecast(&settings, 4.5).unwrap();
        settings.out_path = out_b.clone();
        run_forecast(&settings, 4.5).unwrap();

        let a = std::fs::read_to_string(&out_a).unwrap();
        let b = std::fs::read_to_string(&out_b).unwrap();
        assert_eq!(a, b);

        // and the reference check accepts its own output
        settings.reference_path = Some(out_a);
        settings.out_path = temp_path("housecast_seed_out_c.csv");
        run_forecast(&settings, 4.5).unwrap();
    }

    #[test]
    fn a_failed_scrape_leaves_the_previous_table_untouched() {
        let pvi_path = write_temp(
            "housecast_update_districts.csv",
            "Dist,2025 Incumbent,Party,2025 PVI\nMT-02,Troy Downing,R,R+15\n",
        );
        let war_path = write_temp(
            "housecast_update_war.csv",
            "Geography,Year,Sortable\nMT-02,2024,1.2\n",
        );
        let out_path = write_temp("housecast_update_out.csv", "previous good table\n");
        let settings = RunSettings {
            pvi_path,
            war_path,
            war_year: 2024,
            simulations: 100,
            noise_sd: MODEL_RMSE,
            seed: Some(1),
            out_path: out_path.clone(),
            summary_json_path: None,
            reference_path: None,
        };
        // port 9 (discard) is closed; the request cannot succeed
        let scrape_settings = scrape::ScrapeSettings {
            url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 1,
            retries: 0,
        };
        let res = run_update(&settings, &scrape_settings);
        assert!(res.is_err());
        assert_eq!(
            std::fs::read_to_string(&out_path).unwrap(),
            "previous good table\n"
        );
    }

    #[test]
    fn mismatching_references_fail_the_run() {
        let pvi_path = write_temp(
            "housecast_ref_districts.csv",
            "Dist,2025 Incumbent,Party,2025 PVI\nMT-02,Troy Downing,R,R+15\n",
        );
        let war_path = write_temp(
            "housecast_ref_war.csv",
            "Geography,Year,Sortable\nMT-02,2024,1.2\n",
        );
        let reference_path = write_temp("housecast_ref_expected.csv", "something else entirely\n");
        let settings = RunSettings {
            pvi_path,
            war_path,
            war_year: 2024,
            simulations: 100,
            noise_sd: MODEL_RMSE,
            seed: Some(1),
            out_path: temp_path("housecast_ref_out.csv"),
            summary_json_path: None,
            reference_path: Some(reference_path),
        };
        let err = run_forecast(&settings, 4.5).unwrap_err();
        assert!(matches!(*err, ForecastError::Whatever { .. }));
    }
}
