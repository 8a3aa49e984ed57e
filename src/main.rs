use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod forecast;

use crate::args::{Args, Command, CommonArgs};
use crate::forecast::scrape::ScrapeSettings;
use crate::forecast::{RunSettings, DEFAULT_OUTPUT, DEFAULT_WAR_YEAR};
use race_forecasting::SimulationSettings;

fn run_settings(
    common: &CommonArgs,
    pvi_file: &str,
    war_file: &str,
    simulations: Option<u32>,
) -> RunSettings {
    let defaults = SimulationSettings::DEFAULT_SETTINGS;
    RunSettings {
        pvi_path: pvi_file.to_string(),
        war_path: war_file.to_string(),
        war_year: common.war_year.unwrap_or(DEFAULT_WAR_YEAR),
        simulations: simulations.unwrap_or(defaults.simulations),
        noise_sd: common.noise_sd.unwrap_or(defaults.noise_sd),
        seed: common.seed,
        out_path: common
            .out
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
        summary_json_path: common.summary_json.clone(),
        reference_path: common.reference.clone(),
    }
}

fn main() {
    let args = Args::parse();
    let verbose = match &args.command {
        Command::Forecast(a) => a.common.verbose,
        Command::Update(a) => a.common.verbose,
    };
    // An explicit RUST_LOG still takes precedence over --verbose.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", if verbose { "debug" } else { "info" });
    }
    env_logger::init();

    let res = match &args.command {
        Command::Forecast(a) => {
            let settings = run_settings(&a.common, &a.pvi_file, &a.war_file, a.simulations);
            forecast::run_forecast(&settings, a.generic_ballot)
        }
        Command::Update(a) => {
            let settings = run_settings(&a.common, &a.pvi_file, &a.war_file, a.simulations);
            let defaults = ScrapeSettings::default();
            let scrape_settings = ScrapeSettings {
                url: a.url.clone().unwrap_or(defaults.url),
                timeout_secs: a.timeout_secs.unwrap_or(defaults.timeout_secs),
                retries: a.retries.unwrap_or(defaults.retries),
            };
            forecast::run_update(&settings, &scrape_settings)
        }
    };
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        } else {
            eprintln!("No trace found");
        }
        std::process::exit(1);
    }
}
