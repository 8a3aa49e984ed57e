use clap::{Parser, Subcommand};

/// This is a U.S. House election forecasting program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Runs the forecast with a generic-ballot value given on the command line.
    Forecast(ForecastArgs),
    /// Scrapes the current generic-ballot polling average and then runs the forecast with it.
    Update(UpdateArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ForecastArgs {
    /// (file path) The district table with the partisan lean, incumbent and party columns.
    /// Excel (.xlsx) and CSV flavours are supported, selected from the file extension.
    #[clap(value_parser)]
    pub pvi_file: String,

    /// (file path) The incumbent quality (WAR) table, a CSV file with Geography, Year and
    /// Sortable columns.
    #[clap(value_parser)]
    pub war_file: String,

    /// The national generic-ballot margin in points, Democratic positive. For example 4.5
    /// stands for D+4.5 and -2.1 for R+2.1.
    #[clap(value_parser, allow_hyphen_values = true)]
    pub generic_ballot: f64,

    /// (optional, default 1000) The number of simulated outcomes per race.
    #[clap(value_parser)]
    pub simulations: Option<u32>,

    #[clap(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct UpdateArgs {
    /// (file path) The district table with the partisan lean, incumbent and party columns.
    /// Excel (.xlsx) and CSV flavours are supported, selected from the file extension.
    #[clap(value_parser)]
    pub pvi_file: String,

    /// (file path) The incumbent quality (WAR) table, a CSV file with Geography, Year and
    /// Sortable columns.
    #[clap(value_parser)]
    pub war_file: String,

    /// (optional, default 1000) The number of simulated outcomes per race.
    #[clap(value_parser)]
    pub simulations: Option<u32>,

    /// (optional) The page to scrape the generic-ballot polling average from.
    #[clap(long, value_parser)]
    pub url: Option<String>,

    /// (optional, default 10) The timeout of the scraping request, in seconds.
    #[clap(long, value_parser)]
    pub timeout_secs: Option<u64>,

    /// (optional, default 2) How many times a failed scraping request is retried before
    /// giving up. The previous forecast output is left in place when all attempts fail.
    #[clap(long, value_parser)]
    pub retries: Option<u32>,

    #[clap(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// (file path, default house_2026_forecast.csv) The location the forecast table is
    /// written to, in CSV format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, a summary of the run will be written in JSON
    /// format to the given location.
    #[clap(long, value_parser)]
    pub summary_json: Option<String>,

    /// (file path) A reference file containing the expected forecast table. If provided,
    /// housecast will check that the produced output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (optional, default 2024) The election year the WAR values are read for.
    #[clap(long, value_parser)]
    pub war_year: Option<i32>,

    /// (optional) The standard deviation of the simulation noise, in margin points. The
    /// default is the root mean square error of the fitted model.
    #[clap(long, value_parser)]
    pub noise_sd: Option<f64>,

    /// (optional) The seed of the noise generator. Runs with the same seed and inputs
    /// produce identical outputs. When omitted, a seed is drawn from the system.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
