use std::error::Error;
use std::fmt::Display;

// ********* Model parameters ***********

/// Coefficients of the linear margin model.
///
/// The predicted margin is expressed in percentage points of the two-party
/// vote, with positive values favoring the Democratic candidate:
///
/// `margin = intercept + pvi * PVI + war * WAR + generic_ballot * GB`
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ModelCoefficients {
    pub intercept: f64,
    /// Weight of the district partisan lean (Democratic points positive).
    pub pvi: f64,
    /// Weight of the incumbent quality score. Note that the fitted value is
    /// negative.
    pub war: f64,
    /// Weight of the national generic-ballot margin (Democratic points positive).
    pub generic_ballot: f64,
}

impl ModelCoefficients {
    /// Coefficients fitted by least squares on the 2020-2024 House results.
    pub const FITTED_2020_2024: ModelCoefficients = ModelCoefficients {
        intercept: -0.2425,
        pvi: 1.0320,
        war: -0.5130,
        generic_ballot: 0.1876,
    };
}

/// Root mean square error of the fitted model, in margin points.
///
/// This is the dispersion of the noise added to the point estimate during
/// simulation: one draw answers "given the fundamentals, how far off could
/// the result plausibly land".
pub const MODEL_RMSE: f64 = 5.3522;

/// Fit statistics of the regression, reported alongside the forecast.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ModelDiagnostics {
    pub r_squared: f64,
    pub rmse: f64,
    pub observations: u32,
    pub years: &'static str,
}

impl ModelDiagnostics {
    pub const FITTED_2020_2024: ModelDiagnostics = ModelDiagnostics {
        r_squared: 0.892,
        rmse: MODEL_RMSE,
        observations: 1157,
        years: "2020-2024",
    };
}

// ********* Simulation settings ***********

/// Settings of the Monte Carlo stage.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct SimulationSettings {
    /// Number of simulated outcomes per race. An odd count is rounded up to
    /// the next even one so that noise can be drawn in (+z, -z) pairs.
    pub simulations: u32,
    /// Standard deviation of the Gaussian noise added to the point estimate,
    /// in margin points. Must be finite and strictly positive.
    pub noise_sd: f64,
}

impl SimulationSettings {
    pub const DEFAULT_SETTINGS: SimulationSettings = SimulationSettings {
        simulations: 1000,
        noise_sd: MODEL_RMSE,
    };

    pub fn checked(&self) -> Result<(), ModelErrors> {
        if self.simulations == 0 {
            return Err(ModelErrors::InvalidSimulationCount);
        }
        if !self.noise_sd.is_finite() || self.noise_sd <= 0.0 {
            return Err(ModelErrors::InvalidNoiseStdDev);
        }
        Ok(())
    }
}

// ********* Race outcomes ***********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Party {
    Democratic,
    Republican,
}

impl Party {
    pub fn letter(&self) -> &'static str {
        match self {
            Party::Democratic => "D",
            Party::Republican => "R",
        }
    }
}

impl Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Categorical rating of a race, derived from the win probability of the
/// favored party.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Rating {
    /// Favorite at 99% or better.
    Safe(Party),
    /// Favorite in [90%, 99%).
    Likely(Party),
    /// Favorite in [75%, 90%).
    Lean(Party),
    /// Favorite below 75%.
    Tilt(Party),
    /// Democratic win probability of exactly 50%.
    TossUp,
}

impl Rating {
    /// Every rating, ordered from most Democratic to most Republican. This is
    /// the presentation order of rating tallies.
    pub const ALL: [Rating; 9] = [
        Rating::Safe(Party::Democratic),
        Rating::Likely(Party::Democratic),
        Rating::Lean(Party::Democratic),
        Rating::Tilt(Party::Democratic),
        Rating::TossUp,
        Rating::Tilt(Party::Republican),
        Rating::Lean(Party::Republican),
        Rating::Likely(Party::Republican),
        Rating::Safe(Party::Republican),
    ];
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Safe(p) => write!(f, "Safe {}", p),
            Rating::Likely(p) => write!(f, "Likely {}", p),
            Rating::Lean(p) => write!(f, "Lean {}", p),
            Rating::Tilt(p) => write!(f, "Tilt {}", p),
            Rating::TossUp => write!(f, "Toss-up"),
        }
    }
}

/// Outcome distribution of the simulated runs of a single race.
#[derive(PartialEq, Debug, Clone)]
pub struct RaceSimulation {
    pub d_wins: u32,
    pub r_wins: u32,
    /// Democratic win probability in percent, rounded to one decimal.
    pub d_win_pct: f64,
    /// Republican win probability in percent, rounded to one decimal.
    pub r_win_pct: f64,
    /// Mean simulated margin, rounded to two decimals.
    pub avg_margin: f64,
    /// Population standard deviation of the simulated margins, rounded to
    /// two decimals.
    pub margin_std: f64,
}

/// Point estimate, simulation and rating of a single race.
#[derive(PartialEq, Debug, Clone)]
pub struct RaceForecast {
    /// Predicted Democratic margin, unrounded.
    pub predicted_margin: f64,
    pub predicted_winner: Party,
    pub rating: Rating,
    pub simulation: RaceSimulation,
}

/// Seat count distribution across full-chamber simulations.
#[derive(PartialEq, Debug, Clone)]
pub struct HouseSimulation {
    pub simulations: u32,
    pub districts: u32,
    /// Seats needed for a majority.
    pub majority: u32,
    pub d_mean: f64,
    pub d_median: f64,
    pub d_std: f64,
    pub d_min: u32,
    pub d_max: u32,
    /// Probability in percent that the Democratic seat count reaches the
    /// majority threshold.
    pub d_majority_pct: f64,
    /// Democratic seat counts at selected percentiles, as (percentile, seats)
    /// pairs in increasing percentile order.
    pub d_percentiles: Vec<(u32, f64)>,
}

// ********* Errors ***********

/// Errors raised by the model and simulation functions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ModelErrors {
    InvalidSimulationCount,
    InvalidNoiseStdDev,
    EmptyHouse,
}

impl Error for ModelErrors {}

impl Display for ModelErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelErrors::InvalidSimulationCount => {
                write!(f, "the simulation count must be greater than zero")
            }
            ModelErrors::InvalidNoiseStdDev => {
                write!(f, "the noise standard deviation must be finite and positive")
            }
            ModelErrors::EmptyHouse => {
                write!(f, "there are no districts to simulate")
            }
        }
    }
}
