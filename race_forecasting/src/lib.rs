mod config;
use log::{debug, info};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

pub use crate::config::*;

pub mod manual;

/// Point estimate of the Democratic margin for one district, in percentage
/// points. Positive values favor the Democratic candidate.
pub fn predict_margin(
    coefficients: &ModelCoefficients,
    pvi: f64,
    war: f64,
    generic_ballot: f64,
) -> f64 {
    coefficients.intercept
        + coefficients.pvi * pvi
        + coefficients.war * war
        + coefficients.generic_ballot * generic_ballot
}

/// The winner implied by a point estimate. Democratic on a strictly positive
/// margin, Republican otherwise.
pub fn predicted_winner(predicted_margin: f64) -> Party {
    if predicted_margin > 0.0 {
        Party::Democratic
    } else {
        Party::Republican
    }
}

/// Simulates one race by adding Gaussian noise to the point estimate.
///
/// Noise is drawn in antithetic (+z, -z) pairs. Paired draws keep the sample
/// of margins centered on the point estimate, so a race with a margin of
/// exactly zero always comes out at a 50.0% win probability.
pub fn simulate_race(
    predicted_margin: f64,
    settings: &SimulationSettings,
    rng: &mut StdRng,
) -> Result<RaceSimulation, ModelErrors> {
    settings.checked()?;
    let noise =
        Normal::new(0.0, settings.noise_sd).map_err(|_| ModelErrors::InvalidNoiseStdDev)?;
    let pairs = (settings.simulations + 1) / 2;
    let count = (pairs * 2) as usize;

    let mut margins: Vec<f64> = Vec::with_capacity(count);
    for _ in 0..pairs {
        let z: f64 = noise.sample(rng);
        margins.push(predicted_margin + z);
        margins.push(predicted_margin - z);
    }

    let d_wins = margins.iter().filter(|m| **m > 0.0).count() as u32;
    let r_wins = count as u32 - d_wins;
    let d_pct = d_wins as f64 / count as f64 * 100.0;

    let avg = margins.iter().sum::<f64>() / count as f64;
    let var = margins.iter().map(|m| (m - avg) * (m - avg)).sum::<f64>() / count as f64;

    Ok(RaceSimulation {
        d_wins,
        r_wins,
        d_win_pct: round1(d_pct),
        r_win_pct: round1(100.0 - d_pct),
        avg_margin: round2(avg),
        margin_std: round2(var.sqrt()),
    })
}

/// Buckets a race from the Democratic win probability, in percent.
///
/// The comparisons are exact, with no rounding tolerance: a race at 98.9
/// is Likely, one at 99.0 is Safe, and only exactly 50.0 is a toss-up.
/// The thresholds are symmetric between the two parties.
pub fn rate_race(d_win_pct: f64) -> Rating {
    if d_win_pct == 50.0 {
        return Rating::TossUp;
    }
    let (party, favorite_pct) = if d_win_pct > 50.0 {
        (Party::Democratic, d_win_pct)
    } else {
        (Party::Republican, 100.0 - d_win_pct)
    };
    if favorite_pct >= 99.0 {
        Rating::Safe(party)
    } else if favorite_pct >= 90.0 {
        Rating::Likely(party)
    } else if favorite_pct >= 75.0 {
        Rating::Lean(party)
    } else {
        Rating::Tilt(party)
    }
}

/// Simulates the whole chamber: each run redraws independent noise for every
/// district and counts the Democratic seats.
pub fn simulate_house(
    predicted_margins: &[f64],
    settings: &SimulationSettings,
    rng: &mut StdRng,
) -> Result<HouseSimulation, ModelErrors> {
    settings.checked()?;
    if predicted_margins.is_empty() {
        return Err(ModelErrors::EmptyHouse);
    }
    let districts = predicted_margins.len() as u32;
    let majority = districts / 2 + 1;
    info!(
        "simulate_house: {} simulations over {} districts (majority at {})",
        settings.simulations, districts, majority
    );
    let noise =
        Normal::new(0.0, settings.noise_sd).map_err(|_| ModelErrors::InvalidNoiseStdDev)?;

    let mut d_seat_counts: Vec<u32> = Vec::with_capacity(settings.simulations as usize);
    for _ in 0..settings.simulations {
        let mut d_seats = 0u32;
        for margin in predicted_margins {
            if margin + noise.sample(rng) > 0.0 {
                d_seats += 1;
            }
        }
        d_seat_counts.push(d_seats);
    }

    let n = d_seat_counts.len() as f64;
    let d_mean = d_seat_counts.iter().map(|c| *c as f64).sum::<f64>() / n;
    let d_var = d_seat_counts
        .iter()
        .map(|c| (*c as f64 - d_mean) * (*c as f64 - d_mean))
        .sum::<f64>()
        / n;
    let d_majority_pct =
        d_seat_counts.iter().filter(|c| **c >= majority).count() as f64 / n * 100.0;

    let mut sorted = d_seat_counts;
    sorted.sort_unstable();
    debug!(
        "simulate_house: D seats in [{}, {}], mean {:.1}",
        sorted[0],
        sorted[sorted.len() - 1],
        d_mean
    );
    let d_percentiles: Vec<(u32, f64)> = [5u32, 10, 25, 50, 75, 90, 95]
        .iter()
        .map(|pct| (*pct, percentile(&sorted, *pct as f64)))
        .collect();

    Ok(HouseSimulation {
        simulations: settings.simulations,
        districts,
        majority,
        d_mean,
        d_median: percentile(&sorted, 50.0),
        d_std: d_var.sqrt(),
        d_min: sorted[0],
        d_max: sorted[sorted.len() - 1],
        d_majority_pct,
        d_percentiles,
    })
}

/// Percentile of a sorted sample with linear interpolation between the two
/// closest ranks.
fn percentile(sorted: &[u32], pct: f64) -> f64 {
    let last = sorted.len() - 1;
    if last == 0 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * last as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;
    sorted[low] as f64 + (sorted[high] as f64 - sorted[low] as f64) * fraction
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Runs the full model for a sequence of races while owning the noise source.
///
/// With a fixed seed, a given sequence of calls is fully reproducible.
pub struct Forecaster {
    coefficients: ModelCoefficients,
    settings: SimulationSettings,
    rng: StdRng,
}

impl Forecaster {
    pub fn new(
        coefficients: ModelCoefficients,
        settings: SimulationSettings,
        seed: Option<u64>,
    ) -> Result<Forecaster, ModelErrors> {
        settings.checked()?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Forecaster {
            coefficients,
            settings,
            rng,
        })
    }

    pub fn coefficients(&self) -> &ModelCoefficients {
        &self.coefficients
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Point estimate, simulated distribution and rating for one district.
    pub fn forecast_race(
        &mut self,
        pvi: f64,
        war: f64,
        generic_ballot: f64,
    ) -> Result<RaceForecast, ModelErrors> {
        let predicted_margin = predict_margin(&self.coefficients, pvi, war, generic_ballot);
        let simulation = simulate_race(predicted_margin, &self.settings, &mut self.rng)?;
        let rating = rate_race(simulation.d_win_pct);
        Ok(RaceForecast {
            predicted_margin,
            predicted_winner: predicted_winner(predicted_margin),
            rating,
            simulation,
        })
    }

    /// Chamber-level simulation over the given point estimates.
    pub fn simulate_house(
        &mut self,
        predicted_margins: &[f64],
    ) -> Result<HouseSimulation, ModelErrors> {
        simulate_house(predicted_margins, &self.settings, &mut self.rng)
    }
}
