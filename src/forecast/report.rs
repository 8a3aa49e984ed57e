// Plain-text run summary printed after a forecast.

use race_forecasting::{HouseSimulation, ModelCoefficients, ModelDiagnostics, Rating};

use crate::forecast::io_out::ForecastRecord;

const RULE: &str = "======================================================================";
const COMPETITIVE_RACES: usize = 25;

/// Formats a margin the way leans are written: `D+4.5`, `R+2.0` or `EVEN`.
pub fn lean_label(margin: f64) -> String {
    if margin > 0.0 {
        format!("D+{:.1}", margin)
    } else if margin < 0.0 {
        format!("R+{:.1}", margin.abs())
    } else {
        "EVEN".to_string()
    }
}

pub fn print_summary(
    records: &[ForecastRecord],
    generic_ballot: f64,
    house: &HouseSimulation,
    coefficients: &ModelCoefficients,
    diagnostics: &ModelDiagnostics,
) {
    let d_seats = records.iter().filter(|r| r.predicted_winner == "D").count();
    let r_seats = records.len() - d_seats;
    let flips_to_d = records
        .iter()
        .filter(|r| r.potential_flip && r.predicted_winner == "D")
        .count();
    let flips_to_r = records
        .iter()
        .filter(|r| r.potential_flip && r.predicted_winner == "R")
        .count();

    println!();
    println!("{}", RULE);
    println!("2026 HOUSE FORECAST SUMMARY");
    println!("{}", RULE);
    println!();
    println!(
        "National environment: generic ballot {}",
        lean_label(generic_ballot)
    );
    println!(
        "Model: margin = {:.2} + {:.2}*PVI + {:.2}*WAR + {:.2}*GB",
        coefficients.intercept, coefficients.pvi, coefficients.war, coefficients.generic_ballot
    );
    println!(
        "       (R² = {:.3}, RMSE = {:.2} pts, n = {}, {})",
        diagnostics.r_squared, diagnostics.rmse, diagnostics.observations, diagnostics.years
    );

    println!();
    println!("{}", RULE);
    println!("POINT ESTIMATE");
    println!("{}", RULE);
    println!("  Democrats:   {}", d_seats);
    println!("  Republicans: {}", r_seats);
    let (net_party, net) = if flips_to_d >= flips_to_r {
        ("D", flips_to_d - flips_to_r)
    } else {
        ("R", flips_to_r - flips_to_d)
    };
    println!("  Net change:  {}+{}", net_party, net);

    println!();
    println!("{}", RULE);
    println!("MONTE CARLO SIMULATION ({} runs)", house.simulations);
    println!("{}", RULE);
    println!("  Dem seats (mean):    {:.1}", house.d_mean);
    println!("  Dem seats (median):  {:.0}", house.d_median);
    println!("  Dem seats (std dev): {:.1}", house.d_std);
    println!("  Dem seats (range):   {} - {}", house.d_min, house.d_max);
    println!();
    println!(
        "  Dem majority ({} seats or more): {:.1}%",
        house.majority, house.d_majority_pct
    );
    println!(
        "  Rep majority:                    {:.1}%",
        100.0 - house.d_majority_pct
    );
    println!();
    println!("  Seat distribution percentiles:");
    for (pct, seats) in &house.d_percentiles {
        println!(
            "    {:>2}th percentile: D {:.0} - R {:.0}",
            pct,
            seats,
            house.districts as f64 - seats
        );
    }

    println!();
    println!("{}", RULE);
    println!("RACE RATINGS");
    println!("{}", RULE);
    for rating in Rating::ALL {
        let label = rating.to_string();
        let count = records.iter().filter(|r| r.race_rating == label).count();
        if count > 0 {
            println!("  {}: {}", label, count);
        }
    }

    println!();
    println!("{}", RULE);
    println!("TOP {} MOST COMPETITIVE RACES", COMPETITIVE_RACES);
    println!("{}", RULE);
    let mut by_competitiveness: Vec<&ForecastRecord> = records.iter().collect();
    by_competitiveness.sort_by(|a, b| {
        let ca = (a.d_win_pct - 50.0).abs();
        let cb = (b.d_win_pct - 50.0).abs();
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });
    println!(
        "  {:<8} {:<22} {:<7} {:>7} {:>6} {:>6}  {}",
        "district", "incumbent", "lean", "margin", "D win", "R win", "rating"
    );
    for r in by_competitiveness.iter().take(COMPETITIVE_RACES) {
        println!(
            "  {:<8} {:<22} {:<7} {:>7.2} {:>5.1}% {:>5.1}%  {}",
            r.district_id,
            r.incumbent_2025.as_deref().unwrap_or("-"),
            r.pvi_string,
            r.predicted_margin,
            r.d_win_pct,
            r.r_win_pct,
            r.race_rating
        );
    }

    println!();
    println!("{}", RULE);
    println!("POTENTIAL FLIPS");
    println!("{}", RULE);
    print_flips(records, "D", "Democratic pickups", flips_to_d);
    print_flips(records, "R", "Republican pickups", flips_to_r);
    println!();
}

fn print_flips(records: &[ForecastRecord], winner: &str, title: &str, count: usize) {
    println!();
    println!("{} ({} seats):", title, count);
    let mut flips: Vec<&ForecastRecord> = records
        .iter()
        .filter(|r| r.potential_flip && r.predicted_winner == winner)
        .collect();
    // strongest pickups first
    flips.sort_by(|a, b| {
        let (ka, kb) = if winner == "D" {
            (a.d_win_pct, b.d_win_pct)
        } else {
            (a.r_win_pct, b.r_win_pct)
        };
        kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
    });
    if flips.is_empty() {
        println!("  None");
        return;
    }
    for r in flips {
        println!(
            "  {:<8} was {:<2} {:<7} margin {:>7.2}, D win {:>5.1}%, {}",
            r.district_id,
            r.incumbent_party.as_deref().unwrap_or("-"),
            r.pvi_string,
            r.predicted_margin,
            r.d_win_pct,
            r.race_rating
        );
    }
}
