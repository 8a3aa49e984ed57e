/*!

This is the long-form manual for `race_forecasting` and `housecast`.

## The model

Each district gets a point estimate of the Democratic margin from a linear
model fitted on the 2020-2024 House results:

```text
margin = intercept + pvi * PVI + war * WAR + generic_ballot * GB
```

* `PVI` is the district partisan lean in points, Democratic positive.
  `D+5` is `5.0`, `R+10` is `-10.0` and `EVEN` is `0.0`.
* `WAR` is the incumbent quality score ("wins above replacement"). Open
  seats use `0.0`, the replacement level.
* `GB` is the national generic-ballot margin in points, Democratic positive.

The fitted coefficients live in
[`ModelCoefficients::FITTED_2020_2024`](crate::ModelCoefficients::FITTED_2020_2024)
and the fit statistics in
[`ModelDiagnostics::FITTED_2020_2024`](crate::ModelDiagnostics::FITTED_2020_2024).

## The simulation

The point estimate is only the center of the distribution. The model's
residual error ([`MODEL_RMSE`](crate::MODEL_RMSE), about 5.35 points) is used
as the standard deviation of a Gaussian noise term, and each race is simulated
[`SimulationSettings::simulations`](crate::SimulationSettings) times
(1000 by default). A simulated margin above zero is a Democratic win.

Noise is drawn in antithetic (+z, -z) pairs, which keeps the simulated sample
centered on the point estimate. An even seat at margin 0.0 therefore reports
exactly 50.0%, never 49.8% one day and 50.3% the next.

Chamber control is simulated separately by
[`simulate_house`](crate::simulate_house): every run redraws the noise of all
districts and counts Democratic seats against the majority threshold.

## Ratings

Races are bucketed from the win probability of the favored party:

| Favorite win probability | Rating   |
|--------------------------|----------|
| 99% and above            | `Safe`   |
| 90% to 99%               | `Likely` |
| 75% to 90%               | `Lean`   |
| below 75%                | `Tilt`   |
| exactly 50% for both     | `Toss-up`|

The buckets are symmetric: `Safe D` at a 99.0% Democratic win probability,
`Safe R` at 1.0%.

## Quick example

```rust
use race_forecasting::*;

fn main() -> Result<(), ModelErrors> {
    let mut forecaster = Forecaster::new(
        ModelCoefficients::FITTED_2020_2024,
        SimulationSettings::DEFAULT_SETTINGS,
        Some(42), // seed; None draws one from the system
    )?;

    // A D+5 district with no incumbent quality score, in a D+4.5 national
    // environment.
    let forecast = forecaster.forecast_race(5.0, 0.0, 4.5)?;
    println!(
        "margin {:.2}, {} win, {}",
        forecast.predicted_margin,
        forecast.predicted_winner,
        forecast.rating
    );
    Ok(())
}
```

*/
