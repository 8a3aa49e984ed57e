// Scraper for the national generic-ballot polling average.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::blocking::Client;
use snafu::{ensure, ResultExt};

use crate::forecast::report::lean_label;
use crate::forecast::*;

/// Polling-average page scraped by the update subcommand.
pub const DEFAULT_URL: &str =
    "https://www.realclearpolling.com/polls/state-of-the-union/generic-congressional-vote";

/// The page serves a stripped-down document to clients without a browser
/// user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Vote shares outside these bounds are parse artifacts, not poll numbers.
const SHARE_MIN: f64 = 35.0;
const SHARE_MAX: f64 = 65.0;

/// Largest generic-ballot margin the page could plausibly report.
const MAX_MARGIN: f64 = 30.0;

const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub url: String,
    pub timeout_secs: u64,
    /// How many times a failed request is retried before giving up.
    pub retries: u32,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        ScrapeSettings {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 10,
            retries: 2,
        }
    }
}

/// Fetches the polling-average page and extracts the current generic-ballot
/// margin, Democratic points positive.
///
/// Transport failures are retried. Anything else, a bad status, a page
/// without a recognisable average or an implausible value, fails the run:
/// a wrong number must never silently stand in for the real average.
pub fn fetch_generic_ballot(settings: &ScrapeSettings) -> BForecastResult<f64> {
    info!("fetch_generic_ballot: fetching {}", settings.url);
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context(HttpClientSnafu {})?;

    let mut attempt = 0;
    let body = loop {
        match client.get(&settings.url).send() {
            Ok(resp) => {
                let status = resp.status();
                ensure!(
                    status.is_success(),
                    HttpStatusSnafu {
                        url: &settings.url,
                        status: status.as_u16(),
                    }
                );
                break resp.text().context(HttpBodySnafu { url: &settings.url })?;
            }
            Err(source) if attempt < settings.retries => {
                attempt += 1;
                warn!(
                    "fetch_generic_ballot: request failed ({}), retry {}/{}",
                    source, attempt, settings.retries
                );
                thread::sleep(RETRY_DELAY);
            }
            Err(source) => {
                return Err(Box::new(ForecastError::HttpRequest {
                    url: settings.url.clone(),
                    source,
                }));
            }
        }
    };

    let value = extract_generic_ballot(&body)?;
    info!(
        "fetch_generic_ballot: current generic ballot {}",
        lean_label(value)
    );
    Ok(value)
}

/// Extracts the polling average from the page body.
///
/// The average row of the poll table is located first, and its party-spread
/// cell (`D+3.0`) or its pair of vote-share cells is read. Pages without the
/// table fall back to a labelled spread anywhere in the text. A page matching
/// none of these is an error.
pub fn extract_generic_ballot(body: &str) -> BForecastResult<f64> {
    if let Some(row) = average_row(body) {
        debug!("extract_generic_ballot: average row: {}", row);
        if let Some(margin) = party_spread(&row)? {
            return plausible(margin);
        }
        if let Some(margin) = share_pair(&row)? {
            return plausible(margin);
        }
    }
    if let Some(margin) = labelled_spread(body)? {
        return plausible(margin);
    }
    Err(Box::new(ForecastError::UnrecognisedPage {}))
}

/// The table row holding the polling average, if the page has one.
fn average_row(body: &str) -> Option<String> {
    let label = body.find("RCP Average").or_else(|| body.find("Average"))?;
    let start = body[..label].rfind("<tr")?;
    let end = label + body[label..].find("</tr>")?;
    Some(body[start..end].to_string())
}

/// A party-prefixed spread like `D+3.0` or `R+1.4`.
fn party_spread(text: &str) -> ForecastResult<Option<f64>> {
    let re = pattern(r"(D|R)\s*\+\s*([0-9]+(?:\.[0-9]+)?)")?;
    if let Some(caps) = re.captures(text) {
        if let Ok(value) = caps[2].parse::<f64>() {
            let margin = if &caps[1] == "D" { value } else { -value };
            debug!("party_spread: matched {:?} -> {}", &caps[0], margin);
            return Ok(Some(margin));
        }
    }
    Ok(None)
}

/// Two adjacent vote shares, Democratic column first. Numbers outside the
/// plausible share range (dates, sample sizes) are skipped.
fn share_pair(text: &str) -> ForecastResult<Option<f64>> {
    let tags = pattern(r"<[^>]+>")?;
    let flat = tags.replace_all(text, " ");
    let numbers = pattern(r"[0-9]+(?:\.[0-9]+)?")?;
    let shares: Vec<f64> = numbers
        .find_iter(&flat)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    for pair in shares.windows(2) {
        let (dem, rep) = (pair[0], pair[1]);
        if dem > SHARE_MIN && dem < SHARE_MAX && rep > SHARE_MIN && rep < SHARE_MAX {
            debug!("share_pair: matched shares {} / {}", dem, rep);
            return Ok(Some(dem - rep));
        }
    }
    Ok(None)
}

/// A party-labelled spread anywhere in the page, like `Democrats +4.5`.
fn labelled_spread(body: &str) -> ForecastResult<Option<f64>> {
    let patterns: [(&str, f64); 6] = [
        (r"(?i)Democrats?\s*\+\s*([0-9]+(?:\.[0-9]+)?)", 1.0),
        (r"(?i)Republicans?\s*\+\s*([0-9]+(?:\.[0-9]+)?)", -1.0),
        (r"(?i)\bDem\s*\+\s*([0-9]+(?:\.[0-9]+)?)", 1.0),
        (r"(?i)\bGOP\s*\+\s*([0-9]+(?:\.[0-9]+)?)", -1.0),
        (r"\bD\s*\+\s*([0-9]+(?:\.[0-9]+)?)", 1.0),
        (r"\bR\s*\+\s*([0-9]+(?:\.[0-9]+)?)", -1.0),
    ];
    for (p, sign) in patterns {
        if let Some(caps) = pattern(p)?.captures(body) {
            if let Ok(value) = caps[1].parse::<f64>() {
                debug!("labelled_spread: matched {:?}", &caps[0]);
                return Ok(Some(sign * value));
            }
        }
    }
    Ok(None)
}

fn plausible(margin: f64) -> BForecastResult<f64> {
    ensure!(
        margin.is_finite() && margin.abs() <= MAX_MARGIN,
        ImplausibleValueSnafu { value: margin }
    );
    Ok(margin)
}

fn pattern(re: &str) -> ForecastResult<Regex> {
    Regex::new(re).context(BadPatternSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_spread_cell_of_the_average_row() {
        let body = "<html><table>\
             <tr><td>Some Poll</td><td>1/5 - 2/1</td><td>48.0</td><td>41.0</td><td>D+7.0</td></tr>\
             <tr><td>RCP Average</td><td>1/5 - 2/1</td><td>46.0</td><td>43.0</td><td>D+3.0</td></tr>\
             </table></html>";
        assert_eq!(extract_generic_ballot(body).unwrap(), 3.0);
    }

    #[test]
    fn reads_a_republican_spread() {
        let body = "<tr><th>RCP Average</th><td>12/1 - 12/15</td><td>R+1.4</td></tr>";
        assert_eq!(extract_generic_ballot(body).unwrap(), -1.4);
    }

    #[test]
    fn falls_back_to_the_share_pair() {
        let body =
            "<tr><td>RCP Average</td><td>12/1 - 12/15</td><td>1500</td><td>46.5</td><td>44.0</td><td></td></tr>";
        let margin = extract_generic_ballot(body).unwrap();
        assert!((margin - 2.5).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_a_labelled_spread() {
        let body = "<html><p>Generic ballot: Democrats +4.5 nationally.</p></html>";
        assert_eq!(extract_generic_ballot(body).unwrap(), 4.5);
        let body = "<html><p>The GOP + 2.0 lead is holding.</p></html>";
        assert_eq!(extract_generic_ballot(body).unwrap(), -2.0);
    }

    #[test]
    fn rejects_an_unrecognisable_page() {
        let err = extract_generic_ballot("<html><body>hello there</body></html>").unwrap_err();
        assert!(matches!(*err, ForecastError::UnrecognisedPage {}));
    }

    #[test]
    fn rejects_an_implausible_average() {
        let body = "<tr><td>RCP Average</td><td>D+52.0</td></tr>";
        let err = extract_generic_ballot(body).unwrap_err();
        match *err {
            ForecastError::ImplausibleValue { value } => assert_eq!(value, 52.0),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn plausibility_bounds_are_inclusive() {
        assert_eq!(plausible(30.0).unwrap(), 30.0);
        assert_eq!(plausible(-30.0).unwrap(), -30.0);
        assert!(plausible(30.1).is_err());
    }

    #[test]
    fn the_average_row_is_preferred_over_page_text() {
        // The page-wide fallback would find "Democrats +9.9" first; the
        // average row must win.
        let body = "<p>Democrats +9.9 in the latest poll</p>\
             <tr><td>RCP Average</td><td>45.0</td><td>44.0</td><td>D+1.0</td></tr>";
        assert_eq!(extract_generic_ballot(body).unwrap(), 1.0);
    }
}
