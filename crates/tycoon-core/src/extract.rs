//! Decoding of scraped page text into numbers and records
//!
//! Every function here is pure: the page driver hands over raw text and these
//! helpers turn it into typed values or a [`TycoonError::Parse`].

use regex::Regex;
use std::sync::OnceLock;

use crate::{FareClass, Result, TycoonError, WaveStat};

static HUB_LABEL: OnceLock<Regex> = OnceLock::new();
static ROUTE_TITLE: OnceLock<Regex> = OnceLock::new();

fn hub_label_regex() -> &'static Regex {
    HUB_LABEL.get_or_init(|| Regex::new(r"Hub ([A-Z]{3}) -").expect("valid hub regex"))
}

fn route_title_regex() -> &'static Regex {
    ROUTE_TITLE.get_or_init(|| Regex::new(r"([A-Z]{3}) / ([A-Z]{3})").expect("valid route regex"))
}

/// Keep only ASCII digits and the decimal point
pub fn strip_non_decimal(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Decode a token such as `"1,234 pax"` into `1234.0`
pub fn decode_number(token: &str) -> Result<f64> {
    let cleaned = strip_non_decimal(token);
    if cleaned.is_empty() {
        return Err(TycoonError::Parse(token.to_string()));
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| TycoonError::Parse(token.to_string()))
}

/// Decode a currency token; a trailing `M` means millions (`"$1.2M"` is `1_200_000.0`)
pub fn decode_cost(token: &str) -> Result<f64> {
    let value = decode_number(token)?;
    if token.trim_end().ends_with('M') {
        Ok(value * 1_000_000.0)
    } else {
        Ok(value)
    }
}

/// Decode a whole-number token such as `"8 days"` or `"1 284 km"`
pub fn decode_integer(token: &str) -> Result<u64> {
    let cleaned = strip_non_decimal(token);
    cleaned
        .parse::<u64>()
        .map_err(|_| TycoonError::Parse(token.to_string()))
}

fn decode_u32(token: &str) -> Result<u32> {
    let value = decode_integer(token)?;
    u32::try_from(value).map_err(|_| TycoonError::Parse(token.to_string()))
}

/// Fare class out of a pricing box title like `"Business class"`
pub fn parse_fare_class(title: &str) -> Option<FareClass> {
    title.replace("class", "").trim().to_lowercase().parse().ok()
}

/// Hub code out of a hub list entry like `"Hub CGK - Jakarta"`
pub fn parse_hub_label(text: &str) -> Option<String> {
    hub_label_regex()
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// `(origin, destination)` out of a line title like `"CGK / SIN"`
pub fn parse_route_title(text: &str) -> Option<(String, String)> {
    route_title_regex()
        .captures(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Build a [`WaveStat`] from the configurator's two result rows
///
/// `seat_row` holds a label cell, four allocations, turnover per wave and ROI;
/// `total_row` holds the totals with the overall turnover in cell 5 and the
/// number of days in cell 6.
pub fn parse_wave(no: u32, seat_row: &[String], total_row: &[String]) -> Result<WaveStat> {
    let cell = |row: &[String], idx: usize, name: &str| -> Result<String> {
        row.get(idx).cloned().ok_or_else(|| {
            TycoonError::NotFound(format!("wave {} has no {} cell (index {})", no, name, idx))
        })
    };

    Ok(WaveStat {
        no,
        economy: decode_u32(&cell(seat_row, 1, "economy")?)?,
        business: decode_u32(&cell(seat_row, 2, "business")?)?,
        first: decode_u32(&cell(seat_row, 3, "first")?)?,
        cargo: decode_u32(&cell(seat_row, 4, "cargo")?)?,
        turnover_per_wave: decode_cost(&cell(seat_row, 5, "turnover per wave")?)?,
        roi: decode_number(&cell(seat_row, 6, "roi")?)?,
        total_turnover: decode_cost(&cell(total_row, 5, "total turnover")?)?,
        turnover_days: decode_u32(&cell(total_row, 6, "turnover days")?)?,
    })
}
