//! Ranking of seat configurations
//!
//! All functions borrow the scanned waves and never reorder them; rankings
//! are returned as new vectors of references.

use std::cmp::Ordering;
use std::fmt;

use crate::{Metric, Result, TycoonError, WaveStat};

/// Wave with the highest value of `metric`, lowest wave number on ties
pub fn best_by(waves: &[WaveStat], metric: Metric) -> Result<&WaveStat> {
    let mut best: Option<&WaveStat> = None;
    for wave in waves {
        best = match best {
            None => Some(wave),
            Some(current) => match metric.value(wave).total_cmp(&metric.value(current)) {
                Ordering::Greater => Some(wave),
                Ordering::Equal if wave.no < current.no => Some(wave),
                _ => Some(current),
            },
        };
    }
    best.ok_or_else(|| TycoonError::NotFound(format!("no waves to rank by {}", metric)))
}

pub fn best_by_roi(waves: &[WaveStat]) -> Result<&WaveStat> {
    best_by(waves, Metric::Roi)
}

pub fn best_by_turnover(waves: &[WaveStat]) -> Result<&WaveStat> {
    best_by(waves, Metric::TotalTurnover)
}

/// Waves ordered by `metric`, highest first; ties keep scan order
pub fn ranked(waves: &[WaveStat], metric: Metric) -> Vec<&WaveStat> {
    let mut order: Vec<&WaveStat> = waves.iter().collect();
    order.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
    order
}

/// The `n`th best wave by `metric`, counting from 1
pub fn nth_best(waves: &[WaveStat], metric: Metric, n: usize) -> Result<&WaveStat> {
    if n == 0 {
        return Err(TycoonError::NotFound(
            "rank 0 requested, ranks start at 1".to_string(),
        ));
    }
    ranked(waves, metric)
        .get(n - 1)
        .copied()
        .ok_or_else(|| {
            TycoonError::NotFound(format!(
                "rank {} by {} requested but only {} wave(s) available",
                n,
                metric,
                waves.len()
            ))
        })
}

/// Format a currency amount with thousands separators, dropping the fraction
pub fn format_thousands(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Printable table of scanned waves with the best rows marked
#[derive(Debug, Clone)]
pub struct WaveReport<'a> {
    waves: &'a [WaveStat],
    best_roi: Option<u32>,
    best_turnover: Option<u32>,
}

impl<'a> WaveReport<'a> {
    pub fn new(waves: &'a [WaveStat]) -> Self {
        Self {
            waves,
            best_roi: best_by_roi(waves).ok().map(|w| w.no),
            best_turnover: best_by_turnover(waves).ok().map(|w| w.no),
        }
    }

    /// Note shown next to a wave, empty for unremarkable rows
    pub fn note(&self, wave: &WaveStat) -> String {
        let mut notes = Vec::new();
        if self.best_roi == Some(wave.no) {
            notes.push("Best ROI");
        }
        if self.best_turnover == Some(wave.no) {
            notes.push("Best Turnover");
        }
        notes.join(", ")
    }
}

impl fmt::Display for WaveReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4} {:>8} {:>8} {:>6} {:>6} {:>14} {:>7} {:>16} {:>5}  note",
            "wave", "economy", "business", "first", "cargo", "per wave", "roi", "total", "days"
        )?;
        for wave in self.waves {
            writeln!(
                f,
                "{:>4} {:>8} {:>8} {:>6} {:>6} {:>14} {:>7.2} {:>16} {:>5}  {}",
                wave.no,
                wave.economy,
                wave.business,
                wave.first,
                wave.cargo,
                format_thousands(wave.turnover_per_wave),
                wave.roi,
                format_thousands(wave.total_turnover),
                wave.turnover_days,
                self.note(wave)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(no: u32, roi: f64, total: f64) -> WaveStat {
        WaveStat {
            no,
            economy: 300,
            business: 30,
            first: 10,
            cargo: 4,
            turnover_per_wave: total / 8.0,
            roi,
            total_turnover: total,
            turnover_days: 8,
        }
    }

    #[test]
    fn test_best_scenario() {
        let waves = vec![wave(1, 2.0, 100.0), wave(2, 3.5, 90.0)];
        assert_eq!(best_by_roi(&waves).unwrap().no, 2);
        assert_eq!(best_by_turnover(&waves).unwrap().no, 1);
    }

    #[test]
    fn test_ties_pick_lowest_wave_number() {
        let waves = vec![wave(3, 1.0, 50.0), wave(1, 4.0, 80.0), wave(2, 4.0, 80.0)];
        assert_eq!(best_by_roi(&waves).unwrap().no, 1);
        assert_eq!(best_by_turnover(&waves).unwrap().no, 1);
    }

    #[test]
    fn test_best_on_empty() {
        assert!(best_by_roi(&[]).unwrap_err().is_not_found());
        assert!(best_by_turnover(&[]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_nth_best() {
        let waves = vec![
            wave(1, 2.0, 100.0),
            wave(2, 3.5, 90.0),
            wave(3, 1.5, 120.0),
            wave(4, 2.2, 90.0),
        ];

        assert_eq!(nth_best(&waves, Metric::TotalTurnover, 1).unwrap().no, 3);
        assert_eq!(nth_best(&waves, Metric::TotalTurnover, 2).unwrap().no, 1);
        // Equal turnover keeps scan order
        assert_eq!(nth_best(&waves, Metric::TotalTurnover, 3).unwrap().no, 2);
        assert_eq!(nth_best(&waves, Metric::TotalTurnover, 4).unwrap().no, 4);
        assert_eq!(nth_best(&waves, Metric::Roi, 1).unwrap().no, 2);
    }

    #[test]
    fn test_nth_best_is_repeatable_and_non_mutating() {
        let waves = vec![wave(1, 2.0, 100.0), wave(2, 3.5, 90.0), wave(3, 2.0, 95.0)];
        let before = waves.clone();

        let first = nth_best(&waves, Metric::Roi, 2).unwrap().clone();
        let second = nth_best(&waves, Metric::Roi, 2).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.no, 1);
        assert_eq!(waves, before);
    }

    #[test]
    fn test_nth_best_out_of_range() {
        let waves = vec![wave(1, 2.0, 100.0)];
        assert!(nth_best(&waves, Metric::Roi, 2).unwrap_err().is_not_found());
        assert!(nth_best(&waves, Metric::Roi, 0).unwrap_err().is_not_found());
        assert!(nth_best(&[], Metric::Roi, 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.9), "999");
        assert_eq!(format_thousands(1_200_000.0), "1,200,000");
        assert_eq!(format_thousands(-45_210.0), "-45,210");
    }

    #[test]
    fn test_report_notes() {
        let waves = vec![wave(1, 2.0, 100.0), wave(2, 3.5, 90.0), wave(3, 1.0, 10.0)];
        let report = WaveReport::new(&waves);

        assert_eq!(report.note(&waves[0]), "Best Turnover");
        assert_eq!(report.note(&waves[1]), "Best ROI");
        assert_eq!(report.note(&waves[2]), "");

        let rendered = report.to_string();
        assert_eq!(rendered.lines().count(), 4);
        assert!(rendered.contains("Best ROI"));
    }

    #[test]
    fn test_report_single_winner_gets_both_notes() {
        let waves = vec![wave(1, 5.0, 500.0), wave(2, 1.0, 100.0)];
        let report = WaveReport::new(&waves);
        assert_eq!(report.note(&waves[0]), "Best ROI, Best Turnover");
    }
}
