// src/chart.rs
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Window selectable above the stock price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    OneYear,
    FiveYears,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::OneYear,
        TimeRange::FiveYears,
    ];

    pub fn days(self) -> i64 {
        match self {
            TimeRange::OneDay => 1,
            TimeRange::OneWeek => 7,
            TimeRange::OneMonth => 30,
            TimeRange::ThreeMonths => 90,
            TimeRange::OneYear => 365,
            TimeRange::FiveYears => 365 * 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::OneYear => "1Y",
            TimeRange::FiveYears => "5Y",
        }
    }

    fn volatility(self) -> f64 {
        match self {
            TimeRange::OneDay => 0.005,
            _ => 0.02,
        }
    }

    fn trend(self) -> f64 {
        match self {
            TimeRange::OneYear | TimeRange::FiveYears => 0.2,
            _ => 0.05,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown time range '{}', expected one of 1D 1W 1M 3M 1Y 5Y", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Stable per-symbol starting price: char-code sum mod 200, plus 50.
pub fn base_price(symbol: &str) -> f64 {
    let sum: u32 = symbol.chars().map(|c| c as u32).sum();
    f64::from(sum % 200 + 50)
}

/// Synthetic price history ending at `today`, oldest first, `range.days() + 1` points.
///
/// There is no historical price feed behind this; the shape is a gentle trend
/// plus noise around [`base_price`].
pub fn generate_mock_data<R: Rng>(
    range: TimeRange,
    symbol: &str,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<DataPoint> {
    let days = range.days();
    let base = base_price(symbol);
    let volatility = range.volatility();
    let trend = range.trend();

    (0..=days)
        .rev()
        .map(|i| {
            let random_factor = (rng.gen::<f64>() - 0.5) * 2.0 * volatility;
            let trend_factor = i as f64 / days as f64;
            let price = base * (1.0 + random_factor + trend_factor * trend);
            DataPoint {
                date: today - Duration::days(i),
                price: (price * 100.0).round() / 100.0,
            }
        })
        .collect()
}

/// Absolute and percentage move from the first to the last point.
pub fn price_change(points: &[DataPoint]) -> (f64, f64) {
    if points.len() < 2 {
        return (0.0, 0.0);
    }
    let first = points[0].price;
    let last = points[points.len() - 1].price;
    let change = last - first;
    let percentage = if first != 0.0 {
        change / first * 100.0
    } else {
        0.0
    };
    (change, percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn point_count_is_days_plus_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for range in TimeRange::ALL {
            let points = generate_mock_data(range, "AAPL", today(), &mut rng);
            assert_eq!(points.len() as i64, range.days() + 1, "{}", range);
            assert_eq!(points.last().unwrap().date, today());
            assert_eq!(points[0].date, today() - Duration::days(range.days()));
        }
    }

    #[test]
    fn base_price_is_symbol_derived() {
        // 65 + 65 + 80 + 76 = 286; 286 % 200 + 50
        assert_eq!(base_price("AAPL"), 136.0);
        assert_eq!(base_price("AAPL"), base_price("AAPL"));
        assert_ne!(base_price("AAPL"), base_price("MSFT"));
        assert_eq!(base_price(""), 50.0);
    }

    #[test]
    fn prices_stay_within_noise_and_trend_band() {
        let mut rng = StdRng::seed_from_u64(42);
        let base = base_price("TSLA");
        for p in generate_mock_data(TimeRange::OneMonth, "TSLA", today(), &mut rng) {
            assert!(p.price >= base * (1.0 - 0.02) - 0.01);
            assert!(p.price <= base * (1.0 + 0.02 + 0.05) + 0.01);
            assert_eq!((p.price * 100.0).round() / 100.0, p.price);
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate_mock_data(TimeRange::OneWeek, "NVDA", today(), &mut StdRng::seed_from_u64(1));
        let b = generate_mock_data(TimeRange::OneWeek, "NVDA", today(), &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn change_over_series() {
        assert_eq!(price_change(&[]), (0.0, 0.0));
        let points = [
            DataPoint { date: today(), price: 100.0 },
            DataPoint { date: today(), price: 110.0 },
        ];
        let (change, pct) = price_change(&points);
        assert_eq!(change, 10.0);
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn ranges_parse_from_labels() {
        assert_eq!("5y".parse::<TimeRange>(), Ok(TimeRange::FiveYears));
        assert!("2W".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
    }
}
