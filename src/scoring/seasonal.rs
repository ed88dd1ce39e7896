use chrono::{Datelike, NaiveDate};

/// Demand factor for the month a post goes live: peaks Nov-Jan, dips Jun-Aug.
pub fn seasonal_factor(date: NaiveDate) -> f64 {
    match date.month() {
        11 | 12 | 1 => 1.15,
        6..=8 => 0.90,
        3..=5 => 1.05,
        _ => 1.00,
    }
}

/// Inclusive month span; `start > end` wraps over the new year (e.g. Dec-Jan).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthRange {
    pub start: u32,
    pub end: u32,
    pub boost: f64,
}

impl MonthRange {
    pub const fn new(start: u32, end: u32, boost: f64) -> Self {
        Self { start, end, boost }
    }

    pub fn contains(&self, month: u32) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&month)
        } else {
            month >= self.start || month <= self.end
        }
    }
}

/// Boost of the first range covering `month`, or 1.0.
pub fn range_boost(ranges: &[MonthRange], month: u32) -> f64 {
    ranges
        .iter()
        .find(|range| range.contains(month))
        .map(|range| range.boost)
        .unwrap_or(1.0)
}
