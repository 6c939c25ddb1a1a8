use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive publication-year range. The filter only applies when both bounds
/// are present; a half-open range keeps every article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build from raw user bounds. Bounds that are not integers are dropped.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.and_then(parse_bound),
            end: end.and_then(parse_bound),
        }
    }

    /// Parse "2019-2023" (inclusive) or a single year "2021"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((low, high)) = s.split_once('-').filter(|_| !s.starts_with('-')) {
            let (Some(low), Some(high)) = (parse_bound(low), parse_bound(high)) else {
                bail!("Invalid year range: {}", s)
            };
            Ok(Self::new(low, high))
        } else if let Some(year) = parse_bound(s) {
            Ok(Self::new(year, year))
        } else {
            bail!("Invalid year range: {}", s)
        }
    }

    /// Both bounds, when the range is fully specified
    pub fn bounds(&self) -> Option<(i32, i32)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.bounds().is_some()
    }

    pub fn contains(&self, year: i32) -> bool {
        match self.bounds() {
            Some((start, end)) => year >= start && year <= end,
            None => true,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{}-{}", start, end),
            (Some(start), None) => write!(f, "{}- (inactive)", start),
            (None, Some(end)) => write!(f, "-{} (inactive)", end),
            (None, None) => f.write_str("all years"),
        }
    }
}

fn parse_bound(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}
