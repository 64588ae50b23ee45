//! Filter values and range parsing.

use super::key::{FilterKey, FilterKind};
use crate::error::{CarlotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive numeric range. `max: None` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBound {
    pub min: u64,
    pub max: Option<u64>,
}

impl RangeBound {
    pub fn between(min: u64, max: u64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn at_least(min: u64) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    /// Parse `"min-max"` or `"min+"`.
    ///
    /// Digits may carry `,` or `_` group separators (`"1,000,000-2,000,000"`).
    pub fn parse(key: FilterKey, raw: &str) -> Result<Self> {
        let invalid = |reason: &str| CarlotError::InvalidFilter {
            key: key.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        let number = |part: &str| -> Result<u64> {
            let digits: String = part
                .trim()
                .chars()
                .filter(|c| *c != ',' && *c != '_')
                .collect();
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("expected a whole number"));
            }
            digits
                .parse::<u64>()
                .map_err(|_| invalid("number is too large"))
        };

        let raw_trimmed = raw.trim();
        if let Some(min) = raw_trimmed.strip_suffix('+') {
            return Ok(Self::at_least(number(min)?));
        }

        let Some((min, max)) = raw_trimmed.split_once('-') else {
            return Err(invalid("expected \"min-max\" or \"min+\""));
        };
        let (min, max) = (number(min)?, number(max)?);
        if min > max {
            return Err(invalid("minimum is greater than maximum"));
        }
        Ok(Self::between(min, max))
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Lowercased query or exact value.
    Text(String),
    Range(RangeBound),
}

impl FilterValue {
    /// Parse a raw value for `key`. Blank input yields `None` (no constraint).
    pub fn parse(key: FilterKey, raw: &str) -> Result<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value = match key.kind() {
            FilterKind::Search | FilterKind::Exact => FilterValue::Text(trimmed.to_lowercase()),
            FilterKind::Range => FilterValue::Range(RangeBound::parse(key, trimmed)?),
        };
        Ok(Some(value))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(text) => f.write_str(text),
            FilterValue::Range(range) => range.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<RangeBound> {
        RangeBound::parse(FilterKey::Price, raw)
    }

    #[test]
    fn closed_range_is_inclusive() {
        let range = parse("1000000-2000000").unwrap();
        assert!(range.contains(1_000_000));
        assert!(range.contains(2_000_000));
        assert!(!range.contains(999_999));
        assert!(!range.contains(2_000_001));
    }

    #[test]
    fn plus_suffix_has_no_upper_bound() {
        let range = parse("5000000+").unwrap();
        assert_eq!(range, RangeBound::at_least(5_000_000));
        assert!(range.contains(5_000_000));
        assert!(range.contains(1_000_000_000));
        assert!(!range.contains(4_999_999));
    }

    #[test]
    fn accepts_group_separators_and_spaces() {
        assert_eq!(
            parse(" 1,000,000 - 2_000_000 ").unwrap(),
            RangeBound::between(1_000_000, 2_000_000)
        );
    }

    #[test]
    fn rejects_malformed_ranges() {
        for raw in ["abc", "5-", "-5", "10-5", "1-2-3", "+", "1.5-2", "5++"] {
            assert!(
                matches!(parse(raw), Err(CarlotError::InvalidFilter { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for raw in ["0-1000000", "5000000+"] {
            assert_eq!(parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn blank_value_is_no_constraint() {
        assert_eq!(FilterValue::parse(FilterKey::City, "   ").unwrap(), None);
        assert_eq!(FilterValue::parse(FilterKey::Price, "").unwrap(), None);
    }

    #[test]
    fn text_values_are_lowercased() {
        assert_eq!(
            FilterValue::parse(FilterKey::City, " Lahore ").unwrap(),
            Some(FilterValue::Text("lahore".into()))
        );
    }
}
