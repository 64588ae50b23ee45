//! Filter keys and the listing field each one reads.

use crate::error::CarlotError;
use crate::model::Listing;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Search,
    Exact,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Search,
    City,
    Province,
    Make,
    Transmission,
    Color,
    EngineType,
    BodyType,
    RegisteredIn,
    Price,
    Year,
    Mileage,
    EngineCapacity,
}

impl FilterKey {
    pub const ALL: [FilterKey; 13] = [
        FilterKey::Search,
        FilterKey::City,
        FilterKey::Province,
        FilterKey::Make,
        FilterKey::Transmission,
        FilterKey::Color,
        FilterKey::EngineType,
        FilterKey::BodyType,
        FilterKey::RegisteredIn,
        FilterKey::Price,
        FilterKey::Year,
        FilterKey::Mileage,
        FilterKey::EngineCapacity,
    ];

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterKey::Search => FilterKind::Search,
            FilterKey::Price | FilterKey::Year | FilterKey::Mileage | FilterKey::EngineCapacity => {
                FilterKind::Range
            }
            _ => FilterKind::Exact,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::City => "city",
            FilterKey::Province => "province",
            FilterKey::Make => "make",
            FilterKey::Transmission => "transmission",
            FilterKey::Color => "color",
            FilterKey::EngineType => "engine_type",
            FilterKey::BodyType => "body_type",
            FilterKey::RegisteredIn => "registered_in",
            FilterKey::Price => "price",
            FilterKey::Year => "year",
            FilterKey::Mileage => "mileage",
            FilterKey::EngineCapacity => "engine_capacity",
        }
    }

    /// Field compared by an exact-match key.
    pub(crate) fn text_field<'a>(&self, listing: &'a Listing) -> Option<&'a str> {
        let field = match self {
            FilterKey::City => &listing.city,
            FilterKey::Province => &listing.province,
            FilterKey::Make => &listing.make,
            FilterKey::Transmission => &listing.transmission,
            FilterKey::Color => &listing.color,
            FilterKey::EngineType => &listing.engine_type,
            FilterKey::BodyType => &listing.body_type,
            FilterKey::RegisteredIn => &listing.registered_in,
            _ => return None,
        };
        Some(field.as_str())
    }

    /// Field compared by a range key.
    pub(crate) fn numeric_field(&self, listing: &Listing) -> Option<u64> {
        match self {
            FilterKey::Price => Some(listing.price),
            FilterKey::Year => Some(u64::from(listing.year)),
            FilterKey::Mileage => Some(u64::from(listing.mileage)),
            FilterKey::EngineCapacity => Some(u64::from(listing.engine_capacity)),
            _ => None,
        }
    }

    /// Fields scanned by free-text search.
    pub(crate) fn search_fields(listing: &Listing) -> [&str; 3] {
        [
            listing.make.as_str(),
            listing.model.as_str(),
            listing.city.as_str(),
        ]
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = CarlotError;

    /// Accepts snake_case and kebab-case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FilterKey::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| CarlotError::UnknownFilterKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_and_kebab_case() {
        assert_eq!("engine_type".parse::<FilterKey>().unwrap(), FilterKey::EngineType);
        assert_eq!("Registered-In".parse::<FilterKey>().unwrap(), FilterKey::RegisteredIn);
        assert!(matches!(
            "colour".parse::<FilterKey>(),
            Err(CarlotError::UnknownFilterKey(_))
        ));
    }

    #[test]
    fn every_key_round_trips_through_its_name() {
        for key in FilterKey::ALL {
            assert_eq!(key.as_str().parse::<FilterKey>().unwrap(), key);
        }
    }

    #[test]
    fn kinds() {
        assert_eq!(FilterKey::Search.kind(), FilterKind::Search);
        assert_eq!(FilterKey::Color.kind(), FilterKind::Exact);
        assert_eq!(FilterKey::Mileage.kind(), FilterKind::Range);
    }
}
