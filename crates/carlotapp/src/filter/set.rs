use super::key::{FilterKey, FilterKind};
use super::value::{FilterValue, RangeBound};
use crate::error::{CarlotError, Result};
use crate::model::Listing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The active filters, keyed by [`FilterKey`]. Absent keys are unconstrained.
///
/// Serialized as raw strings (`{"values":{"price":"0-1000000"}}`), the same
/// form a query string carries. Deserializing runs every value through
/// [`FilterValue::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterSet", into = "RawFilterSet")]
pub struct FilterSet {
    values: BTreeMap<FilterKey, FilterValue>,
}

#[derive(Serialize, Deserialize)]
struct RawFilterSet {
    #[serde(default)]
    values: BTreeMap<FilterKey, String>,
}

impl TryFrom<RawFilterSet> for FilterSet {
    type Error = CarlotError;

    fn try_from(raw: RawFilterSet) -> Result<Self> {
        let mut set = FilterSet::new();
        for (key, value) in &raw.values {
            set.set(*key, value)?;
        }
        Ok(set)
    }
}

impl From<FilterSet> for RawFilterSet {
    fn from(set: FilterSet) -> Self {
        Self {
            values: set
                .values
                .into_iter()
                .map(|(key, value)| (key, value.to_string()))
                .collect(),
        }
    }
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` from raw input. Blank input unsets the key.
    pub fn set(&mut self, key: FilterKey, raw: &str) -> Result<()> {
        match FilterValue::parse(key, raw)? {
            Some(value) => {
                self.values.insert(key, value);
            }
            None => {
                self.values.remove(&key);
            }
        }
        Ok(())
    }

    pub fn with(mut self, key: FilterKey, raw: &str) -> Result<Self> {
        self.set(key, raw)?;
        Ok(self)
    }

    /// Set a range key from already parsed bounds.
    pub fn set_range(&mut self, key: FilterKey, range: RangeBound) {
        self.values.insert(key, FilterValue::Range(range));
    }

    pub fn unset(&mut self, key: FilterKey) {
        self.values.remove(&key);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.values.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Whether `listing` satisfies every active filter.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.values
            .iter()
            .all(|(key, value)| predicate_holds(*key, value, listing))
    }
}

fn predicate_holds(key: FilterKey, value: &FilterValue, listing: &Listing) -> bool {
    match (key.kind(), value) {
        (FilterKind::Search, FilterValue::Text(query)) => FilterKey::search_fields(listing)
            .iter()
            .any(|field| field.to_lowercase().contains(query.as_str())),
        (FilterKind::Exact, FilterValue::Text(expected)) => key
            .text_field(listing)
            .is_some_and(|field| field.trim().to_lowercase() == *expected),
        (FilterKind::Range, FilterValue::Range(range)) => key
            .numeric_field(listing)
            .is_some_and(|field| range.contains(field)),
        // A value of the wrong shape can only come from a hand-built set.
        _ => false,
    }
}

/// Listings satisfying every active filter, in their original order.
///
/// Pure: `candidates` is not touched and the same inputs always give the
/// same output.
pub fn apply_filters(candidates: &[Listing], filters: &FilterSet) -> Vec<Listing> {
    candidates
        .iter()
        .filter(|listing| filters.matches(listing))
        .cloned()
        .collect()
}
