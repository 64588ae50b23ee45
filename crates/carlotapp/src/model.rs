//! # Domain Model
//!
//! Plain data shared by every layer: identifiers, lookup options, listing
//! records and the serializable cascade state.
//!
//! ## Identifiers
//!
//! The marketplace backend hands out ids of mixed shapes (numeric makes,
//! slugged cities, string years). [`Id`] stores them as opaque strings so
//! that `"42"` from a JSON number and `"42"` from a query string compare
//! equal.
//!
//! ## Lookup Options
//!
//! A [`LookupOption`] is one selectable entry of a dropdown: a make, a model,
//! a version, a city. `parent_id` links a tier-N option to the tier-(N-1)
//! option that produced it (a model's parent is its make). Options are never
//! mutated after they are fetched.
//!
//! ## Listings
//!
//! A [`Listing`] is one car on sale. It carries every field the filter
//! engine can constrain; see [`crate::filter::FilterKey`] for the mapping.
//!
//! ## Cascade State
//!
//! [`CascadeState`] is the ordered list of tier selections. It is both the
//! live snapshot handed out by [`crate::cascade::CascadeSelector::state`] and
//! the shape persisted inside a [`crate::draft::Draft`], so a restored draft
//! feeds straight back into the selector.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Always serialized as a string. Deserializes from a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Id(text),
            Wire::Unsigned(n) => Id(n.to_string()),
            Wire::Signed(n) => Id(n.to_string()),
        })
    }
}

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// The lookup lists served by the backend.
///
/// `Makes`, `Models` and `Versions` are parent-filtered (models of a make,
/// versions of a model). The others are flat lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Makes,
    Models,
    Versions,
    Provinces,
    Cities,
    Colors,
    BodyTypes,
    EngineTypes,
    Transmissions,
    Features,
}

impl LookupKind {
    pub const FLAT: [LookupKind; 7] = [
        LookupKind::Provinces,
        LookupKind::Cities,
        LookupKind::Colors,
        LookupKind::BodyTypes,
        LookupKind::EngineTypes,
        LookupKind::Transmissions,
        LookupKind::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Makes => "makes",
            LookupKind::Models => "models",
            LookupKind::Versions => "versions",
            LookupKind::Provinces => "provinces",
            LookupKind::Cities => "cities",
            LookupKind::Colors => "colors",
            LookupKind::BodyTypes => "body_types",
            LookupKind::EngineTypes => "engine_types",
            LookupKind::Transmissions => "transmissions",
            LookupKind::Features => "features",
        }
    }

    pub fn is_flat(&self) -> bool {
        Self::FLAT.contains(self)
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
}

impl LookupOption {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<Id>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

/// One car listing, as returned by the candidate list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Id,
    #[serde(default)]
    pub title: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub version: String,
    pub city: String,
    #[serde(default)]
    pub province: String,
    pub price: u64,
    pub year: u16,
    pub mileage: u32,
    #[serde(default)]
    pub engine_capacity: u32,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub engine_type: String,
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub registered_in: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSelection {
    pub tier: String,
    pub selected_id: Option<Id>,
    #[serde(default)]
    pub selected_label: String,
}

impl TierSelection {
    pub fn empty(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            selected_id: None,
            selected_label: String::new(),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeState {
    pub tiers: Vec<TierSelection>,
}

impl CascadeState {
    pub fn is_complete(&self) -> bool {
        !self.tiers.is_empty() && self.tiers.iter().all(TierSelection::is_selected)
    }

    /// Selected id of the named tier, if any.
    pub fn selected(&self, tier: &str) -> Option<&Id> {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .and_then(|t| t.selected_id.as_ref())
    }

    pub fn label(&self, tier: &str) -> Option<&str> {
        self.tiers
            .iter()
            .find(|t| t.tier == tier && t.is_selected())
            .map(|t| t.selected_label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        assert_eq!(Id::from(42u64), Id::from("42"));
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let json = serde_json::to_string(&Id::from("toyota")).unwrap();
        assert_eq!(json, "\"toyota\"");
    }

    #[test]
    fn integer_ids_from_the_backend_are_accepted() {
        let listing: Listing = serde_json::from_str(
            r#"{"id":42,"make":"Honda","model":"City","city":"Lahore","price":900000,"year":2019,"mileage":1}"#,
        )
        .unwrap();
        assert_eq!(listing.id, Id::from("42"));

        let option: LookupOption =
            serde_json::from_str(r#"{"id":1,"name":"Toyota","parent_id":-3}"#).unwrap();
        assert_eq!(option.id, Id::from(1u64));
        assert_eq!(option.parent_id, Some(Id::from("-3")));

        // Written back as a string.
        assert_eq!(serde_json::to_string(&option.id).unwrap(), "\"1\"");
    }

    #[test]
    fn non_scalar_ids_are_rejected() {
        assert!(serde_json::from_str::<Id>("[1]").is_err());
        assert!(serde_json::from_str::<Id>("1.5").is_err());
    }

    #[test]
    fn option_without_parent_omits_field() {
        let json = serde_json::to_string(&LookupOption::new("1", "Toyota")).unwrap();
        assert!(!json.contains("parent_id"));

        let model = LookupOption::new("10", "Corolla").with_parent("1");
        let back: LookupOption =
            serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();
        assert_eq!(back.parent_id, Some(Id::from("1")));
    }

    #[test]
    fn cascade_state_completeness() {
        let mut state = CascadeState {
            tiers: vec![TierSelection::empty("year"), TierSelection::empty("make")],
        };
        assert!(!state.is_complete());

        for t in &mut state.tiers {
            t.selected_id = Some(Id::from("x"));
        }
        assert!(state.is_complete());
        assert!(!CascadeState::default().is_complete());
    }

    #[test]
    fn flat_kinds() {
        assert!(LookupKind::Cities.is_flat());
        assert!(!LookupKind::Models.is_flat());
    }
}
