//! # Listing Filters
//!
//! Narrows an already fetched list of [`Listing`](crate::model::Listing)s
//! with independent predicates, recomputed synchronously on every change.
//!
//! ## Filter Kinds
//!
//! | Kind | Keys | Predicate |
//! |------|------|-----------|
//! | Search | `search` | case-insensitive substring of make, model or city |
//! | Exact | `city`, `province`, `make`, `transmission`, `color`, `engine_type`, `body_type`, `registered_in` | case-insensitive equality |
//! | Range | `price`, `year`, `mileage`, `engine_capacity` | inclusive `min-max`, or `min+` for no upper bound |
//!
//! ## Semantics
//!
//! - Every active predicate must hold (AND).
//! - An empty value is no constraint; it never means "match nothing".
//! - Filtering is stable: survivors keep their input order.
//! - Range strings are validated when set. `"abc"`, `"5-"` or `"10-5"` are
//!   rejected with [`CarlotError::InvalidFilter`](crate::error::CarlotError)
//!   instead of producing bounds that silently match nothing.
//!
//! ## Usage
//!
//! ```ignore
//! let mut filters = FilterSet::new();
//! filters.set(FilterKey::City, "Lahore")?;
//! filters.set(FilterKey::Price, "0-1000000")?;
//! let visible = apply_filters(&listings, &filters);
//! ```

mod browser;
mod key;
mod set;
mod value;

pub use browser::ListingBrowser;
pub use key::{FilterKey, FilterKind};
pub use set::{apply_filters, FilterSet};
pub use value::{FilterValue, RangeBound};
