//! # Lookups
//!
//! Option lists for dropdowns come from the backend's lookup endpoints.
//! This module holds the boundary trait ([`LookupSource`]), an in-memory
//! implementation ([`StaticLookups`]) and the caches the cascade and the
//! sell form keep between fetches.
//!
//! - [`cache::LookupCache`]: per-tier lists for a cascade, tagged with the
//!   generation of the fetch that is allowed to fill them.
//! - [`cache::FlatLookups`]: independent lists (cities, colors, features),
//!   loaded once per session.

pub mod cache;
pub mod source;

pub use cache::{FlatLookups, LoadStatus, LookupCache};
pub use source::{LookupSource, StaticLookups};
