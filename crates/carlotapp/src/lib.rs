//! # Carlot Architecture
//!
//! Carlot is the **UI-agnostic core of a car marketplace's forms**: the
//! dependent Make → Model → Version selectors, the listing filter panel, and
//! the "sell your car" form that survives reloads. It is a library that
//! happens to have a CLI, not the other way around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/carlot)                                  │
//! │  - Parses arguments, prints JSON, owns exit codes           │
//! │  - Installs the tracing subscriber                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Flow Layer (session.rs, compare.rs, filter/browser.rs)     │
//! │  - One object per page: sell form, comparison, browsing     │
//! │  - Wires selectors, filters and drafts together             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine Layer (cascade.rs, filter/, submission.rs)          │
//! │  - Pure state machines and predicates                       │
//! │  - Never performs a fetch itself: hands out FetchTickets    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Boundary Layer (lookup/, draft/)                           │
//! │  - LookupSource / ListingApi traits for the backend         │
//! │  - KvBackend trait: FsBackend (disk), MemBackend (testing)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout or exits the process. Network
//! access goes through traits the caller implements, and the engines run on
//! a single-threaded event loop: a tier selection returns a ticket, the
//! caller awaits it however it likes, and hands the result back. Results
//! that arrive for a superseded selection are recognised and dropped.
//!
//! ## Failure Model
//!
//! Remote failures degrade the view (an empty selector, an empty grid) and
//! are logged through `tracing`; they are never fatal. Draft problems read as
//! "no draft". Only validation and submission failures reach the user.
//!
//! ## Module Overview
//!
//! - [`cascade`]: Dependent tier selection with stale-response protection
//! - [`lookup`]: Option caches and the lookup source trait
//! - [`filter`]: AND-composed listing predicates and the browsing view
//! - [`draft`]: Draft snapshots over a durable key-value store
//! - [`session`]: The sell-form flow
//! - [`submission`]: Payload validation, listing creation, image upload
//! - [`compare`]: The car comparison board
//! - [`wizard`]: Sell-form steps
//! - [`model`]: Core data types (`Id`, `LookupOption`, `Listing`, ...)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod cascade;
pub mod compare;
pub mod config;
pub mod draft;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod model;
pub mod session;
pub mod submission;
pub mod wizard;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
