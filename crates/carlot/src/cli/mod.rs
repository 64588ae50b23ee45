//! # CLI Behavior
//!
//! This is **one possible UI client** for carlot, not the application itself.
//! It is the only place that knows about terminal I/O and exit codes.
//!
//! ## Commands
//!
//! - `carlot filter <listings.json>`: run the listing filter panel over a
//!   JSON dump of listings. `--search`, `--city` and `--price` cover the
//!   common filters; `--filter key=value` reaches every other key. Filters
//!   are ANDed and input order is kept.
//! - `carlot keys`: list the filter keys and how each one matches.
//! - `carlot draft show|clear`: inspect or drop the saved sell-form draft.
//! - `carlot config`: print the resolved configuration.
//!
//! ## Module Structure
//!
//! - `commands`: Dispatch and per-command handlers
//! - `render`: Output formatting
//! - `setup`: Argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
