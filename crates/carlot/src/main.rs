//! # Carlot CLI
//!
//! A thin command-line client over the `carlotapp` library. The binary only
//! invokes `cli::run()` and turns errors into an exit code; argument parsing,
//! logging setup and output live in `src/cli/`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Dispatch, config and logging wiring (commands.rs)        │
//! │  - JSON and table output (render.rs)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  carlotapp                                                  │
//! │  - Filter engine, draft store, configuration                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr and are controlled by `CARLOT_LOG` (default `warn`) or
//! `-v`/`-vv`. Results go to stdout, so output stays pipeable.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
