//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs`: search hits, reports and JSON output envelopes.
//! - `constants.rs`: endpoints, limits and install layout defaults.
//!
//! Domain types are data-only: no filesystem/network side effects.
//! Changes here affect `--json` outputs and `docs/contracts/*`.

pub mod constants;
pub mod models;
