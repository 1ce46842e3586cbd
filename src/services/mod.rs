//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `search.rs`: query aggregation, install commands, search generations.
//! - `online.rs`: official repo + AUR lookups (parallel, failure-tolerant).
//! - `icons.rs`: favicon guessing/fetching on a bounded worker pool.
//! - `pkg.rs`: pacman / AUR helper invocation with streamed output.
//! - `wiki.rs`: offline index builder from arch-wiki-docs HTML.
//! - `stage.rs`: package-root staging and launcher generation.
//! - `config.rs`: `config.toml` loading with per-key defaults.
//! - `storage.rs`: paths, index resolution, atomic writes + audit log.
//! - `logging.rs`: tracing subscriber setup.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod config;
pub mod icons;
pub mod logging;
pub mod online;
pub mod output;
pub mod pkg;
pub mod search;
pub mod stage;
pub mod storage;
pub mod wiki;
