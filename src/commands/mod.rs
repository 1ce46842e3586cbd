//! CLI dispatch. Handlers match on `Commands`, call into `services/*`
//! and render either text rows or the `--json` envelope.
//!
//! - `admin.rs`: offline index maintenance (`db`) and package staging.
//! - `runtime.rs`: search, install commands, package actions and icons.

pub mod admin;
pub mod runtime;

pub use admin::handle_admin_commands;
pub use runtime::handle_runtime_commands;
