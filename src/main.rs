use clap::Parser;

mod cli;
mod commands;
mod domain;
mod index;
mod services;

pub use cli::*;
pub use commands::{handle_admin_commands, handle_runtime_commands};
pub use domain::constants::*;
pub use domain::models::*;
pub use services::config::{load_config, Config};
pub use services::icons::fetch_all as fetch_icons;
pub use services::output::{ellipsize, print_json, print_one, print_out};
pub use services::pkg::{is_installed, PkgRequest};
pub use services::search::{install_command, Generation, SearchRequest};
pub use services::stage::{stage, StageRequest};
pub use services::storage::{audit, icon_cache_dir, resolve_index_path, user_index_path};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    services::logging::init(cli.verbose);

    let cfg = load_config()?;
    let index_path = resolve_index_path(cli.db.as_deref(), &cfg)?;
    tracing::debug!(index = %index_path.display(), "resolved offline index");

    if handle_admin_commands(&cli, &cfg, &index_path)? {
        return Ok(());
    }
    handle_runtime_commands(&cli, &cfg, &index_path)
}
