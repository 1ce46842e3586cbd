use crate::index;
use crate::services::wiki;
use crate::*;
use std::path::{Path, PathBuf};

pub fn handle_admin_commands(cli: &Cli, cfg: &Config, index_path: &Path) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Db { command } => handle_db_commands(cli, cfg, index_path, command)?,
        Commands::Stage {
            pkgdir,
            pkgname,
            srcdir,
            script,
            index,
            desktop,
            interpreter,
            checksums,
        } => {
            let req = StageRequest {
                pkgdir: pkgdir.clone(),
                pkgname: pkgname.clone(),
                srcdir: srcdir.clone(),
                script: script.clone(),
                index: index.clone(),
                desktop: desktop
                    .clone()
                    .unwrap_or_else(|| format!("{}.desktop", pkgname)),
                interpreter: interpreter.clone(),
                checksums: checksums.clone(),
            };
            let report = stage(&req)?;
            if cli.json {
                print_json(true, report)?;
            } else {
                for f in &report.files {
                    println!("{}\t{}\t{}", f.mode, f.path, f.sha256);
                }
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn handle_db_commands(
    cli: &Cli,
    cfg: &Config,
    index_path: &Path,
    command: &DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Build { wiki_dir, out } => {
            let wiki_dir = wiki_dir
                .clone()
                .or_else(|| cfg.index.wiki_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WIKI_DIR));
            // The packaged index under /usr/share is read-only for users, so
            // rebuilds land in the per-user location unless told otherwise.
            let out = match out {
                Some(p) => p.clone(),
                None if cli.db.is_some() || cfg.index.path.is_some() => index_path.to_path_buf(),
                None => user_index_path()?,
            };
            let report = wiki::build_index(&wiki_dir, &out)?;
            print_one(cli.json, report, |r| {
                format!(
                    "extracted {} applications from {} pages into {}",
                    r.apps,
                    r.files.len(),
                    r.output
                )
            })?;
        }
        DbCommands::Status => {
            let (exists, apps) = match index::load(index_path) {
                Ok(idx) => (true, idx.apps.len()),
                Err(index::IndexError::Missing(_)) => (false, 0),
                Err(e) => return Err(e.into()),
            };
            let status = DbStatus {
                path: index_path.to_string_lossy().to_string(),
                exists,
                apps,
            };
            print_one(cli.json, status, |s| {
                if s.exists {
                    format!("offline index ok\t{}\t{} apps", s.path, s.apps)
                } else {
                    format!("offline index missing\t{}", s.path)
                }
            })?;
        }
    }
    Ok(())
}
