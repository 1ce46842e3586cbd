use crate::services::{pkg, search};
use crate::*;
use std::path::Path;

pub fn handle_runtime_commands(cli: &Cli, cfg: &Config, index_path: &Path) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Search {
            query,
            offline,
            icons,
        } => {
            let query = query.join(" ");
            let generation = Generation::default();
            let ticket = generation.begin();
            let mut hits = search::search(
                &cfg.search,
                &SearchRequest {
                    query: &query,
                    offline_only: *offline,
                    index_path,
                },
            )?;

            if *icons && !hits.is_empty() {
                let names: Vec<String> = hits.iter().map(|h| h.name.clone()).collect();
                let cache = icon_cache_dir()?;
                fetch_icons(&cfg.icons, &cache, &names, &generation, ticket, |icon| {
                    for h in hits.iter_mut().filter(|h| h.name.eq_ignore_ascii_case(&icon.name)) {
                        h.icon = Some(icon.path.clone());
                    }
                })?;
            }

            if !cli.json && hits.is_empty() {
                println!("no packages found for '{}'", query);
                return Ok(());
            }
            print_out(cli.json, &hits, |h| {
                let mut row = format!(
                    "{}\t{}\t{}\t{}",
                    h.repo,
                    h.name,
                    ellipsize(&h.desc, 80),
                    h.install_command
                );
                if let Some(icon) = &h.icon {
                    row.push('\t');
                    row.push_str(icon);
                }
                row
            })?;
        }
        Commands::Command { name, aur } => {
            let repo = if *aur { AUR_REPO } else { "official" };
            let report = CommandReport {
                name: name.clone(),
                repo: repo.to_string(),
                command: install_command(name, repo),
            };
            print_one(cli.json, report, |r| r.command.clone())?;
        }
        Commands::Installed { name } => {
            let report = InstalledReport {
                name: name.clone(),
                installed: is_installed(name),
            };
            print_one(cli.json, report, |r| {
                format!(
                    "{}\t{}",
                    r.name,
                    if r.installed { "installed" } else { "not installed" }
                )
            })?;
        }
        Commands::Install {
            name,
            aur,
            password_stdin,
        } => {
            let req = PkgRequest {
                name: name.clone(),
                action: PkgAction::Install,
                aur: *aur,
                password: read_password(*password_stdin)?,
            };
            run_pkg(cli.json, &req)?;
        }
        Commands::Uninstall {
            name,
            password_stdin,
        } => {
            let req = PkgRequest {
                name: name.clone(),
                action: PkgAction::Uninstall,
                aur: false,
                password: read_password(*password_stdin)?,
            };
            run_pkg(cli.json, &req)?;
        }
        Commands::Icons { names } => {
            let generation = Generation::default();
            let ticket = generation.begin();
            let cache = icon_cache_dir()?;
            let mut found = Vec::new();
            fetch_icons(&cfg.icons, &cache, names, &generation, ticket, |icon| {
                found.push(icon)
            })?;
            // Keep the caller's order instead of completion order.
            found.sort_by_key(|icon| names.iter().position(|n| *n == icon.name));
            print_out(cli.json, &found, |i| {
                format!("{}\t{}\t{}", i.name, i.domain, i.path)
            })?;
        }
        Commands::Db { .. } | Commands::Stage { .. } => {}
    }
    Ok(())
}

fn read_password(from_stdin: bool) -> anyhow::Result<Option<String>> {
    if !from_stdin {
        return Ok(None);
    }
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let pw = line.trim_end_matches(['\r', '\n']).to_string();
    if pw.is_empty() {
        anyhow::bail!("--password-stdin given but stdin had no password");
    }
    Ok(Some(pw))
}

fn action_name(action: PkgAction) -> &'static str {
    match action {
        PkgAction::Install => "install",
        PkgAction::Uninstall => "uninstall",
    }
}

fn run_pkg(json: bool, req: &PkgRequest) -> anyhow::Result<()> {
    let attempt = pkg::plan(req).map_err(anyhow::Error::from).and_then(|plan| {
        if !json {
            println!("running: {}", plan.display.join(" "));
        }
        pkg::run(req, &plan, |line| {
            if !json {
                println!("{}", line);
            }
        })
    });
    let outcome = match attempt {
        Ok(outcome) => outcome,
        Err(e) => {
            audit(
                action_name(req.action),
                serde_json::json!({
                    "name": req.name,
                    "success": false,
                    "error": e.to_string(),
                }),
            );
            return Err(e);
        }
    };

    audit(
        action_name(req.action),
        serde_json::json!({
            "name": outcome.name,
            "command": outcome.command,
            "success": outcome.success,
        }),
    );

    let verb = match req.action {
        PkgAction::Install => "installation",
        PkgAction::Uninstall => "uninstall",
    };
    if json {
        print_json(outcome.success, &outcome)?;
    } else if outcome.success {
        println!("{} of {} complete", verb, outcome.name);
    }
    if !outcome.success {
        anyhow::bail!("{} of {} failed", verb, outcome.name);
    }
    Ok(())
}
