use crate::domain::models::{PkgAction, PkgOutcome};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;

const AUR_HELPERS: [&str; 2] = ["yay", "paru"];

#[derive(thiserror::Error, Debug)]
pub enum PkgError {
    #[error("{0} not found on PATH. Are you on Arch Linux?")]
    ToolMissing(&'static str),
    #[error("no AUR helper found (yay or paru)")]
    NoAurHelper,
}

/// Searches `PATH` the way a shell would.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(p: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(p)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(p: &std::path::Path) -> bool {
    p.is_file()
}

fn require(name: &'static str) -> Result<PathBuf, PkgError> {
    find_tool(name).ok_or(PkgError::ToolMissing(name))
}

pub fn is_installed(name: &str) -> bool {
    let Some(pacman) = find_tool("pacman") else {
        return false;
    };
    Command::new(pacman)
        .args(["-Q", name])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct PkgRequest {
    pub name: String,
    pub action: PkgAction,
    pub aur: bool,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Plan {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Printable form, e.g. `["sudo", "pacman", "-S", "--noconfirm", "vlc"]`.
    pub display: Vec<String>,
    pub password: Option<String>,
    pub askpass: bool,
}

fn sudo_plan(pacman_args: Vec<String>, password: Option<String>) -> Result<Plan, PkgError> {
    let sudo = require("sudo")?;
    require("pacman")?;
    let mut display = vec!["sudo".to_string(), "pacman".to_string()];
    display.extend(pacman_args.iter().cloned());

    let mut args = Vec::new();
    if password.is_some() {
        args.extend(["-S".to_string(), "-k".to_string()]);
    }
    args.push("pacman".to_string());
    args.extend(pacman_args);
    Ok(Plan {
        program: sudo,
        args,
        display,
        password,
        askpass: false,
    })
}

pub fn plan(req: &PkgRequest) -> Result<Plan, PkgError> {
    match req.action {
        PkgAction::Uninstall => sudo_plan(
            vec!["-Rns".into(), "--noconfirm".into(), req.name.clone()],
            req.password.clone(),
        ),
        PkgAction::Install if req.aur => {
            let (helper, path) = AUR_HELPERS
                .iter()
                .find_map(|h| find_tool(h).map(|p| (*h, p)))
                .ok_or(PkgError::NoAurHelper)?;
            let args = vec!["-S".to_string(), "--noconfirm".to_string(), req.name.clone()];
            let mut display = vec![helper.to_string()];
            display.extend(args.iter().cloned());
            Ok(Plan {
                program: path,
                args,
                display,
                password: req.password.clone(),
                askpass: true,
            })
        }
        PkgAction::Install => sudo_plan(
            vec!["-S".into(), "--noconfirm".into(), req.name.clone()],
            req.password.clone(),
        ),
    }
}

/// sudo echoes its prompt back on the merged stream; it is noise for users.
pub fn is_prompt_line(line: &str) -> bool {
    line.to_lowercase().starts_with("[sudo]") || line.ends_with("password:")
}

fn pump(reader: impl Read, tx: mpsc::Sender<String>) {
    for line in BufReader::new(reader).lines() {
        let Ok(line) = line else { break };
        if tx.send(line).is_err() {
            break;
        }
    }
}

/// Runs the plan, merging stdout and stderr line by line. Every visible
/// line is handed to `on_line` as it arrives and kept in the outcome.
pub fn run(
    req: &PkgRequest,
    plan: &Plan,
    mut on_line: impl FnMut(&str),
) -> anyhow::Result<PkgOutcome> {
    tracing::info!(command = %plan.display.join(" "), "running package command");
    let mut cmd = Command::new(&plan.program);
    cmd.args(&plan.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if plan.password.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
    if plan.askpass {
        cmd.env("SUDO_ASKPASS", "/bin/true");
    }
    let mut child = cmd
        .spawn()
        .map_err(|e| anyhow::anyhow!("cannot start {}: {}", plan.program.display(), e))?;

    if let (Some(pw), Some(mut stdin)) = (&plan.password, child.stdin.take()) {
        if let Err(e) = stdin.write_all(format!("{}\n", pw).as_bytes()) {
            tracing::warn!(error = %e, "could not feed password to child");
        }
    }

    let (tx, rx) = mpsc::channel();
    let mut lines = Vec::new();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    std::thread::scope(|s| {
        if let Some(out) = stdout {
            let tx = tx.clone();
            s.spawn(move || pump(out, tx));
        }
        if let Some(err) = stderr {
            let tx = tx.clone();
            s.spawn(move || pump(err, tx));
        }
        drop(tx);
        for line in rx {
            let line = line.trim_end().to_string();
            if is_prompt_line(&line) {
                continue;
            }
            on_line(&line);
            lines.push(line);
        }
    });

    let status = child.wait()?;
    Ok(PkgOutcome {
        name: req.name.clone(),
        action: req.action,
        command: plan.display.clone(),
        success: status.success(),
        lines,
    })
}
