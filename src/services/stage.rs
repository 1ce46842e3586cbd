//! Package-root staging, the `package()` step of the distribution build.
//!
//! Lays out
//! - `/usr/share/<pkg>/<script>` (755)
//! - `/usr/share/<pkg>/data/<index>` (644)
//! - `/usr/share/applications/<desktop>` (644)
//! - `/usr/bin/<pkg>` (755, generated launcher)
//!
//! under a package root. Every input is read and checked before the first
//! write, so a missing or corrupt source never leaves a partial tree behind.

use crate::domain::models::{StageReport, StagedFile};
use crate::services::storage::write_atomic;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const DIR_MODE: u32 = 0o755;
pub const EXEC_MODE: u32 = 0o755;
pub const DATA_MODE: u32 = 0o644;
const SKIP: &str = "SKIP";

#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("source file missing: {0}")]
    MissingSource(PathBuf),
    #[error("{0:?} is not a plain file name")]
    InvalidName(String),
    #[error("bad checksum argument {0:?} (expected FILE=<sha256 hex> or FILE=SKIP)")]
    BadChecksumArg(String),
    #[error("checksum declared for unknown source {0:?}")]
    UnknownChecksumFile(String),
    #[error("sha256 mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Clone)]
pub struct StageRequest {
    pub pkgdir: PathBuf,
    pub pkgname: String,
    pub srcdir: PathBuf,
    pub script: String,
    pub index: String,
    pub desktop: String,
    pub interpreter: String,
    pub checksums: Vec<String>,
}

struct Source {
    name: String,
    bytes: Vec<u8>,
    sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn plain_name(name: &str) -> Result<(), StageError> {
    let ok = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\0');
    if ok {
        Ok(())
    } else {
        Err(StageError::InvalidName(name.to_string()))
    }
}

pub fn parse_checksum(raw: &str) -> Result<(String, String), StageError> {
    let (file, sum) = raw
        .split_once('=')
        .ok_or_else(|| StageError::BadChecksumArg(raw.to_string()))?;
    let valid_hex = sum.len() == 64 && sum.chars().all(|c| c.is_ascii_hexdigit());
    if file.is_empty() || !(sum == SKIP || valid_hex) {
        return Err(StageError::BadChecksumArg(raw.to_string()));
    }
    if sum == SKIP {
        return Ok((file.to_string(), SKIP.to_string()));
    }
    Ok((file.to_string(), sum.to_ascii_lowercase()))
}

/// Quotes `word` for `/bin/sh` unless it is made only of characters the
/// shell passes through untouched.
pub fn sh_quote(word: &str) -> String {
    let bare = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./+:,@%=".contains(c));
    if bare {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}

pub fn shim_script(interpreter: &str, pkgname: &str, script: &str) -> String {
    let target = format!("/usr/share/{}/{}", pkgname, script);
    format!(
        "#!/bin/sh\nexec {} {} \"$@\"\n",
        sh_quote(interpreter),
        sh_quote(&target)
    )
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> anyhow::Result<()> {
    Ok(())
}

fn read_sources(req: &StageRequest) -> anyhow::Result<Vec<Source>> {
    let mut sources = Vec::new();
    for name in [&req.script, &req.index, &req.desktop] {
        plain_name(name)?;
        let path = req.srcdir.join(name);
        if !path.is_file() {
            return Err(StageError::MissingSource(path).into());
        }
        let bytes = std::fs::read(&path)?;
        sources.push(Source {
            name: name.clone(),
            sha256: sha256_hex(&bytes),
            bytes,
        });
    }

    for raw in &req.checksums {
        let (file, expected) = parse_checksum(raw)?;
        let src = sources
            .iter()
            .find(|s| s.name == file)
            .ok_or_else(|| StageError::UnknownChecksumFile(file.clone()))?;
        if expected != SKIP && expected != src.sha256 {
            return Err(StageError::ChecksumMismatch {
                file,
                expected,
                actual: src.sha256.clone(),
            }
            .into());
        }
    }
    Ok(sources)
}

fn place(root: &Path, rel: &str, bytes: &[u8], mode: u32) -> anyhow::Result<StagedFile> {
    let dest = root.join(rel.trim_start_matches('/'));
    write_atomic(&dest, bytes)?;
    set_mode(&dest, mode)?;
    Ok(StagedFile {
        path: rel.to_string(),
        mode: format!("{:o}", mode),
        sha256: sha256_hex(bytes),
    })
}

pub fn stage(req: &StageRequest) -> anyhow::Result<StageReport> {
    plain_name(&req.pkgname)?;
    let sources = read_sources(req)?;
    let [script, index, desktop] = match <[Source; 3]>::try_from(sources) {
        Ok(s) => s,
        Err(_) => anyhow::bail!("expected exactly three staged sources"),
    };

    let share = format!("/usr/share/{}", req.pkgname);
    let dirs = [
        share.clone(),
        format!("{}/data", share),
        "/usr/share/applications".to_string(),
        "/usr/bin".to_string(),
    ];
    for rel in &dirs {
        let dir = req.pkgdir.join(rel.trim_start_matches('/'));
        std::fs::create_dir_all(&dir)?;
        set_mode(&dir, DIR_MODE)?;
    }

    let shim = shim_script(&req.interpreter, &req.pkgname, &script.name);
    let files = vec![
        place(
            &req.pkgdir,
            &format!("{}/{}", share, script.name),
            &script.bytes,
            EXEC_MODE,
        )?,
        place(
            &req.pkgdir,
            &format!("{}/data/{}", share, index.name),
            &index.bytes,
            DATA_MODE,
        )?,
        place(
            &req.pkgdir,
            &format!("/usr/share/applications/{}", desktop.name),
            &desktop.bytes,
            DATA_MODE,
        )?,
        place(
            &req.pkgdir,
            &format!("/usr/bin/{}", req.pkgname),
            shim.as_bytes(),
            EXEC_MODE,
        )?,
    ];
    tracing::info!(root = %req.pkgdir.display(), files = files.len(), "package root staged");

    Ok(StageReport {
        root: req.pkgdir.to_string_lossy().to_string(),
        directories: dirs.to_vec(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shim_forwards_all_arguments() {
        assert_eq!(
            shim_script("python", "aura-find", "gui.py"),
            "#!/bin/sh\nexec python /usr/share/aura-find/gui.py \"$@\"\n"
        );
    }

    #[test]
    fn shim_quotes_words_the_shell_would_split_or_expand() {
        assert_eq!(sh_quote("python"), "python");
        assert_eq!(sh_quote("my gui.py"), "'my gui.py'");
        assert_eq!(sh_quote("$(id)"), "'$(id)'");
        assert_eq!(sh_quote("it's"), "'it'\\''s'");
        assert_eq!(sh_quote(""), "''");
        assert_eq!(
            shim_script("python", "aura-find", "my gui.py"),
            "#!/bin/sh\nexec python '/usr/share/aura-find/my gui.py' \"$@\"\n"
        );
    }

    #[test]
    fn checksum_arguments_are_validated() {
        let hex = "a".repeat(64);
        assert_eq!(
            parse_checksum(&format!("gui.py={}", hex)).unwrap(),
            ("gui.py".to_string(), hex.clone())
        );
        assert_eq!(parse_checksum("gui.py=SKIP").unwrap().1, "SKIP");
        assert!(parse_checksum("gui.py").is_err());
        assert!(parse_checksum("gui.py=skip").is_err());
        assert!(parse_checksum("gui.py=abc").is_err());
        assert!(parse_checksum(&format!("={}", hex)).is_err());
    }

    #[test]
    fn names_with_separators_are_rejected() {
        assert!(plain_name("gui.py").is_ok());
        assert!(plain_name("../etc/passwd").is_err());
        assert!(plain_name("..").is_err());
        assert!(plain_name("").is_err());
    }
}
