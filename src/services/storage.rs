use crate::domain::constants::{APP_DIR_NAME, SYSTEM_INDEX_PATH};
use crate::services::config::Config;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

// Icon workers may write the same cache file concurrently.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home))
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".config").join(APP_DIR_NAME))
}

pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?
        .join(".local")
        .join("share")
        .join(APP_DIR_NAME))
}

pub fn icon_cache_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".cache").join(APP_DIR_NAME).join("icons"))
}

pub fn user_index_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("real_db.json"))
}

/// Picks the offline index: explicit flag, config, the packaged copy, then
/// the per-user copy written by `db build`.
pub fn resolve_index_path(flag: Option<&Path>, cfg: &Config) -> anyhow::Result<PathBuf> {
    if let Some(p) = flag {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = &cfg.index.path {
        return Ok(p.clone());
    }
    let system = PathBuf::from(SYSTEM_INDEX_PATH);
    if system.exists() {
        return Ok(system);
    }
    user_index_path()
}

pub fn audit(action: &str, data: serde_json::Value) {
    let path = match config_dir() {
        Ok(d) => d.join("audit.jsonl"),
        Err(_) => return,
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": unix_now(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let res = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
    if let Err(e) = res {
        tracing::warn!(path = %path.display(), error = %e, "audit log write failed");
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn temp_path_for(dest: &Path) -> anyhow::Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("{} has no parent", dest.display()))?;
    let name = dest
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("{} has no file name", dest.display()))?
        .to_string_lossy();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    Ok(parent.join(format!(".{}.tmp-{}-{}", name, std::process::id(), seq)))
}

/// Writes through a sibling temp file so readers never see a half-written file.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path_for(dest)?;
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(anyhow::anyhow!(
            "rename {} -> {}: {}",
            tmp.display(),
            dest.display(),
            e
        ));
    }
    Ok(())
}
