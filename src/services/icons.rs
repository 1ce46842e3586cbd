use crate::domain::constants::ICON_MIN_WIDTH;
use crate::domain::models::IconHit;
use crate::services::config::IconConfig;
use crate::services::search::Generation;
use crate::services::storage::write_atomic;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

const ICO_MAGIC: [u8; 4] = [0, 0, 1, 0];
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// `gimp-devel` and `gimp_plugins` both map to `gimp.org`, then `gimp.com`.
pub fn guess_domains(pkg_name: &str) -> Vec<String> {
    let lower = pkg_name.to_lowercase();
    let base = lower
        .split('-')
        .next()
        .unwrap_or_default()
        .split('_')
        .next()
        .unwrap_or_default();
    if base.is_empty() {
        return Vec::new();
    }
    vec![format!("{}.org", base), format!("{}.com", base)]
}

/// Declared pixel width of an ICO (first directory entry) or PNG image.
pub fn icon_width(bytes: &[u8]) -> Option<u32> {
    if bytes.len() >= 7 && bytes[..4] == ICO_MAGIC {
        let count = u16::from_le_bytes([bytes[4], bytes[5]]);
        if count == 0 {
            return None;
        }
        return Some(match bytes[6] {
            0 => 256,
            w => u32::from(w),
        });
    }
    if bytes.len() >= 24 && bytes[..8] == PNG_MAGIC {
        return Some(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]));
    }
    None
}

pub fn accept_icon(bytes: &[u8], min_bytes: usize) -> bool {
    bytes.len() > min_bytes && icon_width(bytes).map(|w| w > ICON_MIN_WIDTH).unwrap_or(false)
}

fn cache_file(cache_dir: &Path, domain: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    cache_dir.join(format!("{}.ico", hex::encode(hasher.finalize())))
}

fn download(client: &Client, cfg: &IconConfig, domain: &str) -> anyhow::Result<Vec<u8>> {
    let url = format!("{}/{}.ico", cfg.endpoint.trim_end_matches('/'), domain);
    let resp = client.get(&url).send()?;
    if resp.status() != StatusCode::OK {
        anyhow::bail!("{} answered {}", url, resp.status());
    }
    Ok(resp.bytes()?.to_vec())
}

pub fn fetch_icon(
    client: &Client,
    cfg: &IconConfig,
    cache_dir: &Path,
    pkg_name: &str,
) -> Option<IconHit> {
    for domain in guess_domains(pkg_name) {
        let bytes = match download(client, cfg, &domain) {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(%domain, error = %e, "icon fetch failed");
                continue;
            }
        };
        if !accept_icon(&bytes, cfg.min_bytes) {
            tracing::debug!(%domain, len = bytes.len(), "icon rejected");
            continue;
        }
        let path = cache_file(cache_dir, &domain);
        if let Err(e) = write_atomic(&path, &bytes) {
            tracing::warn!(path = %path.display(), error = %e, "icon cache write failed");
            continue;
        }
        return Some(IconHit {
            name: pkg_name.to_string(),
            domain,
            path: path.to_string_lossy().to_string(),
            bytes: bytes.len(),
        });
    }
    None
}

/// Fetches icons on a bounded worker pool and hands each accepted icon to
/// `on_ready` as soon as it lands. Workers stop picking up names once
/// `ticket` is no longer the current generation, and late results from a
/// stale ticket are discarded.
pub fn fetch_all(
    cfg: &IconConfig,
    cache_dir: &Path,
    names: &[String],
    generation: &Generation,
    ticket: u64,
    mut on_ready: impl FnMut(IconHit),
) -> anyhow::Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let client = Client::builder()
        .timeout(Duration::from_millis(cfg.timeout_ms))
        .build()?;
    let queue: Mutex<VecDeque<&String>> = Mutex::new(names.iter().collect());
    let workers = cfg.workers.clamp(1, names.len());
    let (tx, rx) = mpsc::channel::<IconHit>();

    std::thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            let client = &client;
            s.spawn(move || loop {
                if !generation.is_current(ticket) {
                    break;
                }
                let next = match queue.lock() {
                    Ok(mut q) => q.pop_front(),
                    Err(_) => None,
                };
                let Some(name) = next else { break };
                if let Some(hit) = fetch_icon(client, cfg, cache_dir, name) {
                    if tx.send(hit).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        for hit in rx {
            if generation.is_current(ticket) {
                on_ready(hit);
            }
        }
    });
    Ok(())
}
