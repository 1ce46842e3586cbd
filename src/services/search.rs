use crate::domain::constants::AUR_REPO;
use crate::domain::models::SearchHit;
use crate::index;
use crate::services::config::SearchConfig;
use crate::services::online::search_online;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

pub fn is_aur(repo: &str) -> bool {
    repo.eq_ignore_ascii_case(AUR_REPO)
}

pub fn install_command(name: &str, repo: &str) -> String {
    if is_aur(repo) {
        format!("yay -S {}", name)
    } else {
        format!("sudo pacman -S {}", name)
    }
}

/// Monotonic search ticket. Every new search bumps it; results carrying an
/// older ticket are stale and get dropped by whoever consumes them.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current() == ticket
    }
}

pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub offline_only: bool,
    pub index_path: &'a Path,
}

pub fn offline_hits(index_path: &Path, query: &str, limit: usize) -> Vec<SearchHit> {
    match index::load(index_path) {
        Ok(idx) => idx.search(query, limit).into_iter().map(index::to_hit).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "offline index unavailable");
            Vec::new()
        }
    }
}

/// Online hits first (official, then AUR), followed by offline hits whose
/// name was not already returned online.
pub fn merge(online: Vec<SearchHit>, offline: Vec<SearchHit>) -> Vec<SearchHit> {
    let online_names: HashSet<String> = online.iter().map(|h| h.name.to_lowercase()).collect();
    let mut out = online;
    out.extend(
        offline
            .into_iter()
            .filter(|h| !online_names.contains(&h.name.to_lowercase())),
    );
    out
}

pub fn search(cfg: &SearchConfig, req: &SearchRequest) -> anyhow::Result<Vec<SearchHit>> {
    let query = req.query.trim();
    if query.is_empty() {
        anyhow::bail!("search query is empty");
    }
    let online = if req.offline_only {
        Vec::new()
    } else {
        search_online(cfg, query)?.into_vec()
    };
    let offline = offline_hits(req.index_path, query, cfg.offline_limit);
    tracing::info!(
        query,
        online = online.len(),
        offline = offline.len(),
        "search finished"
    );
    Ok(merge(online, offline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::HitSource;

    fn hit(name: &str, source: HitSource) -> SearchHit {
        SearchHit {
            name: name.to_string(),
            repo: "extra".to_string(),
            desc: String::new(),
            source,
            install_command: install_command(name, "extra"),
            icon: None,
        }
    }

    #[test]
    fn install_command_depends_on_repo() {
        assert_eq!(install_command("paru-bin", "AUR"), "yay -S paru-bin");
        assert_eq!(install_command("paru-bin", "aur"), "yay -S paru-bin");
        assert_eq!(install_command("vlc", "extra"), "sudo pacman -S vlc");
        assert_eq!(install_command("vlc", "Video players"), "sudo pacman -S vlc");
    }

    #[test]
    fn merge_drops_offline_duplicates_case_insensitively() {
        let online = vec![hit("GIMP", HitSource::Online), hit("krita", HitSource::Online)];
        let offline = vec![
            hit("gimp", HitSource::Offline),
            hit("pinta", HitSource::Offline),
        ];
        let merged = merge(online, offline);
        let names: Vec<_> = merged.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["GIMP", "krita", "pinta"]);
        assert_eq!(merged[2].source, HitSource::Offline);
    }

    #[test]
    fn merge_keeps_online_duplicates_across_sources() {
        let online = vec![hit("yay", HitSource::Online), hit("yay", HitSource::Online)];
        assert_eq!(merge(online, vec![]).len(), 2);
    }

    #[test]
    fn generation_marks_older_tickets_stale() {
        let gen = Generation::default();
        let first = gen.begin();
        assert!(gen.is_current(first));
        let second = gen.begin();
        assert!(second > first);
        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
    }

    #[test]
    fn empty_query_is_rejected() {
        let cfg = SearchConfig::default();
        let req = SearchRequest {
            query: "   ",
            offline_only: true,
            index_path: Path::new("/nonexistent/db.json"),
        };
        assert!(search(&cfg, &req).is_err());
    }

    #[test]
    fn missing_index_gives_no_offline_hits() {
        assert!(offline_hits(Path::new("/nonexistent/db.json"), "x", 12).is_empty());
    }
}
