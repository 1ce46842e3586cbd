use crate::domain::constants::{NO_DESCRIPTION, WIKI_REPO};
use crate::domain::models::{HitSource, IndexFile, IndexedApp, SearchHit};
use crate::services::search::install_command;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("offline index not found: {0} (run `aura-find db build` first)")]
    Missing(PathBuf),
    #[error("offline index is not valid JSON: {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot read offline index {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct OfflineIndex {
    pub apps: Vec<IndexedApp>,
}

pub fn load(path: &Path) -> Result<OfflineIndex, IndexError> {
    if !path.exists() {
        return Err(IndexError::Missing(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: IndexFile = serde_json::from_str(&raw).map_err(|source| IndexError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(OfflineIndex { apps: file.apps })
}

impl OfflineIndex {
    pub fn search(&self, query: &str, limit: usize) -> Vec<&IndexedApp> {
        let q = query.to_lowercase();
        self.apps
            .iter()
            .filter(|a| {
                a.name.to_lowercase().contains(&q)
                    || a.desc.to_lowercase().contains(&q)
                    || a.category.to_lowercase().contains(&q)
            })
            .take(limit)
            .collect()
    }
}

pub fn to_hit(app: &IndexedApp) -> SearchHit {
    let repo = if app.category.is_empty() {
        WIKI_REPO.to_string()
    } else {
        app.category.clone()
    };
    let desc = if app.desc.is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        app.desc.clone()
    };
    SearchHit {
        install_command: install_command(&app.name, &repo),
        name: app.name.clone(),
        repo,
        desc,
        source: HitSource::Offline,
        icon: None,
    }
}
