use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HitSource {
    Online,
    Offline,
}

#[derive(Debug, Serialize, Clone)]
pub struct SearchHit {
    pub name: String,
    pub repo: String,
    pub desc: String,
    pub source: HitSource,
    pub install_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// On-disk offline index. The layout is shared with the wiki builder and
/// must stay `{"apps":[{"name","desc","category"}]}`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct IndexFile {
    #[serde(default)]
    pub apps: Vec<IndexedApp>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct IndexedApp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PkgAction {
    Install,
    Uninstall,
}

#[derive(Debug, Serialize)]
pub struct PkgOutcome {
    pub name: String,
    pub action: PkgAction,
    pub command: Vec<String>,
    pub success: bool,
    pub lines: Vec<String>,
}

#[derive(Serialize)]
pub struct InstalledReport {
    pub name: String,
    pub installed: bool,
}

#[derive(Serialize)]
pub struct CommandReport {
    pub name: String,
    pub repo: String,
    pub command: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct IconHit {
    pub name: String,
    pub domain: String,
    pub path: String,
    pub bytes: usize,
}

#[derive(Serialize)]
pub struct DbBuildReport {
    pub files: Vec<String>,
    pub apps: usize,
    pub output: String,
}

#[derive(Serialize)]
pub struct DbStatus {
    pub path: String,
    pub exists: bool,
    pub apps: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct StagedFile {
    pub path: String,
    pub mode: String,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct StageReport {
    pub root: String,
    pub directories: Vec<String>,
    pub files: Vec<StagedFile>,
}
