pub const APP_DIR_NAME: &str = "aura-find";

pub const OFFICIAL_SEARCH_URL: &str = "https://archlinux.org/packages/search/json/";
pub const AUR_RPC_URL: &str = "https://aur.archlinux.org/rpc/";
pub const ICON_ENDPOINT: &str = "https://icons.duckduckgo.com/ip3";

pub const ONLINE_TIMEOUT_MS: u64 = 5000;
pub const ONLINE_LIMIT: usize = 10;
pub const OFFLINE_LIMIT: usize = 12;

pub const ICON_TIMEOUT_MS: u64 = 1500;
pub const ICON_WORKERS: usize = 6;
pub const ICON_MIN_BYTES: usize = 200;
pub const ICON_MIN_WIDTH: u32 = 8;

pub const SYSTEM_INDEX_PATH: &str = "/usr/share/aura-find/data/real_db.json";
pub const DEFAULT_WIKI_DIR: &str = "/usr/share/doc/arch-wiki/html/en";

pub const NO_DESCRIPTION: &str = "No description.";
pub const WIKI_REPO: &str = "Wiki";
pub const AUR_REPO: &str = "AUR";
