use std::{env, path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;

use crate::{
    BASE_URL, CACHE_FILE, CACHE_TTL_DAYS, CATEGORY_ANCHOR, GAME_IDS_FILE, INDEX_PATH, OUT_FOLDER,
    REQUEST_DELAY_MS, REQUEST_TIMEOUT_SECS, TEAMS_PATH, USER_AGENT,
};

/// Everything a harvesting run needs to know about where to read from and write to.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub index_path: String,
    pub teams_path: String,
    pub category_anchor: String,
    pub out_dir: PathBuf,
    pub cache_file: PathBuf,
    pub game_ids_file: PathBuf,
    /// Minimum spacing between two outbound requests.
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub cache_ttl: chrono::Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            index_path: INDEX_PATH.into(),
            teams_path: TEAMS_PATH.into(),
            category_anchor: CATEGORY_ANCHOR.into(),
            out_dir: OUT_FOLDER.into(),
            cache_file: CACHE_FILE.into(),
            game_ids_file: GAME_IDS_FILE.into(),
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            cache_ttl: chrono::Duration::days(CACHE_TTL_DAYS),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl Config {
    /// Defaults, overridden by any `UMASCRAP_*` variables present in the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base_url) = env_var::<String>("UMASCRAP_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(out_dir) = env_var::<PathBuf>("UMASCRAP_OUT_DIR") {
            config.out_dir = out_dir;
        }
        if let Some(cache_file) = env_var::<PathBuf>("UMASCRAP_CACHE_FILE") {
            config.cache_file = cache_file;
        }
        if let Some(game_ids_file) = env_var::<PathBuf>("UMASCRAP_GAME_IDS_FILE") {
            config.game_ids_file = game_ids_file;
        }
        if let Some(delay_ms) = env_var::<u64>("UMASCRAP_DELAY_MS") {
            config.request_delay = Duration::from_millis(delay_ms);
        }
        config
    }

    /// Absolute URL of a site-relative path such as `/Special_Week`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn index_url(&self) -> String {
        self.url(&self.index_path)
    }

    pub fn teams_url(&self) -> String {
        self.url(&self.teams_path)
    }
}

fn env_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
