use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const SETTINGS_FILE: &str = "admin.toml";
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub page_size: u64,
    pub search_debounce_ms: u64,
    pub state_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            page_size: 10,
            search_debounce_ms: 500,
            state_dir: PathBuf::from("./.studio-admin"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    page_size: Option<u64>,
    search_debounce_ms: Option<u64>,
    state_dir: Option<PathBuf>,
}

impl ClientSettings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// Validated base URL without a trailing slash.
    pub fn api_url(&self) -> Result<String, ClientError> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        Url::parse(trimmed)?;
        Ok(trimmed.to_string())
    }

    fn apply_file(&mut self, raw: &str) {
        let file_cfg = match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => file_cfg,
            Err(error) => {
                warn!(%error, "ignoring unreadable settings file");
                return;
            }
        };
        if let Some(v) = file_cfg.api_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.page_size.filter(|v| *v > 0) {
            self.page_size = v;
        }
        if let Some(v) = file_cfg.search_debounce_ms {
            self.search_debounce_ms = v;
        }
        if let Some(v) = file_cfg.state_dir {
            self.state_dir = v;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("STUDIO_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("APP__API_URL") {
            self.api_base_url = v;
        }

        if let Some(parsed) = var("APP__PAGE_SIZE")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            self.page_size = parsed;
        }

        if let Some(parsed) = var("APP__SEARCH_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.search_debounce_ms = parsed;
        }

        if let Some(v) = var("APP__STATE_DIR") {
            self.state_dir = PathBuf::from(v);
        }
    }
}

/// Defaults, then `admin.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    settings_file: &Path,
    var: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(settings_file) {
        settings.apply_file(&raw);
    }
    settings.apply_env(var);

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
