use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub database_url: String,
    pub log_filter: String,
    pub lpa_store_url: String,
    pub address_lookup_url: String,
    pub public_url: Option<String>,
    pub event_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/lpa.db".into(),
            log_filter: "info".into(),
            lpa_store_url: "http://127.0.0.1:8081".into(),
            address_lookup_url: "http://127.0.0.1:8082".into(),
            public_url: None,
            event_capacity: 256,
        }
    }
}

/// Keys accepted in `server.toml`. Anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    log_filter: Option<String>,
    lpa_store_url: Option<String>,
    address_lookup_url: Option<String>,
    public_url: Option<String>,
    event_capacity: Option<usize>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment variables.
/// `APP__` prefixed names win over the bare ones.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.bind = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.log_filter {
                    settings.log_filter = v;
                }
                if let Some(v) = file_cfg.lpa_store_url {
                    settings.lpa_store_url = v;
                }
                if let Some(v) = file_cfg.address_lookup_url {
                    settings.address_lookup_url = v;
                }
                if file_cfg.public_url.is_some() {
                    settings.public_url = file_cfg.public_url;
                }
                if let Some(v) = file_cfg.event_capacity {
                    settings.event_capacity = v;
                }
            }
            Err(err) => eprintln!("ignoring unreadable server.toml: {err}"),
        }
    }

    let var = |bare: &str, prefixed: &str| env(prefixed).or_else(|| env(bare));

    if let Some(v) = var("SERVER_BIND", "APP__BIND_ADDR") {
        settings.bind = v;
    }
    if let Some(v) = var("DATABASE_URL", "APP__DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("RUST_LOG", "APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("LPA_STORE_URL", "APP__LPA_STORE_URL") {
        settings.lpa_store_url = v;
    }
    if let Some(v) = var("ADDRESS_LOOKUP_URL", "APP__ADDRESS_LOOKUP_URL") {
        settings.address_lookup_url = v;
    }
    if let Some(v) = var("SERVER_PUBLIC_URL", "APP__PUBLIC_URL") {
        settings.public_url = Some(v);
    }
    if let Some(parsed) = var("EVENT_CAPACITY", "APP__EVENT_CAPACITY").and_then(|v| v.parse().ok()) {
        settings.event_capacity = parsed;
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(parent) = sqlite_path(database_url).and_then(|path| path.parent().map(Path::to_path_buf))
    else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
