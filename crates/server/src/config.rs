use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub event_store_url: String,
    pub template_dir: PathBuf,
    pub template_reload: bool,
    pub base_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8082".into(),
            event_store_url: "http://127.0.0.1:8080".into(),
            template_dir: PathBuf::from("templates"),
            template_reload: true,
            base_path: "/".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    event_store_url: Option<String>,
    template_dir: Option<PathBuf>,
    template_reload: Option<bool>,
    base_path: Option<String>,
}

/// Defaults, then `dashboard.toml` if present, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(file = SETTINGS_FILE, %error, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.event_store_url {
        settings.event_store_url = v;
    }
    if let Some(v) = file_cfg.template_dir {
        settings.template_dir = v;
    }
    if let Some(v) = file_cfg.template_reload {
        settings.template_reload = v;
    }
    if let Some(v) = file_cfg.base_path {
        settings.base_path = v;
    }
}

/// Each setting reads a plain variable and then its `APP__` form, the latter winning.
fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let lookup = |plain: &str, prefixed: &str| var(prefixed).or_else(|| var(plain));

    if let Some(v) = lookup("DASHBOARD_BIND", "APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("EVENT_STORE_URL", "APP__EVENT_STORE_URL") {
        settings.event_store_url = v;
    }
    if let Some(v) = lookup("TEMPLATE_DIR", "APP__TEMPLATE_DIR") {
        settings.template_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("TEMPLATE_RELOAD", "APP__TEMPLATE_RELOAD") {
        match parse_bool(&v) {
            Some(reload) => settings.template_reload = reload,
            None => warn!(value = %v, "ignoring invalid TEMPLATE_RELOAD value"),
        }
    }
    if let Some(v) = lookup("BASE_PATH", "APP__BASE_PATH") {
        settings.base_path = v;
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
