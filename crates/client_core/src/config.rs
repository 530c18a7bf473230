use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::{engagement::DEFAULT_VIEW_DEDUP_WINDOW, feed::DEFAULT_PAGE_SIZE};

pub const DEFAULT_SETTINGS_FILE: &str = "blog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    /// Origin of the web front end, used for shareable blog links.
    pub site_url: String,
    pub database_url: String,
    pub page_size: usize,
    pub view_dedup_window_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            site_url: "http://localhost:3000".into(),
            database_url: "sqlite://./data/client.db".into(),
            page_size: DEFAULT_PAGE_SIZE,
            view_dedup_window_ms: DEFAULT_VIEW_DEDUP_WINDOW.as_millis() as u64,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn view_dedup_window(&self) -> Duration {
        Duration::from_millis(self.view_dedup_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Every key optional; absent keys keep the default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    site_url: Option<String>,
    database_url: Option<String>,
    page_size: Option<usize>,
    view_dedup_window_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `path` (or `blog.toml` in the working directory) if present,
/// then environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        apply_file(&mut settings, file_cfg);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    normalize(&mut settings);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.site_url {
        settings.site_url = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.view_dedup_window_ms {
        settings.view_dedup_window_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: String) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("config: ignoring unparsable {key}={raw}");
            None
        }
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("BLOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__SITE_URL") {
        settings.site_url = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE").and_then(|v| parse_env("APP__PAGE_SIZE", v)) {
        settings.page_size = v;
    }
    if let Some(v) = var("APP__VIEW_DEDUP_WINDOW_MS")
        .and_then(|v| parse_env("APP__VIEW_DEDUP_WINDOW_MS", v))
    {
        settings.view_dedup_window_ms = v;
    }
    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS")
        .and_then(|v| parse_env("APP__REQUEST_TIMEOUT_SECS", v))
    {
        settings.request_timeout_secs = v;
    }
}

fn normalize(settings: &mut Settings) {
    let trimmed = settings.api_base_url.trim().trim_end_matches('/');
    settings.api_base_url = if trimmed.is_empty() {
        Settings::default().api_base_url
    } else {
        trimmed.to_string()
    };

    let site = settings.site_url.trim().trim_end_matches('/');
    settings.site_url = if site.is_empty() {
        Settings::default().site_url
    } else {
        site.to_string()
    };

    if settings.database_url.trim().is_empty() {
        settings.database_url = Settings::default().database_url;
    }
    if settings.page_size == 0 {
        settings.page_size = DEFAULT_PAGE_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn env_overrides_file_and_later_aliases_win() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            toml::from_str(
                r#"
                api_base_url = "http://file.example:9000/"
                page_size = 25
                "#,
            )
            .expect("toml"),
        );

        let env: HashMap<&str, &str> = HashMap::from([
            ("BLOG_API_URL", "http://env.example"),
            ("APP__API_BASE_URL", "http://app.example/"),
            ("APP__VIEW_DEDUP_WINDOW_MS", "500"),
            ("APP__SITE_URL", "https://blog.example/"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));
        normalize(&mut settings);

        assert_eq!(settings.api_base_url, "http://app.example");
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.site_url, "https://blog.example");
        assert_eq!(settings.view_dedup_window(), Duration::from_millis(500));
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn zero_page_size_falls_back_to_default() {
        let mut settings = Settings {
            page_size: 0,
            api_base_url: "  ".into(),
            ..Settings::default()
        };
        normalize(&mut settings);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.api_base_url, Settings::default().api_base_url);
    }

    #[test]
    fn loads_settings_file_from_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("client.toml");
        fs::write(&path, "database_url = \"sqlite::memory:\"\npage_size = 5\n").expect("write");

        let settings = load_settings(Some(&path)).expect("settings");
        assert_eq!(settings.page_size, 5);
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("client.toml");
        fs::write(&path, "page_size = \"many\"").expect("write");

        assert!(load_settings(Some(&path)).is_err());
    }
}
