use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub api_key: Option<String>,

    // Static translation files
    pub locale_root: PathBuf,
    pub locale_path: String,
    pub default_locale: String,
    pub default_namespace: String,

    // Remote translation provider
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub translate_timeout: Duration,
    pub translate_max_attempts: u32,
    pub translate_concurrency: usize,

    // Bundle cache
    pub cache_capacity: usize,
    pub cache_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", value))?,
            Err(_) => 8080,
        };

        Ok(Self {
            port,
            api_key: non_empty_var("API_KEY"),

            locale_root: std::env::var("LOCALE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("locales")),
            locale_path: std::env::var("LOCALE_PATH")
                .map(|p| normalize_mount_path(&p))
                .unwrap_or_else(|_| "/locales".to_string()),
            default_locale: non_empty_var("DEFAULT_LOCALE").unwrap_or_else(|| "en".to_string()),
            default_namespace: non_empty_var("DEFAULT_NAMESPACE")
                .unwrap_or_else(|| "common".to_string()),

            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| "https://libretranslate.com/translate".to_string()),
            translate_api_key: non_empty_var("TRANSLATE_API_KEY"),
            translate_timeout: Duration::from_secs(parse_var("TRANSLATE_TIMEOUT_SECS", 10)),
            translate_max_attempts: parse_var("TRANSLATE_MAX_ATTEMPTS", 1u32).max(1),
            translate_concurrency: parse_var("TRANSLATE_CONCURRENCY", 1usize).max(1),

            cache_capacity: parse_var("CACHE_CAPACITY", 64usize).max(1),
            cache_ttl: std::env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }

    /// Defaults suitable for tests and local development, rooted at `locale_root`.
    pub fn with_locale_root(locale_root: impl Into<PathBuf>) -> Self {
        Self {
            port: 8080,
            api_key: None,
            locale_root: locale_root.into(),
            locale_path: "/locales".to_string(),
            default_locale: "en".to_string(),
            default_namespace: "common".to_string(),
            translate_api_url: "https://libretranslate.com/translate".to_string(),
            translate_api_key: None,
            translate_timeout: Duration::from_secs(10),
            translate_max_attempts: 1,
            translate_concurrency: 1,
            cache_capacity: 64,
            cache_ttl: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn normalize_mount_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/locales".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "API_KEY",
        "LOCALE_ROOT",
        "LOCALE_PATH",
        "DEFAULT_LOCALE",
        "DEFAULT_NAMESPACE",
        "TRANSLATE_API_URL",
        "TRANSLATE_API_KEY",
        "TRANSLATE_TIMEOUT_SECS",
        "TRANSLATE_MAX_ATTEMPTS",
        "TRANSLATE_CONCURRENCY",
        "CACHE_CAPACITY",
        "CACHE_TTL_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key, None);
        assert_eq!(config.locale_root, PathBuf::from("locales"));
        assert_eq!(config.locale_path, "/locales");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.default_namespace, "common");
        assert_eq!(config.translate_timeout, Duration::from_secs(10));
        assert_eq!(config.translate_max_attempts, 1);
        assert_eq!(config.translate_concurrency, 1);
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.cache_ttl, None);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("PORT", "3000");
        std::env::set_var("API_KEY", "admin-secret");
        std::env::set_var("LOCALE_ROOT", "/srv/locales");
        std::env::set_var("DEFAULT_LOCALE", "pt");
        std::env::set_var("TRANSLATE_MAX_ATTEMPTS", "3");
        std::env::set_var("TRANSLATE_CONCURRENCY", "4");
        std::env::set_var("CACHE_TTL_SECS", "600");

        let config = Config::from_env().expect("overrides should load");
        clear_env();

        assert_eq!(config.port, 3000);
        assert_eq!(config.api_key.as_deref(), Some("admin-secret"));
        assert_eq!(config.locale_root, PathBuf::from("/srv/locales"));
        assert_eq!(config.default_locale, "pt");
        assert_eq!(config.translate_max_attempts, 3);
        assert_eq!(config.translate_concurrency, 4);
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(600)));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        let result = Config::from_env();
        clear_env();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    #[serial]
    fn test_from_env_clamps_zero_values() {
        clear_env();
        std::env::set_var("TRANSLATE_MAX_ATTEMPTS", "0");
        std::env::set_var("TRANSLATE_CONCURRENCY", "0");
        std::env::set_var("CACHE_CAPACITY", "0");
        std::env::set_var("CACHE_TTL_SECS", "0");

        let config = Config::from_env().expect("should load");
        clear_env();

        assert_eq!(config.translate_max_attempts, 1);
        assert_eq!(config.translate_concurrency, 1);
        assert_eq!(config.cache_capacity, 1);
        assert_eq!(config.cache_ttl, None);
    }

    #[test]
    #[serial]
    fn test_blank_secrets_are_ignored() {
        clear_env();
        std::env::set_var("API_KEY", "   ");
        std::env::set_var("TRANSLATE_API_KEY", "");

        let config = Config::from_env().expect("should load");
        clear_env();

        assert_eq!(config.api_key, None);
        assert_eq!(config.translate_api_key, None);
    }

    #[test]
    fn test_normalize_mount_path() {
        assert_eq!(normalize_mount_path("locales"), "/locales");
        assert_eq!(normalize_mount_path("/static/locales/"), "/static/locales");
        assert_eq!(normalize_mount_path(""), "/locales");
    }
}
