//! Translation bundles and the static files they are loaded from.
//!
//! Files live at `{locale_root}/{locale}/{namespace}.json`. Nested objects are
//! flattened into dotted keys so the whole pipeline works on flat maps.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolved `key -> string` map for one locale and namespace.
pub type Bundle = BTreeMap<String, String>;

/// Parse a translation file into a flat bundle.
pub fn parse_bundle(raw: &str) -> Result<Bundle> {
    let value: Value = serde_json::from_str(raw).context("Translation file is not valid JSON")?;

    let Value::Object(map) = value else {
        bail!("Translation file root must be a JSON object");
    };

    let mut bundle = Bundle::new();
    for (key, value) in map {
        flatten_into(&mut bundle, key, value);
    }
    Ok(bundle)
}

fn flatten_into(bundle: &mut Bundle, prefix: String, value: Value) {
    match value {
        Value::String(s) => {
            bundle.insert(prefix, s);
        }
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(bundle, format!("{}.{}", prefix, key), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.into_iter().enumerate() {
                flatten_into(bundle, format!("{}.{}", prefix, index), nested);
            }
        }
        Value::Number(n) => {
            bundle.insert(prefix, n.to_string());
        }
        Value::Bool(b) => {
            bundle.insert(prefix, b.to_string());
        }
        Value::Null => {}
    }
}

/// Whether `name` can be used as a path segment under the locale root.
pub fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reads static translation files from disk.
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file for `locale`/`namespace`, or `None` for unsafe names.
    pub fn path_for(&self, locale: &str, namespace: &str) -> Option<PathBuf> {
        if !is_safe_segment(locale) || !is_safe_segment(namespace) {
            return None;
        }
        Some(self.root.join(locale).join(format!("{}.json", namespace)))
    }

    /// Load a bundle. Missing or broken files yield an empty bundle.
    pub async fn load(&self, locale: &str, namespace: &str) -> Bundle {
        let Some(path) = self.path_for(locale, namespace) else {
            warn!(locale, namespace, "Refusing to load translation file for unsafe name");
            return Bundle::new();
        };

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(locale, namespace, path = %path.display(), error = %e, "No translation file");
                return Bundle::new();
            }
        };

        match parse_bundle(&raw) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(
                    locale,
                    namespace,
                    path = %path.display(),
                    error = %format!("{:#}", e),
                    "Ignoring malformed translation file"
                );
                Bundle::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flat_bundle() {
        let bundle = parse_bundle(r#"{"title": "Bookstore", "search": "Search"}"#).unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle["title"], "Bookstore");
    }

    #[test]
    fn test_parse_nested_bundle_flattens_keys() {
        let bundle = parse_bundle(
            r#"{"nav": {"home": "Home", "shop": {"books": "Books"}}, "tags": ["new", "sale"]}"#,
        )
        .unwrap();

        assert_eq!(bundle["nav.home"], "Home");
        assert_eq!(bundle["nav.shop.books"], "Books");
        assert_eq!(bundle["tags.0"], "new");
        assert_eq!(bundle["tags.1"], "sale");
    }

    #[test]
    fn test_parse_scalars_are_stringified() {
        let bundle = parse_bundle(r#"{"max": 5, "enabled": true, "missing": null}"#).unwrap();
        assert_eq!(bundle["max"], "5");
        assert_eq!(bundle["enabled"], "true");
        assert!(!bundle.contains_key("missing"));
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let result = parse_bundle(r#"["a", "b"]"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("JSON object"));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(parse_bundle("{not json").is_err());
    }

    #[test]
    fn test_is_safe_segment() {
        assert!(is_safe_segment("common"));
        assert!(is_safe_segment("pt-BR"));
        assert!(is_safe_segment("checkout_v2"));
        assert!(!is_safe_segment(""));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("../secrets"));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment(&"x".repeat(65)));
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let store = BundleStore::new("/srv/locales");
        assert!(store.path_for("en", "../../etc/passwd").is_none());
        assert_eq!(
            store.path_for("en", "common"),
            Some(PathBuf::from("/srv/locales/en/common.json"))
        );
    }

    #[tokio::test]
    async fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::write(
            dir.path().join("en/common.json"),
            r#"{"cart": {"empty": "Your cart is empty"}}"#,
        )
        .unwrap();

        let store = BundleStore::new(dir.path());
        let bundle = store.load("en", "common").await;

        assert_eq!(bundle["cart.empty"], "Your cart is empty");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = BundleStore::new(dir.path());
        assert!(store.load("en", "common").await.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::write(dir.path().join("en/common.json"), "not json").unwrap();

        let store = BundleStore::new(dir.path());
        assert!(store.load("en", "common").await.is_empty());
    }
}
