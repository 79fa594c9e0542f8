//! Visitor locale detection.
//!
//! Precedence (first usable value wins): query string, cookie, local storage,
//! the browser's reported languages, then the configured default. Values are
//! not checked against the locale registry; an unknown but well-formed code is
//! still the visitor's choice and is resolved downstream.

use crate::i18n::primary_subtag;
use percent_encoding::percent_decode_str;
use reqwest::Url;

/// Query string parameter carrying an explicit locale choice.
pub const QUERY_PARAM: &str = "lng";

/// Cookie recording the visitor's chosen locale.
pub const COOKIE_NAME: &str = "i18next";

/// Local storage key recording the visitor's chosen locale.
pub const STORAGE_KEY: &str = "i18nextLng";

const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Raw inputs available to the detector for one page session.
#[derive(Debug, Clone, Default)]
pub struct DetectionSources {
    /// Page query string, with or without the leading `?`
    pub query: Option<String>,

    /// Value of the `Cookie` request header
    pub cookie_header: Option<String>,

    /// Value stored under [`STORAGE_KEY`]
    pub local_storage: Option<String>,

    /// Languages reported by the browser, most preferred first
    pub navigator_languages: Vec<String>,
}

impl DetectionSources {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_cookie_header(mut self, header: impl Into<String>) -> Self {
        self.cookie_header = Some(header.into());
        self
    }

    pub fn with_local_storage(mut self, value: impl Into<String>) -> Self {
        self.local_storage = Some(value.into());
        self
    }

    pub fn with_navigator_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.navigator_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Use an `Accept-Language` header as the browser's reported languages.
    pub fn with_accept_language(self, header: &str) -> Self {
        self.with_navigator_languages(parse_accept_language(header))
    }
}

/// Which source a detected locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    QueryString,
    Cookie,
    LocalStorage,
    Navigator,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLocale {
    /// Normalized tag, e.g. `pt-BR`
    pub tag: String,
    pub source: DetectionSource,
}

impl DetectedLocale {
    /// The language part bundles are loaded by, e.g. `pt`.
    pub fn language(&self) -> &str {
        primary_subtag(&self.tag)
    }
}

/// Pick the visitor's locale.
pub fn detect_locale(sources: &DetectionSources, default_locale: &str) -> DetectedLocale {
    let query = sources
        .query
        .as_deref()
        .and_then(|q| query_value(q, QUERY_PARAM));
    let cookie = sources
        .cookie_header
        .as_deref()
        .and_then(|c| cookie_value(c, COOKIE_NAME));

    let candidates = [
        (DetectionSource::QueryString, query),
        (DetectionSource::Cookie, cookie),
        (DetectionSource::LocalStorage, sources.local_storage.clone()),
    ];

    for (source, raw) in candidates {
        if let Some(tag) = raw.as_deref().and_then(normalize_tag) {
            return DetectedLocale { tag, source };
        }
    }

    if let Some(tag) = sources
        .navigator_languages
        .iter()
        .find_map(|lang| normalize_tag(lang))
    {
        return DetectedLocale {
            tag,
            source: DetectionSource::Navigator,
        };
    }

    DetectedLocale {
        tag: normalize_tag(default_locale).unwrap_or_else(|| "en".to_string()),
        source: DetectionSource::Default,
    }
}

/// Normalize a raw locale string into a BCP 47-style tag.
///
/// Encoding suffixes (`.UTF-8`) and variants (`@latin`) are dropped,
/// underscores become hyphens, the language is lowercased and a two-letter
/// region is uppercased. Returns `None` for anything that is not a tag.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let stripped = raw.trim().split(['.', '@']).next().unwrap_or_default().trim();
    if stripped.is_empty() {
        return None;
    }

    let mut parts = stripped.split(['-', '_']);
    let language = parts.next()?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut tag = language.to_ascii_lowercase();
    for part in parts {
        if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        tag.push('-');
        match part.len() {
            2 if part.chars().all(|c| c.is_ascii_alphabetic()) => {
                tag.push_str(&part.to_ascii_uppercase())
            }
            4 => {
                let (first, rest) = part.split_at(1);
                tag.push_str(&first.to_ascii_uppercase());
                tag.push_str(&rest.to_ascii_lowercase());
            }
            _ => tag.push_str(&part.to_ascii_lowercase()),
        }
    }
    Some(tag)
}

/// Languages from an `Accept-Language` header, highest quality first.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut components = part.split(';');
            let tag = components.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = components
                .filter_map(|c| c.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then(|| (tag.to_string(), quality))
        })
        .collect();

    // Stable sort keeps header order among equal weights
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

fn query_value(query: &str, name: &str) -> Option<String> {
    let url = Url::parse(&format!("http://localhost/?{}", query.trim_start_matches('?'))).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .and_then(|value| percent_decode_str(value).decode_utf8().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A locale choice to remember across visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    pub locale: String,
}

impl LanguagePreference {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// `Set-Cookie` value recording the choice for a year.
    pub fn cookie_header(&self) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            COOKIE_NAME, self.locale, COOKIE_MAX_AGE_SECS
        )
    }

    /// Local storage entry recording the choice.
    pub fn storage_entry(&self) -> (&'static str, &str) {
        (STORAGE_KEY, &self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_query_string_wins() {
        let sources = DetectionSources::default()
            .with_query("?page=2&lng=es")
            .with_cookie_header("session=abc; i18next=fr")
            .with_local_storage("it")
            .with_navigator_languages(["de-DE"]);

        let detected = detect_locale(&sources, "en");
        assert_eq!(detected.tag, "es");
        assert_eq!(detected.source, DetectionSource::QueryString);
    }

    #[test]
    fn test_cookie_beats_storage_and_navigator() {
        let sources = DetectionSources::default()
            .with_query("page=2")
            .with_cookie_header("i18next=pt-BR")
            .with_local_storage("it")
            .with_navigator_languages(["de"]);

        let detected = detect_locale(&sources, "en");
        assert_eq!(detected.tag, "pt-BR");
        assert_eq!(detected.language(), "pt");
        assert_eq!(detected.source, DetectionSource::Cookie);
    }

    #[test]
    fn test_local_storage_beats_navigator() {
        let sources = DetectionSources::default()
            .with_local_storage("it")
            .with_navigator_languages(["de"]);

        assert_eq!(detect_locale(&sources, "en").source, DetectionSource::LocalStorage);
    }

    #[test]
    fn test_navigator_uses_first_valid_language() {
        let sources = DetectionSources::default().with_navigator_languages(["*", "fr_CA", "de"]);

        let detected = detect_locale(&sources, "en");
        assert_eq!(detected.tag, "fr-CA");
        assert_eq!(detected.source, DetectionSource::Navigator);
    }

    #[test]
    fn test_default_when_nothing_usable() {
        let sources = DetectionSources::default()
            .with_query("lng=")
            .with_cookie_header("i18next=!!")
            .with_local_storage("   ");

        let detected = detect_locale(&sources, "pt");
        assert_eq!(detected.tag, "pt");
        assert_eq!(detected.source, DetectionSource::Default);
    }

    #[test]
    fn test_unknown_codes_are_not_rejected() {
        let sources = DetectionSources::default().with_query("lng=zz");
        assert_eq!(detect_locale(&sources, "en").tag, "zz");
    }

    #[test]
    fn test_accept_language_order() {
        let sources = DetectionSources::default()
            .with_accept_language("en;q=0.5, pt-BR, es;q=0.8, *;q=0.1");

        assert_eq!(sources.navigator_languages, vec!["pt-BR", "es", "en"]);
        assert_eq!(detect_locale(&sources, "en").tag, "pt-BR");
    }

    #[test]
    fn test_accept_language_drops_zero_quality() {
        assert_eq!(parse_accept_language("fr;q=0, de"), vec!["de"]);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("pt_br").as_deref(), Some("pt-BR"));
        assert_eq!(normalize_tag("EN-us").as_deref(), Some("en-US"));
        assert_eq!(normalize_tag("en_US.UTF-8").as_deref(), Some("en-US"));
        assert_eq!(normalize_tag("zh-hant-tw").as_deref(), Some("zh-Hant-TW"));
        assert_eq!(normalize_tag("es-419").as_deref(), Some("es-419"));
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag("e"), None);
        assert_eq!(normalize_tag("english"), None);
        assert_eq!(normalize_tag("en--US"), None);
        assert_eq!(normalize_tag("../en"), None);
    }

    #[test]
    fn test_cookie_value_parsing() {
        assert_eq!(
            cookie_value("a=1; i18next=\"es\"; b=2", "i18next").as_deref(),
            Some("es")
        );
        assert_eq!(cookie_value("i18nextLng=es", "i18next"), None);
    }

    #[test]
    fn test_encoded_values_are_decoded() {
        assert_eq!(query_value("?lng=pt%2DBR", "lng").as_deref(), Some("pt-BR"));
        assert_eq!(query_value("a=%20&lng=es", "lng").as_deref(), Some("es"));
        assert_eq!(cookie_value("i18next=pt%2Dbr", "i18next").as_deref(), Some("pt-br"));

        let sources = DetectionSources::default()
            .with_query("?lng=pt%2DBR")
            .with_cookie_header("i18next=fr");
        let detected = detect_locale(&sources, "en");
        assert_eq!(detected.tag, "pt-BR");
        assert_eq!(detected.source, DetectionSource::QueryString);
    }

    #[test]
    fn test_preference_cookie_header() {
        let preference = LanguagePreference::new("es");
        assert_eq!(
            preference.cookie_header(),
            "i18next=es; Path=/; Max-Age=31536000; SameSite=Lax"
        );
        assert_eq!(preference.storage_entry(), ("i18nextLng", "es"));
    }

    fn code() -> impl Strategy<Value = String> {
        "[a-z]{2,3}"
    }

    proptest! {
        #[test]
        fn prop_query_string_always_wins(
            query in code(),
            cookie in code(),
            storage in code(),
            navigator in code(),
        ) {
            let sources = DetectionSources::default()
                .with_query(format!("lng={}", query))
                .with_cookie_header(format!("i18next={}", cookie))
                .with_local_storage(storage)
                .with_navigator_languages([navigator]);

            let detected = detect_locale(&sources, "en");
            prop_assert_eq!(detected.tag, query);
            prop_assert_eq!(detected.source, DetectionSource::QueryString);
        }

        #[test]
        fn prop_detection_never_panics(
            query in ".*",
            cookie in ".*",
            navigator in proptest::collection::vec(".*", 0..4),
        ) {
            let sources = DetectionSources::default()
                .with_query(query)
                .with_cookie_header(cookie)
                .with_navigator_languages(navigator);

            let detected = detect_locale(&sources, "en");
            prop_assert!(!detected.tag.is_empty());
        }
    }
}
