//! Locale registry: Single source of truth for all storefront locales.
//!
//! The registry is a static table built once behind a `OnceLock` and never
//! mutated afterwards. A locale is "native" when the storefront ships
//! hand-written translation files for it; every other locale is produced by
//! the resolution endpoint.

use serde::Serialize;
use std::sync::OnceLock;

/// Display metadata for a supported locale.
#[derive(Debug, Clone)]
pub struct Locale {
    /// ISO 639-1 language code (e.g., "en", "pt")
    pub code: &'static str,

    /// Name shown in the language switcher, in the language itself
    pub display_name: &'static str,

    /// English name of the language, used in resolution logs
    pub english_name: &'static str,

    /// Flag glyph shown next to the display name
    pub flag: &'static str,

    /// Whether the storefront ships translation files for this locale
    pub is_native: bool,

    /// Whether this is the base language all translations start from
    pub is_base: bool,

    /// Whether this locale is offered in the language switcher
    pub enabled: bool,
}

/// Serializable view of a locale for the language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleSummary {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub native: bool,
}

impl Locale {
    pub fn to_summary(&self) -> LocaleSummary {
        LocaleSummary {
            code: self.code,
            name: self.display_name,
            flag: self.flag,
            native: self.is_native,
        }
    }
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<Locale>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale by its code. Region suffixes are ignored (`pt-BR` finds `pt`).
    pub fn get_by_code(&self, code: &str) -> Option<&Locale> {
        let primary = primary_subtag(code);
        self.locales
            .iter()
            .find(|locale| locale.code.eq_ignore_ascii_case(primary))
    }

    /// All locales offered in the language switcher.
    pub fn list_enabled(&self) -> Vec<&Locale> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// The base language all remote translations start from.
    ///
    /// # Panics
    /// Panics if the static table does not define exactly one base locale.
    pub fn base(&self) -> &Locale {
        let base: Vec<_> = self.locales.iter().filter(|l| l.is_base).collect();

        match base.len() {
            0 => panic!("No base locale found in registry"),
            1 => base[0],
            _ => panic!("Multiple base locales found in registry"),
        }
    }

    /// Whether the storefront ships its own files for `code`.
    /// Unknown codes are not native.
    pub fn is_native(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.is_native)
            .unwrap_or(false)
    }
}

/// The language part of a tag: `pt-BR` -> `pt`.
pub fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code).trim()
}

fn default_locales() -> Vec<Locale> {
    vec![
        Locale {
            code: "en",
            display_name: "English",
            english_name: "English",
            flag: "🇺🇸",
            is_native: true,
            is_base: true,
            enabled: true,
        },
        Locale {
            code: "pt",
            display_name: "Português",
            english_name: "Portuguese",
            flag: "🇧🇷",
            is_native: true,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "es",
            display_name: "Español",
            english_name: "Spanish",
            flag: "🇪🇸",
            is_native: false,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "fr",
            display_name: "Français",
            english_name: "French",
            flag: "🇫🇷",
            is_native: false,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "it",
            display_name: "Italiano",
            english_name: "Italian",
            flag: "🇮🇹",
            is_native: false,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "de",
            display_name: "Deutsch",
            english_name: "German",
            flag: "🇩🇪",
            is_native: false,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "zh",
            display_name: "中文",
            english_name: "Chinese",
            flag: "🇨🇳",
            is_native: false,
            is_base: false,
            enabled: true,
        },
        Locale {
            code: "ko",
            display_name: "한국어",
            english_name: "Korean",
            flag: "🇰🇷",
            is_native: false,
            is_base: false,
            enabled: false,
        },
    ]
}
