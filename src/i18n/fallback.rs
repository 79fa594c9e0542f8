//! Hand-maintained translations used before asking the remote provider.

use crate::i18n::registry::primary_subtag;
use crate::i18n::Bundle;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Pre-translated bundles keyed by locale, then namespace.
pub struct FallbackDictionary {
    bundles: HashMap<&'static str, HashMap<&'static str, Bundle>>,
}

static DICTIONARY: OnceLock<FallbackDictionary> = OnceLock::new();

impl FallbackDictionary {
    pub fn get() -> &'static FallbackDictionary {
        DICTIONARY.get_or_init(|| {
            let mut bundles: HashMap<&'static str, HashMap<&'static str, Bundle>> =
                HashMap::new();
            bundles
                .entry("fr")
                .or_default()
                .insert("common", to_bundle(FRENCH_COMMON));
            bundles
                .entry("it")
                .or_default()
                .insert("common", to_bundle(ITALIAN_COMMON));
            FallbackDictionary { bundles }
        })
    }

    pub fn lookup(&self, locale: &str, namespace: &str) -> Option<Bundle> {
        let locale = primary_subtag(locale).to_ascii_lowercase();
        self.bundles
            .get(locale.as_str())
            .and_then(|namespaces| namespaces.get(namespace))
            .cloned()
    }

    pub fn contains(&self, locale: &str, namespace: &str) -> bool {
        self.lookup(locale, namespace).is_some()
    }
}

fn to_bundle(entries: &[(&str, &str)]) -> Bundle {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const FRENCH_COMMON: &[(&str, &str)] = &[
    ("nav.home", "Accueil"),
    ("nav.books", "Livres"),
    ("nav.bibles", "Bibles"),
    ("nav.blog", "Blog"),
    ("nav.cart", "Panier"),
    ("nav.wishlist", "Liste de souhaits"),
    ("actions.add_to_cart", "Ajouter au panier"),
    ("actions.buy_now", "Acheter maintenant"),
    ("actions.checkout", "Passer la commande"),
    ("actions.search", "Rechercher"),
    ("cart.empty", "Votre panier est vide"),
    ("cart.items", "{{count}} articles dans votre panier"),
    ("footer.rights", "Tous droits réservés"),
];

const ITALIAN_COMMON: &[(&str, &str)] = &[
    ("nav.home", "Home"),
    ("nav.books", "Libri"),
    ("nav.bibles", "Bibbie"),
    ("nav.blog", "Blog"),
    ("nav.cart", "Carrello"),
    ("nav.wishlist", "Lista dei desideri"),
    ("actions.add_to_cart", "Aggiungi al carrello"),
    ("actions.buy_now", "Acquista ora"),
    ("actions.checkout", "Procedi all'acquisto"),
    ("actions.search", "Cerca"),
    ("cart.empty", "Il tuo carrello è vuoto"),
    ("cart.items", "{{count}} articoli nel carrello"),
    ("footer.rights", "Tutti i diritti riservati"),
];
