//! Localized Messages
//!
//! Message codes are resolved against a static catalog in the locale of the
//! current request. The locale is negotiated from `Accept-Language` by the
//! locale middleware and stored in a task-local for the lifetime of the
//! request, so errors and notifications can be rendered without threading
//! the locale through every call.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::messages::CATALOG;

/// Supported response locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Match a primary language tag (`fr`, `fr-CA`, `EN`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

tokio::task_local! {
    /// Locale negotiated for the request currently being served.
    pub static REQUEST_LOCALE: Locale;
}

/// Locale of the current request, English outside of a request scope.
pub fn current_locale() -> Locale {
    REQUEST_LOCALE.try_with(|locale| *locale).unwrap_or_default()
}

/// Negotiate a locale from an `Accept-Language` header value.
///
/// Entries are ordered by quality (`q=`); ties keep header order. The first
/// supported language wins, English otherwise.
pub fn negotiate(accept_language: &str) -> Locale {
    let mut ranked: Vec<(f32, usize, &str)> = accept_language
        .split(',')
        .enumerate()
        .filter_map(|(index, entry)| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((quality, index, tag))
        })
        .filter(|(quality, _, _)| *quality > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .find_map(|(_, _, tag)| Locale::from_tag(tag))
        .unwrap_or_default()
}

static INDEX: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    CATALOG
        .iter()
        .map(|(code, en, fr)| (*code, (*en, *fr)))
        .collect()
});

/// Resolve a message code. Unknown codes are returned unchanged.
pub fn resolve(code: &str, locale: Locale) -> String {
    match INDEX.get(code) {
        Some((en, fr)) => match locale {
            Locale::En => (*en).to_string(),
            Locale::Fr => (*fr).to_string(),
        },
        None => code.to_string(),
    }
}

/// Resolve a message code and substitute `{name}` placeholders from `params`.
pub fn render(code: &str, locale: Locale, params: &serde_json::Value) -> String {
    let mut text = resolve(code, locale);
    if let Some(map) = params.as_object() {
        for (name, value) in map {
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{{}}}", name), &replacement);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("fr-FR,fr;q=0.9,en;q=0.8", Locale::Fr ; "french first")]
    #[test_case("en-US,en;q=0.9", Locale::En ; "english")]
    #[test_case("de-DE,fr;q=0.5", Locale::Fr ; "skips unsupported")]
    #[test_case("en;q=0.2,fr;q=0.8", Locale::Fr ; "quality ordering")]
    #[test_case("fr;q=0", Locale::En ; "zero quality ignored")]
    #[test_case("", Locale::En ; "empty header")]
    #[test_case("*", Locale::En ; "wildcard")]
    fn test_negotiate(header: &str, expected: Locale) {
        assert_eq!(negotiate(header), expected);
    }

    #[test]
    fn test_resolve_known_code_in_both_locales() {
        assert_eq!(resolve("member.not.found", Locale::En), "Member not found");
        assert_eq!(resolve("member.not.found", Locale::Fr), "Membre introuvable");
    }

    #[test]
    fn test_resolve_unknown_code_returns_code() {
        assert_eq!(resolve("no.such.code", Locale::Fr), "no.such.code");
    }

    #[test]
    fn test_render_substitutes_params() {
        let params = serde_json::json!({ "name": "Ada", "title": "Rust meetup" });
        let text = render("notification.chat.space.join.request", Locale::En, &params);
        assert_eq!(text, "Ada requested to join Rust meetup");
    }

    #[test]
    fn test_catalog_has_no_duplicate_codes() {
        assert_eq!(INDEX.len(), CATALOG.len());
    }

    #[tokio::test]
    async fn test_current_locale_follows_task_scope() {
        assert_eq!(current_locale(), Locale::En);
        let inside = REQUEST_LOCALE.scope(Locale::Fr, async { current_locale() }).await;
        assert_eq!(inside, Locale::Fr);
    }
}
