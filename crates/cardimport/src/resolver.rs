//! Input classification
//!
//! Pure functions that map a URL or a bare identifier to a [`ProviderMatch`].
//! Nothing in this module touches the network.
//!
//! Two entry points exist because the caller decides up front whether an
//! input is a URL ([`looks_like_url`]):
//! - [`classify_url`] matches on the hostname, in a fixed precedence order
//! - [`classify_token`] runs an ordered heuristic cascade over a bare token

use crate::error::ImportError;
use crate::types::{ContentKind, Provider, ProviderMatch};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Hosts eligible for the plain file download path (exact match)
pub const GENERIC_WHITELIST: &[&str] = &[
    "localhost",
    "cdn.discordapp.com",
    "files.catbox.moe",
    "raw.githubusercontent.com",
];

/// Chub domains; subdomains (`www.`, `venus.`) count as aliases too
const CHUB_DOMAINS: &[&str] = &["chub.ai", "characterhub.org"];

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}")
        .expect("uuid pattern compiles")
});

// Groups 1 & 2 capture the full URL form, 3 & 4 the relative `author/card` form
static AICC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://aicharactercards\.com/character-cards/([^/]+)/([^/]+)/?$|([^/]+)/([^/]+)$",
    )
    .expect("aicc pattern compiles")
});

static RISU_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://realm\.risuai\.net/character/([a-f0-9-]+)/?$")
        .expect("risu pattern compiles")
});

impl Provider {
    /// Select the provider serving `host`
    ///
    /// Checked in order: Pygmalion, Janny, AICC, Chub, Risu, then the generic
    /// whitelist. The first match wins.
    pub fn for_host(host: &str) -> Option<Provider> {
        if host.contains("pygmalion.chat") {
            Some(Provider::Pygmalion)
        } else if host.contains("janitorai") || host.contains("jannyai") {
            Some(Provider::Janny)
        } else if host.contains("aicharactercards.com") {
            Some(Provider::Aicc)
        } else if host.contains("chub.ai") || host.contains("characterhub.org") {
            Some(Provider::Chub)
        } else if host.contains("realm.risuai.net") {
            Some(Provider::Risu)
        } else if is_host_whitelisted(host) {
            Some(Provider::Generic)
        } else {
            None
        }
    }
}

/// Check if host is on the generic download whitelist
pub fn is_host_whitelisted(host: &str) -> bool {
    GENERIC_WHITELIST.contains(&host)
}

/// Hostname of a URL, or an empty string if it does not parse
pub fn host_of(input: &str) -> String {
    Url::parse(input)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// True if the input parses as an absolute URL with a host
pub fn looks_like_url(input: &str) -> bool {
    Url::parse(input).map(|url| url.has_host()).unwrap_or(false)
}

/// Classify a URL by its hostname
pub fn classify_url(input: &str) -> Result<ProviderMatch, ImportError> {
    if input.trim().is_empty() {
        return Err(ImportError::InvalidInput("url"));
    }

    let host = host_of(input);
    let provider = Provider::for_host(&host).ok_or(ImportError::UnsupportedSource)?;

    match provider {
        Provider::Pygmalion => extract_uuid(input)
            .map(|uuid| ProviderMatch::character(provider, uuid))
            .ok_or(ImportError::MalformedIdentifier("invalid Pygmalion uuid")),
        Provider::Janny => extract_uuid(input)
            .map(|uuid| ProviderMatch::character(provider, uuid))
            .ok_or(ImportError::MalformedIdentifier("invalid Janny uuid")),
        Provider::Aicc => parse_aicc_path(input)
            .map(|path| ProviderMatch::character(provider, path))
            .ok_or(ImportError::MalformedIdentifier(
                "invalid AICharacterCards url",
            )),
        Provider::Chub => parse_chub_path(input)
            .map(|(id, content_kind)| match content_kind {
                ContentKind::Lorebook => ProviderMatch::lorebook(provider, id.as_str())
                    .with_upstream_path(format!("lorebooks/{}", id)),
                ContentKind::Character => ProviderMatch::character(provider, id),
            })
            .ok_or(ImportError::MalformedIdentifier("invalid Chub url")),
        Provider::Risu => parse_risu_url(input)
            .map(|uuid| ProviderMatch::character(provider, uuid))
            .ok_or(ImportError::MalformedIdentifier("invalid Risu uuid")),
        Provider::Generic => Ok(ProviderMatch::character(provider, input)),
    }
}

/// Classify a bare identifier
///
/// Ordered cascade, first rule wins:
/// 1. contains `_character` -> Janny, id is the part before the first `_`
/// 2. exactly 36 characters -> Pygmalion UUID, verbatim
/// 3. starts with `AICC/` -> AICC, `author/card`
/// 4. anything else -> Chub; lorebook if `lorebook` appears anywhere
///
/// This is a heuristic. A 36-character Chub path is routed to Pygmalion,
/// and a Chub character whose path mentions `lorebook` is fetched as a
/// lorebook.
pub fn classify_token(input: &str) -> Result<ProviderMatch, ImportError> {
    if input.trim().is_empty() {
        return Err(ImportError::InvalidInput("uuid"));
    }

    if input.contains("_character") {
        let id = input.split('_').next().unwrap_or_default();
        if id.is_empty() {
            return Err(ImportError::MalformedIdentifier("invalid Janny uuid"));
        }
        return Ok(ProviderMatch::character(Provider::Janny, id));
    }

    if input.chars().count() == 36 {
        return Ok(ProviderMatch::character(Provider::Pygmalion, input));
    }

    if let Some(rest) = input.strip_prefix("AICC/") {
        let mut parts = rest.split('/');
        return match (parts.next(), parts.next()) {
            (Some(author), Some(card)) if !author.is_empty() && !card.is_empty() => Ok(
                ProviderMatch::character(Provider::Aicc, format!("{}/{}", author, card)),
            ),
            _ => Err(ImportError::MalformedIdentifier("invalid AICC id")),
        };
    }

    // Sent upstream verbatim, prefix included
    if input.contains("lorebook") {
        Ok(ProviderMatch::lorebook(Provider::Chub, input))
    } else {
        Ok(ProviderMatch::character(Provider::Chub, input))
    }
}

/// Extract the first canonical (lowercase, 8-4-4-4-12) UUID from a string
pub fn extract_uuid(input: &str) -> Option<&str> {
    UUID_RE.find(input).map(|m| m.as_str())
}

/// Extract a Chub id and content kind from a URL or path
///
/// Everything after the last Chub domain segment is considered (or the whole
/// path when no domain is present). A leading `characters` / `lorebooks`
/// segment selects the kind and is dropped from the id; otherwise exactly
/// two remaining segments are read as `author/slug` of a character.
pub fn parse_chub_path(input: &str) -> Option<(String, ContentKind)> {
    let path = input.split(['?', '#']).next().unwrap_or(input);
    let segments: Vec<&str> = path.split('/').collect();

    if segments.len() < 2 {
        return None;
    }

    let start = segments
        .iter()
        .rposition(|segment| is_chub_domain(segment))
        .map(|index| index + 1)
        .unwrap_or(0);

    let rest: Vec<&str> = segments[start..]
        .iter()
        .copied()
        .filter(|segment| !segment.is_empty())
        .collect();

    let first = rest.first()?;
    let kind = if first.eq_ignore_ascii_case("characters") {
        Some(ContentKind::Character)
    } else if first.eq_ignore_ascii_case("lorebooks") {
        Some(ContentKind::Lorebook)
    } else {
        None
    };

    match kind {
        Some(kind) => {
            let id = rest[1..].join("/");
            if id.is_empty() {
                None
            } else {
                Some((id, kind))
            }
        }
        None if rest.len() == 2 => Some((rest.join("/"), ContentKind::Character)),
        None => None,
    }
}

fn is_chub_domain(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase();
    CHUB_DOMAINS.iter().any(|domain| {
        segment == *domain
            || segment
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Extract `author/card` from an AICC URL or a relative `author/card` path
pub fn parse_aicc_path(input: &str) -> Option<String> {
    let caps = AICC_RE.captures(input)?;

    match (caps.get(1), caps.get(2)) {
        (Some(author), Some(card)) => Some(format!("{}/{}", author.as_str(), card.as_str())),
        _ => {
            let author = caps.get(3)?;
            let card = caps.get(4)?;
            Some(format!("{}/{}", author.as_str(), card.as_str()))
        }
    }
}

/// Extract the character id from a Risu Realm URL
pub fn parse_risu_url(input: &str) -> Option<&str> {
    RISU_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "0a1b2c3d-4e5f-6789-abcd-ef0123456789";

    #[test]
    fn test_provider_precedence() {
        assert_eq!(
            Provider::for_host("pygmalion.chat"),
            Some(Provider::Pygmalion)
        );
        assert_eq!(Provider::for_host("janitorai.com"), Some(Provider::Janny));
        assert_eq!(Provider::for_host("jannyai.com"), Some(Provider::Janny));
        assert_eq!(
            Provider::for_host("aicharactercards.com"),
            Some(Provider::Aicc)
        );
        assert_eq!(Provider::for_host("chub.ai"), Some(Provider::Chub));
        assert_eq!(
            Provider::for_host("www.characterhub.org"),
            Some(Provider::Chub)
        );
        assert_eq!(Provider::for_host("realm.risuai.net"), Some(Provider::Risu));
        assert_eq!(
            Provider::for_host("files.catbox.moe"),
            Some(Provider::Generic)
        );
        // A host matching two loose checks goes to the earlier provider
        assert_eq!(
            Provider::for_host("pygmalion.chat.chub.ai"),
            Some(Provider::Pygmalion)
        );
        assert_eq!(Provider::for_host("example.com"), None);
        assert_eq!(Provider::for_host(""), None);
    }

    #[test]
    fn test_generic_whitelist_is_exact() {
        for host in GENERIC_WHITELIST {
            assert_eq!(Provider::for_host(host), Some(Provider::Generic));
        }
        assert!(!is_host_whitelisted("evil.localhost"));
        assert!(!is_host_whitelisted("cdn.discordapp.com.evil.net"));
        assert!(!is_host_whitelisted("discordapp.com"));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://chub.ai/characters/a/b"), "chub.ai");
        assert_eq!(host_of("http://localhost:8000/card.png"), "localhost");
        assert_eq!(host_of("not a url"), "");
    }

    #[test]
    fn test_classify_chub_urls() {
        let m = classify_url("https://chub.ai/characters/author/slug").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Chub, "author/slug"));

        let m = classify_url("https://chub.ai/lorebooks/author/slug").unwrap();
        assert_eq!(m.canonical_id, "author/slug");
        assert_eq!(m.content_kind, ContentKind::Lorebook);
        assert_eq!(m.upstream_id(), "lorebooks/author/slug");

        let m = classify_url("https://www.characterhub.org/characters/author/slug?tab=1").unwrap();
        assert_eq!(m.canonical_id, "author/slug");

        let m = classify_url("https://venus.chub.ai/characters/author/slug/").unwrap();
        assert_eq!(m.canonical_id, "author/slug");

        let m = classify_url("https://chub.ai/author/slug").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Chub, "author/slug"));
    }

    #[test]
    fn test_classify_chub_url_malformed() {
        let err = classify_url("https://chub.ai/search/foo/bar").unwrap_err();
        assert_eq!(err.to_string(), "invalid Chub url");

        let err = classify_url("https://chub.ai/characters").unwrap_err();
        assert_eq!(err.to_string(), "invalid Chub url");
    }

    #[test]
    fn test_parse_chub_path() {
        assert_eq!(parse_chub_path("slug"), None);
        assert_eq!(
            parse_chub_path("author/slug"),
            Some(("author/slug".to_string(), ContentKind::Character))
        );
        assert_eq!(
            parse_chub_path("Characters/author/slug"),
            Some(("author/slug".to_string(), ContentKind::Character))
        );
        assert_eq!(
            parse_chub_path("chub.ai/LOREBOOKS/author/slug"),
            Some(("author/slug".to_string(), ContentKind::Lorebook))
        );
        assert_eq!(parse_chub_path("a/b/c"), None);
    }

    #[test]
    fn test_parse_chub_path_kind_segment_takes_any_length() {
        assert_eq!(
            parse_chub_path("https://chub.ai/characters/author"),
            Some(("author".to_string(), ContentKind::Character))
        );
        assert_eq!(
            parse_chub_path("https://chub.ai/characters/author/slug/extra"),
            Some(("author/slug/extra".to_string(), ContentKind::Character))
        );
        assert_eq!(parse_chub_path("https://chub.ai/characters/"), None);
        assert_eq!(parse_chub_path("https://chub.ai/author/slug/extra"), None);
    }

    #[test]
    fn test_classify_uuid_hosts() {
        let url = format!("https://pygmalion.chat/character/{}", UUID);
        let m = classify_url(&url).unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Pygmalion, UUID));

        let url = format!("https://janitorai.com/characters/{}_character-name", UUID);
        let m = classify_url(&url).unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Janny, UUID));

        let err = classify_url("https://pygmalion.chat/character/nope").unwrap_err();
        assert_eq!(err.to_string(), "invalid Pygmalion uuid");

        let err = classify_url("https://janitorai.com/characters/nope").unwrap_err();
        assert_eq!(err.to_string(), "invalid Janny uuid");
    }

    #[test]
    fn test_extract_uuid_is_lowercase_only() {
        assert_eq!(extract_uuid(UUID), Some(UUID));
        assert_eq!(extract_uuid(&UUID.to_uppercase()), None);
        assert_eq!(extract_uuid("0a1b2c3d-4e5f-6789-abcd"), None);
    }

    #[test]
    fn test_classify_aicc() {
        let m = classify_url("https://aicharactercards.com/character-cards/author/card/").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Aicc, "author/card"));

        let m = classify_url("https://www.aicharactercards.com/character-cards/author/card")
            .unwrap();
        assert_eq!(m.canonical_id, "author/card");

        assert_eq!(parse_aicc_path("author/card"), Some("author/card".to_string()));
        assert_eq!(parse_aicc_path("card"), None);

        let err = classify_url("https://aicharactercards.com/").unwrap_err();
        assert_eq!(err.to_string(), "invalid AICharacterCards url");
    }

    #[test]
    fn test_classify_risu() {
        let m = classify_url(
            "https://realm.risuai.net/character/7adb0ed8d81855c820b3506980fb40f054ceef010ff0c4bab73730c0ebe92279",
        )
        .unwrap();
        assert_eq!(m.provider, Provider::Risu);
        assert_eq!(
            m.canonical_id,
            "7adb0ed8d81855c820b3506980fb40f054ceef010ff0c4bab73730c0ebe92279"
        );

        let m = classify_url("HTTPS://realm.risuai.net/character/7ADB0ED8-D818/").unwrap();
        assert_eq!(m.canonical_id, "7ADB0ED8-D818");

        let err = classify_url("https://realm.risuai.net/character/xyz").unwrap_err();
        assert_eq!(err.to_string(), "invalid Risu uuid");
    }

    #[test]
    fn test_classify_generic_and_unsupported() {
        let url = "https://files.catbox.moe/abc123.png";
        let m = classify_url(url).unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Generic, url));

        let err = classify_url("https://example.com/x").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedSource));
        assert_eq!(err.to_string(), "unsupported url");

        let err = classify_url("::not a url::").unwrap_err();
        assert_eq!(err.to_string(), "unsupported url");

        let err = classify_url("   ").unwrap_err();
        assert_eq!(err.to_string(), "invalid url");
    }

    #[test]
    fn test_classify_token_cascade() {
        let m = classify_token("some-slug_character").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Janny, "some-slug"));

        let m = classify_token("xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx").unwrap();
        assert_eq!(
            m,
            ProviderMatch::character(Provider::Pygmalion, "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx")
        );

        let m = classify_token("AICC/author/card").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Aicc, "author/card"));

        let m = classify_token("author/slug").unwrap();
        assert_eq!(m, ProviderMatch::character(Provider::Chub, "author/slug"));

        let m = classify_token("lorebooks/author/slug").unwrap();
        assert_eq!(
            m,
            ProviderMatch::lorebook(Provider::Chub, "lorebooks/author/slug")
        );

        let m = classify_token("author/my-lorebook").unwrap();
        assert_eq!(m, ProviderMatch::lorebook(Provider::Chub, "author/my-lorebook"));
        assert_eq!(m.upstream_id(), "author/my-lorebook");

        let m = classify_token("characters/author/slug").unwrap();
        assert_eq!(
            m,
            ProviderMatch::character(Provider::Chub, "characters/author/slug")
        );
    }

    #[test]
    fn test_classify_token_known_ambiguities() {
        // Any 36-character token is read as a Pygmalion UUID
        let chub_path = "some-author/a-slug-of-exactly-36char";
        assert_eq!(chub_path.len(), 36);
        assert_eq!(classify_token(chub_path).unwrap().provider, Provider::Pygmalion);

        // Janny wins over the length rule
        let janny = "abcdefghijklmnopqrstuv_character-xyz";
        assert_eq!(janny.len(), 36);
        assert_eq!(classify_token(janny).unwrap().provider, Provider::Janny);
    }

    #[test]
    fn test_classify_token_invalid() {
        assert_eq!(classify_token("").unwrap_err().to_string(), "invalid uuid");
        assert_eq!(
            classify_token("AICC/author").unwrap_err().to_string(),
            "invalid AICC id"
        );
        assert_eq!(
            classify_token("_character").unwrap_err().to_string(),
            "invalid Janny uuid"
        );
    }

    #[test]
    fn test_looks_like_url() {
        assert!(looks_like_url("https://chub.ai/characters/a/b"));
        assert!(!looks_like_url("author/slug"));
        assert!(!looks_like_url("AICC/author/card"));
        assert!(!looks_like_url("author:slug"));
    }
}
