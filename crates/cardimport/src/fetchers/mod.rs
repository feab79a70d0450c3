//! Per-provider download routines
//!
//! Design: each provider has one fetcher that turns a canonical id into an
//! [`Artifact`] with a single upstream call (Janny adds a second call for the
//! referenced image). [`fetcher_for`] maps the closed [`Provider`] enum onto
//! its fetcher, so adding a provider is a compile error until it is wired up.

mod aicc;
mod chub;
mod generic;
mod janny;
mod pygmalion;
mod risu;

pub use aicc::AiccFetcher;
pub use chub::ChubFetcher;
pub use generic::GenericFetcher;
pub use janny::JannyFetcher;
pub use pygmalion::PygmalionFetcher;
pub use risu::RisuFetcher;

use crate::error::ImportError;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use tracing::warn;
use url::Url;

/// Trait for provider-specific fetchers
///
/// A fetcher receives a match produced by the resolver for its own provider
/// and performs the download. Fetchers hold no state; everything a request
/// needs comes in through [`FetchContext`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Provider this fetcher serves
    fn provider(&self) -> Provider;

    /// Download the artifact identified by `target`
    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError>;
}

/// Fetcher responsible for `provider`
pub fn fetcher_for(provider: Provider) -> &'static dyn Fetcher {
    match provider {
        Provider::Chub => &ChubFetcher,
        Provider::Janny => &JannyFetcher,
        Provider::Pygmalion => &PygmalionFetcher,
        Provider::Aicc => &AiccFetcher,
        Provider::Risu => &RisuFetcher,
        Provider::Generic => &GenericFetcher,
    }
}

/// Base URLs of the provider APIs
///
/// Defaults point at the production hosts. Override them to run against a
/// mirror or a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub chub_api: String,
    pub pygmalion_api: String,
    pub janny_api: String,
    pub aicc_api: String,
    pub risu_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chub_api: "https://api.chub.ai".to_string(),
            pygmalion_api: "https://server.pygmalion.chat".to_string(),
            janny_api: "https://api.jannyai.com".to_string(),
            aicc_api: "https://aicharactercards.com".to_string(),
            risu_api: "https://realm.risuai.net".to_string(),
        }
    }
}

impl Endpoints {
    /// Route every provider API to the same base URL
    pub fn with_base(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            chub_api: base.clone(),
            pygmalion_api: base.clone(),
            janny_api: base.clone(),
            aicc_api: base.clone(),
            risu_api: base,
        }
    }
}

/// Shared state handed to every fetcher call
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// HTTP client, already carrying the User-Agent header
    pub client: reqwest::Client,
    /// Provider API base URLs
    pub endpoints: Endpoints,
}

/// Join path segments onto a base URL, escaping each segment
pub(crate) fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ImportError> {
    let mut url =
        Url::parse(base).map_err(|e| ImportError::Unknown(format!("bad endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ImportError::Unknown(format!("endpoint {base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pass successful responses through; log and reject everything else
///
/// The upstream status and body only go to the log.
pub(crate) async fn ensure_success(
    response: Response,
    provider: Provider,
    kind: ContentKind,
) -> Result<Response, ImportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(provider = provider.name(), %status, %body, "Upstream returned error");
    Err(ImportError::UpstreamFailure(kind))
}

/// Content-Type header value, if present and readable
pub(crate) fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_for_covers_every_provider() {
        let providers = [
            Provider::Chub,
            Provider::Janny,
            Provider::Pygmalion,
            Provider::Aicc,
            Provider::Risu,
            Provider::Generic,
        ];
        for provider in providers {
            let fetcher = fetcher_for(provider);
            assert_eq!(fetcher.provider(), provider);
            assert_eq!(fetcher.name(), provider.name());
        }
    }

    #[test]
    fn test_endpoint_url_escapes_segments() {
        let url = endpoint_url("http://127.0.0.1:9000", &["api", "export", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/export/a%20b%2Fc");

        let url = endpoint_url("https://mirror.example/base/", &["api"]).unwrap();
        assert_eq!(url.as_str(), "https://mirror.example/base/api");
    }

    #[test]
    fn test_endpoint_url_rejects_bad_base() {
        assert!(endpoint_url("not a url", &["api"]).is_err());
    }

    #[test]
    fn test_endpoints_with_base() {
        let endpoints = Endpoints::with_base("http://localhost:1234");
        assert_eq!(endpoints.chub_api, "http://localhost:1234");
        assert_eq!(endpoints.risu_api, "http://localhost:1234");
        assert_ne!(Endpoints::default(), endpoints);
    }
}
