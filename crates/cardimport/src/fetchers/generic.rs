//! Plain download from a whitelisted host
//!
//! The canonical id is the URL itself. Only reachable for hosts on
//! [`GENERIC_WHITELIST`](crate::resolver::GENERIC_WHITELIST).

use crate::error::ImportError;
use crate::fetchers::{content_type, ensure_success, FetchContext, Fetcher};
use crate::sanitize::file_name_or;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use tracing::info;
use url::Url;

/// Fetcher for raw files on whitelisted hosts
pub struct GenericFetcher;

/// Last path segment of a URL, percent-decoded
fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

#[async_trait]
impl Fetcher for GenericFetcher {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn provider(&self) -> Provider {
        Provider::Generic
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        info!(url = %target.canonical_id, "Downloading from generic url");

        let response = ctx
            .client
            .get(&target.canonical_id)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response =
            ensure_success(response, Provider::Generic, ContentKind::Character).await?;

        // Name after the final URL, so redirects to a CDN path are honored
        let name = last_path_segment(response.url());
        let mime_type = content_type(&response).unwrap_or_else(|| "image/png".to_string());
        let bytes = response.bytes().await.map_err(ImportError::from_reqwest)?;

        Ok(Artifact {
            bytes,
            file_name: file_name_or(name.as_deref(), "", "png"),
            mime_type,
        })
    }
}
