//! AICharacterCards (aicharactercards.com) fetcher

use crate::error::ImportError;
use crate::fetchers::{content_type, endpoint_url, ensure_success, FetchContext, Fetcher};
use crate::sanitize::file_name_or;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use tracing::info;

/// AICC fetcher; the canonical id is `author/card`
pub struct AiccFetcher;

#[async_trait]
impl Fetcher for AiccFetcher {
    fn name(&self) -> &'static str {
        "aicc"
    }

    fn provider(&self) -> Provider {
        Provider::Aicc
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        let id = target.canonical_id.as_str();
        info!(id, "Downloading AICC character");

        let mut segments = vec!["wp-json", "pngapi", "v1", "image"];
        segments.extend(id.split('/'));
        let url = endpoint_url(&ctx.endpoints.aicc_api, &segments)?;

        let response = ctx
            .client
            .get(url)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response = ensure_success(response, Provider::Aicc, ContentKind::Character).await?;

        let mime_type = content_type(&response).unwrap_or_else(|| "image/png".to_string());
        let bytes = response.bytes().await.map_err(ImportError::from_reqwest)?;

        Ok(Artifact {
            bytes,
            file_name: file_name_or(None, id, "png"),
            mime_type,
        })
    }
}
