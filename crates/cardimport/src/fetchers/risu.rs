//! Risu Realm (realm.risuai.net) fetcher

use crate::error::ImportError;
use crate::fetchers::{endpoint_url, ensure_success, FetchContext, Fetcher};
use crate::sanitize::file_name_or;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use tracing::info;

/// Risu Realm fetcher; always downloads the PNG v3 card
pub struct RisuFetcher;

#[async_trait]
impl Fetcher for RisuFetcher {
    fn name(&self) -> &'static str {
        "risu"
    }

    fn provider(&self) -> Provider {
        Provider::Risu
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        let id = target.canonical_id.as_str();
        info!(id, "Downloading Risu character");

        let mut url = endpoint_url(
            &ctx.endpoints.risu_api,
            &["api", "v1", "download", "png-v3", id],
        )?;
        url.query_pairs_mut().append_pair("non_commercial", "true");

        let response = ctx
            .client
            .get(url)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response = ensure_success(response, Provider::Risu, ContentKind::Character).await?;
        let bytes = response.bytes().await.map_err(ImportError::from_reqwest)?;

        Ok(Artifact {
            bytes,
            file_name: file_name_or(None, id, "png"),
            mime_type: "image/png".to_string(),
        })
    }
}
