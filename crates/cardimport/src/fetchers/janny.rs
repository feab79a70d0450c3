//! JannyAI fetcher
//!
//! Two requests: the download API returns a short-lived `downloadUrl`, which
//! is then fetched as the card image. The API sits behind a bot filter, so
//! requests from cloud-hosted IPs may be refused.

use crate::error::ImportError;
use crate::fetchers::{content_type, endpoint_url, ensure_success, FetchContext, Fetcher};
use crate::sanitize::file_name_or;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadRequest<'a> {
    character_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadResponse {
    status: String,
    #[serde(default)]
    download_url: Option<String>,
}

impl DownloadResponse {
    /// The image URL, when the API reported success
    fn ready_url(self) -> Option<String> {
        if self.status == "ok" {
            self.download_url.filter(|url| !url.is_empty())
        } else {
            None
        }
    }
}

/// JannyAI character fetcher
pub struct JannyFetcher;

#[async_trait]
impl Fetcher for JannyFetcher {
    fn name(&self) -> &'static str {
        "janny"
    }

    fn provider(&self) -> Provider {
        Provider::Janny
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        let id = target.canonical_id.as_str();
        info!(id, "Downloading Janitor character");

        let url = endpoint_url(&ctx.endpoints.janny_api, &["api", "v1", "download"])?;
        let response = ctx
            .client
            .post(url)
            .json(&DownloadRequest { character_id: id })
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response = ensure_success(response, Provider::Janny, ContentKind::Character).await?;

        let download: DownloadResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Janny returned invalid JSON");
            ImportError::UpstreamFailure(ContentKind::Character)
        })?;

        let status = download.status.clone();
        let Some(image_url) = download.ready_url() else {
            warn!(%status, "Janny did not provide a download url");
            return Err(ImportError::UpstreamFailure(ContentKind::Character));
        };

        let image = ctx
            .client
            .get(&image_url)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let image = ensure_success(image, Provider::Janny, ContentKind::Character).await?;

        let mime_type = content_type(&image).unwrap_or_else(|| "image/png".to_string());
        let bytes = image.bytes().await.map_err(ImportError::from_reqwest)?;

        Ok(Artifact {
            bytes,
            file_name: file_name_or(None, id, "png"),
            mime_type,
        })
    }
}
