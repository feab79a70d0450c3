//! Chub (chub.ai / characterhub.org) fetcher
//!
//! Characters and lorebooks are both served by POST download endpoints that
//! take the entity's full path in a JSON body.

use crate::error::ImportError;
use crate::fetchers::{content_type, endpoint_url, ensure_success, FetchContext, Fetcher};
use crate::sanitize::{file_name_or, parse_content_disposition_filename};
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CharacterDownloadRequest<'a> {
    format: &'a str,
    full_path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LorebookDownloadRequest<'a> {
    full_path: &'a str,
    format: &'a str,
}

/// Chub fetcher for characters and lorebooks
pub struct ChubFetcher;

impl ChubFetcher {
    async fn download_character(
        full_path: &str,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        info!(full_path, "Downloading Chub character");

        let url = endpoint_url(&ctx.endpoints.chub_api, &["api", "characters", "download"])?;
        let body = CharacterDownloadRequest {
            format: "tavern",
            full_path,
        };

        let response = ctx
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response = ensure_success(response, Provider::Chub, ContentKind::Character).await?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_disposition_filename);
        let mime_type = content_type(&response).unwrap_or_else(|| "image/png".to_string());
        let bytes = response.bytes().await.map_err(ImportError::from_reqwest)?;

        Ok(Artifact {
            bytes,
            file_name: file_name_or(disposition.as_deref(), full_path, "png"),
            mime_type,
        })
    }

    async fn download_lorebook(
        full_path: &str,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        info!(full_path, "Downloading Chub lorebook");

        let url = endpoint_url(&ctx.endpoints.chub_api, &["api", "lorebooks", "download"])?;
        let body = LorebookDownloadRequest {
            full_path,
            format: "SILLYTAVERN",
        };

        let response = ctx
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response = ensure_success(response, Provider::Chub, ContentKind::Lorebook).await?;

        let mime_type =
            content_type(&response).unwrap_or_else(|| "application/json".to_string());
        let bytes = response.bytes().await.map_err(ImportError::from_reqwest)?;
        let name = full_path.rsplit('/').next().unwrap_or(full_path);

        Ok(Artifact {
            bytes,
            file_name: file_name_or(None, name, "json"),
            mime_type,
        })
    }
}

#[async_trait]
impl Fetcher for ChubFetcher {
    fn name(&self) -> &'static str {
        "chub"
    }

    fn provider(&self) -> Provider {
        Provider::Chub
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        let full_path = target.upstream_id();
        match target.content_kind {
            ContentKind::Character => Self::download_character(full_path, ctx).await,
            ContentKind::Lorebook => Self::download_lorebook(full_path, ctx).await,
        }
    }
}
