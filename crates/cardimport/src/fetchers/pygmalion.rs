//! Pygmalion (pygmalion.chat) fetcher
//!
//! The export endpoint returns the character as JSON. Building a PNG card
//! from the character's avatar is not supported, so the JSON export itself
//! is the artifact.

use crate::error::ImportError;
use crate::fetchers::{endpoint_url, ensure_success, FetchContext, Fetcher};
use crate::sanitize::file_name_or;
use crate::types::{Artifact, ContentKind, Provider, ProviderMatch};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Pygmalion character fetcher
pub struct PygmalionFetcher;

/// True if the export carries a `character` object
fn has_character_object(payload: &Value) -> bool {
    payload.get("character").is_some_and(Value::is_object)
}

#[async_trait]
impl Fetcher for PygmalionFetcher {
    fn name(&self) -> &'static str {
        "pygmalion"
    }

    fn provider(&self) -> Provider {
        Provider::Pygmalion
    }

    async fn fetch(
        &self,
        target: &ProviderMatch,
        ctx: &FetchContext,
    ) -> Result<Artifact, ImportError> {
        let id = target.canonical_id.as_str();
        info!(id, "Downloading Pygmalion character");

        let url = endpoint_url(
            &ctx.endpoints.pygmalion_api,
            &["api", "export", "character", id, "v2"],
        )?;

        let response = ctx
            .client
            .get(url)
            .send()
            .await
            .map_err(ImportError::from_reqwest)?;
        let response =
            ensure_success(response, Provider::Pygmalion, ContentKind::Character).await?;

        let payload: Value = response.json().await.map_err(|e| {
            warn!(error = %e, "Pygmalion returned invalid JSON");
            ImportError::UpstreamFailure(ContentKind::Character)
        })?;

        if !has_character_object(&payload) {
            warn!(%payload, "Pygmalion returned invalid character data");
            return Err(ImportError::UpstreamFailure(ContentKind::Character));
        }

        debug!(id, "Avatar card embedding unavailable, using JSON export");
        let bytes = serde_json::to_vec(&payload).map_err(|e| ImportError::Unknown(e.to_string()))?;

        Ok(Artifact {
            bytes: Bytes::from(bytes),
            file_name: file_name_or(None, id, "json"),
            mime_type: "application/json".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_character_object() {
        assert!(has_character_object(&json!({"character": {"data": {}}})));
        assert!(!has_character_object(&json!({"character": null})));
        assert!(!has_character_object(&json!({"character": "text"})));
        assert!(!has_character_object(&json!({"character": []})));
        assert!(!has_character_object(&json!({})));
    }
}
