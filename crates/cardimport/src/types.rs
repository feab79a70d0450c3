//! Core types for CardImport

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream content host an input resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// chub.ai / characterhub.org
    Chub,
    /// janitorai.com / jannyai.com
    Janny,
    /// pygmalion.chat
    Pygmalion,
    /// aicharactercards.com
    Aicc,
    /// realm.risuai.net
    Risu,
    /// Plain file download from a whitelisted host
    Generic,
}

impl Provider {
    /// Stable lowercase name used in logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Chub => "chub",
            Provider::Janny => "janny",
            Provider::Pygmalion => "pygmalion",
            Provider::Aicc => "aicc",
            Provider::Risu => "risu",
            Provider::Generic => "generic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category of an imported artifact, selecting the downstream pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Character card (PNG with embedded metadata, or JSON)
    #[default]
    Character,
    /// Lorebook / world-info JSON
    Lorebook,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Character => f.write_str("character"),
            ContentKind::Lorebook => f.write_str("lorebook"),
        }
    }
}

/// Classification of an input string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMatch {
    /// Host the content lives on
    pub provider: Provider,
    /// Provider-specific identifier (path, UUID, `author/slug`, or full URL)
    pub canonical_id: String,
    /// What the identifier points at
    pub content_kind: ContentKind,
    /// Path sent upstream when it differs from `canonical_id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_path: Option<String>,
}

impl ProviderMatch {
    /// Create a match for a character card
    pub fn character(provider: Provider, canonical_id: impl Into<String>) -> Self {
        Self::new(provider, canonical_id, ContentKind::Character)
    }

    /// Create a match for a lorebook
    pub fn lorebook(provider: Provider, canonical_id: impl Into<String>) -> Self {
        Self::new(provider, canonical_id, ContentKind::Lorebook)
    }

    /// Create a match of any kind
    pub fn new(
        provider: Provider,
        canonical_id: impl Into<String>,
        content_kind: ContentKind,
    ) -> Self {
        Self {
            provider,
            canonical_id: canonical_id.into(),
            content_kind,
            upstream_path: None,
        }
    }

    /// Send `path` upstream instead of the canonical id
    pub fn with_upstream_path(mut self, path: impl Into<String>) -> Self {
        self.upstream_path = Some(path.into());
        self
    }

    /// Identifier to put on the wire
    pub fn upstream_id(&self) -> &str {
        self.upstream_path.as_deref().unwrap_or(&self.canonical_id)
    }
}

/// Raw download produced by a fetcher
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: String,
}

/// A successfully downloaded artifact tagged with its content kind
#[derive(Debug, Clone)]
pub struct ImportedContent {
    /// Artifact payload
    pub bytes: Bytes,
    /// Filesystem-safe file name
    pub file_name: String,
    /// Selects the downstream import pipeline
    pub content_kind: ContentKind,
    /// MIME type reported by (or assumed for) the upstream
    pub mime_type: String,
}

impl ImportedContent {
    pub(crate) fn from_artifact(artifact: Artifact, content_kind: ContentKind) -> Self {
        Self {
            bytes: artifact.bytes,
            file_name: artifact.file_name,
            content_kind,
            mime_type: artifact.mime_type,
        }
    }
}

/// Outcome of a single import call
///
/// Dispatchers never return errors: every failure is folded into
/// [`ImportResult::Failure`] with a short, user-facing message.
#[derive(Debug, Clone)]
pub enum ImportResult {
    /// Content was downloaded
    Success(ImportedContent),
    /// Content could not be imported
    Failure {
        /// Human-readable reason
        message: String,
    },
}

impl ImportResult {
    /// True when content was downloaded
    pub fn ok(&self) -> bool {
        matches!(self, ImportResult::Success(_))
    }

    /// Failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ImportResult::Success(_) => None,
            ImportResult::Failure { message } => Some(message),
        }
    }

    /// Downloaded content, if any
    pub fn content(&self) -> Option<&ImportedContent> {
        match self {
            ImportResult::Success(content) => Some(content),
            ImportResult::Failure { .. } => None,
        }
    }

    /// Convert into a standard `Result`, with the failure message as error
    pub fn into_result(self) -> Result<ImportedContent, String> {
        match self {
            ImportResult::Success(content) => Ok(content),
            ImportResult::Failure { message } => Err(message),
        }
    }
}
