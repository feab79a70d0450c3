//! Import dispatchers for CardImport
//!
//! This module provides the public entry points. Classification lives in
//! [`resolver`](crate::resolver), the downloads in [`fetchers`](crate::fetchers).
//! Every entry point returns an [`ImportResult`]; no error or panic escapes.

use crate::error::{ImportError, UNKNOWN_ERROR_MESSAGE};
use crate::fetchers::{fetcher_for, Endpoints, FetchContext};
use crate::resolver::{classify_token, classify_url, looks_like_url};
use crate::types::{ImportResult, ImportedContent, ProviderMatch};
use crate::DEFAULT_USER_AGENT;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

type Classifier = fn(&str) -> Result<ProviderMatch, ImportError>;

/// Import options passed in by the host
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Provider API base URLs
    pub endpoints: Endpoints,
}

/// Import content from a URL using default options
pub async fn import_url(input: &str) -> ImportResult {
    Importer::default().import_url(input).await
}

/// Import content from a bare identifier using default options
pub async fn import_uuid(input: &str) -> ImportResult {
    Importer::default().import_uuid(input).await
}

/// Builder for configuring an [`Importer`]
#[derive(Debug, Clone, Default)]
pub struct ImporterBuilder {
    user_agent: Option<String>,
    endpoints: Endpoints,
}

impl ImporterBuilder {
    /// Create a builder with production endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override provider API base URLs
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Build the importer
    pub fn build(self) -> Importer {
        Importer {
            options: ImportOptions {
                user_agent: self.user_agent,
                endpoints: self.endpoints,
            },
        }
    }
}

/// Configured importer
#[derive(Debug, Clone)]
pub struct Importer {
    options: ImportOptions,
}

impl Default for Importer {
    fn default() -> Self {
        ImporterBuilder::new().build()
    }
}

impl Importer {
    /// Create a new importer builder
    pub fn builder() -> ImporterBuilder {
        ImporterBuilder::new()
    }

    /// Create an importer from explicit options
    pub fn with_options(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Options this importer was built with
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import a URL or a bare identifier, whichever the input looks like
    pub async fn import(&self, input: &str) -> ImportResult {
        if looks_like_url(input) {
            self.import_url(input).await
        } else {
            self.import_uuid(input).await
        }
    }

    /// Import content from a URL
    pub async fn import_url(&self, input: &str) -> ImportResult {
        self.dispatch(input, classify_url).await
    }

    /// Import content from a bare identifier (Chub path, UUID, `AICC/...`)
    pub async fn import_uuid(&self, input: &str) -> ImportResult {
        self.dispatch(input, classify_token).await
    }

    async fn dispatch(&self, input: &str, classify: Classifier) -> ImportResult {
        let outcome = AssertUnwindSafe(self.try_import(input, classify))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(content)) => ImportResult::Success(content),
            Ok(Err(err)) => {
                warn!(input, error = ?err, "Importing custom content failed");
                ImportResult::Failure {
                    message: err.to_string(),
                }
            }
            Err(panic) => {
                error!(
                    input,
                    panic = panic_message(panic.as_ref()),
                    "Importing custom content panicked"
                );
                ImportResult::Failure {
                    message: UNKNOWN_ERROR_MESSAGE.to_string(),
                }
            }
        }
    }

    async fn try_import(
        &self,
        input: &str,
        classify: Classifier,
    ) -> Result<ImportedContent, ImportError> {
        let target = classify(input)?;
        let fetcher = fetcher_for(target.provider);
        debug!(
            fetcher = fetcher.name(),
            id = %target.canonical_id,
            kind = %target.content_kind,
            "Using fetcher"
        );

        let ctx = self.context()?;
        let artifact = fetcher.fetch(&target, &ctx).await?;
        Ok(ImportedContent::from_artifact(artifact, target.content_kind))
    }

    fn context(&self) -> Result<FetchContext, ImportError> {
        let mut headers = HeaderMap::new();
        let user_agent = self
            .options
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ImportError::ClientBuildError)?;

        Ok(FetchContext {
            client,
            endpoints: self.options.endpoints.clone(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
