//! CardImport - import character cards and lorebooks from hosting sites
//!
//! Given a URL or a bare identifier, CardImport works out which content host
//! it refers to, downloads the artifact from that host's API, and hands back
//! the raw bytes with a file name, MIME type and content kind.
//!
//! ## Pipeline
//!
//! 1. [`resolver`] classifies the input into a [`ProviderMatch`] (no I/O)
//! 2. [`fetchers`] download the artifact for the matched [`Provider`]
//! 3. [`Importer`] wraps the outcome into an [`ImportResult`]
//!
//! Supported hosts:
//! - Chub / CharacterHub (characters and lorebooks)
//! - JanitorAI / JannyAI
//! - Pygmalion
//! - AICharacterCards
//! - Risu Realm
//! - Plain files on a small whitelist of hosts (see [`GENERIC_WHITELIST`])
//!
//! ```no_run
//! # async fn run() {
//! let result = cardimport::import_url("https://chub.ai/characters/author/slug").await;
//! match result.into_result() {
//!     Ok(content) => println!("{} ({})", content.file_name, content.content_kind),
//!     Err(message) => eprintln!("import failed: {}", message),
//! }
//! # }
//! ```

pub mod batch;
pub mod client;
mod error;
pub mod fetchers;
pub mod resolver;
pub mod sanitize;
mod types;

pub use batch::{run_batch, split_inputs, BatchError, BatchItem, BatchReport, ImportSink, SinkError};
pub use client::{import_url, import_uuid, ImportOptions, Importer, ImporterBuilder};
pub use error::{ImportError, UNKNOWN_ERROR_MESSAGE};
pub use fetchers::{fetcher_for, Endpoints, FetchContext, Fetcher};
pub use resolver::{classify_token, classify_url, looks_like_url, GENERIC_WHITELIST};
pub use sanitize::sanitize_filename;
pub use types::{
    Artifact, ContentKind, ImportResult, ImportedContent, Provider, ProviderMatch,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "CardImport/1.0";
