//! Sequential batch import
//!
//! A host typically collects several inputs at once (one per line of a paste
//! box). They are imported strictly one after another and each result is
//! handed to the matching downstream pipeline through an [`ImportSink`].
//! The first failure stops the batch; the remaining lines are not attempted.

use crate::client::Importer;
use crate::resolver::looks_like_url;
use crate::types::{ContentKind, ImportResult, ImportedContent};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Error type returned by sinks
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Downstream consumer of imported content
///
/// Characters go to the host's file-drop import, lorebooks to its
/// world-info import.
#[async_trait]
pub trait ImportSink: Send {
    /// Accept a downloaded character card
    async fn import_character(&mut self, content: ImportedContent) -> Result<(), SinkError>;

    /// Accept a downloaded lorebook
    async fn import_lorebook(&mut self, content: ImportedContent) -> Result<(), SinkError>;
}

/// One successfully handed-off item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub input: String,
    pub file_name: String,
    pub content_kind: ContentKind,
}

/// Items imported by a batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub imported: Vec<BatchItem>,
}

/// Why a batch stopped early
#[derive(Debug, Error)]
pub enum BatchError {
    /// The importer could not download an input
    #[error("{message}")]
    Import {
        input: String,
        message: String,
        completed: BatchReport,
    },

    /// The sink rejected downloaded content
    #[error("Failed to import {input}")]
    Sink {
        input: String,
        #[source]
        source: SinkError,
        completed: BatchReport,
    },
}

impl BatchError {
    /// Input that stopped the batch
    pub fn input(&self) -> &str {
        match self {
            BatchError::Import { input, .. } | BatchError::Sink { input, .. } => input,
        }
    }

    /// Items imported before the failure
    pub fn completed(&self) -> &BatchReport {
        match self {
            BatchError::Import { completed, .. } | BatchError::Sink { completed, .. } => {
                completed
            }
        }
    }
}

/// Split pasted text into inputs: one per line, trimmed, empties dropped
pub fn split_inputs(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Import every input in `text`, in order, stopping at the first failure
pub async fn run_batch<S>(
    importer: &Importer,
    text: &str,
    sink: &mut S,
) -> Result<BatchReport, BatchError>
where
    S: ImportSink + ?Sized,
{
    let mut report = BatchReport::default();

    for input in split_inputs(text) {
        if looks_like_url(input) {
            debug!(input, "Custom content import started for URL");
        } else {
            debug!(input, "Custom content import started for identifier");
        }

        let content = match importer.import(input).await {
            ImportResult::Success(content) => content,
            ImportResult::Failure { message } => {
                return Err(BatchError::Import {
                    input: input.to_string(),
                    message,
                    completed: report,
                });
            }
        };

        let item = BatchItem {
            input: input.to_string(),
            file_name: content.file_name.clone(),
            content_kind: content.content_kind,
        };

        let handoff = match content.content_kind {
            ContentKind::Character => sink.import_character(content).await,
            ContentKind::Lorebook => sink.import_lorebook(content).await,
        };

        if let Err(source) = handoff {
            return Err(BatchError::Sink {
                input: input.to_string(),
                source,
                completed: report,
            });
        }

        info!(input, file_name = %item.file_name, kind = %item.content_kind, "Imported");
        report.imported.push(item);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        received: Vec<String>,
    }

    #[async_trait]
    impl ImportSink for RecordingSink {
        async fn import_character(&mut self, content: ImportedContent) -> Result<(), SinkError> {
            self.received.push(content.file_name);
            Ok(())
        }

        async fn import_lorebook(&mut self, content: ImportedContent) -> Result<(), SinkError> {
            self.received.push(content.file_name);
            Ok(())
        }
    }

    #[test]
    fn test_split_inputs() {
        let text = "  https://chub.ai/characters/a/b \n\n\tAICC/x/y\r\n   \nslug_character";
        assert_eq!(
            split_inputs(text),
            vec!["https://chub.ai/characters/a/b", "AICC/x/y", "slug_character"]
        );
        assert!(split_inputs("\n  \n").is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut sink = RecordingSink::default();
        let report = run_batch(&Importer::default(), "\n\n", &mut sink)
            .await
            .unwrap();
        assert!(report.imported.is_empty());
        assert!(sink.received.is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_stops_batch() {
        let mut sink = RecordingSink::default();
        let text = "https://example.com/x\nhttps://pygmalion.chat/character/nope";

        let err = run_batch(&Importer::default(), text, &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.input(), "https://example.com/x");
        assert_eq!(err.to_string(), "unsupported url");
        assert!(err.completed().imported.is_empty());
        assert!(sink.received.is_empty());
    }
}
