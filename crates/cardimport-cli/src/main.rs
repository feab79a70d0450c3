//! CardImport CLI - import character cards and lorebooks from the command line

use async_trait::async_trait;
use cardimport::{
    classify_token, classify_url, looks_like_url, run_batch, split_inputs, BatchError,
    BatchReport, ContentKind, ImportSink, ImportedContent, Importer, ProviderMatch, SinkError,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for both subcommands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// One line per input
    #[default]
    Text,
    /// JSON format
    Json,
}

/// CardImport - download character cards and lorebooks from hosting sites
#[derive(Parser, Debug)]
#[command(name = "cardimport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download inputs and write them under the output directory
    Fetch {
        /// URLs or identifiers; read from stdin, one per line, when omitted
        inputs: Vec<String>,

        /// Output directory (characters/ and lorebooks/ are created inside)
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Output format
        #[arg(long, short, default_value = "text")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Show which host each input resolves to, without downloading
    Classify {
        /// URLs or identifiers; read from stdin, one per line, when omitted
        inputs: Vec<String>,

        /// Output format
        #[arg(long, short, default_value = "text")]
        output: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Fetch {
            inputs,
            out,
            output,
            user_agent,
        } => run_fetch(&read_inputs(inputs), out, output, user_agent).await,
        Commands::Classify { inputs, output } => run_classify(&read_inputs(inputs), output),
    };

    std::process::exit(code);
}

/// Join positional inputs, or fall back to stdin
fn read_inputs(inputs: Vec<String>) -> String {
    if !inputs.is_empty() {
        return inputs.join("\n");
    }

    let mut text = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut text) {
        eprintln!("Error reading stdin: {}", e);
        std::process::exit(1);
    }
    text
}

async fn run_fetch(
    text: &str,
    out: PathBuf,
    output: OutputFormat,
    user_agent: Option<String>,
) -> i32 {
    let mut builder = Importer::builder();
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let importer = builder.build();

    let mut sink = DirectorySink::new(out);
    let outcome = run_batch(&importer, text, &mut sink).await;

    let (report, failure) = match &outcome {
        Ok(report) => (report, None),
        Err(err) => (err.completed(), Some(err)),
    };

    match output {
        OutputFormat::Text => {
            writeln_safe(&format_fetch_text(report, sink.root()));
            if let Some(err) = failure {
                eprintln!("Error: {}: {}", err.input(), failure_message(err));
            }
        }
        OutputFormat::Json => {
            let summary = FetchSummary::new(report, failure, sink.root());
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => writeln_safe(&json),
                Err(e) => {
                    eprintln!("Error serializing response: {}", e);
                    return 1;
                }
            }
        }
    }

    if failure.is_some() {
        1
    } else {
        0
    }
}

fn run_classify(text: &str, output: OutputFormat) -> i32 {
    let rows: Vec<ClassifyRow> = split_inputs(text).into_iter().map(classify).collect();
    let failed = rows.iter().any(|row| row.error.is_some());

    match output {
        OutputFormat::Text => writeln_safe(&format_classify_text(&rows)),
        OutputFormat::Json => match serde_json::to_string_pretty(&rows) {
            Ok(json) => writeln_safe(&json),
            Err(e) => {
                eprintln!("Error serializing response: {}", e);
                return 1;
            }
        },
    }

    if failed {
        1
    } else {
        0
    }
}

fn classify(input: &str) -> ClassifyRow {
    let classified = if looks_like_url(input) {
        classify_url(input)
    } else {
        classify_token(input)
    };

    match classified {
        Ok(target) => ClassifyRow {
            input: input.to_string(),
            target: Some(target),
            error: None,
        },
        Err(e) => ClassifyRow {
            input: input.to_string(),
            target: None,
            error: Some(e.to_string()),
        },
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRow {
    input: String,
    #[serde(flatten)]
    target: Option<ProviderMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SavedItem {
    input: String,
    kind: ContentKind,
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct FetchSummary {
    imported: Vec<SavedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed: Option<FailedItem>,
}

#[derive(Debug, Serialize)]
struct FailedItem {
    input: String,
    error: String,
}

impl FetchSummary {
    fn new(report: &BatchReport, failure: Option<&BatchError>, root: &Path) -> Self {
        Self {
            imported: saved_items(report, root),
            failed: failure.map(|err| FailedItem {
                input: err.input().to_string(),
                error: failure_message(err),
            }),
        }
    }
}

fn saved_items(report: &BatchReport, root: &Path) -> Vec<SavedItem> {
    report
        .imported
        .iter()
        .map(|item| SavedItem {
            input: item.input.clone(),
            kind: item.content_kind,
            path: kind_dir(root, item.content_kind).join(&item.file_name),
        })
        .collect()
}

/// Message for a failed batch; sink failures report their cause
fn failure_message(err: &BatchError) -> String {
    match err {
        BatchError::Import { message, .. } => message.clone(),
        BatchError::Sink { source, .. } => source.to_string(),
    }
}

fn format_fetch_text(report: &BatchReport, root: &Path) -> String {
    saved_items(report, root)
        .iter()
        .map(|item| format!("{}\t{}\t{}", item.kind, item.path.display(), item.input))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_classify_text(rows: &[ClassifyRow]) -> String {
    rows.iter()
        .map(|row| match (&row.target, &row.error) {
            (Some(target), _) => format!(
                "{}\t{}\t{}\t{}",
                target.provider, target.content_kind, target.canonical_id, row.input
            ),
            (None, Some(error)) => format!("error\t{}\t{}", error, row.input),
            (None, None) => format!("error\t\t{}", row.input),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn kind_dir(root: &Path, kind: ContentKind) -> PathBuf {
    match kind {
        ContentKind::Character => root.join("characters"),
        ContentKind::Lorebook => root.join("lorebooks"),
    }
}

/// Writes each import into `<root>/characters` or `<root>/lorebooks`
struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn save(&self, content: &ImportedContent) -> Result<(), SinkError> {
        let dir = kind_dir(&self.root, content.content_kind);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(&content.file_name);
        std::fs::write(&path, &content.bytes)?;
        debug!(path = %path.display(), bytes = content.bytes.len(), "Saved");
        Ok(())
    }
}

#[async_trait]
impl ImportSink for DirectorySink {
    async fn import_character(&mut self, content: ImportedContent) -> Result<(), SinkError> {
        self.save(&content)
    }

    async fn import_lorebook(&mut self, content: ImportedContent) -> Result<(), SinkError> {
        self.save(&content)
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    if s.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
