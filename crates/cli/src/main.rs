//! Bulk file classifier
//!
//! `classifier <input> [--no-save] [--model <id>]` reads a UTF-8 text file,
//! runs the import preprocessor and the paste pipeline, prints the typed
//! blocks as JSON and persists session memory unless `--no-save`.
//!
//! Exit codes: 0 success, 1 failed precondition (missing file, unsupported
//! type, missing credentials), 2 extraction failure, 3 classification
//! failure.

use clap::Parser;
use filmlane_adjudicator::{AdjudicatorConfig, HttpAdjudicator};
use filmlane_memory::{FeedbackStore, InMemoryStore, JsonFileStore, KeyValueStore, SessionMemory};
use filmlane_pipeline::{
    preprocess_import, ExtractedFormat, PasteOutcome, PastePipeline, PasteSource, PipelineConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXIT_PRECONDITION: u8 = 1;
const EXIT_EXTRACTION: u8 = 2;
const EXIT_CLASSIFICATION: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "classifier", about = "صنّف نص سيناريو عربي إلى كتل منسقة")]
struct Args {
    /// Input text file (UTF-8).
    input: PathBuf,

    /// Do not persist session memory.
    #[arg(long)]
    no_save: bool,

    /// Adjudicator model id; only used when review is configured.
    #[arg(long)]
    model: Option<String>,
}

#[derive(Serialize)]
struct OutputBlock<'a> {
    #[serde(rename = "formatId")]
    format_id: &'a str,
    text: &'a str,
    confidence: u8,
}

fn fail(code: u8, message: &str) -> ExitCode {
    eprintln!("{message}");
    ExitCode::from(code)
}

fn print_blocks(outcome: &PasteOutcome) {
    let output: Vec<OutputBlock<'_>> = outcome
        .blocks
        .iter()
        .map(|b| OutputBlock {
            format_id: b.block.format_id.as_str(),
            text: &b.block.text,
            confidence: b.confidence,
        })
        .collect();
    // Writing a vec of plain structs cannot fail.
    println!("{}", serde_json::to_string_pretty(&output).expect("serializable output"));
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !args.input.exists() {
        return fail(EXIT_PRECONDITION, "ملف الإدخال غير موجود");
    }
    let is_txt = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return fail(EXIT_PRECONDITION, "نوع الملف غير مدعوم، المطلوب ملف txt");
    }

    let text = match std::fs::read_to_string(&args.input) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "read failed");
            return fail(EXIT_EXTRACTION, "تعذّرت قراءة الملف كنص صالح");
        }
    };

    let review_endpoint = std::env::var("FILMLANE_REVIEW_ENDPOINT").ok();
    let mut config = PipelineConfig::default();
    config.review_enabled = review_endpoint.is_some();

    let store: Arc<dyn KeyValueStore> = if args.no_save {
        Arc::new(InMemoryStore::new())
    } else {
        let root = std::env::var("FILMLANE_DATA_DIR").unwrap_or_else(|_| ".filmlane".to_string());
        match JsonFileStore::new(root) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!(error = %e, "memory store unavailable");
                return fail(EXIT_PRECONDITION, "تعذّر تجهيز مخزن الذاكرة");
            }
        }
    };

    let mut pipeline = PastePipeline::new(config)
        .with_memory(SessionMemory::new(store.clone()))
        .with_feedback(FeedbackStore::new(store));

    if let Some(endpoint) = review_endpoint {
        let mut adjudicator_config = AdjudicatorConfig::default()
            .with_endpoint(endpoint)
            .with_enabled(true);
        if let Some(model) = &args.model {
            adjudicator_config = adjudicator_config.with_model(model.clone());
        }
        let adjudicator = match HttpAdjudicator::new(adjudicator_config) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "adjudicator client setup failed");
                return fail(EXIT_PRECONDITION, "تعذّر تجهيز عميل المراجعة");
            }
        };
        if !adjudicator.has_credentials() {
            return fail(
                EXIT_PRECONDITION,
                "مفتاح المراجعة غير موجود في FILMLANE_REVIEW_TOKEN",
            );
        }
        pipeline = pipeline.with_adjudicator(Arc::new(adjudicator));
    }

    let import = preprocess_import(&text, ExtractedFormat::PlainText);
    tracing::info!(
        lines = import.lines.len(),
        quality = import.quality,
        "import preprocessed"
    );

    let session_id = format!(
        "file-{}",
        filmlane_codec::fnv1a_hex(args.input.to_string_lossy().as_bytes())
    );
    let joined = import.lines.join("\n");

    match pipeline
        .paste(&session_id, &joined, PasteSource::FileImport)
        .await
    {
        Ok(outcome) => {
            print_blocks(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "classification failed");
            fail(EXIT_CLASSIFICATION, "فشل تصنيف المستند")
        }
    }
}
