//! Message analysis pipeline.
//!
//! Composes ingestion and aggregation into the entry point the shell
//! calls, and records a summary of the run alongside the metrics.

use std::path::Path;

use archive_core::models::ActivityMetrics;
use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;

use crate::aggregator::ActivityAggregator;
use crate::reader::{FileReport, MessageIngestor};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the activity metrics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// IANA name of the timezone used for buckets.
    pub timezone: String,
    /// Files read after expanding directories.
    pub files_requested: usize,
    pub files_loaded: usize,
    pub files_failed: usize,
    /// Messages that became records.
    pub records: usize,
    /// Entries dropped as reactions, likes or content-less messages.
    pub entries_skipped: usize,
    /// Escape runs that could not be decoded.
    pub decode_failures: usize,
    pub total_characters: u64,
    /// Local time of the earliest record, RFC 3339.
    pub first_message: Option<String>,
    /// Local time of the latest record, RFC 3339.
    pub last_message: Option<String>,
    /// Wall-clock seconds spent reading and parsing files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`analyze_messages`].
#[derive(Debug, Clone, Serialize)]
pub struct MessageAnalysis {
    pub metrics: ActivityMetrics,
    pub metadata: AnalysisMetadata,
    /// Per-file outcomes, in read order.
    pub files: Vec<FileReport>,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Ingest `paths` and aggregate the records into activity metrics.
pub fn ingest_and_aggregate<P: AsRef<Path>>(paths: &[P], tz: Tz) -> ActivityMetrics {
    let records = MessageIngestor::new(tz).ingest(paths);
    ActivityAggregator::aggregate(&records)
}

/// Run the full message pipeline.
///
/// 1. Ingest every archive (directories expanded) via [`MessageIngestor`].
/// 2. Aggregate the sorted records via [`ActivityAggregator`].
/// 3. Return the metrics with run metadata and per-file reports.
pub fn analyze_messages<P: AsRef<Path>>(paths: &[P], tz: Tz) -> MessageAnalysis {
    // ── Step 1: Ingest ────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let report = MessageIngestor::new(tz).ingest_with_report(paths);
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let metrics = ActivityAggregator::aggregate(&report.records);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    // ── Step 3: Metadata ──────────────────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        timezone: tz.name().to_string(),
        files_requested: report.files.len(),
        files_loaded: report.files_loaded(),
        files_failed: report.files_failed(),
        records: report.records.len(),
        entries_skipped: report.entries_skipped(),
        decode_failures: report.decode_failures(),
        total_characters: metrics.total_characters(),
        first_message: report.records.first().map(|r| r.timestamp().to_rfc3339()),
        last_message: report.records.last().map(|r| r.timestamp().to_rfc3339()),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    tracing::info!(
        "Analyzed {} messages from {}/{} files",
        metadata.records,
        metadata.files_loaded,
        metadata.files_requested
    );

    MessageAnalysis {
        metrics,
        metadata,
        files: report.files,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
