//! Message archive discovery and loading.
//!
//! Reads message exports (`{"messages": [...]}`), repairs their escape
//! runs, drops reaction and like notices, and converts the rest into
//! [`MessageRecord`]s ordered by send time.

use std::path::{Path, PathBuf};

use archive_core::error::{ArchiveError, Result};
use archive_core::models::MessageRecord;
use archive_core::time_utils::datetime_from_millis;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::repair::repair_escapes;

/// Content prefix of reaction notices.
const REACTION_PREFIX: &str = "Reacted ";
/// Content prefix of like notices.
const LIKE_PREFIX: &str = "Liked ";

// ── File discovery ────────────────────────────────────────────────────────────

/// Find all `message_*.json` files recursively under `dir`, sorted by path.
pub fn find_message_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Archive directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_message_file_name(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Replace every directory in `inputs` with the message files below it.
///
/// Plain file paths pass through unchanged, even if they do not exist, so
/// that the read failure is reported against that path.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let found = find_message_files(input);
            if found.is_empty() {
                warn!("No message files found in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.to_path_buf());
        }
    }
    files
}

fn is_message_file_name(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.starts_with("message_") && name.ends_with(".json")
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Why a message entry did not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The entry has no `content` (photos, shares, calls, unsent messages).
    MissingContent,
    /// A "Reacted ..." notice.
    Reaction,
    /// A "Liked ..." notice.
    Like,
}

/// Classification of one entry of the `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Record(MessageRecord),
    Skipped(SkipReason),
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Loaded {
        records: usize,
        skipped: usize,
        decode_failures: usize,
    },
    /// The file contributed nothing; `reason` is the error message.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Records from every readable file plus a report per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// All surviving records, sorted ascending by timestamp.
    pub records: Vec<MessageRecord>,
    /// One entry per file, in the order the files were read.
    pub files: Vec<FileReport>,
}

impl IngestReport {
    pub fn files_loaded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Loaded { .. }))
            .count()
    }

    pub fn files_failed(&self) -> usize {
        self.files.len() - self.files_loaded()
    }

    pub fn entries_skipped(&self) -> usize {
        self.loaded_counts().map(|(_, skipped, _)| skipped).sum()
    }

    pub fn decode_failures(&self) -> usize {
        self.loaded_counts().map(|(_, _, failures)| failures).sum()
    }

    fn loaded_counts(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.files.iter().filter_map(|f| match f.status {
            FileStatus::Loaded {
                records,
                skipped,
                decode_failures,
            } => Some((records, skipped, decode_failures)),
            FileStatus::Failed { .. } => None,
        })
    }
}

// ── MessageIngestor ───────────────────────────────────────────────────────────

/// Loads message archives into records local to one timezone.
#[derive(Debug, Clone, Copy)]
pub struct MessageIngestor {
    tz: Tz,
}

impl MessageIngestor {
    /// Create an ingestor that converts send times into `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Load every archive in `paths` and return the records sorted by
    /// timestamp. Unreadable files are logged and left out.
    pub fn ingest<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<MessageRecord> {
        self.ingest_with_report(paths).records
    }

    /// Like [`MessageIngestor::ingest`] but also reports per-file outcomes.
    ///
    /// Directories in `paths` are expanded to the `message_*.json` files
    /// below them. A file that fails to read or parse is reported as
    /// [`FileStatus::Failed`] and the remaining files are still processed.
    pub fn ingest_with_report<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let files = expand_inputs(paths);
        let mut records: Vec<MessageRecord> = Vec::new();
        let mut reports: Vec<FileReport> = Vec::with_capacity(files.len());

        for path in files {
            let status = match self.ingest_file(&path) {
                Ok(loaded) => {
                    debug!(
                        "File {}: {} records, {} skipped, {} decode failures",
                        path.display(),
                        loaded.records.len(),
                        loaded.skipped,
                        loaded.decode_failures,
                    );
                    let status = FileStatus::Loaded {
                        records: loaded.records.len(),
                        skipped: loaded.skipped,
                        decode_failures: loaded.decode_failures,
                    };
                    records.extend(loaded.records);
                    status
                }
                Err(e) => {
                    warn!("Error processing file {}: {}", path.display(), e);
                    FileStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            reports.push(FileReport { path, status });
        }

        // Stable sort keeps encounter order for equal timestamps.
        records.sort_by_key(|r| r.timestamp());

        debug!(
            "Ingested {} records from {} files",
            records.len(),
            reports.len()
        );

        IngestReport {
            records,
            files: reports,
        }
    }

    /// Read, repair, parse and classify one archive file.
    fn ingest_file(&self, path: &Path) -> Result<LoadedFile> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArchiveError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let repaired = repair_escapes(&raw);
        let archive: RawArchive = serde_json::from_str(&repaired.text)?;

        let mut loaded = LoadedFile {
            records: Vec::with_capacity(archive.messages.len()),
            skipped: 0,
            decode_failures: repaired.decode_failures,
        };
        for (index, entry) in archive.messages.into_iter().enumerate() {
            match classify_entry(index, entry, self.tz)? {
                EntryOutcome::Record(record) => loaded.records.push(record),
                EntryOutcome::Skipped(_) => loaded.skipped += 1,
            }
        }

        Ok(loaded)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

struct LoadedFile {
    records: Vec<MessageRecord>,
    skipped: usize,
    decode_failures: usize,
}

#[derive(Deserialize)]
struct RawArchive {
    messages: Vec<RawMessage>,
}

/// One `messages` entry. Everything is optional here so that filtered
/// entries never need the fields a record requires.
#[derive(Deserialize)]
struct RawMessage {
    content: Option<String>,
    timestamp_ms: Option<i64>,
    sender_name: Option<String>,
}

fn classify_entry(index: usize, entry: RawMessage, tz: Tz) -> Result<EntryOutcome> {
    let Some(content) = entry.content else {
        return Ok(EntryOutcome::Skipped(SkipReason::MissingContent));
    };
    if content.starts_with(REACTION_PREFIX) {
        return Ok(EntryOutcome::Skipped(SkipReason::Reaction));
    }
    if content.starts_with(LIKE_PREFIX) {
        return Ok(EntryOutcome::Skipped(SkipReason::Like));
    }

    let millis = entry.timestamp_ms.ok_or(ArchiveError::MissingField {
        index,
        field: "timestamp_ms",
    })?;
    let sender = entry.sender_name.ok_or(ArchiveError::MissingField {
        index,
        field: "sender_name",
    })?;
    let timestamp =
        datetime_from_millis(millis, tz).ok_or(ArchiveError::TimestampOutOfRange(millis))?;

    Ok(EntryOutcome::Record(MessageRecord::new(content, timestamp, sender)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
