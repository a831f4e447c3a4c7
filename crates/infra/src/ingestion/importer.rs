//! Import pipeline: notification -> fetch -> parse -> tag -> chunked batch writes.
//!
//! Errors are contained per file. A malformed key or unknown category is
//! skipped, a failed fetch drops that file, and unprocessed or failed batch
//! items are logged and dropped. Nothing is retried, and [`Importer::handle`]
//! always completes with a report.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use catalog_products::codec::{self, item_key};
use catalog_products::{ImportCategory, Item, ObjectKey, ProductRecord, parse_rows};

use crate::catalog_store::CatalogStore;
use crate::object_source::ObjectSource;

use super::notification::ObjectCreatedNotification;

/// Per-invocation summary, one entry per notification record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub files: Vec<FileReport>,
}

impl ImportReport {
    /// Rows handed to the store across all files.
    pub fn rows_submitted(&self) -> usize {
        self.files
            .iter()
            .map(|f| match &f.outcome {
                FileOutcome::Imported { rows, .. } => *rows,
                _ => 0,
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub bucket: String,
    pub key: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Skipped(SkipReason),
    FetchFailed {
        message: String,
    },
    Imported {
        category: String,
        rows: usize,
        rejected_rows: usize,
        batches: usize,
        written: usize,
        unprocessed: usize,
        failed_batches: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Key is not `<category>/<filename>`.
    MalformedKey,
    UnknownCategory { category: String },
}

/// Outcome of writing one file's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistSummary {
    pub batches: usize,
    pub written: usize,
    pub unprocessed: usize,
    pub failed_batches: usize,
    pub failed_rows: usize,
}

/// Turns uploaded CSV files into catalog records.
pub struct Importer {
    source: Arc<dyn ObjectSource>,
    store: Arc<dyn CatalogStore>,
    batch_write_max: usize,
}

impl Importer {
    /// `batch_write_max` is the largest number of items sent in one batch write
    /// (values below 1 are treated as 1).
    pub fn new(
        source: Arc<dyn ObjectSource>,
        store: Arc<dyn CatalogStore>,
        batch_write_max: usize,
    ) -> Self {
        Self {
            source,
            store,
            batch_write_max: batch_write_max.max(1),
        }
    }

    pub fn batch_write_max(&self) -> usize {
        self.batch_write_max
    }

    /// Process every record of a notification, one after another.
    pub async fn handle(&self, notification: &ObjectCreatedNotification) -> ImportReport {
        let mut report = ImportReport::default();

        for record in &notification.records {
            let outcome = self.import_object(record.bucket(), record.key()).await;
            report.files.push(FileReport {
                bucket: record.bucket().to_string(),
                key: record.key().to_string(),
                outcome,
            });
        }

        info!(
            files = report.files.len(),
            rows = report.rows_submitted(),
            "import notification processed"
        );
        report
    }

    /// Import a single object. `raw_key` is URL-encoded as in notifications.
    #[instrument(skip_all, fields(bucket = %bucket, key = %raw_key))]
    pub async fn import_object(&self, bucket: &str, raw_key: &str) -> FileOutcome {
        // Segments are split on the raw key, so an encoded `/` stays inside its segment.
        let Some(raw) = ObjectKey::parse(raw_key) else {
            debug!("object key is not <category>/<filename>; skipping");
            return FileOutcome::Skipped(SkipReason::MalformedKey);
        };
        let (Some(category), Some(filename)) = (
            decode_key_segment(raw.category.as_str()),
            decode_key_segment(&raw.filename),
        ) else {
            debug!("object key is not valid UTF-8 once decoded; skipping");
            return FileOutcome::Skipped(SkipReason::MalformedKey);
        };
        let key = format!("{category}/{filename}");
        let category = ImportCategory::from_segment(&category);

        let Some(kind) = category.record_kind() else {
            debug!(category = %category.as_str(), "unknown import category; skipping");
            return FileOutcome::Skipped(SkipReason::UnknownCategory {
                category: category.as_str().to_string(),
            });
        };

        let text = match self.source.get_object(bucket, &key).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to fetch import file");
                return FileOutcome::FetchFailed {
                    message: e.to_string(),
                };
            }
        };

        let parsed = parse_rows(kind, &text);
        for rejected in &parsed.rejected {
            warn!(row = rejected.row, error = %rejected.message, "rejected import row");
        }
        let rows = parsed.rows.len();
        let rejected_rows = parsed.rejected.len();
        info!(kind = %kind, rows, rejected_rows, "parsed import file");

        let summary = self.persist(parsed.into_records()).await;

        FileOutcome::Imported {
            category: category.as_str().to_string(),
            rows,
            rejected_rows,
            batches: summary.batches,
            written: summary.written,
            unprocessed: summary.unprocessed,
            failed_batches: summary.failed_batches,
        }
    }

    /// Write records in sequential chunks of at most `batch_write_max`.
    ///
    /// Chunk `i` holds records `[i * max, (i + 1) * max)`. A chunk is only
    /// submitted after the previous call returned.
    pub async fn persist(&self, records: Vec<ProductRecord>) -> PersistSummary {
        let mut summary = PersistSummary::default();
        let batch_count = records.len().div_ceil(self.batch_write_max);
        debug!(
            "{} / {} = {} batches",
            records.len(),
            self.batch_write_max,
            batch_count
        );

        for (batch, chunk) in records.chunks(self.batch_write_max).enumerate() {
            let items: Vec<Item> = chunk.iter().map(codec::encode).collect();
            summary.batches += 1;

            match self.store.batch_write(items).await {
                Ok(output) => {
                    let unprocessed = output.unprocessed.len();
                    summary.written += chunk.len().saturating_sub(unprocessed);
                    summary.unprocessed += unprocessed;
                    if unprocessed > 0 {
                        let keys: Vec<_> = output
                            .unprocessed
                            .iter()
                            .filter_map(|item| item_key(item).ok())
                            .collect();
                        warn!(batch, unprocessed, ?keys, "batch write left unprocessed items; dropping");
                    }
                }
                Err(e) => {
                    summary.failed_batches += 1;
                    summary.failed_rows += chunk.len();
                    error!(batch, rows = chunk.len(), error = %e, "batch write failed; dropping chunk");
                }
            }
        }

        summary
    }
}

/// Notification keys are URL-encoded with `+` for spaces.
fn decode_key_segment(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|key| key.into_owned())
}
