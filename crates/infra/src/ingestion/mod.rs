//! File-arrival ingestion: object-created notifications to catalog records.

pub mod importer;
pub mod notification;

pub use importer::{FileOutcome, FileReport, ImportReport, Importer, PersistSummary, SkipReason};
pub use notification::{NotificationRecord, ObjectCreatedNotification};
