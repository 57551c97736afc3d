//! Keyed storage for finished runs awaiting download.
//!
//! Each run gets its own token, so concurrent runs never see each other's
//! results. An entry is read at most once and disappears after its TTL.

pub mod history;

pub use history::{History, HistoryRecord};

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::export::{self, Export, ExportError, ExportFormat};
use crate::extractor::ResultTable;
use crate::runner::{RunMetadata, RunMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Table(ResultTable),
    /// Full curl output; previews are truncated, downloads are not.
    Raw { content: String, content_type: String },
}

#[derive(Debug, Clone)]
pub struct StoredRun {
    pub mode: RunMode,
    pub url: Url,
    /// Format chosen on the form, used when a download names none.
    pub format: ExportFormat,
    pub payload: Payload,
    pub metadata: RunMetadata,
}

impl StoredRun {
    pub fn export(&self, format: Option<ExportFormat>) -> Result<Export, ExportError> {
        let format = format.unwrap_or(self.format);
        match &self.payload {
            Payload::Table(table) => export::export_table(table, self.mode, format),
            Payload::Raw { content, .. } => export::export_raw(content, &self.url, format),
        }
    }
}

#[derive(Debug)]
struct Entry {
    run: StoredRun,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ResultStore {
    entries: Arc<DashMap<Uuid, Entry>>,
    ttl_seconds: i64,
}

impl ResultStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl_seconds,
        }
    }

    /// Store a run and hand back its token. Expired entries are purged first.
    pub fn put(&self, run: StoredRun) -> Uuid {
        self.put_at(run, Utc::now())
    }

    fn put_at(&self, run: StoredRun, now: DateTime<Utc>) -> Uuid {
        self.purge_expired_at(now);

        let token = Uuid::new_v4();
        // saturates for TTLs past the end of the calendar
        let expires_at = TimeDelta::try_seconds(self.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(token, Entry { run, expires_at });
        token
    }

    /// Remove and return a run. Expired entries count as absent.
    pub fn take(&self, token: &Uuid) -> Option<StoredRun> {
        self.take_at(token, Utc::now())
    }

    fn take_at(&self, token: &Uuid, now: DateTime<Utc>) -> Option<StoredRun> {
        let (_, entry) = self.entries.remove(token)?;
        if entry.expires_at <= now {
            debug!(%token, "stored run expired");
            return None;
        }
        Some(entry.run)
    }

    /// Export a run and remove it once the export succeeds. A failed export
    /// leaves the run in place so it can be downloaded in another format.
    /// `None` means the token is unknown or expired.
    pub fn take_export(
        &self,
        token: &Uuid,
        format: Option<ExportFormat>,
    ) -> Option<Result<Export, ExportError>> {
        self.take_export_at(token, format, Utc::now())
    }

    fn take_export_at(
        &self,
        token: &Uuid,
        format: Option<ExportFormat>,
        now: DateTime<Utc>,
    ) -> Option<Result<Export, ExportError>> {
        let Slot::Occupied(slot) = self.entries.entry(*token) else {
            return None;
        };
        if slot.get().expires_at <= now {
            slot.remove();
            debug!(%token, "stored run expired");
            return None;
        }

        let export = slot.get().run.export(format);
        if export.is_ok() {
            slot.remove();
        }
        Some(export)
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::Method;

    fn run(mode: RunMode) -> StoredRun {
        let url = Url::parse("https://example.com").unwrap();
        StoredRun {
            mode,
            url: url.clone(),
            format: ExportFormat::Json,
            payload: Payload::Table(ResultTable::new(
                vec!["email".to_string()],
                vec![vec!["a@b.com".to_string()]],
            )),
            metadata: RunMetadata::new(mode, Method::Get, &url, Utc::now()),
        }
    }

    #[test]
    fn test_take_reads_once() {
        let store = ResultStore::new(60);
        let token = store.put(run(RunMode::AutoFind));
        assert_eq!(store.len(), 1);

        let stored = store.take(&token).unwrap();
        assert_eq!(stored.mode, RunMode::AutoFind);
        assert!(store.take(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_runs_do_not_overwrite() {
        let store = ResultStore::new(60);
        let a = store.put(run(RunMode::Scrape));
        let b = store.put(run(RunMode::AutoFind));
        assert_ne!(a, b);
        assert_eq!(store.take(&b).unwrap().mode, RunMode::AutoFind);
        assert_eq!(store.take(&a).unwrap().mode, RunMode::Scrape);
    }

    #[test]
    fn test_expired_entries() {
        let store = ResultStore::new(60);
        let start = Utc::now();
        let token = store.put_at(run(RunMode::Scrape), start);

        assert!(store.take_at(&token, start + TimeDelta::seconds(61)).is_none());

        let stale = store.put_at(run(RunMode::Scrape), start);
        let fresh = store.put_at(run(RunMode::Curl), start + TimeDelta::seconds(61));
        assert!(store.entries.get(&stale).is_none());
        assert!(store.entries.get(&fresh).is_some());

        assert_eq!(store.purge_expired_at(start + TimeDelta::seconds(200)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        for ttl in [i64::MAX, i64::MAX / 2000] {
            let store = ResultStore::new(ttl);
            let token = store.put(run(RunMode::Scrape));
            assert!(store.take(&token).is_some());
        }
    }

    #[test]
    fn test_clear() {
        let store = ResultStore::new(60);
        store.put(run(RunMode::Scrape));
        store.put(run(RunMode::Scrape));
        assert_eq!(store.purge_expired(), 0);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_uses_stored_format_by_default() {
        let stored = run(RunMode::AutoFind);
        let export = stored.export(None).unwrap();
        assert_eq!(export.filename, "autofind_emails.json");

        let export = stored.export(Some(ExportFormat::Csv)).unwrap();
        assert_eq!(export.filename, "autofind_emails.csv");
        assert_eq!(String::from_utf8(export.bytes).unwrap(), "email\na@b.com\n");
    }

    #[test]
    fn test_failed_export_keeps_run() {
        let stored = StoredRun {
            payload: Payload::Table(ResultTable::new(
                vec!["text".to_string()],
                vec![vec!["x".repeat(40_000)]],
            )),
            ..run(RunMode::Scrape)
        };

        let store = ResultStore::new(60);
        let token = store.put(stored);

        let failed = store.take_export(&token, Some(ExportFormat::Xlsx)).unwrap();
        assert!(failed.is_err());
        assert_eq!(store.len(), 1);

        let export = store
            .take_export(&token, Some(ExportFormat::Csv))
            .unwrap()
            .unwrap();
        assert_eq!(export.filename, "scraped.csv");
        assert!(store.take_export(&token, None).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_export_skips_expired() {
        let store = ResultStore::new(60);
        let start = Utc::now();
        let token = store.put_at(run(RunMode::Scrape), start);

        let later = start + TimeDelta::seconds(61);
        assert!(store.take_export_at(&token, None, later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_raw_payload_export() {
        let url = Url::parse("https://example.com").unwrap();
        let stored = StoredRun {
            mode: RunMode::Curl,
            url: url.clone(),
            format: ExportFormat::Txt,
            payload: Payload::Raw {
                content: "hello".to_string(),
                content_type: "text/plain".to_string(),
            },
            metadata: RunMetadata::new(RunMode::Curl, Method::Get, &url, Utc::now()),
        };
        let export = stored.export(None).unwrap();
        assert_eq!(export.filename, "curl_example.com.txt");
        assert_eq!(export.bytes, b"hello");
    }
}
