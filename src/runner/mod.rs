//! The pipeline orchestrator: validate a form, fetch, extract, post-process,
//! then store the result for download.

pub mod errors;
pub mod form;
pub mod metadata;

pub use errors::{ErrorKind, RunError, ValidationError};
pub use form::{RunForm, RunMode, RunPlan};
pub use metadata::RunMetadata;

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::extractor::{self, ExtractionSpec, ResultTable, autofind};
use crate::fetcher::PageFetcher;
use crate::store::{History, Payload, ResultStore, StoredRun};

pub const PREVIEW_CHAR_LIMIT: usize = 10_000;
pub const TRUNCATION_MARKER: &str = "...";

/// What one run produced. Exactly one of `table` and `raw_preview` is set.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub token: Uuid,
    pub table: Option<ResultTable>,
    pub raw_preview: Option<String>,
    pub metadata: RunMetadata,
}

pub struct Runner {
    fetcher: Arc<dyn PageFetcher>,
    store: ResultStore,
    history: History,
    default_timeout_secs: u64,
}

impl Runner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: ResultStore,
        history: History,
        default_timeout_secs: u64,
    ) -> Self {
        Self {
            fetcher,
            store,
            history,
            default_timeout_secs,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run the whole pipeline for one form submission. Validation happens
    /// before any request is made.
    #[instrument(skip_all, fields(url = %form.url, mode = %form.mode, autofind = form.autofind))]
    pub async fn run(&self, form: &RunForm) -> Result<RunOutput, RunError> {
        let plan = form.validate(self.default_timeout_secs)?;
        let started = Utc::now();

        let mut metadata =
            RunMetadata::new(plan.mode, plan.request.method, &plan.request.url, started);
        metadata.unique = plan.flags.unique_only;
        metadata.clean = plan.flags.clean_whitespace;

        let mut raw_preview = None;
        let payload = match &plan.spec {
            None => {
                let page = self.fetcher.fetch(&plan.request).await?;
                let preview = curl_preview(&page.body);
                metadata.descriptor = page.content_type.clone();
                metadata.content_length = Some(preview.chars().count());
                raw_preview = Some(truncate_preview(&preview));
                Payload::Raw {
                    content: page.body,
                    content_type: page.content_type,
                }
            }
            Some(ExtractionSpec::AutoFind) => {
                let outcome =
                    autofind::auto_find(self.fetcher.as_ref(), &plan.request, &plan.target)
                        .await?;
                metadata.descriptor = ExtractionSpec::AutoFind.descriptor();
                metadata.contact_candidates = Some(outcome.candidates);
                Payload::Table(outcome.table)
            }
            Some(spec) => {
                let page = self.fetcher.fetch(&plan.request).await?;
                let table = extractor::extract(&page.body, spec, plan.flags)?;
                metadata.descriptor = spec.descriptor();
                Payload::Table(table)
            }
        };

        let table = match &payload {
            Payload::Table(table) => {
                metadata.row_count = table.len();
                Some(table.clone())
            }
            Payload::Raw { .. } => None,
        };

        let token = self.store.put(StoredRun {
            mode: plan.mode,
            url: plan.request.url.clone(),
            format: plan.format,
            payload,
            metadata: metadata.clone(),
        });
        self.history
            .record(plan.request.url.as_str(), plan.mode, started);

        info!(
            %token,
            mode = plan.mode.as_str(),
            rows = metadata.row_count,
            "run finished"
        );

        Ok(RunOutput {
            token,
            table,
            raw_preview,
            metadata,
        })
    }
}

/// JSON bodies are pretty-printed; anything else is shown as-is.
pub fn curl_preview(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

/// Keep text shorter than the limit untouched; otherwise cut it at the limit
/// and append the marker.
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() < PREVIEW_CHAR_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHAR_LIMIT).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}
