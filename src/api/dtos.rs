use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::runner::{ErrorKind, RunMetadata, RunOutput};

/// Preview rows returned inline; downloads carry everything.
pub const PREVIEW_ROWS: usize = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunResponse {
    /// Pass to the download endpoint. Valid for one download.
    pub token: Uuid,
    pub columns: Vec<String>,
    /// First rows of the table, at most 100.
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    /// Curl mode only.
    pub raw_preview: Option<String>,
    pub metadata: RunMetadata,
}

impl From<RunOutput> for RunResponse {
    fn from(output: RunOutput) -> Self {
        let (columns, rows, total_rows) = match &output.table {
            Some(table) => (
                table.columns().to_vec(),
                table.head(PREVIEW_ROWS).to_vec(),
                table.len(),
            ),
            None => (Vec::new(), Vec::new(), 0),
        };

        Self {
            token: output.token,
            columns,
            rows,
            total_rows,
            raw_preview: output.raw_preview,
            metadata: output.metadata,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// csv, json, txt or xlsx. Defaults to the format chosen for the run.
    pub format: Option<String>,
}
