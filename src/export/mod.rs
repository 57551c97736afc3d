//! Mechanical encoders for finished runs.
//!
//! Tables come from scrape and auto-find runs; raw content comes from curl
//! runs. Both can be written as CSV, JSON, plain text or a spreadsheet.

pub mod csv;
pub mod text;
pub mod xlsx;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

use crate::extractor::ResultTable;
use crate::runner::RunMode;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table too large for spreadsheet ({0})")]
    TooLarge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Txt,
    Xlsx,
}

impl ExportFormat {
    /// Lenient form parsing: anything unrecognised means CSV.
    pub fn from_form(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Txt => "text/plain",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoded file ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

fn file_stem(mode: RunMode) -> &'static str {
    match mode {
        RunMode::AutoFind => "autofind_emails",
        RunMode::Scrape => "scraped",
        RunMode::Curl => "curl",
    }
}

/// `[{column: value}, ...]`. A repeated label keeps its last value.
fn table_to_records(table: &ResultTable) -> Value {
    let records = table
        .rows()
        .iter()
        .map(|row| {
            let record: Map<String, Value> = table
                .columns()
                .iter()
                .cloned()
                .zip(row.iter().cloned().map(Value::String))
                .collect();
            Value::Object(record)
        })
        .collect();
    Value::Array(records)
}

pub fn export_table(
    table: &ResultTable,
    mode: RunMode,
    format: ExportFormat,
) -> Result<Export, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => csv::table_to_csv(table.columns(), table.rows())?,
        ExportFormat::Json => serde_json::to_vec(&table_to_records(table))?,
        ExportFormat::Txt => text::table_to_text(table.columns(), table.rows()).into_bytes(),
        ExportFormat::Xlsx => xlsx::table_to_xlsx(table.columns(), table.rows())?,
    };

    Ok(Export {
        bytes,
        filename: format!("{}.{}", file_stem(mode), format.extension()),
        content_type: format.content_type(),
    })
}

/// Host plus explicit port, if any.
fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

pub fn export_raw(content: &str, url: &Url, format: ExportFormat) -> Result<Export, ExportError> {
    let (bytes, filename) = match format {
        ExportFormat::Txt => (
            content.as_bytes().to_vec(),
            format!("curl_{}.txt", netloc(url)),
        ),
        ExportFormat::Json => {
            let bytes = match serde_json::from_str::<Value>(content) {
                Ok(parsed) => serde_json::to_vec_pretty(&parsed)?,
                Err(_) => serde_json::to_vec(&serde_json::json!({ "content": content }))?,
            };
            (bytes, "curl.json".to_string())
        }
        ExportFormat::Xlsx => (xlsx::raw_to_xlsx(content)?, "curl.xlsx".to_string()),
        ExportFormat::Csv => (csv::raw_to_csv(content)?, "curl.csv".to_string()),
    };

    Ok(Export {
        bytes,
        filename,
        content_type: format.content_type(),
    })
}
