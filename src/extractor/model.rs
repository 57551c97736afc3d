use serde::Serialize;
use utoipa::ToSchema;

/// Which extraction strategy a scrape uses. Selectors and regex work on a
/// single fetched body; auto-find crawls contact pages on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSpec {
    /// One column per selector. `pattern`, when set, filters each element's
    /// value instead of the whole page.
    Selectors {
        selectors: Vec<String>,
        pattern: Option<String>,
    },
    /// Whole-body regex, one row per match.
    Regex { pattern: String },
    /// Contact page discovery plus email harvesting.
    AutoFind,
}

impl ExtractionSpec {
    /// Human readable summary used in run metadata.
    pub fn descriptor(&self) -> String {
        match self {
            Self::Selectors { selectors, pattern } => {
                let joined = selectors.join(", ");
                match pattern {
                    Some(pattern) => format!("{} ~ /{}/", joined, pattern),
                    None => joined,
                }
            }
            Self::Regex { pattern } => format!("/{}/", pattern),
            Self::AutoFind => "auto-find".to_string(),
        }
    }
}

/// Post-processing flags shared by the body strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostProcess {
    pub clean_whitespace: bool,
    pub unique_only: bool,
}

/// Normalised tabular output. Every row has exactly `columns.len()` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Build a table, repairing any width disagreement instead of failing:
    /// labels that do not match the row width are replaced by `Column_N`,
    /// and short rows are padded with empty strings.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(columns.len());

        let columns = if !rows.is_empty() && columns.len() != width {
            tracing::debug!(
                labels = columns.len(),
                width,
                "column labels do not match row width, using generic labels"
            );
            generic_labels(width)
        } else {
            columns
        };

        for row in &mut rows {
            row.resize(width, String::new());
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// At most `limit` leading rows, for previews.
    pub fn head(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

pub fn generic_labels(width: usize) -> Vec<String> {
    (1..=width).map(|i| format!("Column_{}", i)).collect()
}
