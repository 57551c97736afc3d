pub mod autofind;
pub mod cleaner;
pub mod errors;
pub mod model;
pub mod pattern;
pub mod selectors;

#[cfg(test)]
mod tests;

pub use errors::ExtractError;
pub use model::{ExtractionSpec, PostProcess, ResultTable};

use scraper::Html;

use crate::extractor::{
    autofind::page_emails,
    cleaner::dedup_rows,
    selectors::{align, column_label, select_values},
};

pub const REGEX_COLUMN: &str = "regex_match";
pub const EMAIL_COLUMN: &str = "email";

/// Turn a fetched body into a table.
///
/// `AutoFind` here only covers the single page it is given (body emails,
/// then mailto links); the crawl across contact pages lives in
/// [`autofind::auto_find`].
pub fn extract(
    body: &str,
    spec: &ExtractionSpec,
    flags: PostProcess,
) -> Result<ResultTable, ExtractError> {
    let (columns, rows): (Vec<String>, Vec<Vec<String>>) = match spec {
        ExtractionSpec::Selectors {
            selectors,
            pattern: filter_pattern,
        } => {
            let filter = filter_pattern
                .as_deref()
                .map(pattern::compile)
                .transpose()?;
            let document = Html::parse_document(body);

            let values = selectors
                .iter()
                .map(|s| select_values(&document, s, filter.as_ref(), flags.clean_whitespace))
                .collect::<Result<Vec<_>, _>>()?;

            let columns = selectors.iter().map(|s| column_label(s)).collect();
            (columns, align(&values))
        }
        ExtractionSpec::Regex { pattern: source } => {
            let re = pattern::compile(source)?;
            let rows = pattern::body_matches(&re, body, flags.clean_whitespace)
                .into_iter()
                .map(|m| vec![m])
                .collect();
            (vec![REGEX_COLUMN.to_string()], rows)
        }
        ExtractionSpec::AutoFind => {
            let rows = page_emails(body).into_iter().map(|e| vec![e]).collect();
            (vec![EMAIL_COLUMN.to_string()], rows)
        }
    };

    let rows = if flags.unique_only {
        dedup_rows(rows)
    } else {
        rows
    };

    Ok(ResultTable::new(columns, rows))
}
