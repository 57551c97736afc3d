use ::csv::Writer;

use crate::export::ExportError;

/// Header row followed by every data row. Fields are quoted only when they
/// contain a comma, a quote or a line break.
pub fn table_to_csv(columns: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Raw content as a one-column file. Newlines are escaped as `\n` so the
/// content stays on a single record.
pub fn raw_to_csv(content: &str) -> Result<Vec<u8>, ExportError> {
    let escaped = content.replace('\n', "\\n");
    table_to_csv(&["content".to_string()], &[vec![escaped]])
}
