use rust_xlsxwriter::Workbook;

use crate::export::ExportError;

/// Longest string a single spreadsheet cell accepts, in characters.
const CELL_CHAR_LIMIT: usize = 32_767;

fn cell(row: usize, col: usize) -> Result<(u32, u16), ExportError> {
    let r = u32::try_from(row).map_err(|_| ExportError::TooLarge(format!("row {}", row)))?;
    let c = u16::try_from(col).map_err(|_| ExportError::TooLarge(format!("column {}", col)))?;
    Ok((r, c))
}

/// Single worksheet: header in row 0, data below.
pub fn table_to_xlsx(columns: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (c, label) in columns.iter().enumerate() {
        let (r, c) = cell(0, c)?;
        worksheet.write_string(r, c, label)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (r, c) = cell(i + 1, c)?;
            worksheet.write_string(r, c, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// "Content" in A1, the raw content from A2 down. Content longer than one
/// cell holds continues in the next row.
pub fn raw_to_xlsx(content: &str) -> Result<Vec<u8>, ExportError> {
    table_to_xlsx(&["Content".to_string()], &cell_chunks(content))
}

fn cell_chunks(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut chars = content.chars().peekable();
    loop {
        let chunk: String = chars.by_ref().take(CELL_CHAR_LIMIT).collect();
        rows.push(vec![chunk]);
        if chars.peek().is_none() {
            return rows;
        }
    }
}
