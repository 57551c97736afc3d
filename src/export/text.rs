/// Fixed-width plain text table: header line, then rows, every column
/// right-aligned to its widest cell and separated by one space.
pub fn table_to_text(columns: &[String], rows: &[Vec<String>]) -> String {
    let cells = |row: &[String]| -> Vec<String> {
        row.iter().map(|c| c.replace('\n', "\\n")).collect()
    };

    let header = cells(columns);
    let body: Vec<Vec<String>> = rows.iter().map(|r| cells(r.as_slice())).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut out = render(header.as_slice());
    out.push('\n');
    for row in &body {
        out.push_str(&render(row.as_slice()));
        out.push('\n');
    }
    out
}
