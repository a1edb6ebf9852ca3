use crate::error::ReportError;
use crate::sheet::RawSheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    EndOfSheet,
    BlankRow,
}

pub fn extract_block(
    sheet: &RawSheet,
    start: usize,
    policy: EndPolicy,
    table: &str,
) -> Result<RawSheet, ReportError> {
    let rows = sheet.rows();
    let start = start.min(rows.len());

    let end = match policy {
        EndPolicy::EndOfSheet => rows.len(),
        EndPolicy::BlankRow => (start..rows.len())
            .find(|&row| sheet.row_is_blank(row))
            .ok_or_else(|| ReportError::MalformedTable {
                table: table.to_string(),
                start,
            })?,
    };

    Ok(RawSheet::new(rows[start..end].to_vec()))
}
