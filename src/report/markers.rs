use crate::error::ReportError;
use crate::sheet::RawSheet;

pub const REPORT_SUITE_PREFIX: &str = "# Report suite: ";
pub const DATE_PREFIX: &str = "# Date: ";
pub const FREEFORM_SENTINEL: &str = "##############################################";
pub const MONTHLY_TABLE_LABEL: &str = "Freeform table";

const LABELED_BLOCK_HEADER_ROWS: usize = 2;

pub fn find_prefixed(sheet: &RawSheet, prefix: &str) -> Option<(usize, String)> {
    (0..sheet.len()).find_map(|row| {
        sheet
            .marker_text(row)
            .and_then(|text| text.strip_prefix(prefix))
            .map(|rest| (row, rest.trim().to_string()))
    })
}

pub fn find_last_containing(sheet: &RawSheet, needle: &str) -> Option<usize> {
    (0..sheet.len())
        .rev()
        .find(|&row| sheet.marker_text(row).is_some_and(|text| text.contains(needle)))
}

/// Index of the first row after the two-row block header introduced by
/// `# <label>` (matched with or without the label's internal spaces).
pub fn find_labeled_block(sheet: &RawSheet, label: &str) -> Option<usize> {
    let spaced = format!("# {label}");
    let compact = format!("# {}", label.replace(' ', ""));

    (0..sheet.len())
        .find(|&row| {
            sheet
                .marker_text(row)
                .is_some_and(|text| text.contains(&compact) || text.contains(&spaced))
        })
        .map(|row| row + LABELED_BLOCK_HEADER_ROWS)
}

pub fn locate_prefixed(sheet: &RawSheet, prefix: &str) -> Result<(usize, String), ReportError> {
    find_prefixed(sheet, prefix).ok_or_else(|| ReportError::MarkerNotFound {
        marker: prefix.trim().to_string(),
    })
}

pub fn locate_last_sentinel(sheet: &RawSheet) -> Result<usize, ReportError> {
    find_last_containing(sheet, FREEFORM_SENTINEL).ok_or_else(|| ReportError::MarkerNotFound {
        marker: "freeform table sentinel".to_string(),
    })
}

pub fn locate_labeled_block(sheet: &RawSheet, label: &str) -> Result<usize, ReportError> {
    find_labeled_block(sheet, label).ok_or_else(|| ReportError::MarkerNotFound {
        marker: format!("# {label}"),
    })
}
