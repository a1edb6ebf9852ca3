mod calendar;
mod enrich;
mod extract;
mod identity;
mod markers;
mod period;
mod reshape;
mod schema;
#[cfg(test)]
mod tests;

use tracing::{debug, info};

pub use identity::{Identity, SuiteRegistry};
pub use period::DateRange;
pub use reshape::ReshapeEngine;
pub use schema::TableKind;

use enrich::enrich;
use extract::extract_block;
use markers::{
    DATE_PREFIX, REPORT_SUITE_PREFIX, locate_labeled_block, locate_last_sentinel, locate_prefixed,
};
use schema::Locator;

use crate::error::ReportError;
use crate::output::OutputTable;
use crate::sheet::RawSheet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub identity: Identity,
    pub range: DateRange,
}

pub fn read_header(sheet: &RawSheet, registry: &SuiteRegistry) -> Result<ReportHeader, ReportError> {
    let (suite_row, suite) = locate_prefixed(sheet, REPORT_SUITE_PREFIX)?;
    info!(row = suite_row, suite = %suite, "found report suite");
    let identity = registry.resolve(&suite)?;

    let (date_row, date_text) = locate_prefixed(sheet, DATE_PREFIX)?;
    let range = DateRange::parse_marker(&date_text)?;
    info!(row = date_row, date_range = %range, "found report date range");

    if !range.is_full_period() {
        return Err(ReportError::PeriodInvalid {
            range: range.compact(),
        });
    }

    Ok(ReportHeader { identity, range })
}

pub fn extract_table(sheet: &RawSheet, kind: TableKind) -> Result<RawSheet, ReportError> {
    let schema = kind.schema();
    let start = match schema.locator {
        Locator::LastSentinel => locate_last_sentinel(sheet)? + 1,
        Locator::LabeledBlock(label) => locate_labeled_block(sheet, label)?,
    };

    let block = extract_block(sheet, start, schema.end, kind.tag())?;
    debug!(table = kind.tag(), start, rows = block.len(), "extracted table block");
    Ok(block)
}

pub fn process_table(
    sheet: &RawSheet,
    kind: TableKind,
    header: &ReportHeader,
    engine: &ReshapeEngine,
) -> Result<OutputTable, ReportError> {
    let schema = kind.schema();
    let block = extract_table(sheet, kind)?;
    let shaped = engine.reshape(&block, schema)?;
    let table = enrich(
        shaped,
        schema.enrichment,
        &header.identity,
        &header.range,
    );
    debug_assert_eq!(table.columns, schema.output_columns());
    Ok(table)
}
