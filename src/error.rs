use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("could not find the {marker} marker in column A")]
    MarkerNotFound { marker: String },

    #[error("no mapping found for report suite: {suite}")]
    UnmappedSuite { suite: String },

    #[error("unexpected date format in the report: {text}")]
    DateFormat { text: String },

    #[error("date range {range} does not cover full months or a full year")]
    PeriodInvalid { range: String },

    #[error("could not find the end of the {table} table: no blank row after row {start}")]
    MalformedTable { table: String, start: usize },

    #[error("the {table} table is missing its header rows")]
    MissingHeader { table: String },

    #[error("no date columns found in the {table} table")]
    NoDateColumns { table: String },

    #[error("duplicate value for {metric} at ({key}, {group}) in the {table} table")]
    DuplicateEntry {
        table: String,
        key: String,
        group: String,
        metric: String,
    },

    #[error("row label {value:?} in the {table} table is not a date")]
    InvalidPeriod { table: String, value: String },
}

impl ReportError {
    /// Errors that only abandon the sub-table being processed.
    pub fn is_table_local(&self) -> bool {
        matches!(
            self,
            Self::MalformedTable { .. }
                | Self::MissingHeader { .. }
                | Self::NoDateColumns { .. }
                | Self::DuplicateEntry { .. }
                | Self::InvalidPeriod { .. }
        )
    }
}
