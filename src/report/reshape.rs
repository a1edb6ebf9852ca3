use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use super::schema::{
    DimensionOrder, DuplicatePolicy, Layout, SortOrder, SplitRule, TableSchema, WideLayout,
};
use crate::error::ReportError;
use crate::output::{OutputTable, OutputValue};
use crate::sheet::{Cell, RawSheet};

const DATE_STAMP_PATTERN: &str = r"(\d{4}-\d{2}-\d{2}) \d{2}:\d{2}:\d{2}";
const PERIOD_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const HEADER_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Label(String),
    Period(NaiveDate),
}

impl GroupValue {
    fn to_output(&self) -> OutputValue {
        match self {
            Self::Label(label) => OutputValue::Text(label.clone()),
            Self::Period(date) => OutputValue::Date(*date),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Period(date) => write!(f, "{date}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub upper: Vec<String>,
    pub lower: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl WideTable {
    /// Reads the two header rows, drops the vendor subtotal row that follows
    /// them and keeps data rows that carry a key in the first column.
    pub fn from_block(block: &RawSheet, table: &str) -> Result<Self, ReportError> {
        if block.len() < HEADER_ROWS {
            return Err(ReportError::MissingHeader {
                table: table.to_string(),
            });
        }

        let width = block.rows().iter().map(Vec::len).max().unwrap_or(0);
        let mut kept = Vec::with_capacity(width);
        let mut upper = Vec::with_capacity(width);
        let mut lower = Vec::with_capacity(width);
        let mut carried = String::new();

        for col in 0..width {
            let top = block.cell(0, col).render().trim().to_string();
            let bottom = block.cell(1, col).render().trim().to_string();
            if col > 0 && top.is_empty() && bottom.is_empty() {
                continue;
            }

            let top = if col > 0 && top.is_empty() {
                carried.clone()
            } else {
                top
            };
            if col > 0 {
                carried = top.clone();
            }

            kept.push(col);
            upper.push(top);
            lower.push(bottom);
        }

        let rows: Vec<Vec<Cell>> = (HEADER_ROWS + 1..block.len())
            .filter(|&row| !block.cell(row, 0).is_empty())
            .map(|row| {
                kept.iter()
                    .map(|&col| block.cell(row, col).clone())
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(Self { upper, lower, rows })
    }

    pub fn combine_labels(&self, key_column: &str, strip_upper_spaces: bool) -> Vec<String> {
        self.upper
            .iter()
            .zip(&self.lower)
            .enumerate()
            .map(|(col, (top, bottom))| {
                if col == 0 {
                    key_column.to_string()
                } else if strip_upper_spaces {
                    format!("{} {}", top.replace(' ', ""), bottom)
                } else {
                    format!("{top} {bottom}")
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRecord {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub key: String,
    pub group: GroupValue,
    pub metric: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub key: String,
    pub group: GroupValue,
    pub metrics: BTreeMap<String, f64>,
}

pub fn melt(labels: &[String], rows: &[Vec<Cell>], value_columns: &[usize]) -> Vec<MeltedRecord> {
    let mut records = Vec::with_capacity(rows.len() * value_columns.len());
    for &col in value_columns {
        let Some(label) = labels.get(col) else {
            continue;
        };
        for row in rows {
            let key = row.first().map(Cell::render).unwrap_or_default();
            let value = row.get(col).and_then(Cell::as_number);
            records.push(MeltedRecord {
                key: key.trim().to_string(),
                label: label.clone(),
                value,
            });
        }
    }
    records
}

pub fn pivot(
    records: Vec<LongRecord>,
    duplicates: DuplicatePolicy,
    table: &str,
) -> Result<Vec<PivotRow>, ReportError> {
    let mut cells: BTreeMap<(String, GroupValue), BTreeMap<String, Vec<Option<f64>>>> =
        BTreeMap::new();
    for record in records {
        cells
            .entry((record.key, record.group))
            .or_default()
            .entry(record.metric)
            .or_default()
            .push(record.value);
    }

    let mut pivoted = Vec::with_capacity(cells.len());
    for ((key, group), observed) in cells {
        let mut metrics = BTreeMap::new();
        for (metric, values) in observed {
            if values.len() > 1 && duplicates == DuplicatePolicy::Reject {
                return Err(ReportError::DuplicateEntry {
                    table: table.to_string(),
                    key,
                    group: group.to_string(),
                    metric,
                });
            }
            if let Some(value) = mean(&values) {
                metrics.insert(metric, value);
            }
        }
        pivoted.push(PivotRow {
            key,
            group,
            metrics,
        });
    }

    Ok(pivoted)
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Orders pivoted rows and lays them out in the schema's column order,
/// writing 0 for every metric the pivot did not produce.
pub fn shape(mut rows: Vec<PivotRow>, schema: &TableSchema, wide: &WideLayout) -> OutputTable {
    match wide.sort {
        SortOrder::GroupThenKey => {
            rows.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.key.cmp(&b.key)))
        }
        SortOrder::KeyThenGroup => {
            rows.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.group.cmp(&b.group)))
        }
    }

    let mut table = OutputTable::new(schema.shaped_columns());
    for row in rows {
        let key = OutputValue::Text(row.key.clone());
        let group = row.group.to_output();
        let mut values = match wide.dimensions {
            DimensionOrder::KeyFirst => vec![key, group],
            DimensionOrder::GroupFirst => vec![group, key],
        };
        values.extend(schema.metrics.iter().map(|metric| {
            OutputValue::Number(row.metrics.get(metric.source).copied().unwrap_or(0.0))
        }));
        table.rows.push(values);
    }
    table
}

pub fn reshape_flat(block: &RawSheet, schema: &TableSchema) -> Result<OutputTable, ReportError> {
    let table = schema.kind.tag();
    if block.is_empty() {
        return Err(ReportError::MissingHeader {
            table: table.to_string(),
        });
    }

    let width = block.rows().iter().map(Vec::len).max().unwrap_or(0);
    let headers: Vec<String> = (0..width)
        .map(|col| block.cell(0, col).render().trim().to_string())
        .collect();
    let metric_columns: Vec<Option<usize>> = schema
        .metrics
        .iter()
        .map(|metric| (1..width).find(|&col| headers[col] == metric.source))
        .collect();

    let mut output = OutputTable::new(schema.shaped_columns());
    for row in 2..block.len() {
        let key = block.cell(row, 0);
        if key.is_empty() {
            continue;
        }
        let label = key.render();
        let period = parse_period_label(&label).ok_or_else(|| ReportError::InvalidPeriod {
            table: table.to_string(),
            value: label.clone(),
        })?;

        let mut values = vec![OutputValue::Date(period)];
        values.extend(metric_columns.iter().map(|col| {
            OutputValue::Number(
                col.and_then(|col| block.cell(row, col).as_number())
                    .unwrap_or(0.0),
            )
        }));
        output.rows.push(values);
    }

    Ok(output)
}

fn parse_period_label(label: &str) -> Option<NaiveDate> {
    let date = label.trim().split(' ').next()?;
    PERIOD_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

pub struct ReshapeEngine {
    date_stamp: Regex,
}

impl ReshapeEngine {
    pub fn new() -> Result<Self> {
        let date_stamp =
            Regex::new(DATE_STAMP_PATTERN).context("failed to compile date-stamp regex")?;
        Ok(Self { date_stamp })
    }

    pub fn reshape(
        &self,
        block: &RawSheet,
        schema: &TableSchema,
    ) -> Result<OutputTable, ReportError> {
        match schema.layout {
            Layout::Flat => reshape_flat(block, schema),
            Layout::Wide(wide) => self.reshape_wide(block, schema, &wide),
        }
    }

    fn reshape_wide(
        &self,
        block: &RawSheet,
        schema: &TableSchema,
        wide: &WideLayout,
    ) -> Result<OutputTable, ReportError> {
        let table = schema.kind.tag();
        let wide_table = WideTable::from_block(block, table)?;
        let labels = wide_table.combine_labels(schema.key_column, wide.strip_upper_spaces);

        let value_columns: Vec<usize> = match wide.split {
            SplitRule::MetricFirst => (1..labels.len()).collect(),
            SplitRule::DateStamped => (1..labels.len())
                .filter(|&col| self.date_stamp.is_match(&labels[col]))
                .collect(),
        };
        if wide.split == SplitRule::DateStamped && value_columns.is_empty() {
            return Err(ReportError::NoDateColumns {
                table: table.to_string(),
            });
        }

        let records = melt(&labels, &wide_table.rows, &value_columns)
            .into_iter()
            .filter_map(|melted| {
                let (metric, group) = self.split_label(&melted.label, wide.split)?;
                Some(LongRecord {
                    key: melted.key,
                    group,
                    metric,
                    value: melted.value,
                })
            })
            .collect();

        let rows = pivot(records, wide.duplicates, table)?;
        Ok(shape(rows, schema, wide))
    }

    pub fn split_label(&self, label: &str, rule: SplitRule) -> Option<(String, GroupValue)> {
        match rule {
            SplitRule::MetricFirst => {
                let (metric, group) = label.split_once(' ')?;
                Some((metric.to_string(), GroupValue::Label(group.to_string())))
            }
            SplitRule::DateStamped => {
                let captures = self.date_stamp.captures(label)?;
                let date = NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()?;
                let metric = label.split_whitespace().next()?;
                Some((metric.to_string(), GroupValue::Period(date)))
            }
        }
    }
}
