use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use crate::report::{DateRange, Identity, TableKind};

const DATE_CELL_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<OutputValue>>,
}

impl OutputTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn append_constant(&mut self, column: &str, value: OutputValue) {
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }
}

pub fn output_file_name(identity: &Identity, range: &DateRange, kind: TableKind) -> String {
    format!(
        "{}_{}_{}_{}.xlsx",
        identity.brand,
        identity.indication,
        range.compact(),
        kind.tag()
    )
}

pub fn write_workbook(path: &Path, sheet_name: &str, table: &OutputTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|err| anyhow!("failed naming worksheet '{}': {}", sheet_name, err))?;

    for (col, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, column)
            .map_err(|err| cell_error(sheet_name, 0, col, err))?;
    }

    let date_format = Format::new().set_num_format(DATE_CELL_FORMAT);
    for (index, values) in table.rows.iter().enumerate() {
        let row = index + 1;
        for (col, value) in values.iter().enumerate() {
            write_value(worksheet, row, col, value, &date_format)
                .map_err(|err| cell_error(sheet_name, row, col, err))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &OutputValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    let (row, col) = (row as u32, col as u16);
    match value {
        OutputValue::Text(text) => worksheet.write_string(row, col, text)?,
        OutputValue::Number(number) => worksheet.write_number(row, col, *number)?,
        OutputValue::Date(date) => {
            let datetime =
                ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            worksheet.write_datetime_with_format(row, col, &datetime, date_format)?
        }
    };
    Ok(())
}

fn cell_error(sheet: &str, row: usize, col: usize, err: XlsxError) -> anyhow::Error {
    anyhow!(
        "failed writing row {} column {} on '{}': {}",
        row + 1,
        col + 1,
        sheet,
        err
    )
}
