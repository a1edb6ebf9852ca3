use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{TransformArgs, Variant};
use crate::model::{RunManifest, TableReport, TableStatus};
use crate::output::{OutputTable, output_file_name, write_workbook};
use crate::report::{self, ReportHeader, ReshapeEngine, SuiteRegistry, TableKind};
use crate::sheet::{RawSheet, load_first_sheet};
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};


#[derive(Debug)]
pub struct TransformSummary {
    pub header: ReportHeader,
    pub tables: Vec<TableReport>,
}

pub fn run(args: TransformArgs, variant: Variant) -> Result<()> {
    let registry = SuiteRegistry::load_or_builtin(args.suite_map.as_deref())?;
    let engine = ReshapeEngine::new()?;

    info!(
        input = %args.input.display(),
        variant = variant.as_str(),
        dry_run = args.dry_run,
        "starting transform"
    );

    let sheet = load_first_sheet(&args.input)?;
    let summary = transform_sheet(
        &sheet,
        variant,
        &registry,
        &engine,
        &args.output_dir,
        args.dry_run,
    )?;

    if let Some(manifest_path) = &args.manifest_path {
        let identity = &summary.header.identity;
        let manifest = RunManifest {
            manifest_version: 1,
            generated_at: now_utc_string(),
            variant: variant.as_str().to_string(),
            input_path: args.input.display().to_string(),
            input_sha256: sha256_file(&args.input)?,
            suite: identity.suite.clone(),
            brand: identity.brand.clone(),
            indication: identity.indication.clone(),
            date_range: summary.header.range.compact(),
            tables: summary.tables,
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote run manifest");
    }

    Ok(())
}

pub fn tables_for(variant: Variant) -> &'static [TableKind] {
    match variant {
        Variant::Indication => &[TableKind::Indication],
        Variant::Monthly => &[TableKind::LastTouch, TableKind::Monthly],
        Variant::Scroll => &[TableKind::Scroll],
    }
}

pub fn transform_sheet(
    sheet: &RawSheet,
    variant: Variant,
    registry: &SuiteRegistry,
    engine: &ReshapeEngine,
    output_dir: &Path,
    dry_run: bool,
) -> Result<TransformSummary> {
    let header = report::read_header(sheet, registry)?;
    info!(
        brand = %header.identity.brand,
        indication = %header.identity.indication,
        date_range = %header.range,
        "report date range is acceptable"
    );

    if !dry_run {
        ensure_directory(output_dir)?;
    }

    let mut tables = Vec::new();
    for &kind in tables_for(variant) {
        match report::process_table(sheet, kind, &header, engine) {
            Ok(table) => tables.push(emit_table(&table, kind, &header, output_dir, dry_run)?),
            Err(err) if err.is_table_local() => {
                warn!(table = kind.tag(), error = %err, "skipping table");
                tables.push(TableReport {
                    table: kind.tag().to_string(),
                    status: TableStatus::Skipped,
                    output_path: None,
                    row_count: 0,
                    skip_reason: Some(err.to_string()),
                });
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed processing {} table", kind.tag()));
            }
        }
    }

    Ok(TransformSummary { header, tables })
}

fn emit_table(
    table: &OutputTable,
    kind: TableKind,
    header: &ReportHeader,
    output_dir: &Path,
    dry_run: bool,
) -> Result<TableReport> {
    let path = output_dir.join(output_file_name(&header.identity, &header.range, kind));

    if table.is_empty() {
        warn!(table = kind.tag(), "table produced no rows");
    }

    let status = if dry_run {
        info!(table = kind.tag(), path = %path.display(), rows = table.len(), "dry-run: skipping write");
        TableStatus::DryRun
    } else {
        write_workbook(&path, kind.sheet_name(), table)?;
        info!(table = kind.tag(), path = %path.display(), rows = table.len(), "transformation complete");
        TableStatus::Written
    };

    Ok(TableReport {
        table: kind.tag().to_string(),
        status,
        output_path: Some(path.display().to_string()),
        row_count: table.len(),
        skip_reason: None,
    })
}
