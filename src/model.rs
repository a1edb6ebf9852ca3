use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteMapping {
    pub suite: String,
    pub brand: String,
    pub indication: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMapFile {
    pub suites: Vec<SuiteMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableStatus {
    Written,
    DryRun,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub status: TableStatus,
    pub output_path: Option<String>,
    pub row_count: usize,
    pub skip_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub variant: String,
    pub input_path: String,
    pub input_sha256: String,
    pub suite: String,
    pub brand: String,
    pub indication: String,
    pub date_range: String,
    pub tables: Vec<TableReport>,
}
