use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "analytics-reshape",
    version,
    about = "Reshape web-analytics export workbooks into normalized brand tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Indication(TransformArgs),
    Monthly(TransformArgs),
    Scroll(TransformArgs),
    Suites(SuitesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TransformArgs {
    pub input: PathBuf,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub suite_map: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SuitesArgs {
    #[arg(long)]
    pub suite_map: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Variant {
    Indication,
    Monthly,
    Scroll,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indication => "indication",
            Self::Monthly => "monthly",
            Self::Scroll => "scroll",
        }
    }
}
