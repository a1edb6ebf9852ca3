use anyhow::Result;
use tracing::info;

use crate::cli::SuitesArgs;
use crate::report::SuiteRegistry;

pub fn run(args: SuitesArgs) -> Result<()> {
    let registry = SuiteRegistry::load_or_builtin(args.suite_map.as_deref())?;

    for mapping in registry.mappings() {
        info!(
            suite = %mapping.suite,
            brand = %mapping.brand,
            indication = %mapping.indication,
            "suite mapping"
        );
    }
    info!(count = registry.len(), "suite registry loaded");

    Ok(())
}
