use anyhow::Context;
use panelcam::{init_logging, run_batch, BatchConfig, BUILD_DATE, VERSION};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!("panelcam {} (built {})", VERSION, BUILD_DATE);

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = BatchConfig::load_or_default(path.as_deref()).context("loading batch config")?;

    let report = run_batch(&config);
    if !report.is_success() {
        let names: Vec<&str> = report.failures.iter().map(|(name, _)| name.as_str()).collect();
        anyhow::bail!("{} parts failed: {}", names.len(), names.join(", "));
    }
    Ok(())
}
