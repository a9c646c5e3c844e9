use crate::cli::MergeArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pdbxyz::workflows::{self, progress::ProgressReporter};
use tracing::info;

pub fn run(args: MergeArgs) -> Result<()> {
    let config = PartialAppConfig::load(args.config.as_deref())?.merge_merge_with_cli(&args)?;
    info!(
        "Resolved merge configuration: pattern '{}', output {:?}, multiframe {}",
        config.pattern, config.output, config.multiframe
    );

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let summary = workflows::merge::run(&config, &reporter)?;

    println!(
        "Wrote {} from {} PDB source(s).",
        summary.output.display(),
        summary.source_count
    );
    Ok(())
}
