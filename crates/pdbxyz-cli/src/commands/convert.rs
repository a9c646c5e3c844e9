use crate::cli::ConvertArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pdbxyz::workflows::{self, progress::ProgressReporter};
use tracing::info;

pub fn run(args: ConvertArgs) -> Result<()> {
    let config = PartialAppConfig::load(args.config.as_deref())?.merge_convert_with_cli(&args)?;
    info!(
        "Resolved convert configuration: {:?} -> {:?}",
        config.input_dir, config.output_dir
    );

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let summary = workflows::convert::run(&config, &reporter)?;

    println!(
        "Converted {} PDB file(s) into {}.",
        summary.written.len(),
        config.output_dir.display()
    );
    Ok(())
}
