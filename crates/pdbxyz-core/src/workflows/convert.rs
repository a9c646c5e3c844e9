use super::config::ConvertConfig;
use super::error::WorkflowError;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::extxyz::ExtxyzFile;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{StructureReader, StructureWriter};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const PDB_SUFFIX: &str = ".pdb";
const XYZ_EXTENSION: &str = "xyz";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Output files in the order they were written.
    pub written: Vec<PathBuf>,
}

/// Lists `.pdb` files in `dir` in directory-listing order.
fn list_pdb_files(dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    let io_err = |source| WorkflowError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let is_pdb = path
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| name.ends_with(PDB_SUFFIX));
        if is_pdb && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Maps `<input_dir>/<name>.pdb` to `<output_dir>/<name>.xyz`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_suffix(PDB_SUFFIX))
        .unwrap_or_default();
    output_dir.join(format!("{}.{}", stem, XYZ_EXTENSION))
}

/// Converts every `.pdb` file in the input directory into its own extxyz file.
///
/// Files are processed in directory-listing order. Each structure gets its
/// offset-zero connectivity block attached as the `connectivity` info entry
/// before being written with its full info map.
///
/// # Arguments
///
/// * `config` - Input and output directories. The output directory must exist.
/// * `reporter` - Receives task progress and one message per written file.
///
/// # Return
///
/// The paths of all written files.
///
/// # Errors
///
/// The first read or write failure aborts the batch. Files written before the
/// failure are left in place.
#[instrument(skip_all, name = "convert_workflow")]
pub fn run(
    config: &ConvertConfig,
    reporter: &ProgressReporter,
) -> Result<ConvertSummary, WorkflowError> {
    info!(
        "Converting PDB files from {:?} into {:?}.",
        config.input_dir, config.output_dir
    );
    let inputs = list_pdb_files(&config.input_dir)?;
    debug!("Found {} PDB file(s).", inputs.len());

    reporter.report(Progress::PhaseStart {
        name: "Converting structures",
    });
    reporter.report(Progress::TaskStart {
        total_steps: inputs.len() as u64,
    });

    let mut summary = ConvertSummary::default();
    for input in inputs {
        let mut structure =
            PdbFile::read_from_path(&input).map_err(|source| WorkflowError::Read {
                path: input.clone(),
                source,
            })?;
        structure.attach_connectivity();

        let output = output_path_for(&input, &config.output_dir);
        ExtxyzFile::write_to_path(&structure, &output).map_err(|source| WorkflowError::Write {
            path: output.clone(),
            source,
        })?;

        info!(
            "Wrote {:?} ({} atoms, {} bonded atoms).",
            output,
            structure.len(),
            structure.connectivity.len()
        );
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        reporter.report(Progress::Message(format!("Wrote {}", name)));
        reporter.report(Progress::TaskIncrement);
        summary.written.push(output);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(summary)
}
