use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "pdbxyz - Convert PDB structures into extended XYZ files with connectivity metadata.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every .pdb file in a directory into its own extxyz file.
    Convert(ConvertArgs),
    /// Merge PDB files matched by a glob pattern into one extxyz file.
    Merge(MergeArgs),
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory scanned for .pdb files [default: pdbbank]
    #[arg(short = 'i', long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Existing directory receiving the .xyz files [default: extxyz_output]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Glob pattern selecting the input files [default: *.pdb]
    #[arg(short, long, value_name = "PATTERN")]
    pub input: Option<String>,

    /// Path of the extxyz file to write [default: merged.xyz]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub frame_mode: FrameMode,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Mutually exclusive flags choosing between one merged frame and one frame per file.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct FrameMode {
    /// Write one frame per input file instead of a single merged frame.
    #[arg(short, long)]
    pub multiframe: bool,
    /// Force a single merged frame, overriding the config file.
    #[arg(long)]
    pub single_frame: bool,
}

impl FrameMode {
    /// `Some` when a flag was given on the command line.
    pub fn as_override(&self) -> Option<bool> {
        if self.multiframe {
            Some(true)
        } else if self.single_frame {
            Some(false)
        } else {
            None
        }
    }
}
