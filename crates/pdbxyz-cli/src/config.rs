mod defaults;

use crate::cli::{ConvertArgs, MergeArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use pdbxyz::workflows::config::{
    ConvertConfig, ConvertConfigBuilder, MergeConfig, MergeConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialConvertConfig {
    #[serde(rename = "input-dir")]
    input_dir: Option<PathBuf>,
    #[serde(rename = "output-dir")]
    output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMergeConfig {
    input: Option<String>,
    output: Option<PathBuf>,
    multiframe: Option<bool>,
}

/// Settings read from an optional TOML file, before command-line overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    convert: Option<PartialConvertConfig>,
    merge: Option<PartialMergeConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_convert_with_cli(self, args: &ConvertArgs) -> Result<ConvertConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.convert.unwrap_or_default();

        let input_dir = args
            .input_dir
            .clone()
            .or(file.input_dir)
            .unwrap_or(defaults.input_dir);
        let output_dir = args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or(defaults.output_dir);

        Ok(ConvertConfigBuilder::new()
            .input_dir(input_dir)
            .output_dir(output_dir)
            .build()?)
    }

    pub fn merge_merge_with_cli(self, args: &MergeArgs) -> Result<MergeConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.merge.unwrap_or_default();

        let pattern = args
            .input
            .clone()
            .or(file.input)
            .unwrap_or(defaults.merge_pattern);
        let output = args
            .output
            .clone()
            .or(file.output)
            .unwrap_or(defaults.merge_output);
        let multiframe = args
            .frame_mode
            .as_override()
            .or(file.multiframe)
            .unwrap_or(defaults.multiframe);

        Ok(MergeConfigBuilder::new()
            .pattern(pattern)
            .output(output)
            .multiframe(multiframe)
            .build()?)
    }
}
