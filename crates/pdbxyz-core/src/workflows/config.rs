use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for converting every `.pdb` file in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Directory scanned for `.pdb` files.
    pub input_dir: PathBuf,
    /// Existing directory receiving one `.xyz` file per input.
    pub output_dir: PathBuf,
}

/// Settings for merging PDB files matched by a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Glob pattern selecting the input files, e.g. `*.pdb`.
    pub pattern: String,
    /// Path of the single extxyz file to write.
    pub output: PathBuf,
    /// Write one frame per input file instead of one merged frame.
    pub multiframe: bool,
}

#[derive(Default)]
pub struct ConvertConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl ConvertConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, dir: PathBuf) -> Self {
        self.input_dir = Some(dir);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn build(self) -> Result<ConvertConfig, ConfigError> {
        Ok(ConvertConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
        })
    }
}

#[derive(Default)]
pub struct MergeConfigBuilder {
    pattern: Option<String>,
    output: Option<PathBuf>,
    multiframe: bool,
}

impl MergeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
    pub fn output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }
    pub fn multiframe(mut self, multiframe: bool) -> Self {
        self.multiframe = multiframe;
        self
    }

    pub fn build(self) -> Result<MergeConfig, ConfigError> {
        let pattern = self
            .pattern
            .ok_or(ConfigError::MissingParameter("pattern"))?;
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "pattern",
                reason: "glob pattern cannot be empty".to_string(),
            });
        }
        Ok(MergeConfig {
            pattern,
            output: self.output.ok_or(ConfigError::MissingParameter("output"))?,
            multiframe: self.multiframe,
        })
    }
}
