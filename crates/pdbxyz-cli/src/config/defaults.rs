use std::path::PathBuf;

/// Values used when neither the command line nor the config file sets a parameter.
pub struct DefaultsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub merge_pattern: String,
    pub merge_output: PathBuf,
    pub multiframe: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdbbank"),
            output_dir: PathBuf::from("extxyz_output"),
            merge_pattern: "*.pdb".to_string(),
            merge_output: PathBuf::from("merged.xyz"),
            multiframe: false,
        }
    }
}
