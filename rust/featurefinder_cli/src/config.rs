use featurefinder::FeatureFinderConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub features: FeatureFinderConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl OutputConfig {
    /// Where the feature table of an input file is written.
    pub fn features_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "run".to_string());
        self.directory.join(format!("{}.features.csv", stem))
    }
}

impl Config {
    pub fn from_json(path: &Path) -> Result<Self, CliError> {
        let file = std::fs::File::open(path).map_err(|e| CliError::io(e, path))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| CliError::ParseError { msg: e.to_string() })
    }

    /// Applies the command line overrides and checks that everything
    /// needed to run is present.
    pub fn with_cli_args(mut self, args: &Cli) -> Result<Self, CliError> {
        if !args.input.is_empty() {
            self.input = Some(InputConfig {
                files: args.input.clone(),
            });
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }

        match &self.input {
            Some(input) if !input.files.is_empty() => {}
            _ => {
                return Err(CliError::Config {
                    source: "No input provided, please provide one in either the config file or with the --input flag".to_string(),
                });
            }
        }
        if self.output.is_none() {
            return Err(CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
        self.features.validate().map_err(|e| CliError::Config {
            source: e.to_string(),
        })?;
        Ok(self)
    }
}
