//! Settings loading.
//!
//! Layers, lowest priority first: built-in defaults, an optional `salicyl_vision.*` file in
//! the working directory, an explicit config file, then `SALICYL__SECTION__KEY`
//! environment variables. Command-line flags are applied by the binary afterwards.

use std::path::Path;

use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::core_modules::overlay::OverlayStyle;
use crate::error::ScanResult;
use crate::pipeline::PipelineConfig;

/// Base name of the optional settings file searched for in the working directory.
const DEFAULT_CONFIG_NAME: &str = "salicyl_vision";
const ENV_PREFIX: &str = "SALICYL";

/// Complete configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub analysis: PipelineConfig,
    pub overlay: OverlayStyle,
    pub batch: BatchConfig,
}

impl Settings {
    /// Loads and validates settings, optionally forcing a specific file.
    pub fn load(custom_path: Option<&Path>) -> ScanResult<Self> {
        Self::load_layers(Path::new(""), custom_path, None)
    }

    /// Layered load rooted at `search_dir`. `env_vars` replaces the process environment
    /// when given.
    fn load_layers(
        search_dir: &Path,
        custom_path: Option<&Path>,
        env_vars: Option<Map<String, String>>,
    ) -> ScanResult<Self> {
        let default_file = search_dir.join(DEFAULT_CONFIG_NAME);
        let mut builder = Config::builder()
            .add_source(File::with_name(&default_file.to_string_lossy()).required(false));

        if let Some(path) = custom_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ScanResult<()> {
        self.analysis.validate()?;
        self.batch.validate()
    }
}
