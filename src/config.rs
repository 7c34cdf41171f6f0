use crate::batch::BatchOptions;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_CONCURRENCY, DEFAULT_LEVEL, ENV_PREFIX};
use crate::error::{Result, ShrinkError};
use crate::transform::{validate_level, Engine};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings for one run, merged from defaults, a config file, the environment
/// and command-line flags, in increasing order of precedence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub level: u8,
    pub concurrency: usize,
    pub engine: Engine,
    pub recursive: bool,
    pub progress: bool,
}

/// Values given explicitly on the command line. `None` defers to lower sources.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub level: Option<u8>,
    pub concurrency: Option<usize>,
    pub engine: Option<Engine>,
    pub recursive: Option<bool>,
    pub progress: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            concurrency: DEFAULT_CONCURRENCY,
            engine: Engine::default(),
            recursive: false,
            progress: true,
        }
    }
}

impl Settings {
    /// Loads settings using `config_path`, or `~/.img-shrink.yaml` when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from(Some(path), true, overrides),
            None => {
                let default_path = default_config_path();
                Self::load_from(default_path.as_deref(), false, overrides)
            }
        }
    }

    fn load_from(path: Option<&Path>, required: bool, overrides: &Overrides) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("level", i64::from(defaults.level))?
            .set_default("concurrency", defaults.concurrency as i64)?
            .set_default("engine", engine_name(defaults.engine))?
            .set_default("recursive", defaults.recursive)?
            .set_default("progress", defaults.progress)?;

        if let Some(path) = path {
            if required || path.is_file() {
                info!("Using config file: {}", path.display());
                builder = builder.add_source(File::from(path.to_path_buf()).required(required));
            }
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("level", overrides.level.map(i64::from))?
            .set_override_option("concurrency", overrides.concurrency.map(|c| c as i64))?
            .set_override_option("engine", overrides.engine.map(engine_name))?
            .set_override_option("recursive", overrides.recursive)?
            .set_override_option("progress", overrides.progress)?
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    pub fn validate(self) -> Result<Self> {
        validate_level(self.level)?;
        if self.concurrency == 0 {
            return Err(ShrinkError::InvalidConcurrency(self.concurrency));
        }
        Ok(self)
    }

    pub fn batch_options(&self) -> Result<BatchOptions> {
        Ok(BatchOptions::new(self.concurrency)?
            .recursive(self.recursive)
            .show_progress(self.progress))
    }
}

fn engine_name(engine: Engine) -> &'static str {
    match engine {
        Engine::Magick => "magick",
        Engine::Native => "native",
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}
