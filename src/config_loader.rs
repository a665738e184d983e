use crate::config::Config;
use crate::error::LabResult;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Load and validate settings from a YAML file
pub fn load_config(config_path: &Path) -> LabResult<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = fs::File::open(config_path)?;
    // An empty document (or one holding only comments) means "all defaults".
    let config: Option<Config> = serde_yaml::from_reader(file)?;
    let config = config.unwrap_or_default();

    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    Ok(config)
}

/// Load the file when one was given on the command line, fall back to defaults otherwise
pub fn load_or_default(config_path: Option<&Path>) -> LabResult<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}
