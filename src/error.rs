use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Config directory not found at {0}. Run 'roi init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("scenario_name is required. Use --name <NAME> to label the scenario.")]
    MissingScenarioName,

    #[error("email is required. Use --email <ADDRESS> or set report.prepared_for in config.toml.")]
    MissingEmail,

    #[error("Scenario '{0}' not found")]
    ScenarioNotFound(String),

    #[error("Invalid scenario index '{0}'. Use 'roi list' to see saved scenarios.")]
    InvalidScenarioIndex(String),

    #[error("Scenario file {0} is not a JSON array; refusing to overwrite it")]
    StoreCorrupt(PathBuf),

    #[error("Failed to serialize scenario data: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoiError>;
