use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub report: ReportSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub currency_symbol: String,
    /// Where HTML reports are written ("~/" expanded, relative to the config dir otherwise)
    pub output_dir: String,
    /// Default recipient shown on reports when --email is not given
    pub prepared_for: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            output_dir: "reports".to_string(),
            prepared_for: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StoreSettings {
    pub file: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            file: "scenarios.json".to_string(),
        }
    }
}
