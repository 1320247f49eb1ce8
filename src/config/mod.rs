mod settings;

pub use settings::{Config, ReportSettings, StoreSettings};

use crate::error::{Result, RoiError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (XDG config dir, or ~/.roi/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "roi") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        RoiError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".roi"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand ~ and anchor relative paths at the config directory
pub fn resolve_path(path: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load config.toml from an initialized config directory
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(RoiError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(RoiError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    debug!(path = %path.display(), "loaded config");
    toml::from_str(&content).map_err(|e| RoiError::ConfigParse { path, source: e })
}

/// Load config.toml, falling back to defaults when the directory was never initialized
pub fn load_config_or_default(config_dir: &Path) -> Result<Config> {
    if config_dir.exists() {
        load_config(config_dir)
    } else {
        debug!(dir = %config_dir.display(), "no config directory, using defaults");
        Ok(Config::default())
    }
}

impl Config {
    pub fn store_path(&self, config_dir: &Path) -> PathBuf {
        resolve_path(&self.store.file, config_dir)
    }

    pub fn report_dir(&self, config_dir: &Path) -> PathBuf {
        resolve_path(&self.report.output_dir, config_dir)
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[report]
currency_symbol = "₹"
output_dir = "reports"              # relative to this directory, or an absolute/~ path
# prepared_for = "you@company.com"  # default recipient when --email is omitted

[store]
file = "scenarios.json"             # saved scenarios, relative to this directory
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.report.currency_symbol, "₹");
        assert_eq!(config.report.output_dir, "reports");
        assert_eq!(config.report.prepared_for, None);
        assert_eq!(config.store.file, "scenarios.json");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[report]\ncurrency_symbol = \"$\"\n").unwrap();
        assert_eq!(config.report.currency_symbol, "$");
        assert_eq!(config.report.output_dir, "reports");
        assert_eq!(config.store.file, "scenarios.json");
    }

    #[test]
    fn test_resolve_path_anchors_relative_paths() {
        let base = Path::new("/tmp/roi-config");
        assert_eq!(
            resolve_path("scenarios.json", base),
            base.join("scenarios.json")
        );
        assert_eq!(
            resolve_path("/var/data/s.json", base),
            PathBuf::from("/var/data/s.json")
        );
    }

    #[test]
    fn test_load_config_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            load_config(&missing),
            Err(RoiError::ConfigNotFound(_))
        ));
        assert!(matches!(
            load_config(temp.path()),
            Err(RoiError::ConfigFileNotFound(_))
        ));

        fs::write(temp.path().join("config.toml"), "[report\n").unwrap();
        assert!(matches!(
            load_config(temp.path()),
            Err(RoiError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_load_config_or_default_without_directory() {
        let temp = TempDir::new().unwrap();
        let config = load_config_or_default(&temp.path().join("missing")).unwrap();
        assert_eq!(config.store.file, "scenarios.json");
    }
}
