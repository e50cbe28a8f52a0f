//! User configuration loaded from `config.toml`.

use directories::ProjectDirs;
use gridcalc_core::document::{DEFAULT_COLS, DEFAULT_ROWS};
use gridcalc_core::{DisplayOptions, SheetOptions};
use gridcalc_engine::engine::{DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_MAX_PLAIN_WIDTH};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: Option<String>,
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub max_chain_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub cycle_marker: String,
    pub error_marker: String,
    pub max_plain_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let defaults = DisplayOptions::default();
        DisplayConfig {
            cycle_marker: defaults.cycle_marker,
            error_marker: defaults.error_marker,
            max_plain_width: DEFAULT_MAX_PLAIN_WIDTH,
        }
    }
}

impl Config {
    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            rows: self.grid.rows,
            cols: self.grid.cols,
            max_chain_depth: self.engine.max_chain_depth,
            display: DisplayOptions {
                cycle_marker: self.display.cycle_marker.clone(),
                error_marker: self.display.error_marker.clone(),
                max_plain_width: self.display.max_plain_width,
            },
        }
    }

    /// The configured log level, if one is set and recognised.
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.log_level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level.trim()).ok())
    }

    /// Clamp out-of-range settings, reporting each fix as a warning.
    fn validate(&mut self, warnings: &mut Vec<String>) {
        if self.engine.max_chain_depth == 0 {
            warnings.push("engine.max_chain_depth must be at least 1; using 1".to_string());
            self.engine.max_chain_depth = 1;
        }
        if let Some(level) = self.log_level.as_deref()
            && LevelFilter::from_str(level.trim()).is_err()
        {
            warnings.push(format!("Unknown log_level '{}'; ignoring", level));
            self.log_level = None;
        }
    }
}

/// Load the config from `config_file`, or from the user config dir.
///
/// Problems never abort startup: they are returned as warnings next to a
/// config that falls back to defaults.
pub fn load_config(config_file: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.map(Path::to_path_buf).or_else(user_config_path);
    let mut config = Config::default();

    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match read_config(path) {
                Ok(parsed) => config = parsed,
                Err(warning) => warnings.push(warning),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    config.validate(&mut warnings);
    (config, warnings)
}

fn read_config(path: &Path) -> Result<Config, String> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        )),
        Ok(_) => {
            let content = std::fs::read_to_string(path)
                .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
            toml::from_str::<Config>(&content)
                .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
        }
        Err(err) => Err(format!(
            "Failed to read metadata for {}: {}",
            path.display(),
            err
        )),
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
