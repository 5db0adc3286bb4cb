use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Fallback device-name filter, also used when the stored pattern fails to
/// compile.
pub const DEFAULT_NAME_FILTER: &str = "blinky";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "blinky_control".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address of the peripheral to control, written by the device picker.
    #[serde(default)]
    pub device_address: Option<String>,

    /// Pattern an advertised device name must match in the picker.
    #[serde(default = "default_name_filter")]
    pub device_name_filter: String,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_address: None,
            device_name_filter: default_name_filter(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_name_filter() -> String {
    DEFAULT_NAME_FILTER.to_string()
}

impl Settings {
    /// Compiled name filter, falling back to [`DEFAULT_NAME_FILTER`] when
    /// the stored pattern does not compile.
    pub fn name_filter(&self) -> Regex {
        Regex::new(&self.device_name_filter).unwrap_or_else(|_| {
            Regex::new(DEFAULT_NAME_FILTER).expect("default name filter is a valid pattern")
        })
    }
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self {
            settings,
            settings_path,
        })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BlinkyControl");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Persist the address chosen in the device picker.
    pub fn set_device_address(&mut self, address: String) -> anyhow::Result<()> {
        info!("Storing device address {}", address);
        self.settings.device_address = Some(address);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_filter() {
        let settings = Settings::default();
        assert!(settings.name_filter().is_match("nimble blinky 3"));
        assert!(!settings.name_filter().is_match("thermostat"));
    }

    #[test]
    fn test_custom_name_filter() {
        let settings = Settings {
            device_name_filter: r"^blinky-\d+$".to_string(),
            ..Default::default()
        };
        assert!(settings.name_filter().is_match("blinky-42"));
        assert!(!settings.name_filter().is_match("blinky-"));
    }

    #[test]
    fn test_invalid_name_filter_falls_back() {
        let settings = Settings {
            device_name_filter: "[".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.name_filter().as_str(), DEFAULT_NAME_FILTER);
    }
}
