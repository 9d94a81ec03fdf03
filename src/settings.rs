use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DugsiError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_school_name")]
    pub school_name: String,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_phone")]
    pub phone: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub logo_url: String,
    /// Class names accepted by the timetable and class-wide messages.
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
}

fn default_school_name() -> String {
    "Dugsiga Sare".to_string()
}

fn default_address() -> String {
    "Mogadishu, Somalia".to_string()
}

fn default_phone() -> String {
    "+252 61 555 5555".to_string()
}

fn default_email() -> String {
    "info@dugsiga.edu.so".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_classes() -> Vec<String> {
    ["Form 1", "Form 2", "Form 3", "Form 4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            school_name: default_school_name(),
            address: default_address(),
            phone: default_phone(),
            email: default_email(),
            currency: default_currency(),
            logo_url: String::new(),
            classes: default_classes(),
        }
    }
}

pub const KEYS: [&str; 8] = [
    "data_dir",
    "school_name",
    "address",
    "phone",
    "email",
    "currency",
    "logo_url",
    "classes",
];

impl Settings {
    /// Set one field by its JSON key. `classes` takes a comma-separated list.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim().to_string();
        match key {
            "data_dir" => self.data_dir = shellexpand_path(&value),
            "school_name" => self.school_name = value,
            "address" => self.address = value,
            "phone" => self.phone = value,
            "email" => self.email = value,
            "currency" => self.currency = value,
            "logo_url" => self.logo_url = value,
            "classes" => {
                self.classes = value
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            }
            other => {
                return Err(DugsiError::Settings(format!(
                    "unknown key '{other}' (expected one of: {})",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dugsi")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("dugsi")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DugsiError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
