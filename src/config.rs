//! Configuration management
//!
//! Stores settings in ~/.config/terrafix/config.json. Environment variables
//! take precedence over the file so CI runs need no config at all.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key fallback for local runs; CI should use OPENAI_API_KEY.
    pub openai_api_key: Option<String>,
    /// Model id override for the analysis call.
    pub model: Option<String>,
    /// Branch the fix commit is force-pushed to.
    #[serde(default = "default_branch")]
    pub fix_branch: String,
    /// Per-file character budget for retrieved context.
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
}

fn default_branch() -> String {
    "auto-tf-fix".to_string()
}

fn default_context_budget() -> usize {
    12_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: None,
            fix_branch: default_branch(),
            context_budget: default_context_budget(),
        }
    }
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("terrafix"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(err) => {
                        preserve_corrupt_config(&path, &content);
                        eprintln!(
                            "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                            err
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<(), String> {
        let dir =
            Self::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config directory: {}", e))?;

        let path = dir.join("config.json");
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        #[cfg(unix)]
        {
            write_config_atomic(&path, &content)
                .map_err(|e| format!("Failed to write config: {}", e))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
        }

        Ok(())
    }

    /// Get the API key (environment takes precedence over the config file).
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.openai_api_key.clone()
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Get the config file location for display.
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/terrafix/config.json".to_string())
    }

    /// Validate API key format (should start with sk-).
    pub fn validate_api_key_format(key: &str) -> bool {
        key.starts_with("sk-")
    }
}

/// Interactive prompt to store the API key for local runs.
pub fn setup_api_key_interactive() -> Result<(), String> {
    use std::io::{self, Write};

    let mut config = Config::load();
    if config.has_api_key() {
        println!("  An API key is already configured. It will be replaced.");
    }

    println!();
    println!("  terrafix uses the OpenAI API for remediation suggestions.");
    println!("  CI runs should set OPENAI_API_KEY instead of using this file.");
    println!();
    print!("  API Key: ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut key = String::new();
    io::stdin().read_line(&mut key).map_err(|e| e.to_string())?;
    let key = key.trim().to_string();

    if key.is_empty() {
        return Err("No API key provided".to_string());
    }

    if !Config::validate_api_key_format(&key) {
        println!();
        println!("  Warning: Key doesn't look like an OpenAI key (should start with sk-)");
        println!("     Saving anyway...");
    }

    config.openai_api_key = Some(key);
    config.save()?;

    println!();
    println!("  + API key saved to {}", Config::config_location());
    println!();

    Ok(())
}

fn preserve_corrupt_config(path: &std::path::Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(unix)]
fn write_config_atomic(path: &std::path::Path, content: &str) -> Result<(), String> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::PermissionsExt;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(|e| e.to_string())?;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        eprintln!("  Warning: Failed to set temp config file permissions: {}", e);
    }

    file.write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.to_string());
    }
    Ok(())
}
