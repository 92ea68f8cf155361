use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "user-directory-tui";

/// Smallest sheet that still shows its border and a line of content.
pub const MIN_DETAIL_PANEL_HEIGHT: u16 = 3;

/// Tabbed shows three tabs with the directory on the first; single shows only the directory.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScreenLayout {
    #[default]
    Tabbed,
    Single,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub users_path: String,
    pub request_timeout_secs: u64,
    pub tick_rate_ms: u64,
    pub layout: ScreenLayout,
    pub surface_fetch_errors: bool,
    pub detail_panel_height: u16,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://reqres.in".to_string(),
            users_path: "api/users".to_string(),
            request_timeout_secs: 10,
            tick_rate_ms: 250,
            layout: ScreenLayout::default(),
            surface_fetch_errors: true,
            detail_panel_height: 18,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Try CWD config.toml first, then ~/.config/user-directory-tui/config.toml
        for path in config_paths() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                return Self::load_from_str(&contents)
                    .with_context(|| format!("Invalid config in {}", path.display()));
            }
        }

        Ok(AppConfig::default())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            bail!("tick_rate_ms must be at least 1");
        }
        if self.detail_panel_height < MIN_DETAIL_PANEL_HEIGHT {
            bail!(
                "detail_panel_height must be at least {}",
                MIN_DETAIL_PANEL_HEIGHT
            );
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        // tokio's interval panics on a zero period.
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_NAME).join("config.toml"));
    }

    paths
}
