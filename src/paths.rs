//! Application path management for dev, portable and installed modes.
//!
//! ## Mode Detection
//!
//! - **Dev mode**: `controls.json` in the current working directory. Config,
//!   state and logs all live there, which is also where the panel has always
//!   looked for its files.
//! - **Portable mode**: a `.portable` marker file next to the executable keeps
//!   every file in the executable's directory.
//! - **Installed mode** (default): files live in the platform data directory
//!   (`%APPDATA%\UAFX Controller`, `~/.local/share/UAFX Controller`, ...).

use std::path::{Path, PathBuf};
use tracing::debug;

/// Application name used for directories in installed mode
const APP_NAME: &str = "UAFX Controller";

/// Device layout file name
pub const CONFIG_FILE: &str = "controls.json";

/// Persisted control values file name
pub const STATE_FILE: &str = "state.json";

/// Application paths for config, state, and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Path to the device layout file
    pub config: PathBuf,
    /// Path to the persisted control values
    pub state: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
    /// Whether files sit next to the executable or in the working directory
    pub is_portable: bool,
}

impl AppPaths {
    /// Detect the appropriate paths based on environment.
    ///
    /// Note: This is called before logging is initialized, so we use eprintln
    /// for early diagnostic output.
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if cwd.join(CONFIG_FILE).exists() {
            #[cfg(debug_assertions)]
            eprintln!(
                "[paths] Running in DEV mode ({} found in cwd: {})",
                CONFIG_FILE,
                cwd.display()
            );
            return Self::in_dir(&cwd, true);
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        if exe_dir.join(".portable").exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] Running in PORTABLE mode (.portable marker found)");
            return Self::in_dir(&exe_dir, true);
        }

        let app_data = dirs::data_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: dirs::data_dir() returned None, falling back to exe dir");
                exe_dir.clone()
            })
            .join(APP_NAME);

        #[cfg(debug_assertions)]
        eprintln!(
            "[paths] Running in INSTALLED mode (data dir: {})",
            app_data.display()
        );

        Self::in_dir(&app_data, false)
    }

    /// All files inside `dir`
    pub fn in_dir(dir: &Path, is_portable: bool) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            state: dir.join(STATE_FILE),
            logs_dir: dir.join("logs"),
            is_portable,
        }
    }

    /// Replace detected locations with explicit ones from the command line
    pub fn with_overrides(mut self, config: Option<PathBuf>, state: Option<PathBuf>) -> Self {
        if let Some(config) = config {
            self.config = config;
        }
        if let Some(state) = state {
            self.state = state;
        }
        self
    }

    /// Name of the detected mode, for the startup log
    pub fn mode(&self) -> &'static str {
        if self.is_portable {
            "portable"
        } else {
            "installed"
        }
    }

    /// Get the base directory (for displaying in logs)
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the logs directory and the state file's directory exist.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if !self.logs_dir.exists() {
            debug!("Creating logs directory: {}", self.logs_dir.display());
            std::fs::create_dir_all(&self.logs_dir)?;
        }

        if let Some(state_parent) = self.state.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !state_parent.exists() {
                debug!("Creating state directory: {}", state_parent.display());
                std::fs::create_dir_all(state_parent)?;
            }
        }

        Ok(())
    }
}
