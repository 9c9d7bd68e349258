//! Configuration settings for the REPL listener.

use serde::Deserialize;
use std::path::Path;

use crate::error::ReplError;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind the TCP listener on.
    #[serde(default = "default_listen_addr")]
    pub addr: String,
}

/// Limits configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum frame size in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
    /// Receive timeout in milliseconds. Zero waits indefinitely.
    #[serde(default)]
    pub recv_timeout_millis: u64,
    /// Maximum concurrent sessions.
    #[serde(default = "default_max_concurrent_sessions")]
    pub max_concurrent_sessions: usize,
}

// Default value functions
fn default_listen_addr() -> String {
    "127.0.0.1:5600".to_string()
}

fn default_max_frame_size() -> usize {
    1_048_576 // 1MB
}

fn default_max_concurrent_sessions() -> usize {
    16
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            addr: default_listen_addr(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_size: default_max_frame_size(),
            recv_timeout_millis: 0,
            max_concurrent_sessions: default_max_concurrent_sessions(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReplError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ReplError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), ReplError> {
        if self.limits.max_frame_size == 0 {
            return Err(ReplError::Config {
                message: "max_frame_size must be nonzero".to_string(),
            });
        }

        if self.limits.max_concurrent_sessions == 0 {
            return Err(ReplError::Config {
                message: "max_concurrent_sessions must be nonzero".to_string(),
            });
        }

        Ok(())
    }
}
