//! Configuration
//!
//! Read from `~/.config/webview-commands/config.yaml`:
//!
//! ```yaml
//! unique_command_ids: true
//! feature_context: "feature-context-active && !input-focused"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::{ContextKeyExpr, ExprError, FEATURE_CONTEXT_ACTIVE};

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid feature_context expression: {0}")]
    FeatureContext(#[from] ExprError),
}

/// Command system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Reject a second registration of the same command id
    pub unique_command_ids: bool,
    /// Precondition that marks a webview editor as the active surface
    pub feature_context: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            unique_command_ids: true,
            feature_context: FEATURE_CONTEXT_ACTIVE.to_string(),
        }
    }
}

impl CommandsConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate config from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.feature_context_expr()?;
        Ok(config)
    }

    /// The parsed feature-context precondition
    pub fn feature_context_expr(&self) -> Result<ContextKeyExpr, ExprError> {
        let expr = ContextKeyExpr::parse(&self.feature_context)?;
        expr.validate()?;
        Ok(expr)
    }
}
