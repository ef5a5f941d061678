//! Engine-wide settings.

use serde::{Deserialize, Serialize};
use vellum_core::ConfigError;

use crate::config::{Breakpoint, LayoutConfig, MAX_BREAKPOINTS};

/// Options for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Most breakpoints a container may carry
    pub max_breakpoints: usize,
    /// Configuration used when grouping without an explicit one
    pub default_layout: LayoutConfig,
    /// Breakpoints installed when responsive mode is switched on with none
    pub default_breakpoints: Vec<Breakpoint>,
    /// Breakpoint appended by "add breakpoint"
    pub new_breakpoint: Breakpoint,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_breakpoints: MAX_BREAKPOINTS,
            default_layout: LayoutConfig::default(),
            default_breakpoints: vec![
                Breakpoint::new(768.0, 2, 16.0),
                Breakpoint::new(480.0, 1, 8.0),
            ],
            new_breakpoint: Breakpoint::new(320.0, 1, 8.0),
        }
    }
}

impl EngineOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: EngineOptions =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Check that the defaults are themselves valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_layout.validate_with_limit(self.max_breakpoints)?;
        if self.default_breakpoints.len() > self.max_breakpoints {
            return Err(ConfigError::TooManyBreakpoints {
                max: self.max_breakpoints,
            });
        }
        for breakpoint in &self.default_breakpoints {
            breakpoint.validate()?;
        }
        self.new_breakpoint.validate()
    }
}
