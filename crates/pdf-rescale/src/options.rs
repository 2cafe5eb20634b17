use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When source pages get scaled at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalingMode {
    /// Always scale to the usable area
    Always,
    /// Only shrink pages that overflow the usable area
    #[default]
    ScaleDownOnly,
    /// Only enlarge pages that are smaller than the usable area
    ScaleUpOnly,
}

/// How each source page is fitted onto the target page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScalingConfig {
    pub mode: ScalingMode,
    /// Use one factor for both axes; otherwise each axis fills the usable area
    pub maintain_aspect_ratio: bool,
    /// Center the scaled content inside the usable area
    pub enable_centering: bool,
    /// Turn portrait targets to landscape for wide pages
    pub enable_dynamic_landscape: bool,
}

impl ScalingConfig {
    pub const DEFAULT: ScalingConfig = ScalingConfig {
        mode: ScalingMode::ScaleDownOnly,
        maintain_aspect_ratio: true,
        enable_centering: true,
        enable_dynamic_landscape: true,
    };
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete rescaling configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RescaleOptions {
    pub target: TargetPageSpec,
    pub scaling: ScalingConfig,
}

impl RescaleOptions {
    pub fn new(target: TargetPageSpec, scaling: ScalingConfig) -> Self {
        Self { target, scaling }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| RescaleError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RescaleError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.target.validate()
    }
}
