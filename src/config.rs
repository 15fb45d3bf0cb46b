// config.rs — YAML pipeline configuration.
//
// Every field has a default, so an empty document (or no file at all) gives
// the stock pipeline: Harris only, σ = 0.5 over 9 taps, FAST {9, 20, 100}.
//
//   strategy: fast_with_tracking
//   gaussian: { sigma: 0.5, size: 9 }
//   fast:     { segment_size: 9, threshold: 20, max_features: 100, seed: 7 }
//   harris:   { threshold: 9223372036854775 }

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::DetectionStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianConfig {
    pub sigma: f32,
    pub size: usize,
}

impl Default for GaussianConfig {
    fn default() -> Self {
        GaussianConfig { sigma: 0.5, size: 9 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FastConfig {
    pub segment_size: usize,
    pub threshold: u8,
    pub max_features: usize,
    /// Descriptor pattern seed. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl Default for FastConfig {
    fn default() -> Self {
        FastConfig {
            segment_size: 9,
            threshold: 20,
            max_features: 100,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarrisConfig {
    /// Override for the |R| cutoff. `None` keeps i64::MAX / 1000.
    pub threshold: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub strategy: DetectionStrategy,
    pub gaussian: GaussianConfig,
    pub fast: FastConfig,
    pub harris: HarrisConfig,
}

impl PipelineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty document deserializes as null, not as an empty map.
        let config: PipelineConfig = if text.trim().is_empty() {
            PipelineConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_yaml_str(&text)?;
        log::info!("loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Check the values the detection core would otherwise panic on.
    pub fn validate(&self) -> Result<()> {
        let g = &self.gaussian;
        if g.sigma.is_nan() || g.sigma <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "gaussian.sigma must be positive, got {}",
                g.sigma
            )));
        }
        if g.size % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "gaussian.size must be odd and at least 1, got {}",
                g.size
            )));
        }

        let f = &self.fast;
        if !(1..=16).contains(&f.segment_size) {
            return Err(Error::InvalidConfig(format!(
                "fast.segment_size must be in 1..=16, got {}",
                f.segment_size
            )));
        }
        if f.max_features == 0 {
            return Err(Error::InvalidConfig("fast.max_features must be at least 1".into()));
        }
        Ok(())
    }
}
