//! Process-wide engine configuration.
//!
//! Installed at most once, read-only afterwards, shared by every node.

use std::sync::OnceLock;

use crate::error::ConfigError;

static GLOBAL_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Configuration shared by every engine node in the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Physical pixels per point. Computed geometry is rounded to this grid;
    /// `0.0` disables rounding.
    pub point_scale_factor: f32,

    /// Report unconstrained measure axes as `AtMost(UNCONSTRAINED)` instead of
    /// `Undefined`, the way older engine revisions did.
    pub use_legacy_stretch_behaviour: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            use_legacy_stretch_behaviour: false,
        }
    }
}

impl EngineConfig {
    /// Install the process-wide configuration.
    ///
    /// Must happen before the first layout pass reads the configuration;
    /// afterwards it fails with [`ConfigError::AlreadyInstalled`].
    pub fn install(config: EngineConfig) -> Result<(), ConfigError> {
        if !config.point_scale_factor.is_finite() || config.point_scale_factor < 0.0 {
            return Err(ConfigError::InvalidScaleFactor(config.point_scale_factor));
        }
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        log::debug!("engine configuration installed: {config:?}");
        Ok(())
    }

    /// The active configuration (defaults when nothing was installed).
    pub fn global() -> &'static EngineConfig {
        GLOBAL_CONFIG.get_or_init(EngineConfig::default)
    }

    /// Round a value to the pixel grid.
    #[inline]
    pub fn round_to_pixel_grid(&self, value: f32) -> f32 {
        if self.point_scale_factor == 0.0 || !value.is_finite() {
            return value;
        }
        (value * self.point_scale_factor).round() / self.point_scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_follows_scale_factor() {
        let config = EngineConfig {
            point_scale_factor: 2.0,
            use_legacy_stretch_behaviour: false,
        };
        assert_eq!(config.round_to_pixel_grid(10.3), 10.5);
        assert_eq!(config.round_to_pixel_grid(10.2), 10.0);

        let unrounded = EngineConfig {
            point_scale_factor: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(unrounded.round_to_pixel_grid(10.3), 10.3);
        assert!(EngineConfig::default().round_to_pixel_grid(f32::NAN).is_nan());
    }

    #[test]
    fn test_invalid_scale_factor_is_rejected() {
        let config = EngineConfig {
            point_scale_factor: f32::NAN,
            ..EngineConfig::default()
        };
        assert!(matches!(
            EngineConfig::install(config),
            Err(ConfigError::InvalidScaleFactor(_))
        ));
    }
}
