//! # World Settings
//!
//! Simple configuration values handed to the generator at world creation.
//! Loaded once from TOML; never generated.
//!
//! ```toml
//! flat_debug_mode = false
//! max_non_air_height = 1024
//! max_sudden_slope = 3
//! sea_level = 0
//! heightmap_cache_limit = 4096
//! ridge_cache_limit = 512
//! lock_stripes = 64
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{WorldGenError, WorldGenResult};

/// World-level generation settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldSettings {
    /// Replaces natural terrain with a fixed grass/dirt/stone slab.
    pub flat_debug_mode: bool,
    /// World Z above which every voxel is air.
    pub max_non_air_height: i32,
    /// Largest neighbour drop still shaped as a slope; larger drops stay cliffs.
    pub max_sudden_slope: i32,
    /// World Z of the water surface.
    pub sea_level: i32,
    /// Height-map entries kept before a maintenance tick clears the cache.
    pub heightmap_cache_limit: usize,
    /// Ridge networks kept before a maintenance tick clears the cache.
    pub ridge_cache_limit: usize,
    /// Number of mutex stripes per cache.
    pub lock_stripes: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            flat_debug_mode: false,
            max_non_air_height: 1024,
            max_sudden_slope: 3,
            sea_level: 0,
            heightmap_cache_limit: 4096,
            ridge_cache_limit: 512,
            lock_stripes: 64,
        }
    }
}

impl WorldSettings {
    /// Settings for deterministic debugging worlds.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            flat_debug_mode: true,
            ..Self::default()
        }
    }

    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfig` for
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> WorldGenResult<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`WorldSettings::from_toml_str`].
    pub fn load(path: &Path) -> WorldGenResult<Self> {
        let source = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&source)?;
        tracing::info!("loaded world settings from {}", path.display());
        Ok(settings)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> WorldGenResult<()> {
        if self.lock_stripes == 0 {
            return Err(WorldGenError::InvalidConfig(
                "lock_stripes must be at least 1".into(),
            ));
        }
        if self.heightmap_cache_limit == 0 {
            return Err(WorldGenError::InvalidConfig(
                "heightmap_cache_limit must be at least 1".into(),
            ));
        }
        if self.ridge_cache_limit == 0 {
            return Err(WorldGenError::InvalidConfig(
                "ridge_cache_limit must be at least 1".into(),
            ));
        }
        if self.max_sudden_slope < 1 {
            return Err(WorldGenError::InvalidConfig(format!(
                "max_sudden_slope must be positive, got {}",
                self.max_sudden_slope
            )));
        }
        if self.max_non_air_height <= self.sea_level {
            return Err(WorldGenError::InvalidConfig(format!(
                "max_non_air_height ({}) must be above sea_level ({})",
                self.max_non_air_height, self.sea_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_parses() {
        let source = include_str!("../../../config/worldgen.toml");
        let settings = WorldSettings::from_toml_str(source).unwrap();
        assert!(!settings.flat_debug_mode);
        assert_eq!(settings.sea_level, 0);
        assert_eq!(settings.lock_stripes, 64);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = WorldSettings::from_toml_str("flat_debug_mode = true").unwrap();
        assert!(settings.flat_debug_mode);
        assert_eq!(settings.max_sudden_slope, WorldSettings::default().max_sudden_slope);
    }

    #[test]
    fn test_zero_stripes_rejected() {
        let err = WorldSettings::from_toml_str("lock_stripes = 0").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = WorldSettings::from_toml_str("mountains = 3").unwrap_err();
        assert!(matches!(err, WorldGenError::ConfigParse(_)), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldSettings::load(Path::new("/nonexistent/worldgen.toml")).unwrap_err();
        assert!(matches!(err, WorldGenError::Io(_)));
    }
}
