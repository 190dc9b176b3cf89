//! Editor configuration.
//!
//! # Responsibility
//! - Resolve logging and export settings from defaults, environment and
//!   explicit overrides, in that order.
//!
//! # Invariants
//! - Export scale is always within `1..=MAX_SCALE`.
//! - Malformed environment values never fail startup; they are reported as
//!   warnings and the previous value is kept.

use crate::export::raster::{RasterOptions, MAX_SCALE};
use crate::logging::{normalize_level, LogConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "ITINERARY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ITINERARY_LOG_DIR";
pub const ENV_EXPORT_DIR: &str = "ITINERARY_EXPORT_DIR";
pub const ENV_EXPORT_SCALE: &str = "ITINERARY_EXPORT_SCALE";

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub scale: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            scale: RasterOptions::default().scale,
        }
    }
}

impl ExportSettings {
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale,
            ..RasterOptions::default()
        }
    }
}

/// Full editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorConfig {
    pub log: LogConfig,
    pub export: ExportSettings,
}

/// Explicit overrides, typically parsed from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub scale: Option<u32>,
}

/// A rejected environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub variable: &'static str,
    pub reason: String,
}

impl Display for ConfigWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ignored {}: {}", self.variable, self.reason)
    }
}

/// Override errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidScale(u32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidScale(scale) => {
                write!(f, "export scale {scale} is outside the supported range 1..={MAX_SCALE}")
            }
        }
    }
}

impl Error for ConfigError {}

impl EditorConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> (Self, Vec<ConfigWarning>) {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let value = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        if let Some(level) = value(ENV_LOG_LEVEL) {
            match normalize_level(&level) {
                Ok(level) => config.log.level = level.to_string(),
                Err(_) => warnings.push(ConfigWarning {
                    variable: ENV_LOG_LEVEL,
                    reason: "expected trace|debug|info|warn|error".to_string(),
                }),
            }
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir.trim());
            if dir.is_absolute() {
                config.log.log_dir = dir;
            } else {
                warnings.push(ConfigWarning {
                    variable: ENV_LOG_DIR,
                    reason: "path must be absolute".to_string(),
                });
            }
        }
        if let Some(dir) = value(ENV_EXPORT_DIR) {
            config.export.output_dir = PathBuf::from(dir.trim());
        }
        if let Some(raw) = value(ENV_EXPORT_SCALE) {
            match raw.trim().parse::<u32>() {
                Ok(scale) if scale_in_range(scale) => config.export.scale = scale,
                _ => warnings.push(ConfigWarning {
                    variable: ENV_EXPORT_SCALE,
                    reason: format!("expected an integer in 1..={MAX_SCALE}"),
                }),
            }
        }

        (config, warnings)
    }

    /// Applies explicit overrides on top of the current values.
    ///
    /// # Errors
    /// - `InvalidScale` when the scale override is out of range; nothing is
    ///   applied in that case.
    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(scale) = overrides.scale {
            if !scale_in_range(scale) {
                return Err(ConfigError::InvalidScale(scale));
            }
            self.export.scale = scale;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        if let Some(dir) = overrides.log_dir {
            self.log.log_dir = dir;
        }
        if let Some(dir) = overrides.export_dir {
            self.export.output_dir = dir;
        }
        Ok(())
    }
}

fn scale_in_range(scale: u32) -> bool {
    (1..=MAX_SCALE).contains(&scale)
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, ConfigOverrides, EditorConfig, ENV_EXPORT_DIR, ENV_EXPORT_SCALE,
        ENV_LOG_DIR, ENV_LOG_LEVEL,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_export_at_double_scale() {
        let (config, warnings) = EditorConfig::from_lookup(|_| None);
        assert!(warnings.is_empty());
        assert_eq!(config.export.scale, 2);
        assert_eq!(config.export.raster_options().scale, 2);
        assert!(config.log.log_dir.is_absolute());
    }

    #[test]
    fn environment_overrides_defaults() {
        let log_dir = std::env::temp_dir().join("itinerary-env-logs");
        let (config, warnings) = EditorConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, log_dir.to_str().unwrap()),
            (ENV_EXPORT_DIR, "out"),
            (ENV_EXPORT_SCALE, "3"),
        ]));

        assert!(warnings.is_empty());
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.log_dir, log_dir);
        assert_eq!(config.export.output_dir, PathBuf::from("out"));
        assert_eq!(config.export.scale, 3);
    }

    #[test]
    fn malformed_environment_values_become_warnings() {
        let (config, warnings) = EditorConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, "verbose"),
            (ENV_LOG_DIR, "relative/logs"),
            (ENV_EXPORT_SCALE, "9"),
        ]));

        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].variable, ENV_LOG_LEVEL);
        assert_eq!(warnings[1].variable, ENV_LOG_DIR);
        assert_eq!(warnings[2].variable, ENV_EXPORT_SCALE);
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn environment_log_level_is_normalized_for_logger() {
        let log_dir = std::env::temp_dir().join("itinerary-env-logs");
        let (config, warnings) = EditorConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, " WARNING "),
            (ENV_LOG_DIR, log_dir.to_str().unwrap()),
        ]));

        assert!(warnings.is_empty());
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn overrides_win_and_reject_bad_scale() {
        let (mut config, _) = EditorConfig::from_lookup(lookup(&[(ENV_EXPORT_SCALE, "3")]));
        config
            .apply(ConfigOverrides {
                scale: Some(1),
                export_dir: Some(PathBuf::from("exports")),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.export.scale, 1);
        assert_eq!(config.export.output_dir, PathBuf::from("exports"));

        let err = config
            .apply(ConfigOverrides {
                scale: Some(0),
                log_level: Some("error".to_string()),
                ..ConfigOverrides::default()
            })
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidScale(0));
        assert_ne!(config.log.level, "error");
    }
}
