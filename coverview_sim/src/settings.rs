//! TOML configuration files.
//!
//! Every key is optional; missing keys fall back to [`SearchConfig::default`].
//!
//! ```toml
//! search_radius = 10.0
//! grid_size = 0.5
//! time_step = 0.1
//!
//! [sampling]
//! angle_samples = 30
//!
//! [strategy.lawnmower]
//! row_spacing = 2.0
//! ```

use coverview_core::{ConfigError, SearchConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

impl SettingsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reads, parses and validates a config file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SearchConfig, SettingsError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
    parse(&contents)
}

/// Parses and validates TOML config text.
pub fn parse(contents: &str) -> Result<SearchConfig, SettingsError> {
    let config: SearchConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Renders a config as TOML.
pub fn render(config: &SearchConfig) -> Result<String, SettingsError> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverview_core::StrategyId;

    #[test]
    fn test_empty_file_is_default() {
        let config = parse("").unwrap();
        assert_eq!(config.search_radius, 10.0);
        assert_eq!(config.grid_size, 0.5);
        assert_eq!(config.sampling.angle_samples, 30);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_partial_override() {
        let config = parse(
            r#"
            search_radius = 15.0
            seed = 7

            [sampling]
            range_samples = 40

            [strategy.lawnmower]
            row_spacing = 2.5
            max_rows = 6

            [strategy.target_aware]
            interest_points = [[1.0, 2.0], [-4.0, 0.5]]
            "#,
        )
        .unwrap();

        assert_eq!(config.search_radius, 15.0);
        assert_eq!(config.grid_size, 0.5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.sampling.range_samples, 40);
        assert_eq!(config.sampling.angle_samples, 30);
        assert_eq!(config.strategy.lawnmower.row_spacing, 2.5);
        assert_eq!(config.strategy.lawnmower.max_rows, Some(6));
        assert_eq!(config.strategy.lawnmower.row_length, 8.0);
        assert_eq!(config.strategy.target_aware.interest_points.len(), 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse("grid_size = -1.0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(ConfigError::NonPositive { .. })));

        let err = parse("[strategy.spiral]\nangle_step = 0.0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(parse("search_radius = "), Err(SettingsError::Parse(_))));
        assert!(matches!(
            parse("search_radius = \"ten\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load("/nonexistent/coverview.toml").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/coverview.toml"));
    }

    #[test]
    fn test_rendered_config_parses() {
        let mut config = SearchConfig::default();
        config.strategy.lawnmower.max_rows = Some(4);
        config.time_step = 0.05;

        let text = render(&config).unwrap();
        assert!(text.contains("[strategy.spiral]"));
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.time_step, 0.05);
        assert_eq!(parsed.strategy.lawnmower.max_rows, Some(4));
        assert_eq!(parsed.strategy.expanding_square.max_side, None);

        // The parsed config is usable as-is
        assert!(coverview_core::Simulator::from_config(&parsed, StrategyId::Star).is_ok());
    }
}
