//! Console configuration
//!
//! Loaded from a JSON object supplied by the host page. Every field has a
//! default, so `{}` is a valid configuration.

use review_types::api::{MAX_FRAME_RATE, MIN_FRAME_RATE};
use review_types::AnalysisSpeed;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub log_level: LogLevel,
    pub layout: LayoutConfig,
    pub markers: MarkerConfig,
    pub analysis: AnalysisDefaults,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_level: LogLevel::default(),
            layout: LayoutConfig::default(),
            markers: MarkerConfig::default(),
            analysis: AnalysisDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    pub fn parse(label: &str) -> Result<Self, ConfigError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::UnknownLogLevel(other.to_string())),
        }
    }
}

/// Which side of the media the issue list sits on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneSide {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub initial_width_px: f64,
    pub min_width_px: f64,
    pub max_viewport_fraction: f64,
    pub pane_side: PaneSide,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            initial_width_px: 400.0,
            min_width_px: 300.0,
            max_viewport_fraction: 0.6,
            pane_side: PaneSide::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
    pub idle_size_px: f64,
    pub selected_size_px: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            idle_size_px: 24.0,
            selected_size_px: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisDefaults {
    pub speed: AnalysisSpeed,
    pub frame_rate: f64,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            speed: AnalysisSpeed::Fast,
            frame_rate: review_types::api::DEFAULT_FRAME_RATE,
        }
    }
}

impl ConsoleConfig {
    /// Parse and validate a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ConsoleConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.layout.min_width_px <= 0.0 {
            return Err(ConfigError::NonPositiveWidth(self.layout.min_width_px));
        }
        if self.layout.initial_width_px <= 0.0 {
            return Err(ConfigError::NonPositiveWidth(self.layout.initial_width_px));
        }
        let fraction = self.layout.max_viewport_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::FractionOutOfRange(fraction));
        }
        let rate = self.analysis.frame_rate;
        if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&rate) {
            return Err(ConfigError::FrameRateOutOfRange(rate));
        }
        if self.markers.selected_size_px < self.markers.idle_size_px
            || self.markers.idle_size_px <= 0.0
        {
            return Err(ConfigError::MarkerSizes {
                idle: self.markers.idle_size_px,
                selected: self.markers.selected_size_px,
            });
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    pub fn analyze_url(&self) -> String {
        self.endpoint("/analyze")
    }

    pub fn analyze_upload_url(&self) -> String {
        self.endpoint("/analyze/upload")
    }

    pub fn analyze_initial_url(&self) -> String {
        self.endpoint("/analyze/initial")
    }

    pub fn location_url(&self) -> String {
        self.endpoint("/analyze/location")
    }

    pub fn storage_list_url(&self) -> String {
        self.endpoint("/storage/list")
    }

    pub fn storage_upload_url(&self) -> String {
        self.endpoint("/storage/upload")
    }

    /// `path` is the object path inside the bucket, e.g. `dev/clip.mp4`
    pub fn storage_file_url(&self, path: &str) -> String {
        self.endpoint(&format!("/storage/file/{}", path.trim_start_matches('/')))
    }

    /// Health lives beside the versioned API, not under it
    pub fn health_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let origin = base.strip_suffix("/api/v1").unwrap_or(base);
        format!("{}/health", origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        let config = ConsoleConfig::from_json("{}").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.layout.min_width_px, 300.0);
        assert_eq!(config.layout.max_viewport_fraction, 0.6);
    }

    #[test]
    fn test_partial_override() {
        let config = ConsoleConfig::from_json(
            r#"{"api_base_url":"https://review.example.com/api/v1/","layout":{"pane_side":"left"},"log_level":"debug"}"#,
        )
        .unwrap();
        assert_eq!(config.layout.pane_side, PaneSide::Left);
        assert_eq!(config.layout.initial_width_px, 400.0);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.analyze_url(),
            "https://review.example.com/api/v1/analyze"
        );
        assert_eq!(config.health_url(), "https://review.example.com/health");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = ConsoleConfig::from_json(r#"{"api_base":"/x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors() {
        let err = ConsoleConfig::from_json(r#"{"api_base_url":" "}"#).unwrap_err();
        assert_eq!(err, ConfigError::EmptyBaseUrl);

        let err =
            ConsoleConfig::from_json(r#"{"layout":{"max_viewport_fraction":1.5}}"#).unwrap_err();
        assert_eq!(err, ConfigError::FractionOutOfRange(1.5));

        let err = ConsoleConfig::from_json(r#"{"analysis":{"frame_rate":0.01}}"#).unwrap_err();
        assert_eq!(err, ConfigError::FrameRateOutOfRange(0.01));

        let err = ConsoleConfig::from_json(r#"{"markers":{"idle_size_px":40,"selected_size_px":20}}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MarkerSizes {
                idle: 40.0,
                selected: 20.0
            }
        );
    }

    #[test]
    fn test_endpoints() {
        let config = ConsoleConfig::default();
        assert_eq!(config.analyze_upload_url(), "/api/v1/analyze/upload");
        assert_eq!(config.location_url(), "/api/v1/analyze/location");
        assert_eq!(config.storage_list_url(), "/api/v1/storage/list");
        assert_eq!(
            config.storage_file_url("/dev/clip.mp4"),
            "/api/v1/storage/file/dev/clip.mp4"
        );
        assert_eq!(config.health_url(), "/health");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Debug.as_level(), tracing::Level::DEBUG);
        assert!(LogLevel::parse("verbose").is_err());
    }
}
