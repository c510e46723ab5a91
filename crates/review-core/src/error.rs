use review_types::RequestError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("Invalid analysis request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// Backend or network failure, already phrased for display
    #[error("{0}")]
    AnalysisFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("api_base_url must not be empty")]
    EmptyBaseUrl,

    #[error("Pane width {0}px must be positive")]
    NonPositiveWidth(f64),

    #[error("Viewport fraction {0} must be in (0, 1]")]
    FractionOutOfRange(f64),

    #[error("Default frame rate {0} is outside 0.1-10 fps")]
    FrameRateOutOfRange(f64),

    #[error("Selected marker size {selected}px is smaller than idle size {idle}px")]
    MarkerSizes { idle: f64, selected: f64 },

    #[error("Unknown log level: {0}")]
    UnknownLogLevel(String),
}

/// Playback failures. The controller logs and absorbs these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("No playable media is loaded")]
    NotReady,

    #[error("Play request rejected: {0}")]
    Rejected(String),

    #[error("Embedded player is not reachable: {0}")]
    Unreachable(String),
}
