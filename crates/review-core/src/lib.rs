//! Issue synchronization and playback control for the review console
//!
//! Keeps the issue list, the severity filter and the media overlay pointed at
//! the same selected finding, and drives playback to a finding's start time
//! whichever player backend is active. Nothing here touches the DOM; the
//! browser layer plugs in through [`DirectElement`], [`PlayerChannel`],
//! [`BackendFactory`] and [`ListViewport`].

pub mod config;
pub mod error;
pub mod filter;
pub mod layout;
pub mod overlay;
pub mod playback;
pub mod selection;
pub mod session;
pub mod summary;
pub mod timestamp;

pub use config::{ConsoleConfig, LayoutConfig, LogLevel, MarkerConfig, PaneSide};
pub use error::{ConfigError, PlaybackError, ReviewError};
pub use filter::{SeverityBucket, SeverityCounts, SeverityFilter};
pub use layout::{DragState, ResizableLayout};
pub use overlay::{
    label_color, project, severity_color, Marker, MarkerOverlayEngine, MarkerState, MarkerStyle,
    RenderBox, ScreenPoint,
};
pub use playback::{
    player_command, BackendFactory, DirectElement, MediaPlaybackController, PlaybackBackend,
    PlaybackState, PlayerChannel,
};
pub use selection::{
    ListViewport, NoopViewport, ScrollBehavior, ScrollBlock, ScrollRequest, SelectionCoordinator,
};
pub use session::{validate_upload, RequestTicket, ReviewSession};
pub use summary::describe as describe_issues;
pub use timestamp::{format_timestamp, parse_timestamp};

pub use review_types;
