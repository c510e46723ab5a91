//! Media playback control
//!
//! One `seek_and_play` over two backends: a media element we drive
//! directly, and an embedded third-party player reached by posting command
//! messages into its frame. The backend is picked once, when a
//! [`MediaReference`] is loaded, from the reference's classified source.

use review_types::{MediaKind, MediaReference, VideoSource};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::PlaybackError;

/// A media element whose position and play state we control
pub trait DirectElement {
    fn set_current_time(&mut self, seconds: f64);

    /// Request playback. Rejections (autoplay policy) are not fatal.
    fn play(&mut self) -> Result<(), PlaybackError>;
}

/// One-way message channel into an embedded player frame
pub trait PlayerChannel {
    fn post_command(&mut self, message: &str) -> Result<(), PlaybackError>;
}

/// Creates the backend for a freshly loaded media reference
pub trait BackendFactory {
    fn direct(&mut self, url: &str) -> Option<Box<dyn DirectElement>>;

    fn embedded(&mut self, video_id: &str, embed_url: &str) -> Option<Box<dyn PlayerChannel>>;
}

pub enum PlaybackBackend {
    Direct(Box<dyn DirectElement>),
    Embedded(Box<dyn PlayerChannel>),
}

impl std::fmt::Debug for PlaybackBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackBackend::Direct(_) => f.write_str("Direct"),
            PlaybackBackend::Embedded(_) => f.write_str("Embedded"),
        }
    }
}

/// Command message understood by the embedded player's JS API
pub fn player_command(func: &str, args: serde_json::Value) -> String {
    json!({ "event": "command", "func": func, "args": args }).to_string()
}

impl PlaybackBackend {
    fn seek_and_play(&mut self, offset_seconds: f64) {
        match self {
            PlaybackBackend::Direct(element) => {
                element.set_current_time(offset_seconds);
                if let Err(err) = element.play() {
                    debug!(error = %err, "play request rejected, ignoring");
                }
            }
            PlaybackBackend::Embedded(channel) => {
                // No acknowledgement comes back; both posts are best effort.
                let seek = player_command("seekTo", json!([offset_seconds, true]));
                let play = player_command("playVideo", json!([]));
                for message in [seek, play] {
                    if let Err(err) = channel.post_command(&message) {
                        debug!(error = %err, "player command not delivered");
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Ready,
    Unavailable,
}

#[derive(Debug, Default)]
enum ControllerState {
    #[default]
    Idle,
    Ready(PlaybackBackend),
    Unavailable,
}

#[derive(Debug, Default)]
pub struct MediaPlaybackController {
    state: ControllerState,
}

impl MediaPlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        match self.state {
            ControllerState::Idle => PlaybackState::Idle,
            ControllerState::Ready(_) => PlaybackState::Ready,
            ControllerState::Unavailable => PlaybackState::Unavailable,
        }
    }

    /// Which backend is active, when ready
    pub fn backend(&self) -> Option<&PlaybackBackend> {
        match &self.state {
            ControllerState::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    /// Load a media reference, replacing whatever was active.
    ///
    /// Images are `Unavailable`; no media is `Idle`; a video whose backend
    /// cannot be created is `Unavailable`.
    pub fn load(
        &mut self,
        media: &MediaReference,
        factory: &mut dyn BackendFactory,
    ) -> PlaybackState {
        self.state = match (media.kind(), media.source()) {
            (MediaKind::None, _) => ControllerState::Idle,
            (MediaKind::Image, _) => ControllerState::Unavailable,
            (MediaKind::Video, Some(VideoSource::Embedded { video_id })) => {
                let embed_url = media
                    .source()
                    .and_then(VideoSource::embed_url)
                    .unwrap_or_default();
                factory
                    .embedded(video_id, &embed_url)
                    .map_or(ControllerState::Unavailable, |channel| {
                        ControllerState::Ready(PlaybackBackend::Embedded(channel))
                    })
            }
            (MediaKind::Video, _) => factory
                .direct(media.url())
                .map_or(ControllerState::Unavailable, |element| {
                    ControllerState::Ready(PlaybackBackend::Direct(element))
                }),
        };

        let state = self.state();
        info!(kind = ?media.kind(), url = media.url(), ?state, "media loaded");
        state
    }

    /// Install a backend directly
    pub fn attach(&mut self, backend: PlaybackBackend) {
        self.state = ControllerState::Ready(backend);
    }

    /// The active media failed to load
    pub fn mark_unavailable(&mut self) {
        if !matches!(self.state, ControllerState::Unavailable) {
            warn!("media failed to load, playback unavailable");
        }
        self.state = ControllerState::Unavailable;
    }

    pub fn unload(&mut self) {
        self.state = ControllerState::Idle;
    }

    /// Seek and start playback. A no-op outside `Ready`.
    ///
    /// Returns whether a backend was asked to seek.
    pub fn seek_and_play(&mut self, offset_seconds: f64) -> bool {
        if let ControllerState::Ready(backend) = &mut self.state {
            debug!(offset_seconds, backend = ?backend, "seek and play");
            backend.seek_and_play(offset_seconds);
            return true;
        }
        debug!(offset_seconds, state = ?self.state(), "seek ignored, playback not ready");
        false
    }
}
