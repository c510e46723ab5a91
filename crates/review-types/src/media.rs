//! Media references and video source classification

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    #[default]
    None,
}

impl MediaKind {
    /// Classify a MIME type; anything that is not image/* or video/* is `None`
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("video/") {
            MediaKind::Video
        } else if content_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::None
        }
    }
}

/// Which playback mechanism a video URL needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VideoSource {
    /// Third-party player inside an iframe, driven by postMessage
    Embedded { video_id: String },
    /// A `<video>` element we control directly
    Direct,
}

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

impl VideoSource {
    pub fn classify(url: &str) -> Self {
        match youtube_video_id(url) {
            Some(video_id) => VideoSource::Embedded { video_id },
            None => VideoSource::Direct,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, VideoSource::Embedded { .. })
    }

    /// Player URL with the JS API enabled, for embedded sources
    pub fn embed_url(&self) -> Option<String> {
        match self {
            VideoSource::Embedded { video_id } => {
                Some(format!("{}{}?enablejsapi=1", EMBED_BASE, video_id))
            }
            VideoSource::Direct => None,
        }
    }
}

/// Extract the video id from the YouTube URL shapes we accept:
/// `youtube.com/watch?v=ID`, `youtu.be/ID`, `youtube.com/embed/ID`
/// and `youtube.com/shorts/ID`.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(&host);

    let candidate = match host {
        "youtu.be" => path.split(['?', '#', '/']).next(),
        "youtube.com" | "youtube-nocookie.com" => {
            if let Some(query) = path.strip_prefix("watch?") {
                query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("v="))
                    .map(|id| id.split('#').next().unwrap_or(id))
            } else if let Some(id) = path
                .strip_prefix("embed/")
                .or_else(|| path.strip_prefix("shorts/"))
            {
                id.split(['?', '#', '/']).next()
            } else {
                None
            }
        }
        _ => None,
    }?;

    let valid = !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| candidate.to_string())
}

/// The media currently shown next to the findings
///
/// Video sources are classified once here and never re-inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    kind: MediaKind,
    url: String,
    source: Option<VideoSource>,
}

impl MediaReference {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn video(url: impl Into<String>) -> Self {
        let url = url.into();
        let source = Some(VideoSource::classify(&url));
        Self {
            kind: MediaKind::Video,
            url,
            source,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            source: None,
        }
    }

    pub fn from_content_type(url: impl Into<String>, content_type: &str) -> Self {
        match MediaKind::from_content_type(content_type) {
            MediaKind::Video => Self::video(url),
            MediaKind::Image => Self::image(url),
            MediaKind::None => Self::none(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    pub fn is_time_based(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn is_spatial(&self) -> bool {
        self.kind == MediaKind::Image
    }
}
