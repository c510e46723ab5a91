//! Request and response envelopes for the analysis and storage backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::{MediaKind, MediaReference};
use crate::types::{Issue, IssueCategory, IssueId, Location, Severity};

pub const MIN_FRAME_RATE: f64 = 0.1;
pub const MAX_FRAME_RATE: f64 = 10.0;
pub const DEFAULT_FRAME_RATE: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Either a video URL or an image URL must be provided")]
    MissingMedia,

    #[error("Provide a video URL or an image URL, not both")]
    ConflictingMedia,

    #[error("Frame rate {0} is outside the supported range 0.1-10 fps")]
    FrameRateOutOfRange(f64),

    #[error("Unsupported file type: {0}. Only image files can be uploaded for analysis")]
    UnsupportedUpload(String),
}

/// Model selection for an analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSpeed {
    #[default]
    Fast,
    Powerful,
}

impl AnalysisSpeed {
    pub fn model_name(&self) -> &'static str {
        match self {
            AnalysisSpeed::Fast => "gemini-flash-latest",
            AnalysisSpeed::Powerful => "gemini-3-pro-preview",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSpeed::Fast => "fast",
            AnalysisSpeed::Powerful => "powerful",
        }
    }

    /// Anything other than "powerful" selects the fast model
    pub fn parse(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("powerful") {
            AnalysisSpeed::Powerful
        } else {
            AnalysisSpeed::Fast
        }
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Browser-facing URL when the analysis URL is not directly viewable (gs:// uris)
    #[serde(default, alias = "displayUrl", skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
    #[serde(default)]
    pub speed: AnalysisSpeed,
    #[serde(default, alias = "frameRate", skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
}

impl AnalyzeRequest {
    pub fn for_video(url: impl Into<String>) -> Self {
        Self {
            video_url: Some(url.into()),
            image_url: None,
            display_url: None,
            speed: AnalysisSpeed::default(),
            frame_rate: None,
        }
    }

    pub fn for_image(url: impl Into<String>) -> Self {
        Self {
            video_url: None,
            image_url: Some(url.into()),
            display_url: None,
            speed: AnalysisSpeed::default(),
            frame_rate: None,
        }
    }

    pub fn with_display_url(mut self, url: impl Into<String>) -> Self {
        self.display_url = Some(url.into());
        self
    }

    pub fn with_speed(mut self, speed: AnalysisSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let video = non_blank(&self.video_url);
        let image = non_blank(&self.image_url);
        match (video, image) {
            (None, None) => return Err(RequestError::MissingMedia),
            (Some(_), Some(_)) => return Err(RequestError::ConflictingMedia),
            _ => {}
        }

        if let Some(rate) = self.frame_rate {
            if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&rate) {
                return Err(RequestError::FrameRateOutOfRange(rate));
            }
        }
        Ok(())
    }

    /// The media to show once this request succeeds
    pub fn media_reference(&self) -> MediaReference {
        let display = non_blank(&self.display_url);
        if let Some(video) = non_blank(&self.video_url) {
            MediaReference::video(display.unwrap_or(video))
        } else if let Some(image) = non_blank(&self.image_url) {
            MediaReference::image(display.unwrap_or(image))
        } else {
            MediaReference::none()
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One issue as delivered by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    #[serde(default, alias = "issue_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "startTime", alias = "start_time")]
    pub start_timestamp: Option<String>,
    #[serde(default, alias = "endTime", alias = "end_time")]
    pub end_timestamp: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: IssueCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl IssuePayload {
    pub fn into_issue(self, id: IssueId) -> Issue {
        Issue {
            id,
            category: self.category,
            severity: self.severity,
            description: self.description,
            context: self.context,
            start_time: self.start_timestamp,
            end_time: self.end_timestamp,
            location: self.location,
        }
    }
}

/// Body returned by `POST /analyze` and `POST /analyze/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub analysis_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issues: Vec<IssuePayload>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub total_issues: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub issue_id: String,
    pub issue_description: String,
}

impl LocationRequest {
    pub fn for_issue(issue: &Issue, image_url: Option<String>) -> Self {
        Self {
            image_url,
            issue_id: issue.id.to_string(),
            issue_description: issue.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub issue_id: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// One file in the storage browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageItem {
    pub name: String,
    /// Backend-addressable location, submitted for analysis
    pub uri: String,
    /// Browser-facing URL, used for display
    pub url: String,
    #[serde(alias = "contentType")]
    pub content_type: String,
    pub created: DateTime<Utc>,
}

impl StorageItem {
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type)
    }

    pub fn is_media(&self) -> bool {
        self.media_kind() != MediaKind::None
    }

    /// Request analysing this item, shown through its proxy URL
    pub fn analyze_request(&self) -> Option<AnalyzeRequest> {
        let request = match self.media_kind() {
            MediaKind::Video => AnalyzeRequest::for_video(self.uri.clone()),
            MediaKind::Image => AnalyzeRequest::for_image(self.uri.clone()),
            MediaKind::None => return None,
        };
        Some(request.with_display_url(self.url.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageListResponse {
    pub items: Vec<StorageItem>,
}

impl StorageListResponse {
    /// Image and video items, newest first
    pub fn media_items(&self) -> Vec<&StorageItem> {
        let mut items: Vec<&StorageItem> = self.items.iter().filter(|i| i.is_media()).collect();
        items.sort_by(|a, b| b.created.cmp(&a.created));
        items
    }
}
