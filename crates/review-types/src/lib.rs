//! Shared data model for the review console
//!
//! Findings, media references and the request/response envelopes exchanged
//! with the analysis and storage backends.

pub mod api;
pub mod media;
pub mod types;

pub use api::{
    AnalysisSpeed, AnalyzeRequest, AnalyzeResponse, HealthResponse, IssuePayload,
    LocationRequest, LocationResponse, RequestError, StorageItem, StorageListResponse,
};
pub use media::{MediaKind, MediaReference, VideoSource};
pub use types::{AnalysisResult, Issue, IssueCategory, IssueId, Location, Severity};
