use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::IssuePayload;

/// Opaque issue identifier, unique within one [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Ordered severity levels. `Ord` follows low < medium < high < critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Case-insensitive lookup of a severity label
    pub fn parse_label(label: &str) -> Option<Severity> {
        let label = label.trim();
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(label))
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        Severity::parse_label(&label).unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum IssueCategory {
    MedicalAccuracy,
    CitationMissing,
    MisleadingClaim,
    OutdatedInformation,
    UnverifiedStatement,
    Contraindication,
    DosageConcern,
    PresentationStyle,
    WordingConcern,
    VisualQuality,
    AudioQuality,
    Accessibility,
    Professionalism,
    #[default]
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 14] = [
        IssueCategory::MedicalAccuracy,
        IssueCategory::CitationMissing,
        IssueCategory::MisleadingClaim,
        IssueCategory::OutdatedInformation,
        IssueCategory::UnverifiedStatement,
        IssueCategory::Contraindication,
        IssueCategory::DosageConcern,
        IssueCategory::PresentationStyle,
        IssueCategory::WordingConcern,
        IssueCategory::VisualQuality,
        IssueCategory::AudioQuality,
        IssueCategory::Accessibility,
        IssueCategory::Professionalism,
        IssueCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::MedicalAccuracy => "medical_accuracy",
            IssueCategory::CitationMissing => "citation_missing",
            IssueCategory::MisleadingClaim => "misleading_claim",
            IssueCategory::OutdatedInformation => "outdated_information",
            IssueCategory::UnverifiedStatement => "unverified_statement",
            IssueCategory::Contraindication => "contraindication",
            IssueCategory::DosageConcern => "dosage_concern",
            IssueCategory::PresentationStyle => "presentation_style",
            IssueCategory::WordingConcern => "wording_concern",
            IssueCategory::VisualQuality => "visual_quality",
            IssueCategory::AudioQuality => "audio_quality",
            IssueCategory::Accessibility => "accessibility",
            IssueCategory::Professionalism => "professionalism",
            IssueCategory::Other => "other",
        }
    }

    /// Human readable label for list rendering
    pub fn display_name(&self) -> &'static str {
        match self {
            IssueCategory::MedicalAccuracy => "Medical accuracy",
            IssueCategory::CitationMissing => "Missing citation",
            IssueCategory::MisleadingClaim => "Misleading claim",
            IssueCategory::OutdatedInformation => "Outdated information",
            IssueCategory::UnverifiedStatement => "Unverified statement",
            IssueCategory::Contraindication => "Contraindication",
            IssueCategory::DosageConcern => "Dosage concern",
            IssueCategory::PresentationStyle => "Presentation style",
            IssueCategory::WordingConcern => "Wording concern",
            IssueCategory::VisualQuality => "Visual quality",
            IssueCategory::AudioQuality => "Audio quality",
            IssueCategory::Accessibility => "Accessibility",
            IssueCategory::Professionalism => "Professionalism",
            IssueCategory::Other => "Other",
        }
    }
}

impl From<String> for IssueCategory {
    fn from(label: String) -> Self {
        let label = label.trim();
        IssueCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }
}

/// Normalized position inside an image, (0, 0) top-left and (1, 1) bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// One finding produced by analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub context: Option<String>,
    pub start_time: Option<String>, // "MM:SS", "HH:MM:SS" or "N/A"
    pub end_time: Option<String>,
    pub location: Option<Location>,
}

impl Issue {
    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

/// Immutable snapshot of one analysis response
///
/// Ids are unique within a result. A new response replaces the whole
/// snapshot; updates such as an attached location produce a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    summary: String,
    issues: Vec<Issue>,
}

impl AnalysisResult {
    /// Build a result, renaming any duplicate ids to `issue-{index}`
    pub fn new(summary: impl Into<String>, issues: Vec<Issue>) -> Self {
        let mut used = HashSet::new();
        let issues = issues
            .into_iter()
            .enumerate()
            .map(|(idx, mut issue)| {
                issue.id = unique_id(Some(issue.id.as_str()), idx, &mut used);
                issue
            })
            .collect();

        Self {
            summary: summary.into(),
            issues,
        }
    }

    /// Build a result from wire payloads, assigning ids where the backend
    /// did not provide usable ones
    pub fn from_payloads(summary: impl Into<String>, payloads: Vec<IssuePayload>) -> Self {
        let mut used = HashSet::new();
        let issues = payloads
            .into_iter()
            .enumerate()
            .map(|(idx, payload)| {
                let id = unique_id(payload.id.as_deref(), idx, &mut used);
                payload.into_issue(id)
            })
            .collect();

        Self {
            summary: summary.into(),
            issues,
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issue(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| &issue.id == id)
    }

    pub fn contains(&self, id: &IssueId) -> bool {
        self.issue(id).is_some()
    }

    /// Same snapshot with a different summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// New snapshot with `location` attached to the issue `id`, or `None`
    /// when the id is not part of this result
    pub fn with_location(&self, id: &IssueId, location: Location) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let issues = self
            .issues
            .iter()
            .map(|issue| {
                let mut issue = issue.clone();
                if &issue.id == id {
                    issue.location = Some(location);
                }
                issue
            })
            .collect();

        Some(Self {
            summary: self.summary.clone(),
            issues,
        })
    }
}

fn unique_id(candidate: Option<&str>, idx: usize, used: &mut HashSet<String>) -> IssueId {
    let candidate = candidate.map(str::trim).filter(|id| !id.is_empty());
    if let Some(id) = candidate {
        if used.insert(id.to_string()) {
            return IssueId::new(id);
        }
    }

    let mut fallback = format!("issue-{}", idx);
    let mut suffix = 1;
    while !used.insert(fallback.clone()) {
        fallback = format!("issue-{}-{}", idx, suffix);
        suffix += 1;
    }
    IssueId::new(fallback)
}
