//! Severity filter over the current issue set

use review_types::{Issue, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Filter bucket: every issue, or a single severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBucket {
    #[default]
    All,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBucket {
    /// Display order for filter controls: `all`, then most severe first
    pub const DISPLAY_ORDER: [SeverityBucket; 5] = [
        SeverityBucket::All,
        SeverityBucket::Critical,
        SeverityBucket::High,
        SeverityBucket::Medium,
        SeverityBucket::Low,
    ];

    pub fn severity(&self) -> Option<Severity> {
        match self {
            SeverityBucket::All => None,
            SeverityBucket::Low => Some(Severity::Low),
            SeverityBucket::Medium => Some(Severity::Medium),
            SeverityBucket::High => Some(Severity::High),
            SeverityBucket::Critical => Some(Severity::Critical),
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.severity().map_or(true, |s| issue.severity == s)
    }

    pub fn as_str(&self) -> &'static str {
        self.severity().map_or("all", |s| s.as_str())
    }

    pub fn parse(label: &str) -> Option<Self> {
        if label.trim().eq_ignore_ascii_case("all") {
            return Some(SeverityBucket::All);
        }
        Severity::parse_label(label).map(SeverityBucket::from)
    }
}

impl From<Severity> for SeverityBucket {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => SeverityBucket::Low,
            Severity::Medium => SeverityBucket::Medium,
            Severity::High => SeverityBucket::High,
            Severity::Critical => SeverityBucket::Critical,
        }
    }
}

/// Per-bucket issue counts. `all` is the total regardless of filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub all: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn get(&self, bucket: SeverityBucket) -> usize {
        match bucket {
            SeverityBucket::All => self.all,
            SeverityBucket::Low => self.low,
            SeverityBucket::Medium => self.medium,
            SeverityBucket::High => self.high,
            SeverityBucket::Critical => self.critical,
        }
    }

    /// Buckets a filter bar should show: `all`, every non-empty severity, and
    /// `active` even after its issues are gone so it can be switched off
    pub fn visible_buckets(&self, active: SeverityBucket) -> Vec<(SeverityBucket, usize)> {
        SeverityBucket::DISPLAY_ORDER
            .into_iter()
            .map(|bucket| (bucket, self.get(bucket)))
            .filter(|(bucket, count)| {
                *bucket == SeverityBucket::All || *bucket == active || *count > 0
            })
            .collect()
    }
}

/// Holds the active bucket. Survives result replacement; views are always
/// derived from whatever issue set is passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityFilter {
    active: SeverityBucket,
}

impl SeverityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> SeverityBucket {
        self.active
    }

    /// Any bucket is legal, including ones with no matching issues
    pub fn set_active(&mut self, bucket: SeverityBucket) {
        if self.active != bucket {
            debug!(from = self.active.as_str(), to = bucket.as_str(), "severity filter changed");
        }
        self.active = bucket;
    }

    /// Issues in the active bucket, in original order
    pub fn filtered<'a>(&self, issues: &'a [Issue]) -> Vec<&'a Issue> {
        issues
            .iter()
            .filter(|issue| self.active.matches(issue))
            .collect()
    }

    /// One pass over the full set
    pub fn counts(issues: &[Issue]) -> SeverityCounts {
        issues
            .iter()
            .fold(SeverityCounts::default(), |mut counts, issue| {
                counts.all += 1;
                match issue.severity {
                    Severity::Low => counts.low += 1,
                    Severity::Medium => counts.medium += 1,
                    Severity::High => counts.high += 1,
                    Severity::Critical => counts.critical += 1,
                }
                counts
            })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use review_types::{IssueCategory, IssueId};

    fn severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Low),
            Just(Severity::Medium),
            Just(Severity::High),
            Just(Severity::Critical),
        ]
    }

    fn issues() -> impl Strategy<Value = Vec<Issue>> {
        prop::collection::vec(severity(), 0..40).prop_map(|severities| {
            severities
                .into_iter()
                .enumerate()
                .map(|(idx, severity)| Issue {
                    id: IssueId::new(format!("issue-{}", idx)),
                    category: IssueCategory::Other,
                    severity,
                    description: String::new(),
                    context: None,
                    start_time: None,
                    end_time: None,
                    location: None,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn all_is_identity(issues in issues()) {
            let filter = SeverityFilter::new();
            let filtered: Vec<Issue> = filter.filtered(&issues).into_iter().cloned().collect();
            prop_assert_eq!(filtered, issues);
        }

        #[test]
        fn bucket_only_contains_matching(issues in issues(), severity in severity()) {
            let mut filter = SeverityFilter::new();
            filter.set_active(severity.into());
            let filtered = filter.filtered(&issues);
            prop_assert!(filtered.iter().all(|i| i.severity == severity));
            prop_assert_eq!(filtered.len(), SeverityFilter::counts(&issues).get(severity.into()));
        }

        #[test]
        fn filtered_preserves_order(issues in issues(), severity in severity()) {
            let mut filter = SeverityFilter::new();
            filter.set_active(severity.into());
            let positions: Vec<usize> = filter
                .filtered(&issues)
                .iter()
                .map(|i| issues.iter().position(|x| x.id == i.id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn counts_sum_to_all(issues in issues()) {
            let counts = SeverityFilter::counts(&issues);
            prop_assert_eq!(counts.all, issues.len());
            prop_assert_eq!(counts.low + counts.medium + counts.high + counts.critical, counts.all);
        }
    }
}
