//! Summary text for results that arrive without one

use review_types::{AnalysisResult, Issue, Severity};

use crate::filter::SeverityFilter;

pub const NO_ISSUES_SUMMARY: &str =
    "No significant medical accuracy issues identified in this content.";

/// e.g. "Analysis identified 3 potential issues (1 critical, 2 low) requiring review."
pub fn describe(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return NO_ISSUES_SUMMARY.to_string();
    }

    let counts = SeverityFilter::counts(issues);
    let breakdown: Vec<String> = Severity::ALL
        .iter()
        .rev()
        .filter_map(|severity| {
            let count = counts.get((*severity).into());
            (count > 0).then(|| format!("{} {}", count, severity))
        })
        .collect();

    format!(
        "Analysis identified {} potential issue{} ({}) requiring review.",
        counts.all,
        if counts.all == 1 { "" } else { "s" },
        breakdown.join(", ")
    )
}

/// Keep a non-blank summary, otherwise derive one from the issues
pub fn with_fallback_summary(result: AnalysisResult) -> AnalysisResult {
    if result.summary().trim().is_empty() {
        let summary = describe(result.issues());
        result.with_summary(summary)
    } else {
        result
    }
}
