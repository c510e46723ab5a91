//! Issue list pane and severity filter bar

use review_core::{
    format_timestamp, parse_timestamp, severity_color, ListViewport, ScrollBehavior, ScrollBlock,
    ScrollRequest, SeverityBucket, SeverityCounts,
};
use review_types::{Issue, IssueId};
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ScrollIntoViewOptions, ScrollLogicalPosition};

use crate::dom::{child_with_attribute, create, set_styles};

pub const ISSUE_ATTR: &str = "data-issue-id";
pub const SEVERITY_ATTR: &str = "data-severity";

/// "1:30 - 1:45", "1:30", or `None` when the start is not a timestamp
pub fn time_range_label(issue: &Issue) -> Option<String> {
    let start = parse_timestamp(issue.start_time.as_deref()?)?;
    let end = issue.end_time.as_deref().and_then(parse_timestamp);
    Some(match end {
        Some(end) if end > start => {
            format!("{} - {}", format_timestamp(start), format_timestamp(end))
        }
        _ => format_timestamp(start),
    })
}

pub fn bucket_label(bucket: SeverityBucket, count: usize) -> String {
    let name = match bucket {
        SeverityBucket::All => "All",
        SeverityBucket::Critical => "Critical",
        SeverityBucket::High => "High",
        SeverityBucket::Medium => "Medium",
        SeverityBucket::Low => "Low",
    };
    format!("{} ({})", name, count)
}

/// Scrolls list entries into view
pub struct DomListViewport {
    list: Element,
}

impl DomListViewport {
    pub fn new(list: Element) -> Self {
        Self { list }
    }
}

fn scroll_options(request: ScrollRequest) -> ScrollIntoViewOptions {
    let options = ScrollIntoViewOptions::new();
    options.set_block(match request.block {
        ScrollBlock::Start => ScrollLogicalPosition::Start,
        ScrollBlock::Center => ScrollLogicalPosition::Center,
        ScrollBlock::End => ScrollLogicalPosition::End,
        ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
    });
    options.set_behavior(match request.behavior {
        ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
    });
    options
}

impl ListViewport for DomListViewport {
    fn scroll_into_view(&mut self, id: &IssueId, request: ScrollRequest) {
        match child_with_attribute(&self.list, ISSUE_ATTR, id.as_str()) {
            Some(entry) => entry.scroll_into_view_with_scroll_into_view_options(&scroll_options(request)),
            // Filtered out of the list; nothing to scroll to.
            None => debug!(id = id.as_str(), "no list entry to scroll to"),
        }
    }
}

/// Everything the list needs to draw one frame
pub struct ListView<'a> {
    pub issues: &'a [&'a Issue],
    pub selected: Option<&'a IssueId>,
    pub hovered: Option<&'a IssueId>,
    pub total: usize,
}

pub fn render_list(document: &Document, list: &Element, view: &ListView<'_>) -> Result<(), JsValue> {
    list.set_inner_html("");

    if view.issues.is_empty() {
        let text = if view.total == 0 {
            "No issues found."
        } else {
            "No issues match this filter."
        };
        list.append_child(&create(document, "li", Some("issue-empty"), Some(text))?.into())?;
        return Ok(());
    }

    for (index, issue) in view.issues.iter().enumerate() {
        let mut class = String::from("issue-item");
        if view.selected == Some(&issue.id) {
            class.push_str(" is-selected");
        }
        if view.hovered == Some(&issue.id) {
            class.push_str(" is-hovered");
        }

        let item = create(document, "li", Some(&class), None)?;
        item.set_attribute(ISSUE_ATTR, issue.id.as_str())?;

        let header = create(document, "div", Some("issue-header"), None)?;
        header.append_child(&create(
            document,
            "span",
            Some("issue-number"),
            Some(&(index + 1).to_string()),
        )?.into())?;

        let badge = create(
            document,
            "span",
            Some("severity-badge"),
            Some(&issue.severity.as_str().to_uppercase()),
        )?;
        set_styles(&badge, &[("background-color", severity_color(issue.severity))])?;
        header.append_child(&badge)?;

        header.append_child(&create(
            document,
            "span",
            Some("issue-category"),
            Some(issue.category.display_name()),
        )?.into())?;
        if let Some(range) = time_range_label(issue) {
            header.append_child(&create(document, "span", Some("issue-time"), Some(&range))?.into())?;
        }
        item.append_child(&header)?;

        item.append_child(&create(
            document,
            "p",
            Some("issue-description"),
            Some(&issue.description),
        )?.into())?;
        if let Some(context) = issue.context.as_deref().filter(|c| !c.trim().is_empty()) {
            item.append_child(&create(document, "p", Some("issue-context"), Some(context))?.into())?;
        }

        list.append_child(&item)?;
    }
    Ok(())
}

/// Buttons for "all", every bucket with at least one issue, and the active
/// bucket even when it has emptied
pub fn render_filter_bar(
    document: &Document,
    bar: &Element,
    counts: &SeverityCounts,
    active: SeverityBucket,
) -> Result<(), JsValue> {
    bar.set_inner_html("");
    for (bucket, count) in counts.visible_buckets(active) {
        let class = if bucket == active {
            "filter-button is-active"
        } else {
            "filter-button"
        };
        let button = create(document, "button", Some(class), Some(&bucket_label(bucket, count)))?;
        button.set_attribute("type", "button")?;
        button.set_attribute(SEVERITY_ATTR, bucket.as_str())?;
        if let Some(severity) = bucket.severity() {
            set_styles(&button, &[("border-color", severity_color(severity))])?;
        }
        bar.append_child(&button)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_types::{IssueCategory, Severity};

    fn issue(start: Option<&str>, end: Option<&str>) -> Issue {
        Issue {
            id: IssueId::new("a"),
            category: IssueCategory::DosageConcern,
            severity: Severity::Critical,
            description: "Dose stated as 50 mg/kg".to_string(),
            context: None,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            location: None,
        }
    }

    #[test]
    fn test_time_range_label() {
        assert_eq!(time_range_label(&issue(Some("01:30"), Some("01:45"))), Some("1:30 - 1:45".to_string()));
        assert_eq!(time_range_label(&issue(Some("01:30"), None)), Some("1:30".to_string()));
        assert_eq!(time_range_label(&issue(Some("01:30"), Some("N/A"))), Some("1:30".to_string()));
        assert_eq!(time_range_label(&issue(Some("1:02:03"), Some("1:02:03"))), Some("1:02:03".to_string()));
        assert_eq!(time_range_label(&issue(Some("N/A"), Some("01:45"))), None);
        assert_eq!(time_range_label(&issue(None, None)), None);
    }

    #[test]
    fn test_bucket_label() {
        assert_eq!(bucket_label(SeverityBucket::All, 3), "All (3)");
        assert_eq!(bucket_label(SeverityBucket::Critical, 1), "Critical (1)");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use review_core::SeverityFilter;
    use review_types::{IssueCategory, Severity};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn issue(id: &str, severity: Severity) -> Issue {
        Issue {
            id: IssueId::new(id),
            category: IssueCategory::Other,
            severity,
            description: format!("finding {}", id),
            context: Some("context".to_string()),
            start_time: Some("00:05".to_string()),
            end_time: None,
            location: None,
        }
    }

    #[wasm_bindgen_test]
    fn test_render_list_marks_selected_entry() {
        let document = web_sys::window().unwrap().document().unwrap();
        let list = document.create_element("ul").unwrap();
        let issues = [issue("a", Severity::High), issue("b", Severity::Low)];
        let refs: Vec<&Issue> = issues.iter().collect();
        let selected = IssueId::new("b");

        render_list(
            &document,
            &list,
            &ListView {
                issues: &refs,
                selected: Some(&selected),
                hovered: None,
                total: 2,
            },
        )
        .unwrap();

        assert_eq!(list.child_element_count(), 2);
        let entry = child_with_attribute(&list, ISSUE_ATTR, "b").unwrap();
        assert!(entry.class_name().contains("is-selected"));
    }

    #[wasm_bindgen_test]
    fn test_filter_bar_hides_empty_buckets() {
        let document = web_sys::window().unwrap().document().unwrap();
        let bar = document.create_element("div").unwrap();
        let issues = [issue("a", Severity::High), issue("b", Severity::High)];
        let counts = SeverityFilter::counts(&issues);

        render_filter_bar(&document, &bar, &counts, SeverityBucket::All).unwrap();
        // all + high
        assert_eq!(bar.child_element_count(), 2);

        render_filter_bar(&document, &bar, &counts, SeverityBucket::Low).unwrap();
        assert_eq!(bar.child_element_count(), 3);
    }
}
