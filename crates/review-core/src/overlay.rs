//! Marker overlay for spatially anchored issues
//!
//! Projects normalized issue locations onto the rendered image box, assigns
//! display numbers from the filtered list, and tracks which marker is
//! highlighted. Issues without a location produce no marker.

use review_types::{Issue, IssueId, Location, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MarkerConfig;

/// On-screen box of the rendered media, in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Project a normalized location into the box.
///
/// Out-of-range coordinates are not clamped and land outside the box.
pub fn project(location: Location, bounds: RenderBox) -> ScreenPoint {
    ScreenPoint {
        x: bounds.left + location.x * bounds.width,
        y: bounds.top + location.y * bounds.height,
    }
}

pub const CRITICAL_COLOR: &str = "#dc2626";
pub const HIGH_COLOR: &str = "#ea580c";
pub const MEDIUM_COLOR: &str = "#ca8a04";
pub const LOW_COLOR: &str = "#2563eb";
pub const NEUTRAL_COLOR: &str = "#6b7280";
pub const IDLE_FILL: &str = "#ffffff";

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => CRITICAL_COLOR,
        Severity::High => HIGH_COLOR,
        Severity::Medium => MEDIUM_COLOR,
        Severity::Low => LOW_COLOR,
    }
}

/// Color for a raw severity label; unrecognized labels get the neutral color
pub fn label_color(label: &str) -> &'static str {
    Severity::parse_label(label).map_or(NEUTRAL_COLOR, severity_color)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerState {
    Idle,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub fill: &'static str,
    pub border: &'static str,
    pub size_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub issue_id: IssueId,
    /// 1-based position in the filtered list
    pub number: usize,
    pub severity: Severity,
    /// Marker center
    pub position: ScreenPoint,
    pub state: MarkerState,
    pub style: MarkerStyle,
}

impl Marker {
    fn contains(&self, point: ScreenPoint) -> bool {
        let radius = self.style.size_px / 2.0;
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= radius * radius
    }
}

#[derive(Debug, Clone)]
pub struct MarkerOverlayEngine {
    selected: Option<IssueId>,
    hovered: Option<IssueId>,
    idle_size_px: f64,
    selected_size_px: f64,
}

impl Default for MarkerOverlayEngine {
    fn default() -> Self {
        Self::new(&MarkerConfig::default())
    }
}

impl MarkerOverlayEngine {
    pub fn new(config: &MarkerConfig) -> Self {
        Self {
            selected: None,
            hovered: None,
            idle_size_px: config.idle_size_px,
            selected_size_px: config.selected_size_px,
        }
    }

    pub fn selected(&self) -> Option<&IssueId> {
        self.selected.as_ref()
    }

    pub fn set_selected(&mut self, id: Option<IssueId>) {
        debug!(selected = ?id.as_ref().map(IssueId::as_str), "overlay highlight");
        self.selected = id;
    }

    pub fn hovered(&self) -> Option<&IssueId> {
        self.hovered.as_ref()
    }

    pub fn set_hovered(&mut self, id: Option<IssueId>) {
        self.hovered = id;
    }

    pub fn state_for(&self, id: &IssueId) -> MarkerState {
        if self.selected.as_ref() == Some(id) {
            MarkerState::Selected
        } else if self.hovered.as_ref() == Some(id) {
            MarkerState::Hovered
        } else {
            MarkerState::Idle
        }
    }

    pub fn style_for(&self, severity: Severity, state: MarkerState) -> MarkerStyle {
        let color = severity_color(severity);
        match state {
            MarkerState::Selected => MarkerStyle {
                fill: color,
                border: color,
                size_px: self.selected_size_px,
            },
            MarkerState::Hovered => MarkerStyle {
                fill: IDLE_FILL,
                border: color,
                size_px: (self.idle_size_px + self.selected_size_px) / 2.0,
            },
            MarkerState::Idle => MarkerStyle {
                fill: IDLE_FILL,
                border: color,
                size_px: self.idle_size_px,
            },
        }
    }

    /// Markers for the filtered list, numbered by filtered position
    pub fn markers(&self, filtered: &[&Issue], bounds: RenderBox) -> Vec<Marker> {
        filtered
            .iter()
            .enumerate()
            .filter_map(|(idx, issue)| {
                let location = issue.location?;
                let state = self.state_for(&issue.id);
                Some(Marker {
                    issue_id: issue.id.clone(),
                    number: idx + 1,
                    severity: issue.severity,
                    position: project(location, bounds),
                    state,
                    style: self.style_for(issue.severity, state),
                })
            })
            .collect()
    }

    /// Issue under `point`. The selected marker wins, then the last drawn.
    pub fn hit_test(&self, markers: &[Marker], point: ScreenPoint) -> Option<IssueId> {
        let mut topmost = None;
        for marker in markers.iter().filter(|m| m.contains(point)) {
            if marker.state == MarkerState::Selected {
                return Some(marker.issue_id.clone());
            }
            topmost = Some(marker);
        }
        topmost.map(|m| m.issue_id.clone())
    }

    /// Resolve a display number back to the stable issue id
    pub fn resolve_number(markers: &[Marker], number: usize) -> Option<IssueId> {
        markers
            .iter()
            .find(|m| m.number == number)
            .map(|m| m.issue_id.clone())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..4000.0
    }

    fn offset() -> impl Strategy<Value = f64> {
        -2000.0f64..2000.0
    }

    proptest! {
        #[test]
        fn origin_maps_to_top_left(left in offset(), top in offset(), w in dimension(), h in dimension()) {
            let bounds = RenderBox::new(left, top, w, h);
            let point = project(Location::new(0.0, 0.0), bounds);
            prop_assert!((point.x - left).abs() < 1e-9);
            prop_assert!((point.y - top).abs() < 1e-9);
        }

        #[test]
        fn unit_maps_to_bottom_right(left in offset(), top in offset(), w in dimension(), h in dimension()) {
            let bounds = RenderBox::new(left, top, w, h);
            let point = project(Location::new(1.0, 1.0), bounds);
            prop_assert!((point.x - (left + w)).abs() < 1e-6);
            prop_assert!((point.y - (top + h)).abs() < 1e-6);
        }

        #[test]
        fn projection_is_linear(
            x in -1.0f64..2.0,
            y in -1.0f64..2.0,
            left in offset(),
            top in offset(),
            w in dimension(),
            h in dimension(),
        ) {
            let bounds = RenderBox::new(left, top, w, h);
            let origin = project(Location::new(0.0, 0.0), bounds);
            let point = project(Location::new(x, y), bounds);
            prop_assert!(((point.x - origin.x) - x * w).abs() < 1e-6);
            prop_assert!(((point.y - origin.y) - y * h).abs() < 1e-6);
        }

        #[test]
        fn normalized_points_stay_inside(
            x in 0.0f64..=1.0,
            y in 0.0f64..=1.0,
            w in dimension(),
            h in dimension(),
        ) {
            let bounds = RenderBox::new(0.0, 0.0, w, h);
            let point = project(Location::new(x, y), bounds);
            prop_assert!(point.x >= 0.0 && point.x <= w + 1e-9);
            prop_assert!(point.y >= 0.0 && point.y <= h + 1e-9);
        }
    }
}
