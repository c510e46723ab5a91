//! Numbered location markers drawn over an image

use review_core::{Marker, MarkerState};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::dom::{create, set_styles};
use crate::issue_list::ISSUE_ATTR;

/// Top-left CSS offset that centers a marker of `size` on `center`
pub fn marker_offset(center: f64, size: f64) -> f64 {
    center - size / 2.0
}

fn state_class(state: MarkerState) -> &'static str {
    match state {
        MarkerState::Idle => "issue-marker",
        MarkerState::Hovered => "issue-marker is-hovered",
        MarkerState::Selected => "issue-marker is-selected",
    }
}

/// Replace the layer's markers. Selected markers stack above the rest.
pub fn render_markers(document: &Document, layer: &Element, markers: &[Marker]) -> Result<(), JsValue> {
    layer.set_inner_html("");

    for marker in markers {
        let size = marker.style.size_px;
        let left = format!("{}px", marker_offset(marker.position.x, size));
        let top = format!("{}px", marker_offset(marker.position.y, size));
        let diameter = format!("{}px", size);
        let border = format!("2px solid {}", marker.style.border);

        let dot = create(
            document,
            "button",
            Some(state_class(marker.state)),
            Some(&marker.number.to_string()),
        )?;
        dot.set_attribute("type", "button")?;
        dot.set_attribute(ISSUE_ATTR, marker.issue_id.as_str())?;
        dot.set_attribute("aria-label", &format!("Issue {}", marker.number))?;

        let z_index = if marker.state == MarkerState::Selected { "3" } else { "2" };
        set_styles(
            &dot,
            &[
                ("position", "absolute"),
                ("left", left.as_str()),
                ("top", top.as_str()),
                ("width", diameter.as_str()),
                ("height", diameter.as_str()),
                ("border-radius", "50%"),
                ("border", border.as_str()),
                ("background-color", marker.style.fill),
                ("pointer-events", "auto"),
                ("z-index", z_index),
            ],
        )?;

        layer.append_child(&dot)?;
    }
    Ok(())
}
