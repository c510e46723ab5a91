//! Small DOM helpers shared by the views

use review_core::RenderBox;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document available"))
}

pub fn element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element #{} not found", id)))
}

pub fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

/// Create an element with optional class and text
pub fn create(
    document: &Document,
    tag: &str,
    class: Option<&str>,
    text: Option<&str>,
) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    if let Some(class) = class {
        element.set_class_name(class);
    }
    if text.is_some() {
        element.set_text_content(text);
    }
    Ok(element)
}

pub fn viewport_width() -> Result<f64, JsValue> {
    window()?
        .inner_width()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("innerWidth is not a number"))
}

/// Box of `element` relative to `container`'s top-left corner
pub fn relative_box(element: &Element, container: &Element) -> RenderBox {
    let rect = element.get_bounding_client_rect();
    let origin = container.get_bounding_client_rect();
    RenderBox::new(
        rect.left() - origin.left(),
        rect.top() - origin.top(),
        rect.width(),
        rect.height(),
    )
}

/// Nearest ancestor (or self) of the event target carrying `attribute`
pub fn closest_with_attribute(event: &web_sys::Event, attribute: &str) -> Option<(Element, String)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let found = target.closest(&format!("[{}]", attribute)).ok()??;
    let value = found.get_attribute(attribute)?;
    Some((found, value))
}

/// First direct child whose `attribute` equals `value`
pub fn child_with_attribute(parent: &Element, attribute: &str, value: &str) -> Option<Element> {
    let children = parent.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .find(|child| child.get_attribute(attribute).as_deref() == Some(value))
}
