//! WASM bindings for the issue review console
//!
//! Findings from the analysis backend are shown in a filterable list beside
//! the analyzed media. Selecting a finding seeks the video (direct `<video>`
//! or embedded YouTube player) to its start time, or highlights its marker on
//! an image. All state is held in Rust; JavaScript creates the console and
//! forwards user intent.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { ReviewConsole } from './pkg/review_wasm.js';
//!
//! await init();
//!
//! const console = new ReviewConsole('{"api_base_url": "/api/v1"}', undefined);
//! await console.analyzeVideoUrl("https://www.youtube.com/watch?v=abc123", "fast", 1.0);
//! console.setFilter("high");
//! console.selectIssue("issue-0");
//!
//! const items = await console.listStorage();
//! await console.analyzeStoredItem(items[0]);
//! ```

pub mod api_client;
pub mod console;
pub mod dom;
pub mod issue_list;
pub mod logging;
pub mod markers;
pub mod player;

use review_types::VideoSource;
use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use console::{ElementIds, ReviewConsole};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Seconds for an "MM:SS" / "HH:MM:SS" timestamp, `undefined` if unparseable
#[wasm_bindgen(js_name = parseTimestamp)]
pub fn parse_timestamp(text: &str) -> Option<f64> {
    review_core::parse_timestamp(text).map(|seconds| seconds as f64)
}

/// Embed URL when `url` is a YouTube link, otherwise `undefined`
#[wasm_bindgen(js_name = embedUrl)]
pub fn embed_url(url: &str) -> Option<String> {
    VideoSource::classify(url).embed_url()
}
