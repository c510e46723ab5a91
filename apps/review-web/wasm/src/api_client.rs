//! Fetch client for the analysis backend
//!
//! Every call returns `Result<_, String>`; the message is what the console
//! shows in its error banner.

use review_core::ConsoleConfig;
use review_types::{
    AnalysisSpeed, AnalyzeRequest, AnalyzeResponse, HealthResponse, LocationRequest,
    LocationResponse, StorageItem, StorageListResponse,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, RequestMode, Response};

/// Error body returned by the backend (`{"detail": "..."}`)
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Banner text for a non-2xx response
pub fn error_message(action: &str, status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) if !err.detail.trim().is_empty() => {
            format!("{} failed ({}): {}", action, status, err.detail.trim())
        }
        _ => format!("{} failed ({})", action, status),
    }
}

/// Object path inside the bucket for a `gs://bucket/path` uri
pub fn storage_object_path(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("gs://")?;
    let (_bucket, path) = rest.split_once('/')?;
    (!path.is_empty()).then_some(path)
}

pub(crate) fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

enum Body {
    Empty,
    Json(String),
    Form(FormData),
}

async fn send(action: &str, method: &str, url: &str, body: Body) -> Result<String, String> {
    let window = web_sys::window().ok_or("No window object available")?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    let is_json = matches!(body, Body::Json(_));
    match &body {
        Body::Empty => {}
        Body::Json(text) => opts.set_body(&JsValue::from_str(text)),
        Body::Form(form) => opts.set_body(form),
    }

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    if is_json {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }

    debug!(method, url, "request sent");
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{} failed: {}", action, js_error(e)))?;
    let response: Response = response.dyn_into().map_err(js_error)?;

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();

    if !response.ok() {
        warn!(method, url, status = response.status(), "request failed");
        return Err(error_message(action, response.status(), &text));
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(action: &str, text: &str) -> Result<T, String> {
    serde_json::from_str(text).map_err(|e| format!("{}: unexpected response: {}", action, e))
}

fn upload_form(file: &File, speed: AnalysisSpeed, frame_rate: Option<f64>) -> Result<FormData, String> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(js_error)?;
    form.append_with_str("speed", speed.as_str()).map_err(js_error)?;
    if let Some(rate) = frame_rate {
        form.append_with_str("frame_rate", &rate.to_string())
            .map_err(js_error)?;
    }
    Ok(form)
}

/// POST /analyze
pub async fn analyze(config: &ConsoleConfig, request: &AnalyzeRequest) -> Result<AnalyzeResponse, String> {
    let body = serde_json::to_string(request).map_err(|e| e.to_string())?;
    let text = send("Analysis", "POST", &config.analyze_url(), Body::Json(body)).await?;
    decode("Analysis", &text)
}

/// POST /analyze/upload (multipart)
pub async fn analyze_upload(
    config: &ConsoleConfig,
    file: &File,
    speed: AnalysisSpeed,
    frame_rate: f64,
) -> Result<AnalyzeResponse, String> {
    let form = upload_form(file, speed, Some(frame_rate))?;
    let text = send("Upload analysis", "POST", &config.analyze_upload_url(), Body::Form(form)).await?;
    decode("Upload analysis", &text)
}

/// POST /analyze/initial: issues without locations
pub async fn analyze_initial(
    config: &ConsoleConfig,
    file: &File,
    speed: AnalysisSpeed,
) -> Result<AnalyzeResponse, String> {
    let form = upload_form(file, speed, None)?;
    let text = send("Initial analysis", "POST", &config.analyze_initial_url(), Body::Form(form)).await?;
    decode("Initial analysis", &text)
}

/// POST /analyze/location
pub async fn locate_issue(
    config: &ConsoleConfig,
    request: &LocationRequest,
) -> Result<LocationResponse, String> {
    let body = serde_json::to_string(request).map_err(|e| e.to_string())?;
    let text = send("Location lookup", "POST", &config.location_url(), Body::Json(body)).await?;
    decode("Location lookup", &text)
}

/// GET /storage/list
pub async fn list_storage(config: &ConsoleConfig) -> Result<StorageListResponse, String> {
    let text = send("Storage listing", "GET", &config.storage_list_url(), Body::Empty).await?;
    decode("Storage listing", &text)
}

/// POST /storage/upload (multipart)
pub async fn upload_to_storage(config: &ConsoleConfig, file: &File) -> Result<StorageItem, String> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(js_error)?;
    let text = send("Storage upload", "POST", &config.storage_upload_url(), Body::Form(form)).await?;
    decode("Storage upload", &text)
}

/// DELETE /storage/file/{path}
pub async fn delete_storage_item(config: &ConsoleConfig, item: &StorageItem) -> Result<(), String> {
    let path = storage_object_path(&item.uri)
        .ok_or_else(|| format!("Cannot delete {}: not a storage object", item.name))?;
    send("Storage delete", "DELETE", &config.storage_file_url(path), Body::Empty).await?;
    Ok(())
}

/// GET /health
pub async fn check_health(config: &ConsoleConfig) -> Result<HealthResponse, String> {
    let text = send("Health check", "GET", &config.health_url(), Body::Empty).await?;
    decode("Health check", &text)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_message_always_names_action_and_status(status in 400u16..600, body in ".*") {
            let message = error_message("Analysis", status, &body);
            let prefix = format!("Analysis failed ({})", status);
            prop_assert!(message.starts_with(&prefix));
        }
    }
}
