//! `ReviewConsole`: the JS-facing review console
//!
//! Owns a [`ReviewSession`] plus the DOM it draws into. DOM events and fetch
//! completions borrow the shared state, update the session, and redraw.
//! Selection and hover only toggle classes and redraw markers; the list is
//! rebuilt when the result or the filter changes, so an in-flight smooth
//! scroll is never interrupted by a rebuild.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};

use js_sys::Promise;
use review_core::{
    validate_upload, ConsoleConfig, PlaybackState, RequestTicket, ReviewError, ReviewSession,
    SeverityBucket,
};
use review_types::{
    AnalysisSpeed, AnalyzeRequest, AnalyzeResponse, IssueId, LocationRequest, MediaKind,
    MediaReference, StorageItem,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, Element, Event, EventTarget, File, HtmlElement, HtmlImageElement, MouseEvent, Url};

use crate::api_client;
use crate::dom::{closest_with_attribute, document, element_by_id, relative_box, set_styles, viewport_width, window};
use crate::issue_list::{render_filter_bar, render_list, DomListViewport, ListView, ISSUE_ATTR, SEVERITY_ATTR};
use crate::logging::init_logging;
use crate::markers::render_markers;
use crate::player::{DomBackendFactory, MountedVideo};

type Shared = Rc<RefCell<ConsoleState>>;
type Handler = Closure<dyn FnMut(Event)>;

const IMAGE_STYLES: &[(&str, &str)] = &[
    ("display", "block"),
    ("max-width", "100%"),
    ("max-height", "100%"),
    ("margin", "0 auto"),
];

const LAYER_STYLES: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("inset", "0"),
    ("pointer-events", "none"),
];

/// DOM ids the console renders into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementIds {
    pub list: String,
    pub filter_bar: String,
    pub media_host: String,
    pub marker_layer: String,
    pub summary: String,
    pub status: String,
    pub list_pane: String,
    /// Optional; resizing is disabled when absent from the page
    pub divider: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            list: "issue-list".to_string(),
            filter_bar: "severity-filter".to_string(),
            media_host: "media-host".to_string(),
            marker_layer: "marker-layer".to_string(),
            summary: "analysis-summary".to_string(),
            status: "analysis-status".to_string(),
            list_pane: "issue-pane".to_string(),
            divider: "pane-divider".to_string(),
        }
    }
}

/// Build a URL analysis request from loose JS arguments
pub fn build_request(
    kind: MediaKind,
    url: &str,
    speed: Option<&str>,
    frame_rate: Option<f64>,
    config: &ConsoleConfig,
) -> Result<AnalyzeRequest, String> {
    let request = match kind {
        MediaKind::Video => AnalyzeRequest::for_video(url.trim()),
        MediaKind::Image => AnalyzeRequest::for_image(url.trim()),
        MediaKind::None => return Err("Only video and image URLs can be analyzed".to_string()),
    };
    let speed = speed.map(AnalysisSpeed::parse).unwrap_or(config.analysis.speed);
    let mut request = request.with_speed(speed);
    // Frame sampling only means something for video.
    match (kind, frame_rate) {
        (MediaKind::Video, rate) => request = request.with_frame_rate(rate.unwrap_or(config.analysis.frame_rate)),
        (_, Some(rate)) => request = request.with_frame_rate(rate),
        _ => {}
    }
    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}

/// URL the backend itself can fetch, if any. Object URLs are browser-local.
pub fn backend_image_url(url: &str) -> Option<String> {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://", "gs://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
        .then(|| url.to_string())
}

struct Elements {
    list: Element,
    filter_bar: Element,
    media_host: Element,
    marker_layer: HtmlElement,
    summary: Element,
    status: Element,
    list_pane: HtmlElement,
    divider: Option<Element>,
}

impl Elements {
    fn lookup(document: &Document, ids: &ElementIds) -> Result<Self, JsValue> {
        Ok(Self {
            list: element_by_id(document, &ids.list)?,
            filter_bar: element_by_id(document, &ids.filter_bar)?,
            media_host: element_by_id(document, &ids.media_host)?,
            marker_layer: element_by_id(document, &ids.marker_layer)?.dyn_into()?,
            summary: element_by_id(document, &ids.summary)?,
            status: element_by_id(document, &ids.status)?,
            list_pane: element_by_id(document, &ids.list_pane)?.dyn_into()?,
            divider: document.get_element_by_id(&ids.divider),
        })
    }
}

/// Event listener that detaches itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    handler: Handler,
}

impl Listener {
    fn attach(target: &EventTarget, event: &'static str, handler: Handler) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            handler,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.handler.as_ref().unchecked_ref());
    }
}

fn handler(f: impl FnMut(Event) + 'static) -> Handler {
    Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>)
}

/// Run `f` against the console state if it is still alive and not already
/// borrowed by the caller that dispatched this event.
fn with_state(
    weak: &Weak<RefCell<ConsoleState>>,
    f: impl FnOnce(&mut ConsoleState) -> Result<(), JsValue>,
) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut state) = shared.try_borrow_mut() else {
        debug!("console busy, event dropped");
        return;
    };
    if let Err(err) = f(&mut state) {
        warn!(error = ?err, "console update failed");
    }
}

fn revoke(url: &str) {
    if let Err(err) = Url::revoke_object_url(url) {
        debug!(error = ?err, "could not revoke object url");
    }
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct ConsoleState {
    session: ReviewSession,
    document: Document,
    elements: Elements,
    image: Option<HtmlImageElement>,
    _image_listener: Option<Listener>,
    /// Bumped per applied result; stale media error events compare against it
    media_generation: u64,
    /// Released when replaced, detaching its error listener
    _mounted_video: Option<MountedVideo>,
    pending_uploads: HashMap<u64, String>,
    displayed_upload: Option<String>,
}

impl ConsoleState {
    fn render_all(&self) -> Result<(), JsValue> {
        let counts = self.session.counts();
        render_filter_bar(
            &self.document,
            &self.elements.filter_bar,
            &counts,
            self.session.active_filter(),
        )?;

        let filtered = self.session.filtered_issues();
        render_list(
            &self.document,
            &self.elements.list,
            &ListView {
                issues: &filtered,
                selected: self.session.selected_id(),
                hovered: self.session.selection().overlay().hovered(),
                total: counts.all,
            },
        )?;

        self.render_markers()?;
        self.render_status();
        Ok(())
    }

    /// Sync list classes and markers with the selected and hovered ids
    fn refresh_highlights(&self) -> Result<(), JsValue> {
        let selected = self.session.selected_id().map(IssueId::as_str);
        let hovered = self.session.selection().overlay().hovered().map(IssueId::as_str);

        let entries = self.elements.list.children();
        for entry in (0..entries.length()).filter_map(|i| entries.item(i)) {
            let id = entry.get_attribute(ISSUE_ATTR);
            let classes = entry.class_list();
            classes.toggle_with_force("is-selected", id.is_some() && id.as_deref() == selected)?;
            classes.toggle_with_force("is-hovered", id.is_some() && id.as_deref() == hovered)?;
        }
        self.render_markers()
    }

    fn render_markers(&self) -> Result<(), JsValue> {
        let layer = &self.elements.marker_layer;
        let image = match &self.image {
            Some(image) if image.complete() && image.natural_width() > 0 => image,
            _ => {
                layer.set_inner_html("");
                return Ok(());
            }
        };
        let bounds = relative_box(image, layer);
        render_markers(&self.document, layer, &self.session.markers(bounds))
    }

    fn render_status(&self) {
        let status = &self.elements.status;
        if self.session.is_loading() {
            status.set_class_name("analysis-status is-loading");
            status.set_text_content(Some("Analyzing..."));
        } else if let Some(message) = self.session.error() {
            status.set_class_name("analysis-status is-error");
            status.set_text_content(Some(message));
        } else {
            status.set_class_name("analysis-status");
            status.set_text_content(None);
        }

        let summary = self.session.result().summary();
        self.elements
            .summary
            .set_text_content((!summary.is_empty()).then_some(summary));
    }

    fn select(&mut self, id: &str) -> Result<bool, JsValue> {
        let selected = self.session.select_issue(&IssueId::new(id));
        if selected {
            self.refresh_highlights()?;
        }
        Ok(selected)
    }

    fn complete(
        &mut self,
        weak: Weak<RefCell<ConsoleState>>,
        ticket: RequestTicket,
        response: AnalyzeResponse,
    ) -> Result<bool, JsValue> {
        let generation = self.media_generation + 1;
        let on_error = {
            let weak = weak.clone();
            handler(move |_event| {
                with_state(&weak, |state| {
                    if state.media_generation == generation {
                        warn!("media element failed to load");
                        state.session.media_failed();
                    }
                    Ok(())
                })
            })
        };
        let mut factory =
            DomBackendFactory::new(self.document.clone(), self.elements.media_host.clone())
                .with_error_listener(on_error);

        if !self.session.complete_analysis(ticket, response, &mut factory) {
            return Ok(false);
        }
        self.media_generation = generation;
        self._mounted_video = factory.take_mounted();
        self.activate_media(weak)?;
        Ok(true)
    }

    /// Mount non-video media for the current result. Video is mounted by
    /// the backend factory while the result is applied.
    fn activate_media(&mut self, weak: Weak<RefCell<ConsoleState>>) -> Result<(), JsValue> {
        self.image = None;
        self._image_listener = None;
        let host = &self.elements.media_host;
        let media = self.session.media().clone();

        match media.kind() {
            MediaKind::Image => {
                let image: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
                image.set_alt("Analyzed image");
                set_styles(&image, IMAGE_STYLES)?;
                let on_load = handler(move |_event| with_state(&weak, |state| state.render_markers()));
                let listener = Listener::attach(&image, "load", on_load)?;
                image.set_src(media.url());

                host.set_inner_html("");
                host.append_child(&image)?;
                self.image = Some(image);
                self._image_listener = Some(listener);
            }
            MediaKind::Video => {
                if self.session.selection().playback().state() == PlaybackState::Unavailable {
                    host.set_inner_html("");
                }
            }
            MediaKind::None => host.set_inner_html(""),
        }
        Ok(())
    }

    fn keep_upload(&mut self, ticket: RequestTicket, applied: bool) {
        let upload = self.pending_uploads.remove(&ticket.id());
        if !applied {
            if let Some(url) = upload {
                revoke(&url);
            }
            return;
        }
        let previous = std::mem::replace(&mut self.displayed_upload, upload);
        if let Some(url) = previous {
            revoke(&url);
        }
    }
}

fn finish_analysis(
    shared: &Shared,
    ticket: RequestTicket,
    outcome: Result<AnalyzeResponse, String>,
) -> Result<bool, JsValue> {
    let weak = Rc::downgrade(shared);
    let mut state = shared.borrow_mut();
    let applied = match outcome {
        Ok(response) => state.complete(weak, ticket, response)?,
        Err(message) => {
            state
                .session
                .fail_analysis(ticket, ReviewError::AnalysisFailed(message));
            false
        }
    };
    state.keep_upload(ticket, applied);
    state.render_all()?;
    Ok(applied)
}

/// Fetch and attach locations one issue at a time, stopping if the result
/// is replaced meanwhile.
async fn locate_all(shared: Shared, image_url: Option<String>) -> Result<(), JsValue> {
    let (ticket, config, requests) = {
        let state = shared.borrow();
        let Some(ticket) = state.session.result_ticket() else {
            return Ok(());
        };
        let requests: Vec<LocationRequest> = state
            .session
            .result()
            .issues()
            .iter()
            .filter(|issue| !issue.has_location())
            .map(|issue| LocationRequest::for_issue(issue, image_url.clone()))
            .collect();
        (ticket, state.session.config().clone(), requests)
    };

    for request in requests {
        if shared.borrow().session.result_ticket() != Some(ticket) {
            debug!("result replaced, location lookup stopped");
            break;
        }
        match api_client::locate_issue(&config, &request).await {
            Ok(response) => {
                let mut state = shared.borrow_mut();
                if state.session.apply_location(ticket, &response) {
                    state.render_all()?;
                }
            }
            Err(message) => warn!(issue = %request.issue_id, error = %message, "location lookup failed"),
        }
    }
    Ok(())
}

/// Issue synchronization console bound to page elements
#[wasm_bindgen]
pub struct ReviewConsole {
    state: Shared,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ReviewConsole {
    /// `config_json` may be empty for defaults. `element_ids` may be
    /// `undefined` or a partial `ElementIds` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, element_ids: JsValue) -> Result<ReviewConsole, JsValue> {
        let config = if config_json.trim().is_empty() {
            ConsoleConfig::default()
        } else {
            ConsoleConfig::from_json(config_json).map_err(to_js)?
        };
        init_logging(config.log_level);

        let ids: ElementIds = if element_ids.is_undefined() || element_ids.is_null() {
            ElementIds::default()
        } else {
            serde_wasm_bindgen::from_value(element_ids)?
        };

        let document = document()?;
        let elements = Elements::lookup(&document, &ids)?;
        set_styles(&elements.marker_layer, LAYER_STYLES)?;

        let session = ReviewSession::new(config, Box::new(DomListViewport::new(elements.list.clone())));
        let width = format!("{}px", session.layout().width());
        set_styles(&elements.list_pane, &[("width", width.as_str())])?;

        let state = Rc::new(RefCell::new(ConsoleState {
            session,
            document,
            elements,
            image: None,
            _image_listener: None,
            media_generation: 0,
            _mounted_video: None,
            pending_uploads: HashMap::new(),
            displayed_upload: None,
        }));

        let listeners = attach_listeners(&state)?;
        state.borrow().render_all()?;
        info!("review console ready");

        Ok(ReviewConsole {
            state,
            _listeners: listeners,
        })
    }

    // ------------------------------------------------------------------
    // Selection and filter
    // ------------------------------------------------------------------

    /// Returns false for ids not in the current result
    #[wasm_bindgen(js_name = selectIssue)]
    pub fn select_issue(&self, id: &str) -> Result<bool, JsValue> {
        self.state.borrow_mut().select(id)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        state.session.clear_selection();
        state.refresh_highlights()
    }

    #[wasm_bindgen(js_name = selectedIssueId)]
    pub fn selected_issue_id(&self) -> Option<String> {
        self.state.borrow().session.selected_id().map(|id| id.to_string())
    }

    /// `all`, `critical`, `high`, `medium` or `low`
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&self, bucket: &str) -> Result<(), JsValue> {
        self.set_filter_internal(bucket).map_err(|e| JsValue::from_str(&e))
    }

    fn set_filter_internal(&self, bucket: &str) -> Result<(), String> {
        let bucket = SeverityBucket::parse(bucket).ok_or_else(|| format!("Unknown severity filter: {}", bucket))?;
        let mut state = self.state.borrow_mut();
        state.session.set_filter(bucket);
        state.render_all().map_err(api_client::js_error)
    }

    #[wasm_bindgen(js_name = activeFilter)]
    pub fn active_filter(&self) -> String {
        self.state.borrow().session.active_filter().as_str().to_string()
    }

    #[wasm_bindgen(js_name = getCounts)]
    pub fn get_counts(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.state.borrow().session.counts())?)
    }

    #[wasm_bindgen(js_name = getFilteredIssues)]
    pub fn get_filtered_issues(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        Ok(serde_wasm_bindgen::to_value(&state.session.filtered_issues())?)
    }

    #[wasm_bindgen(js_name = getResult)]
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.state.borrow().session.result())?)
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().session.is_loading()
    }

    #[wasm_bindgen(js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().session.error().map(str::to_string)
    }

    #[wasm_bindgen(js_name = dismissError)]
    pub fn dismiss_error(&self) {
        let mut state = self.state.borrow_mut();
        state.session.clear_error();
        state.render_status();
    }

    #[wasm_bindgen(js_name = paneWidth)]
    pub fn pane_width(&self) -> f64 {
        self.state.borrow().session.layout().width()
    }

    /// Redraw everything, e.g. after the host page changed layout
    pub fn render(&self) -> Result<(), JsValue> {
        self.state.borrow().render_all()
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Submit an `AnalyzeRequest` object. Resolves to whether the response
    /// was applied; a newer request supersedes this one.
    pub fn analyze(&self, request: JsValue) -> Result<Promise, JsValue> {
        let request: AnalyzeRequest = serde_wasm_bindgen::from_value(request)?;
        self.submit(request)
    }

    #[wasm_bindgen(js_name = analyzeVideoUrl)]
    pub fn analyze_video_url(
        &self,
        url: &str,
        speed: Option<String>,
        frame_rate: Option<f64>,
    ) -> Result<Promise, JsValue> {
        let request = {
            let state = self.state.borrow();
            build_request(MediaKind::Video, url, speed.as_deref(), frame_rate, state.session.config())
        }
        .map_err(|e| JsValue::from_str(&e))?;
        self.submit(request)
    }

    #[wasm_bindgen(js_name = analyzeImageUrl)]
    pub fn analyze_image_url(&self, url: &str, speed: Option<String>) -> Result<Promise, JsValue> {
        let request = {
            let state = self.state.borrow();
            build_request(MediaKind::Image, url, speed.as_deref(), None, state.session.config())
        }
        .map_err(|e| JsValue::from_str(&e))?;
        self.submit(request)
    }

    /// Analyze a `StorageItem` from `listStorage()`, displayed via its proxy URL
    #[wasm_bindgen(js_name = analyzeStoredItem)]
    pub fn analyze_stored_item(&self, item: JsValue) -> Result<Promise, JsValue> {
        let item: StorageItem = serde_wasm_bindgen::from_value(item)?;
        let request = item
            .analyze_request()
            .ok_or_else(|| JsValue::from_str(&format!("{} is not an image or video", item.name)))?;
        let defaults = self.state.borrow().session.config().analysis;
        let request = request.with_speed(defaults.speed);
        let request = if item.media_kind() == MediaKind::Video {
            request.with_frame_rate(defaults.frame_rate)
        } else {
            request
        };
        self.submit(request)
    }

    /// Show an already available response without contacting the backend
    #[wasm_bindgen(js_name = showResult)]
    pub fn show_result(&self, request: JsValue, response: JsValue) -> Result<bool, JsValue> {
        let request: AnalyzeRequest = serde_wasm_bindgen::from_value(request)?;
        let response: AnalyzeResponse = serde_wasm_bindgen::from_value(response)?;
        let ticket = self.state.borrow_mut().session.begin_analysis(&request).map_err(to_js)?;
        finish_analysis(&self.state, ticket, Ok(response))
    }

    /// Analyze an uploaded image. With `locate_separately` the issues come
    /// back first and their locations are fetched one by one afterwards.
    #[wasm_bindgen(js_name = analyzeUpload)]
    pub fn analyze_upload(&self, file: File, locate_separately: bool) -> Result<Promise, JsValue> {
        let content_type = file.type_();
        validate_upload(&content_type).map_err(to_js)?;

        let object_url = Url::create_object_url_with_blob(&file)?;
        let (ticket, config) = {
            let mut state = self.state.borrow_mut();
            let ticket = match state
                .session
                .begin_upload(&content_type, MediaReference::image(object_url.clone()))
            {
                Ok(ticket) => ticket,
                Err(err) => {
                    revoke(&object_url);
                    return Err(to_js(err));
                }
            };
            state.pending_uploads.insert(ticket.id(), object_url);
            state.render_status();
            (ticket, state.session.config().clone())
        };

        let shared = self.state.clone();
        Ok(future_to_promise(async move {
            let speed = config.analysis.speed;
            let outcome = if locate_separately {
                api_client::analyze_initial(&config, &file, speed).await
            } else {
                api_client::analyze_upload(&config, &file, speed, config.analysis.frame_rate).await
            };
            let applied = finish_analysis(&shared, ticket, outcome)?;
            if applied && locate_separately {
                locate_all(shared, None).await?;
            }
            Ok(JsValue::from_bool(applied))
        }))
    }

    /// Look up the location of one issue of the current image result
    #[wasm_bindgen(js_name = locateIssue)]
    pub fn locate_issue(&self, id: &str) -> Result<Promise, JsValue> {
        let (ticket, config, request) = {
            let state = self.state.borrow();
            let ticket = state
                .session
                .result_ticket()
                .ok_or_else(|| JsValue::from_str("No analysis result loaded"))?;
            let issue = state
                .session
                .result()
                .issue(&IssueId::new(id))
                .ok_or_else(|| JsValue::from_str(&format!("Unknown issue: {}", id)))?;
            let image_url = backend_image_url(state.session.media().url());
            (
                ticket,
                state.session.config().clone(),
                LocationRequest::for_issue(issue, image_url),
            )
        };

        let shared = self.state.clone();
        Ok(future_to_promise(async move {
            let response = api_client::locate_issue(&config, &request)
                .await
                .map_err(|e| JsValue::from_str(&e))?;
            let mut state = shared.borrow_mut();
            let applied = state.session.apply_location(ticket, &response);
            if applied {
                state.render_all()?;
            }
            Ok(JsValue::from_bool(applied))
        }))
    }

    fn submit(&self, request: AnalyzeRequest) -> Result<Promise, JsValue> {
        let (ticket, config) = {
            let mut state = self.state.borrow_mut();
            let ticket = state.session.begin_analysis(&request).map_err(to_js)?;
            state.render_status();
            (ticket, state.session.config().clone())
        };
        Ok(self.spawn_analysis(ticket, async move {
            api_client::analyze(&config, &request).await
        }))
    }

    fn spawn_analysis<F>(&self, ticket: RequestTicket, request: F) -> Promise
    where
        F: Future<Output = Result<AnalyzeResponse, String>> + 'static,
    {
        let shared = self.state.clone();
        future_to_promise(async move {
            let outcome = request.await;
            finish_analysis(&shared, ticket, outcome).map(JsValue::from_bool)
        })
    }

    // ------------------------------------------------------------------
    // Storage and health
    // ------------------------------------------------------------------

    /// Resolves to the image and video items, newest first
    #[wasm_bindgen(js_name = listStorage)]
    pub fn list_storage(&self) -> Promise {
        let config = self.state.borrow().session.config().clone();
        future_to_promise(async move {
            let listing = api_client::list_storage(&config)
                .await
                .map_err(|e| JsValue::from_str(&e))?;
            Ok(serde_wasm_bindgen::to_value(&listing.media_items())?)
        })
    }

    #[wasm_bindgen(js_name = uploadToStorage)]
    pub fn upload_to_storage(&self, file: File) -> Promise {
        let config = self.state.borrow().session.config().clone();
        future_to_promise(async move {
            let item = api_client::upload_to_storage(&config, &file)
                .await
                .map_err(|e| JsValue::from_str(&e))?;
            info!(name = %item.name, "uploaded to storage");
            Ok(serde_wasm_bindgen::to_value(&item)?)
        })
    }

    #[wasm_bindgen(js_name = deleteStorageItem)]
    pub fn delete_storage_item(&self, item: JsValue) -> Result<Promise, JsValue> {
        let item: StorageItem = serde_wasm_bindgen::from_value(item)?;
        let config = self.state.borrow().session.config().clone();
        Ok(future_to_promise(async move {
            api_client::delete_storage_item(&config, &item)
                .await
                .map_err(|e| JsValue::from_str(&e))?;
            Ok(JsValue::TRUE)
        }))
    }

    /// Resolves to true when the backend reports itself healthy
    #[wasm_bindgen(js_name = checkHealth)]
    pub fn check_health(&self) -> Promise {
        let config = self.state.borrow().session.config().clone();
        future_to_promise(async move {
            let healthy = match api_client::check_health(&config).await {
                Ok(health) => {
                    debug!(version = %health.version, status = %health.status, "health checked");
                    health.is_healthy()
                }
                Err(message) => {
                    warn!(error = %message, "health check failed");
                    false
                }
            };
            Ok(JsValue::from_bool(healthy))
        })
    }
}

fn attach_listeners(shared: &Shared) -> Result<Vec<Listener>, JsValue> {
    let state = shared.borrow();
    let elements = &state.elements;
    let window = window()?;
    let mut listeners = Vec::new();

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &elements.list,
        "click",
        handler(move |event| {
            if let Some((_, id)) = closest_with_attribute(&event, ISSUE_ATTR) {
                with_state(&weak, |state| state.select(&id).map(|_| ()));
            }
        }),
    )?);

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &elements.list,
        "mouseover",
        handler(move |event| {
            let id = closest_with_attribute(&event, ISSUE_ATTR).map(|(_, id)| IssueId::new(id));
            with_state(&weak, |state| {
                if state.session.selection().overlay().hovered() == id.as_ref() {
                    return Ok(());
                }
                state.session.set_hovered(id);
                state.refresh_highlights()
            });
        }),
    )?);

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &elements.list,
        "mouseleave",
        handler(move |_event| {
            with_state(&weak, |state| {
                state.session.set_hovered(None);
                state.refresh_highlights()
            });
        }),
    )?);

    // Marker clicks stop here so page-level handlers on the media never see them.
    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &elements.marker_layer,
        "click",
        handler(move |event| {
            if let Some((_, id)) = closest_with_attribute(&event, ISSUE_ATTR) {
                event.stop_propagation();
                event.prevent_default();
                with_state(&weak, |state| state.select(&id).map(|_| ()));
            }
        }),
    )?);

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &elements.filter_bar,
        "click",
        handler(move |event| {
            let Some((_, label)) = closest_with_attribute(&event, SEVERITY_ATTR) else {
                return;
            };
            let Some(bucket) = SeverityBucket::parse(&label) else {
                return;
            };
            with_state(&weak, |state| {
                state.session.set_filter(bucket);
                state.render_all()
            });
        }),
    )?);

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::attach(
        &window,
        "resize",
        handler(move |_event| with_state(&weak, |state| state.render_markers())),
    )?);

    if let Some(divider) = &elements.divider {
        let weak = Rc::downgrade(shared);
        listeners.push(Listener::attach(
            divider,
            "mousedown",
            handler(move |event| {
                event.prevent_default();
                with_state(&weak, |state| {
                    state.session.layout_mut().begin_resize();
                    Ok(())
                });
            }),
        )?);

        let weak = Rc::downgrade(shared);
        listeners.push(Listener::attach(
            &window,
            "mousemove",
            handler(move |event| {
                let Some(pointer) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let pointer_x = pointer.client_x() as f64;
                with_state(&weak, |state| {
                    if !state.session.layout().is_dragging() {
                        return Ok(());
                    }
                    let viewport = viewport_width()?;
                    if let Some(width) = state.session.layout_mut().update_pointer(pointer_x, viewport) {
                        let width = format!("{}px", width);
                        set_styles(&state.elements.list_pane, &[("width", width.as_str())])?;
                        state.render_markers()?;
                    }
                    Ok(())
                });
            }),
        )?);

        let weak = Rc::downgrade(shared);
        listeners.push(Listener::attach(
            &window,
            "mouseup",
            handler(move |_event| {
                with_state(&weak, |state| {
                    state.session.layout_mut().end_resize();
                    Ok(())
                });
            }),
        )?);
    }

    Ok(listeners)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::dom::child_with_attribute;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount_page(prefix: &str) -> JsValue {
        let document = document().unwrap();
        let body = document.body().unwrap();
        let ids = ElementIds {
            list: format!("{}-list", prefix),
            filter_bar: format!("{}-filter", prefix),
            media_host: format!("{}-media", prefix),
            marker_layer: format!("{}-markers", prefix),
            summary: format!("{}-summary", prefix),
            status: format!("{}-status", prefix),
            list_pane: format!("{}-pane", prefix),
            divider: format!("{}-divider", prefix),
        };
        for (tag, id) in [
            ("ul", &ids.list),
            ("div", &ids.filter_bar),
            ("div", &ids.media_host),
            ("div", &ids.marker_layer),
            ("p", &ids.summary),
            ("p", &ids.status),
            ("aside", &ids.list_pane),
        ] {
            let element = document.create_element(tag).unwrap();
            element.set_id(id);
            body.append_child(&element).unwrap();
        }
        serde_wasm_bindgen::to_value(&ids).unwrap()
    }

    fn video_response() -> JsValue {
        let response = serde_json::json!({
            "summary": "",
            "issues": [
                {"issue_id": "a", "start_timestamp": "01:30", "severity": "high", "category": "medical_accuracy", "description": "Outdated dosage"},
                {"issue_id": "b", "start_timestamp": "N/A", "severity": "low", "category": "wording_concern", "description": "Ambiguous wording"}
            ]
        });
        serde_wasm_bindgen::to_value(&response).unwrap()
    }

    fn video_request() -> JsValue {
        serde_wasm_bindgen::to_value(&AnalyzeRequest::for_video("/clip.mp4")).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_show_result_renders_list_and_summary() {
        let ids = mount_page("render");
        let console = ReviewConsole::new("", ids).unwrap();
        assert!(console.show_result(video_request(), video_response()).unwrap());

        let document = document().unwrap();
        let list = document.get_element_by_id("render-list").unwrap();
        assert_eq!(list.child_element_count(), 2);
        let summary = document.get_element_by_id("render-summary").unwrap();
        assert_eq!(
            summary.text_content().as_deref(),
            Some("Analysis identified 2 potential issues (1 high, 1 low) requiring review.")
        );
    }

    #[wasm_bindgen_test]
    fn test_select_marks_entry_and_unknown_is_ignored() {
        let ids = mount_page("select");
        let console = ReviewConsole::new("", ids).unwrap();
        console.show_result(video_request(), video_response()).unwrap();

        assert!(console.select_issue("a").unwrap());
        assert!(!console.select_issue("missing").unwrap());
        assert_eq!(console.selected_issue_id().as_deref(), Some("a"));

        let list = document().unwrap().get_element_by_id("select-list").unwrap();
        let entry = child_with_attribute(&list, ISSUE_ATTR, "a").unwrap();
        assert!(entry.class_list().contains("is-selected"));

        console.clear_selection().unwrap();
        assert_eq!(console.selected_issue_id(), None);
        assert!(!entry.class_list().contains("is-selected"));
    }

    #[wasm_bindgen_test]
    fn test_filter_keeps_selection() {
        let ids = mount_page("filter");
        let console = ReviewConsole::new("", ids).unwrap();
        console.show_result(video_request(), video_response()).unwrap();
        console.select_issue("a").unwrap();

        console.set_filter("low").unwrap();
        assert_eq!(console.active_filter(), "low");
        assert_eq!(console.selected_issue_id().as_deref(), Some("a"));
        assert!(console.set_filter("severe").is_err());
    }

    #[wasm_bindgen_test]
    fn test_new_result_clears_selection() {
        let ids = mount_page("replace");
        let console = ReviewConsole::new("", ids).unwrap();
        console.show_result(video_request(), video_response()).unwrap();
        console.select_issue("a").unwrap();

        console.show_result(video_request(), video_response()).unwrap();
        assert_eq!(console.selected_issue_id(), None);
    }
}
