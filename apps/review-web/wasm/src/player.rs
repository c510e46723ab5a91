//! DOM playback backends
//!
//! `<video>` elements are driven directly. Embedded YouTube players live in an
//! `<iframe>` and are reached with `postMessage`.

use review_core::{BackendFactory, DirectElement, PlaybackError, PlayerChannel};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlIFrameElement, HtmlVideoElement};

use crate::dom::set_styles;

/// Origin the embedded player accepts commands from
pub const EMBED_ORIGIN: &str = "https://www.youtube.com";

const FILL_STYLES: &[(&str, &str)] = &[
    ("width", "100%"),
    ("height", "100%"),
    ("display", "block"),
    ("background", "#000"),
];

pub struct VideoElement {
    video: HtmlVideoElement,
}

impl VideoElement {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }
}

impl DirectElement for VideoElement {
    fn set_current_time(&mut self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let promise = self
            .video
            .play()
            .map_err(|e| PlaybackError::Rejected(crate::api_client::js_error(e)))?;

        // Autoplay policy may reject later; that leaves the element seeked and paused.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                debug!(error = ?err, "play() rejected");
            }
        });
        Ok(())
    }
}

pub struct EmbeddedPlayer {
    frame: HtmlIFrameElement,
}

impl EmbeddedPlayer {
    pub fn new(frame: HtmlIFrameElement) -> Self {
        Self { frame }
    }
}

impl PlayerChannel for EmbeddedPlayer {
    fn post_command(&mut self, message: &str) -> Result<(), PlaybackError> {
        let target = self.frame.content_window().ok_or(PlaybackError::NotReady)?;
        target
            .post_message(&JsValue::from_str(message), EMBED_ORIGIN)
            .map_err(|e| PlaybackError::Unreachable(crate::api_client::js_error(e)))
    }
}

type ErrorHandler = Closure<dyn FnMut(web_sys::Event)>;

/// A mounted `<video>` together with its error listener.
///
/// Dropping it detaches the listener and unloads the source, so an element
/// that was replaced cannot report errors into a closure that is gone.
pub struct MountedVideo {
    video: HtmlVideoElement,
    on_error: ErrorHandler,
}

impl MountedVideo {
    pub fn element(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl Drop for MountedVideo {
    fn drop(&mut self) {
        let _ = self
            .video
            .remove_event_listener_with_callback("error", self.on_error.as_ref().unchecked_ref());
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }
}

/// Mounts the player element for a new media reference into the media host.
///
/// A video mounted with an error listener is handed back through
/// [`DomBackendFactory::take_mounted`]; the owner keeps it until the next
/// result replaces it.
pub struct DomBackendFactory {
    document: Document,
    host: Element,
    on_error: Option<ErrorHandler>,
    mounted: Option<MountedVideo>,
}

impl DomBackendFactory {
    pub fn new(document: Document, host: Element) -> Self {
        Self {
            document,
            host,
            on_error: None,
            mounted: None,
        }
    }

    /// Callback invoked when the mounted video fails to load
    pub fn with_error_listener(mut self, listener: ErrorHandler) -> Self {
        self.on_error = Some(listener);
        self
    }

    pub fn take_mounted(&mut self) -> Option<MountedVideo> {
        self.mounted.take()
    }

    fn mount_video(&mut self, url: &str) -> Result<HtmlVideoElement, JsValue> {
        let video: HtmlVideoElement = self.document.create_element("video")?.dyn_into()?;
        video.set_controls(true);
        video.set_preload("metadata");
        video.set_attribute("playsinline", "")?;
        set_styles(&video, FILL_STYLES)?;
        if let Some(on_error) = self.on_error.take() {
            video.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
            self.mounted = Some(MountedVideo {
                video: video.clone(),
                on_error,
            });
        }
        video.set_src(url);

        self.host.set_inner_html("");
        self.host.append_child(&video)?;
        Ok(video)
    }

    fn mount_frame(&self, embed_url: &str) -> Result<HtmlIFrameElement, JsValue> {
        let frame: HtmlIFrameElement = self.document.create_element("iframe")?.dyn_into()?;
        frame.set_src(embed_url);
        frame.set_attribute(
            "allow",
            "accelerometer; autoplay; encrypted-media; gyroscope; picture-in-picture",
        )?;
        frame.set_attribute("allowfullscreen", "")?;
        frame.set_attribute("frameborder", "0")?;
        set_styles(&frame, FILL_STYLES)?;

        self.host.set_inner_html("");
        self.host.append_child(&frame)?;
        Ok(frame)
    }
}

impl BackendFactory for DomBackendFactory {
    fn direct(&mut self, url: &str) -> Option<Box<dyn DirectElement>> {
        match self.mount_video(url) {
            Ok(video) => Some(Box::new(VideoElement::new(video))),
            Err(err) => {
                warn!(url, error = ?err, "could not mount video element");
                None
            }
        }
    }

    fn embedded(&mut self, video_id: &str, embed_url: &str) -> Option<Box<dyn PlayerChannel>> {
        match self.mount_frame(embed_url) {
            Ok(frame) => Some(Box::new(EmbeddedPlayer::new(frame))),
            Err(err) => {
                warn!(video_id, error = ?err, "could not mount player frame");
                None
            }
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use review_core::player_command;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn host() -> (Document, Element) {
        let document = web_sys::window().unwrap().document().unwrap();
        let host = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&host).unwrap();
        (document, host)
    }

    #[wasm_bindgen_test]
    fn test_direct_mounts_video_and_seeks() {
        let (document, host) = host();
        let mut factory = DomBackendFactory::new(document, host.clone());
        let mut element = factory.direct("/clip.mp4").expect("video mounted");

        element.set_current_time(0.0);
        assert_eq!(host.child_element_count(), 1);
        assert_eq!(host.first_element_child().unwrap().tag_name(), "VIDEO");
    }

    #[wasm_bindgen_test]
    fn test_embedded_mounts_frame_and_accepts_commands() {
        let (document, host) = host();
        let mut factory = DomBackendFactory::new(document, host.clone());
        let mut channel = factory
            .embedded("dQw4w9WgXcQ", "https://www.youtube.com/embed/dQw4w9WgXcQ?enablejsapi=1")
            .expect("frame mounted");

        let frame = host.first_element_child().unwrap();
        assert_eq!(frame.tag_name(), "IFRAME");
        let message = player_command("playVideo", serde_json::json!([]));
        assert!(channel.post_command(&message).is_ok());
    }

    #[wasm_bindgen_test]
    fn test_released_video_stops_reporting_errors() {
        use std::cell::Cell;
        use std::rc::Rc;

        let (document, host) = host();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let on_error = Closure::wrap(Box::new(move |_event: web_sys::Event| flag.set(true))
            as Box<dyn FnMut(web_sys::Event)>);
        let mut factory = DomBackendFactory::new(document, host).with_error_listener(on_error);
        factory.direct("/missing.mp4");

        let mounted = factory.take_mounted().expect("listener kept with video");
        let video = mounted.element().clone();
        assert!(video.has_attribute("src"));
        drop(mounted);

        assert!(!video.has_attribute("src"));
        video
            .dispatch_event(&web_sys::Event::new("error").unwrap())
            .unwrap();
        assert!(!fired.get());
    }

    #[wasm_bindgen_test]
    fn test_remount_replaces_previous_element() {
        let (document, host) = host();
        let mut factory = DomBackendFactory::new(document, host.clone());
        factory.direct("/a.mp4");
        factory.direct("/b.mp4");
        assert_eq!(host.child_element_count(), 1);
    }
}
