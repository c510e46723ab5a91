//! Selection coordinator
//!
//! Single owner of "which issue is selected". Selecting an issue seeks the
//! media to its start time, highlights its marker and scrolls its list entry
//! into view. The selected id always belongs to the current result or is
//! `None`.

use review_types::{AnalysisResult, Issue, IssueId, MediaReference};
use tracing::{debug, info};

use crate::overlay::MarkerOverlayEngine;
use crate::playback::{BackendFactory, MediaPlaybackController};
use crate::timestamp::anchor_offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub block: ScrollBlock,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    pub const NEAREST_SMOOTH: ScrollRequest = ScrollRequest {
        block: ScrollBlock::Nearest,
        behavior: ScrollBehavior::Smooth,
    };
}

/// The scrollable issue list
pub trait ListViewport {
    fn scroll_into_view(&mut self, id: &IssueId, request: ScrollRequest);
}

/// Viewport that ignores scroll requests, for headless use
#[derive(Debug, Default)]
pub struct NoopViewport;

impl ListViewport for NoopViewport {
    fn scroll_into_view(&mut self, _id: &IssueId, _request: ScrollRequest) {}
}

pub struct SelectionCoordinator {
    result: AnalysisResult,
    media: MediaReference,
    selected: Option<IssueId>,
    playback: MediaPlaybackController,
    overlay: MarkerOverlayEngine,
    list: Box<dyn ListViewport>,
}

impl SelectionCoordinator {
    pub fn new(overlay: MarkerOverlayEngine, list: Box<dyn ListViewport>) -> Self {
        Self {
            result: AnalysisResult::default(),
            media: MediaReference::none(),
            selected: None,
            playback: MediaPlaybackController::new(),
            overlay,
            list,
        }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn media(&self) -> &MediaReference {
        &self.media
    }

    pub fn selected_id(&self) -> Option<&IssueId> {
        self.selected.as_ref()
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.selected.as_ref().and_then(|id| self.result.issue(id))
    }

    pub fn playback(&self) -> &MediaPlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut MediaPlaybackController {
        &mut self.playback
    }

    pub fn overlay(&self) -> &MarkerOverlayEngine {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut MarkerOverlayEngine {
        &mut self.overlay
    }

    /// Select an issue of the current result.
    ///
    /// Unknown ids are ignored and return `false`. Selecting the current id
    /// again repeats every side effect, including the seek.
    pub fn select_issue(&mut self, id: &IssueId) -> bool {
        let Some(issue) = self.result.issue(id) else {
            debug!(id = id.as_str(), "selection ignored, id not in current result");
            return false;
        };

        let offset = if self.media.is_time_based() {
            anchor_offset(issue.start_time.as_deref())
        } else {
            None
        };

        self.selected = Some(id.clone());
        info!(id = id.as_str(), offset = ?offset, "issue selected");

        if let Some(offset) = offset {
            self.playback.seek_and_play(offset);
        }
        self.overlay.set_selected(Some(id.clone()));
        self.list.scroll_into_view(id, ScrollRequest::NEAREST_SMOOTH);
        true
    }

    /// Drop the selection. Never seeks, pauses or scrolls.
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            debug!("selection cleared");
        }
        self.overlay.set_selected(None);
    }

    /// Swap in a new result and its media.
    ///
    /// The selection is cleared before the new media is loaded.
    pub fn replace_result(
        &mut self,
        result: AnalysisResult,
        media: MediaReference,
        factory: &mut dyn BackendFactory,
    ) {
        self.clear_selection();
        self.overlay.set_hovered(None);
        info!(issues = result.len(), kind = ?media.kind(), "analysis result replaced");

        self.result = result;
        self.media = media;
        self.playback.load(&self.media, factory);
    }

    /// Swap in a derived snapshot of the same analysis, keeping the media.
    ///
    /// The selection survives only if its id is still present.
    pub fn update_result(&mut self, result: AnalysisResult) {
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|id| result.contains(id));
        if !keep {
            self.clear_selection();
        }
        self.result = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::{MockFactory, PlaybackCall};
    use pretty_assertions::assert_eq;
    use review_types::{IssueCategory, Location, Severity};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingViewport {
        scrolled: Rc<RefCell<Vec<(IssueId, ScrollRequest)>>>,
    }

    impl ListViewport for RecordingViewport {
        fn scroll_into_view(&mut self, id: &IssueId, request: ScrollRequest) {
            self.scrolled.borrow_mut().push((id.clone(), request));
        }
    }

    fn issue(id: &str, start: Option<&str>, location: Option<Location>) -> Issue {
        Issue {
            id: IssueId::new(id),
            category: IssueCategory::MedicalAccuracy,
            severity: Severity::High,
            description: "Claim contradicts guidelines".to_string(),
            context: None,
            start_time: start.map(str::to_string),
            end_time: None,
            location,
        }
    }

    fn coordinator() -> (SelectionCoordinator, RecordingViewport) {
        let viewport = RecordingViewport::default();
        let coordinator =
            SelectionCoordinator::new(MarkerOverlayEngine::default(), Box::new(viewport.clone()));
        (coordinator, viewport)
    }

    fn video_result() -> AnalysisResult {
        AnalysisResult::new(
            "two findings",
            vec![
                issue("a", Some("01:30"), None),
                issue("b", Some("N/A"), None),
            ],
        )
    }

    #[test]
    fn test_select_seeks_highlights_and_scrolls() {
        let (mut coordinator, viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);

        assert!(coordinator.select_issue(&IssueId::new("a")));
        assert_eq!(coordinator.selected_id(), Some(&IssueId::new("a")));
        assert_eq!(coordinator.overlay().selected(), Some(&IssueId::new("a")));
        assert_eq!(
            *factory.calls.borrow(),
            vec![
                PlaybackCall::CreateDirect("/clip.mp4".to_string()),
                PlaybackCall::SetTime(90.0),
                PlaybackCall::Play,
            ]
        );
        assert_eq!(
            *viewport.scrolled.borrow(),
            vec![(IssueId::new("a"), ScrollRequest::NEAREST_SMOOTH)]
        );
    }

    #[test]
    fn test_unparseable_start_skips_seek_but_still_selects() {
        let (mut coordinator, viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);

        assert!(coordinator.select_issue(&IssueId::new("b")));
        assert_eq!(factory.calls.borrow().len(), 1);
        assert_eq!(viewport.scrolled.borrow().len(), 1);
    }

    #[test]
    fn test_unknown_id_leaves_selection_unchanged() {
        let (mut coordinator, viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);
        coordinator.select_issue(&IssueId::new("a"));

        assert!(!coordinator.select_issue(&IssueId::new("zzz")));
        assert_eq!(coordinator.selected_id(), Some(&IssueId::new("a")));
        assert_eq!(viewport.scrolled.borrow().len(), 1);
    }

    #[test]
    fn test_reselect_repeats_seek() {
        let (mut coordinator, _viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);

        coordinator.select_issue(&IssueId::new("a"));
        coordinator.select_issue(&IssueId::new("a"));
        let seeks = factory
            .calls
            .borrow()
            .iter()
            .filter(|c| **c == PlaybackCall::SetTime(90.0))
            .count();
        assert_eq!(seeks, 2);
        assert_eq!(coordinator.selected_id(), Some(&IssueId::new("a")));
    }

    #[test]
    fn test_clear_selection_has_no_playback_effect() {
        let (mut coordinator, viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);
        coordinator.select_issue(&IssueId::new("a"));
        let calls_before = factory.calls.borrow().len();

        coordinator.clear_selection();
        assert_eq!(coordinator.selected_id(), None);
        assert_eq!(coordinator.overlay().selected(), None);
        assert_eq!(factory.calls.borrow().len(), calls_before);
        assert_eq!(viewport.scrolled.borrow().len(), 1);
    }

    #[test]
    fn test_replace_result_clears_selection() {
        let (mut coordinator, _viewport) = coordinator();
        let mut factory = MockFactory::default();
        coordinator.replace_result(video_result(), MediaReference::video("/clip.mp4"), &mut factory);
        coordinator.select_issue(&IssueId::new("a"));

        // Same id exists in the new result; it must still not carry over.
        coordinator.replace_result(video_result(), MediaReference::video("/other.mp4"), &mut factory);
        assert_eq!(coordinator.selected_id(), None);
        assert_eq!(coordinator.overlay().selected(), None);
        assert_eq!(coordinator.media().url(), "/other.mp4");
    }

    #[test]
    fn test_image_selection_highlights_without_seeking() {
        let (mut coordinator, _viewport) = coordinator();
        let mut factory = MockFactory::default();
        let result = AnalysisResult::new(
            "",
            vec![issue("m", Some("00:10"), Some(Location::new(0.25, 0.75)))],
        );
        coordinator.replace_result(result, MediaReference::image("/a.png"), &mut factory);

        assert!(coordinator.select_issue(&IssueId::new("m")));
        assert!(factory.calls.borrow().is_empty());
        assert_eq!(coordinator.overlay().selected(), Some(&IssueId::new("m")));
    }

    #[test]
    fn test_update_result_keeps_selection_when_id_survives() {
        let (mut coordinator, _viewport) = coordinator();
        let mut factory = MockFactory::default();
        let result = AnalysisResult::new("", vec![issue("m", None, None)]);
        coordinator.replace_result(result.clone(), MediaReference::image("/a.png"), &mut factory);
        coordinator.select_issue(&IssueId::new("m"));

        let updated = result
            .with_location(&IssueId::new("m"), Location::new(0.5, 0.5))
            .unwrap();
        coordinator.update_result(updated);
        assert_eq!(coordinator.selected_id(), Some(&IssueId::new("m")));
        assert!(coordinator.selected_issue().unwrap().location.is_some());

        coordinator.update_result(AnalysisResult::default());
        assert_eq!(coordinator.selected_id(), None);
    }
}
