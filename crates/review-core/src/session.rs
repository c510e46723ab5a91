//! Review session: filter, selection, layout and the analysis request
//! lifecycle in one injectable state object.
//!
//! At most one request is current. A response is applied only if it carries
//! the ticket of the latest request, so an older response arriving late
//! cannot overwrite a newer one.

use review_types::{
    AnalysisResult, AnalyzeRequest, AnalyzeResponse, Issue, IssueId, LocationResponse,
    MediaReference, RequestError,
};
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::error::ReviewError;
use crate::filter::{SeverityBucket, SeverityCounts, SeverityFilter};
use crate::layout::ResizableLayout;
use crate::overlay::{Marker, MarkerOverlayEngine, RenderBox};
use crate::playback::BackendFactory;
use crate::selection::{ListViewport, SelectionCoordinator};
use crate::summary::with_fallback_summary;

/// Identifies one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct PendingRequest {
    ticket: RequestTicket,
    media: MediaReference,
}

pub struct ReviewSession {
    config: ConsoleConfig,
    filter: SeverityFilter,
    selection: SelectionCoordinator,
    layout: ResizableLayout,
    pending: Option<PendingRequest>,
    next_ticket: u64,
    /// Ticket of the request that produced the displayed result
    result_ticket: Option<RequestTicket>,
    error: Option<String>,
}

/// Reject uploads that are not images
pub fn validate_upload(content_type: &str) -> Result<(), RequestError> {
    if content_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(RequestError::UnsupportedUpload(content_type.to_string()))
    }
}

impl ReviewSession {
    pub fn new(config: ConsoleConfig, list: Box<dyn ListViewport>) -> Self {
        let overlay = MarkerOverlayEngine::new(&config.markers);
        let layout = ResizableLayout::new(&config.layout);
        Self {
            config,
            filter: SeverityFilter::new(),
            selection: SelectionCoordinator::new(overlay, list),
            layout,
            pending: None,
            next_ticket: 0,
            result_ticket: None,
            error: None,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn result(&self) -> &AnalysisResult {
        self.selection.result()
    }

    pub fn media(&self) -> &MediaReference {
        self.selection.media()
    }

    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionCoordinator {
        &mut self.selection
    }

    pub fn layout(&self) -> &ResizableLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ResizableLayout {
        &mut self.layout
    }

    /// Ticket of the request whose result is on screen. Follow-up lookups
    /// capture it so they cannot land on a later result.
    pub fn result_ticket(&self) -> Option<RequestTicket> {
        self.result_ticket
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Message of the last failed request, if not yet superseded
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Filter
    // ------------------------------------------------------------------

    pub fn active_filter(&self) -> SeverityBucket {
        self.filter.active()
    }

    /// Selection is untouched by filter changes
    pub fn set_filter(&mut self, bucket: SeverityBucket) {
        self.filter.set_active(bucket);
    }

    pub fn filtered_issues(&self) -> Vec<&Issue> {
        self.filter.filtered(self.result().issues())
    }

    pub fn counts(&self) -> SeverityCounts {
        SeverityFilter::counts(self.result().issues())
    }

    /// Markers for the filtered list inside the rendered media box
    pub fn markers(&self, bounds: RenderBox) -> Vec<Marker> {
        let filtered = self.filtered_issues();
        self.selection.overlay().markers(&filtered, bounds)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_id(&self) -> Option<&IssueId> {
        self.selection.selected_id()
    }

    pub fn select_issue(&mut self, id: &IssueId) -> bool {
        self.selection.select_issue(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Hover highlight from the list or the overlay
    pub fn set_hovered(&mut self, id: Option<IssueId>) {
        let id = id.filter(|id| self.result().contains(id));
        self.selection.overlay_mut().set_hovered(id);
    }

    /// The active media element reported a load error
    pub fn media_failed(&mut self) {
        self.selection.playback_mut().mark_unavailable();
    }

    // ------------------------------------------------------------------
    // Analysis lifecycle
    // ------------------------------------------------------------------

    fn issue_ticket(&mut self, media: MediaReference) -> RequestTicket {
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        if let Some(previous) = self.pending.replace(PendingRequest { ticket, media }) {
            debug!(
                superseded = previous.ticket.id(),
                ticket = ticket.id(),
                "analysis request superseded"
            );
        }
        self.error = None;
        ticket
    }

    /// Start a URL analysis. The request is validated before loading starts.
    pub fn begin_analysis(&mut self, request: &AnalyzeRequest) -> Result<RequestTicket, ReviewError> {
        request.validate()?;
        let ticket = self.issue_ticket(request.media_reference());
        info!(
            ticket = ticket.id(),
            speed = request.speed.as_str(),
            model = request.speed.model_name(),
            "analysis started"
        );
        Ok(ticket)
    }

    /// Start an analysis of an uploaded file shown through `media`
    pub fn begin_upload(
        &mut self,
        content_type: &str,
        media: MediaReference,
    ) -> Result<RequestTicket, ReviewError> {
        validate_upload(content_type)?;
        let ticket = self.issue_ticket(media);
        info!(ticket = ticket.id(), content_type, "upload analysis started");
        Ok(ticket)
    }

    fn take_current(&mut self, ticket: RequestTicket) -> Option<PendingRequest> {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !current {
            warn!(ticket = ticket.id(), "ignoring response for a superseded request");
            return None;
        }
        self.pending.take()
    }

    /// Apply a successful response: selection is cleared, the result replaced
    /// and then the new media activated.
    pub fn complete_analysis(
        &mut self,
        ticket: RequestTicket,
        response: AnalyzeResponse,
        factory: &mut dyn BackendFactory,
    ) -> bool {
        let Some(pending) = self.take_current(ticket) else {
            return false;
        };

        if let Some(total) = response.total_issues {
            if total as usize != response.issues.len() {
                warn!(
                    total,
                    received = response.issues.len(),
                    "total_issues does not match issue list"
                );
            }
        }

        let result = with_fallback_summary(AnalysisResult::from_payloads(
            response.summary,
            response.issues,
        ));
        self.selection.replace_result(result, pending.media, factory);
        self.result_ticket = Some(ticket);
        self.error = None;
        true
    }

    /// Record a failed request. The previous result stays on screen.
    pub fn fail_analysis(&mut self, ticket: RequestTicket, error: ReviewError) -> bool {
        if self.take_current(ticket).is_none() {
            return false;
        }
        warn!(ticket = ticket.id(), error = %error, "analysis failed");
        self.error = Some(error.to_string());
        true
    }

    /// Attach a looked-up location to an issue of the result produced by
    /// `ticket`. Lookups for a replaced result are dropped.
    pub fn apply_location(&mut self, ticket: RequestTicket, response: &LocationResponse) -> bool {
        if self.result_ticket != Some(ticket) {
            debug!(ticket = ticket.id(), "location for a replaced result ignored");
            return false;
        }
        let id = IssueId::new(response.issue_id.as_str());
        let updated = self.result().with_location(&id, response.location);
        match updated {
            Some(updated) => {
                debug!(id = id.as_str(), "location attached");
                self.selection.update_result(updated);
                true
            }
            None => {
                debug!(id = id.as_str(), "location for unknown issue ignored");
                false
            }
        }
    }
}
