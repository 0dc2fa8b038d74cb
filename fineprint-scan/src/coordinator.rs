//! Scan coordination.
//!
//! Owns the deduplicated candidate set for one page view and drives
//! classifier passes over it: throttled re-scans, a delayed follow-up pass
//! for late-rendering content, and a low-confidence footer sweep when a
//! full pass yields nothing new. Subscribers observe the candidate set
//! through a watch broadcast; an optional mpsc stream carries per-candidate
//! indicator requests to a presentation layer.

use std::sync::Arc;
use std::time::Duration;

use fineprint_core::DetectedLink;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classifier::{LinkClassifier, DEFAULT_THRESHOLD};
use crate::page::PageSnapshot;

// ============================================================================
// Configuration
// ============================================================================

/// Tunable knobs for the scan coordinator.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Acceptance threshold for the primary pass.
    pub threshold: f32,
    /// Lower acceptance threshold for the footer sweep.
    pub sweep_threshold: f32,
    /// Minimum interval between scan passes.
    pub throttle: Duration,
    /// Delay before the follow-up pass after a page load.
    pub followup_delay: Duration,
    /// Fraction of the page counted as the bottom region.
    pub bottom_fraction: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            sweep_threshold: 0.05,
            throttle: Duration::from_millis(1000),
            followup_delay: Duration::from_millis(1500),
            bottom_fraction: 0.2,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Broadcast payload sent whenever the candidate set changes.
#[derive(Debug, Clone, Default)]
pub struct CandidatesChanged {
    /// URL of the page the candidates belong to.
    pub page_url: String,
    /// The full current candidate set; empty on teardown.
    pub links: Vec<DetectedLink>,
}

/// Request to attach a visual indicator for one accepted candidate.
#[derive(Debug, Clone)]
pub struct IndicatorRequest {
    /// URL of the page the candidate was found on.
    pub page_url: String,
    /// The newly accepted candidate.
    pub link: DetectedLink,
}

/// Page lifecycle events the coordinator consumes.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A page finished loading.
    Loaded(PageSnapshot),
    /// The page's structure changed in a way that may have added anchors.
    Mutated(PageSnapshot),
    /// The page is going away.
    Unloaded,
}

/// What one scan request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// False when the request was coalesced into a pending trailing scan.
    pub ran: bool,
    /// Candidates accepted by this request.
    pub new_candidates: usize,
}

impl ScanOutcome {
    const SKIPPED: Self = Self {
        ran: false,
        new_candidates: 0,
    };
}

// ============================================================================
// Coordinator
// ============================================================================

#[derive(Debug, Default)]
struct ScanState {
    page_url: String,
    candidates: Vec<DetectedLink>,
    last_scan_at: Option<Instant>,
    trailing_pending: bool,
    active: bool,
}

/// Drives classification over a page and owns its candidate set.
///
/// Cheap to clone; clones share the same state and subscriptions.
#[derive(Clone)]
pub struct ScanCoordinator {
    config: ScanConfig,
    classifier: LinkClassifier,
    page: Arc<RwLock<Option<PageSnapshot>>>,
    state: Arc<Mutex<ScanState>>,
    changed: Arc<watch::Sender<CandidatesChanged>>,
    indicators: Option<mpsc::Sender<IndicatorRequest>>,
}

impl ScanCoordinator {
    /// Creates a coordinator with the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        let (changed, _) = watch::channel(CandidatesChanged::default());
        Self {
            classifier: LinkClassifier::new(config.threshold),
            page: Arc::new(RwLock::new(None)),
            state: Arc::new(Mutex::new(ScanState::default())),
            changed: Arc::new(changed),
            indicators: None,
            config,
        }
    }

    /// Attaches a presentation-layer indicator channel.
    pub fn with_indicators(mut self, sender: mpsc::Sender<IndicatorRequest>) -> Self {
        self.indicators = Some(sender);
        self
    }

    /// Subscribes to candidate-set changes.
    pub fn subscribe(&self) -> watch::Receiver<CandidatesChanged> {
        self.changed.subscribe()
    }

    /// Starts a fresh, empty candidate set for a page.
    pub async fn init(&self, page_url: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.page_url = page_url.into();
        state.candidates.clear();
        state.last_scan_at = None;
        state.trailing_pending = false;
        state.active = true;
        info!(url = %state.page_url, "Scan coordinator initialized");
    }

    /// Tears down the current page: clears candidates and broadcasts one
    /// final empty notification, which doubles as the clear-indicators
    /// signal for subscribers.
    pub async fn destroy(&self) {
        let notification = {
            let mut state = self.state.lock().await;
            state.active = false;
            state.candidates.clear();
            state.trailing_pending = false;
            state.last_scan_at = None;
            CandidatesChanged {
                page_url: state.page_url.clone(),
                links: Vec::new(),
            }
        };
        *self.page.write().await = None;
        let _ = self.changed.send(notification);
        info!("Scan coordinator destroyed");
    }

    /// Replaces the stored page view used by subsequent scan passes.
    pub async fn update_page(&self, page: PageSnapshot) {
        *self.page.write().await = Some(page);
    }

    /// Discards everything and scans a page from scratch.
    pub async fn rescan(&self, page: PageSnapshot) -> ScanOutcome {
        self.destroy().await;
        self.init(page.url.clone()).await;
        self.update_page(page).await;
        self.scan().await
    }

    /// Requests a scan of the current page view, subject to throttling.
    ///
    /// At most one scan executes per throttle window. A request landing
    /// mid-window schedules a single trailing scan at the window boundary;
    /// further requests in the same window coalesce into it. Before
    /// [`init`](Self::init) (or after [`destroy`](Self::destroy)) requests
    /// are ignored.
    pub async fn scan(&self) -> ScanOutcome {
        let now = Instant::now();
        {
            let mut state = self.state.lock().await;
            if !state.active {
                return ScanOutcome::SKIPPED;
            }
            if let Some(last) = state.last_scan_at {
                let elapsed = now.duration_since(last);
                if elapsed < self.config.throttle {
                    if !state.trailing_pending {
                        state.trailing_pending = true;
                        self.spawn_trailing(self.config.throttle - elapsed);
                    }
                    debug!("Scan request coalesced into trailing window");
                    return ScanOutcome::SKIPPED;
                }
            }
            state.last_scan_at = Some(now);
        }

        let new_candidates = self.run_scan_pass().await;
        ScanOutcome {
            ran: true,
            new_candidates,
        }
    }

    /// The current candidate set.
    pub async fn detected_links(&self) -> Vec<DetectedLink> {
        self.state.lock().await.candidates.clone()
    }

    /// Consumes page events until the stream closes or the page unloads.
    ///
    /// `Loaded` starts a fresh set, scans immediately, and schedules the
    /// delayed follow-up pass; `Mutated` feeds the throttled scan path;
    /// `Unloaded` tears down and exits.
    pub async fn run(&self, mut events: mpsc::Receiver<PageEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                PageEvent::Loaded(page) => {
                    self.init(page.url.clone()).await;
                    self.update_page(page).await;
                    let _ = self.scan().await;
                    self.spawn_followup();
                }
                PageEvent::Mutated(page) => {
                    self.update_page(page).await;
                    let _ = self.scan().await;
                }
                PageEvent::Unloaded => {
                    self.destroy().await;
                    break;
                }
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn spawn_trailing(&self, wait: Duration) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            {
                let mut state = this.state.lock().await;
                state.trailing_pending = false;
                if !state.active {
                    return;
                }
                state.last_scan_at = Some(Instant::now());
            }
            debug!("Running trailing scan");
            this.run_scan_pass().await;
        });
    }

    fn spawn_followup(&self) {
        // Late-rendering pages often attach their footers after first paint.
        let this = self.clone();
        let delay = self.config.followup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = this.scan().await;
            debug!(
                ran = outcome.ran,
                new_candidates = outcome.new_candidates,
                "Follow-up scan finished"
            );
        });
    }

    /// One full scan pass over the stored page view.
    async fn run_scan_pass(&self) -> usize {
        let page = { self.page.read().await.clone() };
        let Some(page) = page else { return 0 };

        let mut state = self.state.lock().await;
        if !state.active {
            return 0;
        }

        let mut accepted: Vec<DetectedLink> = Vec::new();
        for anchor in &page.anchors {
            if let Some(link) = self.classifier.classify(anchor) {
                if !Self::is_duplicate(&state.candidates, &accepted, &link) {
                    accepted.push(link);
                }
            }
        }

        // Legal links cluster in footers; when the primary pass comes up
        // empty, re-examine the bottom region with a lower bar.
        if accepted.is_empty() {
            debug!("Primary pass found nothing new, sweeping footer region");
            let bottom = self.config.bottom_fraction;
            for anchor in page.anchors.iter().filter(|a| a.in_bottom_region(bottom)) {
                if let Some(link) = self
                    .classifier
                    .classify_with_threshold(anchor, self.config.sweep_threshold)
                {
                    if !Self::is_duplicate(&state.candidates, &accepted, &link) {
                        accepted.push(link);
                    }
                }
            }
        }

        if accepted.is_empty() {
            return 0;
        }

        let added = accepted.len();
        for link in accepted {
            info!(
                url = %link.url,
                document_type = %link.document_type,
                confidence = link.confidence,
                "Accepted candidate"
            );
            if let Some(sender) = &self.indicators {
                let request = IndicatorRequest {
                    page_url: state.page_url.clone(),
                    link: link.clone(),
                };
                if sender.try_send(request).is_err() {
                    warn!("Indicator channel full or closed, dropping request");
                }
            }
            state.candidates.push(link);
        }

        let _ = self.changed.send(CandidatesChanged {
            page_url: state.page_url.clone(),
            links: state.candidates.clone(),
        });
        added
    }

    fn is_duplicate(
        existing: &[DetectedLink],
        pending: &[DetectedLink],
        link: &DetectedLink,
    ) -> bool {
        existing.iter().chain(pending).any(|c| c.collides_with(link))
    }
}

// ============================================================================
// Tests
// ============================================================================
