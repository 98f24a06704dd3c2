//! Debounced render coordination.
//!
//! The coordinator owns a single pending-render slot. Every `schedule` call
//! replaces whatever was pending, so a storm of triggers collapses into one
//! render once the quiet period elapses. Time is passed in explicitly; the
//! event loop sleeps until [`RenderCoordinator::next_deadline`] and then
//! calls [`RenderCoordinator::poll`].

use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

/// Quiet period a burst of triggers must respect before rendering.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render container is missing")]
    MissingContainer,
    #[error("{0}")]
    Failed(String),
}

/// The application renderer's initialization entry point.
pub trait RenderEntry {
    fn render(&mut self) -> Result<(), RenderError>;
}

impl<F> RenderEntry for F
where
    F: FnMut() -> Result<(), RenderError>,
{
    fn render(&mut self) -> Result<(), RenderError> {
        self()
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingRender {
    requested_at: Instant,
    due: Instant,
}

/// Counters for what the coordinator did over its lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub scheduled: u64,
    pub superseded: u64,
    pub rendered: u64,
    pub failed: u64,
}

#[derive(Debug)]
pub struct RenderCoordinator {
    quiet: Duration,
    pending: Option<PendingRender>,
    stats: RenderStats,
}

impl Default for RenderCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl RenderCoordinator {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            stats: RenderStats::default(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending render becomes due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Arm a render due one quiet period from `now`, replacing any pending one.
    ///
    /// An overdue render that was never polled is replaced too, so callers
    /// should `poll` first.
    pub fn schedule(&mut self, now: Instant) {
        let next = PendingRender {
            requested_at: now,
            due: now + self.quiet,
        };
        if let Some(prev) = self.pending.replace(next) {
            self.stats.superseded += 1;
            trace!(
                waited_ms = now.saturating_duration_since(prev.requested_at).as_millis() as u64,
                "superseding pending render"
            );
        }
        self.stats.scheduled += 1;
    }

    /// Render if the pending deadline has passed. Returns whether a render ran.
    pub fn poll<R: RenderEntry + ?Sized>(&mut self, now: Instant, renderer: &mut R) -> bool {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                trace!(
                    delay_ms = now.saturating_duration_since(pending.requested_at).as_millis() as u64,
                    "debounced render due"
                );
                self.run(renderer);
                true
            }
            _ => false,
        }
    }

    /// Render immediately, outside the debounce slot. Returns whether it succeeded.
    pub fn render_now<R: RenderEntry + ?Sized>(&mut self, renderer: &mut R) -> bool {
        self.run(renderer)
    }

    /// Drop the pending render, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    fn run<R: RenderEntry + ?Sized>(&mut self, renderer: &mut R) -> bool {
        match renderer.render() {
            Ok(()) => {
                self.stats.rendered += 1;
                debug!(renders = self.stats.rendered, "render complete");
                true
            }
            Err(e) => {
                self.stats.failed += 1;
                error!("render failed: {e}");
                false
            }
        }
    }
}
