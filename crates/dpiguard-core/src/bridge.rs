//! Host Event Bridge.
//!
//! Wires host notifications to scale application (always synchronous) and to
//! the render coordinator (always deferred). One bridge serves one window
//! session: the listener and timer slots live here and die with it.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::apply::{AppliedScale, DEFAULT_BASE_UNIT_PX, ScaleApplier};
use crate::diagnostics::{ScaleReport, dump_scale};
use crate::host::{Host, HostEvent, RESIZE_TOPIC};
use crate::render::{DEFAULT_QUIET_PERIOD, RenderCoordinator, RenderEntry, RenderStats};
use crate::scale::{DPI_PER_SCALE, dpi_unit};
use crate::watcher::{ChangeWatcher, WatchMode, WatchSignal};

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOptions {
    pub base_unit_px: f64,
    pub dpi_per_scale: f64,
    pub quiet_period: Duration,
    /// Schedule a render on the host's own resize topic, not just on the
    /// generic viewport resize.
    pub rerender_on_host_resize: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            base_unit_px: DEFAULT_BASE_UNIT_PX,
            dpi_per_scale: DPI_PER_SCALE,
            quiet_period: DEFAULT_QUIET_PERIOD,
            rerender_on_host_resize: false,
        }
    }
}

pub struct HostEventBridge<R> {
    applier: ScaleApplier,
    watcher: ChangeWatcher,
    coordinator: RenderCoordinator,
    renderer: R,
    options: BridgeOptions,
    last_applied: AppliedScale,
    startup_report: ScaleReport,
}

impl<R: RenderEntry> HostEventBridge<R> {
    /// Establish a known-good state, then register for events.
    ///
    /// Order: apply scale, dump diagnostics, start the change watcher and the
    /// permanent resize signal, boot render, then host scale/resize
    /// notifications.
    pub fn start<H: Host + ?Sized>(host: &mut H, renderer: R, options: BridgeOptions) -> Self {
        let options = BridgeOptions {
            dpi_per_scale: dpi_unit(options.dpi_per_scale),
            ..options
        };
        let applier = ScaleApplier::new(options.base_unit_px);
        let last_applied = applier.apply(host);
        let startup_report = pollster::block_on(dump_scale(&*host, options.dpi_per_scale));

        let watcher = ChangeWatcher::start(host, options.dpi_per_scale);
        if let Err(e) = host.subscribe_viewport_resize() {
            debug!("viewport resize subscription failed: {e}");
        }

        let mut coordinator = RenderCoordinator::new(options.quiet_period);
        let mut renderer = renderer;
        coordinator.render_now(&mut renderer);

        if let Err(e) = host.on_scale_changed() {
            debug!("host scale-changed subscription failed: {e}");
        }
        if let Err(e) = host.listen(RESIZE_TOPIC) {
            debug!(topic = RESIZE_TOPIC, "host topic subscription failed: {e}");
        }

        info!(
            scale = last_applied.scale.get(),
            base_px = last_applied.base_px,
            mode = ?watcher.mode(),
            "scale bridge started"
        );

        Self {
            applier,
            watcher,
            coordinator,
            renderer,
            options,
            last_applied,
            startup_report,
        }
    }

    pub fn dispatch<H: Host + ?Sized>(&mut self, event: HostEvent, host: &mut H, now: Instant) {
        // A render that came due before this event would already have fired.
        self.coordinator.poll(now, &mut self.renderer);

        match event {
            HostEvent::ScaleChanged(reported) => {
                info!(reported, "host scale change event");
                self.apply(host);
                self.coordinator.schedule(now);
            }
            HostEvent::Topic(topic) if topic == RESIZE_TOPIC => {
                debug!(%topic, "window resized");
                if self.options.rerender_on_host_resize {
                    self.coordinator.schedule(now);
                }
            }
            HostEvent::Topic(topic) => {
                trace!(%topic, "ignoring host topic");
            }
            HostEvent::ViewportResized => {
                // In resize-only mode the watcher has just applied it.
                if !self.watch(WatchSignal::ViewportResized, host) {
                    self.apply(host);
                }
                self.coordinator.schedule(now);
            }
            HostEvent::FocusGained => {
                self.watch(WatchSignal::FocusGained, host);
            }
            HostEvent::ResolutionChanged { dpi } => {
                self.watch(WatchSignal::ResolutionChanged { dpi }, host);
            }
        }
    }

    /// Fire the debounced render if it is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.coordinator.poll(now, &mut self.renderer)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.coordinator.next_deadline()
    }

    /// Release the observer and any pending render at window teardown.
    pub fn teardown(&mut self) {
        self.watcher.teardown();
        let dropped = self.coordinator.cancel();
        info!(dropped_pending_render = dropped, "scale bridge torn down");
    }

    pub fn last_applied(&self) -> AppliedScale {
        self.last_applied
    }

    pub fn watch_mode(&self) -> WatchMode {
        self.watcher.mode()
    }

    pub fn watcher(&self) -> &ChangeWatcher {
        &self.watcher
    }

    pub fn render_stats(&self) -> RenderStats {
        self.coordinator.stats()
    }

    pub fn startup_report(&self) -> &ScaleReport {
        &self.startup_report
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn apply<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.last_applied = self.applier.apply(host);
    }

    /// Route a signal to the watcher. Returns whether it applied the scale.
    fn watch<H: Host + ?Sized>(&mut self, signal: WatchSignal, host: &mut H) -> bool {
        let applier = self.applier;
        let mut applied = None;
        self.watcher
            .handle(signal, host, &mut |h| applied = Some(applier.apply(h)));
        match applied {
            Some(applied) => {
                self.last_applied = applied;
                true
            }
            None => false,
        }
    }
}
