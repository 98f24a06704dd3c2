//! Change detection: "the display scale may have changed".
//!
//! No single host mechanism is reliable everywhere, so the watcher prefers a
//! threshold observer keyed to the current resolution and degrades to the
//! generic viewport resize signal when the host cannot provide one.
//!
//! A threshold observer only means something for the resolution it was built
//! for. Once it fires, the threshold itself has moved, so the observer is torn
//! down and rebuilt for the new scale. Focus regain forces the same rebuild,
//! since some compositors only update the reported scale while focused.

use tracing::{debug, info, trace, warn};

use crate::apply::ScaleApplier;
use crate::host::{Host, HostError, ResolutionObserver};
use crate::scale::dpi_unit;

/// Signals the watcher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSignal {
    ResolutionChanged { dpi: u32 },
    ViewportResized,
    FocusGained,
}

/// Registration method an observer accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerApi {
    /// `add_event_listener` / `remove_event_listener`.
    EventListener,
    /// `add_listener` / `remove_listener`.
    Listener,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// A threshold observer is (or was last) armed.
    Resolution,
    /// Observer construction failed; the viewport resize signal stands in.
    ResizeOnly,
}

enum ObserverState {
    Unarmed,
    Armed {
        observer: Box<dyn ResolutionObserver>,
        api: ListenerApi,
    },
}

pub struct ChangeWatcher {
    state: ObserverState,
    mode: WatchMode,
    /// The resize fallback outlives the mode that asked for it.
    resize_subscribed: bool,
    dpi_per_scale: f64,
}

impl ChangeWatcher {
    /// Arm an observer for the current scale, or fall back to resize-only
    /// detection. Focus is subscribed either way.
    pub fn start<H: Host + ?Sized>(host: &mut H, dpi_per_scale: f64) -> Self {
        let mut watcher = Self {
            state: ObserverState::Unarmed,
            mode: WatchMode::Resolution,
            resize_subscribed: false,
            dpi_per_scale: dpi_unit(dpi_per_scale),
        };

        if let Err(e) = watcher.rebuild(host) {
            watcher.enter_resize_only(host, &e);
        }
        if let Err(e) = host.subscribe_focus() {
            warn!("focus subscription unavailable: {e}");
        }
        watcher
    }

    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    /// Resolution the live observer is keyed to, if one is armed.
    pub fn armed_dpi(&self) -> Option<u32> {
        match &self.state {
            ObserverState::Armed { observer, .. } => Some(observer.dpi()),
            ObserverState::Unarmed => None,
        }
    }

    pub fn armed_api(&self) -> Option<ListenerApi> {
        match &self.state {
            ObserverState::Armed { api, .. } => Some(*api),
            ObserverState::Unarmed => None,
        }
    }

    /// React to a signal, invoking `on_change` when the scale may have moved.
    ///
    /// Returns whether `on_change` ran.
    pub fn handle<H: Host + ?Sized>(
        &mut self,
        signal: WatchSignal,
        host: &mut H,
        on_change: &mut dyn FnMut(&mut H),
    ) -> bool {
        match signal {
            WatchSignal::ResolutionChanged { dpi } => {
                if self.armed_dpi() != Some(dpi) {
                    trace!(dpi, armed = ?self.armed_dpi(), "ignoring stale resolution observer");
                    return false;
                }
                on_change(&mut *host);
                self.rearm(host);
                true
            }
            WatchSignal::ViewportResized => {
                if self.mode != WatchMode::ResizeOnly {
                    return false;
                }
                on_change(&mut *host);
                if self.rebuild(host).is_ok() {
                    self.mode = WatchMode::Resolution;
                    info!(dpi = ?self.armed_dpi(), "resolution observer available, leaving resize-only mode");
                }
                true
            }
            WatchSignal::FocusGained => {
                debug!("focus regained, rebinding resolution observer");
                self.rearm(host);
                on_change(&mut *host);
                true
            }
        }
    }

    /// Drop the live observer. Used on window teardown.
    pub fn teardown(&mut self) {
        self.teardown_observer();
    }

    fn rearm<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Err(e) = self.rebuild(host) {
            self.enter_resize_only(host, &e);
        }
    }

    fn rebuild<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), HostError> {
        self.teardown_observer();

        let dpi = ScaleApplier::current_scale(&*host).to_dpi(self.dpi_per_scale);
        let mut observer = host.match_resolution(dpi)?;
        let api = register(observer.as_mut())?;
        debug!(dpi, ?api, "resolution observer armed");
        self.state = ObserverState::Armed { observer, api };
        Ok(())
    }

    fn teardown_observer(&mut self) {
        let ObserverState::Armed { mut observer, api } =
            std::mem::replace(&mut self.state, ObserverState::Unarmed)
        else {
            return;
        };

        let removed = match api {
            ListenerApi::EventListener => observer
                .remove_event_listener()
                .or_else(|| observer.remove_listener()),
            ListenerApi::Listener => observer
                .remove_listener()
                .or_else(|| observer.remove_event_listener()),
        };
        match removed {
            Some(Ok(())) => trace!(dpi = observer.dpi(), "resolution observer removed"),
            Some(Err(e)) => debug!(dpi = observer.dpi(), "resolution observer teardown failed: {e}"),
            None => trace!(dpi = observer.dpi(), "resolution observer has no removal method"),
        }
    }

    fn enter_resize_only<H: Host + ?Sized>(&mut self, host: &mut H, cause: &HostError) {
        if self.mode == WatchMode::ResizeOnly {
            trace!("resolution observer still unavailable: {cause}");
            return;
        }
        warn!("resolution observer unavailable ({cause}), falling back to resize-only detection");
        self.mode = WatchMode::ResizeOnly;
        if self.resize_subscribed {
            return;
        }
        match host.subscribe_viewport_resize() {
            Ok(()) => self.resize_subscribed = true,
            Err(e) => warn!("viewport resize subscription failed: {e}"),
        }
    }
}

/// Probe the known registration methods in priority order. A missing method
/// is not an error; only running out of methods is.
fn register(observer: &mut dyn ResolutionObserver) -> Result<ListenerApi, HostError> {
    if let Some(result) = observer.add_event_listener() {
        return result.map(|()| ListenerApi::EventListener);
    }
    if let Some(result) = observer.add_listener() {
        return result.map(|()| ListenerApi::Listener);
    }
    Err(HostError::Unsupported(
        "resolution observer exposes no listener registration".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{FakeHost, ObserverSupport};
    use crate::scale::{DPI_PER_SCALE, RawScale};

    fn count_calls(watcher: &mut ChangeWatcher, signal: WatchSignal, host: &mut FakeHost) -> usize {
        let mut calls = 0;
        watcher.handle(signal, host, &mut |_| calls += 1);
        calls
    }

    #[test]
    fn start_arms_observer_for_current_scale() {
        let mut host = FakeHost::new(1.25);
        let watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(watcher.mode(), WatchMode::Resolution);
        assert_eq!(watcher.armed_dpi(), Some(120));
        assert_eq!(watcher.armed_api(), Some(ListenerApi::EventListener));
        assert_eq!(host.registered(), vec![(120, "add_event_listener")]);
        assert_eq!(host.focus_subs, 1);
        assert_eq!(host.viewport_resize_subs, 0);
    }

    #[test]
    fn legacy_registration_is_used_when_modern_is_absent() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Legacy);
        let watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(watcher.armed_api(), Some(ListenerApi::Listener));
        assert_eq!(host.registered(), vec![(96, "add_listener")]);
    }

    #[test]
    fn modern_registration_wins_when_both_exist() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Both);
        ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(host.registered(), vec![(96, "add_event_listener")]);
    }

    #[test]
    fn construction_failure_falls_back_to_resize() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Broken);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(watcher.mode(), WatchMode::ResizeOnly);
        assert_eq!(watcher.armed_dpi(), None);
        assert_eq!(host.viewport_resize_subs, 1);

        assert_eq!(count_calls(&mut watcher, WatchSignal::ViewportResized, &mut host), 1);
        assert_eq!(watcher.mode(), WatchMode::ResizeOnly);
        // Still a single resize subscription after the failed re-arm.
        assert_eq!(host.viewport_resize_subs, 1);
    }

    #[test]
    fn observer_without_registration_methods_is_treated_as_unsupported() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Neither);
        let watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(watcher.mode(), WatchMode::ResizeOnly);
        assert_eq!(host.constructed(), vec![96]);
        assert_eq!(host.viewport_resize_subs, 1);
    }

    #[test]
    fn failing_registration_falls_back_to_resize() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Failing);
        let watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(watcher.mode(), WatchMode::ResizeOnly);
        assert_eq!(watcher.armed_dpi(), None);
    }

    #[test]
    fn resize_only_mode_recovers_when_observer_becomes_available() {
        let mut host = FakeHost::new(2.0).with_support(ObserverSupport::Broken);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        host.support = ObserverSupport::Modern;
        assert_eq!(count_calls(&mut watcher, WatchSignal::ViewportResized, &mut host), 1);
        assert_eq!(watcher.mode(), WatchMode::Resolution);
        assert_eq!(watcher.armed_dpi(), Some(192));
    }

    #[test]
    fn second_fallback_reuses_resize_subscription() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Broken);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);
        assert_eq!(host.viewport_resize_subs, 1);

        host.support = ObserverSupport::Modern;
        count_calls(&mut watcher, WatchSignal::ViewportResized, &mut host);
        assert_eq!(watcher.mode(), WatchMode::Resolution);

        host.support = ObserverSupport::Broken;
        assert_eq!(count_calls(&mut watcher, WatchSignal::FocusGained, &mut host), 1);
        assert_eq!(watcher.mode(), WatchMode::ResizeOnly);
        assert_eq!(host.viewport_resize_subs, 1);

        // The fallback still answers resizes.
        assert_eq!(count_calls(&mut watcher, WatchSignal::ViewportResized, &mut host), 1);
        assert_eq!(host.viewport_resize_subs, 1);
    }

    #[test]
    fn resize_is_ignored_while_observer_is_armed() {
        let mut host = FakeHost::new(1.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(count_calls(&mut watcher, WatchSignal::ViewportResized, &mut host), 0);
        assert_eq!(host.constructed(), vec![96]);
    }

    #[test]
    fn focus_rebuilds_and_notifies_even_without_change() {
        let mut host = FakeHost::new(1.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        assert_eq!(count_calls(&mut watcher, WatchSignal::FocusGained, &mut host), 1);
        assert_eq!(host.removed(), vec![(96, "remove_event_listener")]);
        assert_eq!(host.constructed(), vec![96, 96]);
        assert_eq!(watcher.armed_dpi(), Some(96));
    }

    #[test]
    fn focus_rekeys_observer_to_new_scale() {
        let mut host = FakeHost::new(1.0).with_support(ObserverSupport::Legacy);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        host.pixel_ratio = RawScale::Number(1.5);
        assert_eq!(count_calls(&mut watcher, WatchSignal::FocusGained, &mut host), 1);
        assert_eq!(host.removed(), vec![(96, "remove_listener")]);
        assert_eq!(host.registered(), vec![(96, "add_listener"), (144, "add_listener")]);
        assert_eq!(watcher.armed_dpi(), Some(144));
    }

    #[test]
    fn focus_callback_sees_rebuilt_observer() {
        let mut host = FakeHost::new(1.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);
        host.pixel_ratio = RawScale::Number(2.0);

        let mut seen = Vec::new();
        watcher.handle(WatchSignal::FocusGained, &mut host, &mut |h| {
            seen.push(h.constructed().len())
        });
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn observer_firing_notifies_once_and_rearms() {
        let mut host = FakeHost::new(1.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        host.pixel_ratio = RawScale::Number(2.0);
        let calls = count_calls(&mut watcher, WatchSignal::ResolutionChanged { dpi: 96 }, &mut host);

        assert_eq!(calls, 1);
        assert_eq!(host.removed(), vec![(96, "remove_event_listener")]);
        assert_eq!(watcher.armed_dpi(), Some(192));
    }

    #[test]
    fn stale_observer_firing_is_ignored() {
        let mut host = FakeHost::new(2.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        let calls = count_calls(&mut watcher, WatchSignal::ResolutionChanged { dpi: 96 }, &mut host);
        assert_eq!(calls, 0);
        assert_eq!(host.constructed(), vec![192]);
    }

    #[test]
    fn teardown_removes_listener() {
        let mut host = FakeHost::new(1.0);
        let mut watcher = ChangeWatcher::start(&mut host, DPI_PER_SCALE);

        watcher.teardown();
        assert_eq!(watcher.armed_dpi(), None);
        assert_eq!(host.removed(), vec![(96, "remove_event_listener")]);

        watcher.teardown();
        assert_eq!(host.removed().len(), 1);
    }

    #[test]
    fn invalid_dpi_unit_falls_back_to_default() {
        let mut host = FakeHost::new(1.0);
        let watcher = ChangeWatcher::start(&mut host, -1.0);
        assert_eq!(watcher.armed_dpi(), Some(96));
    }
}
