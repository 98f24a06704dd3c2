//! winit implementation of the dpiguard host traits.
//!
//! winit has no media queries, so resolution observers are emulated: each
//! registered observer remembers whether the window's DPI matched its own
//! when last checked, and [`WinitHost::poll_resolution`] reports every flip.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dpiguard_core::{
    DPI_PER_SCALE, HostError, HostEvent, HostWindow, RawScale, ResolutionHost, ResolutionObserver,
    ScaleQuery, Size, ViewportMetrics, dpi_unit, sanitize,
};
use tracing::trace;
use winit::window::Window;

use crate::events::{Subscriptions, WindowSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    dpi: u32,
    matched: bool,
}

/// Registered resolution observers, keyed by observer id.
///
/// Scale factors are converted with the same DPI unit the watcher keys its
/// observers to, so a flip is seen whatever unit was configured.
#[derive(Debug)]
pub struct ObserverRegistry {
    entries: BTreeMap<u64, Registration>,
    dpi_per_scale: f64,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new(DPI_PER_SCALE)
    }
}

impl ObserverRegistry {
    pub fn new(dpi_per_scale: f64) -> Self {
        Self {
            entries: BTreeMap::new(),
            dpi_per_scale: dpi_unit(dpi_per_scale),
        }
    }

    /// DPI for a raw window scale factor.
    pub fn dpi_for(&self, scale_factor: f64) -> u32 {
        sanitize(scale_factor).to_dpi(self.dpi_per_scale)
    }

    pub fn register(&mut self, id: u64, dpi: u32, scale_factor: f64) {
        let matched = dpi == self.dpi_for(scale_factor);
        self.entries.insert(id, Registration { dpi, matched });
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// DPIs of every observer whose match state flipped since the last poll.
    pub fn poll(&mut self, scale_factor: f64) -> Vec<u32> {
        let current = self.dpi_for(scale_factor);
        let mut changed = Vec::new();
        for reg in self.entries.values_mut() {
            let matched = reg.dpi == current;
            if matched != reg.matched {
                reg.matched = matched;
                changed.push(reg.dpi);
            }
        }
        changed
    }
}

/// Observer handed out by [`WinitHost::match_resolution`]. Only the modern
/// listener methods are exposed.
pub struct MonitorObserver {
    id: u64,
    dpi: u32,
    scale_factor: f64,
    registry: Rc<RefCell<ObserverRegistry>>,
}

impl ResolutionObserver for MonitorObserver {
    fn dpi(&self) -> u32 {
        self.dpi
    }

    fn add_event_listener(&mut self) -> Option<Result<(), HostError>> {
        self.registry
            .borrow_mut()
            .register(self.id, self.dpi, self.scale_factor);
        Some(Ok(()))
    }

    fn remove_event_listener(&mut self) -> Option<Result<(), HostError>> {
        self.registry.borrow_mut().remove(self.id);
        Some(Ok(()))
    }
}

impl Drop for MonitorObserver {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.try_borrow_mut() {
            registry.remove(self.id);
        }
    }
}

pub struct WinitHost {
    window: &'static Window,
    base_px: Option<f64>,
    subscriptions: Subscriptions,
    registry: Rc<RefCell<ObserverRegistry>>,
    next_observer_id: u64,
}

impl WinitHost {
    pub fn new(window: &'static Window, dpi_per_scale: f64) -> Self {
        Self {
            window,
            base_px: None,
            subscriptions: Subscriptions::default(),
            registry: Rc::new(RefCell::new(ObserverRegistry::new(dpi_per_scale))),
            next_observer_id: 0,
        }
    }

    pub fn window(&self) -> &'static Window {
        self.window
    }

    /// Host events for a translated window signal, filtered by subscription.
    pub fn expand(&self, signal: &WindowSignal) -> Vec<HostEvent> {
        self.subscriptions.expand(signal)
    }

    /// Resolution observer firings since the last call.
    pub fn poll_resolution(&mut self) -> Vec<HostEvent> {
        let scale_factor = self.window.scale_factor();
        self.registry
            .borrow_mut()
            .poll(scale_factor)
            .into_iter()
            .map(|dpi| {
                trace!(dpi, scale_factor, "resolution observer fired");
                HostEvent::ResolutionChanged { dpi }
            })
            .collect()
    }
}

impl ViewportMetrics for WinitHost {
    fn device_pixel_ratio(&self) -> RawScale {
        RawScale::Number(self.window.scale_factor())
    }

    fn inner_size(&self) -> Result<Size, HostError> {
        let size = self.window.inner_size();
        Ok(Size::new(size.width, size.height))
    }

    fn screen_size(&self) -> Result<Size, HostError> {
        let monitor = self
            .window
            .current_monitor()
            .ok_or_else(|| HostError::Unavailable("no current monitor".to_string()))?;
        let size = monitor.size();
        Ok(Size::new(size.width, size.height))
    }

    fn base_size(&self) -> Result<f64, HostError> {
        self.base_px
            .ok_or_else(|| HostError::Unavailable("base size not applied yet".to_string()))
    }

    fn set_base_size(&mut self, px: f64) {
        self.base_px = Some(px);
    }

    fn describe(&self) -> String {
        format!("winit/{} \"{}\"", std::env::consts::OS, self.window.title())
    }
}

impl ResolutionHost for WinitHost {
    fn match_resolution(&mut self, dpi: u32) -> Result<Box<dyn ResolutionObserver>, HostError> {
        // Without a monitor there is nothing whose resolution could change.
        if self.window.current_monitor().is_none() {
            return Err(HostError::Unsupported(
                "no current monitor to observe".to_string(),
            ));
        }
        self.next_observer_id += 1;
        Ok(Box::new(MonitorObserver {
            id: self.next_observer_id,
            dpi,
            scale_factor: self.window.scale_factor(),
            registry: Rc::clone(&self.registry),
        }))
    }

    fn subscribe_viewport_resize(&mut self) -> Result<(), HostError> {
        self.subscriptions.viewport_resize = true;
        Ok(())
    }

    fn subscribe_focus(&mut self) -> Result<(), HostError> {
        self.subscriptions.focus = true;
        Ok(())
    }
}

impl HostWindow for WinitHost {
    fn on_scale_changed(&mut self) -> Result<(), HostError> {
        self.subscriptions.scale_changed = true;
        Ok(())
    }

    fn listen(&mut self, topic: &str) -> Result<(), HostError> {
        self.subscriptions.topics.insert(topic.to_string());
        Ok(())
    }

    fn scale_factor(&self) -> ScaleQuery<'_> {
        Box::pin(std::future::ready(Ok::<f64, HostError>(
            self.window.scale_factor(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// DPI the watcher would key an observer to for this scale and unit.
    fn watcher_dpi(scale_factor: f64, dpi_per_scale: f64) -> u32 {
        sanitize(scale_factor).to_dpi(dpi_unit(dpi_per_scale))
    }

    #[test]
    fn registry_reports_match_flips() {
        let mut registry = ObserverRegistry::default();
        registry.register(1, 96, 1.0);

        assert!(registry.poll(1.0).is_empty());
        assert_eq!(registry.poll(2.0), vec![96]);
        assert!(registry.poll(1.5).is_empty());
        assert_eq!(registry.poll(1.0), vec![96]);
    }

    #[test]
    fn registry_forgets_removed_observers() {
        let mut registry = ObserverRegistry::default();
        registry.register(1, 96, 1.0);
        registry.register(2, 192, 1.0);
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert_eq!(registry.poll(2.0), vec![192]);
    }

    #[test]
    fn configured_dpi_unit_still_reports_flips() {
        for unit in [72.0, 0.0, -1.0, f64::NAN] {
            let mut registry = ObserverRegistry::new(unit);
            let dpi = watcher_dpi(1.0, unit);
            assert_eq!(registry.dpi_for(1.0), dpi, "unit {unit}");

            registry.register(1, dpi, 1.0);
            assert!(registry.poll(1.0).is_empty(), "unit {unit}");
            assert_eq!(registry.poll(2.0), vec![dpi], "unit {unit}");
        }
    }

    #[test]
    fn invalid_dpi_unit_uses_default() {
        let registry = ObserverRegistry::new(0.0);
        assert_eq!(registry.dpi_for(1.0), 96);
        assert_eq!(registry.dpi_for(f64::NAN), 96);
        assert_eq!(registry.dpi_for(2.0), 192);
    }

    #[test]
    fn dropped_observer_unregisters() {
        let registry = Rc::new(RefCell::new(ObserverRegistry::default()));
        let mut observer = MonitorObserver {
            id: 7,
            dpi: 120,
            scale_factor: 1.25,
            registry: Rc::clone(&registry),
        };
        assert_eq!(observer.add_event_listener(), Some(Ok(())));
        assert_eq!(observer.add_listener(), None);
        assert_eq!(registry.borrow().len(), 1);
        assert!(registry.borrow_mut().poll(1.25).is_empty());

        drop(observer);
        assert!(registry.borrow().is_empty());
    }
}
