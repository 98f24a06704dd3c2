pub mod types;

use std::collections::HashSet;

use dpiguard_core::{HostEvent, MOVE_TOPIC, RESIZE_TOPIC};

pub use types::WindowSignal;

pub fn translate_window_event(event: &winit::event::WindowEvent) -> Option<WindowSignal> {
    use winit::event::WindowEvent;
    match event {
        WindowEvent::Resized(sz) => Some(WindowSignal::Resized(*sz)),
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
            Some(WindowSignal::ScaleFactorChanged(*scale_factor))
        }
        WindowEvent::Focused(focused) => Some(WindowSignal::Focused(*focused)),
        WindowEvent::Moved(_) => Some(WindowSignal::Moved),
        WindowEvent::RedrawRequested => Some(WindowSignal::RedrawRequested),
        WindowEvent::CloseRequested => Some(WindowSignal::CloseRequested),
        _ => None,
    }
}

/// Which host signals the bridge has asked for. Events for anything else are
/// dropped before they reach it.
#[derive(Debug, Default, Clone)]
pub struct Subscriptions {
    pub scale_changed: bool,
    pub viewport_resize: bool,
    pub focus: bool,
    pub topics: HashSet<String>,
}

impl Subscriptions {
    /// Expand one window signal into the host events it stands for.
    ///
    /// A resize is both the host's own resize topic and a generic viewport
    /// resize.
    pub fn expand(&self, signal: &WindowSignal) -> Vec<HostEvent> {
        let mut out = Vec::new();
        match signal {
            WindowSignal::Resized(_) => {
                if self.topics.contains(RESIZE_TOPIC) {
                    out.push(HostEvent::Topic(RESIZE_TOPIC.to_string()));
                }
                if self.viewport_resize {
                    out.push(HostEvent::ViewportResized);
                }
            }
            WindowSignal::Moved => {
                if self.topics.contains(MOVE_TOPIC) {
                    out.push(HostEvent::Topic(MOVE_TOPIC.to_string()));
                }
            }
            WindowSignal::ScaleFactorChanged(scale_factor) => {
                if self.scale_changed {
                    out.push(HostEvent::ScaleChanged(*scale_factor));
                }
            }
            WindowSignal::Focused(true) => {
                if self.focus {
                    out.push(HostEvent::FocusGained);
                }
            }
            WindowSignal::Focused(false)
            | WindowSignal::RedrawRequested
            | WindowSignal::CloseRequested => {}
        }
        out
    }
}
