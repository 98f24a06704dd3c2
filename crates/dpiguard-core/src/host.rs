//! Host abstraction.
//!
//! The host is whatever owns the window: a winit event loop, a webview, a test
//! double. None of its capabilities are assumed to work; every call can fail
//! and every reading can be missing.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::scale::RawScale;

/// Topic the host publishes window resizes on.
pub const RESIZE_TOPIC: &str = "window://resize";

/// Topic the host publishes window moves on.
pub const MOVE_TOPIC: &str = "window://move";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("unsupported host capability: {0}")]
    Unsupported(String),
    #[error("host reading unavailable: {0}")]
    Unavailable(String),
    #[error("host call failed: {0}")]
    Failed(String),
}

/// Physical pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Notifications a host delivers to the bridge.
///
/// Hosts only deliver events for signals that were subscribed.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The window's own scale-changed notification, with the value it claims.
    ScaleChanged(f64),
    /// A topic-keyed window event, e.g. [`RESIZE_TOPIC`].
    Topic(String),
    /// Generic viewport resize.
    ViewportResized,
    /// The window regained focus.
    FocusGained,
    /// A threshold observer created for `dpi` changed its match state.
    ResolutionChanged { dpi: u32 },
}

/// Boxed future returned by [`HostWindow::scale_factor`].
pub type ScaleQuery<'a> = Pin<Box<dyn Future<Output = Result<f64, HostError>> + 'a>>;

/// Global viewport/display readables plus the document-wide base size.
pub trait ViewportMetrics {
    /// Raw device pixel ratio; may be anything.
    fn device_pixel_ratio(&self) -> RawScale;
    fn inner_size(&self) -> Result<Size, HostError>;
    fn screen_size(&self) -> Result<Size, HostError>;
    /// Base size in pixels as the host currently computes it.
    fn base_size(&self) -> Result<f64, HostError>;
    fn set_base_size(&mut self, px: f64);
    /// Free-form host description for diagnostics.
    fn describe(&self) -> String;
}

/// Display-resolution observation and the generic signals used as fallbacks.
pub trait ResolutionHost {
    /// Build an observer that matches only while the display resolution equals `dpi`.
    fn match_resolution(&mut self, dpi: u32) -> Result<Box<dyn ResolutionObserver>, HostError>;
    fn subscribe_viewport_resize(&mut self) -> Result<(), HostError>;
    fn subscribe_focus(&mut self) -> Result<(), HostError>;
}

/// The host window object.
pub trait HostWindow {
    fn on_scale_changed(&mut self) -> Result<(), HostError>;
    fn listen(&mut self, topic: &str) -> Result<(), HostError>;
    /// Asynchronous scale factor query. Diagnostics only; the value is untrusted.
    fn scale_factor(&self) -> ScaleQuery<'_>;
}

pub trait Host: ViewportMetrics + ResolutionHost + HostWindow {}

impl<T: ViewportMetrics + ResolutionHost + HostWindow> Host for T {}

/// A threshold observer valid for a single resolution.
///
/// Observer implementations have exposed the same capability under different
/// method names over time. Each method returns `None` when the observer does
/// not expose it.
pub trait ResolutionObserver {
    fn dpi(&self) -> u32;

    fn add_event_listener(&mut self) -> Option<Result<(), HostError>> {
        None
    }

    fn add_listener(&mut self) -> Option<Result<(), HostError>> {
        None
    }

    fn remove_event_listener(&mut self) -> Option<Result<(), HostError>> {
        None
    }

    fn remove_listener(&mut self) -> Option<Result<(), HostError>> {
        None
    }
}
