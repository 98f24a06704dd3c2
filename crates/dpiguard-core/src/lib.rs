//! dpiguard-core: keep a window's UI scale in line with an unreliable host.
//!
//! The host's reported scale factor is treated as hostile input. It is
//! sanitized ([`scale`]), turned into a document-wide base size
//! ([`apply`]), re-read whenever any of several change signals fires
//! ([`watcher`]), and followed by at most one debounced re-render per burst
//! ([`render`]). [`bridge`] wires a concrete [`host::Host`] to all of it.

pub mod apply;
pub mod bridge;
pub mod diagnostics;
pub mod host;
pub mod render;
pub mod scale;
pub mod watcher;

pub use apply::{AppliedScale, ScaleApplier, ScaleSnapshot, base_size_px};
pub use bridge::{BridgeOptions, HostEventBridge};
pub use diagnostics::{ScaleReport, dump_scale};
pub use host::{
    Host, HostError, HostEvent, HostWindow, MOVE_TOPIC, RESIZE_TOPIC, ResolutionHost,
    ResolutionObserver, ScaleQuery, Size, ViewportMetrics,
};
pub use render::{RenderCoordinator, RenderEntry, RenderError, RenderStats};
pub use scale::{DPI_PER_SCALE, MAX_SCALE, RawScale, ScaleFactor, dpi_unit, sanitize};
pub use watcher::{ChangeWatcher, ListenerApi, WatchMode, WatchSignal};
