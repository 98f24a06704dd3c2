//! Scale application: turn a sanitized scale into a document-wide base size.

use tracing::{debug, info};

use crate::host::{Size, ViewportMetrics};
use crate::scale::{ScaleFactor, sanitize};

/// Base size at scale 1.0, in pixels.
pub const DEFAULT_BASE_UNIT_PX: f64 = 16.0;

/// `round(base_unit * scale * 1000) / 1000`: three decimals of sub-pixel
/// precision without float noise leaking into the applied style.
pub fn base_size_px(base_unit: f64, scale: ScaleFactor) -> f64 {
    (base_unit * scale.get() * 1000.0).round() / 1000.0
}

/// What an [`ScaleApplier::apply`] call wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedScale {
    pub scale: ScaleFactor,
    pub base_px: f64,
}

/// Diagnostic readings taken right after a scale was applied.
///
/// Every reading is optional; a host that cannot answer simply leaves a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSnapshot {
    pub scale: ScaleFactor,
    /// Base size as the host reports it after recomputing styles.
    pub applied_px: Option<f64>,
    pub inner: Option<Size>,
    pub screen: Option<Size>,
}

impl ScaleSnapshot {
    pub fn capture<H: ViewportMetrics + ?Sized>(scale: ScaleFactor, host: &H) -> Self {
        Self {
            scale,
            applied_px: reading("base size", host.base_size()),
            inner: reading("inner size", host.inner_size()),
            screen: reading("screen size", host.screen_size()),
        }
    }
}

fn reading<T, E: std::fmt::Display>(what: &'static str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(reading = what, "diagnostic reading failed: {e}");
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleApplier {
    base_unit: f64,
}

impl Default for ScaleApplier {
    fn default() -> Self {
        Self {
            base_unit: DEFAULT_BASE_UNIT_PX,
        }
    }
}

impl ScaleApplier {
    /// Non-positive or non-finite base units fall back to [`DEFAULT_BASE_UNIT_PX`].
    pub fn new(base_unit: f64) -> Self {
        if base_unit.is_finite() && base_unit > 0.0 {
            Self { base_unit }
        } else {
            Self::default()
        }
    }

    pub fn base_unit(&self) -> f64 {
        self.base_unit
    }

    /// Current scale, sanitized fresh from the host's raw reading.
    pub fn current_scale<H: ViewportMetrics + ?Sized>(host: &H) -> ScaleFactor {
        sanitize(host.device_pixel_ratio())
    }

    /// Sanitize the host's current scale, write the derived base size and log
    /// a diagnostic snapshot.
    pub fn apply<H: ViewportMetrics + ?Sized>(&self, host: &mut H) -> AppliedScale {
        let scale = Self::current_scale(&*host);
        let base_px = base_size_px(self.base_unit, scale);
        host.set_base_size(base_px);

        let snapshot = ScaleSnapshot::capture(scale, &*host);
        info!(
            scale = scale.get(),
            applied_px = ?snapshot.applied_px,
            inner = ?snapshot.inner,
            screen = ?snapshot.screen,
            "DPI"
        );

        AppliedScale { scale, base_px }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::scale::RawScale;

    #[test]
    fn base_size_has_no_float_drift() {
        assert_eq!(base_size_px(16.0, sanitize(2.0)), 32.0);
        assert_eq!(base_size_px(16.0, sanitize(1.1)), 17.6);
        assert_eq!(base_size_px(16.0, sanitize(1.0 / 3.0)), 5.333);
    }

    #[test]
    fn apply_writes_base_size() {
        let mut host = FakeHost::new(2.0);
        let applied = ScaleApplier::new(16.0).apply(&mut host);

        assert_eq!(applied.scale.get(), 2.0);
        assert_eq!(applied.base_px, 32.0);
        assert_eq!(host.base_px, Some(32.0));
    }

    #[test]
    fn apply_sanitizes_hostile_pixel_ratio() {
        let mut host = FakeHost::new(f64::NAN);
        assert_eq!(ScaleApplier::default().apply(&mut host).base_px, 16.0);

        host.pixel_ratio = RawScale::Number(12.0);
        assert_eq!(ScaleApplier::default().apply(&mut host).base_px, 80.0);
    }

    #[test]
    fn snapshot_tolerates_missing_readings() {
        let mut host = FakeHost::new(1.5);
        host.inner = None;
        host.screen = None;

        let applied = ScaleApplier::default().apply(&mut host);
        let snapshot = ScaleSnapshot::capture(applied.scale, &host);

        assert_eq!(snapshot.applied_px, Some(24.0));
        assert_eq!(snapshot.inner, None);
        assert_eq!(snapshot.screen, None);
    }

    #[test]
    fn invalid_base_unit_falls_back() {
        assert_eq!(ScaleApplier::new(0.0).base_unit(), DEFAULT_BASE_UNIT_PX);
        assert_eq!(ScaleApplier::new(f64::NAN).base_unit(), DEFAULT_BASE_UNIT_PX);
        assert_eq!(ScaleApplier::new(20.0).base_unit(), 20.0);
    }
}
