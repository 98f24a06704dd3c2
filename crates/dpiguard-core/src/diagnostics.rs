//! Startup scale dump.
//!
//! Everything here is best-effort telemetry; no reading is allowed to fail
//! the caller.

use tracing::{info, warn};

use crate::apply::ScaleSnapshot;
use crate::host::{Host, HostError};
use crate::scale::{RawScale, ScaleFactor, dpi_unit, sanitize};

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleReport {
    pub host: String,
    pub raw_ratio: RawScale,
    pub safe_scale: ScaleFactor,
    pub dpi: u32,
    pub snapshot: ScaleSnapshot,
    /// Result of the host's asynchronous scale query. Untrusted.
    pub host_scale: Result<f64, HostError>,
}

/// Log everything we know about the current scale.
pub async fn dump_scale<H: Host + ?Sized>(host: &H, dpi_per_scale: f64) -> ScaleReport {
    let raw_ratio = host.device_pixel_ratio();
    let safe_scale = sanitize(raw_ratio.clone());
    let snapshot = ScaleSnapshot::capture(safe_scale, host);
    let report_host = host.describe();

    info!(host = %report_host, "host");
    info!(raw = ?raw_ratio, safe = safe_scale.get(), "device pixel ratio");
    info!(inner = ?snapshot.inner, screen = ?snapshot.screen, "viewport");
    info!(base_px = ?snapshot.applied_px, "base size");

    let host_scale = host.scale_factor().await;
    match &host_scale {
        Ok(sf) => info!(scale_factor = sf, "host scale factor (may be bogus on some compositors)"),
        Err(e) => warn!("host scale factor query failed: {e}"),
    }

    ScaleReport {
        host: report_host,
        raw_ratio,
        safe_scale,
        dpi: safe_scale.to_dpi(dpi_unit(dpi_per_scale)),
        snapshot,
        host_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Size;
    use crate::host::fake::FakeHost;
    use crate::scale::DPI_PER_SCALE;

    #[test]
    fn dump_reports_raw_and_sanitized_values() {
        let mut host = FakeHost::new(9.0);
        host.base_px = Some(80.0);
        host.query = Ok(9.0);

        let report = pollster::block_on(dump_scale(&host, DPI_PER_SCALE));

        assert_eq!(report.host, "fake-host");
        assert_eq!(report.raw_ratio, RawScale::Number(9.0));
        assert_eq!(report.safe_scale.get(), 5.0);
        assert_eq!(report.dpi, 480);
        assert_eq!(report.snapshot.inner, Some(Size::new(1280, 720)));
        assert_eq!(report.snapshot.applied_px, Some(80.0));
        assert_eq!(report.host_scale, Ok(9.0));
    }

    #[test]
    fn dump_survives_failed_query_and_missing_readings() {
        let mut host = FakeHost::new("garbage");
        host.inner = None;
        host.screen = None;
        host.query = Err(HostError::Failed("ipc closed".into()));

        let report = pollster::block_on(dump_scale(&host, DPI_PER_SCALE));

        assert_eq!(report.safe_scale.get(), 1.0);
        assert_eq!(report.snapshot.applied_px, None);
        assert!(report.host_scale.is_err());
    }
}
