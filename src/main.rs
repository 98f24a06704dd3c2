use std::time::Duration;

use anyhow::Result;
use dpiguard_config::DpiGuardConfig;
use dpiguard_core::BridgeOptions;
use dpiguard_window::DpiWindow;

mod logging;
mod renderer;

fn bridge_options(config: &DpiGuardConfig) -> BridgeOptions {
    let defaults = BridgeOptions::default();
    BridgeOptions {
        base_unit_px: config.scale.base_unit_px,
        dpi_per_scale: config.scale.dpi_per_scale,
        quiet_period: if config.render.debounce_ms == 0 {
            defaults.quiet_period
        } else {
            Duration::from_millis(config.render.debounce_ms)
        },
        rerender_on_host_resize: config.render.rerender_on_host_resize,
    }
}

fn main() -> Result<()> {
    let config = DpiGuardConfig::load();
    logging::init(config.logging.debug);
    tracing::debug!(?config, "configuration loaded");

    let window = DpiWindow::new(&config.window.title)?;
    let renderer = renderer::RedrawRenderer::new(window.window());
    window.run(bridge_options(&config), renderer)
}
