/// Print the effective configuration
///
/// Run with: cargo run -p dpiguard-config --example print_config

fn main() {
    let config = dpiguard_config::DpiGuardConfig::load();

    println!("=== dpiguard configuration ===\n");

    println!("Scale:");
    println!("  Base unit: {} px", config.scale.base_unit_px);
    println!("  DPI per scale: {}", config.scale.dpi_per_scale);
    println!();

    println!("Render:");
    println!("  Debounce: {} ms", config.render.debounce_ms);
    println!("  Re-render on host resize: {}", config.render.rerender_on_host_resize);
    println!();

    println!("Window title: {}", config.window.title);
    println!("Debug logging: {}", config.logging.debug);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
