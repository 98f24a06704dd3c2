//! dpiguard-window: winit host for the dpiguard scale bridge.
//!
//! Responsibilities:
//! - Create the event loop and window.
//! - Expose the window to dpiguard-core through [`host::WinitHost`].
//! - Feed window events and emulated resolution observers into the bridge.
//! - Sleep until the next debounced render is due.

use std::time::Instant;

use anyhow::Result;
use dpiguard_core::{BridgeOptions, HostEventBridge, RenderEntry};
use tracing::{debug, info, trace};
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

pub mod events;
pub mod host;

use events::{WindowSignal, translate_window_event};
use host::WinitHost;

pub struct DpiWindow {
    event_loop: EventLoop<()>,
    // Leaked so renderers can hold on to it for the whole session.
    window: &'static Window,
}

impl DpiWindow {
    pub fn new(title: &str) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new().with_title(title).build(&event_loop)?;
        let window: &'static Window = Box::leak(Box::new(window));
        debug!(title, scale_factor = window.scale_factor(), "window created");
        Ok(Self { event_loop, window })
    }

    pub fn window(&self) -> &'static Window {
        self.window
    }

    /// Run the event loop until the window closes.
    ///
    /// The bridge starts on the first `Resumed`, so the initial scale is
    /// applied and the boot render happens before any event is handled.
    pub fn run<R: RenderEntry + 'static>(self, options: BridgeOptions, renderer: R) -> Result<()> {
        let Self { event_loop, window } = self;
        let mut host = WinitHost::new(window, options.dpi_per_scale);
        let mut renderer = Some(renderer);
        let mut bridge: Option<HostEventBridge<R>> = None;

        event_loop.run(move |event, elwt| match event {
            Event::Resumed => {
                if let Some(renderer) = renderer.take() {
                    bridge = Some(HostEventBridge::start(&mut host, renderer, options.clone()));
                }
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                let Some(signal) = translate_window_event(&event) else {
                    return;
                };
                match signal {
                    WindowSignal::CloseRequested => {
                        if let Some(bridge) = bridge.as_mut() {
                            bridge.teardown();
                        }
                        elwt.exit();
                    }
                    WindowSignal::RedrawRequested => trace!("redraw requested"),
                    signal => {
                        let Some(bridge) = bridge.as_mut() else {
                            return;
                        };
                        let now = Instant::now();
                        for host_event in host.expand(&signal) {
                            bridge.dispatch(host_event, &mut host, now);
                        }
                    }
                }
            }
            Event::AboutToWait => {
                let Some(bridge) = bridge.as_mut() else {
                    return;
                };
                let now = Instant::now();
                for host_event in host.poll_resolution() {
                    bridge.dispatch(host_event, &mut host, now);
                }
                bridge.poll(now);
                elwt.set_control_flow(match bridge.next_deadline() {
                    Some(deadline) => ControlFlow::WaitUntil(deadline),
                    None => ControlFlow::Wait,
                });
            }
            Event::LoopExiting => {
                if let Some(bridge) = bridge.as_ref() {
                    let stats = bridge.render_stats();
                    info!(
                        rendered = stats.rendered,
                        failed = stats.failed,
                        superseded = stats.superseded,
                        "event loop exiting"
                    );
                }
            }
            _ => {}
        })?;
        Ok(())
    }
}
