use winit::dpi::PhysicalSize;

/// The subset of winit window events the scale bridge cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSignal {
    Resized(PhysicalSize<u32>),
    ScaleFactorChanged(f64),
    Focused(bool),
    Moved,
    RedrawRequested,
    CloseRequested,
}
