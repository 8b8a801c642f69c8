/// Inputs the host forwards to the frame loop between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Window size or device pixel ratio changed.
    Resize {
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    },
    /// A debug panel control was edited; `value` is its text form.
    PanelInput { control: String, value: String },
}
