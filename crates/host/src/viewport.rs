use lumen_compose::ViewportConfig;
use lumen_render::{PerspectiveCamera, Renderer};

/// Highest device pixel ratio the renderer is asked to honour.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Window size as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Ratio handed to the renderer: the device ratio, capped.
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Record new window metrics. Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> bool {
        let next = Self::new(width, height, device_pixel_ratio);
        let changed = next != *self;
        *self = next;
        changed
    }

    /// Push the current size to the camera projection and the renderer.
    pub fn apply(&self, camera: &mut PerspectiveCamera, renderer: &mut dyn Renderer) {
        camera.aspect = self.aspect();
        renderer.set_size(self.width, self.height);
        renderer.set_pixel_ratio(self.pixel_ratio());
    }
}

impl From<ViewportConfig> for Viewport {
    fn from(config: ViewportConfig) -> Self {
        Self::new(config.width, config.height, config.device_pixel_ratio)
    }
}
