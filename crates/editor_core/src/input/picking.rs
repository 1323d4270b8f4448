//! Pointer state for picking operations
//!
//! Provides conversion from screen-space pixel coordinates to normalized
//! device coordinates for ray casting, plus the per-poll pointer delta.

/// Pointer position and movement, updated once per input poll
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Current screen-space X position (pixels from left)
    pub screen_x: f64,
    /// Current screen-space Y position (pixels from top)
    pub screen_y: f64,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    previous: (f64, f64),
}

impl PointerState {
    /// Create a pointer state centered in the viewport
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let center = (
            f64::from(viewport_width) * 0.5,
            f64::from(viewport_height) * 0.5,
        );
        Self {
            screen_x: center.0,
            screen_y: center.1,
            viewport_width,
            viewport_height,
            previous: center,
        }
    }

    /// Convert the pointer position to normalized device coordinates.
    ///
    /// X: -1 = left, +1 = right. Y: -1 = bottom, +1 = top.
    pub fn screen_to_ndc(&self) -> (f32, f32) {
        let width = f64::from(self.viewport_width.max(1));
        let height = f64::from(self.viewport_height.max(1));
        let ndc_x = (self.screen_x / width) as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / height) as f32 * 2.0;
        (ndc_x, ndc_y)
    }

    /// Move the pointer to a new screen position
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Set the pointer from normalized device coordinates
    pub fn set_ndc(&mut self, ndc_x: f32, ndc_y: f32) {
        let width = f64::from(self.viewport_width);
        let height = f64::from(self.viewport_height);
        self.screen_x = (f64::from(ndc_x) + 1.0) * 0.5 * width;
        self.screen_y = (1.0 - f64::from(ndc_y)) * 0.5 * height;
    }

    /// Update viewport size (for NDC conversion)
    pub fn update_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Movement in pixels since the last [`PointerState::end_poll`]
    pub fn delta(&self) -> (f64, f64) {
        (self.screen_x - self.previous.0, self.screen_y - self.previous.1)
    }

    /// Close the current poll; the next delta is measured from here
    pub fn end_poll(&mut self) {
        self.previous = (self.screen_x, self.screen_y);
    }

    /// Viewport width / height
    pub fn aspect(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height.max(1) as f32
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
