//! Window-size bookkeeping and device pixel ratio clamping.
//!
//! winit reports physical sizes at the display's full scale factor. The render
//! target is sized at `logical × min(scale_factor, max_pixel_ratio)` so very
//! dense displays do not quadruple fragment work.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

/// Produced when the window size or scale factor changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    /// Window size as reported by the platform.
    pub window: PhysicalSize,
    /// Size to configure the GPU surface and depth buffer with.
    pub render: PhysicalSize,
    /// Effective device pixel ratio after clamping.
    pub pixel_ratio: f64,
}

impl SurfaceResizeEvent {
    pub fn aspect_ratio(&self) -> f32 {
        self.render.width as f32 / self.render.height as f32
    }
}

pub struct SurfaceWrapper {
    window_width: u32,
    window_height: u32,
    scale_factor: f64,
    max_pixel_ratio: f64,
    configured: bool,
}

/// `scale_factor` clamped to `(0, max_pixel_ratio]`.
pub fn clamp_pixel_ratio(scale_factor: f64, max_pixel_ratio: f64) -> f64 {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    if max_pixel_ratio.is_finite() && max_pixel_ratio > 0.0 {
        scale.min(max_pixel_ratio)
    } else {
        scale
    }
}

impl SurfaceWrapper {
    /// Zero initial dimensions (Wayland before the first configure) are clamped
    /// to 1 and leave the wrapper unconfigured.
    pub fn new(window_width: u32, window_height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let has_valid_size = window_width > 0 && window_height > 0;
        Self {
            window_width: window_width.max(MIN_SURFACE_DIMENSION),
            window_height: window_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
            max_pixel_ratio,
            configured: has_valid_size,
        }
    }

    /// Returns an event only if the window dimensions actually changed.
    pub fn handle_resize(&mut self, window_width: u32, window_height: u32) -> Option<SurfaceResizeEvent> {
        let width = window_width.max(MIN_SURFACE_DIMENSION);
        let height = window_height.max(MIN_SURFACE_DIMENSION);

        if width == self.window_width && height == self.window_height && self.configured {
            return None;
        }

        self.window_width = width;
        self.window_height = height;
        self.configured = true;
        Some(self.event())
    }

    /// Always returns an event: the render size depends on the scale factor
    /// even when the window size does not change.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        window_width: u32,
        window_height: u32,
    ) -> SurfaceResizeEvent {
        self.scale_factor = scale_factor;
        self.window_width = window_width.max(MIN_SURFACE_DIMENSION);
        self.window_height = window_height.max(MIN_SURFACE_DIMENSION);
        self.configured = true;
        self.event()
    }

    pub fn event(&self) -> SurfaceResizeEvent {
        SurfaceResizeEvent {
            window: self.window_size(),
            render: self.render_size(),
            pixel_ratio: self.pixel_ratio(),
        }
    }

    pub fn window_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.window_width,
            height: self.window_height,
        }
    }

    pub fn render_size(&self) -> PhysicalSize {
        let ratio = self.pixel_ratio();
        let scale = self.effective_scale();
        let width = (self.window_width as f64 / scale * ratio).round() as u32;
        let height = (self.window_height as f64 / scale * ratio).round() as u32;
        PhysicalSize {
            width: width.max(MIN_SURFACE_DIMENSION),
            height: height.max(MIN_SURFACE_DIMENSION),
        }
    }

    pub fn pixel_ratio(&self) -> f64 {
        clamp_pixel_ratio(self.scale_factor, self.max_pixel_ratio)
    }

    pub fn logical_width(&self) -> f64 {
        self.window_width as f64 / self.effective_scale()
    }

    pub fn logical_height(&self) -> f64 {
        self.window_height as f64 / self.effective_scale()
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    fn effective_scale(&self) -> f64 {
        clamp_pixel_ratio(self.scale_factor, f64::INFINITY)
    }
}
