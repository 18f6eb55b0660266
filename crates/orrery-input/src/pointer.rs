//! Frame-coherent pointer state.
//!
//! [`PointerState`] accumulates winit pointer events between frames. The
//! cursor offset persists across frames; drag and scroll deltas are cleared
//! by [`clear_transients`](PointerState::clear_transients) at the end of each
//! frame.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll counted as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct PointerState {
    position: Vec2,
    window_size: Vec2,
    cursor: Vec2,
    drag: Vec2,
    scroll: f32,
    dragging: bool,
    cursor_in_window: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            window_size: Vec2::ONE,
            cursor: Vec2::ZERO,
            drag: Vec2::ZERO,
            scroll: 0.0,
            dragging: false,
            cursor_in_window: false,
        }
    }

    /// Record the window's inner size in the same units as cursor events.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.cursor = self.normalise(self.position);
    }

    /// Process a `CursorMoved` event.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if self.dragging {
            self.drag += new_pos - self.position;
        }
        self.position = new_pos;
        self.cursor = self.normalise(new_pos);
    }

    /// Process a `MouseInput` event. The left button drives dragging.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    /// Process a `MouseWheel` event.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    /// The cursor offset keeps its last value after leaving the window.
    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.dragging = false;
    }

    /// Clears drag and scroll accumulated this frame.
    pub fn clear_transients(&mut self) {
        self.drag = Vec2::ZERO;
        self.scroll = 0.0;
    }

    fn normalise(&self, pos: Vec2) -> Vec2 {
        (pos / self.window_size - Vec2::splat(0.5)).clamp(Vec2::splat(-0.5), Vec2::splat(0.5))
    }

    /// Cursor offset from the window centre, each axis in `[-0.5, 0.5]`.
    /// Y grows downward, as in window coordinates.
    #[must_use]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor position in window pixels.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement while the left button was held, since the last clear.
    #[must_use]
    pub fn drag_delta(&self) -> Vec2 {
        self.drag
    }

    /// Wheel lines since the last clear (positive = scroll up).
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn sized(w: u32, h: u32) -> PointerState {
        let mut p = PointerState::new();
        p.set_window_size(w, h);
        p
    }

    #[test]
    fn test_centre_is_zero() {
        let mut p = sized(800, 600);
        p.on_cursor_moved(400.0, 300.0);
        assert_eq!(p.cursor(), Vec2::ZERO);
    }

    #[test]
    fn test_corners_are_half() {
        let mut p = sized(800, 600);
        p.on_cursor_moved(0.0, 0.0);
        assert_eq!(p.cursor(), Vec2::new(-0.5, -0.5));
        p.on_cursor_moved(800.0, 600.0);
        assert_eq!(p.cursor(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_outside_window_is_clamped() {
        let mut p = sized(100, 100);
        p.on_cursor_moved(-50.0, 250.0);
        assert_eq!(p.cursor(), Vec2::new(-0.5, 0.5));
    }

    #[test]
    fn test_resize_renormalises() {
        let mut p = sized(100, 100);
        p.on_cursor_moved(100.0, 50.0);
        assert_eq!(p.cursor().x, 0.5);
        p.set_window_size(200, 100);
        assert_eq!(p.cursor().x, 0.0);
    }

    #[test]
    fn test_zero_size_window_does_not_divide_by_zero() {
        let mut p = sized(0, 0);
        p.on_cursor_moved(0.0, 0.0);
        assert!(p.cursor().is_finite());
    }

    #[test]
    fn test_drag_only_while_pressed() {
        let mut p = sized(800, 600);
        p.on_cursor_moved(10.0, 10.0);
        p.on_cursor_moved(20.0, 10.0);
        assert_eq!(p.drag_delta(), Vec2::ZERO);

        p.on_button(MouseButton::Left, ElementState::Pressed);
        p.on_cursor_moved(30.0, 5.0);
        assert_eq!(p.drag_delta(), Vec2::new(10.0, -5.0));

        p.on_button(MouseButton::Left, ElementState::Released);
        p.on_cursor_moved(90.0, 90.0);
        assert_eq!(p.drag_delta(), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let mut p = sized(800, 600);
        p.on_button(MouseButton::Right, ElementState::Pressed);
        assert!(!p.is_dragging());
    }

    #[test]
    fn test_scroll_accumulates_and_clears() {
        let mut p = PointerState::new();
        p.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        p.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 20.0)));
        assert!((p.scroll() - 1.5).abs() < f32::EPSILON);
        p.clear_transients();
        assert_eq!(p.scroll(), 0.0);
    }

    #[test]
    fn test_clear_keeps_cursor() {
        let mut p = sized(100, 100);
        p.on_cursor_moved(75.0, 25.0);
        p.clear_transients();
        assert_eq!(p.cursor(), Vec2::new(0.25, -0.25));
    }

    #[test]
    fn test_leaving_window_ends_drag() {
        let mut p = sized(100, 100);
        p.on_cursor_entered();
        p.on_button(MouseButton::Left, ElementState::Pressed);
        p.on_cursor_left();
        assert!(!p.is_dragging());
        assert!(!p.is_cursor_in_window());
    }
}
