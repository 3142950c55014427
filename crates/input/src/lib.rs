//! Pointer input for the orbit camera.
//!
//! Window events are reduced to a small [`PointerEvent`] vocabulary in browser conventions:
//! screen coordinates in pixels, positive wheel delta means "scroll down / zoom out".

use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{MouseScrollDelta, WindowEvent};

/// Scroll units reported per wheel notch, matching a browser's line-mode wheel events.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// Host-independent pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Wheel { delta_y: f32 },
    Resize { width: u32, height: u32 },
}

/// Turns window events into [`PointerEvent`]s.
///
/// Button events carry no position, so the translator remembers the last cursor position and
/// stamps it on presses.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    /// Cursor position in window coordinates.
    cursor: Vec2,
    /// Whether the left button is currently held.
    left_held: bool,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in window coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.left_held
    }

    /// Translate one window event. Events the camera does not care about yield `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(self.process_cursor_position(*position)),
            WindowEvent::MouseInput { state, button, .. } => self.process_mouse_button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => Some(self.process_scroll(*delta)),
            WindowEvent::Resized(size) => Some(self.process_resize(*size)),
            _ => None,
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: PhysicalPosition<f64>) -> PointerEvent {
        self.cursor = Vec2::new(position.x as f32, position.y as f32);
        PointerEvent::Move {
            x: self.cursor.x,
            y: self.cursor.y,
        }
    }

    /// Only the left button drives the camera.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.left_held = true;
                Some(PointerEvent::Down {
                    x: self.cursor.x,
                    y: self.cursor.y,
                })
            }
            ElementState::Released => {
                self.left_held = false;
                Some(PointerEvent::Up)
            }
        }
    }

    /// Wheel deltas arrive with "up is positive"; flip them to scroll units.
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) -> PointerEvent {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -lines * PIXELS_PER_LINE,
            MouseScrollDelta::PixelDelta(pixels) => -(pixels.y as f32),
        };
        PointerEvent::Wheel { delta_y }
    }

    pub fn process_resize(&mut self, size: PhysicalSize<u32>) -> PointerEvent {
        log::trace!("Viewport resized to {}x{}", size.width, size.height);
        PointerEvent::Resize {
            width: size.width,
            height: size.height,
        }
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_stamped_with_last_cursor_position() {
        let mut input = PointerTranslator::new();
        input.process_cursor_position(PhysicalPosition::new(120.0, 48.5));
        assert_eq!(
            input.process_mouse_button(MouseButton::Left, ElementState::Pressed),
            Some(PointerEvent::Down { x: 120.0, y: 48.5 })
        );
        assert!(input.is_dragging());
        assert_eq!(
            input.process_mouse_button(MouseButton::Left, ElementState::Released),
            Some(PointerEvent::Up)
        );
        assert!(!input.is_dragging());
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut input = PointerTranslator::new();
        assert_eq!(input.process_mouse_button(MouseButton::Right, ElementState::Pressed), None);
        assert!(!input.is_dragging());
    }

    #[test]
    fn wheel_notch_down_zooms_out() {
        let mut input = PointerTranslator::new();
        assert_eq!(
            input.process_scroll(MouseScrollDelta::LineDelta(0.0, -1.0)),
            PointerEvent::Wheel { delta_y: 100.0 }
        );
        assert_eq!(
            input.process_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 30.0))),
            PointerEvent::Wheel { delta_y: -30.0 }
        );
    }

    #[test]
    fn resize_passes_size_through() {
        let mut input = PointerTranslator::new();
        assert_eq!(
            input.process_resize(PhysicalSize::new(800, 600)),
            PointerEvent::Resize { width: 800, height: 600 }
        );
    }
}
