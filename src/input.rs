//! Input mapping from raw events to camera axes and semantic actions
//!
//! Movement and roll keys are accumulated into a per-frame [`CameraInput`];
//! special keys (Escape, F) map to one-shot [`InputAction`]s.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use tetra4d_render::CameraInput;

/// Actions triggered by special input (not movement)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Toggle cursor capture (Escape when captured, click when released)
    ToggleCursor,
    /// Exit application (Escape when not captured)
    Exit,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
}

/// Maps special keys and mouse buttons to semantic actions.
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for special keys, `None` for movement keys
    pub fn map_keyboard(
        key: KeyCode,
        state: ElementState,
        cursor_captured: bool,
    ) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }
        match key {
            KeyCode::Escape => {
                if cursor_captured {
                    Some(InputAction::ToggleCursor)
                } else {
                    Some(InputAction::Exit)
                }
            }
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            _ => None,
        }
    }

    /// Map mouse button to an action
    pub fn map_mouse_button(
        button: MouseButton,
        state: ElementState,
        cursor_captured: bool,
    ) -> Option<InputAction> {
        if button == MouseButton::Left && state == ElementState::Pressed && !cursor_captured {
            Some(InputAction::ToggleCursor)
        } else {
            None
        }
    }
}

/// Tracks held movement keys and accumulates mouse deltas between frames.
///
/// WASD moves in the camera's horizontal slice, Q/E rolls the view in the
/// ZW plane, the mouse drives XZ/YZ look.
#[derive(Debug, Default)]
pub struct InputState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    roll_neg: bool,
    roll_pos: bool,
    mouse_dx: f32,
    mouse_dy: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a movement key. Returns false for keys this state ignores.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.back = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            KeyCode::KeyQ => self.roll_neg = pressed,
            KeyCode::KeyE => self.roll_pos = pressed,
            _ => return false,
        }
        true
    }

    /// Accumulate raw mouse motion; drained by [`InputState::frame_input`].
    pub fn process_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_dx += dx as f32;
        self.mouse_dy += dy as f32;
    }

    /// Axes for this frame. Mouse look only applies while the cursor is
    /// captured, but the accumulated deltas are always drained.
    pub fn frame_input(&mut self, cursor_captured: bool) -> CameraInput {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        let (look_dx, look_dy) = if cursor_captured {
            // Mouse up should look up
            (self.mouse_dx, -self.mouse_dy)
        } else {
            (0.0, 0.0)
        };
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        CameraInput {
            move_right: axis(self.left, self.right),
            move_forward: axis(self.back, self.forward),
            look_dx,
            look_dy,
            roll_zw: axis(self.roll_neg, self.roll_pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_when_captured_releases() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed, true);
        assert_eq!(action, Some(InputAction::ToggleCursor));
    }

    #[test]
    fn test_escape_when_released_exits() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed, false);
        assert_eq!(action, Some(InputAction::Exit));
    }

    #[test]
    fn test_movement_keys_not_mapped_to_actions() {
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD] {
            let action = InputMapper::map_keyboard(key, ElementState::Pressed, true);
            assert_eq!(action, None, "Key {:?} should not be mapped", key);
        }
    }

    #[test]
    fn test_click_to_capture() {
        let action = InputMapper::map_mouse_button(MouseButton::Left, ElementState::Pressed, false);
        assert_eq!(action, Some(InputAction::ToggleCursor));
        let action = InputMapper::map_mouse_button(MouseButton::Left, ElementState::Pressed, true);
        assert_eq!(action, None);
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyS, ElementState::Pressed);
        assert_eq!(input.frame_input(true).move_forward, 0.0);
    }

    #[test]
    fn test_mouse_deltas_drain_each_frame() {
        let mut input = InputState::new();
        input.process_mouse_motion(10.0, -4.0);
        let frame = input.frame_input(true);
        assert_eq!(frame.look_dx, 10.0);
        assert_eq!(frame.look_dy, 4.0);
        assert_eq!(input.frame_input(true).look_dx, 0.0);
    }

    #[test]
    fn test_uncaptured_mouse_is_discarded() {
        let mut input = InputState::new();
        input.process_mouse_motion(10.0, 10.0);
        let frame = input.frame_input(false);
        assert_eq!(frame.look_dx, 0.0);
        // drained even when ignored
        assert_eq!(input.frame_input(true).look_dx, 0.0);
    }

    #[test]
    fn test_key_release_stops_movement() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        assert_eq!(input.frame_input(true).move_right, 1.0);
        input.process_keyboard(KeyCode::KeyD, ElementState::Released);
        assert_eq!(input.frame_input(true).move_right, 0.0);
    }
}
