//! Keyboard and mouse state.
//!
//! Raw winit events are mapped to [`Action`]s once, so the rest of the app
//! never looks at key codes. Tracks both instantaneous events (pressed this
//! frame) and continuous state (held down).
//!
//! | Key | Action |
//! |-----|--------|
//! | W / S | forward / back |
//! | D / A | right / left |
//! | E / Q | up / down |
//! | H | toggle mouse look |
//! | T | push particles away from the camera (held) |
//! | X / U | grow / shrink box X |
//! | Z / V | grow / shrink box Z |
//! | Escape | exit |

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::math::{Vec2, Vec3};

/// Box size change per frame while a resize key is held.
pub const BOX_RESIZE_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Right,
    Left,
    Up,
    Down,
    ToggleMouseLook,
    Impulse,
    GrowBoxX,
    ShrinkBoxX,
    GrowBoxZ,
    ShrinkBoxZ,
    Exit,
}

impl Action {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let action = match key {
            KeyCode::KeyW => Action::Forward,
            KeyCode::KeyS => Action::Back,
            KeyCode::KeyD => Action::Right,
            KeyCode::KeyA => Action::Left,
            KeyCode::KeyE => Action::Up,
            KeyCode::KeyQ => Action::Down,
            KeyCode::KeyH => Action::ToggleMouseLook,
            KeyCode::KeyT => Action::Impulse,
            KeyCode::KeyX => Action::GrowBoxX,
            KeyCode::KeyU => Action::ShrinkBoxX,
            KeyCode::KeyZ => Action::GrowBoxZ,
            KeyCode::KeyV => Action::ShrinkBoxZ,
            KeyCode::Escape => Action::Exit,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Default)]
pub struct Input {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    mouse_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Just went down this frame. Key repeat does not count.
    pub fn pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    pub fn held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Raw mouse motion accumulated this frame, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Clears per-frame state. Call once per frame after consuming input.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Drops all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        let Some(action) = Action::from_key(key) else {
            return;
        };
        match state {
            ElementState::Pressed => {
                if self.held.insert(action) {
                    self.pressed.insert(action);
                }
            }
            ElementState::Released => {
                self.held.remove(&action);
            }
        }
    }

    pub fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta += Vec2::new(dx as f32, dy as f32);
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state);
                }
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    fn axis(&self, positive: Action, negative: Action) -> f32 {
        self.held(positive) as i32 as f32 - self.held(negative) as i32 as f32
    }

    /// Camera movement input: x right, y up, z forward, each in `-1..=1`.
    pub fn movement_axes(&self) -> Vec3 {
        Vec3::new(
            self.axis(Action::Right, Action::Left),
            self.axis(Action::Up, Action::Down),
            self.axis(Action::Forward, Action::Back),
        )
    }

    /// Per-axis box size change for this frame.
    pub fn box_resize(&self) -> [f32; 3] {
        [
            self.axis(Action::GrowBoxX, Action::ShrinkBoxX) * BOX_RESIZE_STEP,
            0.0,
            self.axis(Action::GrowBoxZ, Action::ShrinkBoxZ) * BOX_RESIZE_STEP,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();
        assert!(!input.held(Action::Impulse));

        input.handle_key(KeyCode::KeyT, ElementState::Pressed);
        assert!(input.held(Action::Impulse));
        assert!(input.pressed(Action::Impulse));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.held(Action::Impulse));
        assert!(!input.pressed(Action::Impulse));

        // Repeat events do not re-fire pressed
        input.handle_key(KeyCode::KeyT, ElementState::Pressed);
        assert!(!input.pressed(Action::Impulse));

        input.handle_key(KeyCode::KeyT, ElementState::Released);
        assert!(!input.held(Action::Impulse));
    }

    #[test]
    fn test_movement_axes() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyW, ElementState::Pressed);
        input.handle_key(KeyCode::KeyA, ElementState::Pressed);
        input.handle_key(KeyCode::KeyE, ElementState::Pressed);
        input.handle_key(KeyCode::KeyQ, ElementState::Pressed);
        assert_eq!(input.movement_axes(), Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn test_box_resize_keys() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyX, ElementState::Pressed);
        input.handle_key(KeyCode::KeyV, ElementState::Pressed);
        assert_eq!(input.box_resize(), [BOX_RESIZE_STEP, 0.0, -BOX_RESIZE_STEP]);
    }

    #[test]
    fn test_mouse_delta_accumulates_until_frame_end() {
        let mut input = Input::new();
        input.handle_mouse_motion(3.0, -1.0);
        input.handle_mouse_motion(2.0, 4.0);
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyP, ElementState::Pressed);
        assert_eq!(input.movement_axes(), Vec3::ZERO);
    }
}
