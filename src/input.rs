use std::collections::HashSet;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::render::pipeline::DrawMode;

pub const CLOSE_KEY: KeyCode = KeyCode::Escape;
pub const DRAW_MODE_KEY: KeyCode = KeyCode::KeyM;

/// Physical key state fed from window events and consumed once per frame.
///
/// `held` mirrors the keys that are down right now. `pressed` latches every
/// fresh press since the last frame, so a tap released before the next
/// redraw is still seen. Repeat events for a key already held are not fresh
/// presses.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.held.insert(key) {
                    self.pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Whether `key` went down since the last [`KeyboardState::end_frame`].
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Drops the presses latched for the frame that just consumed them.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Forget every held key, e.g. when the window loses focus and the
    /// release events will never arrive.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

/// What the keyboard asked for during one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    pub close_requested: bool,
    pub draw_mode_changed: bool,
}

/// Per-demo key bindings: Escape closes, `M` flips the draw mode when the
/// demo enables it.
#[derive(Debug, Clone)]
pub struct Controls {
    draw_mode_toggle: bool,
    draw_mode: DrawMode,
}

impl Controls {
    pub fn new(draw_mode_toggle: bool) -> Self {
        Self {
            draw_mode_toggle,
            draw_mode: DrawMode::Fill,
        }
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Reads one frame of input and consumes the latched presses.
    ///
    /// The draw mode flips once per fresh press of the toggle key, however
    /// many frames it stays held.
    pub fn process(&mut self, keys: &mut KeyboardState) -> FrameInput {
        let mut input = FrameInput {
            close_requested: keys.is_held(CLOSE_KEY) || keys.was_pressed(CLOSE_KEY),
            ..FrameInput::default()
        };

        if self.draw_mode_toggle && keys.was_pressed(DRAW_MODE_KEY) {
            self.draw_mode = self.draw_mode.toggled();
            input.draw_mode_changed = true;
        }

        keys.end_frame();
        input
    }
}
