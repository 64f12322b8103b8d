use winit::keyboard::{KeyCode, PhysicalKey};

use crate::animation::PlaybackState;
use crate::render::OrbitInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Playback(PlaybackState),
    Deselect,
    ApplyGlassPreset,
    ToggleSettings,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub orbit_up: bool,
    pub orbit_down: bool,
}

impl InputState {
    /// Track held orbit keys; shortcut keys yield an action on press.
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> Option<InputAction> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::ArrowLeft => self.orbit_left = pressed,
            KeyCode::ArrowRight => self.orbit_right = pressed,
            KeyCode::ArrowUp => self.orbit_up = pressed,
            KeyCode::ArrowDown => self.orbit_down = pressed,
            _ if pressed => return shortcut(code),
            _ => {}
        }
        None
    }

    pub fn orbit(&self) -> OrbitInput {
        OrbitInput {
            orbit_left: self.orbit_left,
            orbit_right: self.orbit_right,
            orbit_up: self.orbit_up,
            orbit_down: self.orbit_down,
        }
    }
}

fn shortcut(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyO => Some(InputAction::Playback(PlaybackState::Open)),
        KeyCode::KeyC => Some(InputAction::Playback(PlaybackState::Close)),
        KeyCode::Space => Some(InputAction::Playback(PlaybackState::Pause)),
        KeyCode::Escape => Some(InputAction::Deselect),
        KeyCode::KeyG => Some(InputAction::ApplyGlassPreset),
        KeyCode::Tab => Some(InputAction::ToggleSettings),
        _ => None,
    }
}
