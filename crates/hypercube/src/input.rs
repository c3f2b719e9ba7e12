//! Keyboard state and the game's key map.

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::game::rotation::TurnAxis;
use crate::model::DrawMode;

/// Held keys plus the keys that went down since the last `end_frame`.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
}

impl InputState {
    /// Returns `true` for keyboard events.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return false;
        };
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };

        match event.state {
            ElementState::Pressed if !event.repeat => self.press(code),
            ElementState::Pressed => {}
            ElementState::Released => self.release(code),
        }
        true
    }

    pub fn press(&mut self, code: KeyCode) {
        if self.held.insert(code) {
            self.pressed.insert(code);
        }
    }

    pub fn release(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    #[inline]
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Went down this frame.
    #[inline]
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

const TURN_KEYS: [(KeyCode, TurnAxis); 6] = [
    (KeyCode::KeyI, TurnAxis::PosX),
    (KeyCode::KeyK, TurnAxis::NegX),
    (KeyCode::KeyJ, TurnAxis::PosY),
    (KeyCode::KeyL, TurnAxis::NegY),
    (KeyCode::KeyU, TurnAxis::PosZ),
    (KeyCode::KeyO, TurnAxis::NegZ),
];

/// What the puzzle reads from the keyboard each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameInput {
    /// First turn key pressed this frame.
    pub turn: Option<TurnAxis>,
    /// Speed boost held.
    pub boost: bool,
    /// Restart prompt answer: `Some(true)` for yes.
    pub answer: Option<bool>,
}

impl GameInput {
    pub fn from_input(input: &InputState) -> Self {
        let turn = TURN_KEYS
            .iter()
            .find(|(key, _)| input.was_pressed(*key))
            .map(|&(_, axis)| axis);

        let answer = if input.was_pressed(KeyCode::KeyY) {
            Some(true)
        } else if input.was_pressed(KeyCode::KeyN) {
            Some(false)
        } else {
            None
        };

        Self {
            turn,
            boost: input.is_held(KeyCode::Space),
            answer,
        }
    }
}

/// One-shot toggles outside the puzzle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleShadows,
    ToggleTextures,
    SetDrawMode(DrawMode),
    Quit,
}

pub fn commands(input: &InputState) -> Vec<Command> {
    [
        (KeyCode::KeyB, Command::ToggleShadows),
        (KeyCode::KeyX, Command::ToggleTextures),
        (KeyCode::Digit1, Command::SetDrawMode(DrawMode::Triangles)),
        (KeyCode::Digit2, Command::SetDrawMode(DrawMode::Lines)),
        (KeyCode::Digit3, Command::SetDrawMode(DrawMode::Points)),
        (KeyCode::Escape, Command::Quit),
    ]
    .into_iter()
    .filter(|(key, _)| input.was_pressed(*key))
    .map(|(_, cmd)| cmd)
    .collect()
}
