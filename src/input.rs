use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw held state of every control, as written by the keyboard system or by a
/// scripted simulation.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeldControls {
    pub x: f32,
    pub jump: bool,
    pub attack: bool,
    pub block: bool,
    pub special: bool,
    pub crouch: bool,
    pub analog_down: bool,
}

/// Per-tick input snapshot handed to the simulation core.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlSignals {
    /// Horizontal axis in [-1, 1].
    pub x: f32,
    pub jump: bool,
    pub block: bool,
    pub special: bool,
    pub crouch: bool,
    pub analog_down: bool,
    pub attack: bool,
    pub attack_pressed: bool,
    pub attack_released: bool,
}

/// Derives the attack edges from consecutive held samples.
#[derive(Clone, Debug, Default)]
pub struct ControlTracker {
    attack_was_held: bool,
}

impl ControlTracker {
    pub fn sample(&mut self, held: &HeldControls) -> ControlSignals {
        let attack_pressed = held.attack && !self.attack_was_held;
        let attack_released = !held.attack && self.attack_was_held;
        self.attack_was_held = held.attack;
        ControlSignals {
            x: held.x.clamp(-1.0, 1.0),
            jump: held.jump,
            block: held.block,
            special: held.special,
            crouch: held.crouch,
            analog_down: held.analog_down,
            attack: held.attack,
            attack_pressed,
            attack_released,
        }
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeldControls::default()).add_systems(
            PreUpdate,
            keyboard_to_held.run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
    }
}

fn any_pressed(keyboard: &ButtonInput<KeyCode>, keys: &[KeyCode]) -> bool {
    keys.iter().any(|k| keyboard.pressed(*k))
}

/// Translate keyboard state into held controls
pub fn keyboard_to_held(keyboard: Res<ButtonInput<KeyCode>>, mut held: ResMut<HeldControls>) {
    let mut x = 0.0;
    if any_pressed(&keyboard, &[KeyCode::ArrowLeft, KeyCode::KeyA]) {
        x = -1.0;
    }
    // Right wins when both directions are held.
    if any_pressed(&keyboard, &[KeyCode::ArrowRight, KeyCode::KeyD]) {
        x = 1.0;
    }

    let crouch = any_pressed(&keyboard, &[KeyCode::ArrowDown, KeyCode::KeyS]);
    *held = HeldControls {
        x,
        jump: any_pressed(&keyboard, &[KeyCode::Space, KeyCode::ArrowUp, KeyCode::KeyW]),
        attack: any_pressed(&keyboard, &[KeyCode::KeyX, KeyCode::KeyJ]),
        block: any_pressed(&keyboard, &[KeyCode::KeyC, KeyCode::KeyK]),
        special: any_pressed(&keyboard, &[KeyCode::KeyV, KeyCode::KeyL]),
        crouch,
        analog_down: crouch,
    };
}
