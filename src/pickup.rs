use serde::Serialize;

use crate::animation::COIN;
use crate::config::WeaponKind;
use crate::entity::Body;
use crate::geometry::Rect;

const WEAPON_PICKUP_SIZE: f32 = 50.0;
const COIN_SIZE: f32 = 30.0;
const COIN_LAUNCH_VY: f32 = -5.0;
const COIN_GRAVITY_SCALE: f32 = 0.3;
const COIN_SPIN_PER_TICK: f32 = 2.0;
const FLOAT_SPEED: f32 = 3.0;
const FLOAT_AMPLITUDE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickupKind {
    Weapon { weapon: WeaponKind },
    Points { value: f32 },
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub body: Body,
    pub kind: PickupKind,
    pub rotation: f32,
    float_phase: f32,
    pub float_offset: f32,
}

impl Pickup {
    pub fn weapon(x: f32, y: f32, weapon: WeaponKind) -> Self {
        Self {
            body: Body::new(x, y, WEAPON_PICKUP_SIZE, WEAPON_PICKUP_SIZE),
            kind: PickupKind::Weapon { weapon },
            rotation: 0.0,
            float_phase: 0.0,
            float_offset: 0.0,
        }
    }

    /// A coin that drops to the floor and bobs. `float_phase` desynchronises
    /// neighbouring coins.
    pub fn coin(x: f32, y: f32, value: f32, float_phase: f32) -> Self {
        let mut body = Body::new(x, y, COIN_SIZE, COIN_SIZE);
        body.vy = COIN_LAUNCH_VY;
        body.animator.play(COIN, 1.0, false);
        Self {
            body,
            kind: PickupKind::Points { value },
            rotation: 0.0,
            float_phase,
            float_offset: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, gravity: f32) {
        if !matches!(self.kind, PickupKind::Points { .. }) {
            return;
        }
        let body = &mut self.body;
        if !body.grounded {
            body.vy -= gravity * COIN_GRAVITY_SCALE;
            body.y += body.vy;
            if body.y <= 0.0 {
                body.y = 0.0;
                body.vy = 0.0;
                body.grounded = true;
            }
        }
        self.rotation = (self.rotation + COIN_SPIN_PER_TICK) % 360.0;
        self.float_phase += dt * FLOAT_SPEED;
        self.float_offset = self.float_phase.sin() * FLOAT_AMPLITUDE;
    }

    /// Whole sprite, following the bob so the visual and the hitbox agree.
    pub fn hitbox(&self) -> Rect {
        let b = &self.body;
        Rect::new(b.x, b.y + self.float_offset, b.width, b.height)
    }

    pub fn is_expired(&self) -> bool {
        self.body.marked_for_deletion
    }
}
