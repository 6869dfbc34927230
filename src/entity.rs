use crate::animation::Animator;
use crate::events::RewardSink;
use crate::geometry::{lerp, Rect};
use crate::physics_core::{apply_gravity, find_ground, find_landing};

/// Lerp factor applied to the hitbox shape each tick.
const HITBOX_SMOOTHING: f32 = 0.3;
/// How long a knockback keeps control away from the body.
pub const KNOCKBACK_DURATION: f32 = 0.3;
/// Upward pop given to a grounded body when it is knocked back.
const KNOCKBACK_LIFT: f32 = 5.0;

/// Smoothed damage-receiving box, stored as size plus absolute bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
struct HitboxShape {
    width: f32,
    height: f32,
    y: f32,
}

/// Shared physical state of every actor: position, velocity, facing and the
/// flags the rest of the world reads.
#[derive(Clone, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    /// +1 faces right, -1 faces left.
    pub direction: f32,
    pub grounded: bool,
    pub paralyzed: bool,
    pub knocked_back: bool,
    knockback_timer: f32,
    pub marked_for_deletion: bool,
    pub animator: Animator,
    hitbox: HitboxShape,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut body = Self {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            direction: 1.0,
            grounded: false,
            paralyzed: false,
            knocked_back: false,
            knockback_timer: 0.0,
            marked_for_deletion: false,
            animator: Animator::default(),
            hitbox: HitboxShape {
                width: 0.0,
                height: 0.0,
                y,
            },
        };
        body.hitbox = body.hitbox_target(false);
        body
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    /// One physics step: horizontal motion, ground probe, gravity, vertical
    /// motion, then landing resolution.
    pub fn update_physics(&mut self, platforms: &[Rect], gravity: f32) {
        // Knockback motion is driven by `tick_knockback`.
        if !self.knocked_back {
            self.x += self.vx;
        }

        self.check_grounded(platforms);
        apply_gravity(&mut self.vy, self.grounded, gravity);

        let previous_y = self.y;
        self.y += self.vy;
        self.handle_platform_collisions(previous_y, platforms);
    }

    fn check_grounded(&mut self, platforms: &[Rect]) {
        self.grounded = false;
        if let Some(surface) = find_ground(&self.bounds(), self.vy, platforms) {
            self.y = surface;
            self.vy = 0.0;
            self.grounded = true;
            self.knocked_back = false;
        }
    }

    fn handle_platform_collisions(&mut self, previous_y: f32, platforms: &[Rect]) {
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = 0.0;
            self.grounded = true;
        }
        if let Some(top) = find_landing(&self.bounds(), previous_y, self.vy, platforms) {
            self.y = top;
            self.vy = 0.0;
            self.grounded = true;
        }
    }

    /// Physics plus animation. A paralysed body does neither.
    pub fn update(&mut self, dt: f32, platforms: &[Rect], gravity: f32) {
        if self.paralyzed {
            return;
        }
        self.update_physics(platforms, gravity);
        self.animator.advance(dt);
    }

    /// Ignored while a knockback is already in progress.
    pub fn apply_knockback(&mut self, direction: f32, force: f32) {
        if self.knocked_back {
            return;
        }
        self.knocked_back = true;
        self.knockback_timer = KNOCKBACK_DURATION;
        self.vx = direction * force;
        if self.grounded {
            self.vy = KNOCKBACK_LIFT;
            self.grounded = false;
        }
    }

    /// Advances the knockback window: the body slides with its knockback
    /// velocity until the window closes, then keeps half of it.
    pub fn tick_knockback(&mut self, dt: f32) {
        if self.knockback_timer <= 0.0 {
            return;
        }
        if self.knocked_back {
            self.x += self.vx;
        }
        self.knockback_timer -= dt;
        if self.knockback_timer <= 0.0 {
            self.knockback_timer = 0.0;
            self.knocked_back = false;
            self.vx *= 0.5;
        }
    }

    fn hitbox_target(&self, crouching: bool) -> HitboxShape {
        HitboxShape {
            width: self.width * 0.1,
            height: self.height * if crouching { 0.2 } else { 0.3 },
            y: self.y + self.height * 0.1,
        }
    }

    /// Eases the hitbox toward its target shape. Called once per tick.
    pub fn refresh_hitbox(&mut self, crouching: bool) {
        let target = self.hitbox_target(crouching);
        self.hitbox = HitboxShape {
            width: lerp(self.hitbox.width, target.width, HITBOX_SMOOTHING),
            height: lerp(self.hitbox.height, target.height, HITBOX_SMOOTHING),
            y: lerp(self.hitbox.y, target.y, HITBOX_SMOOTHING),
        };
    }

    /// Snaps the hitbox to its target, used after teleports.
    pub fn reset_hitbox(&mut self, crouching: bool) {
        self.hitbox = self.hitbox_target(crouching);
    }

    /// Narrow box centred on the body, covering the lower torso.
    pub fn hitbox(&self) -> Rect {
        Rect::new(
            self.x + (self.width - self.hitbox.width) / 2.0,
            self.hitbox.y,
            self.hitbox.width,
            self.hitbox.height,
        )
    }

    pub fn destroy(&mut self, rewards: Option<&mut dyn RewardSink>) {
        if let Some(sink) = rewards {
            sink.add_special_charge(1);
        }
        self.marked_for_deletion = true;
    }
}
