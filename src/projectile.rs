use crate::animation::{ARROW, BULLET};
use crate::config::{ShotKind, WeaponKind};
use crate::entity::Body;
use crate::geometry::Rect;

const ARROW_SIZE: f32 = 35.0;
const ARROW_MIN_SPEED: f32 = 7.0;
const ARROW_MAX_SPEED: f32 = 22.0;
const BULLET_SIZE: f32 = 95.0;
const BULLET_SPEED: f32 = 12.0;
const ENEMY_SHOT_SIZE: f32 = 25.0;
const ENEMY_SHOT_DROP: f32 = -2.0;
/// Ballistic shots fall slower than bodies.
const BALLISTIC_GRAVITY_SCALE: f32 = 0.8;

#[derive(Clone, Debug)]
pub struct Projectile {
    pub body: Body,
    pub kind: ShotKind,
    pub ballistic: bool,
    pub damage: i32,
    pub charge_power: f32,
}

impl Projectile {
    /// Arrow speed and launch angle scale with charge; damage is floored from
    /// the weapon's base damage.
    pub fn arrow(x: f32, y: f32, direction: f32, charge_power: f32, base_damage: i32) -> Self {
        let charge_power = charge_power.clamp(0.0, 1.0);
        let speed = ARROW_MIN_SPEED + (ARROW_MAX_SPEED - ARROW_MIN_SPEED) * charge_power;
        let mut body = Body::new(x, y, ARROW_SIZE, ARROW_SIZE);
        body.direction = direction;
        body.vx = speed * direction;
        body.vy = 4.0 - 3.0 * charge_power;
        body.animator.play(ARROW, 1.0, false);
        Self {
            body,
            kind: ShotKind::Arrow,
            ballistic: true,
            damage: (base_damage as f32 * (0.5 + charge_power * 0.5)).floor() as i32,
            charge_power,
        }
    }

    pub fn bullet(x: f32, y: f32, direction: f32, damage: i32) -> Self {
        let mut body = Body::new(x, y, BULLET_SIZE, BULLET_SIZE);
        body.direction = direction;
        body.vx = BULLET_SPEED * direction;
        body.animator.play(BULLET, 1.0, false);
        Self {
            body,
            kind: ShotKind::Bullet,
            ballistic: false,
            damage,
            charge_power: 1.0,
        }
    }

    /// A small shot dropped straight down by flying enemies.
    pub fn enemy_shot(x: f32, y: f32) -> Self {
        let mut shot = Self::bullet(x, y, 0.0, 1);
        shot.ballistic = true;
        shot.body.vy = ENEMY_SHOT_DROP;
        shot.body.width = ENEMY_SHOT_SIZE;
        shot.body.height = ENEMY_SHOT_SIZE;
        shot
    }

    /// Spawns the shot for `weapon` in front of a shooter standing at
    /// `shooter` and facing `direction`.
    pub fn fired_by(weapon: WeaponKind, shooter: &Rect, direction: f32, charge_power: f32) -> Option<Self> {
        let def = weapon.def();
        match def.shot? {
            ShotKind::Arrow => {
                let x = if direction > 0.0 {
                    shooter.right() - 60.0
                } else {
                    shooter.x + 20.0
                };
                let y = shooter.y + shooter.height / 9.5;
                Some(Self::arrow(x, y, direction, charge_power, def.damage))
            }
            ShotKind::Bullet => {
                let x = if direction > 0.0 {
                    shooter.right() - 150.0
                } else {
                    shooter.x + 100.0
                };
                let y = shooter.y + shooter.height / 15.0;
                Some(Self::bullet(x, y, direction, def.damage))
            }
        }
    }

    /// Moves the shot and marks it for deletion when it hits the ground or
    /// leaves the culling window around the camera span.
    pub fn update(&mut self, gravity: f32, camera_span: (f32, f32), cull_buffer: f32) {
        let body = &mut self.body;
        body.x += body.vx;
        body.y += body.vy;
        if self.ballistic {
            body.vy -= gravity * BALLISTIC_GRAVITY_SCALE;
            if body.y < 0.0 {
                body.destroy(None);
            }
        }

        let (left, right) = camera_span;
        if body.x < left - cull_buffer || body.x > right + cull_buffer {
            body.destroy(None);
        }
    }

    /// Central 30% of the sprite.
    pub fn hitbox(&self) -> Rect {
        let b = &self.body;
        Rect::new(
            b.x + b.width * 0.35,
            b.y + b.height * 0.35,
            b.width * 0.3,
            b.height * 0.3,
        )
    }

    /// Flight angle in degrees for rendering ballistic shots.
    pub fn angle_degrees(&self) -> f32 {
        if !self.ballistic {
            return 0.0;
        }
        let b = &self.body;
        b.vy.atan2(b.vx * b.direction).to_degrees()
    }

    pub fn is_expired(&self) -> bool {
        self.body.marked_for_deletion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAN: (f32, f32) = (0.0, 800.0);

    #[test]
    fn arrow_scales_with_charge() {
        let weak = Projectile::arrow(0.0, 50.0, 1.0, 0.0, 2);
        let strong = Projectile::arrow(0.0, 50.0, 1.0, 1.0, 2);
        assert_eq!(weak.body.vx, 7.0);
        assert_eq!(weak.body.vy, 4.0);
        assert_eq!(weak.damage, 1);
        assert_eq!(strong.body.vx, 22.0);
        assert_eq!(strong.body.vy, 1.0);
        assert_eq!(strong.damage, 2);
    }

    #[test]
    fn ballistic_shot_is_destroyed_below_ground() {
        let mut arrow = Projectile::arrow(100.0, 5.0, 1.0, 1.0, 2);
        for _ in 0..30 {
            arrow.update(0.6, SPAN, 1000.0);
        }
        assert!(arrow.is_expired());
    }

    #[test]
    fn bullet_flies_level_until_culled() {
        let mut bullet = Projectile::bullet(700.0, 100.0, 1.0, 3);
        bullet.update(0.6, SPAN, 1000.0);
        assert_eq!(bullet.body.y, 100.0);
        assert_eq!(bullet.body.x, 712.0);
        for _ in 0..200 {
            bullet.update(0.6, SPAN, 1000.0);
        }
        assert!(bullet.is_expired());
    }

    #[test]
    fn culling_follows_a_scrolled_span() {
        let span = (2700.0, 3500.0);
        let mut inside = Projectile::bullet(3000.0, 100.0, 1.0, 3);
        inside.update(0.6, span, 1000.0);
        assert!(!inside.is_expired());
        assert_eq!(inside.body.x, 3012.0);

        let mut behind = Projectile::bullet(1710.0, 100.0, -1.0, 3);
        behind.update(0.6, span, 1000.0);
        assert!(behind.is_expired());

        let mut ahead = Projectile::bullet(4480.0, 100.0, 1.0, 3);
        ahead.update(0.6, span, 1000.0);
        assert!(!ahead.is_expired());
        ahead.update(0.6, span, 1000.0);
        assert!(ahead.is_expired());
    }

    #[test]
    fn enemy_shot_drops_straight_down() {
        let mut shot = Projectile::enemy_shot(300.0, 250.0);
        assert_eq!(shot.body.width, 25.0);
        shot.update(0.6, SPAN, 1000.0);
        assert_eq!(shot.body.x, 300.0);
        assert!(shot.body.y < 250.0);
    }

    #[test]
    fn sword_fires_nothing() {
        let shooter = Rect::new(0.0, 0.0, 200.0, 180.0);
        assert!(Projectile::fired_by(WeaponKind::Sword, &shooter, 1.0, 1.0).is_none());
        let bullet = Projectile::fired_by(WeaponKind::Pistol, &shooter, -1.0, 1.0).unwrap();
        assert_eq!(bullet.body.x, 100.0);
        assert_eq!(bullet.body.vx, -12.0);
    }

    #[test]
    fn hitbox_is_central_fraction() {
        let bullet = Projectile::bullet(0.0, 0.0, 1.0, 3);
        let hb = bullet.hitbox();
        assert!((hb.x - 33.25).abs() < 1e-4);
        assert!((hb.width - 28.5).abs() < 1e-4);
    }
}
