use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{FLYER_FLY, GROUNDER_WALK, SKY_FALLER_FALL, SKY_FALLER_RUN};
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::events::WorldCommand;
use crate::geometry::{check_collision, sign, Rect};
use crate::state_machine::MachineState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Grounder,
    Flyer,
    SkyFaller,
}

/// Immutable per-archetype constants shared by every instance.
#[derive(Clone, Copy, Debug)]
pub struct ArchetypeDef {
    pub width: f32,
    pub height: f32,
    pub max_health: f32,
    pub speed: f32,
    pub coin_count: u32,
    pub coin_value: f32,
    pub score_multiplier: f32,
    /// Leaves a corpse on the ground for a while instead of vanishing.
    pub leaves_corpse: bool,
}

const GROUNDER: ArchetypeDef = ArchetypeDef {
    width: 250.0,
    height: 250.0,
    max_health: 12.0,
    speed: 2.0,
    coin_count: 3,
    coin_value: 15.0,
    score_multiplier: 2.0,
    leaves_corpse: true,
};

const FLYER: ArchetypeDef = ArchetypeDef {
    width: 80.0,
    height: 80.0,
    max_health: 8.0,
    speed: 1.8,
    coin_count: 2,
    coin_value: 12.0,
    score_multiplier: 1.5,
    leaves_corpse: false,
};

const SKY_FALLER: ArchetypeDef = ArchetypeDef {
    width: 120.0,
    height: 120.0,
    max_health: 5.0,
    speed: 3.5,
    coin_count: 1,
    coin_value: 10.0,
    score_multiplier: 1.2,
    leaves_corpse: false,
};

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Grounder, Archetype::Flyer, Archetype::SkyFaller];

    pub fn def(self) -> &'static ArchetypeDef {
        match self {
            Archetype::Grounder => &GROUNDER,
            Archetype::Flyer => &FLYER,
            Archetype::SkyFaller => &SKY_FALLER,
        }
    }

    pub fn behavior(self) -> &'static dyn AiBehavior {
        match self {
            Archetype::Grounder => &GrounderAi,
            Archetype::Flyer => &FlyerAi,
            Archetype::SkyFaller => &SkyFallerAi,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    Idle,
    Walking,
    Flying,
    Swooping,
    Falling,
}

impl MachineState for EnemyState {
    fn name(self) -> &'static str {
        match self {
            EnemyState::Idle => "idle",
            EnemyState::Walking => "walking",
            EnemyState::Flying => "flying",
            EnemyState::Swooping => "swooping",
            EnemyState::Falling => "falling",
        }
    }
}

/// Per-instance memory owned by the enemy, shaped by its archetype.
#[derive(Clone, Debug, Default)]
pub enum AiMemory {
    #[default]
    None,
    Flyer(FlyerMemory),
    SkyFaller { fall_speed: f32 },
}

#[derive(Clone, Debug, Default)]
pub struct FlyerMemory {
    pub speed: f32,
    pub target_y: f32,
    pub projectile_timer: f32,
    pub swoop_timer: f32,
    pub bobbing_timer: f32,
    pub swoop_target: (f32, f32),
}

/// Read-only snapshot of the player for targeting.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub hitbox: Rect,
}

impl PlayerView {
    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }
}

pub struct AiContext<'a> {
    pub player: PlayerView,
    pub platforms: &'a [Rect],
    pub config: &'a GameConfig,
    pub rng: &'a mut SmallRng,
}

/// Behaviour strategy for one archetype. Implementations hold no state.
pub trait AiBehavior: Send + Sync {
    fn init(&self, enemy: &mut Enemy, rng: &mut SmallRng);
    fn update(&self, enemy: &mut Enemy, dt: f32, ctx: &mut AiContext);
}

pub struct GrounderAi;

const GROUNDER_FAR: f32 = 400.0;
const GROUNDER_CLOSE: f32 = 60.0;
const GROUNDER_CRAWL: f32 = 20.0;
const GROUNDER_BITE_RANGE: f32 = 40.0;
const GROUNDER_BITE_CHANCE: f32 = 0.05;
const GROUNDER_HOP_CHANCE: f32 = 0.01;
const GROUNDER_HOP_FORCE: f32 = 12.0;
const GROUNDER_FRAME: f32 = 0.15;

impl AiBehavior for GrounderAi {
    fn init(&self, enemy: &mut Enemy, _rng: &mut SmallRng) {
        enemy.register_states(&[EnemyState::Idle, EnemyState::Walking]);
        enemy.body.animator.play(GROUNDER_WALK, 0.2, true);
        self.switch(enemy, EnemyState::Walking);
    }

    fn update(&self, enemy: &mut Enemy, dt: f32, ctx: &mut AiContext) {
        enemy.body.update_physics(ctx.platforms, ctx.config.gravity);
        self.brain(enemy, ctx);
        enemy.body.animator.advance(dt);
    }
}

impl GrounderAi {
    fn switch(&self, enemy: &mut Enemy, state: EnemyState) {
        let Some(transition) = enemy.transition(state) else {
            return;
        };
        match transition.to {
            EnemyState::Idle => enemy.body.vx = 0.0,
            EnemyState::Walking => {
                enemy.body.animator.play(GROUNDER_WALK, GROUNDER_FRAME, true);
                enemy.body.animator.frame_duration = GROUNDER_FRAME;
            }
            _ => {}
        }
    }

    fn brain(&self, enemy: &mut Enemy, ctx: &mut AiContext) {
        if enemy.body.paralyzed {
            enemy.body.vx = 0.0;
            return;
        }
        if enemy.body.knocked_back {
            return;
        }

        let player = ctx.player;
        let speed = enemy.archetype.def().speed;
        let dist_x = player.x - enemy.body.x;
        let dist_y = (player.y - enemy.body.y).abs();
        if dist_x.abs() > 5.0 {
            enemy.body.direction = sign(dist_x);
        }
        self.switch(enemy, EnemyState::Walking);

        let factor = if dist_x.abs() > GROUNDER_FAR {
            0.7
        } else if dist_x.abs() < GROUNDER_CRAWL {
            0.2
        } else if dist_x.abs() < GROUNDER_CLOSE {
            0.6
        } else {
            1.0
        };
        enemy.body.vx = enemy.body.direction * speed * factor;
        if dist_x.abs() > GROUNDER_FAR {
            return;
        }

        if dist_x.abs() < GROUNDER_BITE_RANGE
            && dist_y < GROUNDER_BITE_RANGE
            && ctx.rng.gen::<f32>() < GROUNDER_BITE_CHANCE
            && check_collision(Some(&enemy.body.hitbox()), Some(&player.hitbox))
        {
            enemy.push_command(WorldCommand::DamagePlayer { amount: 1 });
        }

        if enemy.body.grounded
            && player.y > enemy.body.y + 60.0
            && ctx.rng.gen::<f32>() < GROUNDER_HOP_CHANCE
        {
            enemy.body.vy = GROUNDER_HOP_FORCE;
            enemy.body.grounded = false;
        }
    }
}

pub struct FlyerAi;

const FLYER_VERTICAL_SPEED: f32 = 1.0;
const FLYER_SWOOP_SPEED: f32 = 4.5;
const FLYER_SHOT_COOLDOWN: f32 = 3.0;
const FLYER_SWOOP_COOLDOWN: f32 = 7.0;
const FLYER_BOB_INTERVAL: f32 = 4.0;
const FLYER_SWOOP_RANGE: f32 = 300.0;
const FLYER_SHOT_RANGE: f32 = 200.0;
const FLYER_HOVER_RANGE: f32 = 150.0;
const FLYER_SWOOP_ARRIVAL: f32 = 30.0;

impl AiBehavior for FlyerAi {
    fn init(&self, enemy: &mut Enemy, rng: &mut SmallRng) {
        enemy.register_states(&[EnemyState::Flying, EnemyState::Swooping]);
        enemy.body.y = 200.0 + rng.gen::<f32>() * 100.0;
        enemy.memory = AiMemory::Flyer(FlyerMemory {
            speed: enemy.archetype.def().speed,
            target_y: enemy.body.y,
            projectile_timer: rng.gen::<f32>() * FLYER_SHOT_COOLDOWN,
            swoop_timer: rng.gen::<f32>() * FLYER_SWOOP_COOLDOWN,
            bobbing_timer: 0.0,
            swoop_target: (0.0, 0.0),
        });
        enemy.body.animator.play(FLYER_FLY, 0.1, true);
        self.switch(enemy, EnemyState::Flying, None, rng);
    }

    fn update(&self, enemy: &mut Enemy, dt: f32, ctx: &mut AiContext) {
        if enemy.body.paralyzed {
            enemy.body.vx = 0.0;
            enemy.body.vy = 0.0;
            return;
        }

        if enemy.body.knocked_back {
            enemy.body.update_physics(ctx.platforms, ctx.config.gravity);
        } else {
            enemy.body.x += enemy.body.vx;
            enemy.body.y = (enemy.body.y + enemy.body.vy).max(0.0);
        }

        match enemy.state() {
            Some(EnemyState::Flying) => self.fly(enemy, dt, ctx),
            Some(EnemyState::Swooping) => self.swoop(enemy, ctx),
            _ => {}
        }
        enemy.body.animator.advance(dt);
    }
}

impl FlyerAi {
    fn switch(
        &self,
        enemy: &mut Enemy,
        state: EnemyState,
        player: Option<&PlayerView>,
        rng: &mut SmallRng,
    ) {
        let Some(transition) = enemy.transition(state) else {
            return;
        };
        let def_speed = enemy.archetype.def().speed;
        if transition.from == Some(EnemyState::Swooping) {
            enemy.body.vy = 0.0;
            if let AiMemory::Flyer(mem) = &mut enemy.memory {
                mem.speed = def_speed;
            }
        }
        let AiMemory::Flyer(mem) = &mut enemy.memory else {
            return;
        };
        match transition.to {
            EnemyState::Flying => {
                mem.speed = def_speed;
                mem.target_y = 200.0 + rng.gen::<f32>() * 100.0;
            }
            EnemyState::Swooping => {
                if let Some(player) = player {
                    mem.swoop_target = (player.x, player.y + 20.0);
                }
                mem.speed = FLYER_SWOOP_SPEED;
                mem.swoop_timer = 0.0;
            }
            _ => {}
        }
    }

    fn fly(&self, enemy: &mut Enemy, dt: f32, ctx: &mut AiContext) {
        let player = ctx.player;
        let dist_x = (player.x - enemy.body.x).abs();
        let AiMemory::Flyer(mem) = &mut enemy.memory else {
            return;
        };
        mem.projectile_timer += dt;
        mem.swoop_timer += dt;
        mem.bobbing_timer += dt;

        if mem.swoop_timer > FLYER_SWOOP_COOLDOWN && dist_x < FLYER_SWOOP_RANGE {
            self.switch(enemy, EnemyState::Swooping, Some(&player), ctx.rng);
            return;
        }

        let mut fire = false;
        if mem.projectile_timer > FLYER_SHOT_COOLDOWN && dist_x < FLYER_SHOT_RANGE {
            mem.projectile_timer = 0.0;
            fire = true;
        }
        if mem.bobbing_timer > FLYER_BOB_INTERVAL {
            mem.target_y = 180.0 + ctx.rng.gen::<f32>() * 120.0;
            mem.bobbing_timer = 0.0;
        }
        let speed = mem.speed;
        let target_y = mem.target_y;

        if fire {
            enemy.push_command(WorldCommand::SpawnEnemyShot {
                x: enemy.body.center_x(),
                y: enemy.body.y,
            });
        }

        let dx = player.x - enemy.body.x;
        if dx.abs() > FLYER_HOVER_RANGE {
            enemy.body.vx = sign(dx) * speed;
            enemy.body.direction = sign(dx);
        } else {
            enemy.body.vx = 0.0;
        }

        enemy.body.vy = if (enemy.body.y - target_y).abs() > 2.0 {
            sign(target_y - enemy.body.y) * FLYER_VERTICAL_SPEED
        } else {
            0.0
        };
    }

    fn swoop(&self, enemy: &mut Enemy, ctx: &mut AiContext) {
        let AiMemory::Flyer(mem) = &enemy.memory else {
            return;
        };
        let (tx, ty) = mem.swoop_target;
        let speed = mem.speed;
        let dx = tx - enemy.body.x;
        let dy = ty - enemy.body.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < FLYER_SWOOP_ARRIVAL {
            self.switch(enemy, EnemyState::Flying, None, ctx.rng);
            return;
        }
        enemy.body.vx = dx / distance * speed;
        enemy.body.vy = dy / distance * speed;
        let facing = sign(enemy.body.vx);
        if facing != 0.0 {
            enemy.body.direction = facing;
        }
    }
}

pub struct SkyFallerAi;

const SKY_FALLER_FALL_SPEED: f32 = 12.0;
const SKY_FALLER_PUSH: f32 = 12.0;
const SKY_FALLER_RECOIL: f32 = 8.0;

impl AiBehavior for SkyFallerAi {
    fn init(&self, enemy: &mut Enemy, _rng: &mut SmallRng) {
        enemy.register_states(&[EnemyState::Falling, EnemyState::Walking]);
        enemy.memory = AiMemory::SkyFaller {
            fall_speed: SKY_FALLER_FALL_SPEED,
        };
        if enemy.transition(EnemyState::Falling).is_some() {
            enemy.body.animator.play(SKY_FALLER_FALL, 0.1, true);
        }
    }

    fn update(&self, enemy: &mut Enemy, dt: f32, ctx: &mut AiContext) {
        if enemy.body.paralyzed {
            return;
        }

        match enemy.state() {
            Some(EnemyState::Falling) => {
                let fall_speed = match enemy.memory {
                    AiMemory::SkyFaller { fall_speed } => fall_speed,
                    _ => SKY_FALLER_FALL_SPEED,
                };
                enemy.body.y -= fall_speed;
                if enemy.body.y <= 0.0 {
                    enemy.body.y = 0.0;
                    enemy.body.grounded = true;
                    if enemy.transition(EnemyState::Walking).is_some() {
                        enemy.body.animator.play(SKY_FALLER_RUN, 0.1, true);
                    }
                }
            }
            // Knockback slides x on its own; only the lift needs integrating.
            Some(EnemyState::Walking) if enemy.body.knocked_back => {
                enemy.body.update_physics(ctx.platforms, ctx.config.gravity);
            }
            Some(EnemyState::Walking) => self.chase(enemy, ctx),
            _ => {}
        }
        enemy.body.animator.advance(dt);
    }
}

impl SkyFallerAi {
    fn chase(&self, enemy: &mut Enemy, ctx: &mut AiContext) {
        let player = ctx.player;
        let diff = player.center_x() - enemy.body.center_x();
        let direction = if diff > 0.0 { 1.0 } else { -1.0 };
        enemy.body.direction = direction;
        enemy.body.vx = if diff.abs() > 5.0 {
            direction * enemy.archetype.def().speed
        } else {
            0.0
        };

        enemy.body.update_physics(ctx.platforms, ctx.config.gravity);

        if check_collision(Some(&enemy.body.hitbox()), Some(&player.hitbox)) {
            enemy.push_command(WorldCommand::PushPlayer {
                velocity_x: direction * SKY_FALLER_PUSH,
            });
            enemy.body.apply_knockback(-direction, SKY_FALLER_RECOIL);
            enemy.push_command(WorldCommand::DamagePlayer { amount: 1 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn view(x: f32, y: f32) -> PlayerView {
        PlayerView {
            x,
            y,
            width: 200.0,
            hitbox: Rect::new(x + 90.0, y + 18.0, 20.0, 54.0),
        }
    }

    #[test]
    fn descriptors_match_archetypes() {
        assert_eq!(Archetype::Grounder.def().max_health, 12.0);
        assert_eq!(Archetype::Flyer.def().width, 80.0);
        assert_eq!(Archetype::SkyFaller.def().speed, 3.5);
        assert!(Archetype::Grounder.def().leaves_corpse);
    }

    #[test]
    fn grounder_walks_toward_player_and_slows_when_close() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut enemy = Enemy::new(1, Archetype::Grounder, 1000.0, 0.0, &mut rng);
        let mut ctx = AiContext {
            player: view(0.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        assert_eq!(enemy.body.direction, -1.0);
        assert!((enemy.body.vx + 2.0 * 0.7).abs() < 1e-5);

        enemy.body.x = 50.0;
        ctx.player = view(0.0, 0.0);
        enemy.update(1.0 / 60.0, &mut ctx);
        assert!((enemy.body.vx + 2.0 * 0.6).abs() < 1e-5);
        assert_eq!(enemy.state(), Some(EnemyState::Walking));
    }

    #[test]
    fn flyer_starts_airborne_and_chases_horizontally() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut enemy = Enemy::new(1, Archetype::Flyer, 800.0, 0.0, &mut rng);
        assert!(enemy.body.y >= 200.0 && enemy.body.y <= 300.0);
        assert_eq!(enemy.state(), Some(EnemyState::Flying));

        let mut ctx = AiContext {
            player: view(0.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        assert!((enemy.body.vx + 1.8).abs() < 1e-5);
        assert_eq!(enemy.body.direction, -1.0);
    }

    #[test]
    fn flyer_swoops_at_player_then_returns_to_flying() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut enemy = Enemy::new(1, Archetype::Flyer, 100.0, 0.0, &mut rng);
        if let AiMemory::Flyer(mem) = &mut enemy.memory {
            mem.swoop_timer = FLYER_SWOOP_COOLDOWN + 1.0;
            mem.projectile_timer = 0.0;
        }
        let mut ctx = AiContext {
            player: view(0.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        assert_eq!(enemy.state(), Some(EnemyState::Swooping));

        for _ in 0..300 {
            enemy.update(1.0 / 60.0, &mut ctx);
            if enemy.state() == Some(EnemyState::Flying) {
                break;
            }
        }
        assert_eq!(enemy.state(), Some(EnemyState::Flying));
    }

    #[test]
    fn flyer_drops_shots_when_close() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut enemy = Enemy::new(1, Archetype::Flyer, 100.0, 0.0, &mut rng);
        if let AiMemory::Flyer(mem) = &mut enemy.memory {
            mem.swoop_timer = 0.0;
            mem.projectile_timer = FLYER_SHOT_COOLDOWN + 0.5;
        }
        let mut ctx = AiContext {
            player: view(0.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        let commands = enemy.take_commands();
        assert!(matches!(
            commands.as_slice(),
            [WorldCommand::SpawnEnemyShot { .. }]
        ));
    }

    #[test]
    fn sky_faller_lands_then_shoves_player_on_contact() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut enemy = Enemy::new(1, Archetype::SkyFaller, 0.0, 60.0, &mut rng);
        let mut ctx = AiContext {
            player: view(400.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        for _ in 0..5 {
            enemy.update(1.0 / 60.0, &mut ctx);
        }
        assert_eq!(enemy.state(), Some(EnemyState::Walking));
        assert_eq!(enemy.body.y, 0.0);

        // Place the faller on top of the player.
        enemy.body.x = 340.0;
        enemy.body.reset_hitbox(false);
        ctx.player = view(300.0, 0.0);
        enemy.update(1.0 / 60.0, &mut ctx);
        let commands = enemy.take_commands();
        assert!(commands.contains(&WorldCommand::DamagePlayer { amount: 1 }));
        assert!(commands
            .iter()
            .any(|c| matches!(c, WorldCommand::PushPlayer { .. })));
        assert!(enemy.body.knocked_back);
    }

    #[test]
    fn sky_faller_hops_during_knockback_and_stays_down_after() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut enemy = Enemy::new(1, Archetype::SkyFaller, 0.0, 0.0, &mut rng);
        let mut ctx = AiContext {
            player: view(2000.0, 0.0),
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        assert_eq!(enemy.state(), Some(EnemyState::Walking));
        assert!(enemy.body.grounded);

        enemy.body.apply_knockback(-1.0, SKY_FALLER_RECOIL);
        let mut heights = Vec::new();
        for _ in 0..60 {
            enemy.update(1.0 / 60.0, &mut ctx);
            heights.push(enemy.body.y);
        }
        assert!(heights[0] > 0.0);
        let landed = heights.iter().position(|y| *y == 0.0).unwrap();
        assert!(landed <= 18);
        assert!(heights[landed..].iter().all(|y| *y == 0.0));
        assert!(!enemy.body.knocked_back);
    }
}
