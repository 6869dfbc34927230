use bevy::log::{info, warn};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

use crate::ai::Archetype;
use crate::animation::{BOSS_ACTIVATE, BOSS_ATTACK1, BOSS_ATTACK2, BOSS_DEATH, BOSS_IDLE};
use crate::entity::Body;
use crate::events::{CommandQueue, PointsSource, WorldCommand};
use crate::geometry::Rect;
use crate::state_machine::{MachineState, StateMachine};

pub const BOSS_WIDTH: f32 = 600.0;
pub const BOSS_HEIGHT: f32 = 700.0;
pub const BOSS_MAX_HEALTH: f32 = 150.0;
const ATTACK_INTERVAL: f32 = 4.0;
const DEATH_POINTS: f32 = 100.0;
/// Boss hits are worth this many points per point of damage.
const HIT_POINTS_PER_DAMAGE: f32 = 2.0;

const ATTACK1_SPAWN_FRAME: usize = 8;
const ATTACK1_ADDS: usize = 4;
const ATTACK2_SPAWN_FRAME: usize = 5;
const ATTACK2_ADDS: usize = 5;
const ADD_STAGGER: f32 = 0.15;
const ADD_DROP_HEIGHT: f32 = 800.0;
const ADD_SCATTER: f32 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossPhase {
    Waiting,
    Activating,
    Idle,
    Attack1,
    Attack2,
    Death,
}

impl MachineState for BossPhase {
    fn name(self) -> &'static str {
        match self {
            BossPhase::Waiting => "waiting",
            BossPhase::Activating => "activating",
            BossPhase::Idle => "idle",
            BossPhase::Attack1 => "attack1",
            BossPhase::Attack2 => "attack2",
            BossPhase::Death => "death",
        }
    }
}

const ALL_PHASES: [BossPhase; 6] = [
    BossPhase::Waiting,
    BossPhase::Activating,
    BossPhase::Idle,
    BossPhase::Attack1,
    BossPhase::Attack2,
    BossPhase::Death,
];

#[derive(Clone, Debug)]
pub struct Boss {
    pub body: Body,
    machine: StateMachine<BossPhase>,
    pub health: f32,
    pub max_health: f32,
    activated: bool,
    dead: bool,
    attack_timer: f32,
    adds_spawned: bool,
    /// Countdowns of adds queued by the current attack.
    pending_adds: Vec<f32>,
    commands: CommandQueue,
}

impl Boss {
    pub fn new(x: f32, y: f32) -> Self {
        let mut boss = Self {
            body: Body::new(x, y, BOSS_WIDTH, BOSS_HEIGHT),
            machine: StateMachine::new(&ALL_PHASES),
            health: BOSS_MAX_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            activated: false,
            dead: false,
            attack_timer: 0.0,
            adds_spawned: false,
            pending_adds: Vec::new(),
            commands: CommandQueue::default(),
        };
        boss.set_phase(BossPhase::Waiting);
        boss
    }

    pub fn phase(&self) -> BossPhase {
        self.machine.current().unwrap_or(BossPhase::Waiting)
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn take_commands(&mut self) -> Vec<WorldCommand> {
        self.commands.take()
    }

    /// Wakes the boss up. Only a waiting boss reacts.
    pub fn activate(&mut self) -> bool {
        if self.phase() != BossPhase::Waiting {
            return false;
        }
        self.set_phase(BossPhase::Activating);
        true
    }

    fn set_phase(&mut self, phase: BossPhase) {
        match self.machine.set_state(phase) {
            Ok(Some(transition)) => self.enter_phase(transition.to),
            Ok(None) => {}
            Err(e) => warn!("[Ridgeline boss] {}", e),
        }
    }

    fn enter_phase(&mut self, phase: BossPhase) {
        let animator = &mut self.body.animator;
        match phase {
            BossPhase::Waiting => {
                self.activated = false;
                animator.play(BOSS_ACTIVATE, 0.2, true);
            }
            BossPhase::Activating => {
                self.activated = true;
                animator.stop();
                animator.play(BOSS_ACTIVATE, 0.2, true);
                info!("[Ridgeline boss] Activated");
            }
            BossPhase::Idle => {
                animator.play(BOSS_IDLE, 0.12, true);
            }
            BossPhase::Attack1 => {
                animator.play(BOSS_ATTACK1, 0.1, true);
                self.adds_spawned = false;
            }
            BossPhase::Attack2 => {
                animator.play(BOSS_ATTACK2, 0.1, true);
                self.adds_spawned = false;
            }
            BossPhase::Death => {
                self.dead = true;
                animator.play(BOSS_DEATH, 0.1, false);
                self.pending_adds.clear();
                self.commands.push(WorldCommand::AddPoints {
                    points: DEATH_POINTS,
                    source: PointsSource::Boss,
                });
                self.commands.push(WorldCommand::BossDefeated);
                info!("[Ridgeline boss] Defeated");
            }
        }
    }

    /// Advances the phase machine, releases due adds around `player_x`, then
    /// steps the animation. A waiting boss is scenery and does not animate.
    pub fn update(&mut self, dt: f32, player_x: f32, rng: &mut SmallRng) {
        self.machine.tick(dt);
        self.release_adds(dt, player_x, rng);

        match self.phase() {
            BossPhase::Waiting | BossPhase::Death => {}
            BossPhase::Activating => {
                if self.body.animator.is_on_last_frame() {
                    self.set_phase(BossPhase::Idle);
                }
            }
            BossPhase::Idle => {
                self.attack_timer += dt;
                if self.attack_timer >= ATTACK_INTERVAL {
                    self.attack_timer = 0.0;
                    let next = if rng.gen::<f32>() > 0.5 {
                        BossPhase::Attack1
                    } else {
                        BossPhase::Attack2
                    };
                    self.set_phase(next);
                }
            }
            BossPhase::Attack1 => self.update_attack(ATTACK1_SPAWN_FRAME, ATTACK1_ADDS),
            BossPhase::Attack2 => self.update_attack(ATTACK2_SPAWN_FRAME, ATTACK2_ADDS),
        }

        if self.phase() != BossPhase::Waiting {
            self.body.animator.advance(dt);
        }
    }

    fn update_attack(&mut self, spawn_frame: usize, adds: usize) {
        if self.body.animator.frame == spawn_frame && !self.adds_spawned {
            self.adds_spawned = true;
            self.pending_adds
                .extend((0..adds).map(|i| i as f32 * ADD_STAGGER));
        }
        if self.body.animator.is_on_last_frame() {
            self.set_phase(BossPhase::Idle);
        }
    }

    fn release_adds(&mut self, dt: f32, player_x: f32, rng: &mut SmallRng) {
        if self.pending_adds.is_empty() {
            return;
        }
        let mut due = 0;
        self.pending_adds.retain_mut(|delay| {
            *delay -= dt;
            if *delay <= 0.0 {
                due += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..due {
            let x = player_x + rng.gen::<f32>() * ADD_SCATTER * 2.0 - ADD_SCATTER;
            self.commands.push(WorldCommand::SpawnEnemy {
                x,
                y: ADD_DROP_HEIGHT,
                archetype: Archetype::SkyFaller,
            });
        }
    }

    /// Accepted only while active and alive. Returns true when the hit landed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead || !self.activated {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.set_phase(BossPhase::Death);
            return true;
        }
        if amount > 0.0 {
            self.commands.push(WorldCommand::AddPoints {
                points: (amount * HIT_POINTS_PER_DAMAGE).floor(),
                source: PointsSource::Boss,
            });
        }
        true
    }

    /// Small weak spot near the lower middle. Absent while inactive or dead.
    pub fn hitbox(&self) -> Option<Rect> {
        if self.dead || !self.activated {
            return None;
        }
        let b = &self.body;
        Some(Rect::new(
            b.x + b.width * 0.4,
            b.y + b.height * 0.2,
            b.width * 0.2,
            b.height * 0.1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn active_boss(rng: &mut SmallRng) -> Boss {
        let mut boss = Boss::new(5300.0, 0.0);
        assert!(boss.activate());
        for _ in 0..120 {
            boss.update(DT, 5500.0, rng);
        }
        boss
    }

    #[test]
    fn waiting_boss_ignores_damage() {
        let mut boss = Boss::new(5300.0, 0.0);
        assert_eq!(boss.phase(), BossPhase::Waiting);
        assert!(boss.hitbox().is_none());
        assert!(!boss.take_damage(10.0));
        assert_eq!(boss.health, BOSS_MAX_HEALTH);
        assert!(boss.take_commands().is_empty());
    }

    #[test]
    fn activation_settles_into_idle() {
        let mut rng = SmallRng::seed_from_u64(3);
        let boss = active_boss(&mut rng);
        assert!(boss.is_activated());
        assert_eq!(boss.phase(), BossPhase::Idle);
        let hb = boss.hitbox().unwrap();
        assert_eq!(hb.x, 5300.0 + 240.0);
        assert_eq!(hb.y, 140.0);
    }

    #[test]
    fn dies_exactly_once() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut boss = active_boss(&mut rng);
        boss.take_commands();

        let mut deaths = 0;
        for _ in 0..100 {
            boss.take_damage(3.0);
            deaths += boss
                .take_commands()
                .iter()
                .filter(|c| **c == WorldCommand::BossDefeated)
                .count();
            if boss.is_dead() {
                assert!(boss.hitbox().is_none());
            }
        }
        assert_eq!(deaths, 1);
        assert_eq!(boss.health, 0.0);
        assert_eq!(boss.phase(), BossPhase::Death);
        assert!(boss.hitbox().is_none());
    }

    #[test]
    fn hits_award_double_points() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut boss = active_boss(&mut rng);
        boss.take_commands();
        boss.take_damage(3.0);
        assert_eq!(
            boss.take_commands(),
            vec![WorldCommand::AddPoints {
                points: 6.0,
                source: PointsSource::Boss
            }]
        );
    }

    #[test]
    fn attacks_drop_sky_fallers_near_the_player() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut boss = active_boss(&mut rng);
        boss.take_commands();

        let mut adds = Vec::new();
        for _ in 0..(12 * 60) {
            boss.update(DT, 5500.0, &mut rng);
            adds.extend(boss.take_commands());
        }
        assert!(!adds.is_empty());
        for add in &adds {
            match add {
                WorldCommand::SpawnEnemy { x, y, archetype } => {
                    assert_eq!(*archetype, Archetype::SkyFaller);
                    assert_eq!(*y, ADD_DROP_HEIGHT);
                    assert!(*x >= 4900.0 && *x <= 6100.0);
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }
}
