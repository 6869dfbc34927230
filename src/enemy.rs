use bevy::log::warn;
use rand::rngs::SmallRng;

use crate::ai::{AiContext, AiMemory, Archetype, EnemyState};
use crate::animation::GROUNDER_DEAD;
use crate::entity::Body;
use crate::events::{CommandQueue, RewardSink, WorldCommand};
use crate::geometry::Rect;
use crate::state_machine::{StateMachine, Transition};

/// Damage taken while paralysed is multiplied by this.
const PARALYZED_DAMAGE_MULTIPLIER: f32 = 1.5;
/// Hits at least this strong push the enemy away from the source.
const KNOCKBACK_DAMAGE_THRESHOLD: f32 = 2.0;
const DAMAGE_KNOCKBACK_FORCE: f32 = 5.0;
const DAMAGE_DISPLAY_DURATION: f32 = 1.5;
/// Corpse lingers, then fades before removal.
const CORPSE_DURATION: f32 = 3.0 + 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum LifeState {
    Alive,
    Dead { removal_timer: f32 },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u64,
    pub body: Body,
    pub archetype: Archetype,
    machine: StateMachine<EnemyState>,
    pub max_health: f32,
    pub health: f32,
    /// Damage accumulated for the floating number, cleared after a quiet spell.
    pub damage_display: f32,
    damage_display_timer: f32,
    paralysis_timer: f32,
    life: LifeState,
    pub memory: AiMemory,
    commands: CommandQueue,
}

impl Enemy {
    pub fn new(id: u64, archetype: Archetype, x: f32, y: f32, rng: &mut SmallRng) -> Self {
        let def = archetype.def();
        let mut enemy = Self {
            id,
            body: Body::new(x, y, def.width, def.height),
            archetype,
            machine: StateMachine::default(),
            max_health: def.max_health,
            health: def.max_health,
            damage_display: 0.0,
            damage_display_timer: 0.0,
            paralysis_timer: 0.0,
            life: LifeState::Alive,
            memory: AiMemory::None,
            commands: CommandQueue::default(),
        };
        archetype.behavior().init(&mut enemy, rng);
        enemy.body.reset_hitbox(false);
        enemy
    }

    pub fn register_states(&mut self, states: &[EnemyState]) {
        for state in states {
            self.machine.add_state(*state);
        }
    }

    /// Commits a state change for the behaviour to react to.
    pub fn transition(&mut self, state: EnemyState) -> Option<Transition<EnemyState>> {
        match self.machine.set_state(state) {
            Ok(transition) => transition,
            Err(e) => {
                warn!("[Ridgeline enemy {}] {}", self.id, e);
                None
            }
        }
    }

    pub fn state(&self) -> Option<EnemyState> {
        self.machine.current()
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.life, LifeState::Dead { .. })
    }

    pub fn push_command(&mut self, command: WorldCommand) {
        self.commands.push(command);
    }

    pub fn take_commands(&mut self) -> Vec<WorldCommand> {
        self.commands.take()
    }

    pub fn update(&mut self, dt: f32, ctx: &mut AiContext) {
        if let LifeState::Dead { removal_timer } = &mut self.life {
            *removal_timer -= dt;
            if *removal_timer <= 0.0 {
                self.body.marked_for_deletion = true;
            }
            return;
        }

        if self.damage_display_timer > 0.0 {
            self.damage_display_timer -= dt;
            if self.damage_display_timer <= 0.0 {
                self.damage_display = 0.0;
            }
        }

        if self.body.paralyzed {
            self.paralysis_timer -= dt;
            if self.paralysis_timer <= 0.0 {
                self.paralysis_timer = 0.0;
                self.body.paralyzed = false;
            }
        } else {
            self.body.tick_knockback(dt);
        }

        self.machine.tick(dt);
        self.archetype.behavior().update(self, dt, ctx);
        self.body.refresh_hitbox(false);
    }

    /// Returns true when this hit killed the enemy. Hits on a dead enemy are
    /// ignored.
    pub fn take_damage(&mut self, amount: f32, source_x: Option<f32>) -> bool {
        if self.is_dead() {
            return false;
        }
        let amount = if self.body.paralyzed {
            amount * PARALYZED_DAMAGE_MULTIPLIER
        } else {
            amount
        };

        self.damage_display += amount;
        self.damage_display_timer = DAMAGE_DISPLAY_DURATION;
        self.health = (self.health - amount).max(0.0);

        if amount >= KNOCKBACK_DAMAGE_THRESHOLD {
            if let Some(source_x) = source_x {
                let direction = if source_x < self.body.x { 1.0 } else { -1.0 };
                self.body.apply_knockback(direction, DAMAGE_KNOCKBACK_FORCE);
            }
        }

        if self.health <= 0.0 {
            self.die();
            return true;
        }
        false
    }

    fn die(&mut self) {
        let def = self.archetype.def();
        self.commands.push(WorldCommand::SpawnCoins {
            x: self.body.center_x(),
            y: self.body.y,
            count: def.coin_count,
            value: def.coin_value,
        });
        self.commands.push(WorldCommand::EnemyDestroyed {
            id: self.id,
            archetype: self.archetype,
        });

        if def.leaves_corpse {
            self.body.vx = 0.0;
            self.body.vy = 0.0;
            self.body.y = 0.0;
            self.body.grounded = true;
            self.body.animator.play(GROUNDER_DEAD, 1.0, false);
            self.life = LifeState::Dead {
                removal_timer: CORPSE_DURATION,
            };
            self.commands.add_special_charge(1);
        } else {
            self.life = LifeState::Dead { removal_timer: 0.0 };
            let sink: &mut dyn RewardSink = &mut self.commands;
            self.body.destroy(Some(sink));
        }
    }

    pub fn paralyze(&mut self, duration: f32) {
        if self.is_dead() {
            return;
        }
        self.body.paralyzed = true;
        self.paralysis_timer = self.paralysis_timer.max(duration);
        self.body.vx = 0.0;
    }

    pub fn apply_knockback(&mut self, direction: f32, force: f32) {
        if !self.is_dead() {
            self.body.apply_knockback(direction, force);
        }
    }

    /// Dead enemies have no hitbox.
    pub fn hitbox(&self) -> Option<Rect> {
        if self.is_dead() {
            None
        } else {
            Some(self.body.hitbox())
        }
    }

    pub fn is_expired(&self) -> bool {
        self.body.marked_for_deletion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PlayerView;
    use crate::config::GameConfig;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(11)
    }

    fn death_rewards(commands: &[WorldCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, WorldCommand::EnemyDestroyed { .. }))
            .count()
    }

    #[test]
    fn health_drops_to_zero_with_a_single_death_reward() {
        let mut enemy = Enemy::new(7, Archetype::Grounder, 500.0, 0.0, &mut rng());
        assert_eq!(enemy.health, 12.0);
        assert!(!enemy.take_damage(2.0, None));
        assert_eq!(enemy.health, 10.0);
        assert!(!enemy.take_damage(2.0, None));
        assert_eq!(enemy.health, 8.0);
        assert!(enemy.take_damage(8.0, None));
        assert_eq!(enemy.health, 0.0);
        assert!(enemy.is_dead());
        assert!(enemy.hitbox().is_none());

        assert!(!enemy.take_damage(5.0, None));
        let commands = enemy.take_commands();
        assert_eq!(death_rewards(&commands), 1);
        assert!(commands.contains(&WorldCommand::SpawnCoins {
            x: 625.0,
            y: 0.0,
            count: 3,
            value: 15.0
        }));
    }

    #[test]
    fn corpse_lingers_then_is_removed() {
        let config = GameConfig::default();
        let mut rng = rng();
        let mut enemy = Enemy::new(1, Archetype::Grounder, 0.0, 0.0, &mut rng);
        enemy.take_damage(20.0, None);
        assert!(!enemy.is_expired());
        let mut ctx = AiContext {
            player: PlayerView {
                x: 0.0,
                y: 0.0,
                width: 200.0,
                hitbox: Rect::default(),
            },
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        for _ in 0..(9 * 60) {
            enemy.update(1.0 / 60.0, &mut ctx);
        }
        assert!(enemy.is_expired());
    }

    #[test]
    fn small_enemies_vanish_on_death() {
        let mut enemy = Enemy::new(2, Archetype::SkyFaller, 0.0, 0.0, &mut rng());
        assert!(enemy.take_damage(5.0, None));
        assert!(enemy.is_expired());
        let commands = enemy.take_commands();
        assert!(commands.contains(&WorldCommand::AddSpecialCharge(1)));
    }

    #[test]
    fn paralysis_amplifies_damage() {
        let mut enemy = Enemy::new(3, Archetype::Grounder, 0.0, 0.0, &mut rng());
        enemy.paralyze(4.0);
        enemy.take_damage(2.0, None);
        assert_eq!(enemy.health, 9.0);
        assert_eq!(enemy.damage_display, 3.0);
    }

    #[test]
    fn strong_hits_push_away_from_source() {
        let mut enemy = Enemy::new(4, Archetype::Grounder, 300.0, 0.0, &mut rng());
        enemy.take_damage(1.0, Some(100.0));
        assert!(!enemy.body.knocked_back);
        enemy.take_damage(3.0, Some(100.0));
        assert!(enemy.body.knocked_back);
        assert_eq!(enemy.body.vx, 5.0);
    }

    #[test]
    fn paralysis_wears_off() {
        let config = GameConfig::default();
        let mut rng = rng();
        let mut enemy = Enemy::new(5, Archetype::Grounder, 800.0, 0.0, &mut rng);
        enemy.paralyze(0.5);
        let mut ctx = AiContext {
            player: PlayerView {
                x: 0.0,
                y: 0.0,
                width: 200.0,
                hitbox: Rect::default(),
            },
            platforms: &[],
            config: &config,
            rng: &mut rng,
        };
        enemy.update(1.0 / 60.0, &mut ctx);
        assert_eq!(enemy.body.vx, 0.0);
        for _ in 0..40 {
            enemy.update(1.0 / 60.0, &mut ctx);
        }
        assert!(!enemy.body.paralyzed);
        assert!(enemy.body.vx < 0.0);
    }
}
