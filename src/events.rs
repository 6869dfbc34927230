use std::collections::VecDeque;

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::Serialize;

use crate::ai::Archetype;
use crate::config::WeaponKind;

const MAX_EVENTS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsSource {
    Kill,
    PitKill,
    Boss,
    Pickup,
}

/// Observable gameplay facts for the presentation layer and for traces.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    HealthChanged { health: i32, max_health: i32 },
    ExtraHeart { total: u32 },
    SpecialChanged { charge: u32, max: u32 },
    SpecialActivated,
    PointsAwarded { points: f32, total: f32, source: PointsSource },
    WeaponEquipped { weapon: WeaponKind },
    EnemySpawned { id: u64, archetype: Archetype },
    EnemyDefeated { id: u64, archetype: Archetype },
    PlayerFellInPit,
    PlayerRespawned { x: f32, y: f32 },
    BossArenaEntered,
    BossActivated,
    BossDefeated,
    GameOver { points: f32 },
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameEvent {
    pub frame: u64,
    #[serde(flatten)]
    pub event: GameEvent,
}

/// Bounded history of recent events. Oldest entries are dropped first.
#[derive(Resource, Default)]
pub struct GameEventBus {
    pub recent: VecDeque<FrameEvent>,
    pub frame: u64,
    pub dropped_events: u64,
    last_overflow_log_frame: u64,
}

impl GameEventBus {
    pub fn emit(&mut self, event: GameEvent) {
        self.recent.push_back(FrameEvent {
            frame: self.frame,
            event,
        });
        if self.recent.len() > MAX_EVENTS {
            let excess = self.recent.len() - MAX_EVENTS;
            for _ in 0..excess {
                self.recent.pop_front();
            }
            self.dropped_events = self.dropped_events.saturating_add(excess as u64);
            if self.frame.saturating_sub(self.last_overflow_log_frame) >= 60 {
                self.last_overflow_log_frame = self.frame;
                warn!(
                    "[Ridgeline events] Dropped {} buffered events (total dropped: {})",
                    excess, self.dropped_events
                );
            }
        }
    }

    pub fn drain(&mut self) -> Vec<FrameEvent> {
        self.recent.drain(..).collect()
    }

    pub fn count(&self, matches: impl Fn(&GameEvent) -> bool) -> usize {
        self.recent.iter().filter(|e| matches(&e.event)).count()
    }
}

/// Side effects an actor asks the world to perform. Actors never hold a
/// reference to the world; the orchestrator applies these right after the
/// actor's update returns.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldCommand {
    FirePlayerShot { charge_power: f32 },
    ActivateSpecial,
    SpawnEnemyShot { x: f32, y: f32 },
    SpawnEnemy { x: f32, y: f32, archetype: Archetype },
    DamagePlayer { amount: i32 },
    PushPlayer { velocity_x: f32 },
    AddSpecialCharge(u32),
    AddPoints { points: f32, source: PointsSource },
    EnemyDestroyed { id: u64, archetype: Archetype },
    SpawnCoins { x: f32, y: f32, count: u32, value: f32 },
    BossDefeated,
}

#[derive(Clone, Default, Debug)]
pub struct CommandQueue {
    pending: Vec<WorldCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: WorldCommand) {
        self.pending.push(command);
    }

    pub fn take(&mut self) -> Vec<WorldCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldCommand> {
        self.pending.iter()
    }
}

/// Receives the special-charge reward granted when something is destroyed.
pub trait RewardSink {
    fn add_special_charge(&mut self, amount: u32);
}

impl RewardSink for CommandQueue {
    fn add_special_charge(&mut self, amount: u32) {
        self.push(WorldCommand::AddSpecialCharge(amount));
    }
}
