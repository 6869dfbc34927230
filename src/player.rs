use std::collections::HashSet;

use bevy::log::warn;
use serde::Serialize;

use crate::animation::{
    Clip, PLAYER_ATTACK_PISTOL, PLAYER_ATTACK_SWORD, PLAYER_BOW_CHARGE, PLAYER_CROUCH, PLAYER_IDLE,
    PLAYER_JUMP, PLAYER_RUN_SHOOT, PLAYER_SHIELD, PLAYER_SHIELD_CRACKED, PLAYER_SPECIAL,
    PLAYER_WALK,
};
use crate::config::{GameConfig, WeaponKind};
use crate::entity::Body;
use crate::events::{CommandQueue, WorldCommand};
use crate::geometry::{sign, Rect};
use crate::input::ControlSignals;
use crate::physics_core::{
    accelerate_horizontal, apply_variable_jump, surface_decay, try_jump, update_coyote_timer,
    update_jump_buffer, STOP_THRESHOLD,
};
use crate::state_machine::{MachineState, StateMachine};

const DEFENSE_HITBOX_WIDTH: f32 = 30.0;
const WALK_FRAME_BASE: f32 = 0.06;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Crouching,
    Walking,
    Jumping,
    Attacking,
    BowCharge,
    Blocking,
    Special,
}

impl MachineState for PlayerState {
    fn name(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Crouching => "crouching",
            PlayerState::Walking => "walking",
            PlayerState::Jumping => "jumping",
            PlayerState::Attacking => "attacking",
            PlayerState::BowCharge => "bow_charge",
            PlayerState::Blocking => "blocking",
            PlayerState::Special => "special",
        }
    }
}

const ALL_STATES: [PlayerState; 8] = [
    PlayerState::Idle,
    PlayerState::Crouching,
    PlayerState::Walking,
    PlayerState::Jumping,
    PlayerState::Attacking,
    PlayerState::BowCharge,
    PlayerState::Blocking,
    PlayerState::Special,
];

/// World facts the player reads during its update.
pub struct PlayerContext<'a> {
    pub platforms: &'a [Rect],
    pub config: &'a GameConfig,
    /// The special meter is full.
    pub special_ready: bool,
}

fn attack_clip(weapon: WeaponKind) -> Clip {
    match weapon {
        WeaponKind::Sword => PLAYER_ATTACK_SWORD,
        WeaponKind::Bow => PLAYER_BOW_CHARGE,
        WeaponKind::Pistol => PLAYER_ATTACK_PISTOL,
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    machine: StateMachine<PlayerState>,
    pub health: i32,
    pub max_health: i32,
    invulnerable_timer: f32,
    pub shield: f32,
    pub shield_max: f32,
    pub shield_broken: bool,
    shield_broken_timer: f32,
    shield_exit_timer: Option<f32>,
    weapons: Vec<WeaponKind>,
    equipped: WeaponKind,
    /// Normalised bow charge in [0, 1].
    pub charge_power: f32,
    charge_elapsed: f32,
    bow_release_timer: Option<f32>,
    shot_timer: f32,
    special_timer: Option<f32>,
    coyote_timer: f32,
    jump_buffer_timer: f32,
    rising_from_jump: bool,
    /// Enemies already struck by the current melee swing.
    pub enemies_hit: HashSet<u64>,
    commands: CommandQueue,
}

impl Player {
    pub fn new(x: f32, y: f32, config: &GameConfig) -> Self {
        let mut player = Self {
            body: Body::new(x, y, config.player_width, config.player_height),
            machine: StateMachine::new(&ALL_STATES),
            health: config.player_health,
            max_health: config.player_health,
            invulnerable_timer: 0.0,
            shield: config.shield_max,
            shield_max: config.shield_max,
            shield_broken: false,
            shield_broken_timer: 0.0,
            shield_exit_timer: None,
            weapons: vec![WeaponKind::Pistol],
            equipped: WeaponKind::Pistol,
            charge_power: 0.0,
            charge_elapsed: 0.0,
            bow_release_timer: None,
            shot_timer: 0.0,
            special_timer: None,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            rising_from_jump: false,
            enemies_hit: HashSet::new(),
            commands: CommandQueue::default(),
        };
        player.set_state(PlayerState::Idle);
        player
    }

    pub fn state(&self) -> PlayerState {
        self.machine.current().unwrap_or(PlayerState::Idle)
    }

    pub fn equipped_weapon(&self) -> WeaponKind {
        self.equipped
    }

    pub fn weapons(&self) -> &[WeaponKind] {
        &self.weapons
    }

    pub fn is_attacking(&self) -> bool {
        matches!(
            self.state(),
            PlayerState::Attacking | PlayerState::BowCharge | PlayerState::Special
        )
    }

    pub fn is_blocking(&self) -> bool {
        self.machine.is(PlayerState::Blocking)
    }

    pub fn is_crouching(&self) -> bool {
        self.machine.is(PlayerState::Crouching)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    pub fn shield_cracked(&self, config: &GameConfig) -> bool {
        self.shield < self.shield_max * config.shield_crack_ratio
    }

    /// Drains side effects requested since the last call.
    pub fn take_commands(&mut self) -> Vec<WorldCommand> {
        self.commands.take()
    }

    /// Runs exit then enter hooks. Re-entering the current state does nothing.
    pub fn set_state(&mut self, state: PlayerState) {
        match self.machine.set_state(state) {
            Ok(Some(transition)) => {
                if let Some(from) = transition.from {
                    self.exit_state(from);
                }
                self.enter_state(transition.to);
            }
            Ok(None) => {}
            Err(e) => warn!("[Ridgeline player] {}", e),
        }
    }

    fn movement_state(&self) -> PlayerState {
        if !self.body.grounded {
            PlayerState::Jumping
        } else if self.body.vx.abs() > STOP_THRESHOLD {
            PlayerState::Walking
        } else {
            PlayerState::Idle
        }
    }

    fn enter_state(&mut self, state: PlayerState) {
        match state {
            PlayerState::Idle => {
                self.body.animator.play(PLAYER_IDLE, 0.25, true);
            }
            PlayerState::Crouching => {
                self.body.vx = 0.0;
                self.body.animator.play(PLAYER_CROUCH, 0.2, true);
            }
            PlayerState::Walking => {
                self.body.animator.play(PLAYER_WALK, 0.1, true);
            }
            PlayerState::Jumping => {
                self.body.animator.play(PLAYER_JUMP, 0.15, true);
            }
            PlayerState::Attacking => {
                self.enemies_hit.clear();
                if self.equipped.is_charged() {
                    self.set_state(PlayerState::BowCharge);
                    return;
                }
                let def = self.equipped.def();
                let clip = attack_clip(self.equipped);
                self.body
                    .animator
                    .play(clip, def.cooldown / clip.frame_count.max(1) as f32, true);
                if self.equipped.is_ranged() {
                    self.commands
                        .push(WorldCommand::FirePlayerShot { charge_power: 1.0 });
                }
                self.shot_timer = 0.0;
            }
            PlayerState::BowCharge => {
                self.body.vx *= 0.1;
                self.charge_elapsed = 0.0;
                self.charge_power = 0.0;
                self.body.animator.play(PLAYER_BOW_CHARGE, 1.0, true);
            }
            PlayerState::Blocking => {
                self.body.animator.play(PLAYER_SHIELD, 0.1, true);
            }
            PlayerState::Special => {
                self.body.vx = 0.0;
                self.body.animator.play(PLAYER_SPECIAL, 0.1, true);
            }
        }
    }

    fn exit_state(&mut self, state: PlayerState) {
        match state {
            PlayerState::Attacking => self.shot_timer = 0.0,
            PlayerState::BowCharge => {
                self.charge_power = 0.0;
                self.bow_release_timer = None;
            }
            PlayerState::Blocking => self.body.animator.stop(),
            PlayerState::Special => self.special_timer = None,
            _ => {}
        }
    }

    /// Deferred callbacks, expressed as countdowns.
    fn tick_timers(&mut self, dt: f32, config: &GameConfig) {
        self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);

        if self.shield_broken {
            self.shield_broken_timer -= dt;
            if self.shield_broken_timer <= 0.0 {
                self.shield_broken = false;
                self.shield = config.shield_restore;
            }
        }

        if let Some(t) = self.shield_exit_timer.as_mut() {
            *t -= dt;
            if *t <= 0.0 {
                self.shield_exit_timer = None;
                if self.is_blocking() {
                    self.set_state(PlayerState::Idle);
                }
            }
        }

        if let Some(t) = self.bow_release_timer.as_mut() {
            *t -= dt;
            if *t <= 0.0 {
                self.bow_release_timer = None;
                if self.machine.is(PlayerState::BowCharge) {
                    self.set_state(self.movement_state());
                }
            }
        }

        if let Some(t) = self.special_timer.as_mut() {
            *t -= dt;
            if *t <= 0.0 {
                self.special_timer = None;
                if self.machine.is(PlayerState::Special) {
                    self.set_state(self.movement_state());
                }
            }
        }
    }

    pub fn update(&mut self, dt: f32, controls: &ControlSignals, ctx: &PlayerContext) {
        let config = ctx.config;
        self.tick_timers(dt, config);

        if !self.is_blocking() && !self.shield_broken {
            self.shield = (self.shield + config.shield_regen).min(self.shield_max);
        }

        if self.machine.is(PlayerState::Walking) {
            let speed_factor = self.body.vx.abs() / config.player_speed;
            let adjusted = WALK_FRAME_BASE / speed_factor.max(0.5);
            if (self.body.animator.frame_duration - adjusted).abs() > 0.01 {
                self.body.animator.frame_duration = adjusted;
            }
        }

        let attacking = self.is_attacking();
        let crouching = self.is_crouching();
        let ranged_attacking = self.machine.is(PlayerState::Attacking) && self.equipped.is_ranged();
        let can_control = (!attacking || ranged_attacking) && !self.is_blocking() && !crouching;
        let decay = surface_decay(
            self.body.grounded,
            config.player_friction,
            config.player_air_resistance,
        );

        if can_control {
            if controls.x != 0.0 {
                self.body.direction = sign(controls.x);
            }
            accelerate_horizontal(
                &mut self.body.vx,
                controls.x,
                config.player_acceleration,
                config.player_speed,
                decay,
            );
        } else if !self.body.knocked_back {
            self.body.vx *= decay;
        }

        update_jump_buffer(controls.jump, &mut self.jump_buffer_timer, config.jump_buffer, dt);
        update_coyote_timer(self.body.grounded, &mut self.coyote_timer, config.coyote_time, dt);
        let jump_allowed = can_control && !crouching && !attacking;
        if try_jump(jump_allowed, &mut self.coyote_timer, &mut self.jump_buffer_timer) {
            self.jump(config);
            self.set_state(PlayerState::Jumping);
        }
        apply_variable_jump(
            &mut self.body.vy,
            controls.jump,
            &mut self.rising_from_jump,
            config.jump_cut,
        );

        if controls.special && can_control {
            self.special(ctx.special_ready, config);
        }

        if self.body.grounded
            && (controls.crouch || controls.analog_down)
            && !self.is_attacking()
            && !self.is_crouching()
        {
            self.set_state(PlayerState::Crouching);
        }

        self.body.tick_knockback(dt);
        self.body.update(dt, ctx.platforms, config.gravity);
        self.machine.tick(dt);
        self.update_state(dt, controls, config);
        self.body.refresh_hitbox(self.is_crouching());
    }

    fn update_state(&mut self, dt: f32, controls: &ControlSignals, config: &GameConfig) {
        let grounded = self.body.grounded;
        let moving = self.body.vx.abs() > STOP_THRESHOLD;
        let wants_block = (controls.block || controls.crouch) && !self.shield_broken;
        let wants_crouch = controls.crouch || controls.analog_down;

        match self.state() {
            PlayerState::Idle | PlayerState::Walking => {
                let walking = self.machine.is(PlayerState::Walking);
                if !grounded {
                    self.set_state(PlayerState::Jumping);
                } else if !walking && moving {
                    self.set_state(PlayerState::Walking);
                } else if walking && !moving {
                    self.set_state(PlayerState::Idle);
                } else if controls.attack_pressed {
                    self.set_state(PlayerState::Attacking);
                } else if wants_block {
                    self.set_state(PlayerState::Blocking);
                    self.sync_shield_clip(config);
                } else if wants_crouch {
                    self.set_state(PlayerState::Crouching);
                }
            }
            PlayerState::Crouching => {
                if !wants_crouch {
                    self.set_state(PlayerState::Idle);
                }
            }
            PlayerState::Jumping => {
                if grounded {
                    self.set_state(self.movement_state());
                } else if controls.attack_pressed {
                    self.set_state(PlayerState::Attacking);
                }
            }
            PlayerState::Attacking => self.update_attacking(dt, controls),
            PlayerState::BowCharge => self.update_bow_charge(dt, controls),
            PlayerState::Blocking => self.update_blocking(controls, config),
            PlayerState::Special => {}
        }
    }

    fn update_attacking(&mut self, dt: f32, controls: &ControlSignals) {
        let weapon = self.equipped;
        if weapon == WeaponKind::Pistol {
            if self.body.vx.abs() > 0.5 && self.body.grounded {
                self.body.animator.play(PLAYER_RUN_SHOOT, 0.06, true);
            } else if self.body.grounded {
                self.body.animator.play(PLAYER_ATTACK_PISTOL, 0.1, true);
            }
        }

        if !controls.attack {
            self.set_state(self.movement_state());
            return;
        }

        if weapon.is_ranged() && !weapon.is_charged() {
            self.shot_timer += dt;
            if self.shot_timer >= weapon.def().cooldown {
                self.commands
                    .push(WorldCommand::FirePlayerShot { charge_power: 1.0 });
                self.shot_timer = 0.0;
            }
        }
    }

    fn update_bow_charge(&mut self, dt: f32, controls: &ControlSignals) {
        if self.bow_release_timer.is_some() {
            return;
        }
        let def = self.equipped.def();
        let max_charge = def.max_charge_time.unwrap_or(1.0).max(f32::EPSILON);
        self.charge_elapsed += dt;
        self.charge_power = (self.charge_elapsed / max_charge).min(1.0);

        let frames = PLAYER_BOW_CHARGE.frame_count;
        let frame = ((self.charge_power * frames as f32).floor() as usize).min(frames - 1);
        self.body.animator.set_frame(frame);

        if controls.attack_released {
            self.commands.push(WorldCommand::FirePlayerShot {
                charge_power: self.charge_power,
            });
            self.bow_release_timer = Some(def.cooldown);
        }
    }

    /// Swaps between the intact and cracked shield clips.
    fn sync_shield_clip(&mut self, config: &GameConfig) {
        let cracked = self.shield_cracked(config);
        if cracked && self.body.animator.is_playing(PLAYER_SHIELD) {
            self.body.animator.play(PLAYER_SHIELD_CRACKED, 0.1, true);
        } else if !cracked && self.body.animator.is_playing(PLAYER_SHIELD_CRACKED) {
            self.body.animator.play(PLAYER_SHIELD, 0.1, true);
        }
    }

    fn update_blocking(&mut self, controls: &ControlSignals, config: &GameConfig) {
        if !self.shield_broken {
            self.shield -= config.shield_drain;
            self.sync_shield_clip(config);

            if self.shield <= 0.0 {
                self.shield = 0.0;
                self.shield_broken = true;
                self.shield_broken_timer = config.shield_broken_cooldown;
                self.shield_exit_timer = Some(config.shield_broken_exit_delay);
            }
        }

        let block_input = (controls.block || controls.crouch) && !self.shield_broken;
        if !block_input || !self.body.grounded {
            self.set_state(PlayerState::Idle);
        }
    }

    fn jump(&mut self, config: &GameConfig) {
        self.body.grounded = false;
        self.body.vy = config.jump_force;
        self.rising_from_jump = true;
    }

    fn special(&mut self, special_ready: bool, config: &GameConfig) {
        if special_ready {
            self.commands.push(WorldCommand::ActivateSpecial);
            self.set_state(PlayerState::Special);
            self.special_timer = Some(config.special_state_duration);
        }
    }

    /// Rejected while invulnerable or blocking. Accepted hits start the
    /// invulnerability window.
    pub fn take_damage(&mut self, amount: i32, config: &GameConfig) -> bool {
        if self.is_invulnerable() || self.is_blocking() {
            return false;
        }
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.invulnerable_timer = config.invulnerability_duration;
        true
    }

    /// Raises both current and maximum health by one heart.
    pub fn grant_extra_heart(&mut self) {
        self.max_health += 1;
        self.health = (self.health + 1).min(self.max_health);
    }

    /// Adds an unowned weapon and equips it. Returns true when newly added.
    pub fn collect_weapon(&mut self, weapon: WeaponKind) -> bool {
        if self.weapons.contains(&weapon) {
            return false;
        }
        self.weapons.push(weapon);
        self.equip_weapon(weapon)
    }

    pub fn equip_weapon(&mut self, weapon: WeaponKind) -> bool {
        if !self.weapons.contains(&weapon) {
            return false;
        }
        self.equipped = weapon;
        true
    }

    pub fn respawn_at(&mut self, x: f32, y: f32, config: &GameConfig) {
        self.body.x = x;
        self.body.y = y;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.body.paralyzed = false;
        self.invulnerable_timer = config.invulnerability_duration;
        self.body.reset_hitbox(self.is_crouching());
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    /// Present only while swinging a melee weapon.
    pub fn attack_hitbox(&self) -> Option<Rect> {
        if !self.is_attacking() || self.equipped.is_ranged() || self.machine.is(PlayerState::BowCharge)
        {
            return None;
        }
        let b = &self.body;
        let width = b.width * 0.4;
        let height = b.height * 0.1;
        let x_offset = if b.direction > 0.0 {
            b.width * 0.5
        } else {
            b.width * 0.5 - width
        };
        Some(Rect::new(
            b.x + x_offset,
            b.y + (b.height - height) / 4.0,
            width,
            height,
        ))
    }

    /// Thin full-height wall in front of the player while blocking.
    pub fn defense_hitbox(&self) -> Option<Rect> {
        if !self.is_blocking() {
            return None;
        }
        let b = &self.body;
        let x_offset = if b.direction > 0.0 {
            b.width * 0.8
        } else {
            b.width * 0.2 - DEFENSE_HITBOX_WIDTH
        };
        Some(Rect::new(b.x + x_offset, b.y, DEFENSE_HITBOX_WIDTH, b.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ctx(config: &GameConfig) -> PlayerContext<'_> {
        PlayerContext {
            platforms: &[],
            config,
            special_ready: false,
        }
    }

    fn settled_player(config: &GameConfig) -> Player {
        let mut player = Player::new(0.0, 0.0, config);
        player.update(DT, &ControlSignals::default(), &ctx(config));
        assert!(player.body.grounded);
        player
    }

    #[test]
    fn held_right_accelerates_to_max_speed_without_overshoot() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let right = ControlSignals {
            x: 1.0,
            ..Default::default()
        };
        let mut speeds = Vec::new();
        for _ in 0..30 {
            player.update(DT, &right, &ctx(&config));
            speeds.push(player.body.vx);
        }
        assert_eq!(speeds[0], 1.5);
        assert!(speeds.iter().all(|v| *v <= config.player_speed));
        assert_eq!(*speeds.last().unwrap(), config.player_speed);
        assert_eq!(player.state(), PlayerState::Walking);
        assert_eq!(player.body.direction, 1.0);
    }

    #[test]
    fn jump_launches_and_release_cuts_once() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let jump = ControlSignals {
            jump: true,
            ..Default::default()
        };
        player.update(DT, &jump, &ctx(&config));
        assert!(!player.body.grounded);
        assert_eq!(player.state(), PlayerState::Jumping);
        // Launch at jump force, then one tick of gravity.
        assert!((player.body.vy - (config.jump_force - config.gravity)).abs() < 1e-4);

        let released = ControlSignals::default();
        player.update(DT, &released, &ctx(&config));
        let cut = (config.jump_force - config.gravity) * config.jump_cut - config.gravity;
        assert!((player.body.vy - cut).abs() < 1e-4);

        player.update(DT, &released, &ctx(&config));
        assert!((player.body.vy - (cut - config.gravity)).abs() < 1e-4);
    }

    #[test]
    fn blocking_drains_shield_until_broken() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let block = ControlSignals {
            block: true,
            ..Default::default()
        };
        player.set_state(PlayerState::Blocking);
        for _ in 0..199 {
            player.update(DT, &block, &ctx(&config));
        }
        assert!(player.is_blocking());
        assert_eq!(player.shield, 0.5);

        player.update(DT, &block, &ctx(&config));
        assert_eq!(player.shield, 0.0);
        assert!(player.shield_broken);
        assert!(!player.is_blocking());

        // Broken shield refuses to block and does not regenerate.
        player.update(DT, &block, &ctx(&config));
        assert!(!player.is_blocking());
        assert_eq!(player.shield, 0.0);

        for _ in 0..200 {
            player.update(DT, &ControlSignals::default(), &ctx(&config));
        }
        assert!(!player.shield_broken);
        assert!(player.shield >= config.shield_restore);
    }

    #[test]
    fn blocking_rejects_damage() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        player.set_state(PlayerState::Blocking);
        assert!(!player.take_damage(1, &config));
        assert_eq!(player.health, config.player_health);
    }

    #[test]
    fn damage_grants_invulnerability_window() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        assert!(player.take_damage(2, &config));
        assert_eq!(player.health, config.player_health - 2);
        assert!(!player.take_damage(1, &config));
        for _ in 0..125 {
            player.update(DT, &ControlSignals::default(), &ctx(&config));
        }
        assert!(player.take_damage(1, &config));
        assert_eq!(player.health, config.player_health - 3);
    }

    #[test]
    fn bow_charge_is_monotonic_and_clamped() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        assert!(player.collect_weapon(WeaponKind::Bow));
        let press = ControlSignals {
            attack: true,
            attack_pressed: true,
            ..Default::default()
        };
        player.update(DT, &press, &ctx(&config));
        assert_eq!(player.state(), PlayerState::BowCharge);

        let hold = ControlSignals {
            attack: true,
            ..Default::default()
        };
        let mut last = 0.0;
        let mut last_frame = 0;
        let mut frames_seen = HashSet::new();
        for _ in 0..150 {
            player.update(DT, &hold, &ctx(&config));
            assert!(player.charge_power >= last);
            assert!(player.charge_power <= 1.0);
            let frame = player.body.animator.frame;
            assert!(frame >= last_frame);
            frames_seen.insert(frame);
            last = player.charge_power;
            last_frame = frame;
        }
        assert_eq!(player.charge_power, 1.0);
        assert_eq!(last_frame, PLAYER_BOW_CHARGE.frame_count - 1);
        assert_eq!(frames_seen.len(), PLAYER_BOW_CHARGE.frame_count);

        let release = ControlSignals {
            attack_released: true,
            ..Default::default()
        };
        player.update(DT, &release, &ctx(&config));
        assert_eq!(
            player.take_commands(),
            vec![WorldCommand::FirePlayerShot { charge_power: 1.0 }]
        );
        for _ in 0..15 {
            player.update(DT, &ControlSignals::default(), &ctx(&config));
        }
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.charge_power, 0.0);
    }

    #[test]
    fn pistol_fires_on_press_then_on_cooldown() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let press = ControlSignals {
            attack: true,
            attack_pressed: true,
            ..Default::default()
        };
        player.update(DT, &press, &ctx(&config));
        assert_eq!(player.state(), PlayerState::Attacking);
        assert_eq!(player.take_commands().len(), 1);

        let hold = ControlSignals {
            attack: true,
            ..Default::default()
        };
        for _ in 0..13 {
            player.update(DT, &hold, &ctx(&config));
        }
        assert_eq!(player.take_commands().len(), 1);

        player.update(DT, &ControlSignals::default(), &ctx(&config));
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn special_needs_full_meter() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let special = ControlSignals {
            special: true,
            ..Default::default()
        };
        player.update(DT, &special, &ctx(&config));
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(player.take_commands().is_empty());

        let ready = PlayerContext {
            platforms: &[],
            config: &config,
            special_ready: true,
        };
        player.update(DT, &special, &ready);
        assert_eq!(player.state(), PlayerState::Special);
        assert_eq!(player.take_commands(), vec![WorldCommand::ActivateSpecial]);

        for _ in 0..30 {
            player.update(DT, &ControlSignals::default(), &ctx(&config));
        }
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn crouch_stops_and_shrinks_hitbox() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        player.body.vx = 5.0;
        let crouch = ControlSignals {
            analog_down: true,
            ..Default::default()
        };
        player.update(DT, &crouch, &ctx(&config));
        assert!(player.is_crouching());
        assert_eq!(player.body.vx, 0.0);
        let standing_height = config.player_height * 0.3;
        assert!(player.hitbox().height < standing_height);
    }

    #[test]
    fn sword_has_attack_hitbox_only_while_swinging() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        player.collect_weapon(WeaponKind::Sword);
        assert_eq!(player.equipped_weapon(), WeaponKind::Sword);
        assert!(player.attack_hitbox().is_none());

        player.set_state(PlayerState::Attacking);
        let hb = player.attack_hitbox().unwrap();
        assert_eq!(hb.x, 100.0);
        assert_eq!(hb.width, 80.0);

        player.body.direction = -1.0;
        assert_eq!(player.attack_hitbox().unwrap().x, 20.0);
    }

    #[test]
    fn defense_hitbox_sits_in_front() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        assert!(player.defense_hitbox().is_none());
        player.set_state(PlayerState::Blocking);
        let hb = player.defense_hitbox().unwrap();
        assert_eq!(hb.x, 160.0);
        assert_eq!(hb.height, 180.0);
    }

    #[test]
    fn collecting_owned_weapon_is_ignored() {
        let config = GameConfig::default();
        let mut player = Player::new(0.0, 0.0, &config);
        assert!(!player.collect_weapon(WeaponKind::Pistol));
        assert!(!player.equip_weapon(WeaponKind::Bow));
        assert_eq!(player.weapons(), &[WeaponKind::Pistol]);
    }

    #[test]
    fn tuning_comes_from_the_update_context() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        let tuned = GameConfig {
            shield_drain: 2.0,
            invulnerability_duration: 0.5,
            ..GameConfig::default()
        };
        let block = ControlSignals {
            block: true,
            ..Default::default()
        };
        player.set_state(PlayerState::Blocking);
        player.update(DT, &block, &ctx(&tuned));
        assert_eq!(player.shield, tuned.shield_max - 2.0);

        player.update(DT, &ControlSignals::default(), &ctx(&tuned));
        assert!(player.take_damage(1, &tuned));
        for _ in 0..31 {
            player.update(DT, &ControlSignals::default(), &ctx(&tuned));
        }
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn raising_a_weak_shield_shows_it_cracked() {
        let config = GameConfig::default();
        let mut player = settled_player(&config);
        player.shield = 10.0;
        assert!(player.shield_cracked(&config));
        let block = ControlSignals {
            block: true,
            ..Default::default()
        };
        player.update(DT, &block, &ctx(&config));
        assert!(player.is_blocking());
        assert!(player.body.animator.is_playing(PLAYER_SHIELD_CRACKED));
    }
}
