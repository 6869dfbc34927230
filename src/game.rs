use std::f32::consts::TAU;

use bevy::log::{debug, info};
use bevy::prelude::Resource;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ai::{AiContext, Archetype, PlayerView};
use crate::boss::Boss;
use crate::camera::CameraRig;
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::events::{GameEvent, GameEventBus, PointsSource, WorldCommand};
use crate::game_loop::FixedStepClock;
use crate::geometry::{check_collision, Rect};
use crate::input::{ControlSignals, ControlTracker};
use crate::level::{LevelData, SpawnPoint};
use crate::pickup::{Pickup, PickupKind};
use crate::player::{Player, PlayerContext};
use crate::presentation::{Frame, Pose, PoseKind, ShieldVisual};
use crate::projectile::Projectile;

const MELEE_KNOCKBACK: f32 = 10.0;
const CONTACT_DAMAGE: i32 = 1;
const ENEMY_SHOT_DAMAGE: i32 = 1;
const COIN_STAGGER: f32 = 0.1;
const COIN_SCATTER_X: f32 = 100.0;
const COIN_LIFT_MIN: f32 = 20.0;
const COIN_LIFT_RANGE: f32 = 50.0;
/// Random spawns appear just outside the view on either side.
const RANDOM_SPAWN_VIEW_FRACTION: f32 = 0.7;
const RANDOM_SPAWN_MARGIN: f32 = 200.0;
/// The spawn interval shrinks once the screen is this full.
const SPAWN_RAMP_FILL: f32 = 0.7;
const LOW_HEALTH: i32 = 3;
const SAFE_PLATFORM_MIN_Y: f32 = 50.0;
const SAFE_PLATFORM_MIN_WIDTH: f32 = 100.0;
const RESPAWN_BACKTRACK: f32 = 200.0;

#[derive(Clone, Copy, Debug)]
struct PendingCoin {
    delay: f32,
    x: f32,
    y: f32,
    value: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArenaState {
    pub active: bool,
    pub resolved: bool,
}

/// Owns the whole world and runs one fixed tick at a time.
#[derive(Resource)]
pub struct Game {
    pub config: GameConfig,
    pub level: LevelData,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pending_coins: Vec<PendingCoin>,
    spawn_points_armed: Vec<bool>,
    groups_released: Vec<bool>,
    pub arena: ArenaState,
    respawn_timer: Option<f32>,
    enemy_spawn_timer: f32,
    enemy_spawn_interval: f32,
    pub special_charge: u32,
    pub total_points: f32,
    extra_hearts: u32,
    next_heart_at: f32,
    pub camera: CameraRig,
    game_over: bool,
    pub events: GameEventBus,
    rng: SmallRng,
    next_enemy_id: u64,
    frame: u64,
    pub(crate) clock: FixedStepClock,
    pub(crate) tracker: ControlTracker,
}

impl Game {
    pub fn new(config: GameConfig, level: LevelData) -> Self {
        let (spawn_x, spawn_y) = level.player_spawn;
        let player = Player::new(spawn_x, spawn_y, &config);
        let pickups = level
            .items
            .iter()
            .map(|item| Pickup::weapon(item.x, item.y, item.weapon))
            .collect();
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            enemy_spawn_interval: config.enemy_spawn_interval,
            next_heart_at: config.points_for_extra_heart,
            spawn_points_armed: vec![true; level.spawn_points.len()],
            groups_released: vec![false; level.spawn_groups.len()],
            player,
            enemies: Vec::new(),
            boss: None,
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            pickups,
            pending_coins: Vec::new(),
            arena: ArenaState::default(),
            respawn_timer: None,
            enemy_spawn_timer: 0.0,
            special_charge: 0,
            total_points: 0.0,
            extra_hearts: 0,
            camera: CameraRig::default(),
            game_over: false,
            events: GameEventBus::default(),
            next_enemy_id: 1,
            frame: 0,
            clock: FixedStepClock::default(),
            tracker: ControlTracker::default(),
            config,
            level,
        }
    }

    /// Announces the opening state, drops the first enemy in and places the
    /// boss.
    pub fn start(&mut self) {
        self.events.emit(GameEvent::HealthChanged {
            health: self.player.health,
            max_health: self.player.max_health,
        });
        self.events.emit(GameEvent::SpecialChanged {
            charge: self.special_charge,
            max: self.config.special_charge_max,
        });
        self.events.emit(GameEvent::WeaponEquipped {
            weapon: self.player.equipped_weapon(),
        });
        self.spawn_random_enemy();
        if let Some((x, y)) = self.level.boss_position {
            self.boss = Some(Boss::new(x, y));
        }
        info!(
            "[Ridgeline] Game started: {} platforms, {} pits, {} spawn points",
            self.level.platforms.len(),
            self.level.pits.len(),
            self.level.spawn_points.len()
        );
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_timer.is_some()
    }

    pub fn enemy_spawn_interval(&self) -> f32 {
        self.enemy_spawn_interval
    }

    /// One fixed logic step. Does nothing once the game is over.
    pub fn tick(&mut self, controls: &ControlSignals) {
        if self.game_over {
            return;
        }
        self.frame += 1;
        self.events.frame = self.frame;
        let dt = sanitize_dt(self.config.fixed_step);

        self.update_respawn(dt);
        if self.respawn_timer.is_none() {
            self.check_pits();
        }
        self.update_arena();
        self.update_player(dt, controls);
        self.camera.follow(self.player.body.x, &self.config, self.level.width);
        self.update_boss(dt);
        self.update_random_spawner(dt);
        self.update_enemies(dt);
        self.check_spawn_triggers();
        self.resolve_melee();
        self.update_player_projectiles();
        self.update_enemy_projectiles();
        self.update_pickups(dt);
        self.compact();
    }

    fn player_view(&self) -> PlayerView {
        PlayerView {
            x: self.player.body.x,
            y: self.player.body.y,
            width: self.player.body.width,
            hitbox: self.player.hitbox(),
        }
    }

    fn update_respawn(&mut self, dt: f32) {
        let Some(timer) = self.respawn_timer.as_mut() else {
            return;
        };
        *timer -= dt;
        if *timer <= 0.0 {
            self.respawn_timer = None;
            self.complete_respawn();
        }
    }

    fn check_pits(&mut self) {
        for pit_index in 0..self.level.pits.len() {
            let pit = self.level.pits[pit_index].rect();

            if !self.player.is_invulnerable() && self.player.hitbox().intersects(&pit) {
                self.player_falls_in_pit();
                break;
            }

            self.check_enemies_in_pit(&pit);

            for projectile in self
                .player_projectiles
                .iter_mut()
                .chain(self.enemy_projectiles.iter_mut())
            {
                if !projectile.is_expired() && projectile.hitbox().intersects(&pit) {
                    projectile.body.destroy(None);
                }
            }
        }
    }

    fn check_enemies_in_pit(&mut self, pit: &Rect) {
        for idx in (0..self.enemies.len()).rev() {
            let enemy = &mut self.enemies[idx];
            if enemy.is_expired() || enemy.body.paralyzed {
                continue;
            }
            let Some(hitbox) = enemy.hitbox() else {
                continue;
            };
            if !pit.intersects(&hitbox) {
                continue;
            }
            let died = enemy.take_damage(self.config.pit_damage_to_enemies, None);
            let commands = enemy.take_commands();
            if died {
                debug!("[Ridgeline] Enemy {} fell into a pit", enemy.id);
                self.add_points(self.config.points_per_enemy, PointsSource::PitKill);
            }
            self.apply_commands(commands);
        }
    }

    fn player_falls_in_pit(&mut self) {
        if self.respawn_timer.is_some() {
            return;
        }
        self.events.emit(GameEvent::PlayerFellInPit);
        if self.damage_player(self.config.pit_damage) && !self.game_over {
            self.respawn_timer = Some(self.config.respawn_delay);
            self.player.body.paralyzed = true;
            info!("[Ridgeline] Player fell into a pit, respawning");
        }
    }

    /// First raised platform wide enough to stand on, else a step back from
    /// where the player fell.
    fn safe_respawn_position(&self) -> (f32, f32) {
        self.level
            .platforms
            .iter()
            .find(|p| p.y > SAFE_PLATFORM_MIN_Y && p.width > SAFE_PLATFORM_MIN_WIDTH)
            .map(|p| (p.x + p.width / 2.0, p.top()))
            .unwrap_or_else(|| {
                let (fallback_x, fallback_y) = self.config.respawn_position;
                let x = if self.player.body.x > 0.0 {
                    self.player.body.x - RESPAWN_BACKTRACK
                } else {
                    fallback_x
                };
                (x, fallback_y)
            })
    }

    fn complete_respawn(&mut self) {
        let (x, y) = self.safe_respawn_position();
        self.player.respawn_at(x, y, &self.config);
        self.events.emit(GameEvent::PlayerRespawned { x, y });
        info!("[Ridgeline] Player respawned at ({x:.0}, {y:.0})");
    }

    fn update_arena(&mut self) {
        let Some(bounds) = self.level.arena else {
            return;
        };

        if !self.arena.active && !self.arena.resolved && self.player.body.x > bounds.trigger_x {
            self.arena.active = true;
            self.events.emit(GameEvent::BossArenaEntered);
            if let Some(boss) = self.boss.as_mut() {
                if boss.activate() {
                    self.events.emit(GameEvent::BossActivated);
                }
            }
            info!("[Ridgeline] Boss arena entered");
        }

        if !self.arena.active {
            return;
        }
        let body = &mut self.player.body;
        if body.x < bounds.left_boundary {
            body.x = bounds.left_boundary;
            body.vx = 0.0;
        }
        if body.x > bounds.right_boundary {
            body.x = bounds.right_boundary;
            body.vx = 0.0;
        }
        if self.boss.as_ref().is_some_and(Boss::is_dead) {
            self.arena.active = false;
            self.arena.resolved = true;
        }
    }

    fn update_player(&mut self, dt: f32, controls: &ControlSignals) {
        let ctx = PlayerContext {
            platforms: &self.level.platforms,
            config: &self.config,
            special_ready: self.special_charge >= self.config.special_charge_max,
        };
        self.player.update(dt, controls, &ctx);
        let commands = self.player.take_commands();
        self.apply_commands(commands);
    }

    fn update_boss(&mut self, dt: f32) {
        let player_x = self.player.body.x;
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        boss.update(dt, player_x, &mut self.rng);

        for projectile in self.player_projectiles.iter_mut() {
            if projectile.is_expired() {
                continue;
            }
            if check_collision(Some(&projectile.hitbox()), boss.hitbox().as_ref()) {
                boss.take_damage(projectile.damage as f32);
                projectile.body.destroy(None);
            }
        }

        let commands = boss.take_commands();
        self.apply_commands(commands);
    }

    fn update_random_spawner(&mut self, dt: f32) {
        let cap = self.config.max_enemies_on_screen;
        self.enemy_spawn_timer += dt;
        if self.enemy_spawn_timer <= self.enemy_spawn_interval || self.enemies.len() >= cap {
            return;
        }
        self.enemy_spawn_timer = 0.0;

        let count = self.config.wave_spawn_count.min(cap - self.enemies.len());
        for _ in 0..count {
            self.spawn_random_enemy();
        }

        if self.enemies.len() as f32 > cap as f32 * SPAWN_RAMP_FILL {
            self.enemy_spawn_interval = (self.enemy_spawn_interval
                - self.config.enemy_spawn_interval_step)
                .max(self.config.enemy_spawn_interval_min);
        }
    }

    pub fn spawn_random_enemy(&mut self) -> u64 {
        let archetype = Archetype::ALL[self.rng.gen_range(0..Archetype::ALL.len())];
        let side = if self.rng.gen::<f32>() < 0.5 { 1.0 } else { -1.0 };
        let x = self.player.body.x
            + self.config.view_width * RANDOM_SPAWN_VIEW_FRACTION * side
            + side * RANDOM_SPAWN_MARGIN;
        self.spawn_enemy(x, 0.0, archetype)
    }

    pub fn spawn_enemy(&mut self, x: f32, y: f32, archetype: Archetype) -> u64 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies
            .push(Enemy::new(id, archetype, x, y, &mut self.rng));
        self.events.emit(GameEvent::EnemySpawned { id, archetype });
        debug!("[Ridgeline] Spawned {archetype:?} #{id} at ({x:.0}, {y:.0})");
        id
    }

    fn update_enemies(&mut self, dt: f32) {
        for idx in 0..self.enemies.len() {
            let player = self.player_view();
            {
                let mut ctx = AiContext {
                    player,
                    platforms: &self.level.platforms,
                    config: &self.config,
                    rng: &mut self.rng,
                };
                self.enemies[idx].update(dt, &mut ctx);
            }
            let commands = self.enemies[idx].take_commands();
            self.apply_commands(commands);

            let hitbox = self.enemies[idx].hitbox();
            let knocked_back = self.enemies[idx].body.knocked_back;
            if check_collision(Some(&self.player.hitbox()), hitbox.as_ref()) && !knocked_back {
                self.damage_player(CONTACT_DAMAGE);
            }

            if check_collision(self.player.defense_hitbox().as_ref(), hitbox.as_ref()) {
                let direction = self.player.body.direction;
                self.enemies[idx].apply_knockback(direction, self.config.defense_knockback);
            }
        }
    }

    /// Releases one-shot spawn points near the player and every wave whose
    /// trigger the player has passed.
    fn check_spawn_triggers(&mut self) {
        let player_x = self.player.body.x;
        let mut released: Vec<SpawnPoint> = Vec::new();

        for (point, armed) in self
            .level
            .spawn_points
            .iter()
            .zip(self.spawn_points_armed.iter_mut())
        {
            if *armed && (player_x - point.x).abs() < self.config.spawn_trigger_distance {
                *armed = false;
                released.push(*point);
            }
        }

        for (group, done) in self
            .level
            .spawn_groups
            .iter()
            .zip(self.groups_released.iter_mut())
        {
            if !*done && player_x > group.trigger_x {
                *done = true;
                released.extend(group.points.iter().copied());
                info!(
                    "[Ridgeline] Spawn group '{}' released with {} enemies",
                    group.name,
                    group.points.len()
                );
            }
        }

        for point in released {
            self.spawn_enemy(point.x, point.y, point.archetype);
        }
    }

    /// Each enemy is struck at most once per swing.
    fn resolve_melee(&mut self) {
        let Some(attack) = self.player.attack_hitbox() else {
            self.player.enemies_hit.clear();
            return;
        };
        let damage = self.player.equipped_weapon().def().damage.max(1) as f32;
        let direction = self.player.body.direction;
        let source_x = self.player.body.x;

        for idx in 0..self.enemies.len() {
            let enemy = &mut self.enemies[idx];
            if self.player.enemies_hit.contains(&enemy.id) {
                continue;
            }
            if !check_collision(Some(&attack), enemy.hitbox().as_ref()) {
                continue;
            }
            let died = enemy.take_damage(damage, Some(source_x));
            enemy.apply_knockback(direction, MELEE_KNOCKBACK);
            self.player.enemies_hit.insert(enemy.id);
            let commands = enemy.take_commands();
            self.apply_commands(commands);
            if died {
                self.add_special_charge(1);
            }
        }
    }

    fn update_player_projectiles(&mut self) {
        let span = self.camera.visible_span(self.config.view_width);
        for projectile in self.player_projectiles.iter_mut() {
            projectile.update(self.config.gravity, span, self.config.projectile_cull_buffer);
        }

        for pi in 0..self.player_projectiles.len() {
            for ei in 0..self.enemies.len() {
                let projectile = &mut self.player_projectiles[pi];
                if projectile.is_expired() {
                    break;
                }
                let enemy = &mut self.enemies[ei];
                if !check_collision(Some(&projectile.hitbox()), enemy.hitbox().as_ref()) {
                    continue;
                }
                let died = enemy.take_damage(projectile.damage.max(1) as f32, Some(projectile.body.x));
                projectile.body.destroy(None);
                let commands = enemy.take_commands();
                self.apply_commands(commands);
                if died {
                    self.add_special_charge(1);
                }
            }
        }
    }

    fn update_enemy_projectiles(&mut self) {
        let span = self.camera.visible_span(self.config.view_width);
        for idx in 0..self.enemy_projectiles.len() {
            let projectile = &mut self.enemy_projectiles[idx];
            projectile.update(self.config.gravity, span, self.config.projectile_cull_buffer);
            if projectile.is_expired() {
                continue;
            }
            if self.player.hitbox().intersects(&projectile.hitbox()) {
                projectile.body.destroy(None);
                self.damage_player(ENEMY_SHOT_DAMAGE);
            }
        }
    }

    fn update_pickups(&mut self, dt: f32) {
        self.release_coins(dt);

        for pickup in self.pickups.iter_mut() {
            pickup.update(dt, self.config.gravity);
        }

        for idx in 0..self.pickups.len() {
            let pickup = &self.pickups[idx];
            if pickup.is_expired() || !self.player.hitbox().intersects(&pickup.hitbox()) {
                continue;
            }
            let kind = pickup.kind;
            self.pickups[idx].body.destroy(None);
            match kind {
                PickupKind::Points { value } => self.add_points(value, PointsSource::Pickup),
                PickupKind::Weapon { weapon } => {
                    if self.player.collect_weapon(weapon) {
                        self.events.emit(GameEvent::WeaponEquipped { weapon });
                    }
                }
            }
        }
    }

    fn release_coins(&mut self, dt: f32) {
        if self.pending_coins.is_empty() {
            return;
        }
        let mut due = Vec::new();
        self.pending_coins.retain_mut(|coin| {
            coin.delay -= dt;
            if coin.delay <= 0.0 {
                due.push(*coin);
                false
            } else {
                true
            }
        });
        for coin in due {
            let offset_x = (self.rng.gen::<f32>() - 0.5) * COIN_SCATTER_X;
            let offset_y = self.rng.gen::<f32>() * COIN_LIFT_RANGE + COIN_LIFT_MIN;
            let phase = self.rng.gen::<f32>() * TAU;
            self.pickups.push(Pickup::coin(
                coin.x + offset_x,
                coin.y + offset_y,
                coin.value,
                phase,
            ));
        }
    }

    fn compact(&mut self) {
        self.enemies.retain(|e| !e.is_expired());
        self.player_projectiles.retain(|p| !p.is_expired());
        self.enemy_projectiles.retain(|p| !p.is_expired());
        self.pickups.retain(|p| !p.is_expired());
    }

    pub fn apply_commands(&mut self, commands: Vec<WorldCommand>) {
        for command in commands {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::FirePlayerShot { charge_power } => self.spawn_player_projectile(charge_power),
            WorldCommand::ActivateSpecial => self.activate_special(),
            WorldCommand::SpawnEnemyShot { x, y } => {
                self.enemy_projectiles.push(Projectile::enemy_shot(x, y));
            }
            WorldCommand::SpawnEnemy { x, y, archetype } => {
                self.spawn_enemy(x, y, archetype);
            }
            WorldCommand::DamagePlayer { amount } => {
                self.damage_player(amount);
            }
            WorldCommand::PushPlayer { velocity_x } => self.player.body.vx = velocity_x,
            WorldCommand::AddSpecialCharge(amount) => self.add_special_charge(amount),
            WorldCommand::AddPoints { points, source } => self.add_points(points, source),
            WorldCommand::EnemyDestroyed { id, archetype } => self.enemy_destroyed(id, archetype),
            WorldCommand::SpawnCoins { x, y, count, value } => {
                self.pending_coins.extend((0..count).map(|i| PendingCoin {
                    delay: i as f32 * COIN_STAGGER,
                    x,
                    y,
                    value,
                }));
            }
            WorldCommand::BossDefeated => self.events.emit(GameEvent::BossDefeated),
        }
    }

    fn spawn_player_projectile(&mut self, charge_power: f32) {
        let body = &self.player.body;
        if let Some(shot) = Projectile::fired_by(
            self.player.equipped_weapon(),
            &body.bounds(),
            body.direction,
            charge_power,
        ) {
            self.player_projectiles.push(shot);
        }
    }

    /// Returns true when the hit was accepted.
    pub fn damage_player(&mut self, amount: i32) -> bool {
        if self.game_over || !self.player.take_damage(amount, &self.config) {
            return false;
        }
        self.events.emit(GameEvent::HealthChanged {
            health: self.player.health,
            max_health: self.player.max_health,
        });
        if self.player.health <= 0 {
            self.game_over();
        }
        true
    }

    fn points_multiplier(&self, source: PointsSource) -> f32 {
        match source {
            PointsSource::Boss => 5.0,
            _ if self.player.health <= LOW_HEALTH => 2.0,
            _ => 1.0,
        }
    }

    /// Scores `points` scaled by the source multiplier, granting an extra heart
    /// for every threshold crossed.
    pub fn add_points(&mut self, points: f32, source: PointsSource) {
        let awarded = points * self.points_multiplier(source);
        self.total_points += awarded;
        self.events.emit(GameEvent::PointsAwarded {
            points: awarded,
            total: self.total_points,
            source,
        });

        while self.total_points >= self.next_heart_at
            && self.extra_hearts < self.config.max_extra_hearts
        {
            self.extra_hearts += 1;
            self.next_heart_at += self.config.points_for_extra_heart;
            self.player.grant_extra_heart();
            self.events.emit(GameEvent::ExtraHeart {
                total: self.extra_hearts,
            });
            self.events.emit(GameEvent::HealthChanged {
                health: self.player.health,
                max_health: self.player.max_health,
            });
        }
    }

    pub fn add_special_charge(&mut self, amount: u32) {
        let max = self.config.special_charge_max;
        if self.special_charge >= max {
            return;
        }
        self.special_charge = (self.special_charge + amount).min(max);
        self.events.emit(GameEvent::SpecialChanged {
            charge: self.special_charge,
            max,
        });
    }

    /// Paralyses every enemy and empties the meter.
    pub fn activate_special(&mut self) {
        for enemy in self.enemies.iter_mut() {
            enemy.paralyze(self.config.special_duration);
        }
        self.special_charge = 0;
        self.events.emit(GameEvent::SpecialActivated);
        self.events.emit(GameEvent::SpecialChanged {
            charge: 0,
            max: self.config.special_charge_max,
        });
    }

    pub fn enemy_destroyed(&mut self, id: u64, archetype: Archetype) {
        let points = self.config.points_per_enemy * archetype.def().score_multiplier;
        self.add_points(points, PointsSource::Kill);
        self.add_special_charge(1);
        self.events.emit(GameEvent::EnemyDefeated { id, archetype });
    }

    pub fn game_over(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.events.emit(GameEvent::GameOver {
            points: self.total_points,
        });
        info!("[Ridgeline] Game over with {} points", self.total_points);
    }

    /// Collects every pose at the current camera offset. Nothing is drawn
    /// after the game ends.
    pub fn draw(&self) -> Option<Frame> {
        if self.game_over {
            return None;
        }
        let world_x = self.camera.world_x;

        let mut poses = Vec::with_capacity(
            2 + self.enemies.len()
                + self.player_projectiles.len()
                + self.enemy_projectiles.len()
                + self.pickups.len(),
        );
        poses.push(self.player_pose());
        if let Some(boss) = &self.boss {
            let mut pose = Pose::of(PoseKind::Boss, &boss.body);
            pose.flags.dead = boss.is_dead();
            poses.push(pose);
        }
        poses.extend(self.enemies.iter().map(|enemy| {
            let mut pose = Pose::of(PoseKind::Enemy, &enemy.body);
            pose.flags.dead = enemy.is_dead();
            pose
        }));
        poses.extend(self.player_projectiles.iter().map(|p| {
            let mut pose = Pose::of(PoseKind::PlayerProjectile, &p.body);
            pose.rotation = p.angle_degrees();
            pose
        }));
        poses.extend(
            self.enemy_projectiles
                .iter()
                .map(|p| Pose::of(PoseKind::EnemyProjectile, &p.body)),
        );
        poses.extend(self.pickups.iter().map(|pickup| {
            let mut pose = Pose::of(PoseKind::Pickup, &pickup.body);
            pose.y += pickup.float_offset;
            pose.rotation = pickup.rotation;
            pose
        }));

        Some(Frame { world_x, poses })
    }

    fn player_pose(&self) -> Pose {
        let player = &self.player;
        let mut pose = Pose::of(PoseKind::Player, &player.body);
        pose.flags.invulnerable = player.is_invulnerable();
        pose.flags.crouching = player.is_crouching();
        pose.flags.shield = if player.shield_broken {
            ShieldVisual::Broken
        } else if !player.is_blocking() {
            ShieldVisual::None
        } else if player.shield_cracked(&self.config) {
            ShieldVisual::Weak
        } else {
            ShieldVisual::Active
        };
        pose
    }
}

fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.max(0.0)
    } else {
        0.0
    }
}
