use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Every tunable constant of the simulation. Times are seconds, velocities are
/// world units per fixed tick, distances are world units.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_speed: f32,
    pub player_acceleration: f32,
    pub player_friction: f32,
    pub player_air_resistance: f32,
    pub player_health: i32,
    pub player_width: f32,
    pub player_height: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub jump_cut: f32,
    pub coyote_time: f32,
    pub jump_buffer: f32,
    pub camera_smoothing: f32,
    pub camera_max_x: f32,
    pub invulnerability_duration: f32,
    pub special_charge_max: u32,
    pub special_duration: f32,
    pub special_state_duration: f32,
    pub defense_knockback: f32,
    pub view_width: f32,
    pub view_height: f32,
    pub pit_damage: i32,
    pub pit_damage_to_enemies: f32,
    pub respawn_delay: f32,
    pub respawn_position: (f32, f32),
    pub shield_max: f32,
    pub shield_drain: f32,
    pub shield_regen: f32,
    pub shield_crack_ratio: f32,
    pub shield_broken_cooldown: f32,
    pub shield_broken_exit_delay: f32,
    pub shield_restore: f32,
    pub points_per_enemy: f32,
    pub points_for_extra_heart: f32,
    pub max_extra_hearts: u32,
    pub enemy_spawn_interval: f32,
    pub enemy_spawn_interval_min: f32,
    pub enemy_spawn_interval_step: f32,
    pub max_enemies_on_screen: usize,
    pub wave_spawn_count: usize,
    pub spawn_trigger_distance: f32,
    pub projectile_cull_buffer: f32,
    pub fixed_step: f32,
    pub max_frame_time: f32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 7.0,
            player_acceleration: 1.5,
            player_friction: 0.8,
            player_air_resistance: 0.95,
            player_health: 8,
            player_width: 200.0,
            player_height: 180.0,
            gravity: 0.6,
            jump_force: 16.0,
            jump_cut: 0.5,
            coyote_time: 0.1,
            jump_buffer: 0.15,
            camera_smoothing: 0.5,
            camera_max_x: 50.0,
            invulnerability_duration: 2.0,
            special_charge_max: 6,
            special_duration: 4.0,
            special_state_duration: 0.4,
            defense_knockback: 15.0,
            view_width: 800.0,
            view_height: 600.0,
            pit_damage: 1,
            pit_damage_to_enemies: 2.0,
            respawn_delay: 0.01,
            respawn_position: (100.0, 100.0),
            shield_max: 100.0,
            shield_drain: 0.5,
            shield_regen: 0.5,
            shield_crack_ratio: 0.3,
            shield_broken_cooldown: 3.0,
            shield_broken_exit_delay: 0.5,
            shield_restore: 20.0,
            points_per_enemy: 2.0,
            points_for_extra_heart: 1000.0,
            max_extra_hearts: 20,
            enemy_spawn_interval: 3.0,
            enemy_spawn_interval_min: 0.3,
            enemy_spawn_interval_step: 0.05,
            max_enemies_on_screen: 8,
            wave_spawn_count: 2,
            spawn_trigger_distance: 200.0,
            projectile_cull_buffer: 1000.0,
            fixed_step: 1.0 / 60.0,
            max_frame_time: 0.1,
            seed: 0x5EED,
        }
    }
}

impl GameConfig {
    /// Reads a JSON file whose fields override the defaults. Missing fields keep
    /// their default value.
    pub fn load_overrides(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| format!("Invalid config JSON: {e}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Sword,
    Bow,
    Pistol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Melee,
    Ranged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    Arrow,
    Bullet,
}

#[derive(Clone, Copy, Debug)]
pub struct WeaponDef {
    pub name: &'static str,
    pub class: WeaponClass,
    pub damage: i32,
    pub cooldown: f32,
    /// Present for weapons fired by holding and releasing attack.
    pub max_charge_time: Option<f32>,
    pub shot: Option<ShotKind>,
}

const SWORD: WeaponDef = WeaponDef {
    name: "sword",
    class: WeaponClass::Melee,
    damage: 2,
    cooldown: 0.15,
    max_charge_time: None,
    shot: None,
};

const BOW: WeaponDef = WeaponDef {
    name: "bow",
    class: WeaponClass::Ranged,
    damage: 2,
    cooldown: 0.2,
    max_charge_time: Some(1.5),
    shot: Some(ShotKind::Arrow),
};

const PISTOL: WeaponDef = WeaponDef {
    name: "pistol",
    class: WeaponClass::Ranged,
    damage: 3,
    cooldown: 0.2,
    max_charge_time: None,
    shot: Some(ShotKind::Bullet),
};

impl WeaponKind {
    pub fn def(self) -> &'static WeaponDef {
        match self {
            WeaponKind::Sword => &SWORD,
            WeaponKind::Bow => &BOW,
            WeaponKind::Pistol => &PISTOL,
        }
    }

    pub fn is_ranged(self) -> bool {
        self.def().class == WeaponClass::Ranged
    }

    pub fn is_charged(self) -> bool {
        self.def().max_charge_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let cfg = GameConfig::from_json_str(r#"{ "player_speed": 9.5, "seed": 7 }"#)
            .expect("valid config");
        assert_eq!(cfg.player_speed, 9.5);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.jump_force, 16.0);
        assert_eq!(cfg.special_charge_max, 6);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.contains("Invalid config JSON"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = GameConfig::load_overrides("/definitely/not/here.json").unwrap_err();
        assert!(err.contains("Failed to read"));
    }

    #[test]
    fn weapon_table_matches_roles() {
        assert!(!WeaponKind::Sword.is_ranged());
        assert!(WeaponKind::Bow.is_charged());
        assert!(WeaponKind::Pistol.is_ranged());
        assert!(!WeaponKind::Pistol.is_charged());
        assert_eq!(WeaponKind::Pistol.def().damage, 3);
        assert_eq!(WeaponKind::Bow.def().shot, Some(ShotKind::Arrow));
    }
}
