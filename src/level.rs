use serde::{Deserialize, Serialize};

use crate::ai::Archetype;
use crate::config::WeaponKind;
use crate::geometry::Rect;

const EMBEDDED_LEVEL: &str = include_str!(concat!(env!("OUT_DIR"), "/ridgeline_embedded_level.json"));

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpawn {
    pub weapon: WeaponKind,
    pub x: f32,
    pub y: f32,
}

/// Hazard region. `image` is only a hint for the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pit {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Pit {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    pub archetype: Archetype,
}

/// A wave released all at once when the player passes `trigger_x`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    pub name: String,
    pub trigger_x: f32,
    pub points: Vec<SpawnPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Crossing this x starts the fight.
    pub trigger_x: f32,
    pub left_boundary: f32,
    pub right_boundary: f32,
}

/// Static description of a level, read once when the world is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub width: f32,
    pub player_spawn: (f32, f32),
    pub platforms: Vec<Rect>,
    pub items: Vec<ItemSpawn>,
    pub pits: Vec<Pit>,
    pub spawn_points: Vec<SpawnPoint>,
    pub spawn_groups: Vec<SpawnGroup>,
    pub boss_position: Option<(f32, f32)>,
    pub arena: Option<ArenaBounds>,
}

fn point(x: f32, y: f32, archetype: Archetype) -> SpawnPoint {
    SpawnPoint { x, y, archetype }
}

fn spikes(x: f32) -> Pit {
    Pit {
        x,
        y: 0.0,
        width: 100.0,
        height: 100.0,
        image: Some("spikes".to_string()),
    }
}

impl Default for LevelData {
    fn default() -> Self {
        use Archetype::{Flyer, SkyFaller};
        Self {
            width: 6200.0,
            player_spawn: (0.0, 0.0),
            platforms: vec![
                Rect::new(200.0, 100.0, 100.0, 20.0),
                Rect::new(1000.0, 120.0, 100.0, 20.0),
            ],
            items: vec![ItemSpawn {
                weapon: WeaponKind::Bow,
                x: 1000.0,
                y: 0.0,
            }],
            pits: vec![spikes(500.0), spikes(1200.0), spikes(1300.0), spikes(1400.0)],
            spawn_points: vec![
                point(1000.0, 500.0, SkyFaller),
                point(1500.0, 450.0, SkyFaller),
                point(2000.0, 400.0, SkyFaller),
                point(2500.0, 500.0, SkyFaller),
                point(3000.0, 450.0, SkyFaller),
                point(3500.0, 400.0, SkyFaller),
                point(4500.0, 500.0, SkyFaller),
                point(1800.0, 400.0, Flyer),
                point(2800.0, 350.0, Flyer),
                point(3800.0, 450.0, Flyer),
            ],
            spawn_groups: vec![
                SpawnGroup {
                    name: "first_wave".to_string(),
                    trigger_x: 800.0,
                    points: vec![
                        point(2200.0, 500.0, SkyFaller),
                        point(2250.0, 450.0, SkyFaller),
                        point(2300.0, 300.0, Flyer),
                        point(2600.0, 400.0, SkyFaller),
                    ],
                },
                SpawnGroup {
                    name: "second_wave".to_string(),
                    trigger_x: 1500.0,
                    points: vec![
                        point(3200.0, 550.0, SkyFaller),
                        point(3250.0, 450.0, SkyFaller),
                        point(3400.0, 450.0, SkyFaller),
                        point(3300.0, 250.0, Flyer),
                        point(3450.0, 500.0, SkyFaller),
                    ],
                },
                SpawnGroup {
                    name: "third_wave".to_string(),
                    trigger_x: 2500.0,
                    points: vec![
                        point(4200.0, 500.0, SkyFaller),
                        point(4250.0, 350.0, Flyer),
                        point(4300.0, 450.0, SkyFaller),
                        point(4350.0, 350.0, Flyer),
                        point(4400.0, 500.0, SkyFaller),
                    ],
                },
            ],
            boss_position: Some((5300.0, 0.0)),
            arena: Some(ArenaBounds {
                trigger_x: 5900.0,
                left_boundary: 5000.0,
                right_boundary: 6000.0,
            }),
        }
    }
}

impl LevelData {
    pub fn from_json_str(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| format!("Invalid level JSON: {e}"))
    }

    pub fn load(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?;
        Self::from_json_str(&contents)
    }

    /// Level baked in at build time through `RIDGELINE_EMBED_LEVEL_PATH`, or
    /// the built-in level when nothing was embedded.
    pub fn embedded() -> Result<Self, String> {
        if EMBEDDED_LEVEL.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_json_str(EMBEDDED_LEVEL)
    }
}
