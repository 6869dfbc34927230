use bevy::prelude::Resource;
use serde::Serialize;

use crate::entity::Body;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseKind {
    Player,
    Enemy,
    Boss,
    PlayerProjectile,
    EnemyProjectile,
    Pickup,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldVisual {
    #[default]
    None,
    Active,
    Weak,
    Broken,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PoseFlags {
    pub invulnerable: bool,
    pub shield: ShieldVisual,
    pub paralyzed: bool,
    pub dead: bool,
    pub crouching: bool,
}

/// Everything the renderer needs to draw one entity this frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pose {
    pub kind: PoseKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: f32,
    pub clip: Option<&'static str>,
    pub frame: usize,
    /// Degrees, for spinning coins and arcing arrows.
    pub rotation: f32,
    pub flags: PoseFlags,
}

impl Pose {
    pub fn of(kind: PoseKind, body: &Body) -> Self {
        Self {
            kind,
            x: body.x,
            y: body.y,
            width: body.width,
            height: body.height,
            facing: body.direction,
            clip: body.animator.clip.map(|clip| clip.name),
            frame: body.animator.frame,
            rotation: 0.0,
            flags: PoseFlags {
                paralyzed: body.paralyzed,
                ..Default::default()
            },
        }
    }
}

/// One draw call's worth of world state: the camera offset plus every pose.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    pub world_x: f32,
    pub poses: Vec<Pose>,
}

impl Frame {
    pub fn poses_of(&self, kind: PoseKind) -> impl Iterator<Item = &Pose> {
        self.poses.iter().filter(move |p| p.kind == kind)
    }
}

/// Most recent frame handed to the renderer. Stays at the last drawn frame
/// after the game ends.
#[derive(Resource, Default)]
pub struct LatestFrame(pub Option<Frame>);
