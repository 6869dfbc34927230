use serde::Serialize;

/// A named strip of frames. Frame images themselves belong to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Clip {
    pub name: &'static str,
    pub frame_count: usize,
}

impl Clip {
    pub const fn new(name: &'static str, frame_count: usize) -> Self {
        Self { name, frame_count }
    }
}

pub const PLAYER_IDLE: Clip = Clip::new("player_idle", 7);
pub const PLAYER_WALK: Clip = Clip::new("player_walk", 15);
pub const PLAYER_RUN_SHOOT: Clip = Clip::new("player_run_shoot", 16);
pub const PLAYER_JUMP: Clip = Clip::new("player_jump", 8);
pub const PLAYER_CROUCH: Clip = Clip::new("player_crouch", 10);
pub const PLAYER_SHIELD: Clip = Clip::new("player_shield", 12);
pub const PLAYER_SHIELD_CRACKED: Clip = Clip::new("player_shield_cracked", 5);
pub const PLAYER_ATTACK_SWORD: Clip = Clip::new("player_attack_sword", 3);
pub const PLAYER_ATTACK_PISTOL: Clip = Clip::new("player_attack_pistol", 12);
pub const PLAYER_BOW_CHARGE: Clip = Clip::new("player_bow_charge", 6);
pub const PLAYER_SPECIAL: Clip = Clip::new("player_special", 1);

pub const GROUNDER_WALK: Clip = Clip::new("grounder_walk", 15);
pub const GROUNDER_DEAD: Clip = Clip::new("grounder_dead", 1);
pub const FLYER_FLY: Clip = Clip::new("flyer_fly", 10);
pub const SKY_FALLER_FALL: Clip = Clip::new("sky_faller_fall", 1);
pub const SKY_FALLER_RUN: Clip = Clip::new("sky_faller_run", 6);

pub const BOSS_ACTIVATE: Clip = Clip::new("boss_activate", 3);
pub const BOSS_IDLE: Clip = Clip::new("boss_idle", 8);
pub const BOSS_ATTACK1: Clip = Clip::new("boss_attack1", 17);
pub const BOSS_ATTACK2: Clip = Clip::new("boss_attack2", 9);
pub const BOSS_DEATH: Clip = Clip::new("boss_death", 33);

pub const ARROW: Clip = Clip::new("arrow", 1);
pub const BULLET: Clip = Clip::new("bullet", 1);
pub const COIN: Clip = Clip::new("coin", 1);

/// Plays one clip at a time. A looping clip wraps; a one-shot clip holds its
/// last frame.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    pub clip: Option<Clip>,
    pub frame: usize,
    pub timer: f32,
    pub frame_duration: f32,
    pub looping: bool,
}

impl Animator {
    /// Starts `clip` from frame 0. Replaying the active clip is ignored.
    pub fn play(&mut self, clip: Clip, frame_duration: f32, looping: bool) -> bool {
        if self.clip == Some(clip) {
            return false;
        }
        self.clip = Some(clip);
        self.frame = 0;
        self.timer = 0.0;
        self.frame_duration = frame_duration;
        self.looping = looping;
        true
    }

    pub fn stop(&mut self) {
        self.clip = None;
        self.frame = 0;
        self.timer = 0.0;
    }

    /// Returns true when the visible frame changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(clip) = self.clip else {
            return false;
        };
        self.timer += dt;
        if self.timer <= self.frame_duration {
            return false;
        }
        self.timer = 0.0;
        if clip.frame_count <= 1 {
            return false;
        }
        let before = self.frame;
        self.frame = if self.looping {
            (self.frame + 1) % clip.frame_count
        } else {
            (self.frame + 1).min(clip.frame_count - 1)
        };
        self.frame != before
    }

    pub fn set_frame(&mut self, frame: usize) {
        if let Some(clip) = self.clip {
            self.frame = frame.min(clip.frame_count.saturating_sub(1));
        }
    }

    pub fn is_on_last_frame(&self) -> bool {
        self.clip
            .map(|clip| self.frame + 1 >= clip.frame_count)
            .unwrap_or(false)
    }

    pub fn is_playing(&self, clip: Clip) -> bool {
        self.clip == Some(clip)
    }
}
