use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::events::FrameEvent;
use crate::game::Game;
use crate::input::{ControlTracker, HeldControls};
use crate::level::LevelData;
use crate::player::PlayerState;

#[derive(Deserialize, Clone)]
pub struct SimulationRequest {
    pub inputs: Vec<SimInput>,
    pub max_frames: u32,
    #[serde(default = "default_record_interval")]
    pub record_interval: u32,
    /// Replaces the caller's config for this run.
    pub config: Option<GameConfig>,
    /// Replaces the caller's level for this run.
    pub level: Option<LevelData>,
}

fn default_record_interval() -> u32 { 1 }

/// Holds `action` from `frame` for `duration` frames (at least one).
#[derive(Deserialize, Clone)]
pub struct SimInput {
    pub frame: u32,
    pub action: String,
    #[serde(default)]
    pub duration: u32,
}

#[derive(Serialize, Clone)]
pub struct SimulationResult {
    pub outcome: String,
    pub frames_elapsed: u32,
    pub points: f32,
    pub trace: Vec<TraceFrame>,
    pub events: Vec<FrameEvent>,
}

#[derive(Serialize, Clone)]
pub struct TraceFrame {
    pub frame: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
    pub state: PlayerState,
    pub health: i32,
    pub camera_x: f32,
    pub player_shots: usize,
}

fn held_for(actions: &[&str]) -> HeldControls {
    let has = |name: &str| actions.iter().any(|a| *a == name);
    let mut x = 0.0;
    if has("left") {
        x -= 1.0;
    }
    if has("right") {
        x += 1.0;
    }
    HeldControls {
        x,
        jump: has("jump") || has("up"),
        attack: has("attack"),
        block: has("block"),
        special: has("special"),
        crouch: has("crouch"),
        analog_down: has("down"),
    }
}

fn trace_frame(frame: u32, game: &Game) -> TraceFrame {
    let body = &game.player.body;
    TraceFrame {
        frame,
        x: body.x,
        y: body.y,
        vx: body.vx,
        vy: body.vy,
        grounded: body.grounded,
        state: game.player.state(),
        health: game.player.health,
        camera_x: game.camera.world_x,
        player_shots: game.player_projectiles.len(),
    }
}

/// Plays the scripted inputs through a full game, one fixed tick per frame,
/// and reports the player's trajectory plus every event raised.
pub fn run_simulation(
    level: &LevelData,
    config: &GameConfig,
    request: &SimulationRequest,
) -> SimulationResult {
    let config = request.config.clone().unwrap_or_else(|| config.clone());
    let level = request.level.clone().unwrap_or_else(|| level.clone());
    let mut game = Game::new(config, level);
    game.start();

    // Pre-process inputs into per-frame active actions
    let mut active_inputs: Vec<Vec<&str>> = vec![Vec::new(); request.max_frames as usize];
    for input in &request.inputs {
        let duration = input.duration.max(1);
        for f in input.frame..input.frame.saturating_add(duration).min(request.max_frames) {
            active_inputs[f as usize].push(input.action.as_str());
        }
    }

    let mut tracker = ControlTracker::default();
    let mut trace = Vec::new();
    let mut events = game.events.drain();
    let mut outcome = "timeout".to_string();
    let mut frames_elapsed = 0;

    for frame in 0..request.max_frames {
        let controls = tracker.sample(&held_for(&active_inputs[frame as usize]));
        game.tick(&controls);
        frames_elapsed = frame + 1;
        events.extend(game.events.drain());

        if game.is_game_over() {
            outcome = "game_over".to_string();
            trace.push(trace_frame(frame, &game));
            break;
        }

        if request.record_interval > 0 && frame % request.record_interval == 0 {
            trace.push(trace_frame(frame, &game));
        }
    }

    SimulationResult {
        outcome,
        frames_elapsed,
        points: game.total_points,
        trace,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GameEvent;

    fn quiet_level() -> LevelData {
        LevelData {
            pits: Vec::new(),
            spawn_points: Vec::new(),
            spawn_groups: Vec::new(),
            ..LevelData::default()
        }
    }

    fn quiet_config() -> GameConfig {
        GameConfig {
            enemy_spawn_interval: 1.0e9,
            ..GameConfig::default()
        }
    }

    fn request(json: &str) -> SimulationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn walking_right_moves_player() {
        let req = request(
            r#"{"inputs": [{"frame": 0, "action": "right", "duration": 60}], "max_frames": 60}"#,
        );
        let result = run_simulation(&quiet_level(), &quiet_config(), &req);
        assert_eq!(result.outcome, "timeout");
        assert_eq!(result.frames_elapsed, 60);
        assert_eq!(result.trace.len(), 60);
        let last = result.trace.last().unwrap();
        assert!(last.x > 150.0);
        assert_eq!(last.state, PlayerState::Walking);
    }

    #[test]
    fn jump_leaves_the_ground_and_lands() {
        let req = request(
            r#"{"inputs": [{"frame": 5, "action": "jump", "duration": 20}], "max_frames": 120, "record_interval": 1}"#,
        );
        let result = run_simulation(&quiet_level(), &quiet_config(), &req);
        assert!(result.trace.iter().any(|t| !t.grounded && t.y > 50.0));
        assert!(result.trace.last().unwrap().grounded);
    }

    #[test]
    fn game_over_stops_the_run() {
        let req = request(r#"{"inputs": [], "max_frames": 10}"#);
        let config = GameConfig {
            player_health: 1,
            ..quiet_config()
        };
        let mut level = quiet_level();
        level.pits.push(crate::level::Pit {
            x: 0.0,
            y: 0.0,
            width: 300.0,
            height: 100.0,
            image: None,
        });
        let result = run_simulation(&level, &config, &req);
        assert_eq!(result.outcome, "game_over");
        assert_eq!(result.frames_elapsed, 1);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.event, GameEvent::GameOver { .. })));
    }

    #[test]
    fn record_interval_thins_the_trace() {
        let req = request(r#"{"inputs": [], "max_frames": 30, "record_interval": 10}"#);
        let result = run_simulation(&quiet_level(), &quiet_config(), &req);
        let frames: Vec<u32> = result.trace.iter().map(|t| t.frame).collect();
        assert_eq!(frames, vec![0, 10, 20]);
    }

    #[test]
    fn shots_survive_deep_into_the_level() {
        let mut level = quiet_level();
        level.player_spawn = (3000.0, 0.0);
        let req = request(
            r#"{"inputs": [{"frame": 5, "action": "attack", "duration": 1}], "max_frames": 30}"#,
        );
        let result = run_simulation(&level, &quiet_config(), &req);
        assert!(result.trace[4].camera_x < -2000.0);
        assert_eq!(result.trace[5].player_shots, 1);
        assert_eq!(result.trace[20].player_shots, 1);
    }
}
