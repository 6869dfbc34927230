mod ai;
mod animation;
mod boss;
mod camera;
mod config;
mod enemy;
mod entity;
mod events;
mod game;
mod game_loop;
mod geometry;
mod input;
mod level;
mod physics_core;
mod pickup;
mod player;
mod presentation;
mod projectile;
mod shell;
mod simulation;
mod state_machine;

use bevy::prelude::*;
use config::GameConfig;
use game::Game;
use level::LevelData;
use shell::HeadlessMode;

fn env_path(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn load_game_config() -> GameConfig {
    let path = env_path("RIDGELINE_CONFIG").unwrap_or_else(|| "game.json".to_string());
    if !std::path::Path::new(&path).exists() {
        return GameConfig::default();
    }
    match GameConfig::load_overrides(&path) {
        Ok(cfg) => {
            println!("[Ridgeline] Loaded config overrides from {}", path);
            cfg
        }
        Err(e) => {
            eprintln!("[Ridgeline] {}", e);
            GameConfig::default()
        }
    }
}

fn embedded_level() -> LevelData {
    LevelData::embedded().unwrap_or_else(|e| {
        eprintln!("[Ridgeline] Embedded level invalid: {}", e);
        LevelData::default()
    })
}

fn load_level() -> LevelData {
    let Some(path) = env_path("RIDGELINE_LEVEL") else {
        return embedded_level();
    };
    match LevelData::load(&path) {
        Ok(level) => {
            println!("[Ridgeline] Loaded level from {}", path);
            level
        }
        Err(e) => {
            eprintln!("[Ridgeline] {}", e);
            embedded_level()
        }
    }
}

fn run_simulation_file(path: &str, level: &LevelData, config: &GameConfig) -> Result<String, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let request: simulation::SimulationRequest =
        serde_json::from_str(&contents).map_err(|e| format!("Invalid request {}: {}", path, e))?;
    let result = simulation::run_simulation(level, config, &request);
    serde_json::to_string_pretty(&result).map_err(|e| format!("Failed to encode result: {}", e))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");
    let config = load_game_config();
    let level = load_level();

    if let Some(pos) = args.iter().position(|a| a == "--simulate") {
        let Some(path) = args.get(pos + 1) else {
            eprintln!("[Ridgeline] --simulate needs a request file");
            std::process::exit(2);
        };
        match run_simulation_file(path, &level, &config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("[Ridgeline] {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut app = App::new();
    app.insert_resource(HeadlessMode(headless));

    if headless {
        // No window, no rendering, just the game loop
        app.add_plugins(MinimalPlugins);
        println!("[Ridgeline] Starting in HEADLESS mode");
    } else {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ridgeline".to_string(),
                resolution: (config.view_width, config.view_height).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }));
        app.insert_resource(ClearColor(Color::srgb(0.35, 0.55, 0.8)));
        app.add_plugins(camera::CameraPlugin);
        println!("[Ridgeline] Starting in WINDOWED mode");
    }

    app.insert_resource(Game::new(config.clone(), level))
        .insert_resource(config)
        .add_plugins(input::InputPlugin)
        .add_plugins(shell::GamePlugin);

    app.run();
}
