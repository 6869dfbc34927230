use bevy::gizmos::config::GizmoConfigStore;
use bevy::prelude::*;

use crate::game::Game;
use crate::input::HeldControls;
use crate::presentation::{LatestFrame, Pose, PoseKind, ShieldVisual};

/// Set when running without a window. The app then exits as soon as the game
/// ends instead of leaving the last frame on screen.
#[derive(Resource, Clone, Copy, Default)]
pub struct HeadlessMode(pub bool);

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LatestFrame>()
            .init_resource::<HeadlessMode>()
            .add_systems(Startup, start_game)
            .add_systems(Update, (drive_game, log_game_events, exit_when_over).chain())
            .add_systems(
                PostUpdate,
                draw_world.run_if(resource_exists::<GizmoConfigStore>),
            );
    }
}

fn start_game(mut game: ResMut<Game>) {
    game.start();
}

/// Feeds real frame time into the fixed-step core and publishes what to draw.
fn drive_game(
    time: Res<Time>,
    held: Res<HeldControls>,
    mut game: ResMut<Game>,
    mut latest: ResMut<LatestFrame>,
) {
    game.advance(time.delta_secs(), &held);
    if let Some(frame) = game.draw() {
        latest.0 = Some(frame);
    }
}

fn log_game_events(mut game: ResMut<Game>) {
    for event in game.events.drain() {
        debug!("[Ridgeline] frame {}: {:?}", event.frame, event.event);
    }
}

fn exit_when_over(game: Res<Game>, headless: Res<HeadlessMode>, mut exit: EventWriter<AppExit>) {
    if headless.0 && game.is_game_over() {
        exit.send(AppExit::Success);
    }
}

fn pose_color(pose: &Pose) -> Color {
    if pose.flags.dead {
        return Color::srgba(0.5, 0.5, 0.5, 0.6);
    }
    if pose.flags.paralyzed {
        return Color::srgb(0.55, 0.75, 1.0);
    }
    match pose.kind {
        PoseKind::Player if pose.flags.invulnerable => Color::srgba(1.0, 1.0, 1.0, 0.5),
        PoseKind::Player => Color::srgb(0.95, 0.95, 0.95),
        PoseKind::Enemy => Color::srgb(0.9, 0.3, 0.25),
        PoseKind::Boss => Color::srgb(0.7, 0.1, 0.6),
        PoseKind::PlayerProjectile => Color::srgb(1.0, 0.9, 0.3),
        PoseKind::EnemyProjectile => Color::srgb(1.0, 0.5, 0.1),
        PoseKind::Pickup => Color::srgb(1.0, 0.8, 0.0),
    }
}

fn shield_color(shield: ShieldVisual) -> Option<Color> {
    match shield {
        ShieldVisual::None => None,
        ShieldVisual::Active => Some(Color::srgba(0.3, 0.7, 1.0, 0.9)),
        ShieldVisual::Weak => Some(Color::srgba(0.9, 0.6, 0.2, 0.9)),
        ShieldVisual::Broken => Some(Color::srgba(0.9, 0.2, 0.2, 0.6)),
    }
}

fn box_center(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x + width / 2.0, y + height / 2.0)
}

/// Outline renderer. Level geometry comes straight from the game, actors
/// from the latest frame.
fn draw_world(mut gizmos: Gizmos, game: Res<Game>, latest: Res<LatestFrame>) {
    let Some(frame) = &latest.0 else {
        return;
    };

    for platform in &game.level.platforms {
        gizmos.rect_2d(
            box_center(platform.x, platform.y, platform.width, platform.height),
            Vec2::new(platform.width, platform.height),
            Color::srgb(0.45, 0.35, 0.2),
        );
    }
    for pit in &game.level.pits {
        gizmos.rect_2d(
            box_center(pit.x, pit.y, pit.width, pit.height),
            Vec2::new(pit.width, pit.height),
            Color::srgb(0.2, 0.2, 0.25),
        );
    }

    for pose in &frame.poses {
        let center = box_center(pose.x, pose.y, pose.width, pose.height);
        let size = Vec2::new(pose.width, pose.height);
        gizmos.rect_2d(
            Isometry2d::new(center, Rot2::degrees(pose.rotation)),
            size,
            pose_color(pose),
        );
        if let Some(color) = shield_color(pose.flags.shield) {
            gizmos.circle_2d(center, pose.width.max(pose.height) * 0.6, color);
        }
    }
}
