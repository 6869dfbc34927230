use bevy::prelude::*;
use serde::Serialize;

use crate::config::GameConfig;
use crate::presentation::LatestFrame;

/// Horizontal follow camera. `world_x` is the offset applied to the world, so
/// the left edge of the view sits at world coordinate `-world_x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CameraRig {
    pub world_x: f32,
}

impl CameraRig {
    /// Eases toward keeping the player a quarter of the way into the view,
    /// then clamps to the level.
    pub fn follow(&mut self, player_x: f32, config: &GameConfig, level_width: f32) -> f32 {
        let target = -player_x + config.view_width / 4.0;
        self.world_x += (target - self.world_x) * config.camera_smoothing;

        let min_x = (-level_width + config.view_width).min(config.camera_max_x);
        self.world_x = self.world_x.clamp(min_x, config.camera_max_x);
        self.world_x
    }

    /// Visible world range `(left, right)`.
    pub fn visible_span(&self, view_width: f32) -> (f32, f32) {
        (-self.world_x, -self.world_x + view_width)
    }
}

#[derive(Component)]
pub struct MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, sync_camera);
    }
}

fn spawn_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        MainCamera,
        Camera2d,
        Transform::from_xyz(config.view_width / 2.0, config.view_height / 2.0, 100.0),
    ));
}

fn sync_camera(
    frame: Res<LatestFrame>,
    config: Res<GameConfig>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(frame) = &frame.0 else {
        return;
    };
    let Ok(mut cam_transform) = camera_query.get_single_mut() else {
        return;
    };
    cam_transform.translation.x = -frame.world_x + config.view_width / 2.0;
    cam_transform.translation.y = config.view_height / 2.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Frame;

    #[test]
    fn follow_eases_and_clamps() {
        let config = GameConfig::default();
        let mut rig = CameraRig::default();

        // Near the start the camera is pinned at its maximum offset.
        rig.follow(0.0, &config, 6200.0);
        assert_eq!(rig.world_x, 50.0);

        rig.follow(1000.0, &config, 6200.0);
        let target = -1000.0 + 200.0;
        assert_eq!(rig.world_x, 50.0 + (target - 50.0) * 0.5);

        for _ in 0..40 {
            rig.follow(9000.0, &config, 6200.0);
        }
        assert_eq!(rig.world_x, -6200.0 + 800.0);
    }

    #[test]
    fn visible_span_tracks_offset() {
        let rig = CameraRig { world_x: -1000.0 };
        assert_eq!(rig.visible_span(800.0), (1000.0, 1800.0));
    }

    #[test]
    fn camera_system_follows_latest_frame() {
        let mut app = App::new();
        app.insert_resource(GameConfig::default())
            .insert_resource(LatestFrame(Some(Frame {
                world_x: -1200.0,
                poses: Vec::new(),
            })))
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, sync_camera);
        app.update();

        let mut query = app
            .world_mut()
            .query_filtered::<&Transform, With<MainCamera>>();
        let transform = query.single(app.world());
        assert_eq!(transform.translation.x, 1600.0);
        assert_eq!(transform.translation.y, 300.0);
    }
}
