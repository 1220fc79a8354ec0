//! Startup systems that create the long-lived entities.
//!
//! The camera outlives both scenes; everything else that belongs to a scene is
//! spawned on entering it and state-scoped.
use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;
use bevy_atmosphere::prelude::AtmosphereCamera;
use trailhead::player::CameraFollow;
use trailhead::settings::Settings;

/// Spawn the single 3D camera, settled on the spawn point.
///
/// # Arguments
/// - `commands`: Commands used to spawn the camera.
/// - `settings`: Provides the camera offsets, field of view and whether the
///   sky renderer is enabled.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, settings: Res<Settings>) {
    let follow = CameraFollow::settled(Vec3::ZERO, &settings.camera);

    let mut camera = commands.spawn((
        Name::new("camera"),
        Camera3dBundle {
            transform: follow.transform(),
            projection: PerspectiveProjection {
                fov: settings.camera.fov_degrees.to_radians(),
                near: 0.1,
                far: 1000.0,
                ..default()
            }
            .into(),
            ..default()
        },
        follow,
    ));
    if settings.atmosphere.enabled {
        camera.insert(AtmosphereCamera::default());
    }
}
