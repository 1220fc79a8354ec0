//! Fixed daytime lighting for the world scene.
//!
//! The meadow has no day/night cycle: one ambient term, one shadow-casting
//! sun and a pale linear fog that hides the far walls.
use bevy::pbr::{FogFalloff, FogSettings};
use bevy::prelude::*;

use crate::scene::GameScene;
use crate::settings::Settings;

/// Lighting parameters of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLighting {
    pub ambient_color: Color,
    pub ambient_brightness: f32,

    pub sun_position: Vec3, // looks at the origin
    pub sun_illuminance: f32,
    pub shadow_extent: f32, // half-size of the area covered by the shadow cascade

    pub fog_color: Color,
    pub fog_start: f32,
    pub fog_end: f32,

    pub sky_sun_direction: Vec3,
}

impl SceneLighting {
    /// The meadow preset.
    #[must_use]
    pub fn meadow() -> Self {
        SceneLighting {
            ambient_color: Color::WHITE,
            ambient_brightness: 400.0,
            sun_position: Vec3::new(5.0, 8.0, 5.0),
            sun_illuminance: 8_000.0,
            shadow_extent: 20.0,
            fog_color: Color::srgb(0.878, 0.957, 1.0), // #e0f4ff
            fog_start: 20.0,
            fog_end: 45.0,
            sky_sun_direction: Vec3::new(5.0, 1.0, 8.0).normalize(),
        }
    }

    #[must_use]
    pub fn fog(&self) -> FogSettings {
        FogSettings {
            color: self.fog_color,
            falloff: FogFalloff::Linear { start: self.fog_start, end: self.fog_end },
            ..default()
        }
    }

    /// Fraction of the fog colour mixed in at `distance` from the camera.
    #[must_use]
    pub fn fog_amount(&self, distance: f32) -> f32 {
        ((distance - self.fog_start) / (self.fog_end - self.fog_start)).clamp(0.0, 1.0)
    }
}

/// The world's sun.
#[derive(Component)]
pub struct Sun;

/// Light the world scene and put fog on the camera.
#[allow(clippy::needless_pass_by_value)]
pub fn enter_world_lighting(
    mut commands: Commands,
    settings: Res<Settings>,
    cameras: Query<Entity, With<Camera3d>>,
) {
    let preset = SceneLighting::meadow();

    commands.insert_resource(AmbientLight { color: preset.ambient_color, brightness: preset.ambient_brightness });
    commands.insert_resource(ClearColor(preset.fog_color));

    commands.spawn((
        Sun,
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: preset.sun_illuminance,
                shadows_enabled: settings.graphics.shadows,
                ..default()
            },
            cascade_shadow_config: bevy::pbr::CascadeShadowConfigBuilder {
                maximum_distance: preset.shadow_extent * 2.0,
                ..default()
            }
            .build(),
            transform: Transform::from_translation(preset.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        StateScoped(GameScene::StartingPoint),
    ));

    for camera in &cameras {
        commands.entity(camera).insert(preset.fog());
    }
    debug!("world lighting on");
}

/// Drop the world fog when leaving the world scene.
#[allow(clippy::needless_pass_by_value)]
pub fn exit_world_lighting(mut commands: Commands, cameras: Query<Entity, (With<Camera3d>, With<FogSettings>)>) {
    for camera in &cameras {
        commands.entity(camera).remove::<FogSettings>();
    }
}

/// Apply `Settings.graphics.shadows` to the sun at runtime.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_sun_shadows(settings: Res<Settings>, mut suns: Query<&mut DirectionalLight, With<Sun>>) {
    let desired = settings.graphics.shadows;
    for mut light in &mut suns {
        if light.shadows_enabled != desired {
            light.shadows_enabled = desired;
        }
    }
}
