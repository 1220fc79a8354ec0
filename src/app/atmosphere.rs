//! Sky systems.
//! The procedural sky only belongs to the world scene; during loading the
//! plain clear colour shows instead.
use bevy::prelude::*;
use bevy_atmosphere::prelude::{AtmosphereModel, AtmosphereSettings as BevyAtmosphereSettings, Nishita};
use bevy_atmosphere::plugin::AtmosphereSkyBox;
use trailhead::lighting::SceneLighting;
use trailhead::scene::GameScene;
use trailhead::settings::Settings;

/// The sky model with the sun placed for the meadow.
#[must_use]
pub fn meadow_sky() -> AtmosphereModel {
    AtmosphereModel::new(Nishita {
        sun_position: SceneLighting::meadow().sky_sun_direction,
        ..default()
    })
}

/// Sync `Settings.atmosphere` fields into the running `BevyAtmosphereSettings`.
///
/// `enabled` is only read at startup; resolution and dithering apply live.
///
/// # Arguments
/// - `settings`: The current settings resource.
/// - `atm_settings`: The sky renderer settings that get updated.
/// - `last`: Cache of the last applied values.
pub fn sync_atmosphere_settings(
    settings: Res<Settings>,
    mut last: Local<Option<(u32, bool)>>,
    mut atm_settings: ResMut<BevyAtmosphereSettings>,
) {
    let wanted = (settings.atmosphere.resolution, settings.atmosphere.dithering);
    if *last == Some(wanted) {
        return;
    }
    atm_settings.resolution = wanted.0;
    atm_settings.dithering = wanted.1;
    *last = Some(wanted);
}

/// Hide the skybox outside the world scene.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_sky_visibility(
    scene: Res<State<GameScene>>,
    mut skies: Query<&mut Visibility, With<AtmosphereSkyBox>>,
) {
    let wanted = if *scene.get() == GameScene::StartingPoint { Visibility::Inherited } else { Visibility::Hidden };
    for mut visibility in &mut skies {
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}
