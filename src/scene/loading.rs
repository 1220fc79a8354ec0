//! The loading scene: a slowly spinning globe over an "Entering World" caption
//! whose trailing dots cycle while assets stream in.
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use super::GameScene;

const GLOBE_PATH: &str = "background/Miniature_World_Globe_texture_draco.glb";
const GLOBE_SPIN: f32 = 0.5; // rad/s
const DOT_INTERVAL_SECS: f32 = 0.5;
const BACKGROUND: Color = Color::srgb(0.678, 0.820, 0.961); // #ADD1F5

#[derive(Component)]
pub struct LoadingGlobe;

#[derive(Component)]
pub struct LoadingCaption;

/// Cycling "", ".", "..", "..." suffix.
#[derive(Component, Debug, Clone)]
pub struct LoadingDots {
    count: usize,
    timer: Timer,
}

impl LoadingDots {
    #[must_use]
    pub fn new() -> Self {
        LoadingDots { count: 0, timer: Timer::from_seconds(DOT_INTERVAL_SECS, TimerMode::Repeating) }
    }

    /// Step to the next suffix and return it.
    pub fn advance(&mut self) -> &'static str {
        self.count = if self.count >= 3 { 0 } else { self.count + 1 };
        self.suffix()
    }

    #[must_use]
    pub fn suffix(&self) -> &'static str {
        ["", ".", "..", "..."][self.count]
    }
}

impl Default for LoadingDots {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn enter_loading(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(ClearColor(BACKGROUND));

    commands.spawn((
        LoadingGlobe,
        SceneBundle {
            scene: asset_server.load(GltfAssetLabel::Scene(0).from_asset(GLOBE_PATH)),
            transform: Transform::from_xyz(0.0, 0.0, 0.0),
            ..default()
        },
        StateScoped(GameScene::Loading),
    ));
    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight { illuminance: 4_000.0, ..default() },
            transform: Transform::from_xyz(0.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        StateScoped(GameScene::Loading),
    ));

    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    bottom: Val::Percent(22.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
            StateScoped(GameScene::Loading),
        ))
        .with_children(|parent| {
            parent.spawn((
                LoadingCaption,
                LoadingDots::new(),
                TextBundle::from_section(
                    "Entering World",
                    TextStyle { font_size: 28.0, color: Color::srgb(0.21, 0.22, 0.22), ..default() },
                ),
            ));
        });
}

#[allow(clippy::needless_pass_by_value)]
pub fn spin_globe(time: Res<Time>, mut globes: Query<&mut Transform, With<LoadingGlobe>>) {
    for mut t in &mut globes {
        t.rotate_y(GLOBE_SPIN * time.delta_seconds());
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn cycle_loading_dots(time: Res<Time>, mut captions: Query<(&mut Text, &mut LoadingDots), With<LoadingCaption>>) {
    for (mut text, mut dots) in &mut captions {
        if dots.timer.tick(time.delta()).just_finished() {
            let suffix = dots.advance();
            text.sections[0].value = format!("Entering World{suffix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots_cycle_back_to_empty() {
        let mut d = LoadingDots::new();
        assert_eq!(d.suffix(), "");
        let seen: Vec<_> = (0..5).map(|_| d.advance()).collect();
        assert_eq!(seen, vec![".", "..", "...", "", "."]);
    }
}
