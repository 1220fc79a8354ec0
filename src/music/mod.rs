//! Looping background music with a play/pause toggle.
//!
//! Playback starts optimistically when the world opens. If the track fails to
//! load, the state drops to "not playing" and stays there until the user hits
//! the toggle, which queues one fresh attempt.
use bevy::asset::LoadState;
use bevy::audio::Volume;
use bevy::prelude::*;

use crate::scene::GameScene;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MusicStatus {
    #[default]
    NotStarted,
    Playing,
    Paused,
    Failed,
}

#[derive(Resource, Debug, Default)]
pub struct MusicState {
    status: MusicStatus,
    track: Option<Handle<AudioSource>>,
}

impl MusicState {
    #[must_use]
    pub fn status(&self) -> MusicStatus {
        self.status
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == MusicStatus::Playing
    }

    /// Mark playback as started. Does nothing unless an attempt is pending.
    pub fn start(&mut self) -> bool {
        if self.status != MusicStatus::NotStarted {
            return false;
        }
        self.status = MusicStatus::Playing;
        true
    }

    pub fn fail(&mut self) {
        self.status = MusicStatus::Failed;
    }

    /// Flip between playing and paused. After a failure the toggle queues a
    /// new start instead. Returns the new playing flag.
    pub fn toggle(&mut self) -> bool {
        self.status = match self.status {
            MusicStatus::Playing => MusicStatus::Paused,
            MusicStatus::Paused => MusicStatus::Playing,
            MusicStatus::Failed => {
                self.track = None;
                MusicStatus::NotStarted
            }
            MusicStatus::NotStarted => MusicStatus::NotStarted,
        };
        self.is_playing()
    }
}

/// Music volume from settings, clamped to `[0, 1]`.
#[must_use]
pub fn clamped_volume(settings: &Settings) -> f32 {
    let v = settings.audio.music_volume;
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[derive(Component)]
pub struct BackgroundMusic;

/// On-screen toggle; hidden while loading.
#[derive(Component)]
pub struct MusicButton;

#[derive(Component)]
pub struct MusicButtonLabel;

fn button_caption(playing: bool) -> &'static str {
    if playing { "MUSIC ON" } else { "MUSIC OFF" }
}

/// Spawn the looping track when an attempt is pending. Runs on entering the
/// world and again each frame there, which picks up retries from the toggle.
#[allow(clippy::needless_pass_by_value)]
pub fn start_music(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<Settings>,
    mut music: ResMut<MusicState>,
    previous: Query<Entity, With<BackgroundMusic>>,
) {
    if !settings.audio.music_enabled || music.status != MusicStatus::NotStarted {
        return;
    }
    for entity in &previous {
        commands.entity(entity).despawn();
    }
    let track: Handle<AudioSource> = asset_server.load(settings.audio.music_path.clone());
    commands.spawn((
        Name::new("music"),
        BackgroundMusic,
        AudioBundle {
            source: track.clone(),
            settings: PlaybackSettings::LOOP.with_volume(Volume::new(clamped_volume(&settings))),
        },
    ));
    music.track = Some(track);
    music.start();
    info!("music started: {}", settings.audio.music_path);
}

/// Drop to "not playing" if the track cannot be loaded.
#[allow(clippy::needless_pass_by_value)]
pub fn watch_music_load(asset_server: Res<AssetServer>, mut music: ResMut<MusicState>) {
    if music.status == MusicStatus::Failed {
        return;
    }
    let Some(track) = music.track.as_ref() else { return };
    if let Some(LoadState::Failed(e)) = asset_server.get_load_state(track) {
        warn!("music unavailable: {e}");
        music.fail();
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn spawn_music_button(mut commands: Commands, music: Res<MusicState>) {
    commands
        .spawn((
            MusicButton,
            ButtonBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(16.0),
                    right: Val::Px(16.0),
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.35).into(),
                border_radius: BorderRadius::all(Val::Px(8.0)),
                ..default()
            },
            StateScoped(GameScene::StartingPoint),
        ))
        .with_children(|b| {
            b.spawn((
                MusicButtonLabel,
                TextBundle::from_section(
                    button_caption(music.is_playing()),
                    TextStyle { font_size: 18.0, color: Color::WHITE, ..default() },
                ),
            ));
        });
}

/// Toggle on the configured key or a click on the on-screen button.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_music(
    kb: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<MusicButton>)>,
    mut music: ResMut<MusicState>,
) {
    let key = settings.controls.key("toggle_music", KeyCode::KeyM);
    let clicked = buttons.iter().any(|i| *i == Interaction::Pressed);
    if kb.just_pressed(key) || clicked {
        let playing = music.toggle();
        debug!("music toggled, playing = {playing}");
    }
}

/// Push state and volume into the audio sink and refresh the button caption.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_music_state(
    music: Res<MusicState>,
    settings: Res<Settings>,
    sinks: Query<&AudioSink, With<BackgroundMusic>>,
    mut labels: Query<&mut Text, With<MusicButtonLabel>>,
) {
    if settings.is_changed() {
        for sink in &sinks {
            sink.set_volume(clamped_volume(&settings));
        }
    }
    if !music.is_changed() {
        return;
    }
    for sink in &sinks {
        if music.is_playing() {
            sink.play();
        } else {
            sink.pause();
        }
    }
    for mut text in &mut labels {
        text.sections[0].value = button_caption(music.is_playing()).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_only_after_start() {
        let mut m = MusicState::default();
        assert!(!m.toggle());
        assert_eq!(m.status(), MusicStatus::NotStarted);
        assert!(m.start());
        assert!(!m.start());
        assert!(m.is_playing());
        assert!(!m.toggle());
        assert_eq!(m.status(), MusicStatus::Paused);
        assert!(m.toggle());
    }

    #[test]
    fn failure_waits_for_toggle_to_retry() {
        let mut m = MusicState::default();
        m.start();
        m.fail();
        assert!(!m.is_playing());
        assert!(!m.start());
        assert_eq!(m.status(), MusicStatus::Failed);

        assert!(!m.toggle());
        assert_eq!(m.status(), MusicStatus::NotStarted);
        assert!(m.start());
        assert!(m.is_playing());
    }

    #[test]
    fn toggle_key_after_failure_restarts_playback() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(Settings::default())
            .insert_resource(MusicState { status: MusicStatus::Failed, track: None })
            .add_systems(Update, toggle_music);
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::KeyM);
        app.update();
        assert_eq!(app.world().resource::<MusicState>().status(), MusicStatus::NotStarted);
    }

    #[test]
    fn volume_is_clamped() {
        let mut s = Settings::default();
        assert_eq!(clamped_volume(&s), 0.8);
        s.audio.music_volume = 3.0;
        assert_eq!(clamped_volume(&s), 1.0);
        s.audio.music_volume = -1.0;
        assert_eq!(clamped_volume(&s), 0.0);
        s.audio.music_volume = f32::NAN;
        assert_eq!(clamped_volume(&s), 0.0);
    }
}
