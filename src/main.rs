use avian3d::prelude::{PhysicsPlugins, PhysicsSet};
use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::transform::TransformSystem;
use bevy::window::{Window, WindowPlugin};
use bevy_atmosphere::prelude::*;
use trailhead::animation::{bind_animation_players, load_animation_library, prepare_animation_graphs, sync_missing_clips};
use trailhead::buttons::{
    animate_buttons, detect_button_contacts, loader as button_loader, place_button_labels, run_button_activations,
    spawn_buttons,
};
use trailhead::debug::DebugDumpPlugin;
use trailhead::joystick::{
    press_jump_button, spawn_rotate_warning, spawn_touch_controls, sync_rotate_warning, sync_touch_controls_visibility,
    track_joystick_touches, VirtualJoystick,
};
use trailhead::lighting::{enter_world_lighting, exit_world_lighting, sync_sun_shadows};
use trailhead::music::{apply_music_state, spawn_music_button, start_music, toggle_music, watch_music_load, MusicState};
use trailhead::player::{
    collect_input, drive_avatar, follow_avatar, reset_input, spawn_avatar, track_jump_finish, DriveSet, InputSignal,
    JoystickInput, JumpTrigger,
};
use trailhead::scene::{
    advance_scene_director, cycle_loading_dots, enter_loading, spawn_transition_overlay, spin_globe,
    sync_transition_overlay, GameScene, SceneDirector,
};
use trailhead::settings::loader as settings_loader;
use trailhead::ui::{setup_debug_overlay, spawn_debug_overlay, toggle_debug_overlay, update_debug_overlay};
use trailhead::world::spawn_world;

mod app;
use app::{meadow_sky, setup, sync_atmosphere_settings, sync_sky_visibility, sync_vsync_settings};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());
    let director = SceneDirector::from_settings(&settings.scene);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Trailhead".to_string(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: app::display::present_mode(settings.graphics.vsync),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(DebugDumpPlugin);

    if settings.atmosphere.enabled {
        app.add_plugins(AtmospherePlugin)
            .insert_resource(meadow_sky())
            .insert_resource(AtmosphereSettings {
                resolution: settings.atmosphere.resolution,
                dithering: settings.atmosphere.dithering,
                ..Default::default()
            });
    }

    app.insert_state(director.active());
    app.enable_state_scoped_entities::<GameScene>();

    app.insert_resource(director);
    app.insert_resource(button_loader::load_buttons_from_dir(button_loader::BUTTONS_DIR));
    app.insert_resource(InputSignal::default());
    app.insert_resource(JoystickInput::default());
    app.insert_resource(JumpTrigger::default());
    app.insert_resource(VirtualJoystick::default());
    app.insert_resource(MusicState::default());
    app.insert_resource(settings.clone());
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, setup);
    app.add_systems(Startup, setup_debug_overlay);
    app.add_systems(Startup, spawn_debug_overlay);
    app.add_systems(Startup, spawn_transition_overlay);
    app.add_systems(Startup, load_animation_library);
    app.add_systems(Startup, spawn_rotate_warning);

    // Scene lifecycles
    app.add_systems(OnEnter(GameScene::Loading), enter_loading);
    app.add_systems(
        OnEnter(GameScene::StartingPoint),
        (
            spawn_world,
            enter_world_lighting,
            spawn_avatar,
            spawn_buttons,
            spawn_touch_controls,
            start_music,
            spawn_music_button,
        ),
    );
    app.add_systems(OnExit(GameScene::StartingPoint), (exit_world_lighting, reset_input));

    app.add_systems(Update, (advance_scene_director, sync_transition_overlay).chain());
    app.add_systems(Update, (spin_globe, cycle_loading_dots).run_if(in_state(GameScene::Loading)));

    // Avatar: input -> controller -> jump bookkeeping, camera after physics
    app.add_systems(
        Update,
        (
            (track_joystick_touches, press_jump_button),
            collect_input,
            drive_avatar.in_set(DriveSet),
            track_jump_finish,
        )
            .chain()
            .run_if(in_state(GameScene::StartingPoint)),
    );
    app.add_systems(
        PostUpdate,
        follow_avatar
            .after(PhysicsSet::Sync)
            .before(TransformSystem::TransformPropagate)
            .run_if(in_state(GameScene::StartingPoint)),
    );
    app.add_systems(Update, (prepare_animation_graphs, sync_missing_clips, bind_animation_players).chain());

    app.add_systems(
        Update,
        (
            (detect_button_contacts, run_button_activations).chain(),
            animate_buttons,
            place_button_labels,
            sync_touch_controls_visibility,
            sync_sun_shadows,
        )
            .run_if(in_state(GameScene::StartingPoint)),
    );

    app.add_systems(Update, (toggle_music, watch_music_load, apply_music_state).chain());
    app.add_systems(Update, start_music.after(toggle_music).run_if(in_state(GameScene::StartingPoint)));

    if settings.atmosphere.enabled {
        app.add_systems(Update, sync_atmosphere_settings);
        app.add_systems(Update, sync_sky_visibility);
    }
    app.add_systems(Update, sync_vsync_settings);
    app.add_systems(Update, sync_rotate_warning);
    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Update, toggle_debug_overlay);
    app.add_systems(Update, update_debug_overlay);

    app.run();
}
