//! Debug overlay.
//!
//! A text block in the top-left corner showing FPS, frame time and the avatar
//! controller state (position, clip, grounded/jumping, idle timer). Toggled
//! with F1 by default and refreshed every half second.

use bevy::diagnostic::{Diagnostic, DiagnosticsStore};
use bevy::prelude::*;

use crate::animation::AnimationBank;
use crate::debug::ControllerSnapshot;
use crate::player::{Avatar, Locomotion};
use crate::settings::Settings;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    /// Whether the overlay is currently visible.
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Component)]
pub struct DebugOverlayText;

/// Insert debug overlay resources.
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(0.5, TimerMode::Repeating)));
    commands.insert_resource(DebugOverlayState::default());
}

/// Toggle the debug overlay visibility on the configured key (F1 default).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    settings: Res<Settings>,
    input: Res<ButtonInput<KeyCode>>,
) {
    if input.just_pressed(settings.controls.key("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

/// Grouped parameters for [`update_debug_overlay`].
#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub avatar: Query<'w, 's, (&'static GlobalTransform, &'static Locomotion, &'static AnimationBank), With<Avatar>>,
}

/// Overlay body for the given numbers.
#[must_use]
pub fn overlay_text(fps: f64, frame_time: f64, controller: Option<&ControllerSnapshot>) -> String {
    let controller = controller.map_or_else(|| "Avatar: N/A".to_string(), ToString::to_string);
    format!("FPS: {fps:.1}\nFrame Time: {:.2} ms\n{controller}", frame_time * 1000.0)
}

/// Refresh the overlay text once per interval.
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&bevy::diagnostic::FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time = ctx
        .diagnostics
        .get(&bevy::diagnostic::FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let snapshot = ctx
        .avatar
        .get_single()
        .ok()
        .map(|(t, loco, bank)| ControllerSnapshot::capture(t.translation(), loco, bank));

    text.sections[0].value = overlay_text(fps, frame_time, snapshot.as_ref());
}

pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle { font_size: 18.0, color: Color::srgb(1.0, 1.0, 0.0), ..default() },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            z_index: ZIndex::Global(1000),
            ..default()
        },
        DebugOverlayText,
    ));
}
