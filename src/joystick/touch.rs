//! On-screen joystick and jump button for small landscape touch screens.
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::JoystickState;
use crate::player::{JoystickInput, JumpTrigger};
use crate::scene::GameScene;
use crate::settings::Settings;

const MARGIN_PX: f32 = 40.0;
const KNOB_SIZE_PX: f32 = 50.0;
const JUMP_SIZE_PX: f32 = 80.0;

/// The finger currently steering the stick, if any.
#[derive(Resource, Debug, Default)]
pub struct VirtualJoystick {
    pub touch_id: Option<u64>,
    pub state: JoystickState,
}

/// Root of all touch UI, toggled as a whole.
#[derive(Component)]
pub struct TouchControls;

#[derive(Component)]
pub struct JoystickBase;

#[derive(Component)]
pub struct JoystickKnob;

#[derive(Component)]
pub struct JumpButton;

/// Full-screen hint asking to turn a narrow portrait screen sideways.
#[derive(Component)]
pub struct RotateDeviceWarning;

/// Touch controls are shown on narrow screens held in landscape.
#[must_use]
pub fn touch_controls_visible(width: f32, height: f32, max_width: f32) -> bool {
    width <= max_width && width > height
}

/// The rotate hint covers narrow screens held upright (square counts as upright).
#[must_use]
pub fn rotate_warning_visible(width: f32, height: f32, max_width: f32) -> bool {
    width <= max_width && height >= width
}

/// Centre of the joystick base in window coordinates (y down).
#[must_use]
pub fn joystick_center(window_height: f32, base_size: f32) -> Vec2 {
    Vec2::new(MARGIN_PX + base_size / 2.0, window_height - MARGIN_PX - base_size / 2.0)
}

fn inside_base(point: Vec2, center: Vec2, base_size: f32) -> bool {
    let half = base_size / 2.0;
    (point.x - center.x).abs() <= half && (point.y - center.y).abs() <= half
}

fn knob_style(base_size: f32, offset: Vec2) -> (Val, Val) {
    let rest = base_size / 2.0 - KNOB_SIZE_PX / 2.0;
    (Val::Px(rest + offset.x), Val::Px(rest + offset.y))
}

#[allow(clippy::needless_pass_by_value)]
pub fn spawn_touch_controls(mut commands: Commands, settings: Res<Settings>) {
    let base = settings.joystick.base_size_px;
    let (left, top) = knob_style(base, Vec2::ZERO);

    commands
        .spawn((
            TouchControls,
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    display: Display::None,
                    ..default()
                },
                z_index: ZIndex::Global(500),
                ..default()
            },
            StateScoped(GameScene::StartingPoint),
        ))
        .with_children(|root| {
            root.spawn((
                JoystickBase,
                NodeBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        left: Val::Px(MARGIN_PX),
                        bottom: Val::Px(MARGIN_PX),
                        width: Val::Px(base),
                        height: Val::Px(base),
                        ..default()
                    },
                    background_color: Color::srgba(1.0, 1.0, 1.0, 0.2).into(),
                    border_radius: BorderRadius::MAX,
                    ..default()
                },
            ))
            .with_children(|b| {
                b.spawn((
                    JoystickKnob,
                    NodeBundle {
                        style: Style {
                            position_type: PositionType::Absolute,
                            left,
                            top,
                            width: Val::Px(KNOB_SIZE_PX),
                            height: Val::Px(KNOB_SIZE_PX),
                            ..default()
                        },
                        background_color: Color::srgba(1.0, 1.0, 1.0, 0.6).into(),
                        border_radius: BorderRadius::MAX,
                        ..default()
                    },
                ));
            });

            root.spawn((
                JumpButton,
                ButtonBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        right: Val::Px(MARGIN_PX),
                        bottom: Val::Px(MARGIN_PX + 20.0),
                        width: Val::Px(JUMP_SIZE_PX),
                        height: Val::Px(JUMP_SIZE_PX),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    background_color: Color::srgba(1.0, 1.0, 1.0, 0.3).into(),
                    border_radius: BorderRadius::MAX,
                    ..default()
                },
            ))
            .with_children(|j| {
                j.spawn(TextBundle::from_section("JUMP", TextStyle { font_size: 18.0, ..default() }));
            });
        });
}

/// Track the steering finger and publish its stick vector.
///
/// A touch only takes the stick when it starts inside the base; it keeps it
/// until released or cancelled, even when dragged outside.
#[allow(clippy::needless_pass_by_value)]
pub fn track_joystick_touches(
    touches: Res<Touches>,
    settings: Res<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    controls: Query<&Style, (With<TouchControls>, Without<JoystickKnob>)>,
    mut stick: ResMut<VirtualJoystick>,
    mut input: ResMut<JoystickInput>,
    mut knobs: Query<&mut Style, With<JoystickKnob>>,
) {
    let Ok(window) = windows.get_single() else { return };
    if controls.iter().all(|s| s.display == Display::None) && stick.touch_id.is_none() {
        return;
    }
    let cfg = &settings.joystick;
    let center = joystick_center(window.height(), cfg.base_size_px);

    if stick.touch_id.is_none() {
        for touch in touches.iter_just_pressed() {
            if inside_base(touch.position(), center, cfg.base_size_px) {
                stick.touch_id = Some(touch.id());
                break;
            }
        }
    }

    let Some(id) = stick.touch_id else { return };
    let released = touches.just_released(id) || touches.just_canceled(id);
    match touches.get_pressed(id) {
        Some(touch) if !released => {
            stick.state = JoystickState::from_touch(center, touch.position(), cfg.base_size_px / 2.0);
        }
        _ => {
            stick.touch_id = None;
            stick.state = JoystickState::RELEASED;
        }
    }
    input.0 = stick.state.movement();

    let (left, top) = knob_style(cfg.base_size_px, stick.state.knob_offset(cfg.knob_travel_px));
    for mut style in &mut knobs {
        style.left = left;
        style.top = top;
    }
}

/// Each press of the on-screen jump button bumps the jump trigger.
#[allow(clippy::needless_pass_by_value)]
pub fn press_jump_button(
    buttons: Query<&Interaction, (Changed<Interaction>, With<JumpButton>)>,
    mut trigger: ResMut<JumpTrigger>,
) {
    for interaction in &buttons {
        if *interaction == Interaction::Pressed {
            trigger.0 = trigger.0.wrapping_add(1);
        }
    }
}

/// Show or hide the touch UI as the window changes shape.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_touch_controls_visibility(
    settings: Res<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut controls: Query<&mut Style, With<TouchControls>>,
) {
    let Ok(window) = windows.get_single() else { return };
    let show = touch_controls_visible(window.width(), window.height(), settings.joystick.mobile_max_width);
    let display = if show { Display::Flex } else { Display::None };
    for mut style in &mut controls {
        if style.display != display {
            debug!("touch controls {}", if show { "shown" } else { "hidden" });
            style.display = display;
        }
    }
}

/// Spawn the rotate hint, hidden. It lives for the whole session since the
/// loading scene needs it too.
pub fn spawn_rotate_warning(mut commands: Commands) {
    commands
        .spawn((
            RotateDeviceWarning,
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(12.0),
                    display: Display::None,
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.9).into(),
                z_index: ZIndex::Global(1100),
                ..default()
            },
        ))
        .with_children(|w| {
            w.spawn(TextBundle::from_section("Please Rotate Your Device", TextStyle { font_size: 32.0, ..default() }));
            w.spawn(TextBundle::from_section(
                "This world is best viewed in landscape orientation.",
                TextStyle { font_size: 18.0, ..default() },
            ));
        });
}

#[allow(clippy::needless_pass_by_value)]
pub fn sync_rotate_warning(
    settings: Res<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut warnings: Query<&mut Style, With<RotateDeviceWarning>>,
) {
    let Ok(window) = windows.get_single() else { return };
    let show = rotate_warning_visible(window.width(), window.height(), settings.joystick.mobile_max_width);
    let display = if show { Display::Flex } else { Display::None };
    for mut style in &mut warnings {
        if style.display != display {
            style.display = display;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::touch::{touch_screen_input_system, TouchInput, TouchPhase};
    use bevy::window::WindowResolution;

    fn touch_app() -> (App, Entity) {
        let mut app = App::new();
        app.add_event::<TouchInput>()
            .init_resource::<Touches>()
            .insert_resource(Settings::default())
            .init_resource::<VirtualJoystick>()
            .init_resource::<JoystickInput>()
            .add_systems(Update, (touch_screen_input_system, track_joystick_touches).chain());
        let window = app
            .world_mut()
            .spawn((Window { resolution: WindowResolution::new(1024.0, 700.0), ..default() }, PrimaryWindow))
            .id();
        app.world_mut().spawn((TouchControls, Style::default()));
        app.world_mut().spawn((JoystickKnob, Style::default()));
        (app, window)
    }

    fn send_touch(app: &mut App, window: Entity, phase: TouchPhase, position: Vec2) {
        app.world_mut().send_event(TouchInput { phase, position, window, force: None, id: 7 });
        app.update();
    }

    #[test]
    fn touch_end_releases_a_deflected_stick() {
        let (mut app, window) = touch_app();
        // base centre is (100, 600) for a 700 px tall window
        send_touch(&mut app, window, TouchPhase::Started, Vec2::new(100.0, 600.0));
        assert_eq!(app.world().resource::<VirtualJoystick>().touch_id, Some(7));

        send_touch(&mut app, window, TouchPhase::Moved, Vec2::new(220.0, 600.0));
        let stick = app.world().resource::<VirtualJoystick>().state;
        assert_eq!(stick.x, 1.0);
        assert_eq!(stick.distance, 1.0);
        assert_eq!(app.world().resource::<JoystickInput>().0, Vec2::new(1.0, 0.0));

        send_touch(&mut app, window, TouchPhase::Ended, Vec2::new(220.0, 600.0));
        let joystick = app.world().resource::<VirtualJoystick>();
        assert_eq!(joystick.touch_id, None);
        assert_eq!(joystick.state, JoystickState::RELEASED);
        assert_eq!(app.world().resource::<JoystickInput>().0, Vec2::ZERO);
    }

    #[test]
    fn touch_outside_base_does_not_take_the_stick() {
        let (mut app, window) = touch_app();
        send_touch(&mut app, window, TouchPhase::Started, Vec2::new(600.0, 300.0));
        assert_eq!(app.world().resource::<VirtualJoystick>().touch_id, None);
        send_touch(&mut app, window, TouchPhase::Moved, Vec2::new(700.0, 300.0));
        assert_eq!(app.world().resource::<JoystickInput>().0, Vec2::ZERO);
    }

    #[test]
    fn rotate_hint_only_on_small_portrait() {
        assert!(rotate_warning_visible(600.0, 1024.0, 1366.0));
        assert!(rotate_warning_visible(800.0, 800.0, 1366.0));
        assert!(!rotate_warning_visible(1024.0, 600.0, 1366.0));
        assert!(!rotate_warning_visible(1400.0, 2000.0, 1366.0));
        for (w, h) in [(600.0, 1024.0), (1024.0, 600.0), (1366.0, 1024.0)] {
            assert!(!(rotate_warning_visible(w, h, 1366.0) && touch_controls_visible(w, h, 1366.0)));
        }
    }

    #[test]
    fn visible_only_on_small_landscape() {
        assert!(touch_controls_visible(1024.0, 600.0, 1366.0));
        assert!(touch_controls_visible(1366.0, 1024.0, 1366.0));
        assert!(!touch_controls_visible(1367.0, 800.0, 1366.0));
        assert!(!touch_controls_visible(600.0, 1024.0, 1366.0));
        assert!(!touch_controls_visible(800.0, 800.0, 1366.0));
    }

    #[test]
    fn base_hit_test_uses_its_square() {
        let c = joystick_center(700.0, 120.0);
        assert_eq!(c, Vec2::new(100.0, 600.0));
        assert!(inside_base(Vec2::new(45.0, 545.0), c, 120.0));
        assert!(!inside_base(Vec2::new(300.0, 600.0), c, 120.0));
    }

    #[test]
    fn knob_rests_at_centre_and_moves_with_offset() {
        assert_eq!(knob_style(120.0, Vec2::ZERO), (Val::Px(35.0), Val::Px(35.0)));
        assert_eq!(knob_style(120.0, Vec2::new(40.0, -40.0)), (Val::Px(75.0), Val::Px(-5.0)));
    }
}
