//! Input aggregation for the avatar.
//!
//! Keyboard state, the virtual joystick vector and the mobile jump counter are
//! merged into a single [`InputSignal`] resource that the controller reads once
//! per frame. The collector only runs while the world scene is active; leaving
//! the scene resets the signal so no stale key state survives a scene swap.
use bevy::prelude::*;

use crate::settings::Settings;

/// Held directional keys plus the held jump key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// The per-frame input the controller consumes.
///
/// Keyboard and joystick are independent channels: the joystick wins for
/// directional movement whenever either of its axes leaves the dead-zone.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSignal {
    pub keys: KeyState,
    /// Stick vector with `y > 0` meaning forward.
    pub joystick: Vec2,
    /// Monotonic count of mobile jump-button presses.
    pub jump_trigger: u32,
    /// A jump was pressed this frame (keyboard edge or new mobile trigger).
    pub jump_pressed: bool,
    /// The jump key was released this frame.
    pub jump_released: bool,
}

impl InputSignal {
    /// Whether the joystick is deflected beyond `dead_zone` on either axis.
    #[must_use]
    pub fn has_joystick_input(&self, dead_zone: f32) -> bool {
        self.joystick.x.abs() > dead_zone || self.joystick.y.abs() > dead_zone
    }

    /// Whether any input asks the avatar to move (turn keys alone do not).
    #[must_use]
    pub fn is_moving(&self, dead_zone: f32) -> bool {
        self.keys.forward || self.keys.backward || self.has_joystick_input(dead_zone)
    }
}

/// Joystick vector published by the touch controls.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct JoystickInput(pub Vec2);

/// Counter bumped by the on-screen jump button.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct JumpTrigger(pub u32);

fn any_pressed(kb: &ButtonInput<KeyCode>, primary: KeyCode, alternate: KeyCode) -> bool {
    kb.pressed(primary) || kb.pressed(alternate)
}

/// Fold keyboard, joystick and jump-button state into `InputSignal`.
///
/// Arrow keys are always accepted alongside the configured bindings. Jump is
/// edge-triggered: only a fresh press (never key-repeat) or a new mobile
/// trigger raises `jump_pressed`.
#[allow(clippy::needless_pass_by_value)]
pub fn collect_input(
    kb: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    joystick: Res<JoystickInput>,
    trigger: Res<JumpTrigger>,
    mut signal: ResMut<InputSignal>,
) {
    let controls = &settings.controls;
    let forward_kc = controls.key("forward", KeyCode::KeyW);
    let back_kc = controls.key("back", KeyCode::KeyS);
    let left_kc = controls.key("left", KeyCode::KeyA);
    let right_kc = controls.key("right", KeyCode::KeyD);
    let jump_kc = controls.key("jump", KeyCode::Space);

    let keys = KeyState {
        forward: any_pressed(&kb, forward_kc, KeyCode::ArrowUp),
        backward: any_pressed(&kb, back_kc, KeyCode::ArrowDown),
        left: any_pressed(&kb, left_kc, KeyCode::ArrowLeft),
        right: any_pressed(&kb, right_kc, KeyCode::ArrowRight),
        jump: kb.pressed(jump_kc),
    };

    let mobile_jump = trigger.0 != signal.jump_trigger;

    *signal = InputSignal {
        keys,
        joystick: joystick.0,
        jump_trigger: trigger.0,
        jump_pressed: kb.just_pressed(jump_kc) || mobile_jump,
        jump_released: kb.just_released(jump_kc),
    };
}

/// Drop all held state when the world scene is torn down.
pub fn reset_input(
    mut signal: ResMut<InputSignal>,
    mut joystick: ResMut<JoystickInput>,
    trigger: Res<JumpTrigger>,
) {
    *signal = InputSignal { jump_trigger: trigger.0, ..default() };
    joystick.0 = Vec2::ZERO;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_zone_applies_per_axis() {
        let mut s = InputSignal::default();
        s.joystick = Vec2::new(0.1, -0.1);
        assert!(!s.has_joystick_input(0.1));
        assert!(!s.is_moving(0.1));
        s.joystick = Vec2::new(0.0, -0.11);
        assert!(s.has_joystick_input(0.1));
        assert!(s.is_moving(0.1));
    }

    #[test]
    fn turning_keys_alone_are_not_movement() {
        let s = InputSignal {
            keys: KeyState { left: true, right: true, ..default() },
            ..default()
        };
        assert!(!s.is_moving(0.1));
    }

    fn input_app() -> App {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(Settings::default())
            .init_resource::<JoystickInput>()
            .init_resource::<JumpTrigger>()
            .init_resource::<InputSignal>()
            .add_systems(Update, collect_input);
        app
    }

    /// One frame: apply `edit` to the keyboard, run, then clear the edges the
    /// way the input plugin does between frames.
    fn frame(app: &mut App, edit: impl FnOnce(&mut ButtonInput<KeyCode>)) -> InputSignal {
        {
            let mut kb = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            edit(&mut *kb);
        }
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        *app.world().resource::<InputSignal>()
    }

    #[test]
    fn held_space_jumps_on_first_frame_only() {
        let mut app = input_app();
        let first = frame(&mut app, |kb| kb.press(KeyCode::Space));
        assert!(first.jump_pressed);
        assert!(first.keys.jump);
        for _ in 0..3 {
            let held = frame(&mut app, |_| {});
            assert!(!held.jump_pressed);
            assert!(held.keys.jump);
        }
        let up = frame(&mut app, |kb| kb.release(KeyCode::Space));
        assert!(up.jump_released);
        assert!(!up.keys.jump);
    }

    #[test]
    fn each_trigger_bump_is_one_jump() {
        let mut app = input_app();
        assert!(!frame(&mut app, |_| {}).jump_pressed);
        app.world_mut().resource_mut::<JumpTrigger>().0 += 1;
        assert!(frame(&mut app, |_| {}).jump_pressed);
        assert!(!frame(&mut app, |_| {}).jump_pressed);
        app.world_mut().resource_mut::<JumpTrigger>().0 += 1;
        let again = frame(&mut app, |_| {});
        assert!(again.jump_pressed);
        assert_eq!(again.jump_trigger, 2);
    }

    #[test]
    fn arrows_and_stick_reach_the_signal() {
        let mut app = input_app();
        app.world_mut().resource_mut::<JoystickInput>().0 = Vec2::new(0.5, -0.25);
        let s = frame(&mut app, |kb| {
            kb.press(KeyCode::ArrowUp);
            kb.press(KeyCode::KeyD);
        });
        assert!(s.keys.forward);
        assert!(s.keys.right);
        assert!(!s.keys.backward);
        assert_eq!(s.joystick, Vec2::new(0.5, -0.25));
    }
}
