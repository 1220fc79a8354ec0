//! Avatar locomotion: animation selection, yaw, velocity and jumping.
//!
//! [`Locomotion::step`] is the per-frame controller. It is engine-free so the
//! same logic runs in the `drive_avatar` system, unit tests and benchmarks.
//!
//! Selection priority each frame:
//! 1. jumping: the jump clip, idle timer reset;
//! 2. no movement input: the current idle variant, flipping between the two
//!    idles every `idle_cycle_seconds` of stillness;
//! 3. moving: walk forward/backward by key or stick; pure turning leaves the
//!    previous clip untouched.
use bevy::prelude::*;

use super::input::InputSignal;
use super::physics::{is_grounded, BodyVelocity};
use crate::animation::AnimationKey;
use crate::settings::LocomotionSettings;

/// Controller state carried between frames.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Locomotion {
    /// Idle variant shown when standing still.
    pub idle_variant: AnimationKey,
    /// Seconds of continuous stillness since the last idle flip.
    pub idle_timer: f32,
    /// `|vy| < grounded_threshold` as of the last step.
    pub grounded: bool,
    /// Set on take-off, cleared when the jump clip finishes.
    pub jumping: bool,
    /// Jump latch: set when a jump is requested, cleared once grounded and
    /// no longer jumping.
    pub has_jumped: bool,
    /// A requested jump waiting to be consumed by the next step.
    pub jump_requested: bool,
    /// Facing angle around +Y, radians.
    pub yaw: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Locomotion {
            idle_variant: AnimationKey::Idle1,
            idle_timer: 0.0,
            grounded: true,
            jumping: false,
            has_jumped: false,
            jump_requested: false,
            yaw: 0.0,
        }
    }
}

/// What one controller step decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Clip to switch to, or `None` to keep the current one.
    pub animation: Option<AnimationKey>,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub yaw: f32,
    /// The jump impulse was applied this step.
    pub took_off: bool,
}

impl Locomotion {
    /// Ask for a jump. Accepted only when grounded, not already jumping and
    /// not latched; returns whether it was accepted.
    pub fn request_jump(&mut self) -> bool {
        if !self.grounded || self.jumping || self.has_jumped {
            return false;
        }
        self.jump_requested = true;
        self.has_jumped = true;
        true
    }

    /// The jump key went up before the request was consumed.
    pub fn release_jump(&mut self) {
        self.jump_requested = false;
    }

    /// The jump clip reported it finished.
    pub fn finish_jump(&mut self) {
        self.jumping = false;
    }

    /// Pick the clip for this frame.
    fn select_animation(&mut self, input: &InputSignal, dt: f32, tuning: &LocomotionSettings) -> Option<AnimationKey> {
        if self.jumping {
            self.idle_timer = 0.0;
            return Some(AnimationKey::Jump);
        }

        let dz = tuning.dead_zone;
        if !input.is_moving(dz) {
            self.idle_timer += dt;
            if self.idle_timer >= tuning.idle_cycle_seconds {
                self.idle_timer = 0.0;
                self.idle_variant = self.idle_variant.other_idle();
            }
            return Some(self.idle_variant);
        }

        self.idle_timer = 0.0;
        let stick = input.has_joystick_input(dz);
        if input.keys.forward || (stick && input.joystick.y > dz) {
            Some(AnimationKey::WalkingForward)
        } else if input.keys.backward || (stick && input.joystick.y < -dz) {
            Some(AnimationKey::WalkingBackward)
        } else {
            None
        }
    }

    /// Integrate yaw and compute the horizontal target velocity (x, z).
    fn steer(&mut self, input: &InputSignal, dt: f32, tuning: &LocomotionSettings) -> Vec2 {
        let rotate = tuning.rotate_speed * dt;
        let speed = tuning.move_speed;
        let mut target = Vec2::ZERO;

        if input.has_joystick_input(tuning.dead_zone) {
            self.yaw -= input.joystick.x * rotate * tuning.joystick_turn_scale;
            if input.joystick.y.abs() > tuning.dead_zone {
                target += heading(self.yaw) * speed * input.joystick.y;
            }
        } else {
            if input.keys.left {
                self.yaw += rotate;
            }
            if input.keys.right {
                self.yaw -= rotate;
            }
            if input.keys.forward {
                target += heading(self.yaw) * speed;
            }
            if input.keys.backward {
                target -= heading(self.yaw) * speed;
            }
        }
        target
    }

    /// Advance the controller one frame given the body's current velocity.
    pub fn step(&mut self, input: &InputSignal, velocity: Vec3, dt: f32, tuning: &LocomotionSettings) -> StepOutcome {
        self.grounded = is_grounded(velocity.y, tuning.grounded_threshold);
        if self.grounded && !self.jumping {
            self.has_jumped = false;
        }

        let animation = self.select_animation(input, dt, tuning);
        let target = self.steer(input, dt, tuning);

        let s = tuning.velocity_smoothing;
        let mut vy = velocity.y;
        let mut took_off = false;
        if self.jump_requested && self.grounded && !self.jumping {
            vy = tuning.jump_impulse;
            self.jumping = true;
            self.jump_requested = false;
            took_off = true;
        }

        StepOutcome {
            animation,
            linear_velocity: Vec3::new(
                velocity.x * (1.0 - s) + target.x * s,
                vy,
                velocity.z * (1.0 - s) + target.y * s,
            ),
            angular_velocity: Vec3::ZERO,
            yaw: self.yaw,
            took_off,
        }
    }

    /// Step against a body: read its velocity, write the result back.
    pub fn drive<B: BodyVelocity>(
        &mut self,
        body: &mut B,
        input: &InputSignal,
        dt: f32,
        tuning: &LocomotionSettings,
    ) -> StepOutcome {
        let outcome = self.step(input, body.linear(), dt, tuning);
        body.write(outcome.linear_velocity, outcome.angular_velocity);
        outcome
    }
}

/// Unit (x, z) direction for a yaw; yaw 0 faces +Z.
#[inline]
#[must_use]
pub fn heading(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::input::KeyState;
    use crate::player::physics::SimulatedBody;

    const DT: f32 = 1.0 / 60.0;

    fn tuning() -> LocomotionSettings {
        LocomotionSettings::default()
    }

    fn keys(k: KeyState) -> InputSignal {
        InputSignal { keys: k, ..default() }
    }

    fn stick(x: f32, y: f32) -> InputSignal {
        InputSignal { joystick: Vec2::new(x, y), ..default() }
    }

    #[test]
    fn idle_flips_once_per_cycle() {
        let mut loco = Locomotion::default();
        let still = InputSignal::default();
        let mut flips = 0;
        let mut last = AnimationKey::Idle1;
        // 12.5 simulated seconds at quarter-second frames
        for _ in 0..50 {
            let out = loco.step(&still, Vec3::ZERO, 0.25, &tuning());
            let a = out.animation.unwrap();
            assert!(a.is_idle());
            if a != last {
                flips += 1;
                last = a;
            }
        }
        assert_eq!(flips, 2);
        assert_eq!(last, AnimationKey::Idle1);
    }

    #[test]
    fn any_movement_resets_idle_timer() {
        let mut loco = Locomotion::default();
        let t = tuning();
        loco.step(&InputSignal::default(), Vec3::ZERO, 4.0, &t);
        assert_eq!(loco.idle_timer, 4.0);
        let out = loco.step(&keys(KeyState { forward: true, ..default() }), Vec3::ZERO, DT, &t);
        assert_eq!(out.animation, Some(AnimationKey::WalkingForward));
        assert_eq!(loco.idle_timer, 0.0);
        let out = loco.step(&InputSignal::default(), Vec3::ZERO, 4.0, &t);
        assert_eq!(out.animation, Some(AnimationKey::Idle1));
    }

    #[test]
    fn walking_direction_from_keys_and_stick() {
        let mut loco = Locomotion::default();
        let t = tuning();
        let back = loco.step(&keys(KeyState { backward: true, ..default() }), Vec3::ZERO, DT, &t);
        assert_eq!(back.animation, Some(AnimationKey::WalkingBackward));
        let fwd = loco.step(&stick(0.0, 0.5), Vec3::ZERO, DT, &t);
        assert_eq!(fwd.animation, Some(AnimationKey::WalkingForward));
        let rev = loco.step(&stick(0.0, -0.5), Vec3::ZERO, DT, &t);
        assert_eq!(rev.animation, Some(AnimationKey::WalkingBackward));
    }

    #[test]
    fn pure_stick_turn_keeps_previous_clip() {
        let mut loco = Locomotion::default();
        let out = loco.step(&stick(0.9, 0.05), Vec3::ZERO, DT, &tuning());
        assert_eq!(out.animation, None);
        assert!(out.yaw < 0.0);
        assert_eq!(loco.idle_timer, 0.0);
    }

    #[test]
    fn turn_keys_rotate_without_moving() {
        let mut loco = Locomotion::default();
        let t = tuning();
        let out = loco.step(&keys(KeyState { left: true, ..default() }), Vec3::ZERO, 0.5, &t);
        assert!((out.yaw - 1.0).abs() < 1e-6);
        assert!(out.animation.unwrap().is_idle());
        assert_eq!(out.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn stick_turn_is_scaled() {
        let mut loco = Locomotion::default();
        let out = loco.step(&stick(1.0, 0.0), Vec3::ZERO, 0.5, &tuning());
        assert!((out.yaw + 1.5).abs() < 1e-6);
    }

    #[test]
    fn horizontal_velocity_is_smoothed_toward_target() {
        let mut loco = Locomotion::default();
        let t = tuning();
        let fwd = keys(KeyState { forward: true, ..default() });
        let out = loco.step(&fwd, Vec3::new(1.0, 0.0, 0.0), DT, &t);
        // yaw 0 faces +Z: target (0, 2.5)
        assert!((out.linear_velocity.x - 0.85).abs() < 1e-6);
        assert!((out.linear_velocity.z - 0.375).abs() < 1e-6);
        assert_eq!(out.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn stick_speed_scales_with_deflection() {
        let mut loco = Locomotion::default();
        let out = loco.step(&stick(0.0, 0.4), Vec3::ZERO, DT, &tuning());
        assert!((out.linear_velocity.z - 2.5 * 0.4 * 0.15).abs() < 1e-6);
    }

    #[test]
    fn vertical_velocity_passes_through() {
        let mut loco = Locomotion::default();
        let out = loco.step(&InputSignal::default(), Vec3::new(0.0, -3.0, 0.0), DT, &tuning());
        assert_eq!(out.linear_velocity.y, -3.0);
        assert!(!loco.grounded);
    }

    #[test]
    fn jump_takes_off_once_then_plays_clip() {
        let mut loco = Locomotion::default();
        let t = tuning();
        assert!(loco.request_jump());
        let out = loco.step(&InputSignal::default(), Vec3::ZERO, DT, &t);
        assert!(out.took_off);
        assert_eq!(out.linear_velocity.y, 4.0);
        assert!(loco.jumping);
        assert!(!loco.jump_requested);
        // clip switches on the following frame
        let out = loco.step(&InputSignal::default(), Vec3::new(0.0, 3.8, 0.0), DT, &t);
        assert_eq!(out.animation, Some(AnimationKey::Jump));
        assert!(!out.took_off);
    }

    #[test]
    fn jump_cannot_retrigger_until_landed_and_finished() {
        let mut loco = Locomotion::default();
        let t = tuning();
        let mut body = SimulatedBody::default();
        assert!(loco.request_jump());
        loco.drive(&mut body, &InputSignal::default(), DT, &t);
        assert_eq!(body.linvel.y, 4.0);

        // airborne, and at the apex where |vy| is briefly tiny
        for vy in [3.0, 1.0, 0.05, -0.05, -2.0] {
            body.linvel.y = vy;
            assert!(!loco.request_jump(), "vy {vy}");
            let out = loco.drive(&mut body, &InputSignal::default(), DT, &t);
            assert!(!out.took_off);
        }

        // clip finished mid-air: still latched until grounded
        loco.finish_jump();
        body.linvel.y = -1.0;
        loco.drive(&mut body, &InputSignal::default(), DT, &t);
        assert!(!loco.request_jump());

        // landed
        body.linvel.y = 0.0;
        loco.drive(&mut body, &InputSignal::default(), DT, &t);
        assert!(loco.request_jump());
    }

    #[test]
    fn jump_while_jumping_on_ground_is_rejected() {
        let mut loco = Locomotion::default();
        loco.jumping = true;
        loco.step(&InputSignal::default(), Vec3::ZERO, DT, &tuning());
        assert!(!loco.request_jump());
    }

    #[test]
    fn released_jump_is_not_consumed() {
        let mut loco = Locomotion::default();
        assert!(loco.request_jump());
        loco.release_jump();
        let out = loco.step(&InputSignal::default(), Vec3::ZERO, DT, &tuning());
        assert!(!out.took_off);
        assert!(!loco.jumping);
    }

    #[test]
    fn angular_velocity_is_always_cleared() {
        let mut loco = Locomotion::default();
        let mut body = SimulatedBody { angvel: Vec3::new(1.0, 2.0, 3.0), ..default() };
        loco.drive(&mut body, &keys(KeyState { right: true, ..default() }), DT, &tuning());
        assert_eq!(body.angvel, Vec3::ZERO);
    }
}
