//! Virtual joystick geometry and the on-screen touch controls.
//!
//! [`JoystickState::from_touch`] turns a raw touch point into a clamped,
//! normalized stick vector. The `touch` submodule owns the Bevy side: the
//! joystick/jump UI nodes, touch tracking, and the show/hide rule for small
//! landscape screens.
pub mod touch;

use bevy::math::Vec2;

pub use touch::*;

/// Current stick deflection.
///
/// `x` and `y` are in `[-1, 1]` with screen axes (`y` grows downwards);
/// `angle` is the polar angle of the raw delta and `distance` the clamped
/// deflection in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoystickState {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub distance: f32,
}

impl JoystickState {
    /// The released stick.
    pub const RELEASED: JoystickState = JoystickState { x: 0.0, y: 0.0, angle: 0.0, distance: 0.0 };

    /// Compute the stick state for a touch at `touch` on a base centred at
    /// `center` with radius `max_radius` (all in the same pixel space).
    ///
    /// Deltas beyond the radius are clamped onto the unit circle; a touch
    /// exactly on the centre yields zero rather than `NaN`.
    #[must_use]
    pub fn from_touch(center: Vec2, touch: Vec2, max_radius: f32) -> Self {
        if max_radius <= 0.0 {
            return Self::RELEASED;
        }
        let delta = touch - center;
        let distance = delta.length();
        let clamped = distance.min(max_radius);

        let ratio = finite_or_zero(clamped / distance);
        let x = finite_or_zero(delta.x / max_radius * ratio);
        let y = finite_or_zero(delta.y / max_radius * ratio);

        JoystickState {
            x,
            y,
            angle: finite_or_zero(delta.y.atan2(delta.x)),
            distance: clamped / max_radius,
        }
    }

    /// Offset of the visual knob from the base centre, in pixels.
    #[must_use]
    pub fn knob_offset(&self, travel_px: f32) -> Vec2 {
        Vec2::new(self.x * travel_px, self.y * travel_px)
    }

    /// Movement vector handed to the controller. Screen-down is backward, so
    /// the Y axis is inverted.
    #[must_use]
    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.x, -self.y)
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Vec2 = Vec2::new(100.0, 200.0);

    #[test]
    fn inside_radius_is_proportional() {
        let s = JoystickState::from_touch(CENTER, CENTER + Vec2::new(30.0, -40.0), 100.0);
        assert!((s.x - 0.3).abs() < 1e-6);
        assert!((s.y + 0.4).abs() < 1e-6);
        assert!((s.distance - 0.5).abs() < 1e-6);
        assert!((s.angle - (-40.0f32).atan2(30.0)).abs() < 1e-6);
    }

    #[test]
    fn outside_radius_is_clamped_to_unit_circle() {
        let s = JoystickState::from_touch(CENTER, CENTER + Vec2::new(300.0, 400.0), 50.0);
        assert!((s.distance - 1.0).abs() < 1e-6);
        assert!((Vec2::new(s.x, s.y).length() - 1.0).abs() < 1e-5);
        assert!((s.x - 0.6).abs() < 1e-5);
        assert!((s.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn bounded_for_a_sweep_of_deltas() {
        for i in -20..=20 {
            for j in -20..=20 {
                let delta = Vec2::new(i as f32 * 7.5, j as f32 * 7.5);
                let s = JoystickState::from_touch(CENTER, CENTER + delta, 60.0);
                assert!((0.0..=1.0).contains(&s.distance), "{delta:?} -> {s:?}");
                assert!(Vec2::new(s.x, s.y).length() <= 1.0 + 1e-5, "{delta:?} -> {s:?}");
                assert!(s.x.is_finite() && s.y.is_finite() && s.angle.is_finite());
            }
        }
    }

    #[test]
    fn centre_touch_is_zero_not_nan() {
        let s = JoystickState::from_touch(CENTER, CENTER, 60.0);
        assert_eq!(s, JoystickState::RELEASED);
    }

    #[test]
    fn degenerate_radius_is_released() {
        let s = JoystickState::from_touch(CENTER, CENTER + Vec2::X, 0.0);
        assert_eq!(s, JoystickState::RELEASED);
    }

    #[test]
    fn movement_inverts_screen_y() {
        let s = JoystickState::from_touch(CENTER, CENTER + Vec2::new(0.0, -60.0), 60.0);
        assert!((s.movement().y - 1.0).abs() < 1e-6);
        assert_eq!(s.knob_offset(40.0), Vec2::new(0.0, -40.0));
    }
}
