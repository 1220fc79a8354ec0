//! Trailing camera.
//!
//! The camera sits at a fixed offset behind and above the avatar and looks at
//! its upper body. Both the position and the look-at point are smoothed with a
//! frame-rate independent lerp (`min(dt * damping, 1)`). There is no collision
//! avoidance; clipping through scenery is accepted.

use bevy::prelude::*;

use super::Avatar;
use crate::settings::{CameraSettings, Settings};

/// Smoothed camera state.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraFollow {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraFollow {
    /// Start already settled on a target at `origin`.
    #[must_use]
    pub fn settled(origin: Vec3, cfg: &CameraSettings) -> Self {
        CameraFollow {
            position: origin + cfg.offset,
            look_at: origin + cfg.look_at_offset,
        }
    }

    /// Move the smoothed position/look-at toward the avatar at `target`.
    pub fn update(&mut self, target: Vec3, dt: f32, cfg: &CameraSettings) {
        let t = (dt * cfg.damping).min(1.0);
        self.position = self.position.lerp(target + cfg.offset, t);
        self.look_at = self.look_at.lerp(target + cfg.look_at_offset, t);
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_at, Vec3::Y)
    }
}

/// Follow the avatar each frame. Runs after physics has written the avatar's
/// transform and before transforms propagate.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_avatar(
    time: Res<Time>,
    settings: Res<Settings>,
    avatar: Query<&Transform, (With<Avatar>, Without<CameraFollow>)>,
    mut cameras: Query<(&mut Transform, &mut CameraFollow), With<Camera3d>>,
) {
    let Ok(target) = avatar.get_single() else { return };
    let target = target.translation;

    for (mut transform, mut follow) in &mut cameras {
        follow.update(target, time.delta_seconds(), &settings.camera);
        *transform = follow.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_at_offsets() {
        let cfg = CameraSettings::default();
        let f = CameraFollow::settled(Vec3::ZERO, &cfg);
        assert_eq!(f.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(f.look_at, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn large_frames_snap_without_overshoot() {
        let cfg = CameraSettings::default();
        let mut f = CameraFollow::settled(Vec3::ZERO, &cfg);
        let target = Vec3::new(10.0, -2.0, 3.0);
        f.update(target, 0.5, &cfg);
        assert_eq!(f.position, target + cfg.offset);
        assert_eq!(f.look_at, target + cfg.look_at_offset);
    }

    #[test]
    fn small_frames_move_part_way() {
        let cfg = CameraSettings::default();
        let mut f = CameraFollow::settled(Vec3::ZERO, &cfg);
        f.update(Vec3::new(10.0, 0.0, 0.0), 0.1, &cfg);
        assert!((f.position.x - 5.0).abs() < 1e-5);
        assert!((f.look_at.x - 5.0).abs() < 1e-5);
        assert!((f.position.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn converges_over_many_frames() {
        let cfg = CameraSettings::default();
        let mut f = CameraFollow::settled(Vec3::ZERO, &cfg);
        let target = Vec3::new(-4.0, 0.0, 8.0);
        for _ in 0..600 {
            f.update(target, 1.0 / 60.0, &cfg);
        }
        assert!(f.position.distance(target + cfg.offset) < 1e-3);
    }
}
