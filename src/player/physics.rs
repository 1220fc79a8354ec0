//! Avatar rigid body: construction, grounded test and velocity read/write.
//!
//! The controller's only contract with the physics engine is "read the
//! current linear velocity, write the desired linear and angular velocity".
//! [`BodyVelocity`] captures that contract; [`AvianBody`] implements it over
//! avian's velocity components and [`SimulatedBody`] is a plain value used by
//! tests and benchmarks.

use avian3d::prelude::*;
use bevy::prelude::*;

/// Capsule collider radius and cylinder length (total height 1.6).
pub const CAPSULE_RADIUS: f32 = 0.3;
pub const CAPSULE_LENGTH: f32 = 1.0;
/// Collider centre above the body origin.
pub const CAPSULE_OFFSET_Y: f32 = 0.75;

/// Grounded approximation: near-zero vertical velocity. Misfires on slopes and
/// at the apex of a jump; accepted.
#[inline]
#[must_use]
pub fn is_grounded(vertical_velocity: f32, threshold: f32) -> bool {
    vertical_velocity.abs() < threshold
}

/// Read/write access to a body's velocity.
pub trait BodyVelocity {
    fn linear(&self) -> Vec3;
    fn write(&mut self, linear: Vec3, angular: Vec3);
}

/// Velocity components of an avian rigid body.
pub struct AvianBody<'a> {
    pub linear: Mut<'a, LinearVelocity>,
    pub angular: Mut<'a, AngularVelocity>,
}

impl BodyVelocity for AvianBody<'_> {
    fn linear(&self) -> Vec3 {
        self.linear.0
    }

    fn write(&mut self, linear: Vec3, angular: Vec3) {
        self.linear.0 = linear;
        self.angular.0 = angular;
    }
}

/// A body that only stores velocities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedBody {
    pub linvel: Vec3,
    pub angvel: Vec3,
}

impl BodyVelocity for SimulatedBody {
    fn linear(&self) -> Vec3 {
        self.linvel
    }

    fn write(&mut self, linear: Vec3, angular: Vec3) {
        self.linvel = linear;
        self.angvel = angular;
    }
}

/// Marks the avatar's capsule collider (a child of the body).
#[derive(Component)]
pub struct AvatarCollider;

/// Components for the avatar's dynamic body. Rotations are locked so contacts
/// cannot tip it over; facing is applied to the visual child instead.
#[must_use]
pub fn avatar_body() -> impl Bundle {
    (
        RigidBody::Dynamic,
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::default(),
        AngularVelocity::default(),
    )
}

/// The capsule collider child, offset so the capsule's base sits at the origin.
#[must_use]
pub fn avatar_collider() -> impl Bundle {
    (
        AvatarCollider,
        Collider::capsule(CAPSULE_RADIUS, CAPSULE_LENGTH),
        TransformBundle::from_transform(Transform::from_xyz(0.0, CAPSULE_OFFSET_Y, 0.0)),
    )
}
