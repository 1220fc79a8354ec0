//! The avatar: input, locomotion, physics body and trailing camera.
//!
//! The avatar is a dynamic body with a capsule collider child and a visual
//! child holding the five clip models. `drive_avatar` runs the controller once
//! per frame and is the only writer of the body's velocity.
//!
//! # Example:
//!
//! ```ignore
//! app.add_systems(OnEnter(GameScene::StartingPoint), spawn_avatar);
//! app.add_systems(Update, (collect_input, drive_avatar, track_jump_finish).chain());
//! ```
pub mod camera;
pub mod input;
pub mod locomotion;
pub mod physics;

use avian3d::prelude::{AngularVelocity, LinearVelocity};
use bevy::animation::AnimationPlayer;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

pub use camera::*;
pub use input::*;
pub use locomotion::*;
pub use physics::*;

use crate::animation::{apply_clip_transition, clip_finished, AnimationBank, AnimationKey, AnimationSlot, ClipPlayer};
use crate::scene::GameScene;
use crate::settings::Settings;

/// Root entity of the avatar (carries the rigid body).
#[derive(Component)]
pub struct Avatar;

/// Child that carries facing; the clip models hang under it.
#[derive(Component)]
pub struct AvatarVisual;

/// Systems that write avatar velocity and clip state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriveSet;

/// Spawn the avatar at the origin with all five clip models, only the first
/// idle visible.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_avatar(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<Settings>) {
    let scale = settings.locomotion.model_scale;
    let bank = AnimationBank::default();

    commands
        .spawn((
            Name::new("avatar"),
            Avatar,
            Locomotion::default(),
            bank.clone(),
            avatar_body(),
            SpatialBundle::default(),
            StateScoped(GameScene::StartingPoint),
        ))
        .with_children(|root| {
            root.spawn(avatar_collider());
            root.spawn((AvatarVisual, SpatialBundle::default())).with_children(|visual| {
                for key in AnimationKey::ALL {
                    let visibility = if bank.slot(key).visible { Visibility::Inherited } else { Visibility::Hidden };
                    visual.spawn((
                        Name::new(key.label()),
                        AnimationSlot(key),
                        SceneBundle {
                            scene: asset_server.load(GltfAssetLabel::Scene(0).from_asset(key.asset_path())),
                            transform: Transform::from_scale(Vec3::splat(scale)),
                            visibility,
                            ..default()
                        },
                    ));
                }
            });
        });
    info!("avatar spawned");
}

/// Run the controller for this frame: jump requests, clip selection, facing
/// and the velocity write.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_avatar(
    time: Res<Time>,
    settings: Res<Settings>,
    input: Res<InputSignal>,
    mut avatars: Query<(&mut Locomotion, &mut AnimationBank, &mut LinearVelocity, &mut AngularVelocity), With<Avatar>>,
    mut visuals: Query<&mut Transform, With<AvatarVisual>>,
    mut players: Query<(&ClipPlayer, &mut AnimationPlayer)>,
    mut slots: Query<(&AnimationSlot, &mut Visibility)>,
) {
    let Ok((mut loco, mut bank, linear, angular)) = avatars.get_single_mut() else { return };
    let tuning = &settings.locomotion;

    if input.jump_pressed {
        loco.request_jump();
    }
    if input.jump_released {
        loco.release_jump();
    }

    let mut body = AvianBody { linear, angular };
    let outcome = loco.drive(&mut body, &input, time.delta_seconds(), tuning);
    if outcome.took_off {
        debug!("jump");
    }

    if let Some(target) = outcome.animation
        && let Some(transition) = bank.transition_to(target)
    {
        apply_clip_transition(transition, &mut players, &mut slots);
    }

    for mut transform in &mut visuals {
        transform.rotation = Quat::from_rotation_y(outcome.yaw);
    }
}

/// Clear the jumping flag once the jump clip has played through.
#[allow(clippy::needless_pass_by_value)]
pub fn track_jump_finish(
    mut avatars: Query<(&mut Locomotion, &mut AnimationBank), With<Avatar>>,
    players: Query<(&ClipPlayer, &mut AnimationPlayer)>,
) {
    let Ok((mut loco, mut bank)) = avatars.get_single_mut() else { return };
    if !loco.jumping || bank.current() != AnimationKey::Jump {
        return;
    }
    if clip_finished(AnimationKey::Jump, &bank, &players) && bank.report_finished(AnimationKey::Jump) {
        loco.finish_jump();
    }
}
