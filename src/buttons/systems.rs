//! Spawning, animating and triggering the signpost buttons.
use avian3d::prelude::{Collider, CollisionEnded, CollisionStarted, RigidBody, Sensor};
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

use super::{perform, ButtonActivation, ButtonDefs, ButtonTarget, ResolvedPalette};
use crate::player::AvatarCollider;
use crate::scene::GameScene;

const BORDER_SIZE: Vec3 = Vec3::new(3.2, 1.2, 0.3);
const SHADOW_SIZE: Vec3 = Vec3::new(3.1, 1.1, 0.25);
const FACE_SIZE: Vec3 = Vec3::new(2.8, 0.9, 0.2);
const HIGHLIGHT_SIZE: Vec3 = Vec3::new(2.5, 0.15, 0.15);
const FACE_Z: f32 = 0.1;
const FACE_PRESS_DEPTH: f32 = 0.05;
const FLOAT_AMPLITUDE: f32 = 0.05;
const HOVER_SPIN: f32 = 0.02; // rad per frame
const LABEL_WIDTH_PX: f32 = 160.0;
const GLOW: f32 = 0.6;

/// Root of a button; also its sensor. The root never moves, so the sensor
/// footprint stays put while the visual bobs and spins.
#[derive(Component, Debug)]
pub struct SignButton {
    pub id: String,
    pub target: ButtonTarget,
    pub activation: ButtonActivation,
    pub touching: bool,
}

/// Child of a [`SignButton`] holding the layered box; floats and spins.
#[derive(Component)]
pub struct ButtonVisual {
    pub button: Entity,
}

/// The front face, pushed in while the button is latched and glowing while
/// the avatar touches it.
#[derive(Component)]
pub struct ButtonFace {
    button: Entity,
    glow: LinearRgba,
    lit: bool,
}

/// Screen-space label tracking a button.
#[derive(Component)]
pub struct ButtonLabel {
    pub button: Entity,
}

/// Full-screen fade used by button activations.
#[derive(Component)]
pub struct ActivationOverlay;

/// Vertical bobbing offset at `elapsed` seconds.
#[must_use]
pub fn float_offset(elapsed: f32) -> f32 {
    elapsed.sin() * FLOAT_AMPLITUDE
}

fn spawn_layer<'a>(
    parent: &'a mut ChildBuilder<'_>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    size: Vec3,
    color: Color,
    at: Vec3,
) -> EntityCommands<'a> {
    parent.spawn(PbrBundle {
        mesh: meshes.add(Cuboid::new(size.x, size.y, size.z)),
        material: materials.add(StandardMaterial { base_color: color, perceptual_roughness: 0.6, ..default() }),
        transform: Transform::from_translation(at),
        ..default()
    })
}

fn spawn_visual(
    parent: &mut ChildBuilder,
    button: Entity,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    palette: &ResolvedPalette,
) {
    spawn_layer(parent, meshes, materials, BORDER_SIZE, palette.border, Vec3::ZERO);
    spawn_layer(parent, meshes, materials, SHADOW_SIZE, palette.border_dark, Vec3::new(0.0, -0.08, -0.05));
    let base = palette.primary.to_linear();
    let glow = LinearRgba::rgb(base.red * GLOW, base.green * GLOW, base.blue * GLOW);
    spawn_layer(parent, meshes, materials, FACE_SIZE, palette.primary, Vec3::new(0.0, 0.0, FACE_Z))
        .insert(ButtonFace { button, glow, lit: false });
    spawn_layer(parent, meshes, materials, HIGHLIGHT_SIZE, palette.secondary, Vec3::new(0.0, 0.3, 0.15));
}

/// Spawn every configured button, its screen label and the shared fade overlay.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_buttons(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    defs: Res<ButtonDefs>,
) {
    for def in &defs.0 {
        let cfg = &def.config;
        let button = commands
            .spawn((
                Name::new(format!("button:{}", cfg.id)),
                SignButton {
                    id: cfg.id.clone(),
                    target: cfg.target.clone(),
                    activation: ButtonActivation::default(),
                    touching: false,
                },
                RigidBody::Static,
                Collider::cuboid(BORDER_SIZE.x, BORDER_SIZE.y, BORDER_SIZE.z),
                Sensor,
                SpatialBundle::from_transform(Transform::from_translation(cfg.position)),
                StateScoped(GameScene::StartingPoint),
            ))
            .id();
        commands.entity(button).with_children(|root| {
            root.spawn((ButtonVisual { button }, SpatialBundle::default()))
                .with_children(|visual| spawn_visual(visual, button, &mut meshes, &mut materials, &def.palette));
        });

        commands.spawn((
            ButtonLabel { button },
            TextBundle::from_section(
                cfg.label.clone(),
                TextStyle { font_size: 26.0, color: Color::WHITE, ..default() },
            )
            .with_text_justify(JustifyText::Center)
            .with_style(Style { position_type: PositionType::Absolute, width: Val::Px(LABEL_WIDTH_PX), ..default() }),
            StateScoped(GameScene::StartingPoint),
        ));
        debug!("spawned button {}", cfg.id);
    }

    commands.spawn((
        ActivationOverlay,
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            background_color: Color::BLACK.with_alpha(0.0).into(),
            z_index: ZIndex::Global(800),
            ..default()
        },
        StateScoped(GameScene::StartingPoint),
    ));
    info!("spawned {} buttons", defs.0.len());
}

fn button_pair(a: Entity, b: Entity, avatar: &Query<(), With<AvatarCollider>>) -> Option<Entity> {
    if avatar.contains(a) {
        Some(b)
    } else if avatar.contains(b) {
        Some(a)
    } else {
        None
    }
}

/// Start an activation when the avatar touches a button.
#[allow(clippy::needless_pass_by_value)]
pub fn detect_button_contacts(
    mut started: EventReader<CollisionStarted>,
    mut ended: EventReader<CollisionEnded>,
    avatar: Query<(), With<AvatarCollider>>,
    mut buttons: Query<&mut SignButton>,
) {
    for CollisionStarted(a, b) in started.read() {
        let Some(entity) = button_pair(*a, *b, &avatar) else { continue };
        let Ok(mut button) = buttons.get_mut(entity) else { continue };
        button.touching = true;
        if button.activation.trigger() {
            info!("button {} activated", button.id);
        }
    }
    for CollisionEnded(a, b) in ended.read() {
        let Some(entity) = button_pair(*a, *b, &avatar) else { continue };
        if let Ok(mut button) = buttons.get_mut(entity) {
            button.touching = false;
        }
    }
}

/// Advance activation timelines, fire actions and drive the fade overlay.
#[allow(clippy::needless_pass_by_value)]
pub fn run_button_activations(
    time: Res<Time>,
    mut buttons: Query<&mut SignButton>,
    mut overlays: Query<&mut BackgroundColor, With<ActivationOverlay>>,
) {
    let mut opacity: f32 = 0.0;
    for mut button in &mut buttons {
        let step = button.activation.tick(time.delta());
        if step.fire {
            match perform(&button.target) {
                Ok(()) => info!("button {} action done", button.id),
                Err(e) => warn!("button {}: {e}", button.id),
            }
        }
        if step.released {
            debug!("button {} released", button.id);
        }
        opacity = opacity.max(button.activation.overlay_opacity());
    }
    for mut bg in &mut overlays {
        bg.0 = Color::BLACK.with_alpha(opacity);
    }
}

/// Hover rotation for one frame: spin while touched, ease back otherwise.
#[must_use]
pub fn hover_rotation(current: Quat, touching: bool) -> Quat {
    if touching {
        Quat::from_rotation_y(HOVER_SPIN) * current
    } else {
        current.slerp(Quat::IDENTITY, 0.1)
    }
}

/// Bob the visuals, spin and light the touched ones, press in latched faces.
#[allow(clippy::needless_pass_by_value)]
pub fn animate_buttons(
    time: Res<Time>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    buttons: Query<&SignButton>,
    mut visuals: Query<(&ButtonVisual, &mut Transform), Without<ButtonFace>>,
    mut faces: Query<(&mut ButtonFace, &mut Transform, &Handle<StandardMaterial>), Without<ButtonVisual>>,
) {
    let bob = float_offset(time.elapsed_seconds());
    for (visual, mut transform) in &mut visuals {
        let Ok(button) = buttons.get(visual.button) else { continue };
        transform.translation.y = bob;
        transform.rotation = hover_rotation(transform.rotation, button.touching);
    }

    for (mut face, mut transform, material) in &mut faces {
        let Ok(button) = buttons.get(face.button) else { continue };
        transform.translation.z = if button.activation.is_latched() { FACE_Z - FACE_PRESS_DEPTH } else { FACE_Z };
        if face.lit != button.touching
            && let Some(mat) = materials.get_mut(material)
        {
            mat.emissive = if button.touching { face.glow } else { LinearRgba::BLACK };
            face.lit = button.touching;
        }
    }
}

/// Keep each label over its button; hide it when the button is off-screen.
#[allow(clippy::needless_pass_by_value)]
pub fn place_button_labels(
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    buttons: Query<&GlobalTransform, With<SignButton>>,
    mut labels: Query<(&ButtonLabel, &mut Style, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = cameras.get_single() else { return };
    for (label, mut style, mut visibility) in &mut labels {
        let screen = buttons
            .get(label.button)
            .ok()
            .and_then(|t| camera.world_to_viewport(camera_transform, t.translation() + Vec3::Z * 0.25));
        match screen {
            Some(p) => {
                style.left = Val::Px(p.x - LABEL_WIDTH_PX / 2.0);
                style.top = Val::Px(p.y - 14.0);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
