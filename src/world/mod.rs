//! The walled meadow the avatar walks around in.
//!
//! A flat ground slab, four see-through boundary walls and randomly scattered
//! trees and rocks. Every body here is static. Placement is seeded from
//! `Settings.world.seed` so a layout can be reproduced.
//!
//! # Example:
//!
//! ```
//! use rand::SeedableRng;
//! use trailhead::world::{scatter_spaced, ScatterRules};
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let trees = scatter_spaced(&mut rng, 10, &ScatterRules::trees(40.0));
//! assert!(trees.iter().all(|p| p.length() >= 8.0));
//! ```
use avian3d::prelude::{Collider, RigidBody};
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::scene::GameScene;
use crate::settings::Settings;

pub const GROUND_Y: f32 = -2.0;
pub const GROUND_SIZE: f32 = 100.0;
const GROUND_THICKNESS: f32 = 0.2;
const WALL_HEIGHT: f32 = 4.0;
const WALL_THICKNESS: f32 = 1.0;
const TREE_PATH: &str = "background/cartoon_tree_1111232532_texture_draco.glb";
const TREE_Y: f32 = -0.1;
const TREE_SCALE: f32 = 2.0;
const TREE_TRUNK_RADIUS: f32 = 0.4;
const TREE_TRUNK_HEIGHT: f32 = 4.0;
const ROCK_Y: f32 = -1.9;
const PATH_RADIUS: f32 = 3.0;

/// Placement constraints for spaced scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRules {
    pub half_extent: f32,
    /// Keep this radius around the origin empty.
    pub clear_radius: f32,
    pub min_spacing: f32,
    /// Tries per item before giving up on it.
    pub attempts: u32,
}

impl ScatterRules {
    #[must_use]
    pub fn trees(half_extent: f32) -> Self {
        ScatterRules { half_extent, clear_radius: 8.0, min_spacing: 4.0, attempts: 50 }
    }
}

fn random_point<R: Rng>(rng: &mut R, half_extent: f32) -> Vec2 {
    Vec2::new(
        (rng.r#gen::<f32>() - 0.5) * half_extent * 2.0,
        (rng.r#gen::<f32>() - 0.5) * half_extent * 2.0,
    )
}

/// Up to `count` points in the square, outside the clear radius and at least
/// `min_spacing` apart. Items that find no valid spot are dropped.
pub fn scatter_spaced<R: Rng>(rng: &mut R, count: usize, rules: &ScatterRules) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..rules.attempts {
            let p = random_point(rng, rules.half_extent);
            if p.length() < rules.clear_radius {
                continue;
            }
            if placed.iter().all(|q| q.distance(p) >= rules.min_spacing) {
                placed.push(p);
                break;
            }
        }
    }
    placed
}

/// `count` unconstrained points in the square.
pub fn scatter_free<R: Rng>(rng: &mut R, count: usize, half_extent: f32) -> Vec<Vec2> {
    (0..count).map(|_| random_point(rng, half_extent)).collect()
}

/// Centre and full size of the four boundary walls.
#[must_use]
pub fn wall_layout(size: f32) -> [(Vec3, Vec3); 4] {
    let long_x = Vec3::new(size * 2.0, WALL_HEIGHT, WALL_THICKNESS);
    let long_z = Vec3::new(WALL_THICKNESS, WALL_HEIGHT, size * 2.0);
    [
        (Vec3::new(0.0, 0.0, -size), long_x),
        (Vec3::new(0.0, 0.0, size), long_x),
        (Vec3::new(size, 0.0, 0.0), long_z),
        (Vec3::new(-size, 0.0, 0.0), long_z),
    ]
}

/// Build the meadow: ground, walls, trees and rocks.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<Settings>,
) {
    let cfg = &settings.world;
    let scoped = StateScoped(GameScene::StartingPoint);

    commands.spawn((
        Name::new("ground"),
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE),
        PbrBundle {
            mesh: meshes.add(Cuboid::new(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(0.565, 0.698, 0.337),
                perceptual_roughness: 0.95,
                ..default()
            }),
            transform: Transform::from_xyz(0.0, GROUND_Y - GROUND_THICKNESS / 2.0, 0.0),
            ..default()
        },
        scoped.clone(),
    ));
    // worn patch around the spawn point
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Circle::new(PATH_RADIUS)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgba(0.349, 0.302, 0.239, 0.3),
                alpha_mode: AlphaMode::Blend,
                ..default()
            }),
            transform: Transform::from_xyz(0.0, GROUND_Y + 0.01, 0.0)
                .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            ..default()
        },
        scoped.clone(),
    ));

    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.545, 0.451, 0.333, 0.1),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.9,
        ..default()
    });
    for (center, size) in wall_layout(cfg.size) {
        commands.spawn((
            Name::new("wall"),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            PbrBundle {
                mesh: meshes.add(Cuboid::from_size(size)),
                material: wall_material.clone(),
                transform: Transform::from_translation(center),
                ..default()
            },
            scoped.clone(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let tree_scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(TREE_PATH));
    let trees = scatter_spaced(&mut rng, cfg.tree_count, &ScatterRules::trees(cfg.size));
    for p in &trees {
        let yaw = rng.gen_range(0.0..TAU);
        commands
            .spawn((
                Name::new("tree"),
                RigidBody::Static,
                SpatialBundle::from_transform(Transform::from_xyz(p.x, TREE_Y, p.y)),
                scoped.clone(),
            ))
            .with_children(|tree| {
                tree.spawn((
                    Collider::cylinder(TREE_TRUNK_RADIUS, TREE_TRUNK_HEIGHT),
                    TransformBundle::from_transform(Transform::from_xyz(0.0, GROUND_Y - TREE_Y + TREE_TRUNK_HEIGHT / 2.0, 0.0)),
                ));
                tree.spawn(SceneBundle {
                    scene: tree_scene.clone(),
                    transform: Transform::from_scale(Vec3::splat(TREE_SCALE))
                        .with_rotation(Quat::from_rotation_y(yaw)),
                    ..default()
                });
            });
    }

    let rock_mesh = meshes.add(Sphere::new(1.0).mesh().uv(6, 4));
    let rock_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.4, 0.4, 0.4),
        perceptual_roughness: 0.8,
        ..default()
    });
    let rocks = scatter_free(&mut rng, cfg.rock_count, cfg.size);
    for p in &rocks {
        let scale = 0.1 + rng.r#gen::<f32>() * 0.3;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            rng.r#gen::<f32>() * PI,
            rng.r#gen::<f32>() * PI,
            rng.r#gen::<f32>() * PI,
        );
        commands.spawn((
            Name::new("rock"),
            RigidBody::Static,
            Collider::sphere(1.0),
            PbrBundle {
                mesh: rock_mesh.clone(),
                material: rock_material.clone(),
                transform: Transform::from_xyz(p.x, ROCK_Y, p.y)
                    .with_rotation(rotation)
                    .with_scale(Vec3::splat(scale)),
                ..default()
            },
            scoped.clone(),
        ));
    }

    info!("world spawned: {} trees, {} rocks (seed {})", trees.len(), rocks.len(), cfg.seed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaced_scatter_respects_rules() {
        let mut rng = StdRng::seed_from_u64(42);
        let rules = ScatterRules::trees(40.0);
        let pts = scatter_spaced(&mut rng, 50, &rules);
        assert!(!pts.is_empty() && pts.len() <= 50);
        for (i, p) in pts.iter().enumerate() {
            assert!(p.length() >= rules.clear_radius);
            assert!(p.x.abs() <= 40.0 && p.y.abs() <= 40.0);
            for q in &pts[i + 1..] {
                assert!(p.distance(*q) >= rules.min_spacing);
            }
        }
    }

    #[test]
    fn impossible_rules_place_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let rules = ScatterRules { half_extent: 5.0, clear_radius: 100.0, min_spacing: 1.0, attempts: 10 };
        assert!(scatter_spaced(&mut rng, 20, &rules).is_empty());
    }

    #[test]
    fn same_seed_same_layout() {
        let a = scatter_free(&mut StdRng::seed_from_u64(9), 25, 40.0);
        let b = scatter_free(&mut StdRng::seed_from_u64(9), 25, 40.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 25);
    }

    #[test]
    fn walls_enclose_the_square() {
        let walls = wall_layout(40.0);
        assert_eq!(walls[0].0, Vec3::new(0.0, 0.0, -40.0));
        assert_eq!(walls[2].1, Vec3::new(1.0, 4.0, 80.0));
    }
}
