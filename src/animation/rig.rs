//! Engine side of the animation bank.
//!
//! Each clip model is loaded as a glTF; once loaded its first animation becomes
//! a one-clip `AnimationGraph`. When the model's scene spawns, the
//! `AnimationPlayer` Bevy creates inside it is found by walking up to the
//! [`AnimationSlot`] root and is bound to that graph. Bank transitions are then
//! mirrored onto players and `Visibility` by [`apply_clip_transition`].
use bevy::animation::graph::AnimationNodeIndex;
use bevy::animation::AnimationPlayer;
use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::hierarchy::HierarchyQueryExt;
use bevy::prelude::*;

use super::{AnimationBank, AnimationKey, ClipTransition};

/// Marks the scene root of one clip model.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnimationSlot(pub AnimationKey);

/// Added to an `AnimationPlayer` entity once it is bound to its clip.
#[derive(Component, Debug, Clone, Copy)]
pub struct ClipPlayer {
    pub key: AnimationKey,
    pub node: AnimationNodeIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipStatus {
    Loading,
    Ready {
        graph: Handle<AnimationGraph>,
        node: AnimationNodeIndex,
    },
    /// The model failed to load or has no animations.
    Missing,
}

#[derive(Debug, Clone)]
pub struct ClipEntry {
    pub gltf: Handle<Gltf>,
    pub status: ClipStatus,
}

/// Loaded clip models, indexed by [`AnimationKey::index`].
#[derive(Resource, Debug, Clone)]
pub struct AnimationLibrary {
    pub entries: Vec<ClipEntry>,
}

impl AnimationLibrary {
    #[must_use]
    pub fn entry(&self, key: AnimationKey) -> &ClipEntry {
        &self.entries[key.index()]
    }
}

/// Start loading all five clip models. Runs at startup so they stream in
/// while the loading scene is on screen.
pub fn load_animation_library(mut commands: Commands, asset_server: Res<AssetServer>) {
    let entries = AnimationKey::ALL
        .iter()
        .map(|key| ClipEntry {
            gltf: asset_server.load(key.asset_path()),
            status: ClipStatus::Loading,
        })
        .collect();
    commands.insert_resource(AnimationLibrary { entries });
}

/// Build a graph for every model that finished loading.
#[allow(clippy::needless_pass_by_value)]
pub fn prepare_animation_graphs(
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    library: Option<ResMut<AnimationLibrary>>,
) {
    let Some(mut library) = library else { return };

    for (key, entry) in AnimationKey::ALL.iter().zip(library.entries.iter_mut()) {
        if entry.status != ClipStatus::Loading {
            continue;
        }
        if let Some(gltf) = gltfs.get(&entry.gltf) {
            entry.status = match gltf.animations.first() {
                Some(clip) => {
                    let (graph, node) = AnimationGraph::from_clip(clip.clone());
                    debug!("animation graph ready for {}", key.label());
                    ClipStatus::Ready { graph: graphs.add(graph), node }
                }
                None => {
                    warn!("{} has no animations; clip skipped", key.asset_path());
                    ClipStatus::Missing
                }
            };
        } else if matches!(asset_server.load_state(&entry.gltf), LoadState::Failed(_)) {
            warn!("failed to load {}; clip skipped", key.asset_path());
            entry.status = ClipStatus::Missing;
        }
    }
}

/// Copy missing-clip knowledge into avatar banks.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_missing_clips(library: Option<Res<AnimationLibrary>>, mut banks: Query<&mut AnimationBank>) {
    let Some(library) = library else { return };
    for mut bank in &mut banks {
        for key in AnimationKey::ALL {
            if library.entry(key).status == ClipStatus::Missing && bank.slot(key).available {
                bank.mark_unavailable(key);
            }
        }
    }
}

/// Bind freshly spawned `AnimationPlayer`s inside clip models to their graph.
///
/// A player whose clip is still loading is left unbound and retried next frame.
#[allow(clippy::needless_pass_by_value)]
pub fn bind_animation_players(
    mut commands: Commands,
    library: Option<Res<AnimationLibrary>>,
    mut players: Query<(Entity, &mut AnimationPlayer), Without<ClipPlayer>>,
    parents: Query<&Parent>,
    slots: Query<&AnimationSlot>,
    banks: Query<&AnimationBank>,
) {
    let Some(library) = library else { return };

    for (entity, mut player) in &mut players {
        let Some(slot) = parents
            .iter_ancestors(entity)
            .find_map(|ancestor| slots.get(ancestor).ok())
        else {
            continue;
        };
        let key = slot.0;
        let ClipStatus::Ready { graph, node } = &library.entry(key).status else {
            continue;
        };

        let should_play = banks
            .iter()
            .any(|bank| bank.current() == key && bank.slot(key).playing);
        if should_play {
            start_clip(&mut player, key, *node);
        }
        commands
            .entity(entity)
            .insert((graph.clone(), ClipPlayer { key, node: *node }));
    }
}

fn start_clip(player: &mut AnimationPlayer, key: AnimationKey, node: AnimationNodeIndex) {
    let active = player.start(node);
    if key.looping() {
        active.repeat();
    }
}

/// Mirror a bank transition onto the engine.
pub fn apply_clip_transition(
    transition: ClipTransition,
    players: &mut Query<(&ClipPlayer, &mut AnimationPlayer)>,
    slots: &mut Query<(&AnimationSlot, &mut Visibility)>,
) {
    for (clip, mut player) in players.iter_mut() {
        if clip.key == transition.from && transition.stop_previous {
            player.stop(clip.node);
        } else if clip.key == transition.to {
            start_clip(&mut player, clip.key, clip.node);
        }
    }
    for (slot, mut visibility) in slots.iter_mut() {
        *visibility = if slot.0 == transition.to { Visibility::Inherited } else { Visibility::Hidden };
    }
    debug!("animation {} -> {}", transition.from.label(), transition.to.label());
}

/// Whether the bound player for `key` has finished its current play. A clip
/// that will never play counts as finished.
#[must_use]
pub fn clip_finished(
    key: AnimationKey,
    bank: &AnimationBank,
    players: &Query<(&ClipPlayer, &mut AnimationPlayer)>,
) -> bool {
    if !bank.slot(key).available {
        return true;
    }
    players.iter().any(|(clip, player)| {
        clip.key == key && player.animation(clip.node).is_some_and(|a| a.is_finished())
    })
}
