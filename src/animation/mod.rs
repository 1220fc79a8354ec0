//! Avatar animation bank.
//!
//! The avatar is five separately loaded skinned models, one per clip, each
//! with its own player. Exactly one of them is current: its model is visible
//! and its clip is playing; every other model is hidden. Switching is a hard
//! cut, not a blend.
//!
//! [`AnimationBank`] holds that bookkeeping without touching the engine so it
//! can be tested directly; the `rig` submodule mirrors it onto Bevy's
//! `AnimationPlayer`s and `Visibility`.
pub mod rig;

use bevy::prelude::Component;

pub use rig::*;

/// One of the five avatar clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    Idle1,
    Idle2,
    WalkingForward,
    WalkingBackward,
    Jump,
}

impl AnimationKey {
    pub const ALL: [AnimationKey; 5] = [
        AnimationKey::Idle1,
        AnimationKey::Idle2,
        AnimationKey::WalkingForward,
        AnimationKey::WalkingBackward,
        AnimationKey::Jump,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            AnimationKey::Idle1 => 0,
            AnimationKey::Idle2 => 1,
            AnimationKey::WalkingForward => 2,
            AnimationKey::WalkingBackward => 3,
            AnimationKey::Jump => 4,
        }
    }

    /// Asset path of the skinned model carrying this clip.
    #[must_use]
    pub const fn asset_path(self) -> &'static str {
        match self {
            AnimationKey::Idle1 => "character/Animation_Idle_02_withSkin_draco.glb",
            AnimationKey::Idle2 => "character/Animation_Idle_03_withSkin_draco.glb",
            AnimationKey::WalkingForward => "character/Animation_Walking_withSkin_draco.glb",
            AnimationKey::WalkingBackward => "character/Animation_Walk_Backward_inplace_withSkin_draco.glb",
            AnimationKey::Jump => "character/Animation_Regular_Jump_withSkin_draco.glb",
        }
    }

    /// The jump clip plays once and holds its last frame; everything else loops.
    #[must_use]
    pub const fn looping(self) -> bool {
        !matches!(self, AnimationKey::Jump)
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, AnimationKey::Idle1 | AnimationKey::Idle2)
    }

    /// The other idle variant. Non-idle keys map to `Idle1`.
    #[must_use]
    pub const fn other_idle(self) -> AnimationKey {
        match self {
            AnimationKey::Idle1 => AnimationKey::Idle2,
            _ => AnimationKey::Idle1,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            AnimationKey::Idle1 => "idle1",
            AnimationKey::Idle2 => "idle2",
            AnimationKey::WalkingForward => "walkingForward",
            AnimationKey::WalkingBackward => "walkingBackward",
            AnimationKey::Jump => "jump",
        }
    }
}

/// Per-clip flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSlot {
    pub visible: bool,
    pub playing: bool,
    /// `false` once the model is known to carry no clip; playback is skipped.
    pub available: bool,
    finish_reported: bool,
}

impl Default for ClipSlot {
    fn default() -> Self {
        ClipSlot { visible: false, playing: false, available: true, finish_reported: false }
    }
}

/// A switch the engine side must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipTransition {
    pub from: AnimationKey,
    pub to: AnimationKey,
    /// `false` when leaving the jump clip, which is left clamped on its last frame.
    pub stop_previous: bool,
}

/// Which clip is current, and the visible/playing flags of all five.
#[derive(Component, Debug, Clone)]
pub struct AnimationBank {
    slots: [ClipSlot; 5],
    current: AnimationKey,
}

impl Default for AnimationBank {
    fn default() -> Self {
        Self::new(AnimationKey::Idle1)
    }
}

impl AnimationBank {
    /// A bank showing and playing `initial`.
    #[must_use]
    pub fn new(initial: AnimationKey) -> Self {
        let mut slots = [ClipSlot::default(); 5];
        slots[initial.index()].visible = true;
        slots[initial.index()].playing = true;
        AnimationBank { slots, current: initial }
    }

    #[must_use]
    pub fn current(&self) -> AnimationKey {
        self.current
    }

    #[must_use]
    pub fn slot(&self, key: AnimationKey) -> &ClipSlot {
        &self.slots[key.index()]
    }

    /// Keys whose model is visible. Always exactly the current key.
    pub fn visible_keys(&self) -> impl Iterator<Item = AnimationKey> + '_ {
        AnimationKey::ALL.into_iter().filter(|k| self.slots[k.index()].visible)
    }

    /// Switch to `target`. Returns `None` when it is already current.
    ///
    /// The previous clip is stopped unless it was the jump; all models are
    /// hidden and the target's is shown; the target clip restarts from zero.
    pub fn transition_to(&mut self, target: AnimationKey) -> Option<ClipTransition> {
        if target == self.current {
            return None;
        }
        let from = self.current;
        let stop_previous = from != AnimationKey::Jump;
        if stop_previous {
            self.slots[from.index()].playing = false;
        }
        for slot in &mut self.slots {
            slot.visible = false;
        }
        let slot = &mut self.slots[target.index()];
        slot.visible = true;
        slot.playing = slot.available;
        slot.finish_reported = false;
        self.current = target;

        Some(ClipTransition { from, to: target, stop_previous })
    }

    /// Record that `key`'s model carries no clip.
    pub fn mark_unavailable(&mut self, key: AnimationKey) {
        let slot = &mut self.slots[key.index()];
        slot.available = false;
        slot.playing = false;
    }

    /// Record that the current play of `key` finished. Returns `true` only the
    /// first time per play, so the finish is acted upon once.
    pub fn report_finished(&mut self, key: AnimationKey) -> bool {
        let slot = &mut self.slots[key.index()];
        if slot.finish_reported || key != self.current {
            return false;
        }
        slot.finish_reported = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(bank: &AnimationBank) {
        let visible: Vec<_> = bank.visible_keys().collect();
        assert_eq!(visible, vec![bank.current()]);
        assert!(bank.slot(bank.current()).playing);
    }

    #[test]
    fn starts_on_first_idle() {
        let bank = AnimationBank::default();
        assert_eq!(bank.current(), AnimationKey::Idle1);
        assert_consistent(&bank);
    }

    #[test]
    fn switching_stops_previous_and_shows_only_target() {
        let mut bank = AnimationBank::default();
        let t = bank.transition_to(AnimationKey::WalkingForward).unwrap();
        assert_eq!(t, ClipTransition {
            from: AnimationKey::Idle1,
            to: AnimationKey::WalkingForward,
            stop_previous: true,
        });
        assert!(!bank.slot(AnimationKey::Idle1).playing);
        assert_consistent(&bank);
        assert!(bank.transition_to(AnimationKey::WalkingForward).is_none());
    }

    #[test]
    fn jump_is_left_clamped_when_leaving() {
        let mut bank = AnimationBank::default();
        bank.transition_to(AnimationKey::Jump);
        let t = bank.transition_to(AnimationKey::Idle1).unwrap();
        assert!(!t.stop_previous);
        assert!(!bank.slot(AnimationKey::Jump).visible);
        assert_consistent(&bank);
    }

    #[test]
    fn exactly_one_visible_through_any_sequence() {
        let mut bank = AnimationBank::default();
        let seq = [3usize, 4, 4, 0, 1, 2, 4, 3, 1, 1, 0];
        for i in seq {
            bank.transition_to(AnimationKey::ALL[i]);
            assert_consistent(&bank);
        }
    }

    #[test]
    fn finish_is_reported_once_per_play() {
        let mut bank = AnimationBank::default();
        assert!(!bank.report_finished(AnimationKey::Jump));
        bank.transition_to(AnimationKey::Jump);
        assert!(bank.report_finished(AnimationKey::Jump));
        assert!(!bank.report_finished(AnimationKey::Jump));
        bank.transition_to(AnimationKey::Idle1);
        bank.transition_to(AnimationKey::Jump);
        assert!(bank.report_finished(AnimationKey::Jump));
    }

    #[test]
    fn unavailable_clip_is_shown_but_not_played() {
        let mut bank = AnimationBank::default();
        bank.mark_unavailable(AnimationKey::Idle2);
        bank.transition_to(AnimationKey::Idle2);
        assert!(bank.slot(AnimationKey::Idle2).visible);
        assert!(!bank.slot(AnimationKey::Idle2).playing);
    }

    #[test]
    fn key_helpers() {
        assert!(!AnimationKey::Jump.looping());
        assert!(AnimationKey::Idle2.is_idle());
        assert_eq!(AnimationKey::Idle1.other_idle(), AnimationKey::Idle2);
        assert_eq!(AnimationKey::Idle2.other_idle(), AnimationKey::Idle1);
        for (i, k) in AnimationKey::ALL.iter().enumerate() {
            assert_eq!(k.index(), i);
        }
    }
}
