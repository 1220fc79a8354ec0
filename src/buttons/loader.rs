//! Button definitions from `data/buttons/*.ron`, one button per file.
//!
//! Invalid buttons are skipped with a warning. When nothing valid is found the
//! built-in set is used.
use bevy::log::warn;
use bevy::prelude::Resource;

use super::{default_buttons, ButtonConfig, ResolvedPalette};
use crate::ron_loader::load_ron_files;

pub const BUTTONS_DIR: &str = "data/buttons";

/// A validated button, ready to spawn.
#[derive(Debug, Clone)]
pub struct ButtonDef {
    pub config: ButtonConfig,
    pub palette: ResolvedPalette,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ButtonDefs(pub Vec<ButtonDef>);

fn validated(configs: Vec<ButtonConfig>) -> Vec<ButtonDef> {
    let mut defs: Vec<ButtonDef> = Vec::with_capacity(configs.len());
    for config in configs {
        if defs.iter().any(|d| d.config.id == config.id) {
            warn!("duplicate button id `{}`, skipping", config.id);
            continue;
        }
        match config.validate() {
            Ok(palette) => defs.push(ButtonDef { config, palette }),
            Err(e) => warn!("{e}"),
        }
    }
    defs
}

/// Load button definitions from `path`, falling back to the built-in set.
#[must_use]
pub fn load_buttons_from_dir(path: &str) -> ButtonDefs {
    let defs = validated(load_ron_files::<ButtonConfig>(path));
    if defs.is_empty() {
        return ButtonDefs(validated(default_buttons()));
    }
    ButtonDefs(defs)
}
