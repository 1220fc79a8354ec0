//! Scene switching between the loading screen and the world.
//!
//! [`SceneDirector`] is the two-state controller: a switch raises the
//! transitioning flag, waits a fixed delay, then swaps the active scene. The
//! loading scene hands over to the world after a fixed time no matter what the
//! asset loader reports; when assets were already preloaded the world is shown
//! straight away.
pub mod loading;

use bevy::prelude::*;
use std::time::Duration;

pub use loading::*;

use crate::settings::SceneSettings;

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameScene {
    #[default]
    Loading,
    StartingPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSwitch {
    target: GameScene,
    remaining: Duration,
}

/// Which scene is active and whether a switch is in flight.
#[derive(Resource, Debug, Clone)]
pub struct SceneDirector {
    active: GameScene,
    pending: Option<PendingSwitch>,
    loading_elapsed: Duration,
    loading_duration: Duration,
    transition_delay: Duration,
}

impl SceneDirector {
    #[must_use]
    pub fn new(preloaded: bool, loading_duration: Duration, transition_delay: Duration) -> Self {
        SceneDirector {
            active: if preloaded { GameScene::StartingPoint } else { GameScene::Loading },
            pending: None,
            loading_elapsed: Duration::ZERO,
            loading_duration,
            transition_delay,
        }
    }

    #[must_use]
    pub fn from_settings(cfg: &SceneSettings) -> Self {
        Self::new(
            cfg.preloaded,
            Duration::from_secs_f32(cfg.loading_seconds.max(0.0)),
            Duration::from_millis(cfg.transition_ms),
        )
    }

    #[must_use]
    pub fn active(&self) -> GameScene {
        self.active
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin switching to `target`. Ignored while a switch is already running.
    pub fn request(&mut self, target: GameScene) {
        if self.pending.is_none() {
            self.pending = Some(PendingSwitch { target, remaining: self.transition_delay });
        }
    }

    /// Advance timers by `dt`. Returns the new scene on the frame it becomes active.
    pub fn tick(&mut self, dt: Duration) -> Option<GameScene> {
        if self.active == GameScene::Loading && self.pending.is_none() {
            self.loading_elapsed += dt;
            if self.loading_elapsed >= self.loading_duration {
                self.request(GameScene::StartingPoint);
                return None;
            }
        }

        let pending = self.pending.as_mut()?;
        pending.remaining = pending.remaining.saturating_sub(dt);
        if !pending.remaining.is_zero() {
            return None;
        }
        let target = pending.target;
        self.pending = None;
        self.active = target;
        if target == GameScene::Loading {
            self.loading_elapsed = Duration::ZERO;
        }
        Some(target)
    }
}

/// Full-screen black node shown while a switch is in flight.
#[derive(Component)]
pub struct TransitionOverlay;

/// Drive the director and push its decisions into Bevy's state machine.
#[allow(clippy::needless_pass_by_value)]
pub fn advance_scene_director(
    time: Res<Time>,
    mut director: ResMut<SceneDirector>,
    mut next: ResMut<NextState<GameScene>>,
) {
    if let Some(scene) = director.tick(time.delta()) {
        info!("switching scene to {scene:?}");
        next.set(scene);
    }
}

pub fn spawn_transition_overlay(mut commands: Commands) {
    commands.spawn((
        TransitionOverlay,
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                display: Display::None,
                ..default()
            },
            background_color: Color::BLACK.into(),
            z_index: ZIndex::Global(900),
            ..default()
        },
    ));
}

#[allow(clippy::needless_pass_by_value)]
pub fn sync_transition_overlay(director: Res<SceneDirector>, mut overlays: Query<&mut Style, With<TransitionOverlay>>) {
    let display = if director.is_transitioning() { Display::Flex } else { Display::None };
    for mut style in &mut overlays {
        if style.display != display {
            style.display = display;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn director(preloaded: bool) -> SceneDirector {
        SceneDirector::new(preloaded, Duration::from_millis(5000), Duration::from_millis(300))
    }

    #[test]
    fn preloaded_starts_in_world_without_loading() {
        let mut d = director(true);
        assert_eq!(d.active(), GameScene::StartingPoint);
        for _ in 0..1000 {
            assert_eq!(d.tick(FRAME), None);
        }
        assert_eq!(d.active(), GameScene::StartingPoint);
    }

    #[test]
    fn loading_lasts_at_least_its_duration() {
        let mut d = director(false);
        let mut elapsed = Duration::ZERO;
        let switched_at = loop {
            elapsed += FRAME;
            if let Some(scene) = d.tick(FRAME) {
                assert_eq!(scene, GameScene::StartingPoint);
                break elapsed;
            }
            if elapsed < Duration::from_millis(5000) {
                assert_eq!(d.active(), GameScene::Loading);
                assert!(!d.is_transitioning());
            }
            assert!(elapsed < Duration::from_secs(10), "never switched");
        };
        assert!(switched_at >= Duration::from_millis(5300));
        assert!(!d.is_transitioning());
        assert_eq!(d.active(), GameScene::StartingPoint);
    }

    #[test]
    fn transition_waits_the_delay() {
        let mut d = director(true);
        d.request(GameScene::Loading);
        assert!(d.is_transitioning());
        assert_eq!(d.tick(Duration::from_millis(299)), None);
        assert_eq!(d.active(), GameScene::StartingPoint);
        assert_eq!(d.tick(Duration::from_millis(1)), Some(GameScene::Loading));
        assert!(!d.is_transitioning());
    }

    #[test]
    fn second_request_during_switch_is_ignored() {
        let mut d = director(true);
        d.request(GameScene::Loading);
        d.request(GameScene::StartingPoint);
        assert_eq!(d.tick(Duration::from_millis(300)), Some(GameScene::Loading));
    }

    #[test]
    fn director_drives_state_and_clears_loading_entities() {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin)
            .init_resource::<Time>()
            .insert_state(GameScene::Loading)
            .enable_state_scoped_entities::<GameScene>()
            .insert_resource(SceneDirector::new(false, Duration::from_millis(50), Duration::from_millis(50)))
            .add_systems(Update, advance_scene_director);
        let globe = app.world_mut().spawn(StateScoped(GameScene::Loading)).id();

        let step = |app: &mut App| {
            app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(100));
            app.update();
            *app.world().resource::<State<GameScene>>().get()
        };
        // loading elapses, then the transition delay, then the state applies
        assert_eq!(step(&mut app), GameScene::Loading);
        assert!(app.world().resource::<SceneDirector>().is_transitioning());
        assert_eq!(step(&mut app), GameScene::Loading);
        assert_eq!(step(&mut app), GameScene::StartingPoint);
        assert!(app.world().get_entity(globe).is_none());
    }
}
