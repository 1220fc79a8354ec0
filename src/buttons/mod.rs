//! Floating signpost buttons.
//!
//! Each button is a static sensor with a layered box visual. Touching the
//! sensor starts a one-shot activation: the screen fades to black, the
//! button's action (open a link or download a file) fires, then the screen
//! fades back. A latch keeps further touches inert until the cycle ends.
pub mod loader;
pub mod navigate;
pub mod systems;

use bevy::color::Srgba;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::*;
pub use navigate::*;
pub use systems::*;

/// Overlay fade-in duration; the action fires when it completes.
pub const FADE_IN: Duration = Duration::from_millis(500);
/// End of the fully-black hold after the action.
pub const HOLD_END: Duration = Duration::from_millis(600);
/// End of fade-out; the latch releases here.
pub const RELEASE_AT: Duration = Duration::from_millis(1100);

/// What a button does when activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonTarget {
    /// Open an external page.
    Url(String),
    /// Save a bundled file (path relative to the asset root, leading `/` allowed).
    Download(String),
}

/// Hex colours of the four button layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPalette {
    pub primary: String,
    pub secondary: String,
    pub border: String,
    pub border_dark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub id: String,
    pub label: String,
    pub target: ButtonTarget,
    pub color: ButtonPalette,
    pub position: Vec3,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ButtonConfigError {
    #[error("button has an empty id")]
    EmptyId,
    #[error("button `{0}` has an empty label")]
    EmptyLabel(String),
    #[error("button `{id}` has an empty target")]
    EmptyTarget { id: String },
    #[error("button `{id}` has invalid {layer} colour `{value}`")]
    BadColor { id: String, layer: &'static str, value: String },
}

/// Resolved colours, ready for materials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPalette {
    pub primary: Color,
    pub secondary: Color,
    pub border: Color,
    pub border_dark: Color,
}

impl ButtonConfig {
    /// Check the config and resolve its colours.
    ///
    /// # Errors
    /// Returns the first problem found: empty id/label/target or an
    /// unparsable hex colour.
    pub fn validate(&self) -> Result<ResolvedPalette, ButtonConfigError> {
        if self.id.trim().is_empty() {
            return Err(ButtonConfigError::EmptyId);
        }
        if self.label.trim().is_empty() {
            return Err(ButtonConfigError::EmptyLabel(self.id.clone()));
        }
        let target = match &self.target {
            ButtonTarget::Url(s) | ButtonTarget::Download(s) => s,
        };
        if target.trim().is_empty() {
            return Err(ButtonConfigError::EmptyTarget { id: self.id.clone() });
        }

        let parse = |layer: &'static str, value: &str| {
            Srgba::hex(value).map(Color::from).map_err(|_| ButtonConfigError::BadColor {
                id: self.id.clone(),
                layer,
                value: value.to_string(),
            })
        };
        Ok(ResolvedPalette {
            primary: parse("primary", &self.color.primary)?,
            secondary: parse("secondary", &self.color.secondary)?,
            border: parse("border", &self.color.border)?,
            border_dark: parse("border_dark", &self.color.border_dark)?,
        })
    }
}

fn palette(primary: &str, secondary: &str, border: &str, border_dark: &str) -> ButtonPalette {
    ButtonPalette {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        border: border.to_string(),
        border_dark: border_dark.to_string(),
    }
}

/// The built-in row of four buttons in front of the spawn point.
#[must_use]
pub fn default_buttons() -> Vec<ButtonConfig> {
    vec![
        ButtonConfig {
            id: "portfolio".to_string(),
            label: "PORTFOLIO".to_string(),
            target: ButtonTarget::Url("https://kcaparas-portfolio.web.app/".to_string()),
            color: palette("#fbbf24", "#f59e0b", "#8b5cf6", "#6d28d9"),
            position: Vec3::new(-6.0, 0.3, 0.0),
        },
        ButtonConfig {
            id: "github".to_string(),
            label: "GITHUB".to_string(),
            target: ButtonTarget::Url("https://github.com/kcaparas1630".to_string()),
            color: palette("#6b7280", "#4b5563", "#1f2937", "#111827"),
            position: Vec3::new(-2.0, 0.3, 0.0),
        },
        ButtonConfig {
            id: "linkedin".to_string(),
            label: "LINKEDIN".to_string(),
            target: ButtonTarget::Url("https://www.linkedin.com/in/kcaparas-1630/".to_string()),
            color: palette("#3b82f6", "#2563eb", "#1e40af", "#1e3a8a"),
            position: Vec3::new(2.0, 0.3, 0.0),
        },
        ButtonConfig {
            id: "resume".to_string(),
            label: "RESUME".to_string(),
            target: ButtonTarget::Download("/docs/KentCaparas_Resume.pdf".to_string()),
            color: palette("#10b981", "#059669", "#047857", "#065f46"),
            position: Vec3::new(6.0, 0.3, 0.0),
        },
    ]
}

/// Where an activation is on its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    Idle,
    FadingIn,
    Holding,
    FadingOut,
}

/// Events produced while an activation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationStep {
    /// Perform the button's action now.
    pub fire: bool,
    /// The cycle ended; the latch is open again.
    pub released: bool,
}

/// Latch plus fade timeline for one button.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonActivation {
    elapsed: Option<Duration>,
    fired: bool,
}

impl ButtonActivation {
    /// Start a cycle. Returns `false` (and does nothing) while latched.
    pub fn trigger(&mut self) -> bool {
        if self.elapsed.is_some() {
            return false;
        }
        self.elapsed = Some(Duration::ZERO);
        self.fired = false;
        true
    }

    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.elapsed.is_some()
    }

    pub fn tick(&mut self, dt: Duration) -> ActivationStep {
        let Some(elapsed) = self.elapsed.as_mut() else {
            return ActivationStep::default();
        };
        *elapsed += dt;
        let now = *elapsed;

        let mut step = ActivationStep::default();
        if !self.fired && now >= FADE_IN {
            self.fired = true;
            step.fire = true;
        }
        if now >= RELEASE_AT {
            self.elapsed = None;
            step.released = true;
        }
        step
    }

    #[must_use]
    pub fn phase(&self) -> ActivationPhase {
        match self.elapsed {
            None => ActivationPhase::Idle,
            Some(t) if t < FADE_IN => ActivationPhase::FadingIn,
            Some(t) if t < HOLD_END => ActivationPhase::Holding,
            Some(_) => ActivationPhase::FadingOut,
        }
    }

    /// Black overlay opacity for the current point of the cycle.
    #[must_use]
    pub fn overlay_opacity(&self) -> f32 {
        let Some(t) = self.elapsed else { return 0.0 };
        if t < FADE_IN {
            t.as_secs_f32() / FADE_IN.as_secs_f32()
        } else if t < HOLD_END {
            1.0
        } else {
            let fade = (RELEASE_AT - HOLD_END).as_secs_f32();
            (1.0 - (t - HOLD_END).as_secs_f32() / fade).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(10);

    #[test]
    fn defaults_are_valid() {
        let buttons = default_buttons();
        assert_eq!(buttons.len(), 4);
        for b in &buttons {
            assert!(b.validate().is_ok(), "{}", b.id);
        }
        assert!(matches!(buttons[3].target, ButtonTarget::Download(_)));
    }

    #[test]
    fn bad_configs_are_reported() {
        let mut b = default_buttons().remove(0);
        b.color.border = "purple-ish".to_string();
        assert_eq!(b.validate(), Err(ButtonConfigError::BadColor {
            id: "portfolio".to_string(),
            layer: "border",
            value: "purple-ish".to_string(),
        }));
        b = default_buttons().remove(0);
        b.label = "  ".to_string();
        assert_eq!(b.validate(), Err(ButtonConfigError::EmptyLabel("portfolio".to_string())));
        b = default_buttons().remove(0);
        b.target = ButtonTarget::Url(String::new());
        assert!(matches!(b.validate(), Err(ButtonConfigError::EmptyTarget { .. })));
    }

    #[test]
    fn fires_exactly_once_per_cycle() {
        let mut a = ButtonActivation::default();
        assert!(a.trigger());
        let mut fires = 0;
        let mut released_at = None;
        for i in 1..=200 {
            // touching again mid-cycle is inert
            if i % 7 == 0 && a.is_latched() {
                assert!(!a.trigger());
            }
            let step = a.tick(FRAME);
            if step.fire {
                fires += 1;
                assert_eq!(i * 10, 500);
            }
            if step.released {
                released_at = Some(i * 10);
                break;
            }
        }
        assert_eq!(fires, 1);
        assert_eq!(released_at, Some(1100));
        assert!(!a.is_latched());
        assert!(a.trigger());
    }

    #[test]
    fn opacity_follows_timeline() {
        let mut a = ButtonActivation::default();
        assert_eq!(a.overlay_opacity(), 0.0);
        a.trigger();
        a.tick(Duration::from_millis(250));
        assert!((a.overlay_opacity() - 0.5).abs() < 1e-5);
        assert_eq!(a.phase(), ActivationPhase::FadingIn);
        a.tick(Duration::from_millis(300));
        assert_eq!(a.overlay_opacity(), 1.0);
        assert_eq!(a.phase(), ActivationPhase::Holding);
        a.tick(Duration::from_millis(300)); // 850ms
        assert!((a.overlay_opacity() - 0.5).abs() < 1e-5);
        assert_eq!(a.phase(), ActivationPhase::FadingOut);
        a.tick(Duration::from_millis(300));
        assert_eq!(a.overlay_opacity(), 0.0);
        assert_eq!(a.phase(), ActivationPhase::Idle);
        assert!(!a.is_latched());
    }

    #[test]
    fn idle_tick_is_inert() {
        let mut a = ButtonActivation::default();
        assert_eq!(a.tick(Duration::from_secs(5)), ActivationStep::default());
    }
}
