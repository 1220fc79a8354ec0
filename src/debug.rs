//! Debug utilities, including a system (F3 default) to dump diagnostics,
//! entity counts, asset counts, memory use and the avatar controller state to a
//! timestamped text file in './debug-dumps/'.
//!
//! Handy for capturing what the controller was doing at a given moment
//! without attaching a debugger.
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::pbr::StandardMaterial;
use bevy::prelude::*;
use bevy::render::mesh::Mesh;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Pid, ProcessExt, System, SystemExt};

use crate::animation::{AnimationBank, AnimationKey};
use crate::player::{Avatar, Locomotion};
use crate::settings::Settings;

const DUMP_DIR: &str = "debug-dumps";

/// Point-in-time view of the avatar controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    pub position: Vec3,
    pub yaw: f32,
    pub animation: AnimationKey,
    pub idle_variant: AnimationKey,
    pub idle_timer: f32,
    pub grounded: bool,
    pub jumping: bool,
}

impl ControllerSnapshot {
    #[must_use]
    pub fn capture(position: Vec3, loco: &Locomotion, bank: &AnimationBank) -> Self {
        ControllerSnapshot {
            position,
            yaw: loco.yaw,
            animation: bank.current(),
            idle_variant: loco.idle_variant,
            idle_timer: loco.idle_timer,
            grounded: loco.grounded,
            jumping: loco.jumping,
        }
    }
}

impl fmt::Display for ControllerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        writeln!(f, "Pos: ({:.1}, {:.1}, {:.1}) yaw {:.0}°", p.x, p.y, p.z, self.yaw.to_degrees())?;
        writeln!(f, "Animation: {} (idle {})", self.animation.label(), self.idle_variant.label())?;
        write!(
            f,
            "Grounded: {} | Jumping: {} | Idle timer: {:.1}s",
            self.grounded, self.jumping, self.idle_timer
        )
    }
}

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// Convert kilobytes into a megabyte string (e.g. "123.45 MB").
fn kb_to_mb(kb: u64) -> String {
    format!("{:.2} MB", (kb as f64) / 1024.0)
}

/// Build the dump text. Split out of the system so it can be tested.
#[must_use]
pub fn render_dump(
    now: SystemTime,
    fps: f64,
    frame_time: f64,
    entity_count: usize,
    assets: (usize, usize),
    memory: Option<(u64, u64, u64, u64)>,
    controller: Option<&ControllerSnapshot>,
) -> String {
    let ts_secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let dt: DateTime<Utc> = DateTime::from(now);

    let mut out = String::new();
    writeln!(out, "Debug dump: {ts_secs}").ok();
    writeln!(out, "Timestamp: {} (epoch secs: {ts_secs})", dt.format("%Y-%m-%d %H:%M:%S")).ok();
    writeln!(out, "FPS: {fps:.1}, frame_time: {:.4} ms", frame_time * 1000.0).ok();
    writeln!(out, "Entities: {entity_count}").ok();
    writeln!(out, "Assets: meshes={} materials={}", assets.0, assets.1).ok();
    if let Some((proc_kb, virt_kb, total_kb, used_kb)) = memory {
        writeln!(out, "Process memory: {} (virtual {})", kb_to_mb(proc_kb), kb_to_mb(virt_kb)).ok();
        writeln!(out, "System memory: total={} used={}", kb_to_mb(total_kb), kb_to_mb(used_kb)).ok();
    }

    writeln!(out, "\nController:").ok();
    match controller {
        Some(c) => writeln!(out, "{c}").ok(),
        None => writeln!(out, "  (no avatar in the current scene)").ok(),
    };
    out
}

fn memory_stats() -> Option<(u64, u64, u64, u64)> {
    let mut sys = System::new_all();
    sys.refresh_all();
    let proc = sys.process(Pid::from(std::process::id() as usize))?;
    Some((proc.memory(), proc.virtual_memory(), sys.total_memory(), sys.used_memory()))
}

/// Write a dump when the dump key (default F3) is pressed.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    diagnostics: Res<DiagnosticsStore>,
    query_entities: Query<Entity>,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
    avatar: Query<(&GlobalTransform, &Locomotion, &AnimationBank), With<Avatar>>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    let fps = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS).and_then(Diagnostic::smoothed).unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let controller = avatar
        .get_single()
        .ok()
        .map(|(t, loco, bank)| ControllerSnapshot::capture(t.translation(), loco, bank));

    let now = SystemTime::now();
    let out = render_dump(
        now,
        fps,
        frame_time,
        query_entities.iter().count(),
        (meshes.len(), materials.len()),
        memory_stats(),
        controller.as_ref(),
    );

    let ts_secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let fname = format!("{DUMP_DIR}/debug-{ts_secs}.txt");
    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{DUMP_DIR}': {e}");
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {fname}: {e}");
    } else {
        info!("wrote debug dump: {fname}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn dump_contains_controller_state() {
        let snap = ControllerSnapshot {
            position: Vec3::new(1.0, -2.0, 3.5),
            yaw: 0.0,
            animation: AnimationKey::Jump,
            idle_variant: AnimationKey::Idle2,
            idle_timer: 0.0,
            grounded: false,
            jumping: true,
        };
        let text = render_dump(UNIX_EPOCH + Duration::from_secs(60), 59.94, 0.016, 42, (3, 4), None, Some(&snap));
        assert!(text.starts_with("Debug dump: 60\n"));
        assert!(text.contains("1970-01-01 00:01:00"));
        assert!(text.contains("Entities: 42"));
        assert!(text.contains("Pos: (1.0, -2.0, 3.5)"));
        assert!(text.contains("Jumping: true"));
        assert!(!text.contains("Process memory"));
    }

    #[test]
    fn dump_without_avatar_says_so() {
        let text = render_dump(UNIX_EPOCH, 0.0, 0.0, 0, (0, 0), Some((1024, 2048, 4096, 1024)), None);
        assert!(text.contains("no avatar"));
        assert!(text.contains("Process memory: 1.00 MB (virtual 2.00 MB)"));
    }
}
