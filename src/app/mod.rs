pub mod atmosphere;
pub mod display;
pub mod setup;

pub use atmosphere::{meadow_sky, sync_atmosphere_settings, sync_sky_visibility};
pub use display::sync_vsync_settings;
pub use setup::setup;
