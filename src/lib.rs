//! Neon Slash - a swipe-to-slash reflex arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, hits, game phase)
//! - `config`: Immutable game tuning, loadable from JSON
//! - `platform`: Pointer normalization and host frame scheduling
//! - `render`: Read-only projection of the simulation for drawing

pub mod config;
pub mod platform;
pub mod render;
pub mod sim;

pub use config::{BreachDamage, ConfigError, DeadEnemyGrace, GameConfig};
pub use render::RenderFrame;
pub use sim::{GamePhase, PointerSample, Simulation};

/// Viewport and loop constants
pub mod consts {
    /// Extent of both viewport axes; all positions are percentages
    pub const VIEWPORT_EXTENT: f32 = 100.0;

    /// Longest host frame gap fed to the fixed-step clock (seconds)
    pub const MAX_FRAME_DT: f64 = 0.1;
    /// Maximum substeps per callback to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Clamp a value into the viewport's percentage range
#[inline]
pub fn clamp_percent(v: f32) -> f32 {
    v.clamp(0.0, consts::VIEWPORT_EXTENT)
}
