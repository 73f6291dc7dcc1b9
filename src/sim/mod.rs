//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, no wall-clock reads
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids are monotonic)
//! - No rendering or platform dependencies

pub mod collision;
pub mod phase;
pub mod state;
pub mod tick;

pub use collision::{below_boundary, pointer_hits};
pub use phase::GamePhase;
pub use state::{
    ColorKey, Enemy, EnemyKind, EntityStore, FloatingText, FrameSnapshot, GameEvent, Particle,
    Simulation, TrailPoint,
};
pub use tick::{PointerSample, StepReport};
