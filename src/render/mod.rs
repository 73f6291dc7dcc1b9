//! Render projection
//!
//! Turns the published snapshot into plain draw data. No game logic here.

pub mod projection;

pub use projection::{EnemySprite, Overlay, ParticleSprite, RenderFrame, TextSprite};
