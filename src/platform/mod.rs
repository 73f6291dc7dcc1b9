//! Platform abstraction layer
//!
//! Handles the host-facing seams of the core:
//! - Input events (mouse/touch to normalized pointer state)
//! - Frame scheduling (request/cancel, fixed-rate clock)

pub mod frame;
pub mod input;

pub use frame::{FrameClock, FrameLoop, FrameScheduler};
pub use input::{ContainerRect, PointerTracker, RawPointer};
