//! Viewport follow logic for the lyrics column
//!
//! # Architecture
//!
//! ## Atomic Layer
//! - `position` - Position classes assigned around the scroll target
//!
//! ## Molecular Layer
//! - `coordinator` - Offset computation, staggered delays and user override
//!
//! The coordinator never animates anything itself; it writes target offsets
//! and per-line transition delays to a [`RenderSurface`](crate::surface::RenderSurface)
//! which owns the actual motion.

pub mod coordinator;
pub mod position;

pub use coordinator::{ScrollCoordinator, ScrollSync, TimerEvents};
pub use position::PositionClass;
