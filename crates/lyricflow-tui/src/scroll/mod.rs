//! Smooth, staggered scrolling for the lyrics column
//!
//! # Architecture
//!
//! ## Atomic Layer
//! - `easing` - Easing curves
//! - `timing` - Progress and interpolation helpers
//! - `config` - Duration accessors for the core scroll configuration
//!
//! ## Molecular Layer
//! - `animation` - Per-line staggered animator
//!
//! # Usage
//!
//! ```ignore
//! use lyricflow_tui::scroll::StaggeredAnimator;
//!
//! let mut animator = StaggeredAnimator::new(config.scroll.clone());
//! animator.set_delay(line, 30);
//! animator.scroll_to(-42.0, false, Instant::now(), &lines);
//!
//! // Every frame
//! let row_offset = animator.offset_at(line, Instant::now());
//! animator.update(Instant::now());
//! ```

// Atomic Layer
pub mod config;
pub mod easing;
pub mod timing;

// Molecular Layer
pub mod animation;

pub use animation::StaggeredAnimator;
pub use config::{ScrollConfig, ScrollConfigExt};
pub use easing::{EasingType, EasingTypeExt};
