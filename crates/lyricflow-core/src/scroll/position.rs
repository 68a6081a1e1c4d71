//! Atomic Layer: position classes relative to the scroll target

use serde::{Serialize, Serializer};

/// Styling hook describing where a line sits relative to the scroll target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionClass {
    Before(u8),
    Current,
    After(u8),
}

impl PositionClass {
    /// Class for a line `distance` entries away from the target (negative = above).
    ///
    /// Returns `None` outside the `±window` band.
    pub fn from_distance(distance: isize, window: usize) -> Option<Self> {
        let magnitude = distance.unsigned_abs();
        if magnitude > window {
            return None;
        }
        let step = magnitude.min(u8::MAX as usize) as u8;
        Some(match distance {
            0 => Self::Current,
            d if d < 0 => Self::Before(step),
            _ => Self::After(step),
        })
    }

    pub fn distance(&self) -> isize {
        match self {
            Self::Before(n) => -(*n as isize),
            Self::Current => 0,
            Self::After(n) => *n as isize,
        }
    }

    pub fn css_class(&self) -> String {
        match self {
            Self::Before(n) => format!("before-{n}"),
            Self::Current => "current".to_string(),
            Self::After(n) => format!("after-{n}"),
        }
    }
}

impl Serialize for PositionClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css_class())
    }
}
