//! Input device classification
//!
//! Maps evdev-style device names onto keyboard families so that
//! family-specific modmaps (Apple media row, Chromebook Search key)
//! can be gated per device.

mod classifier;
mod keyboard_type;

pub use classifier::{Classification, KeyboardClassifier};
pub use keyboard_type::{KeyboardPatterns, KeyboardType, NamePattern};
