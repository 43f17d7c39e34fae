//! Temporal gesture trackers
//!
//! Small state machines fed by the per-event rule callbacks: double-tap
//! detection and the multipurpose Enter/F2 latch.

mod double_tap;
mod enter_latch;

pub use double_tap::{DoubleTapTracker, DEFAULT_REPEAT_FLOOR, DEFAULT_TAP_INTERVAL};
pub use enter_latch::EnterLatch;
