// Mackeys Matcher - Validation Budget Guard

use std::time::{Duration, Instant};

/// One-way budget for rule-spec validation.
///
/// Rule specs are static once a config is loaded, so revalidating the
/// same specs on every predicate construction forever is wasted work
/// on the keystroke path. After a fixed number of checks or a fixed
/// wall-clock window since construction, validation is permanently
/// skipped for the rest of the process. Evaluation itself is never
/// affected, only the author-time checks.
#[derive(Debug)]
pub struct ValidationGuard {
    started: Instant,
    window: Duration,
    threshold: u32,
    counter: u32,
    tripped: bool,
}

pub const DEFAULT_THRESHOLD: u32 = 1000;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(6);

impl ValidationGuard {
    /// Create a guard with the default budget (1000 checks / 6 s)
    pub fn new() -> Self {
        Self::new_at(Instant::now())
    }

    /// Create a guard whose clock starts at `now` (for tests)
    pub fn new_at(now: Instant) -> Self {
        Self {
            started: now,
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
            counter: 0,
            tripped: false,
        }
    }

    /// Create a guard with custom limits
    pub fn with_limits(threshold: u32, window: Duration) -> Self {
        Self {
            threshold,
            window,
            ..Self::new()
        }
    }

    /// Whether validation should still run, advancing the budget.
    ///
    /// The transition to the tripped state is one-way; once either
    /// limit is exceeded every future call returns false.
    pub fn check(&mut self, now: Instant) -> bool {
        if self.tripped {
            return false;
        }
        if self.counter >= self.threshold || now.duration_since(self.started) > self.window {
            self.tripped = true;
            log::debug!(
                "validation budget exhausted after {} checks; skipping spec validation from here on",
                self.counter
            );
            return false;
        }
        self.counter += 1;
        true
    }

    /// Whether the guard has tripped
    pub fn tripped(&self) -> bool {
        self.tripped
    }
}

impl Default for ValidationGuard {
    fn default() -> Self {
        Self::new()
    }
}
