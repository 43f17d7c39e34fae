// Mackeys Rule Engine
// One object owning everything the per-event predicates share:
// environment facts, settings, the keyboard classifier, the
// validation budget, and the gesture trackers.

use std::time::Instant;

use parking_lot::Mutex;

use crate::context::EventContext;
use crate::env_info::EnvironmentFacts;
use crate::gestures::{DoubleTapTracker, EnterLatch};
use crate::input::{Classification, KeyboardClassifier, KeyboardType};
use crate::matcher::{ConfigError, MatchNode, MatchSpec, ValidationGuard};
use crate::settings::Settings;

/// Process-wide evaluation state.
///
/// Constructed once at config load and passed by reference into every
/// predicate. The engine is single-threaded by design (the keymapping
/// engine dispatches one event at a time); the internal locks exist
/// so a multi-threaded event source still gets coherent gesture
/// timing and classification caching instead of silent corruption.
pub struct RuleEngine {
    facts: EnvironmentFacts,
    settings: Settings,
    classifier: KeyboardClassifier,
    guard: Mutex<ValidationGuard>,
    double_tap: Mutex<DoubleTapTracker>,
    enter_latch: Mutex<EnterLatch>,
}

impl RuleEngine {
    /// Build an engine from detected facts and loaded settings
    pub fn new(facts: EnvironmentFacts, settings: Settings) -> Self {
        let mut classifier = KeyboardClassifier::new();
        for (name, type_str) in settings.custom_devices() {
            match KeyboardType::from_str(type_str) {
                Some(kb_type) => classifier.add_custom_device(name, kb_type),
                None => log::warn!(
                    "ignoring custom device {:?}: unknown keyboard type {:?}",
                    name,
                    type_str
                ),
            }
        }
        classifier.set_override(settings.keyboard_override_type());

        let double_tap = DoubleTapTracker::with_timing(
            std::time::Duration::from_millis(settings.tap_interval_ms()),
            std::time::Duration::from_millis(settings.tap_repeat_floor_ms()),
        );

        Self {
            facts,
            settings,
            classifier,
            guard: Mutex::new(ValidationGuard::new()),
            double_tap: Mutex::new(double_tap),
            enter_latch: Mutex::new(EnterLatch::new()),
        }
    }

    /// The immutable environment fact sheet
    pub fn facts(&self) -> &EnvironmentFacts {
        &self.facts
    }

    /// The loaded user settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Classify a device name (memoized, override-aware)
    pub fn classify(&self, device_name: &str) -> Classification {
        self.classifier.classify(device_name)
    }

    /// The classified keyboard type of a device
    pub fn keyboard_type(&self, device_name: &str) -> KeyboardType {
        self.classify(device_name).kb_type
    }

    /// Whether a device's keyboard type matches a condition string
    /// like "Apple" or "IBM, Chromebook"
    pub fn keyboard_matches(&self, device_name: &str, condition: &str) -> bool {
        self.keyboard_type(device_name).matches(condition)
    }

    /// Change the keyboard override at runtime
    pub fn set_keyboard_override(&self, kb_type: Option<KeyboardType>) {
        self.classifier.set_override(kb_type);
    }

    /// Direct access to the classifier (cache inspection, diagnostics)
    pub fn classifier(&self) -> &KeyboardClassifier {
        &self.classifier
    }

    /// Compile a match spec, honoring the validation budget
    pub fn compile(&self, spec: &MatchSpec) -> Result<MatchNode, ConfigError> {
        self.compile_at(spec, Instant::now())
    }

    /// Budget-aware compile with an injected clock (for tests)
    pub fn compile_at(&self, spec: &MatchSpec, now: Instant) -> Result<MatchNode, ConfigError> {
        if self.guard.lock().check(now) {
            MatchNode::compile(spec)
        } else {
            MatchNode::compile_unchecked(spec)
        }
    }

    /// Whether the validation budget has been exhausted
    pub fn validation_tripped(&self) -> bool {
        self.guard.lock().tripped()
    }

    /// Evaluate a compiled predicate against an event context
    pub fn evaluate(&self, node: &MatchNode, ctx: &EventContext) -> bool {
        node.evaluate(ctx)
    }

    /// Register a tap of `combo` now; returns the combo when it
    /// completes a double tap
    pub fn double_tap(&self, combo: &str) -> Option<String> {
        self.double_tap_at(combo, Instant::now())
    }

    /// Double-tap registration with an injected clock (for tests)
    pub fn double_tap_at(&self, combo: &str, now: Instant) -> Option<String> {
        self.double_tap.lock().tap(combo, now)
    }

    /// Pick the Enter-vs-F2 branch and advance the latch
    pub fn enter_choose<T>(&self, if_f2: T, if_enter: T, keep_f2: bool, keep_enter: bool) -> T {
        self.enter_latch
            .lock()
            .choose(if_f2, if_enter, keep_f2, keep_enter)
    }

    /// Force the Enter latch to a known state
    pub fn enter_force(&self, enter_is_f2: bool) {
        self.enter_latch.lock().force(enter_is_f2);
    }

    /// Whether the next Enter press resolves to the F2 branch
    pub fn enter_is_f2(&self) -> bool {
        self.enter_latch.lock().is_f2()
    }
}
