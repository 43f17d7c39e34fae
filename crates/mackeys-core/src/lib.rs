// Mackeys Core Library
// Window-context predicates, keyboard classification, and the
// temporal state machines behind mac-style remapping rules

pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod env_info;
pub mod gestures;
pub mod input;
pub mod matcher;
pub mod settings;

pub use context::EventContext;
pub use engine::RuleEngine;
pub use env_info::{
    detect, detect_system, DesktopEnvironment, EnvironmentFacts, HostProbe, SessionType,
    SystemProbe,
};
pub use gestures::{DoubleTapTracker, EnterLatch};
pub use input::{Classification, KeyboardClassifier, KeyboardPatterns, KeyboardType};
pub use matcher::{ConfigError, MatchNode, MatchSpec, ValidationGuard};
pub use settings::{Settings, SettingsError};
