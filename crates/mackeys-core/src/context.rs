// Mackeys Event Context
// Per-event snapshot of window and input state

/// Snapshot of the window/input context for a single key event.
///
/// Built by the surrounding keymapping engine once per physical key
/// press/release and passed read-only into every predicate. LED fields
/// are `Option<bool>` so that "state unknown" stays distinguishable
/// from "LED off".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventContext {
    /// Window class / app_id of the focused window
    pub wm_class: Option<String>,
    /// Window title of the focused window
    pub wm_name: Option<String>,
    /// Name of the input device that produced the event
    pub device_name: String,
    /// Num Lock LED state, if known
    pub numlock_on: Option<bool>,
    /// Caps Lock LED state, if known
    pub capslock_on: Option<bool>,
    /// Whether the local screen currently has input focus.
    /// KVM-switch software (Synergy, Input Leap, Deskflow) can route
    /// this keyboard to another machine; predicates must refuse to
    /// act while that is the case.
    pub screen_has_focus: bool,
}

impl EventContext {
    /// Create a context for a device with focus and no window info
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            wm_class: None,
            wm_name: None,
            device_name: device_name.into(),
            numlock_on: None,
            capslock_on: None,
            screen_has_focus: true,
        }
    }

    /// Set the window class
    pub fn with_class(mut self, wm_class: impl Into<String>) -> Self {
        self.wm_class = Some(wm_class.into());
        self
    }

    /// Set the window title
    pub fn with_title(mut self, wm_name: impl Into<String>) -> Self {
        self.wm_name = Some(wm_name.into());
        self
    }

    /// Set the Num Lock LED state
    pub fn with_numlock(mut self, on: bool) -> Self {
        self.numlock_on = Some(on);
        self
    }

    /// Set the Caps Lock LED state
    pub fn with_capslock(mut self, on: bool) -> Self {
        self.capslock_on = Some(on);
        self
    }

    /// Mark the local screen as not having input focus
    pub fn without_focus(mut self) -> Self {
        self.screen_has_focus = false;
        self
    }
}
