// Mackeys Settings Module
// Handles user-configurable settings that can toggle features on/off

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::input::KeyboardType;

/// Keyboard override value meaning "classify each device adaptively"
pub const OVERRIDE_AUTO_ADAPT: &str = "Auto-Adapt";

/// Settings for mackeys that control feature toggles
///
/// These settings are loaded from a TOML file (default:
/// ~/.config/mackeys/settings.toml) and consulted by rule predicates,
/// e.g. feature toggles gating whole rule families, or the keyboard
/// override forcing every device to one type.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Feature toggles (e.g. Caps2Cmd, Enter2RenameCmd)
    features: HashMap<String, bool>,

    /// Layout setting for Option-key special characters ("ABC" or "US")
    optspec_layout: String,

    /// Keyboard type override; "Auto-Adapt" disables it
    keyboard_override: String,

    /// User device-name -> keyboard-type entries (names lowercased)
    custom_devices: IndexMap<String, String>,

    /// Whether the local screen has input focus; toggled at runtime by
    /// the KVM-switch watcher, not read from the settings file
    screen_has_focus: bool,

    /// Double-tap window in milliseconds
    tap_interval_ms: u64,

    /// Double-tap key-repeat suppression floor in milliseconds
    tap_repeat_floor_ms: u64,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    features: Option<HashMap<String, toml::Value>>,

    #[serde(default)]
    layout: Option<LayoutSettings>,

    #[serde(default)]
    keyboard: Option<KeyboardSettings>,

    #[serde(default)]
    gestures: Option<GestureSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct LayoutSettings {
    #[serde(default)]
    optspec_layout: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct KeyboardSettings {
    #[serde(default)]
    override_type: Option<String>,

    #[serde(default)]
    devices: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct GestureSettings {
    #[serde(default)]
    tap_interval_ms: Option<u64>,

    #[serde(default)]
    tap_repeat_floor_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create a new settings object with defaults
    pub fn new() -> Self {
        Self {
            features: HashMap::new(),
            optspec_layout: "ABC".to_string(),
            keyboard_override: OVERRIDE_AUTO_ADAPT.to_string(),
            custom_devices: IndexMap::new(),
            screen_has_focus: true,
            tap_interval_ms: 240,
            tap_repeat_floor_ms: 70,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(features) = toml_settings.features {
            for (key, value) in features {
                let bool_value = parse_bool_value(&value)?;
                settings.features.insert(key, bool_value);
            }
        }

        if let Some(layout) = toml_settings.layout {
            if let Some(optspec) = layout.optspec_layout {
                settings.optspec_layout = optspec;
            }
        }

        if let Some(keyboard) = toml_settings.keyboard {
            if let Some(override_type) = keyboard.override_type {
                settings.keyboard_override = override_type;
            }
            if let Some(devices) = keyboard.devices {
                for (name, kb_type) in devices {
                    settings
                        .custom_devices
                        .insert(name.to_lowercase(), kb_type);
                }
            }
        }

        if let Some(gestures) = toml_settings.gestures {
            if let Some(interval) = gestures.tap_interval_ms {
                settings.tap_interval_ms = interval;
            }
            if let Some(floor) = gestures.tap_repeat_floor_ms {
                settings.tap_repeat_floor_ms = floor;
            }
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mackeys").join("settings.toml"))
    }

    /// Load from default location (~/.config/mackeys/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// Reload from the file this settings object came from
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(path) = self.source_path.clone() {
            *self = Self::from_file(path)?;
        }
        Ok(())
    }

    /// Get a boolean feature value
    pub fn get_bool(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    /// Set a boolean feature value
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.features.insert(name.to_string(), value);
    }

    /// Get the optspec layout
    pub fn optspec_layout(&self) -> &str {
        &self.optspec_layout
    }

    /// Raw keyboard override value as configured
    pub fn keyboard_override(&self) -> &str {
        &self.keyboard_override
    }

    /// The override as a keyboard type, None in Auto-Adapt mode.
    /// An unparseable value is treated as Auto-Adapt with a warning.
    pub fn keyboard_override_type(&self) -> Option<KeyboardType> {
        if self.keyboard_override.eq_ignore_ascii_case(OVERRIDE_AUTO_ADAPT) {
            return None;
        }
        match KeyboardType::from_str(&self.keyboard_override) {
            Some(kb_type) => Some(kb_type),
            None => {
                log::warn!(
                    "unrecognized keyboard override {:?}; falling back to Auto-Adapt",
                    self.keyboard_override
                );
                None
            }
        }
    }

    /// User custom device table entries (lowercased name, type string)
    pub fn custom_devices(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom_devices
            .iter()
            .map(|(name, kb_type)| (name.as_str(), kb_type.as_str()))
    }

    /// Whether the local screen has input focus
    pub fn screen_has_focus(&self) -> bool {
        self.screen_has_focus
    }

    /// Update the focus flag (fed by the KVM-switch watcher)
    pub fn set_screen_has_focus(&mut self, has_focus: bool) {
        self.screen_has_focus = has_focus;
    }

    /// Double-tap window in milliseconds
    pub fn tap_interval_ms(&self) -> u64 {
        self.tap_interval_ms
    }

    /// Double-tap repeat-suppression floor in milliseconds
    pub fn tap_repeat_floor_ms(&self) -> u64 {
        self.tap_repeat_floor_ms
    }

    /// Path this settings object was loaded from
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

/// Parse a TOML value as a boolean, accepting bools, 0/1 integers,
/// and "true"/"false" strings
fn parse_bool_value(value: &toml::Value) -> Result<bool, SettingsError> {
    match value {
        toml::Value::Boolean(b) => Ok(*b),
        toml::Value::Integer(0) => Ok(false),
        toml::Value::Integer(1) => Ok(true),
        toml::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(SettingsError::InvalidValue(s.clone())),
        },
        other => Err(SettingsError::InvalidValue(other.to_string())),
    }
}
