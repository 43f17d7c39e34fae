// Mackeys Input Layer - Keyboard Type Variants
// Detects keyboard variants: IBM, Chromebook, Windows, Apple

use regex::Regex;

/// Keyboard type variants supported by mackeys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardType {
    /// IBM-style keyboards (ThinkPad, Model M, etc.)
    IBM,
    /// Chromebook keyboards
    /// Features: Search key instead of Caps Lock, different function row
    Chromebook,
    /// Standard Windows/PC keyboards
    Windows,
    /// Apple/Mac keyboards
    /// Features: Command/Option keys, media keys
    Apple,
    /// Device could not be matched to any vendor family.
    /// Valid terminal state: rules requiring a specific type simply
    /// do not apply to such a device.
    Unidentified,
}

impl KeyboardType {
    /// Convert string to KeyboardType
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ibm" => Some(KeyboardType::IBM),
            "chromebook" | "chrome" => Some(KeyboardType::Chromebook),
            "windows" | "win" | "pc" => Some(KeyboardType::Windows),
            "apple" | "mac" | "macintosh" => Some(KeyboardType::Apple),
            "unidentified" => Some(KeyboardType::Unidentified),
            _ => None,
        }
    }

    /// Convert KeyboardType to string
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyboardType::IBM => "IBM",
            KeyboardType::Chromebook => "Chromebook",
            KeyboardType::Windows => "Windows",
            KeyboardType::Apple => "Apple",
            KeyboardType::Unidentified => "Unidentified",
        }
    }

    /// Check if this keyboard type matches a condition string
    /// Supports single types or comma-separated lists
    pub fn matches(&self, condition: &str) -> bool {
        condition
            .split(',')
            .map(|s| s.trim())
            .filter_map(KeyboardType::from_str)
            .any(|t| t == *self)
    }
}

impl std::fmt::Display for KeyboardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A device-name pattern for one keyboard family.
///
/// The source text keeps its literal spaces; before compilation each
/// space is rewritten to `.*` so users can enter approximate product
/// names ("Magic Keyboard" matches "Apple Inc. Magic Keyboard 2").
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a pattern, returning None (with a warning) on invalid syntax
    pub fn compile(source: &str) -> Option<Self> {
        let rewritten = format!("(?i){}", source.replace(' ', ".*"));
        match Regex::new(&rewritten) {
            Ok(regex) => Some(Self {
                source: source.to_string(),
                regex,
            }),
            Err(err) => {
                log::warn!("ignoring invalid keyboard pattern {:?}: {}", source, err);
                None
            }
        }
    }

    /// The pattern as the user wrote it
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test a device name against this pattern
    pub fn is_match(&self, device_name: &str) -> bool {
        self.regex.is_match(device_name)
    }
}

/// Ordered pattern tables for keyboard family detection.
///
/// Scan order is fixed: IBM, Chromebook, Windows, Apple. First match
/// wins, so the more specific families come before the catch-all
/// Windows table.
pub struct KeyboardPatterns {
    tables: Vec<(KeyboardType, Vec<NamePattern>)>,
}

const IBM_PATTERNS: &[&str] = &[
    "IBM Enhanced",
    "IBM Model M",
    "IBM Rapid Access",
    "IBM Space Saver",
    "IBM TrackPoint",
    "Lenovo ThinkPad",
    "ThinkPad Compact",
];

const CHROMEBOOK_PATTERNS: &[&str] = &[
    "Google Keyboard",
    "Chromebook Keyboard",
    "cros ec",
    "Pixelbook",
    "Pixel Slate",
    "HP Dragonfly Pro Chromebook",
];

const WINDOWS_PATTERNS: &[&str] = &[
    "AT Translated Set 2 keyboard",
    "Microsoft Natural",
    "Microsoft Wired",
    "Logitech G",
    "Logitech K",
    "Logitech MX Keys",
    "Dell KB",
    "Cooler Master",
    "Razer",
    "Corsair",
    "SteelSeries",
    "Telink Wireless Gaming Keyboard",
    "Das Keyboard",
];

const APPLE_PATTERNS: &[&str] = &[
    "Apple Keyboard",
    "Apple Internal Keyboard",
    "Magic Keyboard",
    "MacBook Internal Keyboard",
    "Matias Ergo Pro",
    "Keychron K",
    "HID 05ac",
];

impl Default for KeyboardPatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardPatterns {
    /// Create pattern tables with the built-in defaults
    pub fn new() -> Self {
        Self {
            tables: vec![
                (KeyboardType::IBM, compile_all(IBM_PATTERNS)),
                (KeyboardType::Chromebook, compile_all(CHROMEBOOK_PATTERNS)),
                (KeyboardType::Windows, compile_all(WINDOWS_PATTERNS)),
                (KeyboardType::Apple, compile_all(APPLE_PATTERNS)),
            ],
        }
    }

    /// Append user-supplied patterns to a family's table
    pub fn add_patterns(&mut self, kb_type: KeyboardType, patterns: &[&str]) {
        if let Some((_, table)) = self.tables.iter_mut().find(|(t, _)| *t == kb_type) {
            table.extend(patterns.iter().filter_map(|p| NamePattern::compile(p)));
        }
    }

    /// Scan the tables in fixed order; first matching pattern wins.
    /// Returns the matched family and the source text of the pattern.
    pub fn scan(&self, device_name: &str) -> Option<(KeyboardType, &str)> {
        for (kb_type, table) in &self.tables {
            for pattern in table {
                if pattern.is_match(device_name) {
                    return Some((*kb_type, pattern.source()));
                }
            }
        }
        None
    }

    /// Whether any pattern in any table matches the device name
    pub fn any_match(&self, device_name: &str) -> bool {
        self.scan(device_name).is_some()
    }
}

fn compile_all(sources: &[&str]) -> Vec<NamePattern> {
    sources.iter().filter_map(|p| NamePattern::compile(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_type_from_str() {
        assert_eq!(KeyboardType::from_str("IBM"), Some(KeyboardType::IBM));
        assert_eq!(KeyboardType::from_str("ibm"), Some(KeyboardType::IBM));
        assert_eq!(
            KeyboardType::from_str("Chromebook"),
            Some(KeyboardType::Chromebook)
        );
        assert_eq!(KeyboardType::from_str("chrome"), Some(KeyboardType::Chromebook));
        assert_eq!(KeyboardType::from_str("Windows"), Some(KeyboardType::Windows));
        assert_eq!(KeyboardType::from_str("pc"), Some(KeyboardType::Windows));
        assert_eq!(KeyboardType::from_str("Apple"), Some(KeyboardType::Apple));
        assert_eq!(KeyboardType::from_str("mac"), Some(KeyboardType::Apple));
        assert_eq!(
            KeyboardType::from_str("unidentified"),
            Some(KeyboardType::Unidentified)
        );
        assert_eq!(KeyboardType::from_str("invalid"), None);
    }

    #[test]
    fn test_keyboard_type_matches_list() {
        assert!(KeyboardType::IBM.matches("IBM, Chromebook, Windows"));
        assert!(KeyboardType::Chromebook.matches("IBM, Chromebook, Windows"));
        assert!(!KeyboardType::Apple.matches("IBM, Chromebook, Windows"));
    }

    #[test]
    fn test_keyboard_type_display() {
        assert_eq!(format!("{}", KeyboardType::IBM), "IBM");
        assert_eq!(format!("{}", KeyboardType::Unidentified), "Unidentified");
    }

    #[test]
    fn test_space_rewrite_matches_interleaved_words() {
        let pattern = NamePattern::compile("Magic Keyboard").unwrap();
        assert!(pattern.is_match("Apple Inc. Magic Wireless Keyboard 2"));
        assert!(pattern.is_match("magic keyboard"));
        assert!(!pattern.is_match("Keyboard Magic")); // order matters
    }

    #[test]
    fn test_invalid_pattern_is_dropped() {
        assert!(NamePattern::compile("broken(paren").is_none());
    }

    #[test]
    fn test_scan_order_ibm_before_windows() {
        // A name matching both IBM and Windows tables resolves IBM
        // because the IBM table is scanned first.
        let mut patterns = KeyboardPatterns::new();
        patterns.add_patterns(KeyboardType::Windows, &["ThinkPad"]);
        let (kb_type, _) = patterns.scan("Lenovo ThinkPad Keyboard").unwrap();
        assert_eq!(kb_type, KeyboardType::IBM);
    }

    #[test]
    fn test_scan_reports_pattern_source() {
        let patterns = KeyboardPatterns::new();
        let (kb_type, source) = patterns.scan("IBM Model M 1391401").unwrap();
        assert_eq!(kb_type, KeyboardType::IBM);
        assert_eq!(source, "IBM Model M");
    }

    #[test]
    fn test_scan_no_match() {
        let patterns = KeyboardPatterns::new();
        assert!(patterns.scan("Completely Mysterious Device").is_none());
    }

    #[test]
    fn test_add_custom_patterns() {
        let mut patterns = KeyboardPatterns::new();
        patterns.add_patterns(KeyboardType::Apple, &["MyCustomBoard"]);
        let (kb_type, _) = patterns.scan("MyCustomBoard v2").unwrap();
        assert_eq!(kb_type, KeyboardType::Apple);
    }
}
