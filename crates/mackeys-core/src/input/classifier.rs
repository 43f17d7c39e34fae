// Mackeys Input Layer - Keyboard Type Classifier
// Priority cascade: override -> cache -> custom table -> pattern
// tables -> substring check -> elimination default

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::keyboard_type::{KeyboardPatterns, KeyboardType};

/// Result of classifying one device name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kb_type: KeyboardType,
    /// Which cascade step decided, for diagnostics
    pub reason: String,
}

impl Classification {
    fn new(kb_type: KeyboardType, reason: impl Into<String>) -> Self {
        Self {
            kb_type,
            reason: reason.into(),
        }
    }
}

/// Vendor-indicating tokens consulted by the elimination step.
/// A device name carrying any of these cannot default to Windows.
const IBM_TOKENS: &[&str] = &["ibm", "thinkpad", "lenovo", "trackpoint"];
const CHROMEBOOK_TOKENS: &[&str] = &["chromebook", "chrome", "cros", "pixelbook"];
const APPLE_TOKENS: &[&str] = &["apple", "macbook", "magic"];

/// Memoizing keyboard-type classifier.
///
/// The cache is keyed by the lowercased device name and grows
/// monotonically for the life of the process; entries never expire.
/// It sits behind an `RwLock` so the classifier can be shared by
/// reference; an engine dispatching events from multiple threads gets
/// a correct cache for free, a single-threaded one pays an
/// uncontended lock.
pub struct KeyboardClassifier {
    patterns: KeyboardPatterns,
    override_type: RwLock<Option<KeyboardType>>,
    /// User-maintained exact device name -> type table (lowercased keys)
    custom_table: IndexMap<String, KeyboardType>,
    cache: RwLock<HashMap<String, Classification>>,
    cache_hits: AtomicU64,
}

impl Default for KeyboardClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardClassifier {
    /// Create a classifier with the built-in pattern tables
    pub fn new() -> Self {
        Self {
            patterns: KeyboardPatterns::new(),
            override_type: RwLock::new(None),
            custom_table: IndexMap::new(),
            cache: RwLock::new(HashMap::new()),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Create a classifier with custom pattern tables
    pub fn with_patterns(patterns: KeyboardPatterns) -> Self {
        Self {
            patterns,
            ..Self::new()
        }
    }

    /// Force every classification to a fixed type.
    ///
    /// The override disables per-device adaptation entirely; it always
    /// wins and is never written to the cache, so clearing it later
    /// re-enables adaptive classification from scratch.
    pub fn set_override(&self, kb_type: Option<KeyboardType>) {
        *self.override_type.write() = kb_type;
    }

    /// Current override, if any
    pub fn override_type(&self) -> Option<KeyboardType> {
        *self.override_type.read()
    }

    /// Register an exact device name -> type entry.
    /// Lookups are case-insensitive.
    pub fn add_custom_device(&mut self, device_name: &str, kb_type: KeyboardType) {
        self.custom_table
            .insert(device_name.to_lowercase(), kb_type);
    }

    /// Number of cached device names
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Number of classifications served from the cache
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Whether a device name already has a cache entry
    pub fn is_cached(&self, device_name: &str) -> bool {
        self.cache.read().contains_key(&device_name.to_lowercase())
    }

    /// Classify a device name into a keyboard family.
    ///
    /// Never fails: a name that defeats every cascade step settles on
    /// `Unidentified`, which callers treat as "no type-specific rule
    /// applies".
    pub fn classify(&self, device_name: &str) -> Classification {
        if let Some(kb_type) = *self.override_type.read() {
            // Not cached: the override is a constant, and caching it
            // would leak stale results after the override is cleared.
            return Classification::new(kb_type, "user override");
        }

        let key = device_name.to_lowercase();

        if let Some(cached) = self.cache.read().get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            log::trace!(
                "keyboard type for {:?} from cache: {} ({})",
                device_name,
                cached.kb_type,
                cached.reason
            );
            return cached.clone();
        }

        let classification = self.run_cascade(device_name, &key);
        log::debug!(
            "classified {:?} as {} ({})",
            device_name,
            classification.kb_type,
            classification.reason
        );
        self.cache
            .write()
            .insert(key, classification.clone());
        classification
    }

    fn run_cascade(&self, device_name: &str, key: &str) -> Classification {
        if let Some(kb_type) = self.custom_table.get(key) {
            return Classification::new(*kb_type, "custom device table");
        }

        if let Some((kb_type, source)) = self.patterns.scan(device_name) {
            return Classification::new(kb_type, format!("pattern {:?}", source));
        }

        // Type names appearing verbatim inside the device name, in the
        // same fixed order as the pattern tables.
        for kb_type in [
            KeyboardType::IBM,
            KeyboardType::Chromebook,
            KeyboardType::Windows,
            KeyboardType::Apple,
        ] {
            let token = kb_type.as_str().to_lowercase();
            if key.contains(&token) {
                return Classification::new(kb_type, format!("name contains {:?}", token));
            }
        }

        // Elimination: a keyboard that positively indicates no other
        // vendor is taken to be a standard Windows-layout board.
        let contrary = IBM_TOKENS
            .iter()
            .chain(CHROMEBOOK_TOKENS)
            .chain(APPLE_TOKENS)
            .find(|token| key.contains(*token));
        match contrary {
            None => Classification::new(KeyboardType::Windows, "elimination default"),
            Some(token) => {
                log::error!(
                    "cannot classify {:?}: carries vendor token {:?} but matches no table",
                    device_name,
                    token
                );
                Classification::new(KeyboardType::Unidentified, format!("vendor token {:?} without a matching table", token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_pattern() {
        let classifier = KeyboardClassifier::new();
        let result = classifier.classify("IBM Model M 1391401");
        assert_eq!(result.kb_type, KeyboardType::IBM);
        assert!(result.reason.contains("pattern"));
    }

    #[test]
    fn test_classify_is_deterministic_and_cached() {
        let classifier = KeyboardClassifier::new();
        let first = classifier.classify("Apple Magic Keyboard");
        assert_eq!(classifier.cache_hits(), 0);
        let second = classifier.classify("Apple Magic Keyboard");
        assert_eq!(first, second);
        assert_eq!(classifier.cache_hits(), 1);
        assert_eq!(classifier.cache_len(), 1);
    }

    #[test]
    fn test_cache_key_is_case_insensitive() {
        let classifier = KeyboardClassifier::new();
        classifier.classify("IBM Model M");
        assert!(classifier.is_cached("ibm model m"));
        classifier.classify("ibm MODEL m");
        assert_eq!(classifier.cache_hits(), 1);
        assert_eq!(classifier.cache_len(), 1);
    }

    #[test]
    fn test_custom_table_beats_patterns() {
        let mut classifier = KeyboardClassifier::new();
        classifier.add_custom_device("Apple Magic Keyboard", KeyboardType::Windows);
        let result = classifier.classify("apple magic keyboard");
        assert_eq!(result.kb_type, KeyboardType::Windows);
        assert_eq!(result.reason, "custom device table");
    }

    #[test]
    fn test_override_wins_and_is_not_cached() {
        let classifier = KeyboardClassifier::new();
        classifier.set_override(Some(KeyboardType::Chromebook));
        let result = classifier.classify("Apple Magic Keyboard");
        assert_eq!(result.kb_type, KeyboardType::Chromebook);
        assert_eq!(result.reason, "user override");
        assert_eq!(classifier.cache_len(), 0);

        // Clearing the override re-enables adaptive classification.
        classifier.set_override(None);
        let result = classifier.classify("Apple Magic Keyboard");
        assert_eq!(result.kb_type, KeyboardType::Apple);
        assert_eq!(classifier.cache_len(), 1);
    }

    #[test]
    fn test_substring_step_ibm_beats_windows() {
        // No pattern table matches, but both "ibm" and "windows"
        // appear in the name; IBM is checked first.
        let classifier = KeyboardClassifier::new();
        let result = classifier.classify("ibm windows hybrid board");
        assert_eq!(result.kb_type, KeyboardType::IBM);
        assert!(result.reason.contains("name contains"));
    }

    #[test]
    fn test_elimination_default_is_windows() {
        let classifier = KeyboardClassifier::new();
        let result = classifier.classify("Generic USB Device 04d9:0169");
        assert_eq!(result.kb_type, KeyboardType::Windows);
        assert_eq!(result.reason, "elimination default");
    }

    #[test]
    fn test_vendor_token_blocks_elimination() {
        // "trackpoint" indicates IBM but no table pattern matches, so
        // the device cannot default to Windows either.
        let classifier = KeyboardClassifier::new();
        let result = classifier.classify("USB trackpoint adapter");
        assert_eq!(result.kb_type, KeyboardType::Unidentified);
    }

    #[test]
    fn test_unidentified_is_cached() {
        let classifier = KeyboardClassifier::new();
        classifier.classify("USB trackpoint adapter");
        assert_eq!(classifier.cache_len(), 1);
        classifier.classify("USB trackpoint adapter");
        assert_eq!(classifier.cache_hits(), 1);
    }
}
