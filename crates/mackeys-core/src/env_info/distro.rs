// Mackeys Environment - Distro Identification

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use super::probe::HostProbe;

/// Sentinel for a release file that exists but lacks the wanted key
pub const SENTINEL_KEY_MISSING: &str = "keymissing";
/// Sentinel for a host with no recognizable release file at all
pub const SENTINEL_NOT_FOUND: &str = "notfound";
/// Rolling-release distros have no meaningful version number
pub const SENTINEL_ROLLING: &str = "arch_btw";

/// Identity of the host distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroFacts {
    pub id: String,
    pub version: String,
    pub variant: String,
}

/// Raw-name to canonical-id mappings, checked in order.
/// Patterns are matched case-insensitively against the raw ID/NAME.
const DISTRO_ALIASES: &[(&str, &str)] = &[
    (r"^arch(\s|-)?(linux)?$", "arch"),
    (r"arco\s?linux", "arcolinux"),
    (r"endeavouros", "endeavouros"),
    (r"manjaro", "manjaro"),
    (r"opensuse.*tumbleweed", "opensuse-tumbleweed"),
    (r"opensuse.*leap", "opensuse-leap"),
    (r"pop!?_?os|^pop$", "pop"),
    (r"zorin", "zorin"),
    (r"elementary", "elementary"),
    (r"linux\s?mint", "linuxmint"),
    (r"^ubuntu", "ubuntu"),
    (r"fedora", "fedora"),
    (r"^debian", "debian"),
    (r"centos", "centos"),
    (r"red\s?hat|^rhel", "rhel"),
    (r"almalinux", "almalinux"),
    (r"rocky", "rocky"),
    (r"nixos", "nixos"),
    (r"void", "void"),
    (r"gentoo", "gentoo"),
];

/// Distros with no versioned releases
const ROLLING_DISTROS: &[&str] = &[
    "arch",
    "arcolinux",
    "endeavouros",
    "manjaro",
    "opensuse-tumbleweed",
];

/// Parse a KEY=value release file (os-release, lsb-release) into a map.
/// Values keep their content with surrounding quotes stripped.
pub fn parse_release_file(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Normalize a raw distro ID/NAME to a canonical lowercase id
pub fn normalize_distro_id(raw: &str) -> String {
    for (pattern, canonical) in DISTRO_ALIASES {
        let rx = Regex::new(&format!("(?i){}", pattern));
        if let Ok(rx) = rx {
            if rx.is_match(raw.trim()) {
                return (*canonical).to_string();
            }
        }
    }
    raw.trim().to_lowercase().replace(' ', "-")
}

/// Whether a canonical distro id names a rolling release
pub fn is_rolling(id: &str) -> bool {
    ROLLING_DISTROS.contains(&id)
}

/// Resolve the distro identity from the standard release files.
///
/// Resolution order: /etc/os-release, /etc/lsb-release, the bare
/// presence of /etc/arch-release. Every miss degrades to a sentinel
/// string; this never fails.
pub fn detect_distro(probe: &dyn HostProbe) -> DistroFacts {
    let mut facts = if let Some(content) = probe.read_file(Path::new("/etc/os-release")) {
        let kv = parse_release_file(&content);
        let raw_id = kv
            .get("ID")
            .or_else(|| kv.get("NAME"))
            .or_else(|| kv.get("PRETTY_NAME"));
        DistroFacts {
            id: raw_id
                .map(|raw| normalize_distro_id(raw))
                .unwrap_or_else(|| SENTINEL_KEY_MISSING.to_string()),
            version: kv
                .get("VERSION_ID")
                .cloned()
                .unwrap_or_else(|| SENTINEL_KEY_MISSING.to_string()),
            variant: kv
                .get("VARIANT_ID")
                .cloned()
                .unwrap_or_else(|| SENTINEL_KEY_MISSING.to_string()),
        }
    } else if let Some(content) = probe.read_file(Path::new("/etc/lsb-release")) {
        let kv = parse_release_file(&content);
        DistroFacts {
            id: kv
                .get("DISTRIB_ID")
                .map(|raw| normalize_distro_id(raw))
                .unwrap_or_else(|| SENTINEL_KEY_MISSING.to_string()),
            version: kv
                .get("DISTRIB_RELEASE")
                .cloned()
                .unwrap_or_else(|| SENTINEL_KEY_MISSING.to_string()),
            variant: SENTINEL_KEY_MISSING.to_string(),
        }
    } else if probe.path_exists(Path::new("/etc/arch-release")) {
        DistroFacts {
            id: "arch".to_string(),
            version: SENTINEL_KEY_MISSING.to_string(),
            variant: SENTINEL_KEY_MISSING.to_string(),
        }
    } else {
        DistroFacts {
            id: SENTINEL_NOT_FOUND.to_string(),
            version: SENTINEL_NOT_FOUND.to_string(),
            variant: SENTINEL_NOT_FOUND.to_string(),
        }
    };

    if is_rolling(&facts.id) {
        facts.version = SENTINEL_ROLLING.to_string();
    }
    log::debug!(
        "distro: id={} version={} variant={}",
        facts.id,
        facts.version,
        facts.variant
    );
    facts
}

#[cfg(test)]
mod tests {
    use super::super::probe::testing::FakeProbe;
    use super::*;

    const FEDORA_OS_RELEASE: &str = r#"
NAME="Fedora Linux"
VERSION="40 (Workstation Edition)"
ID=fedora
VERSION_ID=40
VARIANT_ID=workstation
"#;

    #[test]
    fn test_parse_release_file_strips_quotes() {
        let kv = parse_release_file(FEDORA_OS_RELEASE);
        assert_eq!(kv.get("NAME").unwrap(), "Fedora Linux");
        assert_eq!(kv.get("ID").unwrap(), "fedora");
        assert_eq!(kv.get("VERSION_ID").unwrap(), "40");
    }

    #[test]
    fn test_os_release_resolution() {
        let mut probe = FakeProbe::new();
        probe.set_file("/etc/os-release", FEDORA_OS_RELEASE);
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, "fedora");
        assert_eq!(facts.version, "40");
        assert_eq!(facts.variant, "workstation");
    }

    #[test]
    fn test_name_fallback_when_id_missing() {
        let mut probe = FakeProbe::new();
        probe.set_file("/etc/os-release", "NAME=\"Pop!_OS\"\nVERSION_ID=\"22.04\"\n");
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, "pop");
        assert_eq!(facts.version, "22.04");
        assert_eq!(facts.variant, SENTINEL_KEY_MISSING);
    }

    #[test]
    fn test_lsb_release_fallback() {
        let mut probe = FakeProbe::new();
        probe.set_file(
            "/etc/lsb-release",
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=24.04\n",
        );
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, "ubuntu");
        assert_eq!(facts.version, "24.04");
    }

    #[test]
    fn test_arch_release_marker_fallback() {
        let mut probe = FakeProbe::new();
        probe.paths.insert("/etc/arch-release".into());
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, "arch");
        assert_eq!(facts.version, SENTINEL_ROLLING);
    }

    #[test]
    fn test_rolling_release_version_sentinel() {
        let mut probe = FakeProbe::new();
        probe.set_file(
            "/etc/os-release",
            "ID=manjaro\nNAME=\"Manjaro Linux\"\n",
        );
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, "manjaro");
        assert_eq!(facts.version, SENTINEL_ROLLING);
    }

    #[test]
    fn test_nothing_found_sentinels() {
        let probe = FakeProbe::new();
        let facts = detect_distro(&probe);
        assert_eq!(facts.id, SENTINEL_NOT_FOUND);
        assert_eq!(facts.version, SENTINEL_NOT_FOUND);
        assert_eq!(facts.variant, SENTINEL_NOT_FOUND);
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_distro_id("Arch Linux"), "arch");
        assert_eq!(normalize_distro_id("openSUSE Tumbleweed"), "opensuse-tumbleweed");
        assert_eq!(normalize_distro_id("Pop!_OS"), "pop");
        assert_eq!(normalize_distro_id("Linux Mint"), "linuxmint");
        assert_eq!(normalize_distro_id("Red Hat Enterprise Linux"), "rhel");
    }

    #[test]
    fn test_normalize_unknown_casefolds() {
        assert_eq!(normalize_distro_id("Some Future OS"), "some-future-os");
    }
}
