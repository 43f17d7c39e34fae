// Mackeys Environment - Desktop Environment Detection

use std::path::PathBuf;

use regex::Regex;

use super::probe::{is_process_running, HostProbe};

/// Sentinel version for desktops without version-detection logic
pub const SENTINEL_NO_VERSION_LOGIC: &str = "no_logic_for_DE";
/// Sentinel version when logic exists but resolution fails
pub const SENTINEL_VERSION_NOT_FOUND: &str = "notfound";

/// Canonical desktop environments and standalone compositors
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DesktopEnvironment {
    Gnome,
    Kde,
    Xfce,
    Cinnamon,
    Mate,
    Budgie,
    Lxqt,
    Lxde,
    Unity,
    Pantheon,
    Deepin,
    Enlightenment,
    Trinity,
    Cosmic,
    Sway,
    Hyprland,
    I3,
    Bspwm,
    Qtile,
    Niri,
    #[strum(serialize = "miracle-wm")]
    MiracleWm,
    Unidentified,
}

/// Raw desktop-name to canonical mappings, checked in order.
/// Earlier entries are the more specific ones; distro-branded session
/// names (ubuntu, pop, zorin) resolve to the shell they actually run.
const DE_ALIASES: &[(&str, DesktopEnvironment)] = &[
    (r"unity", DesktopEnvironment::Unity),
    (r"^ubuntu", DesktopEnvironment::Gnome),
    (r"^pop", DesktopEnvironment::Gnome),
    (r"^zorin", DesktopEnvironment::Gnome),
    (r"gnome", DesktopEnvironment::Gnome),
    (r"kde|plasma", DesktopEnvironment::Kde),
    (r"xfce", DesktopEnvironment::Xfce),
    (r"cinnamon|muffin", DesktopEnvironment::Cinnamon),
    (r"mate", DesktopEnvironment::Mate),
    (r"budgie", DesktopEnvironment::Budgie),
    (r"lxqt", DesktopEnvironment::Lxqt),
    (r"lxde", DesktopEnvironment::Lxde),
    (r"pantheon", DesktopEnvironment::Pantheon),
    (r"deepin|dde", DesktopEnvironment::Deepin),
    (r"enlightenment", DesktopEnvironment::Enlightenment),
    (r"trinity|^tde", DesktopEnvironment::Trinity),
    (r"cosmic", DesktopEnvironment::Cosmic),
    (r"sway", DesktopEnvironment::Sway),
    (r"hypr", DesktopEnvironment::Hyprland),
    (r"^i3", DesktopEnvironment::I3),
    (r"bspwm", DesktopEnvironment::Bspwm),
    (r"qtile", DesktopEnvironment::Qtile),
    (r"niri", DesktopEnvironment::Niri),
    (r"miracle", DesktopEnvironment::MiracleWm),
];

/// Compositor/shell binaries probed as a cross-check on the
/// environment-variable-derived guess
const COMPOSITOR_PROCS: &[(&str, DesktopEnvironment)] = &[
    ("kwin_wayland", DesktopEnvironment::Kde),
    ("kwin_x11", DesktopEnvironment::Kde),
    ("gnome-shell", DesktopEnvironment::Gnome),
    ("cosmic-comp", DesktopEnvironment::Cosmic),
    ("sway", DesktopEnvironment::Sway),
    ("hyprland", DesktopEnvironment::Hyprland),
    ("miracle-wm", DesktopEnvironment::MiracleWm),
];

/// Normalize a raw desktop name to a canonical environment
pub fn normalize_desktop(raw: &str) -> DesktopEnvironment {
    for (pattern, de) in DE_ALIASES {
        if let Ok(rx) = Regex::new(&format!("(?i){}", pattern)) {
            if rx.is_match(raw.trim()) {
                return *de;
            }
        }
    }
    DesktopEnvironment::Unidentified
}

/// Resolve the desktop environment.
///
/// Env vars are consulted in order (`XDG_CURRENT_DESKTOP` taking its
/// first colon-separated token, then `XDG_SESSION_DESKTOP`, then
/// `DESKTOP_SESSION`), followed by a qtile cache-dir probe. A process
/// scan for known compositors cross-checks the guess: it fills in an
/// unidentified result, and overrides a disagreeing one with a logged
/// correction rather than a silent swap.
pub fn detect_desktop(probe: &dyn HostProbe, pgrep_supports_ci: bool) -> DesktopEnvironment {
    let raw = probe
        .env_var("XDG_CURRENT_DESKTOP")
        .map(|v| v.split(':').next().unwrap_or("").to_string())
        .or_else(|| probe.env_var("XDG_SESSION_DESKTOP"))
        .or_else(|| probe.env_var("DESKTOP_SESSION"))
        .or_else(|| qtile_cache_probe(probe));

    let from_env = match &raw {
        Some(name) => normalize_desktop(name),
        None => DesktopEnvironment::Unidentified,
    };
    log::debug!("desktop from env vars: {} (raw {:?})", from_env, raw);

    let from_procs = COMPOSITOR_PROCS
        .iter()
        .find(|(name, _)| is_process_running(probe, name, pgrep_supports_ci))
        .map(|(_, de)| *de);

    match (from_env, from_procs) {
        (DesktopEnvironment::Unidentified, Some(de)) => {
            log::debug!("desktop resolved by process probe: {}", de);
            de
        }
        (env_de, Some(proc_de)) if proc_de != env_de => {
            log::warn!(
                "session variables say {} but {} is running; correcting to {}",
                env_de,
                proc_de,
                proc_de
            );
            proc_de
        }
        (env_de, _) => env_de,
    }
}

/// Qtile leaves its IPC socket under the user cache dir; the presence
/// of that directory identifies a session the env vars often miss.
fn qtile_cache_probe(probe: &dyn HostProbe) -> Option<String> {
    let cache_dir = probe
        .env_var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| probe.home_dir().map(|home| home.join(".cache")))?;
    if probe.path_exists(&cache_dir.join("qtile")) {
        Some("qtile".to_string())
    } else {
        None
    }
}

/// Resolve the desktop environment's major version.
///
/// Only GNOME, KDE, and LXQt have version-dependent rule families;
/// every other desktop gets a sentinel.
pub fn detect_de_version(probe: &dyn HostProbe, de: DesktopEnvironment) -> String {
    let version = match de {
        DesktopEnvironment::Gnome => probe
            .command_output("gnome-shell", &["--version"])
            .and_then(|out| leading_integer(&out)),
        DesktopEnvironment::Kde => probe.env_var("KDE_SESSION_VERSION").or_else(|| {
            ["kpackagetool6", "kpackagetool5", "kpackagetool4"]
                .iter()
                .find(|tool| probe.binary_exists(tool))
                .map(|tool| tool.trim_start_matches("kpackagetool").to_string())
        }),
        DesktopEnvironment::Lxqt => probe
            .command_output("lxqt-session", &["--version"])
            .and_then(|out| leading_integer(&out)),
        _ => return SENTINEL_NO_VERSION_LOGIC.to_string(),
    };
    version.unwrap_or_else(|| SENTINEL_VERSION_NOT_FOUND.to_string())
}

fn leading_integer(text: &str) -> Option<String> {
    let rx = Regex::new(r"(\d+)").ok()?;
    rx.captures(text)
        .map(|caps| caps[1].to_string())
}
