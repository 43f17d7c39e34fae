// Mackeys Environment - Window Manager Resolution

use std::collections::HashSet;

use super::desktop::DesktopEnvironment;
use super::probe::{is_process_running, HostProbe};

/// Sentinel when no known window manager process can be found
pub const SENTINEL_WM_UNIDENTIFIED: &str = "WM_unidentified_by_logic";

/// Window manager candidates per desktop environment, most likely
/// first. LXQt and Xfce can run several third-party compositors, so
/// their lists are long.
const WM_CANDIDATES: &[(DesktopEnvironment, &[&str])] = &[
    (
        DesktopEnvironment::Kde,
        &["kwin_wayland", "kwin_x11", "kwin"],
    ),
    (DesktopEnvironment::Gnome, &["mutter", "gnome-shell"]),
    (
        DesktopEnvironment::Xfce,
        &["xfwm4", "labwc", "wayfire"],
    ),
    (DesktopEnvironment::Cinnamon, &["muffin"]),
    (DesktopEnvironment::Mate, &["marco"]),
    (DesktopEnvironment::Budgie, &["budgie-wm", "magpie-wm"]),
    (
        DesktopEnvironment::Lxqt,
        &[
            "openbox",
            "labwc",
            "sway",
            "hyprland",
            "wayfire",
            "kwin_wayland",
            "kwin_x11",
        ],
    ),
    (DesktopEnvironment::Lxde, &["openbox"]),
    (DesktopEnvironment::Unity, &["compiz"]),
    (DesktopEnvironment::Pantheon, &["gala"]),
    (
        DesktopEnvironment::Deepin,
        &["kwin_wayland", "deepin-kwin_x11"],
    ),
    (DesktopEnvironment::Enlightenment, &["enlightenment"]),
    (DesktopEnvironment::Trinity, &["twin"]),
    (DesktopEnvironment::Cosmic, &["cosmic-comp"]),
    (DesktopEnvironment::Sway, &["sway"]),
    (DesktopEnvironment::Hyprland, &["hyprland"]),
    (DesktopEnvironment::I3, &["i3"]),
    (DesktopEnvironment::Bspwm, &["bspwm"]),
    (DesktopEnvironment::Qtile, &["qtile"]),
    (DesktopEnvironment::Niri, &["niri"]),
    (DesktopEnvironment::MiracleWm, &["miracle-wm"]),
];

/// Resolve the running window manager's process name.
///
/// Checks the detected desktop's candidate list first. LXQt sessions
/// additionally record their compositor in session.conf. As a last
/// resort the whole candidate table is scanned regardless of desktop,
/// since a misdetected DE should not hide a perfectly identifiable
/// window manager.
pub fn detect_window_manager(
    probe: &dyn HostProbe,
    de: DesktopEnvironment,
    pgrep_supports_ci: bool,
) -> String {
    let mut checked: HashSet<&str> = HashSet::new();

    if let Some((_, candidates)) = WM_CANDIDATES.iter().find(|(cand_de, _)| *cand_de == de) {
        for &name in *candidates {
            checked.insert(name);
            if is_process_running(probe, name, pgrep_supports_ci) {
                return name.to_string();
            }
        }
    }

    if de == DesktopEnvironment::Lxqt {
        if let Some(wm) = lxqt_session_conf_wm(probe) {
            return wm;
        }
    }

    for (_, candidates) in WM_CANDIDATES {
        for &name in *candidates {
            if !checked.insert(name) {
                continue;
            }
            if is_process_running(probe, name, pgrep_supports_ci) {
                log::debug!("window manager {} found outside {}'s candidate list", name, de);
                return name.to_string();
            }
        }
    }

    log::warn!("window manager unidentified for desktop {}", de);
    SENTINEL_WM_UNIDENTIFIED.to_string()
}

/// LXQt records its configured window manager / compositor in
/// ~/.config/lxqt/session.conf.
fn lxqt_session_conf_wm(probe: &dyn HostProbe) -> Option<String> {
    let path = probe.home_dir()?.join(".config/lxqt/session.conf");
    let content = probe.read_file(&path)?;
    for line in content.lines() {
        let line = line.trim();
        for key in ["window_manager=", "compositor="] {
            if let Some(value) = line.strip_prefix(key) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::super::probe::testing::FakeProbe;
    use super::*;

    #[test]
    fn test_candidate_list_for_detected_de() {
        let mut probe = FakeProbe::new();
        probe.set_process("kwin_wayland");
        let wm = detect_window_manager(&probe, DesktopEnvironment::Kde, true);
        assert_eq!(wm, "kwin_wayland");
    }

    #[test]
    fn test_candidate_order_within_de() {
        let mut probe = FakeProbe::new();
        probe.set_process("kwin_x11");
        probe.set_process("kwin");
        let wm = detect_window_manager(&probe, DesktopEnvironment::Kde, true);
        assert_eq!(wm, "kwin_x11");
    }

    #[test]
    fn test_lxqt_session_conf_fallback() {
        let mut probe = FakeProbe::new();
        probe.set_file(
            "/home/test/.config/lxqt/session.conf",
            "[General]\nwindow_manager=labwc\n",
        );
        let wm = detect_window_manager(&probe, DesktopEnvironment::Lxqt, true);
        assert_eq!(wm, "labwc");
    }

    #[test]
    fn test_lxqt_compositor_key() {
        let mut probe = FakeProbe::new();
        probe.set_file(
            "/home/test/.config/lxqt/session.conf",
            "compositor=wayfire\n",
        );
        let wm = detect_window_manager(&probe, DesktopEnvironment::Lxqt, true);
        assert_eq!(wm, "wayfire");
    }

    #[test]
    fn test_full_table_scan_ignores_detected_de() {
        // DE misdetected as GNOME while sway is what runs.
        let mut probe = FakeProbe::new();
        probe.set_process("sway");
        let wm = detect_window_manager(&probe, DesktopEnvironment::Gnome, true);
        assert_eq!(wm, "sway");
    }

    #[test]
    fn test_sentinel_when_nothing_runs() {
        let probe = FakeProbe::new();
        let wm = detect_window_manager(&probe, DesktopEnvironment::Gnome, true);
        assert_eq!(wm, SENTINEL_WM_UNIDENTIFIED);
    }
}
