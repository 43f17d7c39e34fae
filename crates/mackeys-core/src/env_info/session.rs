// Mackeys Environment - Session Type Detection

use std::time::Duration;

use super::probe::HostProbe;

/// Display-server session type
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
pub enum SessionType {
    X11,
    Wayland,
    Unidentified,
}

/// Delay before falling back to process-table inspection: at login
/// the display server may not have finished starting, and scanning
/// too early reports a half-initialized session.
const PROCESS_SCAN_DELAY: Duration = Duration::from_secs(3);

/// Resolve the session type.
///
/// `XDG_SESSION_TYPE` decides when it holds a usable value; "tty" and
/// anything unrecognized fall through to the display env vars, and as
/// a last resort to counting display-server processes.
pub fn detect_session(probe: &dyn HostProbe) -> SessionType {
    if let Some(value) = probe.env_var("XDG_SESSION_TYPE") {
        match value.to_lowercase().as_str() {
            "x11" => return SessionType::X11,
            "wayland" => return SessionType::Wayland,
            other => {
                log::debug!("XDG_SESSION_TYPE={:?} is not usable, falling back", other);
            }
        }
    }

    if probe.env_var("WAYLAND_DISPLAY").is_some() {
        return SessionType::Wayland;
    }
    if probe.env_var("DISPLAY").is_some() {
        return SessionType::X11;
    }

    probe.sleep(PROCESS_SCAN_DELAY);
    let listing = probe
        .command_output("ps", &["-eo", "comm="])
        .unwrap_or_default();
    let xorg = listing.lines().filter(|l| l.contains("Xorg")).count();
    let wayland = listing
        .lines()
        .filter(|l| l.to_lowercase().contains("wayland"))
        .count();
    if wayland > 0 && wayland >= xorg {
        SessionType::Wayland
    } else if xorg > 0 {
        SessionType::X11
    } else {
        log::warn!("no display server found; session type unidentified");
        SessionType::Unidentified
    }
}

#[cfg(test)]
mod tests {
    use super::super::probe::testing::FakeProbe;
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_session_type_display_lowercase() {
        assert_eq!(SessionType::X11.to_string(), "x11");
        assert_eq!(SessionType::Wayland.to_string(), "wayland");
        assert_eq!(SessionType::Unidentified.to_string(), "unidentified");
    }

    #[test]
    fn test_session_type_from_str() {
        assert_eq!(SessionType::from_str("wayland"), Ok(SessionType::Wayland));
        assert_eq!(SessionType::from_str("X11"), Ok(SessionType::X11));
        assert!(SessionType::from_str("mir").is_err());
    }

    #[test]
    fn test_xdg_session_type_wins() {
        let mut probe = FakeProbe::new();
        probe.set_env("XDG_SESSION_TYPE", "wayland");
        probe.set_env("DISPLAY", ":0");
        assert_eq!(detect_session(&probe), SessionType::Wayland);
        assert_eq!(probe.slept.get(), Duration::ZERO);
    }

    #[test]
    fn test_tty_falls_through_to_display_vars() {
        let mut probe = FakeProbe::new();
        probe.set_env("XDG_SESSION_TYPE", "tty");
        probe.set_env("WAYLAND_DISPLAY", "wayland-0");
        assert_eq!(detect_session(&probe), SessionType::Wayland);
    }

    #[test]
    fn test_display_var_means_x11() {
        let mut probe = FakeProbe::new();
        probe.set_env("DISPLAY", ":0");
        assert_eq!(detect_session(&probe), SessionType::X11);
    }

    #[test]
    fn test_process_scan_waits_and_counts() {
        let mut probe = FakeProbe::new();
        probe.set_command("ps -eo comm=", "systemd\nkwin_wayland\nwayland-session\n");
        assert_eq!(detect_session(&probe), SessionType::Wayland);
        assert_eq!(probe.slept.get(), PROCESS_SCAN_DELAY);
    }

    #[test]
    fn test_process_scan_finds_xorg() {
        let mut probe = FakeProbe::new();
        probe.set_command("ps -eo comm=", "systemd\nXorg\ngnome-shell\n");
        assert_eq!(detect_session(&probe), SessionType::X11);
    }

    #[test]
    fn test_nothing_found_is_unidentified() {
        let mut probe = FakeProbe::new();
        probe.set_command("ps -eo comm=", "systemd\nbash\n");
        assert_eq!(detect_session(&probe), SessionType::Unidentified);
    }
}
