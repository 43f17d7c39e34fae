//! Environment fingerprinting
//!
//! Resolves distro, session type, desktop environment, desktop major
//! version, and window manager into one immutable fact sheet. Runs
//! exactly once at startup; nothing here is keystroke-path code.
//! Every resolution step degrades to a named sentinel instead of
//! failing, so rule predicates built against these facts stay total.

mod desktop;
mod distro;
mod probe;
mod session;
mod wm;

pub use desktop::{
    detect_de_version, detect_desktop, normalize_desktop, DesktopEnvironment,
    SENTINEL_NO_VERSION_LOGIC, SENTINEL_VERSION_NOT_FOUND,
};
pub use distro::{
    detect_distro, is_rolling, normalize_distro_id, parse_release_file, DistroFacts,
    SENTINEL_KEY_MISSING, SENTINEL_NOT_FOUND, SENTINEL_ROLLING,
};
pub use probe::{is_process_running, HostProbe, SystemProbe};
pub use session::{detect_session, SessionType};
pub use wm::{detect_window_manager, SENTINEL_WM_UNIDENTIFIED};

use std::fmt;

/// Immutable fact sheet about the host desktop.
///
/// Computed once per process; all core logic treats these as
/// constants afterwards. User preferences hot-reload, environment
/// facts do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFacts {
    pub distro_id: String,
    pub distro_version: String,
    pub variant_id: String,
    pub session_type: SessionType,
    pub desktop_env: DesktopEnvironment,
    pub de_major_version: String,
    pub window_manager: String,
}

impl EnvironmentFacts {
    /// Facts for an entirely unknown host; every field a sentinel.
    /// Useful as a test fixture and as the degenerate detect() result.
    pub fn unknown() -> Self {
        Self {
            distro_id: SENTINEL_NOT_FOUND.to_string(),
            distro_version: SENTINEL_NOT_FOUND.to_string(),
            variant_id: SENTINEL_NOT_FOUND.to_string(),
            session_type: SessionType::Unidentified,
            desktop_env: DesktopEnvironment::Unidentified,
            de_major_version: SENTINEL_NO_VERSION_LOGIC.to_string(),
            window_manager: SENTINEL_WM_UNIDENTIFIED.to_string(),
        }
    }
}

impl fmt::Display for EnvironmentFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) on {} {} / {} [{}]",
            self.distro_id,
            self.distro_version,
            self.variant_id,
            self.desktop_env,
            self.de_major_version,
            self.session_type,
            self.window_manager
        )
    }
}

/// Fingerprint the host through the given probe.
///
/// Never fails: a probe that answers nothing yields all-sentinel
/// facts, not an error.
pub fn detect(probe: &dyn HostProbe) -> EnvironmentFacts {
    let distro = detect_distro(probe);
    // CentOS 7 ships a pgrep without -i support.
    let pgrep_supports_ci = !(distro.id == "centos" && distro.version.starts_with('7'));

    let session_type = detect_session(probe);
    let desktop_env = detect_desktop(probe, pgrep_supports_ci);
    let de_major_version = detect_de_version(probe, desktop_env);
    let window_manager = detect_window_manager(probe, desktop_env, pgrep_supports_ci);

    let facts = EnvironmentFacts {
        distro_id: distro.id,
        distro_version: distro.version,
        variant_id: distro.variant,
        session_type,
        desktop_env,
        de_major_version,
        window_manager,
    };
    log::info!("environment: {}", facts);
    facts
}

/// Fingerprint the live host
pub fn detect_system() -> EnvironmentFacts {
    detect(&SystemProbe)
}
