// Mackeys Environment - Host Probe Seam
//
// All host access used by environment detection goes through this
// trait, so detection logic stays testable without a live desktop.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Host access needed by environment detection.
///
/// Implementations must be cheap to call repeatedly; detection runs
/// once at startup but touches several probes per resolution step.
pub trait HostProbe {
    /// Read an environment variable; empty values count as unset
    fn env_var(&self, name: &str) -> Option<String>;

    /// Read a whole file as UTF-8
    fn read_file(&self, path: &Path) -> Option<String>;

    /// Whether a path exists (file or directory)
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether an executable of this name is on PATH
    fn binary_exists(&self, name: &str) -> bool;

    /// Run a command, returning stdout only on a zero exit status
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String>;

    /// Block the calling thread
    fn sleep(&self, duration: Duration);

    /// The user's home directory
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Production probe backed by the live host
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn binary_exists(&self, name: &str) -> bool {
        let Some(path_var) = self.env_var("PATH") else {
            return false;
        };
        std::env::split_paths(&path_var).any(|dir| dir.join(name).is_file())
    }

    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(program).args(args).output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Kernel comm names truncate at this length; longer process names
/// need a full-command-line match instead of an exact comm match.
const COMM_NAME_MAX: usize = 15;

/// Check for a running process by name via pgrep.
///
/// Short names use `pgrep -x` (exact comm match, case-insensitive
/// where supported; CentOS 7's pgrep predates `-i`). Longer names
/// fall back to `pgrep -f` with an anchored pattern so that e.g.
/// "sway" does not match "swaybg" somewhere in a command line.
pub fn is_process_running(probe: &dyn HostProbe, name: &str, pgrep_supports_ci: bool) -> bool {
    let output = if name.len() <= COMM_NAME_MAX {
        let mut args: Vec<&str> = vec!["-x"];
        if pgrep_supports_ci {
            args.push("-i");
        }
        args.push(name);
        probe.command_output("pgrep", &args)
    } else {
        let pattern = format!("(/|^){}($| )", name);
        probe.command_output("pgrep", &["-f", &pattern])
    };
    output.is_some_and(|out| !out.trim().is_empty())
}
