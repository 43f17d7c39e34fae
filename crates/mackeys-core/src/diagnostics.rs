// Mackeys Diagnostics
// Human-readable dumps of the evaluation state, consumed by the
// tray-icon "show context" action and the CLI.

use std::fmt::Write;

use crate::context::EventContext;
use crate::engine::RuleEngine;

/// Render the current evaluation context as a multi-line report.
///
/// Pure formatting; classification goes through the engine's normal
/// cascade so the report reflects exactly what rules would see.
pub fn dump(engine: &RuleEngine, ctx: &EventContext) -> String {
    let facts = engine.facts();
    let classification = engine.classify(&ctx.device_name);

    let mut out = String::new();
    let _ = writeln!(out, "Distro        : {} {}", facts.distro_id, facts.distro_version);
    let _ = writeln!(out, "Variant       : {}", facts.variant_id);
    let _ = writeln!(out, "Session       : {}", facts.session_type);
    let _ = writeln!(
        out,
        "Desktop       : {} {} (WM: {})",
        facts.desktop_env, facts.de_major_version, facts.window_manager
    );
    let _ = writeln!(
        out,
        "Device        : {} [{} - {}]",
        ctx.device_name, classification.kb_type, classification.reason
    );
    let _ = writeln!(
        out,
        "Window class  : {}",
        ctx.wm_class.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(
        out,
        "Window title  : {}",
        ctx.wm_name.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(
        out,
        "LEDs          : numlock={} capslock={}",
        led(ctx.numlock_on),
        led(ctx.capslock_on)
    );
    let _ = writeln!(out, "Screen focus  : {}", ctx.screen_has_focus);
    out
}

fn led(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "on",
        Some(false) => "off",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_info::EnvironmentFacts;
    use crate::settings::Settings;

    #[test]
    fn test_dump_contains_all_sections() {
        let engine = RuleEngine::new(EnvironmentFacts::unknown(), Settings::new());
        let ctx = EventContext::new("IBM Model M")
            .with_class("org.kde.dolphin")
            .with_title("Home")
            .with_numlock(true);

        let report = dump(&engine, &ctx);
        assert!(report.contains("Distro"));
        assert!(report.contains("IBM Model M"));
        assert!(report.contains("[IBM"));
        assert!(report.contains("org.kde.dolphin"));
        assert!(report.contains("numlock=on"));
        assert!(report.contains("capslock=unknown"));
        assert!(report.contains("Screen focus  : true"));
    }

    #[test]
    fn test_dump_handles_missing_window_info() {
        let engine = RuleEngine::new(EnvironmentFacts::unknown(), Settings::new());
        let report = dump(&engine, &EventContext::new("kb"));
        assert!(report.contains("(none)"));
    }
}
