// Mackeys Diagnostic CLI
// Inspects what the rule engine would see on this host: environment
// facts, device classification, and the full context dump.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use mackeys_core::{detect_system, diagnostics, EventContext, RuleEngine, Settings};

/// Mac-style remapping context inspector
#[derive(Parser, Debug)]
#[command(name = "mackeys")]
#[command(author = "mackeys contributors")]
#[command(version)]
#[command(about = "Inspect the mackeys rule-evaluation context", long_about = None)]
struct Args {
    /// Print detected environment facts and exit
    #[arg(long)]
    env: bool,

    /// Classify a device name and exit
    #[arg(long, value_name = "DEVICE")]
    classify: Option<String>,

    /// Settings file (default: ~/.config/mackeys/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load_default().context("loading default settings")?,
    };

    log::debug!("detecting environment");
    let facts = detect_system();
    let engine = RuleEngine::new(facts, settings);

    if args.env {
        println!("{}", engine.facts());
        return Ok(());
    }

    if let Some(device) = &args.classify {
        let classification = engine.classify(device);
        println!(
            "{}: {} ({})",
            device, classification.kb_type, classification.reason
        );
        return Ok(());
    }

    let ctx = EventContext::new("AT Translated Set 2 keyboard");
    print!("{}", diagnostics::dump(&engine, &ctx));
    Ok(())
}
