mod descriptor;
mod settings;

use anyhow::Result;
use clap::Parser;
use std::io::Read;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use descriptor::SettingsPage;
use settings::Preferences;

#[derive(Parser, Debug)]
#[command(name = "clayform")]
#[command(version = "0.1.0")]
#[command(about = "Settings-page descriptor and preference store for a watchface config page")]
struct Args {
    /// Print the settings-page descriptor as JSON for the config host
    #[arg(short, long)]
    emit: bool,

    /// Use compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Check the descriptor invariants and exit
    #[arg(long)]
    validate: bool,

    /// Apply a submitted settings payload (JSON object) from a file, - for stdin
    #[arg(short, long)]
    apply: Option<String>,

    /// Print the stored value for a message key
    #[arg(short, long)]
    get: Option<String>,

    /// Store a value, given as KEY=VALUE
    #[arg(short, long)]
    set: Option<String>,

    /// Drop stored preferences and reseed from the descriptor defaults
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let page = SettingsPage::builtin();
    page.validate()?;

    if args.emit {
        println!("{}", page.to_json(!args.compact)?);
        return Ok(());
    }

    if args.validate {
        println!("descriptor ok: {} toggle(s)", page.toggles().len());
        return Ok(());
    }

    if let Some(source) = args.apply {
        return apply_payload(&page, &source);
    }

    if let Some(key) = args.get {
        return print_value(&page, &key);
    }

    if let Some(assignment) = args.set {
        return set_value(&page, &assignment);
    }

    if args.reset {
        let prefs = Preferences::defaults(&page);
        prefs.save()?;
        tracing::info!("Preferences reset to descriptor defaults");
        return Ok(());
    }

    print_status(&page)
}

/// Apply a config-page submit payload and persist the result
fn apply_payload(page: &SettingsPage, source: &str) -> Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };

    let payload: serde_json::Value = serde_json::from_str(&raw)?;

    let mut prefs = Preferences::load(page)?;
    let applied = prefs.apply(page, &payload)?;
    prefs.save()?;

    println!("applied {} setting(s)", applied);
    Ok(())
}

fn print_value(page: &SettingsPage, key: &str) -> Result<()> {
    let prefs = Preferences::load(page)?;
    match prefs.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => anyhow::bail!("Unknown message key: {}", key),
    }
}

fn set_value(page: &SettingsPage, assignment: &str) -> Result<()> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got {:?}", assignment))?;

    let mut prefs = Preferences::load(page)?;
    prefs.set(page, key, raw)?;
    prefs.save()?;

    println!("{} = {}", key, raw);
    Ok(())
}

/// Print the current preferences as JSON, one entry per message key
fn print_status(page: &SettingsPage) -> Result<()> {
    let prefs = Preferences::load(page)?;

    let toggles: Vec<serde_json::Value> = page
        .toggles()
        .iter()
        .map(|t| {
            serde_json::json!({
                "messageKey": t.message_key,
                "label": t.label,
                "value": prefs.get(t.message_key),
            })
        })
        .collect();

    let output = serde_json::json!({ "toggles": toggles });
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
