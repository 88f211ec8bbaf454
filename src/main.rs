//! Diagnostic front-end: shows which webview command a chord would run
//!
//! ```text
//! webview-commands --set feature-context-active --set find-widget-focused shift+enter
//! ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use webview_commands::config::CommandsConfig;
use webview_commands::keymap::{CommandId, CommandRegistry};
use webview_commands::webview::register_webview_commands;

use cli::{CliArgs, RunConfig};

#[derive(Serialize)]
struct Resolution<'a> {
    chord: &'a str,
    command: Option<CommandId>,
    title: Option<String>,
    /// Every enabled binding for the chord, winner first
    candidates: Vec<CommandId>,
}

#[derive(Serialize)]
struct Listing {
    id: CommandId,
    title: String,
    keybinding: Option<String>,
    when: Option<String>,
}

fn main() -> Result<()> {
    let run = CliArgs::parse().into_config()?;
    webview_commands::tracing::init();

    let config = match &run.config_path {
        Some(path) => CommandsConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CommandsConfig::load(),
    };
    let feature_context = config
        .feature_context_expr()
        .context("Invalid feature_context in config")?;

    let mut registry = CommandRegistry::new(config.unique_command_ids);
    register_webview_commands(&mut registry, &feature_context)?;

    if run.list {
        print_listing(&registry, run.json)?;
    }
    print_resolutions(&registry, &run)?;
    Ok(())
}

fn print_listing(registry: &CommandRegistry, json: bool) -> Result<()> {
    let listing: Vec<Listing> = registry
        .commands()
        .iter()
        .map(|command| Listing {
            id: command.id.clone(),
            title: command.title.clone(),
            keybinding: registry.display_for(&command.id),
            when: command.precondition.as_ref().map(|e| e.to_string()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for entry in &listing {
        println!(
            "{:<14} {:<16} {:<12} {}",
            entry.id,
            entry.title,
            entry.keybinding.as_deref().unwrap_or("-"),
            entry.when.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn print_resolutions(registry: &CommandRegistry, run: &RunConfig) -> Result<()> {
    let resolutions: Vec<Resolution<'_>> = run
        .chords
        .iter()
        .map(|(raw, chord)| {
            let command = registry.resolve(chord, &run.context_keys);
            Resolution {
                chord: raw,
                command: command.as_ref().map(|c| c.id.clone()),
                title: command.as_ref().map(|c| c.title.clone()),
                candidates: registry
                    .keymap()
                    .resolve_all(chord, &run.context_keys)
                    .iter()
                    .map(|b| b.command.clone())
                    .collect(),
            }
        })
        .collect();

    if run.json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    for resolution in &resolutions {
        match (&resolution.command, &resolution.title) {
            (Some(id), Some(title)) => println!("{} → {} ({})", resolution.chord, id, title),
            _ => println!("{} → (no command)", resolution.chord),
        }
    }
    Ok(())
}
