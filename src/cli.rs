//! Command-line argument parsing for the diagnostic binary
//!
//! Supports:
//! - Seeding context keys (`--set find-widget-visible=true`)
//! - Resolving chords against that context
//! - Listing registered commands and their bindings

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use webview_commands::keymap::{parse_key_string, ContextKeyStore, ContextValue, Keystroke};

/// Resolve chords to webview commands for a given context
#[derive(Parser, Debug)]
#[command(name = "webview-commands", version, about = "Resolve chords to webview commands")]
pub struct CliArgs {
    /// Chords to resolve, e.g. `cmd+f`, `shift+enter`
    #[arg(value_name = "CHORD")]
    pub chords: Vec<String>,

    /// Set a context key (KEY=VALUE, or just KEY for true); repeatable
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Config file to use instead of the user config
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List all commands with their keybindings and preconditions
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Configuration derived from CLI arguments
#[derive(Debug)]
pub struct RunConfig {
    pub chords: Vec<(String, Keystroke)>,
    pub context_keys: ContextKeyStore,
    pub config_path: Option<PathBuf>,
    pub list: bool,
    pub json: bool,
}

impl CliArgs {
    pub fn into_config(self) -> Result<RunConfig> {
        let chords = self
            .chords
            .into_iter()
            .map(|raw| -> Result<(String, Keystroke)> {
                let chord =
                    parse_key_string(&raw).with_context(|| format!("Invalid chord '{}'", raw))?;
                Ok((raw, chord))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut context_keys = ContextKeyStore::new();
        for assignment in &self.set {
            let (key, value) = parse_assignment(assignment)?;
            context_keys.set(key, value);
        }

        Ok(RunConfig {
            chords,
            context_keys,
            config_path: self.config,
            list: self.list,
            json: self.json,
        })
    }
}

/// Parse `key=value`; a bare `key` means `key=true`
fn parse_assignment(assignment: &str) -> Result<(String, ContextValue)> {
    let (key, raw) = match assignment.split_once('=') {
        Some((key, raw)) => (key.trim(), Some(raw.trim())),
        None => (assignment.trim(), None),
    };
    if key.is_empty() {
        return Err(anyhow!("Missing key in '{}'", assignment));
    }

    let value = match raw {
        None | Some("true") => ContextValue::Bool(true),
        Some("false") => ContextValue::Bool(false),
        Some(raw) => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => ContextValue::Number(n),
            _ => ContextValue::String(raw.to_string()),
        },
    };
    Ok((key.to_string(), value))
}
