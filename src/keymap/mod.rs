//! Conditional keybinding system
//!
//! This module provides the pieces that decide which command a chord runs:
//! - A context-key store holding the UI state that preconditions read
//! - A precondition expression language evaluated against that store
//! - A command registry with a chord index and weight-based resolution
//!
//! # Architecture
//!
//! ```text
//! Keystroke → CommandRegistry::resolve(store) → Command → Dispatcher
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut registry = CommandRegistry::default();
//! registry.register(
//!     Command::new("hide-find", "Stop find", action)
//!         .when(ContextKeyExpr::parse("feature-context-active && find-widget-visible")?)
//!         .bind(Keystroke::key(KeyCode::Escape), KeybindingWeight::EDITOR_CONTRIB),
//! )?;
//! let command = registry.resolve(&Keystroke::key(KeyCode::Escape), &store);
//! ```

mod binding;
mod command;
mod context;
mod expr;
#[allow(clippy::module_inception)]
mod keymap;
mod parse;
mod registry;
mod types;

pub use binding::Keybinding;
pub use command::{Command, CommandAction, CommandId, KeybindingSpec, KeybindingWeight};
pub use context::{
    ContextKeyStore, ContextValue, FEATURE_CONTEXT_ACTIVE, FIND_WIDGET_FOCUSED,
    FIND_WIDGET_VISIBLE, INPUT_FOCUSED,
};
pub use expr::{evaluate, ContextKeyExpr, ExprError};
pub use keymap::Keymap;
pub use parse::{parse_key_string, KeymapError};
pub use registry::{CommandRegistry, RegistrationHandle, RegistryError};
pub use types::{KeyCode, Keystroke, Modifiers};
