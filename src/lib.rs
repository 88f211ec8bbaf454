//! Webview editor commands
//!
//! Routes find, select-all and reload commands to the active webview editor
//! surface, gated by context-key preconditions.
//!
//! ```text
//! chord → CommandRegistry::resolve (ContextKeyStore) → Command
//!       → Dispatcher → action(CommandContext) → EditorService → WebviewCapability
//! ```

pub mod config;
pub mod config_paths;
pub mod dispatch;
pub mod keymap;
pub mod surface;
pub mod tracing;
pub mod webview;

// Re-export commonly used types
pub use config::CommandsConfig;
pub use dispatch::{ActionOutcome, CommandContext, DispatchOutcome, Dispatcher, ReloadSummary};
pub use keymap::{Command, CommandId, CommandRegistry, ContextKeyExpr, ContextKeyStore, Keystroke};
pub use surface::{Capability, EditorService, Surface, SurfaceId, TargetRegistry, WebviewCapability};
pub use webview::register_webview_commands;
