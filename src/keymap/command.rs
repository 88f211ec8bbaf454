//! Command definitions
//!
//! A command couples a stable id with a title, an optional precondition, an
//! optional default keybinding and the action to run. Commands are immutable
//! once registered.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::expr::ContextKeyExpr;
use super::types::Keystroke;
use crate::dispatch::{ActionFuture, CommandContext};

/// Stable command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommandId(Cow<'static, str>);

impl CommandId {
    pub const fn from_static(id: &'static str) -> Self {
        CommandId(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for CommandId {
    fn from(id: &'static str) -> Self {
        CommandId(Cow::Borrowed(id))
    }
}

impl From<String> for CommandId {
    fn from(id: String) -> Self {
        CommandId(Cow::Owned(id))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Priority of a keybinding when several bindings match the same chord
///
/// Higher weights win. Contributions scoped to a specific kind of editor sit
/// above editor-core defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KeybindingWeight(pub u32);

impl KeybindingWeight {
    pub const EDITOR_CORE: KeybindingWeight = KeybindingWeight(0);
    pub const EDITOR_CONTRIB: KeybindingWeight = KeybindingWeight(100);
    pub const WORKBENCH_CONTRIB: KeybindingWeight = KeybindingWeight(200);
    pub const BUILTIN_EXTENSION: KeybindingWeight = KeybindingWeight(300);
    pub const EXTERNAL_EXTENSION: KeybindingWeight = KeybindingWeight(400);
}

impl Default for KeybindingWeight {
    fn default() -> Self {
        KeybindingWeight::EDITOR_CORE
    }
}

/// Default chord and its priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeybindingSpec {
    pub chord: Keystroke,
    pub weight: KeybindingWeight,
}

/// The executable part of a command
pub type CommandAction = Rc<dyn Fn(&CommandContext<'_>) -> ActionFuture>;

/// A registered command
#[derive(Clone)]
pub struct Command {
    pub id: CommandId,
    pub title: String,
    /// Gate for both keybinding resolution and direct execution
    pub precondition: Option<ContextKeyExpr>,
    pub keybinding: Option<KeybindingSpec>,
    pub action: CommandAction,
}

impl Command {
    pub fn new(
        id: impl Into<CommandId>,
        title: impl Into<String>,
        action: impl Fn(&CommandContext<'_>) -> ActionFuture + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            precondition: None,
            keybinding: None,
            action: Rc::new(action),
        }
    }

    /// Attach a precondition (builder pattern)
    pub fn when(mut self, precondition: ContextKeyExpr) -> Self {
        self.precondition = Some(precondition);
        self
    }

    /// Attach a default keybinding (builder pattern)
    pub fn bind(mut self, chord: Keystroke, weight: KeybindingWeight) -> Self {
        self.keybinding = Some(KeybindingSpec { chord, weight });
        self
    }

    /// Whether the precondition holds for the given store (no precondition holds)
    pub fn is_enabled(&self, store: &super::context::ContextKeyStore) -> bool {
        self.precondition
            .as_ref()
            .map_or(true, |expr| expr.evaluate(store))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("precondition", &self.precondition.as_ref().map(|e| e.to_string()))
            .field("keybinding", &self.keybinding)
            .finish_non_exhaustive()
    }
}
