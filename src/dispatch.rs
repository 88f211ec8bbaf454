//! Command dispatch
//!
//! A keystroke is resolved against the registry and the current context-key
//! store; the winning command's action runs with a [`CommandContext`] that
//! gives it the editor service and the store. Nothing here is an error: a
//! failed precondition, an unbound chord or a missing target all come back as
//! outcome values.

use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use serde::Serialize;

use crate::keymap::{CommandId, CommandRegistry, ContextKeyStore, Keystroke};
use crate::surface::{Capability, EditorService, Surface};

/// Future returned by every command action
pub type ActionFuture = LocalBoxFuture<'static, ActionOutcome>;

/// Aggregate result of a bulk reload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    /// Targets whose reload was started
    pub issued: usize,
    /// Targets whose reload reported an error
    pub failed: usize,
}

/// What an action did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Completed,
    /// No active surface exposes the required capability
    NoTarget,
    Reloaded(ReloadSummary),
}

/// What happened to a dispatch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ran {
        command: CommandId,
        outcome: ActionOutcome,
    },
    PreconditionFailed(CommandId),
    UnknownCommand(CommandId),
    /// No command is bound to the chord in the current context
    Unbound,
}

impl DispatchOutcome {
    /// The action outcome, if an action ran
    pub fn action_outcome(&self) -> Option<ActionOutcome> {
        match self {
            DispatchOutcome::Ran { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}

/// Everything an action may consult, passed explicitly on every dispatch
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    editors: &'a dyn EditorService,
    context_keys: &'a ContextKeyStore,
}

impl<'a> CommandContext<'a> {
    pub fn new(editors: &'a dyn EditorService, context_keys: &'a ContextKeyStore) -> Self {
        Self {
            editors,
            context_keys,
        }
    }

    pub fn editors(&self) -> &'a dyn EditorService {
        self.editors
    }

    pub fn context_keys(&self) -> &'a ContextKeyStore {
        self.context_keys
    }

    /// The active surface if it is a webview, resolved now
    pub fn active_webview(&self) -> Option<Rc<dyn Surface>> {
        self.editors.active_target(Capability::Webview)
    }

    /// Snapshot of the visible webview surfaces
    pub fn visible_webviews(&self) -> Vec<Rc<dyn Surface>> {
        self.editors.visible_targets(Capability::Webview)
    }
}

/// Runs commands from a registry
pub struct Dispatcher<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a chord and run the winning command
    pub fn handle_keystroke(
        &self,
        chord: &Keystroke,
        ctx: &CommandContext<'_>,
    ) -> LocalBoxFuture<'static, DispatchOutcome> {
        match self.registry.resolve(chord, ctx.context_keys()) {
            Some(command) => {
                tracing::debug!(chord = %chord, command = %command.id, "chord resolved");
                self.execute(&command.id, ctx)
            }
            None => {
                tracing::trace!(chord = %chord, "no command bound in current context");
                future::ready(DispatchOutcome::Unbound).boxed_local()
            }
        }
    }

    /// Run a command by id (menus, palette) after re-checking its precondition
    pub fn execute(
        &self,
        id: &CommandId,
        ctx: &CommandContext<'_>,
    ) -> LocalBoxFuture<'static, DispatchOutcome> {
        let Some(command) = self.registry.lookup_by_id(id) else {
            tracing::debug!(command = %id, "unknown command");
            return future::ready(DispatchOutcome::UnknownCommand(id.clone())).boxed_local();
        };

        if !command.is_enabled(ctx.context_keys()) {
            tracing::debug!(command = %id, "precondition not met, skipping");
            return future::ready(DispatchOutcome::PreconditionFailed(id.clone())).boxed_local();
        }

        let command_id = command.id.clone();
        (command.action)(ctx)
            .map(move |outcome| {
                tracing::debug!(command = %command_id, ?outcome, "command finished");
                DispatchOutcome::Ran {
                    command: command_id,
                    outcome,
                }
            })
            .boxed_local()
    }
}
