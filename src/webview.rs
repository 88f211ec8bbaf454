//! Webview editor commands
//!
//! Find widget control, select-all and bulk reload for editors backed by
//! embedded web content. Every keybinding is gated on a feature-context
//! expression supplied by the host (by default: a webview editor is active).

use futures::future::{self, join_all};
use futures::FutureExt;

use crate::dispatch::{ActionFuture, ActionOutcome, CommandContext, ReloadSummary};
use crate::keymap::{
    Command, CommandId, CommandRegistry, ContextKeyExpr, KeyCode, KeybindingWeight, Keystroke,
    Modifiers, RegistrationHandle, RegistryError, FEATURE_CONTEXT_ACTIVE, FIND_WIDGET_FOCUSED,
    FIND_WIDGET_VISIBLE, INPUT_FOCUSED,
};
use crate::surface::{FindDirection, WebviewCapability};

pub const SHOW_FIND: CommandId = CommandId::from_static("show-find");
pub const HIDE_FIND: CommandId = CommandId::from_static("hide-find");
pub const FIND_NEXT: CommandId = CommandId::from_static("find-next");
pub const FIND_PREVIOUS: CommandId = CommandId::from_static("find-previous");
pub const SELECT_ALL: CommandId = CommandId::from_static("select-all");
pub const RELOAD_ALL: CommandId = CommandId::from_static("reload-all");

/// Default feature context: a webview editor is the active editor
pub fn default_feature_context() -> ContextKeyExpr {
    ContextKeyExpr::has(FEATURE_CONTEXT_ACTIVE)
}

/// Register all webview commands, returning their handles for teardown
///
/// On error nothing stays registered.
pub fn register_webview_commands(
    registry: &mut CommandRegistry,
    feature_context: &ContextKeyExpr,
) -> Result<Vec<RegistrationHandle>, RegistryError> {
    let mut handles = Vec::new();
    for command in webview_commands(feature_context) {
        match registry.register(command) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                for handle in &handles {
                    registry.unregister(handle);
                }
                return Err(err);
            }
        }
    }
    tracing::info!(count = handles.len(), "registered webview commands");
    Ok(handles)
}

/// Build the webview commands for a feature context
pub fn webview_commands(feature_context: &ContextKeyExpr) -> Vec<Command> {
    let weight = KeybindingWeight::EDITOR_CONTRIB;
    let with = |key: &str| feature_context.clone().and_also(ContextKeyExpr::has(key));

    vec![
        Command::new(SHOW_FIND, "Show find", |ctx| {
            with_active_webview(ctx, |webview| webview.show_find())
        })
        .when(feature_context.clone())
        .bind(Keystroke::cmd('f'), weight),
        Command::new(HIDE_FIND, "Stop find", |ctx| {
            with_active_webview(ctx, |webview| webview.hide_find())
        })
        .when(with(FIND_WIDGET_VISIBLE))
        .bind(Keystroke::key(KeyCode::Escape), weight),
        Command::new(FIND_NEXT, "Find next", |ctx| {
            with_active_webview(ctx, |webview| webview.find(FindDirection::Forward))
        })
        .when(with(FIND_WIDGET_FOCUSED))
        .bind(Keystroke::key(KeyCode::Enter), weight),
        Command::new(FIND_PREVIOUS, "Find previous", |ctx| {
            with_active_webview(ctx, |webview| webview.find(FindDirection::Backward))
        })
        .when(with(FIND_WIDGET_FOCUSED))
        .bind(Keystroke::new(KeyCode::Enter, Modifiers::SHIFT), weight),
        Command::new(SELECT_ALL, "Select all", |ctx| {
            with_active_webview(ctx, |webview| webview.select_all())
        })
        .when(
            feature_context
                .clone()
                .and_also(ContextKeyExpr::not(ContextKeyExpr::has(INPUT_FOCUSED))),
        )
        .bind(Keystroke::cmd('a'), weight),
        // Menu only: no chord, no precondition
        Command::new(RELOAD_ALL, "Reload Webviews", reload_all),
    ]
}

/// Run `op` on the active webview, or do nothing when there is none
fn with_active_webview(
    ctx: &CommandContext<'_>,
    op: impl FnOnce(&dyn WebviewCapability),
) -> ActionFuture {
    let outcome = match ctx.active_webview() {
        Some(surface) => match surface.as_webview() {
            Some(webview) => {
                op(webview);
                ActionOutcome::Completed
            }
            None => ActionOutcome::NoTarget,
        },
        None => {
            tracing::debug!("no active webview, ignoring command");
            ActionOutcome::NoTarget
        }
    };
    future::ready(outcome).boxed_local()
}

/// Reload every visible webview
///
/// All reloads are started before any is awaited. A failing surface is
/// counted and logged; it never stops the others.
fn reload_all(ctx: &CommandContext<'_>) -> ActionFuture {
    let pending: Vec<_> = ctx
        .visible_webviews()
        .into_iter()
        .filter_map(|surface| {
            let id = surface.id();
            surface
                .as_webview()
                .map(|webview| webview.reload().map(move |result| (id, result)))
        })
        .collect();

    let issued = pending.len();
    tracing::debug!(issued, "reloading visible webviews");

    join_all(pending)
        .map(move |results| {
            let mut failed = 0;
            for (id, result) in results {
                if let Err(err) = result {
                    tracing::warn!(%id, error = %err, "webview reload failed");
                    failed += 1;
                }
            }
            ActionOutcome::Reloaded(ReloadSummary { issued, failed })
        })
        .boxed_local()
}
