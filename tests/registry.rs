//! Command registration tests

use futures::future;
use futures::FutureExt;

use webview_commands::dispatch::ActionOutcome;
use webview_commands::keymap::{
    Command, CommandRegistry, ContextKeyExpr, ContextKeyStore, KeybindingWeight, Keystroke,
    RegistryError,
};
use webview_commands::webview::{default_feature_context, register_webview_commands, SHOW_FIND};

fn noop(id: &'static str, title: &str) -> Command {
    Command::new(id, title, |_| future::ready(ActionOutcome::Completed).boxed_local())
}

#[test]
fn test_duplicate_id_rejected_without_side_effects() {
    let mut registry = CommandRegistry::new(true);
    registry
        .register(noop("show-find", "Show find").bind(Keystroke::cmd('f'), KeybindingWeight::EDITOR_CONTRIB))
        .unwrap();

    let err = registry
        .register(noop("show-find", "Other").bind(Keystroke::cmd('g'), KeybindingWeight::EDITOR_CONTRIB))
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateCommandId(SHOW_FIND));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup_by_id(&SHOW_FIND).unwrap().title, "Show find");
    let store = ContextKeyStore::new();
    assert!(registry.resolve(&Keystroke::cmd('g'), &store).is_none());
    assert_eq!(registry.display_for(&SHOW_FIND), Some(Keystroke::cmd('f').display_string()));
}

#[test]
fn test_non_unique_registry_replaces() {
    let mut registry = CommandRegistry::new(false);
    register_webview_commands(&mut registry, &default_feature_context()).unwrap();
    registry
        .register(noop("show-find", "Find in page").bind(Keystroke::cmd('g'), KeybindingWeight::EDITOR_CONTRIB))
        .unwrap();

    assert_eq!(registry.len(), 6);
    assert_eq!(registry.lookup_by_id(&SHOW_FIND).unwrap().title, "Find in page");

    let mut store = ContextKeyStore::new();
    store.set("feature-context-active", true);
    assert!(registry.resolve(&Keystroke::cmd('f'), &store).is_none());
    assert_eq!(
        registry.resolve(&Keystroke::cmd('g'), &store).unwrap().id,
        SHOW_FIND
    );
}

#[test]
fn test_unregister_webview_commands() {
    let mut registry = CommandRegistry::default();
    let handles = register_webview_commands(&mut registry, &default_feature_context()).unwrap();
    assert_eq!(handles.len(), 6);

    for handle in &handles {
        assert!(registry.unregister(handle));
    }
    assert!(registry.is_empty());
    assert!(registry.keymap().is_empty());

    // Handles are single-use
    assert!(!registry.unregister(&handles[0]));
}

#[test]
fn test_invalid_feature_context_rejected() {
    for bad in [
        ContextKeyExpr::has(""),
        ContextKeyExpr::has("true"),
        ContextKeyExpr::has("scope:key"),
    ] {
        let mut registry = CommandRegistry::default();
        let err = register_webview_commands(&mut registry, &bad).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPrecondition { .. }), "{}", bad);
        assert!(registry.is_empty());
    }
}
