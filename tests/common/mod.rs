//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use webview_commands::dispatch::{CommandContext, DispatchOutcome, Dispatcher};
use webview_commands::keymap::{CommandId, CommandRegistry, ContextKeyStore, Keystroke};
use webview_commands::surface::{
    FindDirection, Surface, SurfaceError, SurfaceId, TargetRegistry, WebviewCapability,
};
use webview_commands::webview::{default_feature_context, register_webview_commands};

/// Ordered record of every operation invoked on any mock surface
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Webview surface that records the operations invoked on it
pub struct RecordingWebview {
    id: SurfaceId,
    log: CallLog,
    fail_reload: bool,
}

impl RecordingWebview {
    pub fn new(id: u64, log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            id: SurfaceId(id),
            log: Rc::clone(log),
            fail_reload: false,
        })
    }

    /// A webview whose reload future resolves to an error
    pub fn failing(id: u64, log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            id: SurfaceId(id),
            log: Rc::clone(log),
            fail_reload: true,
        })
    }

    fn record(&self, op: &str) {
        self.log.borrow_mut().push(format!("{}:{}", op, self.id.0));
    }
}

impl Surface for RecordingWebview {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn title(&self) -> String {
        format!("Preview {}", self.id.0)
    }

    fn as_webview(&self) -> Option<&dyn WebviewCapability> {
        Some(self)
    }
}

impl WebviewCapability for RecordingWebview {
    fn show_find(&self) {
        self.record("show_find");
    }

    fn hide_find(&self) {
        self.record("hide_find");
    }

    fn find(&self, direction: FindDirection) {
        self.record(if direction.is_previous() {
            "find_previous"
        } else {
            "find_next"
        });
    }

    fn select_all(&self) {
        self.record("select_all");
    }

    fn reload(&self) -> LocalBoxFuture<'static, Result<(), SurfaceError>> {
        self.record("reload");
        let log = Rc::clone(&self.log);
        let id = self.id;
        let fail = self.fail_reload;
        async move {
            if fail {
                log.borrow_mut().push(format!("reload_failed:{}", id.0));
                Err(SurfaceError::ReloadFailed {
                    id,
                    reason: "content process crashed".to_string(),
                })
            } else {
                log.borrow_mut().push(format!("reloaded:{}", id.0));
                Ok(())
            }
        }
        .boxed_local()
    }
}

/// Surface without webview capability (a plain text editor)
pub struct TextSurface {
    id: SurfaceId,
}

impl TextSurface {
    pub fn new(id: u64) -> Rc<Self> {
        Rc::new(Self { id: SurfaceId(id) })
    }
}

impl Surface for TextSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn title(&self) -> String {
        format!("untitled-{}", self.id.0)
    }
}

/// Registry with the webview commands, open surfaces and a context-key store
pub struct Harness {
    pub registry: CommandRegistry,
    pub targets: TargetRegistry,
    pub keys: ContextKeyStore,
    pub log: CallLog,
}

impl Harness {
    pub fn new() -> Self {
        let mut registry = CommandRegistry::default();
        register_webview_commands(&mut registry, &default_feature_context())
            .expect("webview commands register");
        Self {
            registry,
            targets: TargetRegistry::new(),
            keys: ContextKeyStore::new(),
            log: CallLog::default(),
        }
    }

    pub fn press(&self, chord: Keystroke) -> DispatchOutcome {
        let ctx = CommandContext::new(&self.targets, &self.keys);
        block_on(Dispatcher::new(&self.registry).handle_keystroke(&chord, &ctx))
    }

    pub fn execute(&self, id: &CommandId) -> DispatchOutcome {
        let ctx = CommandContext::new(&self.targets, &self.keys);
        block_on(Dispatcher::new(&self.registry).execute(id, &ctx))
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}
