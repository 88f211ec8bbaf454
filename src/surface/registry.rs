//! Open surfaces and the active one

use std::rc::Rc;

use super::{Capability, Surface, SurfaceId};

/// What the host knows about its editors
///
/// Both queries are answered fresh on every call; callers must not cache the
/// result across commands since focus moves between them.
pub trait EditorService {
    /// The control that currently has focus / is the active editor
    fn active_control(&self) -> Option<Rc<dyn Surface>>;

    /// Snapshot of the controls currently visible on screen
    fn visible_controls(&self) -> Vec<Rc<dyn Surface>>;

    /// The active control, if it exposes `capability`
    fn active_target(&self, capability: Capability) -> Option<Rc<dyn Surface>> {
        self.active_control()
            .filter(|surface| capability.supported_by(surface.as_ref()))
    }

    /// Visible controls that expose `capability`, in snapshot order
    fn visible_targets(&self, capability: Capability) -> Vec<Rc<dyn Surface>> {
        self.visible_controls()
            .into_iter()
            .filter(|surface| capability.supported_by(surface.as_ref()))
            .collect()
    }
}

struct OpenSurface {
    surface: Rc<dyn Surface>,
    visible: bool,
}

/// Tracks open surfaces, their visibility and the active one
///
/// Surfaces keep the order in which they were opened; that order is the
/// order of [`EditorService::visible_controls`].
#[derive(Default)]
pub struct TargetRegistry {
    open: Vec<OpenSurface>,
    active: Option<SurfaceId>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a surface (visible, not active). Returns false if its id is already open.
    pub fn open(&mut self, surface: Rc<dyn Surface>) -> bool {
        let id = surface.id();
        if self.position(id).is_some() {
            tracing::warn!(%id, "surface already open");
            return false;
        }
        tracing::debug!(%id, title = %surface.title(), "surface opened");
        self.open.push(OpenSurface {
            surface,
            visible: true,
        });
        true
    }

    /// Close a surface. Closing the active surface leaves nothing active.
    pub fn close(&mut self, id: SurfaceId) -> Option<Rc<dyn Surface>> {
        let idx = self.position(id)?;
        let closed = self.open.remove(idx);
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::debug!(%id, "surface closed");
        Some(closed.surface)
    }

    /// Make an open surface the active one; it also becomes visible
    pub fn activate(&mut self, id: SurfaceId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.open[idx].visible = true;
        self.active = Some(id);
        tracing::debug!(%id, "surface activated");
        true
    }

    /// Focus left all tracked surfaces
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    pub fn set_visible(&mut self, id: SurfaceId, visible: bool) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.open[idx].visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<Rc<dyn Surface>> {
        self.position(id).map(|idx| Rc::clone(&self.open[idx].surface))
    }

    pub fn active_id(&self) -> Option<SurfaceId> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    fn position(&self, id: SurfaceId) -> Option<usize> {
        self.open.iter().position(|s| s.surface.id() == id)
    }
}

impl EditorService for TargetRegistry {
    fn active_control(&self) -> Option<Rc<dyn Surface>> {
        self.active.and_then(|id| self.get(id))
    }

    fn visible_controls(&self) -> Vec<Rc<dyn Surface>> {
        self.open
            .iter()
            .filter(|s| s.visible)
            .map(|s| Rc::clone(&s.surface))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{FindDirection, SurfaceError, WebviewCapability};
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;

    struct TextEditor(u64);

    impl Surface for TextEditor {
        fn id(&self) -> SurfaceId {
            SurfaceId(self.0)
        }

        fn title(&self) -> String {
            "main.rs".to_string()
        }
    }

    struct Preview(u64);

    impl WebviewCapability for Preview {
        fn show_find(&self) {}
        fn hide_find(&self) {}
        fn find(&self, _direction: FindDirection) {}
        fn select_all(&self) {}
        fn reload(&self) -> LocalBoxFuture<'static, Result<(), SurfaceError>> {
            futures::future::ready(Ok(())).boxed_local()
        }
    }

    impl Surface for Preview {
        fn id(&self) -> SurfaceId {
            SurfaceId(self.0)
        }

        fn title(&self) -> String {
            "Preview README.md".to_string()
        }

        fn as_webview(&self) -> Option<&dyn WebviewCapability> {
            Some(self)
        }
    }

    #[test]
    fn test_active_target_narrows_by_capability() {
        let mut registry = TargetRegistry::new();
        registry.open(Rc::new(TextEditor(1)));
        registry.open(Rc::new(Preview(2)));

        assert!(registry.active_target(Capability::Webview).is_none());

        registry.activate(SurfaceId(1));
        assert!(registry.active_control().is_some());
        assert!(registry.active_target(Capability::Webview).is_none());

        registry.activate(SurfaceId(2));
        let target = registry.active_target(Capability::Webview).unwrap();
        assert_eq!(target.id(), SurfaceId(2));
    }

    #[test]
    fn test_close_active_clears_it() {
        let mut registry = TargetRegistry::new();
        registry.open(Rc::new(Preview(7)));
        registry.activate(SurfaceId(7));
        assert!(registry.close(SurfaceId(7)).is_some());
        assert!(registry.active_control().is_none());
        assert!(registry.close(SurfaceId(7)).is_none());
    }

    #[test]
    fn test_visible_targets_snapshot() {
        let mut registry = TargetRegistry::new();
        registry.open(Rc::new(Preview(1)));
        registry.open(Rc::new(TextEditor(2)));
        registry.open(Rc::new(Preview(3)));
        registry.set_visible(SurfaceId(3), false);

        let ids: Vec<_> = registry
            .visible_targets(Capability::Webview)
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec![SurfaceId(1)]);

        // Activating makes a hidden surface visible again
        registry.activate(SurfaceId(3));
        assert_eq!(registry.visible_targets(Capability::Webview).len(), 2);
    }

    #[test]
    fn test_open_rejects_duplicate_id() {
        let mut registry = TargetRegistry::new();
        assert!(registry.open(Rc::new(Preview(1))));
        assert!(!registry.open(Rc::new(TextEditor(1))));
        assert_eq!(registry.len(), 1);
    }
}
