//! Editor surfaces and the capabilities they expose
//!
//! The host owns the surfaces; this crate only sees them through the
//! [`Surface`] trait. Whether a surface can be driven by webview commands is
//! an interface query ([`Surface::as_webview`]), never a type inspection.

mod registry;

use std::fmt;

use futures::future::LocalBoxFuture;
use thiserror::Error;

pub use registry::{EditorService, TargetRegistry};

/// Identifier of an open surface, unique for the lifetime of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Failure reported by a surface operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface {0} has been disposed")]
    Disposed(SurfaceId),
    #[error("reload of {id} failed: {reason}")]
    ReloadFailed { id: SurfaceId, reason: String },
}

/// Search direction for find-next / find-previous
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindDirection {
    Forward,
    Backward,
}

impl FindDirection {
    pub fn is_previous(self) -> bool {
        self == FindDirection::Backward
    }
}

/// The operations of an embedded web content surface
pub trait WebviewCapability {
    fn show_find(&self);
    fn hide_find(&self);
    fn find(&self, direction: FindDirection);
    fn select_all(&self);
    /// Start a reload; the returned future settles when the content has reloaded
    fn reload(&self) -> LocalBoxFuture<'static, Result<(), SurfaceError>>;
}

/// Any editor control the host can make active or visible
pub trait Surface {
    fn id(&self) -> SurfaceId;

    fn title(&self) -> String;

    /// The webview operations, if this surface implements them
    fn as_webview(&self) -> Option<&dyn WebviewCapability> {
        None
    }
}

impl fmt::Debug for dyn Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id())
            .field("title", &self.title())
            .field("webview", &self.as_webview().is_some())
            .finish()
    }
}

/// Named operation sets a surface may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Webview,
}

impl Capability {
    /// Whether `surface` currently exposes this capability
    pub fn supported_by(self, surface: &dyn Surface) -> bool {
        match self {
            Capability::Webview => surface.as_webview().is_some(),
        }
    }

    /// Operation names covered by this capability
    pub fn operations(self) -> &'static [&'static str] {
        match self {
            Capability::Webview => &["showFind", "hideFind", "find", "selectAll", "reload"],
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Webview => write!(f, "webview"),
        }
    }
}
