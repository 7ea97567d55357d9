//! Context bootstrap: creation hints, the window surface and function loading.

pub mod hints;
pub mod surface;

use thiserror::Error;

pub use hints::{ContextHints, ContextRequest, GlVersion, Profile};
pub use surface::{RenderSurface, SurfaceRequest};

/// The two ways bootstrapping can fail. Exactly one is reported per failed
/// attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("Failed to create window: {0}")]
    SurfaceCreation(String),
    #[error("Failed to load OpenGL functions: {0}")]
    FunctionLoad(String),
}

impl BootstrapError {
    /// The function-load failure for `missing` entry point names, or `None`
    /// when every one resolved.
    pub fn unresolved(missing: &[&str]) -> Option<Self> {
        if missing.is_empty() {
            return None;
        }

        Some(Self::FunctionLoad(format!(
            "unresolved entry points: {}",
            missing.join(", ")
        )))
    }
}
