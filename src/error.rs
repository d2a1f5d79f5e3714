//! Errors reported when building tinted sprites.

use std::fmt;
use std::path::PathBuf;

/// Construction failure of a [`TintableSprite`](crate::components::tintablesprite::TintableSprite).
///
/// Every variant is recoverable by the caller: skip or substitute the asset and
/// carry on.
#[derive(Debug, Clone, PartialEq)]
pub enum TintError {
    /// No frame with this name is in the frame cache.
    NotFound(String),
    /// The image could not be read or decoded.
    LoadFailure { path: PathBuf, reason: String },
    /// The shader program compiled but does not declare an expected uniform.
    ShaderUniformMissing { shader: String, uniform: &'static str },
    /// The shader program failed to compile.
    ShaderCompile { shader: String, reason: String },
}

impl fmt::Display for TintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TintError::NotFound(name) => write!(f, "sprite frame '{}' not found", name),
            TintError::LoadFailure { path, reason } => {
                write!(f, "failed to load {:?}: {}", path, reason)
            }
            TintError::ShaderUniformMissing { shader, uniform } => {
                write!(f, "shader '{}' has no uniform '{}'", shader, uniform)
            }
            TintError::ShaderCompile { shader, reason } => {
                write!(f, "shader '{}' failed to compile: {}", shader, reason)
            }
        }
    }
}

impl std::error::Error for TintError {}
