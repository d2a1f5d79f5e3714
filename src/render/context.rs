//! Borrow bundles handed to sprites at construction and draw time.

use crate::render::backend::RenderBackend;
use crate::resources::framecache::FrameCache;
use crate::resources::shaderstore::ShaderStore;
use crate::resources::texturestore::TextureStore;

/// Collaborators needed to build a sprite: the backend plus the three asset
/// caches it loads through.
pub struct AssetContext<'a, B: RenderBackend> {
    pub backend: &'a mut B,
    pub textures: &'a mut TextureStore,
    pub frames: &'a FrameCache,
    pub shaders: &'a mut ShaderStore,
}

/// What a draw call sees: the backend to submit to and the shader cache used to
/// validate cached uniform handles.
pub struct RenderContext<'a, B: RenderBackend> {
    pub backend: &'a mut B,
    pub shaders: &'a ShaderStore,
}

impl<'a, B: RenderBackend> RenderContext<'a, B> {
    pub fn new(backend: &'a mut B, shaders: &'a ShaderStore) -> Self {
        Self { backend, shaders }
    }
}
