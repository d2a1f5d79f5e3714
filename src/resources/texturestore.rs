//! Texture store resource.
//!
//! Maps string keys (usually the file path) to textures already uploaded to the
//! render backend, so each image is decoded once no matter how many sprites use it.

use std::path::Path;

use bevy_ecs::prelude::Resource;
use log::debug;
use rustc_hash::FxHashMap;

use crate::render::backend::{RenderBackend, TextureInfo};

#[derive(Resource, Default)]
pub struct TextureStore {
    map: FxHashMap<String, TextureInfo>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the image at `path`, or return the cached texture if it was loaded before.
    ///
    /// The path string is the cache key.
    pub fn load<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        path: impl AsRef<Path>,
    ) -> Result<TextureInfo, String> {
        let path = path.as_ref();
        let key = path.to_string_lossy();
        if let Some(info) = self.map.get(key.as_ref()) {
            debug!("Texture cache hit for {:?}", path);
            return Ok(*info);
        }
        let info = backend.load_texture(path)?;
        self.map.insert(key.into_owned(), info);
        Ok(info)
    }

    /// Register an already uploaded texture under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, info: TextureInfo) {
        self.map.insert(key.into(), info);
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<TextureInfo> {
        self.map.get(key.as_ref()).copied()
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.map.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
