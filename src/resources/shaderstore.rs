//! Shader storage resource.
//!
//! Stores compiled shader programs keyed by string IDs. Each entry caches its
//! uniform locations so lookups hit the backend once per name. Reloading a key
//! compiles a new program with a new [`ProgramId`]; handles resolved against
//! the old id are stale from then on, which [`ShaderStore::is_current`] reports.

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::render::backend::{ProgramId, RenderBackend, ShaderSource, UniformLocation};

/// Entry containing a program and its cached uniform locations.
pub struct ShaderEntry {
    pub program: ProgramId,
    pub source: ShaderSource,
    /// Cached uniform locations by name. `None` means the uniform is not declared.
    pub locations: FxHashMap<String, Option<UniformLocation>>,
}

#[derive(Resource, Default)]
pub struct ShaderStore {
    shaders: FxHashMap<String, ShaderEntry>,
}

impl ShaderStore {
    /// Creates a new empty shader store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the program stored under `source.key`, compiling `source` if the
    /// key is not present yet.
    ///
    /// An existing entry wins even if its source differs from `source`; use
    /// [`reload`](Self::reload) to replace it.
    pub fn resolve_or_compile<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        source: &ShaderSource,
    ) -> Result<ProgramId, String> {
        if let Some(entry) = self.shaders.get(&source.key) {
            return Ok(entry.program);
        }
        let program = backend
            .compile_program(source)
            .map_err(|e| format!("Failed to compile shader '{}': {}", source.key, e))?;
        info!("Shader '{}' compiled as {:?}", source.key, program);
        self.shaders.insert(
            source.key.clone(),
            ShaderEntry {
                program,
                source: source.clone(),
                locations: FxHashMap::default(),
            },
        );
        Ok(program)
    }

    /// Replace the program under `source.key` with a fresh compile of `source`.
    ///
    /// The new source is compiled before anything is touched: on failure the
    /// previous program stays current. On success the previous program is
    /// unloaded and its cached locations are dropped.
    pub fn reload<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        source: &ShaderSource,
    ) -> Result<ProgramId, String> {
        let program = backend
            .compile_program(source)
            .map_err(|e| format!("Failed to compile shader '{}': {}", source.key, e))?;
        let old = self.shaders.insert(
            source.key.clone(),
            ShaderEntry {
                program,
                source: source.clone(),
                locations: FxHashMap::default(),
            },
        );
        if let Some(old) = old {
            backend.unload_program(old.program);
            info!(
                "Shader '{}' reloaded: {:?} -> {:?}",
                source.key, old.program, program
            );
        } else {
            info!("Shader '{}' compiled as {:?}", source.key, program);
        }
        Ok(program)
    }

    /// Location of `name` in `program`, cached per entry.
    ///
    /// Returns `None` if the uniform is not declared or `program` is not current.
    pub fn uniform_location<B: RenderBackend>(
        &mut self,
        backend: &B,
        program: ProgramId,
        name: &str,
    ) -> Option<UniformLocation> {
        let Some(entry) = self.shaders.values_mut().find(|e| e.program == program) else {
            warn!("Uniform lookup '{}' on stale program {:?}", name, program);
            return None;
        };
        if let Some(cached) = entry.locations.get(name) {
            return *cached;
        }
        let location = backend.uniform_location(program, name);
        entry.locations.insert(name.to_string(), location);
        location
    }

    /// True while `program` is the live program of some entry.
    pub fn is_current(&self, program: ProgramId) -> bool {
        self.shaders.values().any(|e| e.program == program)
    }

    pub fn program(&self, key: &str) -> Option<ProgramId> {
        self.shaders.get(key).map(|e| e.program)
    }

    pub fn get(&self, key: &str) -> Option<&ShaderEntry> {
        self.shaders.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shaders.contains_key(key)
    }

    /// Remove and unload the program stored under `key`.
    pub fn remove<B: RenderBackend>(&mut self, backend: &mut B, key: &str) -> bool {
        match self.shaders.remove(key) {
            Some(entry) => {
                backend.unload_program(entry.program);
                true
            }
            None => false,
        }
    }
}
