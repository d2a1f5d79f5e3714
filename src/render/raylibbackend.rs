//! raylib implementation of [`RenderBackend`].
//!
//! Owns the raylib handle, thread token and every texture and shader created
//! through it. Drawing goes through the raw `ffi` calls so programs can be bound
//! per quad without holding a scoped draw handle across the whole frame.
//!
//! Note: raylib resources must only be touched from the thread that created the
//! window, so this backend is kept outside the ECS world and handed to
//! [`render_pass`](crate::systems::render::render_pass) by reference.

use std::path::Path;

use log::{debug, info};
use raylib::ffi;
use raylib::prelude::*;
use rustc_hash::FxHashMap;

use crate::render::backend::{
    DrawParams, ProgramId, RenderBackend, ShaderSource, TextureId, TextureInfo, UniformLocation,
    UniformValue,
};

pub struct RaylibBackend {
    rl: RaylibHandle,
    thread: RaylibThread,
    textures: Vec<Texture2D>,
    programs: FxHashMap<ProgramId, Shader>,
    bound: Option<ProgramId>,
    next_program: u32,
}

impl RaylibBackend {
    /// Open a window of `width`x`height` pixels.
    pub fn new(width: u32, height: u32, title: &str, target_fps: u32) -> Self {
        let (mut rl, thread) = raylib::init()
            .size(width as i32, height as i32)
            .resizable()
            .title(title)
            .build();
        rl.set_target_fps(target_fps);
        info!("raylib window {}x{} at {} fps", width, height, target_fps);
        Self {
            rl,
            thread,
            textures: Vec::new(),
            programs: FxHashMap::default(),
            bound: None,
            next_program: 1,
        }
    }

    pub fn window_should_close(&self) -> bool {
        self.rl.window_should_close()
    }

    /// Current window size; changes when the user resizes the window.
    pub fn screen_size(&self) -> (u32, u32) {
        (
            self.rl.get_screen_width().max(0) as u32,
            self.rl.get_screen_height().max(0) as u32,
        )
    }

    /// Seconds elapsed during the last frame.
    pub fn frame_time(&self) -> f32 {
        self.rl.get_frame_time()
    }
}

impl RenderBackend for RaylibBackend {
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, String> {
        let path_str = path
            .to_str()
            .ok_or_else(|| format!("Non UTF-8 texture path {:?}", path))?;
        let texture = self
            .rl
            .load_texture(&self.thread, path_str)
            .map_err(|e| format!("Failed to load texture {:?}: {}", path, e))?;
        let info = TextureInfo {
            id: TextureId(self.textures.len() as u32),
            width: texture.width as u32,
            height: texture.height as u32,
        };
        self.textures.push(texture);
        info!(
            "Loaded texture {:?} ({}x{}) as {:?}",
            path, info.width, info.height, info.id
        );
        Ok(info)
    }

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String> {
        let shader = self.rl.load_shader_from_memory(
            &self.thread,
            source.vertex.as_deref(),
            Some(source.fragment.as_str()),
        );
        if !unsafe { ffi::IsShaderValid(*shader) } {
            return Err(format!("raylib rejected shader '{}'", source.key));
        }
        let id = ProgramId(self.next_program);
        self.next_program += 1;
        self.programs.insert(id, shader);
        debug!("Compiled shader '{}' as {:?}", source.key, id);
        Ok(id)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let loc = self.programs.get(&program)?.get_shader_location(name);
        (loc >= 0).then_some(UniformLocation(loc))
    }

    fn unload_program(&mut self, program: ProgramId) {
        // dropping the Shader unloads it
        self.programs.remove(&program);
        if self.bound == Some(program) {
            self.bound = None;
        }
    }

    fn bind_program(&mut self, program: Option<ProgramId>) {
        debug_assert!(
            program.is_none_or(|p| self.programs.contains_key(&p)),
            "binding unknown program {:?}",
            program
        );
        self.bound = program;
    }

    fn bound_program(&self) -> Option<ProgramId> {
        self.bound
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let shader = self.bound.and_then(|id| self.programs.get_mut(&id));
        debug_assert!(shader.is_some(), "set_uniform with no program bound");
        let Some(shader) = shader else {
            return;
        };
        match value {
            UniformValue::Float(v) => shader.set_shader_value(location.0, v),
            UniformValue::Int(v) => shader.set_shader_value(location.0, v),
            UniformValue::Vec2 { x, y } => shader.set_shader_value(location.0, Vector2::new(x, y)),
            UniformValue::Vec4 { x, y, z, w } => {
                shader.set_shader_value(location.0, Vector4::new(x, y, z, w))
            }
        }
    }

    fn draw_texture(&mut self, texture: TextureId, params: &DrawParams) {
        let Some(tex) = self.textures.get(texture.0 as usize) else {
            return;
        };
        let mut src = ffi::Rectangle {
            x: params.src.x,
            y: params.src.y,
            width: params.src.width,
            height: params.src.height,
        };
        // negative source extents flip the quad
        if params.flip_h {
            src.width = -src.width;
        }
        if params.flip_v {
            src.height = -src.height;
        }
        let dest = ffi::Rectangle {
            x: params.dest.x,
            y: params.dest.y,
            width: params.dest.width,
            height: params.dest.height,
        };
        let origin = ffi::Vector2 {
            x: params.origin.x,
            y: params.origin.y,
        };
        let tint = ffi::Color {
            r: 255,
            g: 255,
            b: 255,
            a: (params.opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
        };
        let shader = self.bound.and_then(|id| self.programs.get(&id));
        unsafe {
            if let Some(shader) = shader {
                ffi::BeginShaderMode(**shader);
            }
            ffi::DrawTexturePro(**tex, src, dest, origin, 0.0, tint);
            if shader.is_some() {
                ffi::EndShaderMode();
            }
        }
    }

    fn begin_frame(&mut self, clear: [u8; 4]) {
        let [r, g, b, a] = clear;
        unsafe {
            ffi::BeginDrawing();
            ffi::ClearBackground(ffi::Color { r, g, b, a });
        }
    }

    fn end_frame(&mut self) {
        unsafe {
            ffi::EndDrawing();
        }
    }
}
