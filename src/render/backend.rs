//! Render backend abstraction.
//!
//! Sprites never talk to a graphics API directly. Everything they need from the
//! host (texture upload, shader programs, uniform plumbing and the final textured
//! quad) goes through the [`RenderBackend`] trait, so the same component code runs
//! on the CPU reference rasterizer and on raylib.

use std::path::Path;

use glam::Vec2;

/// Opaque handle to a texture owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque handle to a linked shader program owned by a backend.
///
/// Backends never reuse ids, so a handle taken before a reload can be told
/// apart from the program that replaced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Location of a uniform inside one specific program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// A loaded texture and its pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Value uploaded to a shader uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2 { x: f32, y: f32 },
    Vec4 { x: f32, y: f32, z: f32, w: f32 },
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true when the two rectangles overlap (touching edges count).
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x + self.width < other.x
            || self.x > other.x + other.width
            || self.y + self.height < other.y
            || self.y > other.y + other.height)
    }
}

/// Everything a backend needs to put one textured quad on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Region of the texture to sample, in texels.
    pub src: Rect,
    /// Destination rectangle. `x`/`y` is where the origin lands.
    pub dest: Rect,
    /// Pivot inside the destination rectangle, in pixels from its top-left.
    pub origin: Vec2,
    /// Vertex alpha multiplier in `[0, 1]`.
    pub opacity: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl DrawParams {
    /// Top-left corner of the quad on screen after applying the origin.
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.dest.x - self.origin.x, self.dest.y - self.origin.y)
    }
}

/// Source code of a shader program, keyed by a stable name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    /// Key used by the [`ShaderStore`](crate::resources::shaderstore::ShaderStore).
    pub key: String,
    /// Vertex stage. `None` selects the backend's default vertex shader.
    pub vertex: Option<String>,
    /// Fragment stage.
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(key: impl Into<String>, vertex: Option<String>, fragment: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            vertex,
            fragment: fragment.into(),
        }
    }

    /// Read a fragment (and optional vertex) shader from disk.
    pub fn from_files(
        key: impl Into<String>,
        vertex: Option<&Path>,
        fragment: &Path,
    ) -> Result<Self, String> {
        let vertex = match vertex {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read vertex shader {:?}: {}", path, e))?,
            ),
            None => None,
        };
        let fragment = std::fs::read_to_string(fragment)
            .map_err(|e| format!("Failed to read fragment shader {:?}: {}", fragment, e))?;
        Ok(Self::new(key, vertex, fragment))
    }
}

/// Capabilities a host renderer exposes to sprites.
///
/// All calls happen on the render thread between [`begin_frame`] and
/// [`end_frame`] except loading and compiling, which may happen at any time.
///
/// [`begin_frame`]: RenderBackend::begin_frame
/// [`end_frame`]: RenderBackend::end_frame
pub trait RenderBackend {
    /// Decode an image file into a new texture.
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, String>;

    /// Compile and link a shader program.
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String>;

    /// Look up a uniform by name. `None` if the program does not declare it.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Release a program. Unknown ids are ignored.
    fn unload_program(&mut self, program: ProgramId);

    /// Bind a program for subsequent uniform uploads and draws. `None` restores
    /// the default pipeline.
    fn bind_program(&mut self, program: Option<ProgramId>);

    /// The currently bound program.
    fn bound_program(&self) -> Option<ProgramId>;

    /// Upload a uniform value to the bound program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Draw a textured quad with the bound program.
    fn draw_texture(&mut self, texture: TextureId, params: &DrawParams);

    /// Start a frame and clear the target to `clear` (RGBA8).
    fn begin_frame(&mut self, clear: [u8; 4]);

    /// Finish the frame and present it.
    fn end_frame(&mut self);
}
