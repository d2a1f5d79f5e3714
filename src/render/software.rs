//! CPU reference backend.
//!
//! Rasterizes textured quads into an RGBA8 canvas with nearest-neighbor
//! sampling and straight-alpha "source over" blending. Shader programs are
//! accepted as GLSL text: the `uniform` declarations of the fragment stage
//! define the location table, and the actual fragment work is done by a Rust
//! [`FragmentKernel`] registered under the program's key.
//!
//! Pixel output is deterministic, which makes this backend the oracle for the
//! rendering tests and the headless mode of the binary.

use std::path::Path;

use glam::Vec4;
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::render::backend::{
    DrawParams, ProgramId, RenderBackend, ShaderSource, TextureId, TextureInfo, UniformLocation,
    UniformValue,
};

/// Per-pixel fragment function: texel (straight RGBA in `[0, 1]`) to output color.
pub type FragmentKernel = fn(Vec4, &UniformView<'_>) -> Vec4;

/// Declared type of a uniform, as parsed from GLSL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Vec4,
    Sampler,
    Other,
}

impl UniformKind {
    fn from_glsl(ty: &str) -> Self {
        match ty {
            "float" => UniformKind::Float,
            "int" | "bool" => UniformKind::Int,
            "vec2" => UniformKind::Vec2,
            "vec4" => UniformKind::Vec4,
            "sampler2D" => UniformKind::Sampler,
            _ => UniformKind::Other,
        }
    }

    fn default_value(self) -> UniformValue {
        match self {
            UniformKind::Int | UniformKind::Sampler => UniformValue::Int(0),
            UniformKind::Vec2 => UniformValue::Vec2 { x: 0.0, y: 0.0 },
            UniformKind::Vec4 => UniformValue::Vec4 {
                x: 1.0,
                y: 1.0,
                z: 1.0,
                w: 1.0,
            },
            UniformKind::Float | UniformKind::Other => UniformValue::Float(0.0),
        }
    }

    fn accepts(self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (UniformKind::Float, UniformValue::Float(_))
                | (UniformKind::Int, UniformValue::Int(_))
                | (UniformKind::Sampler, UniformValue::Int(_))
                | (UniformKind::Vec2, UniformValue::Vec2 { .. })
                | (UniformKind::Vec4, UniformValue::Vec4 { .. })
                | (UniformKind::Other, _)
        )
    }
}

/// One declared uniform and its current value.
#[derive(Clone, Debug)]
pub struct UniformSlot {
    pub name: String,
    pub kind: UniformKind,
    pub value: UniformValue,
}

/// Read access to a program's uniforms from inside a kernel.
pub struct UniformView<'a> {
    slots: &'a [UniformSlot],
}

impl<'a> UniformView<'a> {
    pub fn new(slots: &'a [UniformSlot]) -> Self {
        Self { slots }
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.slots.iter().find(|s| s.name == name).map(|s| s.value)
    }

    /// Float value of `name`; ints are widened, anything else reads as 0.
    pub fn float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(UniformValue::Float(v)) => v,
            Some(UniformValue::Int(v)) => v as f32,
            _ => 0.0,
        }
    }

    /// Int value of `name`; floats are truncated, anything else reads as 0.
    pub fn int(&self, name: &str) -> i32 {
        match self.get(name) {
            Some(UniformValue::Int(v)) => v,
            Some(UniformValue::Float(v)) => v as i32,
            _ => 0,
        }
    }
}

/// Extract `uniform <type> <name>;` declarations from GLSL source.
pub fn parse_uniforms(source: &str) -> Vec<UniformSlot> {
    let mut slots = Vec::new();
    for line in source.lines() {
        let code = line.split("//").next().unwrap_or("").trim();
        let Some(decl) = code.strip_prefix("uniform ") else {
            continue;
        };
        let decl = decl.trim_end_matches(';');
        let mut parts = decl.split_whitespace();
        let (Some(ty), Some(rest)) = (parts.next(), parts.next()) else {
            continue;
        };
        let kind = UniformKind::from_glsl(ty);
        // `uniform float a, b;` declares several names
        for name in std::iter::once(rest)
            .chain(parts)
            .flat_map(|p| p.split(','))
            .map(|n| n.trim().trim_end_matches(';'))
            .filter(|n| !n.is_empty())
        {
            slots.push(UniformSlot {
                name: name.to_string(),
                kind,
                value: kind.default_value(),
            });
        }
    }
    slots
}

struct SoftProgram {
    key: String,
    slots: Vec<UniformSlot>,
    kernel: Option<FragmentKernel>,
}

/// CPU rasterizer implementing [`RenderBackend`].
pub struct SoftwareBackend {
    canvas: RgbaImage,
    textures: Vec<RgbaImage>,
    programs: FxHashMap<ProgramId, SoftProgram>,
    kernels: FxHashMap<String, FragmentKernel>,
    bound: Option<ProgramId>,
    next_program: u32,
}

impl SoftwareBackend {
    /// Create a backend with a transparent `width`x`height` canvas and the
    /// built-in tint kernel registered.
    pub fn new(width: u32, height: u32) -> Self {
        let mut backend = Self {
            canvas: RgbaImage::new(width, height),
            textures: Vec::new(),
            programs: FxHashMap::default(),
            kernels: FxHashMap::default(),
            bound: None,
            next_program: 1,
        };
        backend.register_kernel(
            crate::render::hsbtint::HSB_TINT_SHADER,
            crate::render::hsbtint::hsb_tint_kernel,
        );
        backend
    }

    /// Register the fragment kernel used by programs compiled under `key`.
    pub fn register_kernel(&mut self, key: impl Into<String>, kernel: FragmentKernel) {
        self.kernels.insert(key.into(), kernel);
    }

    /// Upload an in-memory image as a texture.
    pub fn create_texture(&mut self, image: RgbaImage) -> TextureInfo {
        let info = TextureInfo {
            id: TextureId(self.textures.len() as u32),
            width: image.width(),
            height: image.height(),
        };
        self.textures.push(image);
        info
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.canvas.get_pixel(x, y).0
    }

    /// Write the canvas to a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), String> {
        self.canvas
            .save(path)
            .map_err(|e| format!("Failed to save canvas to {:?}: {}", path, e))?;
        info!("Saved canvas to {:?}", path);
        Ok(())
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

fn to_unit(p: &Rgba<u8>) -> Vec4 {
    Vec4::new(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32) / 255.0
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Straight-alpha source-over.
fn blend_over(src: Vec4, dst: Vec4) -> Vec4 {
    let a = src.w + dst.w * (1.0 - src.w);
    if a <= 0.0 {
        return Vec4::ZERO;
    }
    let rgb = (src.truncate() * src.w + dst.truncate() * dst.w * (1.0 - src.w)) / a;
    rgb.extend(a)
}

impl RenderBackend for SoftwareBackend {
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, String> {
        let image = image::open(path)
            .map_err(|e| format!("Failed to load image {:?}: {}", path, e))?
            .to_rgba8();
        let info = self.create_texture(image);
        info!(
            "Loaded texture {:?} ({}x{}) as {:?}",
            path, info.width, info.height, info.id
        );
        Ok(info)
    }

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, String> {
        if source.fragment.trim().is_empty() {
            return Err(format!("Shader '{}' has an empty fragment stage", source.key));
        }
        let mut slots = parse_uniforms(&source.fragment);
        if let Some(vertex) = &source.vertex {
            for slot in parse_uniforms(vertex) {
                if !slots.iter().any(|s| s.name == slot.name) {
                    slots.push(slot);
                }
            }
        }
        let kernel = self.kernels.get(&source.key).copied();
        if kernel.is_none() {
            warn!(
                "No fragment kernel registered for shader '{}', drawing unshaded",
                source.key
            );
        }
        let id = ProgramId(self.next_program);
        self.next_program += 1;
        debug!(
            "Compiled shader '{}' as {:?} with {} uniforms",
            source.key,
            id,
            slots.len()
        );
        self.programs.insert(
            id,
            SoftProgram {
                key: source.key.clone(),
                slots,
                kernel,
            },
        );
        Ok(id)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)?
            .slots
            .iter()
            .position(|s| s.name == name)
            .map(|i| UniformLocation(i as i32))
    }

    fn unload_program(&mut self, program: ProgramId) {
        if let Some(p) = self.programs.remove(&program) {
            debug!("Unloaded shader '{}' ({:?})", p.key, program);
        }
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
        let program = self.bound.and_then(|id| self.programs.get_mut(&id));
        debug_assert!(program.is_some(), "set_uniform with no program bound");
        let Some(program) = program else {
            return;
        };
        let slot = usize::try_from(location.0)
            .ok()
            .and_then(|i| program.slots.get_mut(i));
        debug_assert!(slot.is_some(), "uniform location {:?} out of range", location);
        if let Some(slot) = slot {
            debug_assert!(
                slot.kind.accepts(&value),
                "uniform '{}' is {:?}, got {:?}",
                slot.name,
                slot.kind,
                value
            );
            slot.value = value;
        }
    }

    fn draw_texture(&mut self, texture: TextureId, params: &DrawParams) {
        let Some(tex) = self.textures.get(texture.0 as usize) else {
            warn!("draw_texture: unknown texture {:?}", texture);
            return;
        };
        let program = self.bound.and_then(|id| self.programs.get(&id));
        let (kernel, slots): (Option<FragmentKernel>, &[UniformSlot]) = match program {
            Some(p) => (p.kernel, &p.slots),
            None => (None, &[]),
        };
        let uniforms = UniformView::new(slots);

        let src = params.src;
        let dest = params.dest;
        if dest.width <= 0.0 || dest.height <= 0.0 || src.width <= 0.0 || src.height <= 0.0 {
            return;
        }
        let top_left = params.top_left();
        let x0 = top_left.x.floor().max(0.0) as i64;
        let y0 = top_left.y.floor().max(0.0) as i64;
        let x1 = ((top_left.x + dest.width).ceil() as i64).min(self.canvas.width() as i64);
        let y1 = ((top_left.y + dest.height).ceil() as i64).min(self.canvas.height() as i64);

        for py in y0..y1 {
            // sample at pixel centers
            let v = (py as f32 + 0.5 - top_left.y) / dest.height;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let v = if params.flip_v { 1.0 - v } else { v };
            let ty = (src.y + (v * src.height).floor()) as i64;
            for px in x0..x1 {
                let u = (px as f32 + 0.5 - top_left.x) / dest.width;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let u = if params.flip_h { 1.0 - u } else { u };
                let tx = (src.x + (u * src.width).floor()) as i64;
                if tx < 0 || ty < 0 || tx >= tex.width() as i64 || ty >= tex.height() as i64 {
                    continue;
                }
                let texel = to_unit(tex.get_pixel(tx as u32, ty as u32));
                let mut color = match kernel {
                    Some(k) => k(texel, &uniforms),
                    None => texel,
                };
                color.w *= params.opacity.clamp(0.0, 1.0);

                let dst = self.canvas.get_pixel_mut(px as u32, py as u32);
                let out = blend_over(color, to_unit(dst));
                *dst = Rgba([to_byte(out.x), to_byte(out.y), to_byte(out.z), to_byte(out.w)]);
            }
        }
    }

    fn begin_frame(&mut self, clear: [u8; 4]) {
        for p in self.canvas.pixels_mut() {
            *p = Rgba(clear);
        }
    }

    fn end_frame(&mut self) {}
}
