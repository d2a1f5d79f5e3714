//! The hue/saturation/brightness tint program.
//!
//! The GLSL source in `src/shaders/hsb_tint.fs` is what GPU backends compile.
//! [`hsb_tint_kernel`] is the same fragment stage written in Rust, which the
//! [`SoftwareBackend`](crate::render::software::SoftwareBackend) runs per pixel.

use glam::{Vec3, Vec4};

use crate::render::backend::ShaderSource;
use crate::render::software::UniformView;

/// ShaderStore key of the tint program.
pub const HSB_TINT_SHADER: &str = "hsb_tint";

pub const U_TINT_HUE: &str = "uTintHue";
pub const U_TINT_SAT: &str = "uTintSat";
pub const U_TINT_BRT: &str = "uTintBrt";
pub const U_PERCEPTUAL_DESAT: &str = "uPerceptualDesat";
pub const U_OPACITY: &str = "uOpacity";

/// Rec. 601 luma coefficients.
pub const PERCEPTUAL_LUMA: Vec3 = Vec3::new(0.299, 0.587, 0.114);

const HSB_TINT_FS: &str = include_str!("../shaders/hsb_tint.fs");

impl ShaderSource {
    /// The built-in tint program.
    pub fn hsb_tint() -> Self {
        ShaderSource::new(HSB_TINT_SHADER, None, HSB_TINT_FS)
    }
}

/// Convert RGB in `[0, 1]` to HSB with hue in `[0, 1)`.
pub fn rgb_to_hsb(c: Vec3) -> Vec3 {
    let max = c.max_element();
    let min = c.min_element();
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h = if delta <= 0.0 {
        0.0
    } else if max == c.x {
        ((c.y - c.z) / delta).rem_euclid(6.0) / 6.0
    } else if max == c.y {
        ((c.z - c.x) / delta + 2.0) / 6.0
    } else {
        ((c.x - c.y) / delta + 4.0) / 6.0
    };
    Vec3::new(h, s, max)
}

/// Convert HSB (hue in turns) back to RGB.
pub fn hsb_to_rgb(c: Vec3) -> Vec3 {
    let (h, s, v) = (c.x.rem_euclid(1.0), c.y, c.z);
    let h6 = h * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as i32 % 6 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

/// Gray level of `c`, weighted or flat.
pub fn luminance(c: Vec3, perceptual: bool) -> f32 {
    if perceptual {
        c.dot(PERCEPTUAL_LUMA)
    } else {
        (c.x + c.y + c.z) / 3.0
    }
}

/// Apply the tint to one RGB color.
///
/// `hue` is in degrees, `sat` in `[0, 1]`, `brt` in `[-1, 1]`.
pub fn colorize(rgb: Vec3, hue: f32, sat: f32, brt: f32, perceptual: bool) -> Vec3 {
    let hsb = rgb_to_hsb(rgb);
    let colorized = hsb_to_rgb(Vec3::new(hue / 360.0, hsb.y, hsb.z));
    let gray = Vec3::splat(luminance(colorized, perceptual));
    (gray.lerp(colorized, sat) + Vec3::splat(brt)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Fragment stage of the tint program for the software backend.
pub fn hsb_tint_kernel(texel: Vec4, uniforms: &UniformView<'_>) -> Vec4 {
    let rgb = colorize(
        texel.truncate(),
        uniforms.float(U_TINT_HUE),
        uniforms.float(U_TINT_SAT),
        uniforms.float(U_TINT_BRT),
        uniforms.int(U_PERCEPTUAL_DESAT) != 0,
    );
    rgb.extend(texel.w * uniforms.float(U_OPACITY))
}
