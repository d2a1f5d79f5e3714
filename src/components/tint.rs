//! Hue/saturation/brightness tint parameters.
//!
//! [`HsbTint`] is the value half of a
//! [`TintableSprite`](crate::components::tintablesprite::TintableSprite). Every
//! setter normalizes its input so the values handed to the shader are always in
//! range:
//! - hue: degrees in `[0, 360)`, wrapped
//! - saturation: `[0, 1]`, clamped (0 = gray, 1 = full colorized saturation)
//! - brightness: `[-1, 1]`, clamped (added to every channel)
//!
//! Non-finite inputs fall back to the neutral value of the field.

pub const HUE_RANGE: f32 = 360.0;
pub const SAT_MIN: f32 = 0.0;
pub const SAT_MAX: f32 = 1.0;
pub const BRT_MIN: f32 = -1.0;
pub const BRT_MAX: f32 = 1.0;

/// Wrap a hue in degrees into `[0, 360)`.
pub fn wrap_hue(hue: f32) -> f32 {
    if !hue.is_finite() {
        return 0.0;
    }
    let wrapped = hue.rem_euclid(HUE_RANGE);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= HUE_RANGE { 0.0 } else { wrapped }
}

pub fn clamp_sat(sat: f32) -> f32 {
    if sat.is_nan() {
        return SAT_MAX;
    }
    sat.clamp(SAT_MIN, SAT_MAX)
}

pub fn clamp_brt(brt: f32) -> f32 {
    if brt.is_nan() {
        return 0.0;
    }
    brt.clamp(BRT_MIN, BRT_MAX)
}

/// Tint state of one sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HsbTint {
    enabled: bool,
    hue: f32,
    sat: f32,
    brt: f32,
    perceptual: bool,
}

impl HsbTint {
    pub fn new(hue: f32, sat: f32, brt: f32) -> Self {
        Self {
            enabled: true,
            hue: wrap_hue(hue),
            sat: clamp_sat(sat),
            brt: clamp_brt(brt),
            perceptual: true,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn set_hue(&mut self, hue: f32) {
        self.hue = wrap_hue(hue);
    }

    pub fn sat(&self) -> f32 {
        self.sat
    }

    pub fn set_sat(&mut self, sat: f32) {
        self.sat = clamp_sat(sat);
    }

    pub fn brt(&self) -> f32 {
        self.brt
    }

    pub fn set_brt(&mut self, brt: f32) {
        self.brt = clamp_brt(brt);
    }

    pub fn perceptual(&self) -> bool {
        self.perceptual
    }

    pub fn set_perceptual(&mut self, perceptual: bool) {
        self.perceptual = perceptual;
    }
}

impl Default for HsbTint {
    /// Red hue at full saturation and unchanged brightness.
    fn default() -> Self {
        Self::new(0.0, SAT_MAX, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_in_range_values() {
        let t = HsbTint::new(200.0, 0.25, -0.5);
        assert_eq!(t.hue(), 200.0);
        assert_eq!(t.sat(), 0.25);
        assert_eq!(t.brt(), -0.5);
        assert!(t.enabled());
        assert!(t.perceptual());
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(wrap_hue(400.0), 40.0);
        assert_eq!(wrap_hue(-10.0), 350.0);
        assert_eq!(wrap_hue(360.0), 0.0);
        assert_eq!(wrap_hue(720.0), 0.0);
        let tiny = wrap_hue(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(wrap_hue(f32::NAN), 0.0);
        assert_eq!(wrap_hue(f32::INFINITY), 0.0);
        assert_eq!(clamp_sat(f32::NAN), 1.0);
        assert_eq!(clamp_brt(f32::NAN), 0.0);
        assert_eq!(clamp_brt(f32::NEG_INFINITY), -1.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut t = HsbTint::default();
        t.set_sat(3.0);
        assert_eq!(t.sat(), 1.0);
        t.set_sat(-1.0);
        assert_eq!(t.sat(), 0.0);
        t.set_brt(2.0);
        assert_eq!(t.brt(), 1.0);
        t.set_brt(-2.0);
        assert_eq!(t.brt(), -1.0);
        t.set_hue(-370.0);
        assert_eq!(t.hue(), 350.0);
    }

    #[test]
    fn test_flags() {
        let mut t = HsbTint::default();
        t.set_enabled(false);
        t.set_perceptual(false);
        assert!(!t.enabled());
        assert!(!t.perceptual());
    }

    #[test]
    fn test_copy_trait() {
        let t = HsbTint::new(10.0, 0.5, 0.0);
        let t2 = t;
        assert_eq!(t.hue(), 10.0);
        assert_eq!(t2.hue(), 10.0);
    }
}
