//! Sprite rendered through the hue/saturation/brightness tint shader.
//!
//! A [`TintableSprite`] composes a base [`Sprite`] with [`HsbTint`] parameters
//! and a [`TintBinding`]: the five uniform locations of the tint program,
//! resolved once at construction. Each draw pushes the current tint values
//! through those locations and delegates the quad to the base sprite.
//!
//! # Example
//! ```ignore
//! let mut assets = AssetContext { backend: &mut backend, textures: &mut textures,
//!                                 frames: &frames, shaders: &mut shaders };
//! let mut sprite = TintableSprite::from_atlas_frame(&mut assets, "hero.png", 200.0, 0.8, 0.0)?;
//! sprite.set_use_perceptual_desaturation(false);
//! sprite.draw(&mut RenderContext::new(&mut backend, &shaders), Vec2::new(64.0, 64.0));
//! ```

use std::path::Path;

use bevy_ecs::prelude::Component;
use glam::Vec2;
use log::debug;

use crate::components::sprite::Sprite;
use crate::components::tint::HsbTint;
use crate::error::TintError;
use crate::render::backend::{ProgramId, RenderBackend, ShaderSource, UniformLocation, UniformValue};
use crate::render::context::{AssetContext, RenderContext};
use crate::render::hsbtint::{
    HSB_TINT_SHADER, U_OPACITY, U_PERCEPTUAL_DESAT, U_TINT_BRT, U_TINT_HUE, U_TINT_SAT,
};
use crate::resources::framecache::FrameCache;
use crate::resources::shaderstore::ShaderStore;

/// Uniform handles of the tint program, valid only while `program` is current
/// in the [`ShaderStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TintBinding {
    pub program: ProgramId,
    pub hue: UniformLocation,
    pub sat: UniformLocation,
    pub brt: UniformLocation,
    pub perceptual: UniformLocation,
    pub opacity: UniformLocation,
}

impl TintBinding {
    /// Resolve-or-compile the tint program and look up every uniform it must declare.
    pub fn resolve<B: RenderBackend>(
        shaders: &mut ShaderStore,
        backend: &mut B,
    ) -> Result<Self, TintError> {
        let program = shaders
            .resolve_or_compile(backend, &ShaderSource::hsb_tint())
            .map_err(|reason| TintError::ShaderCompile {
                shader: HSB_TINT_SHADER.to_string(),
                reason,
            })?;

        let mut lookup = |name: &'static str| {
            shaders
                .uniform_location(backend, program, name)
                .ok_or_else(|| TintError::ShaderUniformMissing {
                    shader: HSB_TINT_SHADER.to_string(),
                    uniform: name,
                })
        };

        Ok(Self {
            program,
            hue: lookup(U_TINT_HUE)?,
            sat: lookup(U_TINT_SAT)?,
            brt: lookup(U_TINT_BRT)?,
            perceptual: lookup(U_PERCEPTUAL_DESAT)?,
            opacity: lookup(U_OPACITY)?,
        })
    }
}

#[derive(Component, Clone, Debug)]
pub struct TintableSprite {
    /// Base sprite: texture, region, pivot, flips and opacity.
    pub sprite: Sprite,
    tint: HsbTint,
    /// `None` after a failed rebind; the sprite then draws untinted.
    binding: Option<TintBinding>,
}

impl TintableSprite {
    /// Build a tinted sprite from a named frame of an already loaded atlas.
    ///
    /// Fails with [`TintError::NotFound`] before touching any other resource
    /// when the frame is unknown.
    pub fn from_atlas_frame<B: RenderBackend>(
        assets: &mut AssetContext<'_, B>,
        frame_name: &str,
        hue: f32,
        sat: f32,
        brt: f32,
    ) -> Result<Self, TintError> {
        let frame = assets
            .frames
            .get(frame_name)
            .ok_or_else(|| TintError::NotFound(frame_name.to_string()))?;
        let sprite = Sprite::from_frame(frame);
        let binding = TintBinding::resolve(assets.shaders, assets.backend)?;
        debug!("Tinted sprite from frame '{}'", frame_name);
        Ok(Self {
            sprite,
            tint: HsbTint::new(hue, sat, brt),
            binding: Some(binding),
        })
    }

    /// Build a tinted sprite from an image file. The texture is shared with any
    /// other sprite loaded from the same path.
    pub fn from_file<B: RenderBackend>(
        assets: &mut AssetContext<'_, B>,
        path: impl AsRef<Path>,
        hue: f32,
        sat: f32,
        brt: f32,
    ) -> Result<Self, TintError> {
        let path = path.as_ref();
        let texture = assets
            .textures
            .load(assets.backend, path)
            .map_err(|reason| TintError::LoadFailure {
                path: path.to_path_buf(),
                reason,
            })?;
        let sprite = Sprite::from_texture(path.to_string_lossy(), texture);
        let binding = TintBinding::resolve(assets.shaders, assets.backend)?;
        debug!("Tinted sprite from file {:?}", path);
        Ok(Self {
            sprite,
            tint: HsbTint::new(hue, sat, brt),
            binding: Some(binding),
        })
    }

    pub fn tint(&self) -> &HsbTint {
        &self.tint
    }

    pub fn binding(&self) -> Option<&TintBinding> {
        self.binding.as_ref()
    }

    pub fn tinting_enabled(&self) -> bool {
        self.tint.enabled()
    }

    pub fn set_tinting_enabled(&mut self, enabled: bool) {
        self.tint.set_enabled(enabled);
    }

    pub fn tint_hue(&self) -> f32 {
        self.tint.hue()
    }

    /// Set the hue in degrees; wrapped into `[0, 360)`.
    pub fn set_tint_hue(&mut self, hue: f32) {
        self.tint.set_hue(hue);
    }

    pub fn tint_sat(&self) -> f32 {
        self.tint.sat()
    }

    /// Set the saturation blend; clamped to `[0, 1]`.
    pub fn set_tint_sat(&mut self, sat: f32) {
        self.tint.set_sat(sat);
    }

    pub fn tint_brt(&self) -> f32 {
        self.tint.brt()
    }

    /// Set the brightness offset; clamped to `[-1, 1]`.
    pub fn set_tint_brt(&mut self, brt: f32) {
        self.tint.set_brt(brt);
    }

    pub fn use_perceptual_desaturation(&self) -> bool {
        self.tint.perceptual()
    }

    pub fn set_use_perceptual_desaturation(&mut self, perceptual: bool) {
        self.tint.set_perceptual(perceptual);
    }

    /// Set hue, saturation and brightness in one call.
    pub fn set_tint(&mut self, hue: f32, sat: f32, brt: f32) {
        self.tint.set_hue(hue);
        self.tint.set_sat(sat);
        self.tint.set_brt(brt);
    }

    /// Back to hue 0, full saturation, no brightness offset. Flags are kept.
    pub fn reset_tint(&mut self) {
        self.set_tint(0.0, 1.0, 0.0);
    }

    /// Show another frame of the frame cache, keeping tint and binding.
    pub fn set_display_frame(&mut self, frames: &FrameCache, name: &str) -> Result<(), TintError> {
        let frame = frames
            .get(name)
            .ok_or_else(|| TintError::NotFound(name.to_string()))?;
        self.sprite.set_frame(frame);
        Ok(())
    }

    /// Re-resolve the uniform handles against the current tint program.
    ///
    /// Needed after the program was reloaded. On failure the binding is
    /// dropped and the sprite draws untinted until a later refresh succeeds;
    /// the tinting flag itself is left alone.
    pub fn refresh_binding<B: RenderBackend>(
        &mut self,
        shaders: &mut ShaderStore,
        backend: &mut B,
    ) -> Result<(), TintError> {
        match TintBinding::resolve(shaders, backend) {
            Ok(binding) => {
                self.binding = Some(binding);
                Ok(())
            }
            Err(e) => {
                self.binding = None;
                Err(e)
            }
        }
    }

    /// True when the cached handles belong to a live program.
    pub fn binding_is_current(&self, shaders: &ShaderStore) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| shaders.is_current(b.program))
    }

    /// Draw with the sprite origin at `position`.
    ///
    /// With tinting disabled, or without a binding, this is exactly
    /// [`Sprite::draw`] with no program bound. Otherwise the tint program is bound, the five uniforms are
    /// uploaded and opacity is applied by the shader instead of the vertex color.
    pub fn draw<B: RenderBackend>(&self, ctx: &mut RenderContext<'_, B>, position: Vec2) {
        let b = match &self.binding {
            Some(b) if self.tint.enabled() => b,
            _ => {
                ctx.backend.bind_program(None);
                self.sprite.draw(&mut *ctx.backend, position);
                return;
            }
        };
        debug_assert!(
            ctx.shaders.is_current(b.program),
            "stale tint binding: program {:?} is no longer current",
            b.program
        );

        ctx.backend.bind_program(Some(b.program));
        ctx.backend.set_uniform(b.hue, UniformValue::Float(self.tint.hue()));
        ctx.backend.set_uniform(b.sat, UniformValue::Float(self.tint.sat()));
        ctx.backend.set_uniform(b.brt, UniformValue::Float(self.tint.brt()));
        ctx.backend.set_uniform(
            b.perceptual,
            UniformValue::Int(self.tint.perceptual() as i32),
        );
        ctx.backend
            .set_uniform(b.opacity, UniformValue::Float(self.sprite.opacity()));

        let mut params = self.sprite.draw_params(position);
        params.opacity = 1.0;
        ctx.backend.draw_texture(self.sprite.texture.id, &params);
        ctx.backend.bind_program(None);
    }
}
