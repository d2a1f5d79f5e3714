use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::render::backend::{DrawParams, Rect, RenderBackend, TextureInfo};
use crate::resources::framecache::SpriteFrame;

/// Sprite is identified by a texture key, the region of that texture it shows
/// and its size in world units. The origin selects the pivot point (in pixels)
/// relative to the sprite's top-left used for placement when rendering.
///
/// This is the base draw contract: [`Sprite::draw`] submits one textured quad
/// with whatever shader program is bound on the backend.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub tex_key: String,
    pub texture: TextureInfo,
    /// Texture region, in texels.
    pub region: Rect,
    pub width: f32,
    pub height: f32,
    pub origin: Vec2,
    pub flip_h: bool,
    pub flip_v: bool,
    opacity: f32,
}

impl Sprite {
    /// Sprite showing a whole texture, pivoted at its center.
    pub fn from_texture(tex_key: impl Into<String>, texture: TextureInfo) -> Self {
        let (w, h) = (texture.width as f32, texture.height as f32);
        Self {
            tex_key: tex_key.into(),
            texture,
            region: Rect::new(0.0, 0.0, w, h),
            width: w,
            height: h,
            origin: Vec2::new(w * 0.5, h * 0.5),
            flip_h: false,
            flip_v: false,
            opacity: 1.0,
        }
    }

    /// Sprite showing one atlas frame, pivoted at its center.
    pub fn from_frame(frame: &SpriteFrame) -> Self {
        let mut sprite = Self::from_texture(frame.tex_key.clone(), frame.texture);
        sprite.set_frame(frame);
        sprite
    }

    /// Switch to another frame. Size and pivot follow the new frame.
    pub fn set_frame(&mut self, frame: &SpriteFrame) {
        self.tex_key.clone_from(&frame.tex_key);
        self.texture = frame.texture;
        self.region = frame.rect;
        self.width = frame.rect.width;
        self.height = frame.rect.height;
        self.origin = Vec2::new(self.width * 0.5, self.height * 0.5);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Screen-space rectangle covered when the origin sits at `position`.
    pub fn bounds(&self, position: Vec2) -> Rect {
        Rect::new(
            position.x - self.origin.x,
            position.y - self.origin.y,
            self.width,
            self.height,
        )
    }

    pub fn draw_params(&self, position: Vec2) -> DrawParams {
        DrawParams {
            src: self.region,
            dest: Rect::new(position.x, position.y, self.width, self.height),
            origin: self.origin,
            opacity: self.opacity,
            flip_h: self.flip_h,
            flip_v: self.flip_v,
        }
    }

    /// Submit the sprite with its own opacity.
    pub fn draw<B: RenderBackend>(&self, backend: &mut B, position: Vec2) {
        backend.draw_texture(self.texture.id, &self.draw_params(position));
    }
}
