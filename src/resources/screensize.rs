//! Screen size resource.
//!
//! Stores the render target dimensions in pixels. The render pass culls
//! sprites against this rectangle.

use bevy_ecs::prelude::Resource;

use crate::render::backend::Rect;

/// Current render target size in pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl ScreenSize {
    /// The visible area, anchored at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.w as f32, self.h as f32)
    }
}
