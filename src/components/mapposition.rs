//! World position component.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Where an entity's sprite origin is placed, in pixels.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}
