//! Draw order component.

use bevy_ecs::prelude::Component;

/// Painter's order: the render pass draws lower values first, so higher
/// values end up on top. Ties keep no particular order.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);
