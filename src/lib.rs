//! Aberred Tint library.
//!
//! A tintable sprite for 2D rendering: a base sprite drawn through a
//! hue/saturation/brightness shader whose parameters can change between any
//! two frames. Components, resources and systems are plain `bevy_ecs` types;
//! the graphics API sits behind [`render::backend::RenderBackend`].

pub mod components;
pub mod error;
pub mod render;
pub mod resources;
pub mod systems;
