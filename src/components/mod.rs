//! ECS components for entities.
//!
//! Submodules overview:
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`sprite`] – base 2D sprite: texture region, pivot, flips, opacity
//! - [`tint`] – hue/saturation/brightness parameters with range normalization
//! - [`tintablesprite`] – sprite drawn through the tint shader
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod mapposition;
pub mod sprite;
pub mod tint;
pub mod tintablesprite;
pub mod zindex;
