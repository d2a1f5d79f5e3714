//! Engine systems.
//!
//! Submodules overview
//! - [`render`] – z-sorted, culled drawing of plain and tinted sprites
//! - [`shaderreload`] – swap a shader program and rebind tinted sprites

pub mod render;
pub mod shaderreload;
