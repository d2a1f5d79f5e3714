//! ECS resources made available to systems.
//!
//! Overview
//! - `framecache` – named regions of loaded texture atlases
//! - `gameconfig` – INI-backed render, window and tint settings
//! - `screensize` – render target dimensions used for culling
//! - `shaderstore` – compiled shader programs and cached uniform locations
//! - `texturestore` – loaded textures keyed by path
pub mod framecache;
pub mod gameconfig;
pub mod screensize;
pub mod shaderstore;
pub mod texturestore;
