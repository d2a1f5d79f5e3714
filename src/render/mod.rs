//! Rendering seam between sprites and the host graphics API.
//!
//! - [`backend`] – the [`RenderBackend`](backend::RenderBackend) trait and handle types
//! - [`context`] – borrow bundles passed to sprites
//! - [`hsbtint`] – the tint program (GLSL source and CPU kernel)
//! - [`software`] – deterministic CPU rasterizer
//! - `raylibbackend` – raylib adapter (feature `raylib`)

pub mod backend;
pub mod context;
pub mod hsbtint;
#[cfg(feature = "raylib")]
pub mod raylibbackend;
pub mod software;
