//! Sprite frame cache resource.
//!
//! Holds named sub-regions of loaded texture atlases. Atlases are read from the
//! TexturePacker "JSON (hash)" export format:
//!
//! ```json
//! {
//!   "frames": {
//!     "hero_idle.png": {
//!       "frame": { "x": 0, "y": 0, "w": 32, "h": 48 },
//!       "rotated": false,
//!       "sourceSize": { "w": 32, "h": 48 }
//!     }
//!   },
//!   "meta": { "image": "characters.png" }
//! }
//! ```
//!
//! `meta.image` is resolved relative to the JSON file and loaded through the
//! [`TextureStore`].

use std::path::Path;

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::render::backend::{Rect, RenderBackend, TextureInfo};
use crate::resources::texturestore::TextureStore;

/// A named region of an atlas texture.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteFrame {
    /// Key of the atlas texture in the [`TextureStore`].
    pub tex_key: String,
    pub texture: TextureInfo,
    /// Region of the atlas, in texels.
    pub rect: Rect,
}

#[derive(Deserialize)]
struct AtlasFile {
    frames: FxHashMap<String, AtlasFrame>,
    meta: AtlasMeta,
}

#[derive(Deserialize)]
struct AtlasFrame {
    frame: AtlasRect,
    #[serde(default)]
    rotated: bool,
}

#[derive(Deserialize)]
struct AtlasRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Deserialize)]
struct AtlasMeta {
    image: String,
}

#[derive(Resource, Default)]
pub struct FrameCache {
    frames: FxHashMap<String, SpriteFrame>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an atlas JSON file and its image, adding every frame it describes.
    ///
    /// Returns the number of frames added.
    pub fn add_frames_from_file<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        textures: &mut TextureStore,
        json_path: impl AsRef<Path>,
    ) -> Result<usize, String> {
        let json_path = json_path.as_ref();
        let json = std::fs::read_to_string(json_path)
            .map_err(|e| format!("Failed to read atlas {:?}: {}", json_path, e))?;
        let atlas: AtlasFile = serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse atlas {:?}: {}", json_path, e))?;

        let image_path = json_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&atlas.meta.image);
        let texture = textures.load(backend, &image_path)?;
        let tex_key = image_path.to_string_lossy().into_owned();

        let added = self.insert_atlas(atlas, &tex_key, texture);
        info!("Loaded {} frames from atlas {:?}", added, json_path);
        Ok(added)
    }

    /// Parse atlas JSON whose texture is already uploaded.
    pub fn add_frames_from_str(
        &mut self,
        json: &str,
        tex_key: &str,
        texture: TextureInfo,
    ) -> Result<usize, String> {
        let atlas: AtlasFile =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse atlas: {}", e))?;
        Ok(self.insert_atlas(atlas, tex_key, texture))
    }

    fn insert_atlas(&mut self, atlas: AtlasFile, tex_key: &str, texture: TextureInfo) -> usize {
        let mut added = 0;
        for (name, frame) in atlas.frames {
            if frame.rotated {
                warn!("Skipping rotated frame '{}': rotated frames are not supported", name);
                continue;
            }
            let r = frame.frame;
            self.frames.insert(
                name,
                SpriteFrame {
                    tex_key: tex_key.to_string(),
                    texture,
                    rect: Rect::new(r.x, r.y, r.w, r.h),
                },
            );
            added += 1;
        }
        added
    }

    /// Add or replace a single frame.
    pub fn add_frame(&mut self, name: impl Into<String>, frame: SpriteFrame) {
        self.frames.insert(name.into(), frame);
    }

    pub fn get(&self, name: &str) -> Option<&SpriteFrame> {
        self.frames.get(name)
    }

    /// Drop every frame that points into the texture `tex_key`.
    pub fn remove_frames_from_texture(&mut self, tex_key: &str) {
        self.frames.retain(|_, f| f.tex_key != tex_key);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::TextureId;

    const ATLAS: &str = r#"{
        "frames": {
            "a.png": { "frame": { "x": 0, "y": 0, "w": 16, "h": 8 }, "rotated": false,
                       "sourceSize": { "w": 16, "h": 8 } },
            "b.png": { "frame": { "x": 16, "y": 0, "w": 4, "h": 4 } },
            "c.png": { "frame": { "x": 20, "y": 0, "w": 4, "h": 8 }, "rotated": true }
        },
        "meta": { "image": "atlas.png", "size": { "w": 32, "h": 8 } }
    }"#;

    fn texture() -> TextureInfo {
        TextureInfo {
            id: TextureId(0),
            width: 32,
            height: 8,
        }
    }

    #[test]
    fn test_parses_frames_and_skips_rotated() {
        let mut cache = FrameCache::new();
        let added = cache.add_frames_from_str(ATLAS, "atlas", texture()).unwrap();
        assert_eq!(added, 2);
        assert_eq!(cache.len(), 2);
        let b = cache.get("b.png").unwrap();
        assert_eq!(b.rect, Rect::new(16.0, 0.0, 4.0, 4.0));
        assert_eq!(b.tex_key, "atlas");
        assert!(cache.get("c.png").is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut cache = FrameCache::new();
        assert!(cache.add_frames_from_str("{ nope", "atlas", texture()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_frames_from_texture() {
        let mut cache = FrameCache::new();
        cache.add_frames_from_str(ATLAS, "atlas", texture()).unwrap();
        cache.add_frame(
            "other",
            SpriteFrame {
                tex_key: "other.png".into(),
                texture: texture(),
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            },
        );
        cache.remove_frames_from_texture("atlas");
        assert_eq!(cache.len(), 1);
        assert!(cache.get("other").is_some());
    }

    fn atlas_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("aberredtint_{}_{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_add_frames_from_file_loads_sibling_image() {
        use crate::render::software::SoftwareBackend;
        use image::{Rgba, RgbaImage};

        let dir = atlas_dir("atlas_ok");
        RgbaImage::from_pixel(32, 8, Rgba([255, 255, 255, 255]))
            .save(dir.join("atlas.png"))
            .unwrap();
        let json_path = dir.join("atlas.json");
        std::fs::write(&json_path, ATLAS).unwrap();

        let mut backend = SoftwareBackend::new(4, 4);
        let mut textures = TextureStore::new();
        let mut cache = FrameCache::new();
        let added = cache
            .add_frames_from_file(&mut backend, &mut textures, &json_path)
            .unwrap();
        assert_eq!(added, 2);

        let a = cache.get("a.png").unwrap();
        let b = cache.get("b.png").unwrap();
        assert_eq!(a.rect, Rect::new(0.0, 0.0, 16.0, 8.0));
        assert_eq!(b.rect, Rect::new(16.0, 0.0, 4.0, 4.0));
        assert_eq!(a.texture, b.texture);
        assert_eq!((a.texture.width, a.texture.height), (32, 8));

        let image_path = dir.join("atlas.png");
        let key = image_path.to_string_lossy();
        assert_eq!(a.tex_key, key);
        assert_eq!(textures.get(&*key), Some(a.texture));
        assert_eq!(textures.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_add_frames_from_file_errors() {
        use crate::render::software::SoftwareBackend;

        let mut backend = SoftwareBackend::new(4, 4);
        let mut textures = TextureStore::new();
        let mut cache = FrameCache::new();

        let missing_json = std::path::Path::new("/nonexistent/aberredtint/atlas.json");
        assert!(
            cache
                .add_frames_from_file(&mut backend, &mut textures, missing_json)
                .is_err()
        );

        // JSON present, image it names is not
        let dir = atlas_dir("atlas_no_image");
        let json_path = dir.join("atlas.json");
        std::fs::write(&json_path, ATLAS).unwrap();
        assert!(
            cache
                .add_frames_from_file(&mut backend, &mut textures, &json_path)
                .is_err()
        );
        assert!(cache.is_empty());
        assert!(textures.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
