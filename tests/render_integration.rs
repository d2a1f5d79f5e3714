//! Render pass and shader reload integration tests.
//!
//! Builds a small bevy_ecs world with plain and tinted sprites and renders it
//! through the CPU backend.

use aberredtint::components::mapposition::MapPosition;
use aberredtint::components::sprite::Sprite;
use aberredtint::components::tintablesprite::TintableSprite;
use aberredtint::components::zindex::ZIndex;
use aberredtint::render::backend::{Rect, ShaderSource};
use aberredtint::render::context::AssetContext;
use aberredtint::render::hsbtint::HSB_TINT_SHADER;
use aberredtint::render::software::SoftwareBackend;
use aberredtint::resources::framecache::{FrameCache, SpriteFrame};
use aberredtint::resources::gameconfig::GameConfig;
use aberredtint::resources::screensize::ScreenSize;
use aberredtint::resources::shaderstore::ShaderStore;
use aberredtint::resources::texturestore::TextureStore;
use aberredtint::systems::render::render_pass;
use aberredtint::systems::shaderreload::reload_shader;
use bevy_ecs::prelude::*;
use image::{Rgba, RgbaImage};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Stores and backend for one test scene, turned into a world once sprites exist.
struct Scene {
    backend: SoftwareBackend,
    textures: TextureStore,
    frames: FrameCache,
    shaders: ShaderStore,
}

impl Scene {
    fn new() -> Self {
        let mut scene = Self {
            backend: SoftwareBackend::new(16, 16),
            textures: TextureStore::new(),
            frames: FrameCache::new(),
            shaders: ShaderStore::new(),
        };
        scene.add_solid("red", [255, 0, 0, 255]);
        scene.add_solid("blue", [0, 0, 255, 255]);
        scene
    }

    fn add_solid(&mut self, name: &str, color: [u8; 4]) {
        let texture = self
            .backend
            .create_texture(RgbaImage::from_pixel(4, 4, Rgba(color)));
        self.textures.insert(name, texture);
        self.frames.add_frame(
            name,
            SpriteFrame {
                tex_key: name.into(),
                texture,
                rect: Rect::new(0.0, 0.0, 4.0, 4.0),
            },
        );
    }

    fn tinted(&mut self, frame: &str, hue: f32) -> TintableSprite {
        let mut assets = AssetContext {
            backend: &mut self.backend,
            textures: &mut self.textures,
            frames: &self.frames,
            shaders: &mut self.shaders,
        };
        TintableSprite::from_atlas_frame(&mut assets, frame, hue, 1.0, 0.0).unwrap()
    }

    fn plain(&self, frame: &str) -> Sprite {
        Sprite::from_frame(self.frames.get(frame).unwrap())
    }

    fn into_world(self) -> (World, SoftwareBackend) {
        let mut world = World::new();
        world.insert_resource(self.textures);
        world.insert_resource(self.frames);
        world.insert_resource(self.shaders);
        world.insert_resource(ScreenSize { w: 16, h: 16 });
        (world, self.backend)
    }
}

// =============================================================================
// Render pass
// =============================================================================

#[test]
fn higher_z_draws_on_top() {
    let mut scene = Scene::new();
    let green = scene.tinted("red", 120.0);
    let blue = scene.plain("blue");
    let (mut world, mut backend) = scene.into_world();

    let tinted = world
        .spawn((green, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();
    let plain = world
        .spawn((blue, MapPosition::new(8.0, 8.0), ZIndex(5)))
        .id();

    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), BLUE);

    world.entity_mut(tinted).insert(ZIndex(10));
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), GREEN);

    world.entity_mut(plain).insert(ZIndex(20));
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), BLUE);
}

#[test]
fn plain_and_tinted_sprites_share_a_frame() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 240.0);
    let plain = scene.plain("red");
    let (mut world, mut backend) = scene.into_world();
    world.spawn((tinted, MapPosition::new(3.0, 3.0), ZIndex(0)));
    world.spawn((plain, MapPosition::new(12.0, 12.0), ZIndex(0)));

    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(3, 3), BLUE);
    // the plain sprite is not affected by the tint program
    assert_eq!(backend.pixel(12, 12), RED);
}

#[test]
fn offscreen_sprites_leave_canvas_untouched() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 0.0);
    let (mut world, mut backend) = scene.into_world();
    world.spawn((tinted, MapPosition::new(-50.0, -50.0), ZIndex(0)));

    render_pass(&mut world, &mut backend);
    assert!(backend.canvas().pixels().all(|p| p.0 == CLEAR));
}

#[test]
fn culling_follows_screen_size_updates() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    world.spawn((tinted, MapPosition::new(12.0, 12.0), ZIndex(0)));

    // a smaller view culls the sprite even though the canvas could show it
    world.insert_resource(ScreenSize { w: 8, h: 8 });
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(12, 12), CLEAR);

    world.insert_resource(ScreenSize { w: 16, h: 16 });
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(12, 12), GREEN);
}

#[test]
fn frame_clears_to_config_color() {
    let scene = Scene::new();
    let (mut world, mut backend) = scene.into_world();
    let mut config = GameConfig::new();
    config.clear_color = [1, 2, 3, 255];
    world.insert_resource(config);

    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(0, 0), [1, 2, 3, 255]);
    assert_eq!(backend.pixel(15, 15), [1, 2, 3, 255]);
}

#[test]
fn tint_changes_through_the_world_show_next_frame() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 0.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();

    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), RED);

    world
        .get_mut::<TintableSprite>(e)
        .unwrap()
        .set_tint_hue(120.0);
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), GREEN);

    world
        .get_mut::<TintableSprite>(e)
        .unwrap()
        .set_tinting_enabled(false);
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), RED);
}

// =============================================================================
// Shader reload
// =============================================================================

#[test]
fn reload_rebinds_tinted_sprites() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();
    let old = world.get::<TintableSprite>(e).unwrap().binding().unwrap().program;

    let new = reload_shader(&mut world, &mut backend, &ShaderSource::hsb_tint()).unwrap();
    assert_ne!(old, new);

    let sprite = world.get::<TintableSprite>(e).unwrap();
    assert_eq!(sprite.binding().unwrap().program, new);
    assert!(sprite.binding_is_current(world.resource::<ShaderStore>()));
    assert!(sprite.tinting_enabled());

    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), GREEN);
}

fn incomplete_tint_source() -> ShaderSource {
    ShaderSource::new(
        HSB_TINT_SHADER,
        None,
        "uniform float uTintHue;\nuniform float uTintSat;\nuniform int uPerceptualDesat;\nuniform float uOpacity;\n",
    )
}

#[test]
fn reload_without_uniform_draws_untinted() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();

    reload_shader(&mut world, &mut backend, &incomplete_tint_source()).unwrap();

    let sprite = world.get::<TintableSprite>(e).unwrap();
    assert!(sprite.binding().is_none());
    assert!(!sprite.binding_is_current(world.resource::<ShaderStore>()));
    // the user's flag is not touched
    assert!(sprite.tinting_enabled());
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), RED);
}

#[test]
fn good_reload_restores_tint_after_bad_one() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();

    reload_shader(&mut world, &mut backend, &incomplete_tint_source()).unwrap();
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), RED);

    let program = reload_shader(&mut world, &mut backend, &ShaderSource::hsb_tint()).unwrap();
    let sprite = world.get::<TintableSprite>(e).unwrap();
    assert!(sprite.tinting_enabled());
    assert_eq!(sprite.binding().unwrap().program, program);
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), GREEN);
}

#[test]
fn reenabling_tint_on_unbound_sprite_draws_untinted() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();

    reload_shader(&mut world, &mut backend, &incomplete_tint_source()).unwrap();
    {
        let mut sprite = world.get_mut::<TintableSprite>(e).unwrap();
        sprite.set_tinting_enabled(false);
        sprite.set_tinting_enabled(true);
    }
    // no stale handles reach the backend
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), RED);
}

#[test]
fn failed_reload_keeps_existing_binding() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 240.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();
    let before = world.get::<TintableSprite>(e).unwrap().binding().unwrap().program;

    let broken = ShaderSource::new(HSB_TINT_SHADER, None, "");
    assert!(reload_shader(&mut world, &mut backend, &broken).is_err());

    let sprite = world.get::<TintableSprite>(e).unwrap();
    assert_eq!(sprite.binding().unwrap().program, before);
    assert!(sprite.tinting_enabled());
    render_pass(&mut world, &mut backend);
    assert_eq!(backend.pixel(8, 8), BLUE);
}

#[test]
fn reload_of_other_key_leaves_sprites_alone() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    let e = world
        .spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)))
        .id();
    let before = world.get::<TintableSprite>(e).unwrap().binding().unwrap().program;

    let other = ShaderSource::new("outline", None, "uniform float uWidth;\n");
    reload_shader(&mut world, &mut backend, &other).unwrap();

    assert_eq!(
        world.get::<TintableSprite>(e).unwrap().binding().unwrap().program,
        before
    );
    assert!(world.resource::<ShaderStore>().contains("outline"));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "stale tint binding")]
fn draw_after_unsynced_reload_panics_in_debug() {
    let mut scene = Scene::new();
    let tinted = scene.tinted("red", 120.0);
    let (mut world, mut backend) = scene.into_world();
    world.spawn((tinted, MapPosition::new(8.0, 8.0), ZIndex(0)));

    // swap the program behind the sprites' back
    world
        .resource_mut::<ShaderStore>()
        .reload(&mut backend, &ShaderSource::hsb_tint())
        .unwrap();
    render_pass(&mut world, &mut backend);
}
