//! Aberred Tint demo entry point.
//!
//! Renders a single tinted sprite, either headless into a PNG using the CPU
//! backend or, with the `raylib` feature, in a window where the hue slowly
//! cycles.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --image assets/hero.png --hue 200 --sat 0.7 --out hero.png
//! cargo run --release --features raylib -- --atlas assets/atlas.json --frame hero.png --window
//! ```

use std::path::PathBuf;

use aberredtint::components::mapposition::MapPosition;
use aberredtint::components::tintablesprite::TintableSprite;
use aberredtint::components::zindex::ZIndex;
use aberredtint::render::backend::{RenderBackend, ShaderSource};
use aberredtint::render::context::AssetContext;
use aberredtint::render::hsbtint::HSB_TINT_SHADER;
use aberredtint::render::software::SoftwareBackend;
use aberredtint::resources::framecache::FrameCache;
use aberredtint::resources::gameconfig::GameConfig;
use aberredtint::resources::screensize::ScreenSize;
use aberredtint::resources::shaderstore::ShaderStore;
use aberredtint::resources::texturestore::TextureStore;
use aberredtint::systems::render::render_pass;
use bevy_ecs::prelude::*;
use clap::Parser;

/// Aberred Tint: hue/saturation/brightness sprite tinting
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Image file to draw.
    #[arg(long, value_name = "PATH", conflicts_with = "atlas")]
    image: Option<PathBuf>,

    /// TexturePacker JSON atlas to load frames from.
    #[arg(long, value_name = "PATH", requires = "frame")]
    atlas: Option<PathBuf>,

    /// Frame name inside the atlas.
    #[arg(long, value_name = "NAME", requires = "atlas")]
    frame: Option<String>,

    /// Tint hue in degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    hue: f32,

    /// Tint saturation in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    sat: f32,

    /// Tint brightness offset in [-1, 1].
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    brt: f32,

    /// Desaturate toward the flat RGB average instead of perceptual luma.
    #[arg(long)]
    linear: bool,

    /// Draw the sprite untinted.
    #[arg(long)]
    no_tint: bool,

    /// Sprite opacity in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Output PNG for headless rendering.
    #[arg(long, value_name = "PATH", default_value = "tinted.png")]
    out: PathBuf,

    /// Open a window instead of rendering to a file (needs the `raylib` feature).
    #[arg(long)]
    window: bool,
}

/// Build the world resources and spawn the sprite described by the CLI.
fn setup<B: RenderBackend>(
    cli: &Cli,
    config: &GameConfig,
    backend: &mut B,
    screen: ScreenSize,
) -> Result<World, String> {
    let mut textures = TextureStore::new();
    let mut frames = FrameCache::new();
    let mut shaders = ShaderStore::new();

    if let Some(path) = &config.fragment_shader {
        let source = ShaderSource::from_files(HSB_TINT_SHADER, None, path)?;
        shaders.reload(backend, &source)?;
    }
    if let Some(atlas) = &cli.atlas {
        frames.add_frames_from_file(backend, &mut textures, atlas)?;
    }

    let mut assets = AssetContext {
        backend,
        textures: &mut textures,
        frames: &frames,
        shaders: &mut shaders,
    };
    let mut sprite = match (&cli.image, &cli.frame) {
        (Some(image), _) => {
            TintableSprite::from_file(&mut assets, image, cli.hue, cli.sat, cli.brt)
        }
        (None, Some(frame)) => {
            TintableSprite::from_atlas_frame(&mut assets, frame, cli.hue, cli.sat, cli.brt)
        }
        (None, None) => return Err("Nothing to draw: pass --image or --atlas/--frame".into()),
    }
    .map_err(|e| e.to_string())?;

    sprite.set_use_perceptual_desaturation(config.perceptual_desaturation && !cli.linear);
    sprite.set_tinting_enabled(!cli.no_tint);
    sprite.sprite.set_opacity(cli.opacity);

    let mut world = World::new();
    world.insert_resource(textures);
    world.insert_resource(frames);
    world.insert_resource(shaders);
    world.insert_resource(screen);
    world.insert_resource(config.clone());
    world.spawn((
        sprite,
        MapPosition::new(screen.w as f32 * 0.5, screen.h as f32 * 0.5),
        ZIndex(0),
    ));
    Ok(world)
}

/// The CPU backend shades with its built-in kernel, so a GLSL override only
/// matters for windowed runs.
fn headless_override_warning(config: &GameConfig) -> Option<String> {
    config.fragment_shader.as_ref().map(|path| {
        format!(
            "fragment_shader {:?} is ignored when rendering headless; the built-in tint is used",
            path
        )
    })
}

fn run_headless(cli: &Cli, config: &GameConfig) -> Result<(), String> {
    if let Some(msg) = headless_override_warning(config) {
        log::warn!("{}", msg);
    }
    let (w, h) = config.render_size();
    let mut backend = SoftwareBackend::new(w, h);
    let mut world = setup(cli, config, &mut backend, ScreenSize { w, h })?;
    render_pass(&mut world, &mut backend);
    backend.save_png(&cli.out)
}

#[cfg(feature = "raylib")]
fn run_window(cli: &Cli, config: &GameConfig) -> Result<(), String> {
    use aberredtint::render::raylibbackend::RaylibBackend;

    const HUE_DEGREES_PER_SECOND: f32 = 60.0;

    let (w, h) = config.window_size();
    let mut backend = RaylibBackend::new(w, h, "Aberred Tint", config.target_fps);
    let mut world = setup(cli, config, &mut backend, ScreenSize { w, h })?;

    while !backend.window_should_close() {
        let dt = backend.frame_time();
        // keep culling in step with window resizes
        let (w, h) = backend.screen_size();
        if *world.resource::<ScreenSize>() != (ScreenSize { w, h }) {
            world.insert_resource(ScreenSize { w, h });
        }
        let mut q = world.query::<&mut TintableSprite>();
        for mut sprite in q.iter_mut(&mut world) {
            let hue = sprite.tint_hue() + HUE_DEGREES_PER_SECOND * dt;
            sprite.set_tint_hue(hue);
        }
        render_pass(&mut world, &mut backend);
    }
    Ok(())
}

#[cfg(not(feature = "raylib"))]
fn run_window(_cli: &Cli, _config: &GameConfig) -> Result<(), String> {
    Err("This build has no window support; rebuild with --features raylib".into())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}, using defaults", e);
    }

    let result = if cli.window {
        run_window(&cli, &config)
    } else {
        run_headless(&cli, &config)
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
