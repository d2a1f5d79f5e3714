//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! width = 320
//! height = 240
//! clear_color = 0,0,0,0
//!
//! [window]
//! width = 960
//! height = 720
//! target_fps = 60
//!
//! [tint]
//! perceptual_desaturation = true
//! fragment_shader = assets/shaders/my_tint.fs
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_RENDER_WIDTH: u32 = 320;
const DEFAULT_RENDER_HEIGHT: u32 = 240;
const DEFAULT_WINDOW_WIDTH: u32 = 960;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CLEAR_COLOR: [u8; 4] = [0, 0, 0, 0];
const DEFAULT_PERCEPTUAL_DESATURATION: bool = true;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
///
/// Stores render resolution, window settings and tint defaults.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Internal render width in pixels.
    pub render_width: u32,
    /// Internal render height in pixels.
    pub render_height: u32,
    /// Color the frame is cleared to (RGBA8).
    pub clear_color: [u8; 4],
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Initial desaturation mode of new tinted sprites.
    pub perceptual_desaturation: bool,
    /// Fragment shader replacing the built-in tint program.
    pub fragment_shader: Option<PathBuf>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `r,g,b,a` with each channel in `0..=255`.
fn parse_color(value: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    let mut parts = value.split(',');
    for channel in out.iter_mut() {
        *channel = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            clear_color: DEFAULT_CLEAR_COLOR,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            perceptual_desaturation: DEFAULT_PERCEPTUAL_DESATURATION,
            fragment_shader: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [render] section
        if let Some(width) = get_u32(&config, "render", "width") {
            self.render_width = width;
        }
        if let Some(height) = get_u32(&config, "render", "height") {
            self.render_height = height;
        }
        if let Some(color) = config.get("render", "clear_color") {
            match parse_color(&color) {
                Some(c) => self.clear_color = c,
                None => warn!("Ignoring invalid clear_color '{}'", color),
            }
        }

        // [window] section
        if let Some(width) = get_u32(&config, "window", "width") {
            self.window_width = width;
        }
        if let Some(height) = get_u32(&config, "window", "height") {
            self.window_height = height;
        }
        if let Some(fps) = get_u32(&config, "window", "target_fps") {
            self.target_fps = fps;
        }

        // [tint] section
        if let Some(perceptual) = config
            .getbool("tint", "perceptual_desaturation")
            .ok()
            .flatten()
        {
            self.perceptual_desaturation = perceptual;
        }
        if let Some(path) = config.get("tint", "fragment_shader") {
            let path = path.trim();
            self.fragment_shader = (!path.is_empty()).then(|| PathBuf::from(path));
        }

        info!(
            "Loaded config: {}x{} render, {}x{} window, fps={}, perceptual={}, shader={:?}",
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.perceptual_desaturation,
            self.fragment_shader
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [render] section
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));
        let [r, g, b, a] = self.clear_color;
        config.set(
            "render",
            "clear_color",
            Some(format!("{},{},{},{}", r, g, b, a)),
        );

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        // [tint] section
        config.set(
            "tint",
            "perceptual_desaturation",
            Some(self.perceptual_desaturation.to_string()),
        );
        if let Some(path) = &self.fragment_shader {
            config.set(
                "tint",
                "fragment_shader",
                Some(path.to_string_lossy().into_owned()),
            );
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Set render resolution.
    pub fn set_render_size(&mut self, width: u32, height: u32) {
        self.render_width = width;
        self.render_height = height;
    }

    /// Get the render size.
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// Read an unsigned value that must fit in `u32`; anything else is ignored
/// with a warning.
fn get_u32(config: &Ini, section: &str, key: &str) -> Option<u32> {
    match config.getuint(section, key) {
        Ok(Some(v)) => match u32::try_from(v) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring out of range [{}] {} = {}", section, key, v);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring invalid [{}] {}: {}", section, key, e);
            None
        }
    }
}
