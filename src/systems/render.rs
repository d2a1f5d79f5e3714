use bevy_ecs::prelude::*;
use log::warn;

use crate::components::mapposition::MapPosition;
use crate::components::sprite::Sprite;
use crate::components::tintablesprite::TintableSprite;
use crate::components::zindex::ZIndex;
use crate::render::backend::RenderBackend;
use crate::render::context::RenderContext;
use crate::resources::gameconfig::GameConfig;
use crate::resources::screensize::ScreenSize;
use crate::resources::shaderstore::ShaderStore;

enum Drawable<'w> {
    Plain(&'w Sprite),
    Tinted(&'w TintableSprite),
}

/// Draw every sprite entity into one frame.
///
/// Entities need a [`MapPosition`] and a [`ZIndex`] plus either a [`Sprite`] or
/// a [`TintableSprite`]. Sprites whose bounds miss the [`ScreenSize`] rectangle
/// are culled; the rest are drawn from lowest to highest z. The frame is
/// cleared to [`GameConfig::clear_color`] when a config is present.
///
/// The backend is passed in rather than stored in the world because real GPU
/// handles are tied to the main thread.
pub fn render_pass<B: RenderBackend>(world: &mut World, backend: &mut B) {
    let mut plain = world.query_filtered::<(&Sprite, &MapPosition, &ZIndex), Without<TintableSprite>>();
    let mut tinted = world.query::<(&TintableSprite, &MapPosition, &ZIndex)>();
    let world: &World = world;

    let clear = world
        .get_resource::<GameConfig>()
        .map(|c| c.clear_color)
        .unwrap_or([0, 0, 0, 0]);
    let view = world.get_resource::<ScreenSize>().map(|s| s.rect());
    let Some(shaders) = world.get_resource::<ShaderStore>() else {
        warn!("render_pass: no ShaderStore resource, skipping frame");
        return;
    };

    let visible = |s: &Sprite, p: &MapPosition| view.is_none_or(|v| s.bounds(p.pos).overlaps(&v));

    let mut to_draw: Vec<(ZIndex, MapPosition, Drawable<'_>)> = plain
        .iter(world)
        .filter(|(s, p, _)| visible(*s, *p))
        .map(|(s, p, z)| (*z, *p, Drawable::Plain(s)))
        .chain(
            tinted
                .iter(world)
                .filter(|(t, p, _)| visible(&t.sprite, *p))
                .map(|(t, p, z)| (*z, *p, Drawable::Tinted(t))),
        )
        .collect();

    // stable: equal z keeps query order
    to_draw.sort_by_key(|(z, _, _)| *z);

    backend.begin_frame(clear);
    {
        let mut ctx = RenderContext::new(&mut *backend, shaders);
        for (_z, pos, drawable) in to_draw.iter() {
            match drawable {
                Drawable::Plain(sprite) => {
                    ctx.backend.bind_program(None);
                    sprite.draw(&mut *ctx.backend, pos.pos);
                }
                Drawable::Tinted(sprite) => sprite.draw(&mut ctx, pos.pos),
            }
        }
    }
    backend.end_frame();
}
