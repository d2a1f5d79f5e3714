//! Shader hot reload.
//!
//! Swapping a program in the [`ShaderStore`] invalidates every uniform handle
//! resolved against the old program. [`reload_shader`] performs the swap and
//! immediately re-resolves the bindings of all [`TintableSprite`] entities so
//! the next frame draws with the new program.

use bevy_ecs::prelude::*;
use log::{error, info};

use crate::components::tintablesprite::TintableSprite;
use crate::render::backend::{ProgramId, RenderBackend, ShaderSource};
use crate::render::hsbtint::HSB_TINT_SHADER;
use crate::resources::shaderstore::ShaderStore;

/// Replace the program stored under `source.key` and rebind dependent sprites.
///
/// If compilation fails nothing changes and the error is returned. Every
/// tinted sprite is re-resolved, including ones a previous reload left
/// unbound. A sprite whose binding cannot be refreshed (the new source lacks a
/// uniform) drops its binding and draws untinted; its tinting flag is kept so
/// a later good reload restores the tint.
pub fn reload_shader<B: RenderBackend>(
    world: &mut World,
    backend: &mut B,
    source: &ShaderSource,
) -> Result<ProgramId, String> {
    let program = world
        .get_resource_mut::<ShaderStore>()
        .ok_or_else(|| "No ShaderStore resource".to_string())?
        .reload(backend, source)?;

    if source.key != HSB_TINT_SHADER {
        return Ok(program);
    }

    world.resource_scope(|world, mut shaders: Mut<ShaderStore>| {
        let mut query = world.query::<(Entity, &mut TintableSprite)>();
        let mut rebound = 0usize;
        for (entity, mut sprite) in query.iter_mut(world) {
            match sprite.refresh_binding(&mut shaders, backend) {
                Ok(()) => rebound += 1,
                Err(e) => error!("Unbinding tint on {:?}: {}", entity, e),
            }
        }
        info!("Rebound {} tinted sprites to {:?}", rebound, program);
    });

    Ok(program)
}
