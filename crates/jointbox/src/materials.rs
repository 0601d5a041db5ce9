//! Face colors by joint state.

use jointbox_classify::JointConfiguration;
use jointbox_primitives::FaceDirection;
use jointbox_scene::{BoxEntities, Material, SceneError, SceneMutation};

/// Translucent purple for faces resting against other geometry.
pub const JOINED: Material = Material {
    color: [140, 50, 140],
    alpha: 0.4,
};

/// Opaque orange for exposed faces.
pub const FREE: Material = Material::opaque([240, 140, 10]);

/// Material for a face in the given state.
pub fn material_for(joined: bool) -> Material {
    if joined {
        JOINED
    } else {
        FREE
    }
}

/// Paint every face of a box by its joint state.
pub fn paint_box<M: SceneMutation + ?Sized>(
    scene: &mut M,
    entities: &BoxEntities,
    config: &JointConfiguration,
) -> Result<(), SceneError> {
    for d in FaceDirection::ALL {
        scene.set_face_material(entities.face(d), material_for(config.is_joined(d)))?;
    }
    Ok(())
}
