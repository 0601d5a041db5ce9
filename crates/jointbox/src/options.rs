//! Tool parameters.

use jointbox_scene::EntityId;
use serde::{Deserialize, Serialize};

use crate::naming::GroupIndex;
use crate::ToolError;

/// Parameters a user supplies for a tool run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Name for the new group. Blank means the tool's default.
    pub name: String,
    /// Display name of the parent group, as listed by [`GroupIndex`].
    pub parent_group: Option<String>,
    /// Reverse the selected face before extruding.
    pub flip_z: bool,
}

impl ToolOptions {
    /// Options with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the parent group by display name.
    pub fn with_parent(mut self, parent_group: impl Into<String>) -> Self {
        self.parent_group = Some(parent_group.into());
        self
    }

    /// Set the flip flag.
    pub fn with_flip(mut self, flip_z: bool) -> Self {
        self.flip_z = flip_z;
        self
    }

    /// Resolve names against `index` and fill in defaults.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidOptions`] if the parent group is not in `index`.
    pub fn validate(
        &self,
        index: &GroupIndex,
        default_name: &str,
    ) -> Result<ValidatedOptions, ToolError> {
        let name = match self.name.trim() {
            "" => default_name.to_string(),
            _ => self.name.clone(),
        };
        let parent = match self.parent_group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(p) => Some(
                index
                    .resolve(p)
                    .ok_or_else(|| {
                        ToolError::InvalidOptions(format!("unknown parent group '{p}'"))
                    })?,
            ),
        };
        Ok(ValidatedOptions {
            name,
            parent,
            flip_z: self.flip_z,
        })
    }
}

/// [`ToolOptions`] checked against a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOptions {
    /// Group name.
    pub name: String,
    /// Resolved parent group.
    pub parent: Option<EntityId>,
    /// Reverse the selected face before extruding.
    pub flip_z: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointbox_math::Point3;
    use jointbox_primitives::build_box;
    use jointbox_scene::{MemoryScene, SceneMutation};

    fn scene_with_wall() -> (MemoryScene, EntityId) {
        let mut scene = MemoryScene::new();
        let solid = build_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
        let ents = scene.add_box(None, &solid).unwrap();
        scene.set_group_name(ents.group, "Wall").unwrap();
        (scene, ents.group)
    }

    #[test]
    fn test_defaults() {
        let v = ToolOptions::default()
            .validate(&GroupIndex::default(), "Joint")
            .unwrap();
        assert_eq!(v.name, "Joint");
        assert_eq!(v.parent, None);
        assert!(!v.flip_z);
    }

    #[test]
    fn test_parent_resolves() {
        let (scene, wall) = scene_with_wall();
        let index = GroupIndex::from_scene(&scene, None);
        let v = ToolOptions::named("Sill")
            .with_parent("Wall (1)")
            .validate(&index, "Joint")
            .unwrap();
        assert_eq!(v.name, "Sill");
        assert_eq!(v.parent, Some(wall));
    }

    #[test]
    fn test_blank_parent_is_none() {
        let (scene, _) = scene_with_wall();
        let index = GroupIndex::from_scene(&scene, None);
        let v = ToolOptions::named("Sill")
            .with_parent("  ")
            .validate(&index, "Joint")
            .unwrap();
        assert_eq!(v.parent, None);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let (scene, _) = scene_with_wall();
        let index = GroupIndex::from_scene(&scene, None);
        let err = ToolOptions::named("Sill")
            .with_parent("Wall")
            .validate(&index, "Joint")
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidOptions(_)));
    }

    #[test]
    fn test_deserialize_partial() {
        let opts: ToolOptions = serde_json::from_str(r#"{"flip_z": true}"#).unwrap();
        assert_eq!(opts, ToolOptions::default().with_flip(true));
    }
}
