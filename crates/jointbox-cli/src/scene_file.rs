//! TOML scene files.
//!
//! ```toml
//! [units]
//! length_format = "decimal"
//! length_unit = "centimeter"
//!
//! [[groups]]
//! name = "Floor"
//! min = [-50.0, -50.0, -1.0]
//! max = [50.0, 50.0, 0.0]
//!
//! [[groups.materials]]
//! face = "+Z"
//! color = [140, 50, 140]
//! alpha = 0.4
//!
//! [groups.attributes.dynamic_attributes]
//! lenx = 100.0
//!
//! [[faces]]
//! corners = [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 2.0, 0.0], [0.0, 2.0, 0.0]]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use jointbox::primitives::build_box;
use jointbox::scene::{AttributeValue, Material};
use jointbox::{EntityId, FaceDirection, MemoryScene, Point3, SceneMutation, UnitsOptions};
use serde::{Deserialize, Serialize};

/// Contents of a scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub units: UnitsOptions,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FaceRecord>,
}

/// An axis-aligned box group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub min: [f64; 3],
    pub max: [f64; 3],
    /// Name of the enclosing group; the first group with that name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<MaterialRecord>,
    /// Attribute dictionaries by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, BTreeMap<String, AttributeValue>>,
}

/// Paint on one face of a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub face: FaceDirection,
    pub color: [u8; 3],
    pub alpha: f32,
}

/// A loose rectangular face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub corners: [[f64; 3]; 4],
}

/// A scene file turned into a live scene.
pub struct LoadedScene {
    pub scene: MemoryScene,
    pub units: UnitsOptions,
    /// Loose faces in file order.
    pub faces: Vec<EntityId>,
}

impl SceneFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
        Ok(toml::from_str(&text)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build a scene from the records.
    pub fn load(&self) -> Result<LoadedScene> {
        let mut scene = MemoryScene::new();
        let mut ids = Vec::with_capacity(self.groups.len());
        for record in &self.groups {
            let solid = build_box(Point3::from(record.min), Point3::from(record.max))
                .map_err(|e| anyhow::anyhow!("group '{}': {e}", record.name))?;
            let entities = scene.add_box(None, &solid)?;
            scene.set_group_name(entities.group, &record.name)?;
            scene.set_group_description(entities.group, &record.description)?;
            for paint in &record.materials {
                let material = Material {
                    color: paint.color,
                    alpha: paint.alpha,
                };
                scene.set_face_material(entities.face(paint.face), material)?;
            }
            for (dictionary, entries) in &record.attributes {
                for (key, value) in entries {
                    scene.set_attribute(entities.group, dictionary, key, value.clone())?;
                }
            }
            ids.push(entities.group);
        }

        for (record, &id) in self.groups.iter().zip(&ids) {
            let Some(parent) = &record.parent else {
                continue;
            };
            let Some(index) = self.groups.iter().position(|g| &g.name == parent) else {
                anyhow::bail!("group '{}': unknown parent '{parent}'", record.name);
            };
            scene.set_parent(id, ids[index])?;
        }

        let mut faces = Vec::with_capacity(self.faces.len());
        for record in &self.faces {
            faces.push(scene.add_face(None, record.corners.map(Point3::from))?);
        }

        tracing::debug!(groups = ids.len(), faces = faces.len(), "scene loaded");
        Ok(LoadedScene {
            scene,
            units: self.units,
            faces,
        })
    }

    /// Records describing the current state of `scene`.
    pub fn capture(scene: &MemoryScene, units: UnitsOptions) -> Result<Self> {
        let summaries = scene.groups();
        let mut groups = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            let bounds = scene.group_bounds(summary.id)?;
            let parent = match scene.group_parent(summary.id)? {
                Some(p) => Some(scene.group_name(p)?.to_string()),
                None => None,
            };
            let mut materials = Vec::new();
            for &face in scene.group_faces(summary.id)? {
                if let Some(m) = scene.face_material(face)? {
                    materials.push(MaterialRecord {
                        face: scene.face_direction(face)?,
                        color: m.color,
                        alpha: m.alpha,
                    });
                }
            }
            materials.sort_by_key(|m| m.face);
            groups.push(GroupRecord {
                name: summary.name.clone(),
                description: scene.group_description(summary.id)?.to_string(),
                min: bounds.min.coords.into(),
                max: bounds.max.coords.into(),
                parent,
                materials,
                attributes: scene.attributes(summary.id)?.clone(),
            });
        }

        let mut faces = Vec::new();
        for id in scene.loose_faces() {
            let info = scene.face_info(id)?;
            faces.push(FaceRecord {
                corners: info.corners.map(|p| p.coords.into()),
            });
        }

        Ok(Self {
            units,
            groups,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointbox::{LengthFormat, LengthUnit};

    const SAMPLE: &str = r#"
        [units]
        length_format = "decimal"
        length_unit = "millimeter"

        [[groups]]
        name = "Floor"
        min = [-10.0, -10.0, -1.0]
        max = [10.0, 10.0, 0.0]

        [[groups]]
        name = "Post"
        min = [0.0, 0.0, 0.0]
        max = [1.0, 1.0, 4.0]
        parent = "Floor"

        [[faces]]
        corners = [[0.0, 0.0, 5.0], [2.0, 0.0, 5.0], [2.0, 2.0, 5.0], [0.0, 2.0, 5.0]]
    "#;

    #[test]
    fn test_load_sample() {
        let file: SceneFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(
            file.units,
            UnitsOptions::new(LengthFormat::Decimal, LengthUnit::Millimeter)
        );
        let loaded = file.load().unwrap();
        let groups = loaded.scene.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(
            loaded.scene.group_parent(groups[1].id).unwrap(),
            Some(groups[0].id)
        );
        assert_eq!(loaded.faces.len(), 1);
    }

    #[test]
    fn test_capture_preserves_records() {
        let file: SceneFile = toml::from_str(SAMPLE).unwrap();
        let loaded = file.load().unwrap();
        let captured = SceneFile::capture(&loaded.scene, loaded.units).unwrap();
        assert_eq!(captured, file);
    }

    #[test]
    fn test_paint_and_attributes_survive_a_save() {
        let mut loaded = SceneFile::default().load().unwrap();
        let joint = jointbox::create_joint(
            &mut loaded.scene,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 3.0, 4.0),
            &jointbox::ToolOptions::named("Sill"),
            &loaded.units,
            &mut jointbox::NullSink,
        )
        .unwrap();
        assert!(joint.configuration.is_empty());

        let saved = SceneFile::capture(&loaded.scene, loaded.units).unwrap();
        let text = toml::to_string_pretty(&saved).unwrap();
        let reread: SceneFile = toml::from_str(&text).unwrap();
        assert_eq!(reread, saved);

        let record = &reread.groups[0];
        assert_eq!(record.materials.len(), 6);
        assert_eq!(record.materials[0].face, FaceDirection::PosX);
        assert_eq!(record.materials[0].color, jointbox::materials::FREE.color);

        let restored = reread.load().unwrap();
        let group = restored.scene.groups()[0].id;
        let bottom = restored.scene.group_faces(group).unwrap()[FaceDirection::NegZ.index()];
        assert_eq!(
            restored.scene.face_material(bottom),
            Ok(Some(jointbox::materials::FREE))
        );
        assert_eq!(
            restored.scene.attribute(group, "dynamic_attributes", "lenz"),
            Ok(Some(&AttributeValue::Number(4.0)))
        );
    }

    #[test]
    fn test_unknown_parent_is_an_error() {
        let file: SceneFile = toml::from_str(
            r#"
            [[groups]]
            name = "Post"
            min = [0.0, 0.0, 0.0]
            max = [1.0, 1.0, 1.0]
            parent = "Missing"
            "#,
        )
        .unwrap();
        assert!(file.load().is_err());
    }

    #[test]
    fn test_flat_group_is_an_error() {
        let file: SceneFile = toml::from_str(
            r#"
            [[groups]]
            name = "Sheet"
            min = [0.0, 0.0, 0.0]
            max = [1.0, 1.0, 0.0]
            "#,
        )
        .unwrap();
        let err = file.load().err().unwrap();
        assert!(err.to_string().contains("Sheet"));
    }
}
