//! Attribute dictionaries written on created groups.

use jointbox_math::Vec3;
use jointbox_scene::{AttributeValue, EntityId, SceneError, SceneMutation};

use crate::units::UnitLabel;

/// Dictionary holding editable dimensions.
pub const DYNAMIC_ATTRIBUTES: &str = "dynamic_attributes";

/// Dictionary tagging objects created by these tools.
pub const OBJECT_ATTRIBUTES: &str = "db_extrusion_object_attributes";

/// Value of the `type` key in [`OBJECT_ATTRIBUTES`].
pub const OBJECT_TYPE: &str = "extr";

const AXES: [&str; 3] = ["x", "y", "z"];

/// Box dimensions in inches plus the label they are displayed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionAttributes {
    /// Size along X, Y and Z.
    pub lengths: [f64; 3],
    /// Display unit label.
    pub units: UnitLabel,
}

impl DimensionAttributes {
    /// Dimensions from box extents.
    pub fn from_extents(extents: &Vec3, units: UnitLabel) -> Self {
        Self {
            lengths: [extents.x, extents.y, extents.z],
            units,
        }
    }

    /// Key/value pairs for [`DYNAMIC_ATTRIBUTES`].
    ///
    /// For each axis: `len<axis>` (inches), `_len<axis>_access` and
    /// `_len<axis>_units`.
    pub fn entries(&self) -> Vec<(String, AttributeValue)> {
        let mut out = Vec::with_capacity(9);
        for (axis, length) in AXES.iter().zip(self.lengths) {
            out.push((format!("len{axis}"), length.into()));
        }
        for axis in AXES {
            out.push((format!("_len{axis}_access"), "TEXTBOX".into()));
        }
        for axis in AXES {
            out.push((format!("_len{axis}_units"), self.units.as_str().into()));
        }
        out
    }
}

/// Write dimension and object-type attributes on `group`.
pub fn write_box_attributes<M: SceneMutation + ?Sized>(
    scene: &mut M,
    group: EntityId,
    dimensions: &DimensionAttributes,
) -> Result<(), SceneError> {
    for (key, value) in dimensions.entries() {
        scene.set_attribute(group, DYNAMIC_ATTRIBUTES, &key, value)?;
    }
    scene.set_attribute(group, OBJECT_ATTRIBUTES, "type", OBJECT_TYPE.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointbox_math::Point3;
    use jointbox_primitives::build_box;
    use jointbox_scene::MemoryScene;

    #[test]
    fn test_entries_layout() {
        let dims =
            DimensionAttributes::from_extents(&Vec3::new(1.0, 2.0, 3.0), UnitLabel::Centimeters);
        let entries = dims.entries();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[0], ("lenx".to_string(), AttributeValue::Number(1.0)));
        assert_eq!(entries[2], ("lenz".to_string(), AttributeValue::Number(3.0)));
        let text = |key: &str, value: &str| (key.to_string(), AttributeValue::Text(value.into()));
        assert_eq!(entries[4], text("_leny_access", "TEXTBOX"));
        assert_eq!(entries[8], text("_lenz_units", "CM"));
    }

    #[test]
    fn test_write_box_attributes() {
        let mut scene = MemoryScene::new();
        let solid = build_box(Point3::origin(), Point3::new(4.0, 5.0, 6.0)).unwrap();
        let ents = scene.add_box(None, &solid).unwrap();
        let dims = DimensionAttributes::from_extents(&solid.extents(), UnitLabel::Inches);
        write_box_attributes(&mut scene, ents.group, &dims).unwrap();

        assert_eq!(
            scene.attribute(ents.group, DYNAMIC_ATTRIBUTES, "leny"),
            Ok(Some(&AttributeValue::Number(5.0)))
        );
        assert_eq!(
            scene.attribute(ents.group, DYNAMIC_ATTRIBUTES, "_lenx_units"),
            Ok(Some(&AttributeValue::Text("INCHES".into())))
        );
        assert_eq!(
            scene.attribute(ents.group, OBJECT_ATTRIBUTES, "type"),
            Ok(Some(&AttributeValue::Text("extr".into())))
        );
    }
}
