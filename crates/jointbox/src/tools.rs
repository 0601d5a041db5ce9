//! The Labeled Joint and Extrusion Object operations.
//!
//! Each operation validates its input, then runs inside one scene
//! transaction. Any failure after the transaction starts aborts it, so the
//! scene is left as it was.

use jointbox_classify::{JointClassifier, JointConfiguration};
use jointbox_math::{Point3, Tolerance};
use jointbox_primitives::{build_box_with_tolerance, extrude_rectangle_with_tolerance, BoxSolid};
use jointbox_scene::{
    BoxEntities, EntityId, IsolationScope, LayerId, SceneError, SceneMutation, SceneQuery,
};

use crate::attributes::{write_box_attributes, DimensionAttributes};
use crate::events::{EventSink, GeometryEvent};
use crate::materials::paint_box;
use crate::naming::GroupIndex;
use crate::options::{ToolOptions, ValidatedOptions};
use crate::units::UnitsOptions;
use crate::ToolError;

/// Operation name and group description of a labeled joint.
pub const LABELED_JOINT: &str = "Labeled Joint";

/// Operation name and group description of an extrusion object.
pub const EXTRUSION_OBJECT: &str = "Extrusion Object";

/// Default name of a labeled joint.
pub const DEFAULT_JOINT_NAME: &str = "Joint";

/// Default name of an extrusion object.
pub const DEFAULT_EXTRUSION_NAME: &str = "Extrusion";

/// Name of the temporary layer used while classifying.
pub const ISOLATION_LAYER: &str = "jointbox isolation";

/// Result of [`create_joint`].
#[derive(Debug, Clone)]
pub struct JointOutcome {
    /// The new group and its faces.
    pub entities: BoxEntities,
    /// Group name.
    pub name: String,
    /// The box geometry.
    pub solid: BoxSolid,
    /// Which faces rest against existing geometry.
    pub configuration: JointConfiguration,
}

/// Result of [`extrude_face`].
#[derive(Debug, Clone)]
pub struct ExtrusionOutcome {
    /// The new group and its faces.
    pub entities: BoxEntities,
    /// Group name.
    pub name: String,
    /// The box geometry.
    pub solid: BoxSolid,
    /// Whether a loose source face was absorbed into the box.
    pub absorbed_source: bool,
}

/// Runs tool operations against a scene.
#[derive(Debug, Clone, Copy)]
pub struct Toolkit {
    /// Tolerance for geometry checks and classification.
    pub tolerance: Tolerance,
    /// Display units of the scene.
    pub units: UnitsOptions,
}

impl Toolkit {
    /// Create a toolkit with the default tolerance.
    pub fn new(units: UnitsOptions) -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            units,
        }
    }

    /// Build a labeled joint spanning `pt1` and `pt2`.
    ///
    /// The box is built and classified on a hidden isolation layer. Its
    /// faces are then colored by joint state, the group is named, tagged
    /// with its dimensions and nested under the chosen parent. On success a
    /// [`GeometryEvent::Finalized`] is emitted.
    ///
    /// # Errors
    ///
    /// - [`ToolError::Degenerate`] if the corners span no volume (the scene is
    ///   not touched);
    /// - [`ToolError::InvalidOptions`] if the parent group is unknown;
    /// - [`ToolError::Classify`] or [`ToolError::Scene`] if the scene fails,
    ///   after the operation has been rolled back.
    pub fn create_joint<S, E>(
        &self,
        scene: &mut S,
        pt1: Point3,
        pt2: Point3,
        options: &ToolOptions,
        sink: &mut E,
    ) -> Result<JointOutcome, ToolError>
    where
        S: SceneQuery + SceneMutation + ?Sized,
        E: EventSink + ?Sized,
    {
        let solid = build_box_with_tolerance(pt1, pt2, &self.tolerance)?;
        let options = options.validate(&GroupIndex::from_scene(scene, None), DEFAULT_JOINT_NAME)?;

        let outcome = transaction(scene, LABELED_JOINT, |scene| {
            let (entities, configuration) = self.place_and_classify(scene, &solid)?;
            self.finish_group(scene, &entities, &solid, &options, LABELED_JOINT)?;
            paint_box(scene, &entities, &configuration)?;
            Ok(JointOutcome {
                entities,
                name: options.name.clone(),
                solid: solid.clone(),
                configuration,
            })
        })?;

        tracing::info!(
            name = %outcome.name,
            joined = ?outcome.configuration.joined().collect::<Vec<_>>(),
            "labeled joint created"
        );
        sink.emit(GeometryEvent::Finalized {
            group: outcome.entities.group,
            name: outcome.name.clone(),
            description: LABELED_JOINT.to_string(),
        });
        Ok(outcome)
    }

    /// Extrude `face` by `height` display units into an extrusion object.
    ///
    /// The face must be an axis-aligned rectangle. It is pushed along its
    /// normal, or against it when `options.flip_z` is set. A loose face is
    /// absorbed into the new box; a face owned by a group stays in place.
    ///
    /// # Errors
    ///
    /// - [`ToolError::NoSelection`] if `face` is `None` or not a face;
    /// - [`ToolError::InvalidOptions`] if `height` is not finite or the parent
    ///   group is unknown;
    /// - [`ToolError::Degenerate`] if the face is not an axis-aligned
    ///   rectangle or the height is zero;
    /// - [`ToolError::Scene`] if the scene fails, after rollback.
    pub fn extrude_face<S, E>(
        &self,
        scene: &mut S,
        face: Option<EntityId>,
        height: f64,
        options: &ToolOptions,
        sink: &mut E,
    ) -> Result<ExtrusionOutcome, ToolError>
    where
        S: SceneQuery + SceneMutation + ?Sized,
        E: EventSink + ?Sized,
    {
        let face = face.ok_or(ToolError::NoSelection)?;
        let info = match scene.face_info(face) {
            Ok(info) => info,
            Err(SceneError::UnknownEntity | SceneError::WrongKind(_)) => {
                return Err(ToolError::NoSelection)
            }
            Err(e) => return Err(e.into()),
        };
        if !height.is_finite() {
            return Err(ToolError::InvalidOptions(format!("height {height} is not finite")));
        }
        let index = GroupIndex::from_scene(scene, None);
        let options = options.validate(&index, DEFAULT_EXTRUSION_NAME)?;

        let distance = self.units.to_internal(height);
        let solid = extrude_rectangle_with_tolerance(
            info.corners,
            distance,
            options.flip_z,
            &self.tolerance,
        )?;
        let absorb = info.group.is_none();

        let outcome = transaction(scene, EXTRUSION_OBJECT, |scene| {
            let entities = scene.add_box(None, &solid)?;
            if absorb {
                scene.erase_entity(face)?;
            }
            self.finish_group(scene, &entities, &solid, &options, EXTRUSION_OBJECT)?;
            Ok(ExtrusionOutcome {
                entities,
                name: options.name.clone(),
                solid: solid.clone(),
                absorbed_source: absorb,
            })
        })?;

        tracing::info!(name = %outcome.name, distance, "extrusion object created");
        sink.emit(GeometryEvent::Finalized {
            group: outcome.entities.group,
            name: outcome.name.clone(),
            description: EXTRUSION_OBJECT.to_string(),
        });
        Ok(outcome)
    }

    fn place_and_classify<S>(
        &self,
        scene: &mut S,
        solid: &BoxSolid,
    ) -> Result<(BoxEntities, JointConfiguration), ToolError>
    where
        S: SceneQuery + SceneMutation + ?Sized,
    {
        let mut scope = IsolationScope::acquire(scene, ISOLATION_LAYER)?;
        let layer: LayerId = scope.layer();
        let entities = scope.add_box(Some(layer), solid)?;
        let configuration = JointClassifier::new(self.tolerance).classify(solid, &mut scope)?;
        scope.release()?;
        Ok((entities, configuration))
    }

    fn finish_group<M: SceneMutation + ?Sized>(
        &self,
        scene: &mut M,
        entities: &BoxEntities,
        solid: &BoxSolid,
        options: &ValidatedOptions,
        description: &str,
    ) -> Result<(), ToolError> {
        let group = entities.group;
        scene.set_group_name(group, &options.name)?;
        scene.set_group_description(group, description)?;
        let dimensions = DimensionAttributes::from_extents(&solid.extents(), self.units.label());
        write_box_attributes(scene, group, &dimensions)?;
        if let Some(parent) = options.parent {
            scene.set_parent(group, parent)?;
        }
        Ok(())
    }
}

/// Build a labeled joint with default settings.
///
/// See [`Toolkit::create_joint`].
pub fn create_joint<S, E>(
    scene: &mut S,
    pt1: Point3,
    pt2: Point3,
    options: &ToolOptions,
    units: &UnitsOptions,
    sink: &mut E,
) -> Result<JointOutcome, ToolError>
where
    S: SceneQuery + SceneMutation + ?Sized,
    E: EventSink + ?Sized,
{
    Toolkit::new(*units).create_joint(scene, pt1, pt2, options, sink)
}

/// Extrude a face with default settings.
///
/// See [`Toolkit::extrude_face`].
pub fn extrude_face<S, E>(
    scene: &mut S,
    face: Option<EntityId>,
    height: f64,
    options: &ToolOptions,
    units: &UnitsOptions,
    sink: &mut E,
) -> Result<ExtrusionOutcome, ToolError>
where
    S: SceneQuery + SceneMutation + ?Sized,
    E: EventSink + ?Sized,
{
    Toolkit::new(*units).extrude_face(scene, face, height, options, sink)
}

/// Run `body` inside a scene operation, aborting it on error.
fn transaction<M, T>(
    scene: &mut M,
    name: &str,
    body: impl FnOnce(&mut M) -> Result<T, ToolError>,
) -> Result<T, ToolError>
where
    M: SceneMutation + ?Sized,
{
    scene.start_operation(name)?;
    match body(scene) {
        Ok(value) => {
            scene.commit_operation()?;
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(operation = name, error = %e, "operation aborted");
            if let Err(abort) = scene.abort_operation() {
                tracing::warn!(operation = name, error = %abort, "rollback failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use jointbox_math::Vec3;
    use jointbox_primitives::{build_box, FaceDirection};
    use jointbox_scene::{AttributeValue, FaceInfo, GroupSummary, Material, MemoryScene, RayHit};

    /// A memory scene whose rays start failing once a layer is revealed.
    struct FlakyScene {
        inner: MemoryScene,
        revealed: bool,
    }

    impl SceneQuery for FlakyScene {
        fn raycast(
            &self,
            origin: &Point3,
            direction: &Vec3,
        ) -> Result<Option<RayHit>, SceneError> {
            if self.revealed {
                return Err(SceneError::Unreachable("connection lost".into()));
            }
            self.inner.raycast(origin, direction)
        }

        fn create_isolated_layer(&mut self, name: &str) -> Result<LayerId, SceneError> {
            self.inner.create_isolated_layer(name)
        }

        fn set_layer_visibility(
            &mut self,
            layer: LayerId,
            visible: bool,
        ) -> Result<(), SceneError> {
            self.revealed |= visible;
            self.inner.set_layer_visibility(layer, visible)
        }

        fn remove_layer(&mut self, layer: LayerId) -> Result<(), SceneError> {
            self.inner.remove_layer(layer)
        }
    }

    impl SceneMutation for FlakyScene {
        fn start_operation(&mut self, name: &str) -> Result<(), SceneError> {
            self.inner.start_operation(name)
        }
        fn commit_operation(&mut self) -> Result<(), SceneError> {
            self.inner.commit_operation()
        }
        fn abort_operation(&mut self) -> Result<(), SceneError> {
            self.inner.abort_operation()
        }
        fn add_box(
            &mut self,
            layer: Option<LayerId>,
            solid: &BoxSolid,
        ) -> Result<BoxEntities, SceneError> {
            self.inner.add_box(layer, solid)
        }
        fn set_group_name(&mut self, group: EntityId, name: &str) -> Result<(), SceneError> {
            self.inner.set_group_name(group, name)
        }
        fn set_group_description(
            &mut self,
            group: EntityId,
            description: &str,
        ) -> Result<(), SceneError> {
            self.inner.set_group_description(group, description)
        }
        fn set_parent(&mut self, group: EntityId, parent: EntityId) -> Result<(), SceneError> {
            self.inner.set_parent(group, parent)
        }
        fn set_attribute(
            &mut self,
            group: EntityId,
            dictionary: &str,
            key: &str,
            value: AttributeValue,
        ) -> Result<(), SceneError> {
            self.inner.set_attribute(group, dictionary, key, value)
        }
        fn set_face_material(
            &mut self,
            face: EntityId,
            material: Material,
        ) -> Result<(), SceneError> {
            self.inner.set_face_material(face, material)
        }
        fn erase_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
            self.inner.erase_entity(entity)
        }
        fn groups(&self) -> Vec<GroupSummary> {
            self.inner.groups()
        }
        fn face_info(&self, face: EntityId) -> Result<FaceInfo, SceneError> {
            self.inner.face_info(face)
        }
    }

    #[test]
    fn test_query_fault_rolls_back() {
        let mut inner = MemoryScene::new();
        let floor = build_box(Point3::new(-5.0, -5.0, -1.0), Point3::new(5.0, 5.0, 0.0)).unwrap();
        inner.add_box(None, &floor).unwrap();
        let entity_count = inner.entity_count();
        let mut scene = FlakyScene {
            inner,
            revealed: false,
        };

        let err = create_joint(
            &mut scene,
            Point3::origin(),
            Point3::new(1.0, 1.0, 1.0),
            &ToolOptions::default(),
            &UnitsOptions::default(),
            &mut NullSink,
        )
        .unwrap_err();

        assert!(matches!(err, ToolError::Classify(_)));
        assert_eq!(scene.inner.entity_count(), entity_count);
        assert_eq!(scene.inner.layer_count(), 1);
        assert!(!scene.inner.in_operation());
    }

    #[test]
    fn test_degenerate_touches_nothing() {
        let mut scene = MemoryScene::new();
        let mut events = Vec::new();
        let err = create_joint(
            &mut scene,
            Point3::origin(),
            Point3::new(0.0, 5.0, 5.0),
            &ToolOptions::default(),
            &UnitsOptions::default(),
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::Degenerate(_)));
        assert_eq!(scene.entity_count(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_toolkit_tolerance_applies() {
        let toolkit = Toolkit {
            tolerance: Tolerance::new(0.5),
            units: UnitsOptions::default(),
        };
        let mut scene = MemoryScene::new();
        let err = toolkit
            .create_joint(
                &mut scene,
                Point3::origin(),
                Point3::new(5.0, 5.0, 0.25),
                &ToolOptions::default(),
                &mut NullSink,
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::Degenerate(_)));
    }

    #[test]
    fn test_joint_on_floor_colors_bottom() {
        let mut scene = MemoryScene::new();
        let floor = build_box(Point3::new(-5.0, -5.0, -1.0), Point3::new(5.0, 5.0, 0.0)).unwrap();
        scene.add_box(None, &floor).unwrap();

        let outcome = create_joint(
            &mut scene,
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 1.0, 0.0),
            &ToolOptions::default(),
            &UnitsOptions::default(),
            &mut NullSink,
        )
        .unwrap();

        assert_eq!(outcome.name, DEFAULT_JOINT_NAME);
        assert_eq!(
            outcome.configuration.joined().collect::<Vec<_>>(),
            vec![FaceDirection::NegZ]
        );
        let bottom = outcome.entities.face(FaceDirection::NegZ);
        let top = outcome.entities.face(FaceDirection::PosZ);
        assert_eq!(scene.face_material(bottom), Ok(Some(crate::materials::JOINED)));
        assert_eq!(scene.face_material(top), Ok(Some(crate::materials::FREE)));
        assert_eq!(scene.entity_layer(outcome.entities.group), Ok(scene.base_layer()));
    }
}
