//! In-memory scene implementing both scene ports.

use std::collections::BTreeMap;

use jointbox_math::{Point3, Tolerance, Vec3};
use jointbox_primitives::{Aabb3, BoxFace, BoxSolid, FaceDirection};
use slotmap::SlotMap;

use crate::ray::Ray;
use crate::{
    AttributeValue, BoxEntities, EntityId, FaceInfo, GroupSummary, LayerId, Material, RayHit,
    SceneError, SceneMutation, SceneQuery,
};

const BASE_LAYER_NAME: &str = "Layer0";

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    visible: bool,
}

#[derive(Debug, Clone)]
struct FaceEntity {
    face: BoxFace,
    layer: LayerId,
    group: Option<EntityId>,
    material: Option<Material>,
    sequence: u64,
}

#[derive(Debug, Clone)]
struct GroupEntity {
    name: String,
    description: String,
    layer: LayerId,
    faces: Vec<EntityId>,
    parent: Option<EntityId>,
    attributes: BTreeMap<String, BTreeMap<String, AttributeValue>>,
    sequence: u64,
}

#[derive(Debug, Clone)]
enum Entity {
    Face(FaceEntity),
    Group(GroupEntity),
}

#[derive(Debug, Clone)]
struct SceneState {
    layers: SlotMap<LayerId, Layer>,
    base_layer: LayerId,
    entities: SlotMap<EntityId, Entity>,
    next_sequence: u64,
}

/// A scene held entirely in memory.
///
/// Geometry is a set of axis-aligned rectangular faces, loose or grouped,
/// each on a layer. Ray queries follow these rules:
///
/// - only faces on visible layers (and in groups on visible layers) count;
/// - the nearest hit is the nearest face the ray meets from its front side;
/// - among faces coplanar with that hit and covering the hit point, the one
///   inserted last is reported. A face drawn flush against existing geometry
///   thereby takes over the contact surface.
///
/// A box probed from its own centroid is therefore transparent except where
/// one of its faces rests against other geometry.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    state: SceneState,
    operation: Option<(String, SceneState)>,
    tolerance: Tolerance,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create an empty scene with a visible base layer.
    pub fn new() -> Self {
        Self::with_tolerance(Tolerance::DEFAULT)
    }

    /// Create an empty scene using `tolerance` for coincidence tests.
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        let mut layers = SlotMap::with_key();
        let base_layer = layers.insert(Layer {
            name: BASE_LAYER_NAME.to_string(),
            visible: true,
        });
        Self {
            state: SceneState {
                layers,
                base_layer,
                entities: SlotMap::with_key(),
                next_sequence: 0,
            },
            operation: None,
            tolerance,
        }
    }

    /// The layer new geometry lands on by default.
    pub fn base_layer(&self) -> LayerId {
        self.state.base_layer
    }

    /// Number of layers, including the base layer.
    pub fn layer_count(&self) -> usize {
        self.state.layers.len()
    }

    /// Names of all layers.
    pub fn layer_names(&self) -> Vec<String> {
        self.state.layers.values().map(|l| l.name.clone()).collect()
    }

    /// Whether `layer` is currently visible.
    pub fn is_layer_visible(&self, layer: LayerId) -> Result<bool, SceneError> {
        self.state
            .layers
            .get(layer)
            .map(|l| l.visible)
            .ok_or(SceneError::UnknownLayer)
    }

    /// Whether an operation is open.
    pub fn in_operation(&self) -> bool {
        self.operation.is_some()
    }

    /// Number of live entities (faces and groups).
    pub fn entity_count(&self) -> usize {
        self.state.entities.len()
    }

    /// Add a loose face on `layer` (base layer if `None`).
    pub fn add_face(
        &mut self,
        layer: Option<LayerId>,
        corners: [Point3; 4],
    ) -> Result<EntityId, SceneError> {
        let layer = self.resolve_layer(layer)?;
        let face = BoxFace::from_corners(corners, &self.tolerance)
            .ok_or_else(|| SceneError::Invalid("face is not axis-aligned".into()))?;
        Ok(self.insert_face(face, layer, None))
    }

    /// Faces that belong to no group, in insertion order.
    pub fn loose_faces(&self) -> Vec<EntityId> {
        let mut faces: Vec<(u64, EntityId)> = self
            .state
            .entities
            .iter()
            .filter_map(|(id, e)| match e {
                Entity::Face(f) if f.group.is_none() => Some((f.sequence, id)),
                _ => None,
            })
            .collect();
        faces.sort_by_key(|(sequence, _)| *sequence);
        faces.into_iter().map(|(_, id)| id).collect()
    }

    /// Layer an entity lives on.
    pub fn entity_layer(&self, entity: EntityId) -> Result<LayerId, SceneError> {
        match self.entity(entity)? {
            Entity::Face(f) => Ok(f.layer),
            Entity::Group(g) => Ok(g.layer),
        }
    }

    /// Name of a group.
    pub fn group_name(&self, group: EntityId) -> Result<&str, SceneError> {
        Ok(&self.group(group)?.name)
    }

    /// Description of a group.
    pub fn group_description(&self, group: EntityId) -> Result<&str, SceneError> {
        Ok(&self.group(group)?.description)
    }

    /// Parent of a group, if nested.
    pub fn group_parent(&self, group: EntityId) -> Result<Option<EntityId>, SceneError> {
        Ok(self.group(group)?.parent)
    }

    /// Face entities of a group.
    pub fn group_faces(&self, group: EntityId) -> Result<&[EntityId], SceneError> {
        Ok(&self.group(group)?.faces)
    }

    /// Bounds of all faces in a group.
    pub fn group_bounds(&self, group: EntityId) -> Result<Aabb3, SceneError> {
        let g = self.group(group)?;
        let mut aabb = Aabb3::empty();
        for &face in &g.faces {
            for c in &self.face(face)?.face.corners {
                aabb.include_point(c);
            }
        }
        Ok(aabb)
    }

    /// One attribute of a group.
    pub fn attribute(
        &self,
        group: EntityId,
        dictionary: &str,
        key: &str,
    ) -> Result<Option<&AttributeValue>, SceneError> {
        Ok(self
            .group(group)?
            .attributes
            .get(dictionary)
            .and_then(|d| d.get(key)))
    }

    /// A whole attribute dictionary of a group.
    pub fn attribute_dictionary(
        &self,
        group: EntityId,
        dictionary: &str,
    ) -> Result<Option<&BTreeMap<String, AttributeValue>>, SceneError> {
        Ok(self.group(group)?.attributes.get(dictionary))
    }

    /// All attribute dictionaries of a group, by dictionary name.
    pub fn attributes(
        &self,
        group: EntityId,
    ) -> Result<&BTreeMap<String, BTreeMap<String, AttributeValue>>, SceneError> {
        Ok(&self.group(group)?.attributes)
    }

    /// Material painted on a face.
    pub fn face_material(&self, face: EntityId) -> Result<Option<Material>, SceneError> {
        Ok(self.face(face)?.material)
    }

    /// Direction of a face.
    pub fn face_direction(&self, face: EntityId) -> Result<FaceDirection, SceneError> {
        Ok(self.face(face)?.face.direction)
    }

    fn resolve_layer(&self, layer: Option<LayerId>) -> Result<LayerId, SceneError> {
        let layer = layer.unwrap_or(self.state.base_layer);
        if self.state.layers.contains_key(layer) {
            Ok(layer)
        } else {
            Err(SceneError::UnknownLayer)
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let s = self.state.next_sequence;
        self.state.next_sequence += 1;
        s
    }

    fn insert_face(&mut self, face: BoxFace, layer: LayerId, group: Option<EntityId>) -> EntityId {
        let sequence = self.next_sequence();
        self.state.entities.insert(Entity::Face(FaceEntity {
            face,
            layer,
            group,
            material: None,
            sequence,
        }))
    }

    fn entity(&self, id: EntityId) -> Result<&Entity, SceneError> {
        self.state.entities.get(id).ok_or(SceneError::UnknownEntity)
    }

    fn face(&self, id: EntityId) -> Result<&FaceEntity, SceneError> {
        match self.entity(id)? {
            Entity::Face(f) => Ok(f),
            Entity::Group(_) => Err(SceneError::WrongKind("face")),
        }
    }

    fn group(&self, id: EntityId) -> Result<&GroupEntity, SceneError> {
        match self.entity(id)? {
            Entity::Group(g) => Ok(g),
            Entity::Face(_) => Err(SceneError::WrongKind("group")),
        }
    }

    fn group_mut(&mut self, id: EntityId) -> Result<&mut GroupEntity, SceneError> {
        match self.state.entities.get_mut(id) {
            Some(Entity::Group(g)) => Ok(g),
            Some(Entity::Face(_)) => Err(SceneError::WrongKind("group")),
            None => Err(SceneError::UnknownEntity),
        }
    }

    fn layer_visible(&self, layer: LayerId) -> bool {
        self.state.layers.get(layer).is_some_and(|l| l.visible)
    }

    fn face_visible(&self, face: &FaceEntity) -> bool {
        if !self.layer_visible(face.layer) {
            return false;
        }
        let mut owner = face.group;
        while let Some(id) = owner {
            match self.state.entities.get(id) {
                Some(Entity::Group(g)) => {
                    if !self.layer_visible(g.layer) {
                        return false;
                    }
                    owner = g.parent;
                }
                _ => break,
            }
        }
        true
    }

    fn group_bounds_unchecked(&self, group: &GroupEntity) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for &id in &group.faces {
            if let Some(Entity::Face(f)) = self.state.entities.get(id) {
                for c in &f.face.corners {
                    aabb.include_point(c);
                }
            }
        }
        aabb
    }
}

impl SceneQuery for MemoryScene {
    fn raycast(&self, origin: &Point3, direction: &Vec3) -> Result<Option<RayHit>, SceneError> {
        let ray = Ray::new(*origin, *direction)
            .ok_or_else(|| SceneError::Invalid("ray direction has zero length".into()))?;
        let tol = &self.tolerance;

        // Broadphase: skip groups whose bounds the ray misses.
        let mut missed_groups = Vec::new();
        for (id, entity) in &self.state.entities {
            if let Entity::Group(g) = entity {
                let mut bounds = self.group_bounds_unchecked(g);
                bounds.min -= Vec3::repeat(tol.linear);
                bounds.max += Vec3::repeat(tol.linear);
                if ray.intersect_aabb(&bounds).is_none() {
                    missed_groups.push(id);
                }
            }
        }

        let crossings: Vec<(EntityId, &FaceEntity, f64, bool)> = self
            .state
            .entities
            .iter()
            .filter_map(|(id, e)| match e {
                Entity::Face(f) => Some((id, f)),
                Entity::Group(_) => None,
            })
            .filter(|(_, f)| f.group.map_or(true, |g| !missed_groups.contains(&g)))
            .filter(|(_, f)| self.face_visible(f))
            .filter_map(|(id, f)| {
                ray.intersect_face(&f.face, tol)
                    .map(|c| (id, f, c.t, c.front))
            })
            .collect();

        let Some(&(_, nearest, t, _)) = crossings
            .iter()
            .filter(|(_, _, _, front)| *front)
            .min_by(|a, b| a.2.total_cmp(&b.2))
        else {
            return Ok(None);
        };

        // Contact faces share the hit plane; the newest one owns the surface.
        let axis = nearest.face.direction.axis();
        let owner = crossings
            .iter()
            .filter(|(_, f, ct, _)| {
                f.face.direction.axis() == axis && tol.almost_equal(*ct, t)
            })
            .max_by_key(|(_, f, _, _)| f.sequence)
            .map(|(id, _, _, _)| *id);

        tracing::trace!(distance = t, ?owner, "raycast hit");
        Ok(Some(RayHit {
            point: ray.at(t),
            distance: t,
            entity: owner,
        }))
    }

    fn create_isolated_layer(&mut self, name: &str) -> Result<LayerId, SceneError> {
        let layer = self.state.layers.insert(Layer {
            name: name.to_string(),
            visible: false,
        });
        tracing::debug!(name, "created isolated layer");
        Ok(layer)
    }

    fn set_layer_visibility(&mut self, layer: LayerId, visible: bool) -> Result<(), SceneError> {
        let l = self
            .state
            .layers
            .get_mut(layer)
            .ok_or(SceneError::UnknownLayer)?;
        l.visible = visible;
        Ok(())
    }

    fn remove_layer(&mut self, layer: LayerId) -> Result<(), SceneError> {
        if layer == self.state.base_layer {
            return Err(SceneError::BaseLayer);
        }
        let removed = self
            .state
            .layers
            .remove(layer)
            .ok_or(SceneError::UnknownLayer)?;
        let base = self.state.base_layer;
        for entity in self.state.entities.values_mut() {
            match entity {
                Entity::Face(f) if f.layer == layer => f.layer = base,
                Entity::Group(g) if g.layer == layer => g.layer = base,
                _ => {}
            }
        }
        tracing::debug!(name = %removed.name, "removed layer");
        Ok(())
    }
}

impl SceneMutation for MemoryScene {
    fn start_operation(&mut self, name: &str) -> Result<(), SceneError> {
        if let Some((open, _)) = &self.operation {
            return Err(SceneError::OperationInProgress(open.clone()));
        }
        self.operation = Some((name.to_string(), self.state.clone()));
        tracing::debug!(name, "operation started");
        Ok(())
    }

    fn commit_operation(&mut self) -> Result<(), SceneError> {
        let (name, _) = self.operation.take().ok_or(SceneError::NoOperation)?;
        tracing::debug!(%name, "operation committed");
        Ok(())
    }

    fn abort_operation(&mut self) -> Result<(), SceneError> {
        let (name, snapshot) = self.operation.take().ok_or(SceneError::NoOperation)?;
        self.state = snapshot;
        tracing::debug!(%name, "operation aborted");
        Ok(())
    }

    fn add_box(
        &mut self,
        layer: Option<LayerId>,
        solid: &BoxSolid,
    ) -> Result<BoxEntities, SceneError> {
        let layer = self.resolve_layer(layer)?;
        let sequence = self.next_sequence();
        let group = self.state.entities.insert(Entity::Group(GroupEntity {
            name: String::new(),
            description: String::new(),
            layer,
            faces: Vec::with_capacity(6),
            parent: None,
            attributes: BTreeMap::new(),
            sequence,
        }));

        let faces =
            FaceDirection::ALL.map(|d| self.insert_face(*solid.face(d), layer, Some(group)));
        self.group_mut(group)?.faces.extend_from_slice(&faces);

        Ok(BoxEntities { group, faces })
    }

    fn set_group_name(&mut self, group: EntityId, name: &str) -> Result<(), SceneError> {
        self.group_mut(group)?.name = name.to_string();
        Ok(())
    }

    fn set_group_description(
        &mut self,
        group: EntityId,
        description: &str,
    ) -> Result<(), SceneError> {
        self.group_mut(group)?.description = description.to_string();
        Ok(())
    }

    fn set_parent(&mut self, group: EntityId, parent: EntityId) -> Result<(), SceneError> {
        self.group(parent)?;
        // Walking up from the parent must not reach the group itself.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == group {
                return Err(SceneError::Invalid("group cannot contain itself".into()));
            }
            cursor = self.group(id)?.parent;
        }
        self.group_mut(group)?.parent = Some(parent);
        Ok(())
    }

    fn set_attribute(
        &mut self,
        group: EntityId,
        dictionary: &str,
        key: &str,
        value: AttributeValue,
    ) -> Result<(), SceneError> {
        self.group_mut(group)?
            .attributes
            .entry(dictionary.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn set_face_material(&mut self, face: EntityId, material: Material) -> Result<(), SceneError> {
        match self.state.entities.get_mut(face) {
            Some(Entity::Face(f)) => {
                f.material = Some(material);
                Ok(())
            }
            Some(Entity::Group(_)) => Err(SceneError::WrongKind("face")),
            None => Err(SceneError::UnknownEntity),
        }
    }

    fn erase_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
        match self.state.entities.remove(entity) {
            Some(Entity::Group(g)) => {
                for face in g.faces {
                    self.state.entities.remove(face);
                }
                for e in self.state.entities.values_mut() {
                    if let Entity::Group(child) = e {
                        if child.parent == Some(entity) {
                            child.parent = None;
                        }
                    }
                }
                Ok(())
            }
            Some(Entity::Face(f)) => {
                let owner = f.group.and_then(|g| self.state.entities.get_mut(g));
                if let Some(Entity::Group(g)) = owner {
                    g.faces.retain(|&id| id != entity);
                }
                Ok(())
            }
            None => Err(SceneError::UnknownEntity),
        }
    }

    fn groups(&self) -> Vec<GroupSummary> {
        let mut groups: Vec<(u64, GroupSummary)> = self
            .state
            .entities
            .iter()
            .filter_map(|(id, e)| match e {
                Entity::Group(g) => Some((
                    g.sequence,
                    GroupSummary {
                        id,
                        name: g.name.clone(),
                    },
                )),
                Entity::Face(_) => None,
            })
            .collect();
        groups.sort_by_key(|(sequence, _)| *sequence);
        groups.into_iter().map(|(_, g)| g).collect()
    }

    fn face_info(&self, face: EntityId) -> Result<FaceInfo, SceneError> {
        let f = self.face(face)?;
        Ok(FaceInfo {
            corners: f.face.corners,
            group: f.group,
        })
    }
}
