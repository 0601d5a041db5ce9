#![warn(missing_docs)]

//! Scene ports for the jointbox kernel.
//!
//! The kernel never owns a scene. It talks to one through two traits:
//!
//! - [`SceneQuery`] - nearest-hit ray queries and temporary layer visibility
//! - [`SceneMutation`] - geometry creation, naming, attributes, materials, and
//!   the transaction boundary around a tool operation
//!
//! [`IsolationScope`] holds a temporary hidden layer for the duration of a
//! classification and always removes it, including on early return.
//! [`MemoryScene`] is a complete in-memory implementation of both ports.
//!
//! # Example
//!
//! ```
//! use jointbox_math::{Point3, Vec3};
//! use jointbox_primitives::build_box;
//! use jointbox_scene::{MemoryScene, SceneMutation, SceneQuery};
//!
//! let mut scene = MemoryScene::new();
//! let floor = build_box(Point3::new(-50.0, -50.0, -1.0), Point3::new(50.0, 50.0, 0.0)).unwrap();
//! scene.add_box(None, &floor).unwrap();
//!
//! let hit = scene
//!     .raycast(&Point3::new(0.0, 0.0, 5.0), &Vec3::new(0.0, 0.0, -1.0))
//!     .unwrap()
//!     .unwrap();
//! assert!((hit.distance - 5.0).abs() < 1e-9);
//! ```

mod isolation;
mod memory;
mod ray;

pub use isolation::IsolationScope;
pub use memory::MemoryScene;
pub use ray::Ray;

use jointbox_math::{Point3, Vec3};
use jointbox_primitives::{BoxSolid, FaceDirection};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Opaque identity of a scene entity (face or group).
    ///
    /// Only equality is meaningful; ids are not dense, ordered, or reused.
    pub struct EntityId;

    /// Opaque identity of a scene layer.
    pub struct LayerId;
}

/// Errors reported by a scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// The layer does not exist.
    #[error("unknown layer")]
    UnknownLayer,

    /// The entity does not exist (or was erased).
    #[error("unknown entity")]
    UnknownEntity,

    /// The entity exists but has the wrong kind.
    #[error("entity is not a {0}")]
    WrongKind(&'static str),

    /// The base layer cannot be removed.
    #[error("the base layer cannot be removed")]
    BaseLayer,

    /// Commit or abort without a started operation.
    #[error("no operation in progress")]
    NoOperation,

    /// An operation was started while another was open.
    #[error("operation '{0}' already in progress")]
    OperationInProgress(String),

    /// The scene could not be reached.
    #[error("scene unreachable: {0}")]
    Unreachable(String),

    /// The request or its result was malformed.
    #[error("invalid scene query: {0}")]
    Invalid(String),
}

/// Result of a ray query that hit something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point.
    pub point: Point3,
    /// Distance from the ray origin.
    pub distance: f64,
    /// The entity hit, if the scene could identify it.
    pub entity: Option<EntityId>,
}

impl RayHit {
    /// Create a hit on a known entity.
    pub fn new(point: Point3, distance: f64, entity: EntityId) -> Self {
        Self {
            point,
            distance,
            entity: Some(entity),
        }
    }
}

/// A value stored in an attribute dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Face material: RGB color plus opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Red, green, blue.
    pub color: [u8; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Material {
    /// An opaque material.
    pub const fn opaque(color: [u8; 3]) -> Self {
        Self { color, alpha: 1.0 }
    }
}

/// Entities created for one box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxEntities {
    /// The group holding the six faces.
    pub group: EntityId,
    /// Face entities in [`FaceDirection::ALL`] order.
    pub faces: [EntityId; 6],
}

impl BoxEntities {
    /// The face entity pointing along `direction`.
    pub fn face(&self, direction: FaceDirection) -> EntityId {
        self.faces[direction.index()]
    }
}

/// A group as listed by [`SceneMutation::groups`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Group identity.
    pub id: EntityId,
    /// Display name (may be empty).
    pub name: String,
}

/// A face as reported by [`SceneMutation::face_info`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceInfo {
    /// Face loop in winding order.
    pub corners: [Point3; 4],
    /// Owning group, or `None` for loose geometry.
    pub group: Option<EntityId>,
}

/// Ray and visibility queries against a scene.
pub trait SceneQuery {
    /// Nearest hit along the ray from `origin` in `direction`.
    fn raycast(&self, origin: &Point3, direction: &Vec3) -> Result<Option<RayHit>, SceneError>;

    /// Create a new layer, initially hidden.
    fn create_isolated_layer(&mut self, name: &str) -> Result<LayerId, SceneError>;

    /// Show or hide a layer.
    fn set_layer_visibility(&mut self, layer: LayerId, visible: bool) -> Result<(), SceneError>;

    /// Remove a layer. Its geometry moves to the base layer.
    fn remove_layer(&mut self, layer: LayerId) -> Result<(), SceneError>;
}

/// Geometry creation and persistence in a scene.
pub trait SceneMutation {
    /// Open a transaction.
    fn start_operation(&mut self, name: &str) -> Result<(), SceneError>;

    /// Keep everything done since [`SceneMutation::start_operation`].
    fn commit_operation(&mut self) -> Result<(), SceneError>;

    /// Roll back everything done since [`SceneMutation::start_operation`].
    fn abort_operation(&mut self) -> Result<(), SceneError>;

    /// Add the six faces of `solid` as a new group on `layer` (base layer if `None`).
    fn add_box(
        &mut self,
        layer: Option<LayerId>,
        solid: &BoxSolid,
    ) -> Result<BoxEntities, SceneError>;

    /// Rename a group.
    fn set_group_name(&mut self, group: EntityId, name: &str) -> Result<(), SceneError>;

    /// Set a group's description.
    fn set_group_description(
        &mut self,
        group: EntityId,
        description: &str,
    ) -> Result<(), SceneError>;

    /// Nest `group` inside `parent`.
    fn set_parent(&mut self, group: EntityId, parent: EntityId) -> Result<(), SceneError>;

    /// Write `key = value` into the named attribute dictionary of `group`.
    fn set_attribute(
        &mut self,
        group: EntityId,
        dictionary: &str,
        key: &str,
        value: AttributeValue,
    ) -> Result<(), SceneError>;

    /// Paint both sides of a face.
    fn set_face_material(&mut self, face: EntityId, material: Material) -> Result<(), SceneError>;

    /// Erase an entity (a group erases its faces).
    fn erase_entity(&mut self, entity: EntityId) -> Result<(), SceneError>;

    /// All groups in creation order.
    fn groups(&self) -> Vec<GroupSummary>;

    /// Geometry and ownership of a face.
    fn face_info(&self, face: EntityId) -> Result<FaceInfo, SceneError>;
}
