#![warn(missing_docs)]

//! Labeled joints and extrusion objects.
//!
//! A labeled joint is a box drawn between two corner points whose faces are
//! colored by whether they rest against existing geometry. An extrusion
//! object is a box pushed out of an existing rectangular face. Both are
//! named, tagged with their dimensions, and announced to an [`EventSink`].
//!
//! The tools work against any scene that implements
//! [`SceneQuery`](jointbox_scene::SceneQuery) and
//! [`SceneMutation`](jointbox_scene::SceneMutation).
//!
//! # Example
//!
//! ```
//! use jointbox::{
//!     create_joint, FaceDirection, MemoryScene, NullSink, Point3, SceneMutation, ToolOptions,
//!     UnitsOptions,
//! };
//! use jointbox::primitives::build_box;
//!
//! let mut scene = MemoryScene::new();
//! let wall = build_box(Point3::new(2.0, -5.0, 0.0), Point3::new(3.0, 5.0, 5.0)).unwrap();
//! scene.add_box(None, &wall).unwrap();
//!
//! let joint = create_joint(
//!     &mut scene,
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 2.0, 2.0),
//!     &ToolOptions::named("Sill"),
//!     &UnitsOptions::default(),
//!     &mut NullSink,
//! )
//! .unwrap();
//! assert_eq!(joint.configuration.joined().collect::<Vec<_>>(), vec![FaceDirection::PosX]);
//! ```

pub use jointbox_classify as classify;
pub use jointbox_math as math;
pub use jointbox_primitives as primitives;
pub use jointbox_scene as scene;

pub mod attributes;
pub mod events;
pub mod materials;
pub mod naming;
pub mod options;
pub mod tools;
pub mod units;

pub use events::{EventSink, GeometryEvent, NullSink};
pub use jointbox_classify::{ClassifyError, JointConfiguration};
pub use jointbox_math::Point3;
pub use jointbox_primitives::{BoxError, BoxSolid, FaceDirection};
pub use jointbox_scene::{EntityId, MemoryScene, SceneError, SceneMutation, SceneQuery};
pub use naming::{unique_name, GroupIndex};
pub use options::{ToolOptions, ValidatedOptions};
pub use tools::{create_joint, extrude_face, ExtrusionOutcome, JointOutcome, Toolkit};
pub use units::{LengthFormat, LengthUnit, UnitLabel, UnitsOptions};

use thiserror::Error;

/// Errors from a tool operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// Nothing usable was selected.
    #[error("no usable selection")]
    NoSelection,

    /// The selection spans no volume or has the wrong shape.
    #[error("rejected selection: {0}")]
    Degenerate(#[from] BoxError),

    /// Joint classification failed.
    #[error("classification failed: {0}")]
    Classify(#[from] ClassifyError),

    /// The scene rejected a change.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// The tool options do not fit the scene.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
