#![warn(missing_docs)]

//! Joint configuration classification.
//!
//! A freshly built box is placed on a hidden isolation layer. Six rays are
//! cast from its centroid along the axis directions, once with the box hidden
//! and once with it revealed. A direction whose hit identity changes between
//! the two passes is a joined face: the box's own face there has merged with
//! geometry it touches.
//!
//! # Example
//!
//! ```
//! use jointbox_classify::classify;
//! use jointbox_math::Point3;
//! use jointbox_primitives::{build_box, FaceDirection};
//! use jointbox_scene::{IsolationScope, MemoryScene, SceneMutation};
//!
//! let mut scene = MemoryScene::new();
//! let floor = build_box(Point3::new(-10.0, -10.0, -1.0), Point3::new(10.0, 10.0, 0.0)).unwrap();
//! scene.add_box(None, &floor).unwrap();
//!
//! let solid = build_box(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)).unwrap();
//! let mut scope = IsolationScope::acquire(&mut scene, "joint").unwrap();
//! let layer = scope.layer();
//! scope.add_box(Some(layer), &solid).unwrap();
//!
//! let config = classify(&solid, &mut scope).unwrap();
//! assert_eq!(config.joined().collect::<Vec<_>>(), vec![FaceDirection::NegZ]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use jointbox_math::{Point3, Tolerance};
use jointbox_primitives::{BoxSolid, FaceDirection};
use jointbox_scene::{EntityId, IsolationScope, SceneError, SceneQuery};
use serde::Serialize;
use thiserror::Error;

/// Errors from classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// The scene failed to answer a ray or layer query.
    #[error("scene query failed: {0}")]
    QueryFault(#[from] SceneError),

    /// The scene answered with a hit that cannot be right.
    #[error("invalid hit along {direction}: distance {distance}")]
    InvalidHit {
        /// Probe direction.
        direction: FaceDirection,
        /// Reported distance.
        distance: f64,
    },
}

/// Which faces of a box touch existing geometry.
///
/// Serializes as the joined directions only; face identities stay in-process.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JointConfiguration {
    joined: BTreeSet<FaceDirection>,
    #[serde(skip)]
    faces: BTreeMap<FaceDirection, EntityId>,
}

impl JointConfiguration {
    /// Joined directions in canonical order.
    pub fn joined(&self) -> impl Iterator<Item = FaceDirection> + '_ {
        self.joined.iter().copied()
    }

    /// Free directions in canonical order.
    pub fn free(&self) -> impl Iterator<Item = FaceDirection> + '_ {
        FaceDirection::ALL
            .into_iter()
            .filter(|d| !self.joined.contains(d))
    }

    /// Whether `direction` is joined.
    pub fn is_joined(&self, direction: FaceDirection) -> bool {
        self.joined.contains(&direction)
    }

    /// The entity reported by the merged pass for a joined direction.
    pub fn face(&self, direction: FaceDirection) -> Option<EntityId> {
        self.faces.get(&direction).copied()
    }

    /// Number of joined faces.
    pub fn len(&self) -> usize {
        self.joined.len()
    }

    /// True when no face is joined.
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty()
    }

    fn insert(&mut self, direction: FaceDirection, face: Option<EntityId>) {
        self.joined.insert(direction);
        if let Some(face) = face {
            self.faces.insert(direction, face);
        }
    }
}

/// Differential raycast classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct JointClassifier {
    /// Hits closer than `-tolerance.linear` are rejected as invalid.
    pub tolerance: Tolerance,
}

impl JointClassifier {
    /// Create a classifier with the given tolerance.
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Classify the faces of `solid`.
    ///
    /// The box's faces must already be on the scope's layer, and the layer
    /// must be hidden. The layer is revealed between the passes. On error the
    /// scope is left as it is; dropping it removes the layer.
    pub fn classify<S: SceneQuery + ?Sized>(
        &self,
        solid: &BoxSolid,
        scope: &mut IsolationScope<'_, S>,
    ) -> Result<JointConfiguration, ClassifyError> {
        let origin = solid.center();

        let before = self.probe(&**scope, &origin)?;
        tracing::debug!(?before, "isolated pass");

        scope.reveal()?;

        let after = self.probe(&**scope, &origin)?;
        tracing::debug!(?after, "merged pass");

        let mut config = JointConfiguration::default();
        for d in FaceDirection::ALL {
            let i = d.index();
            if after[i] != before[i] {
                tracing::debug!(direction = %d, face = ?after[i], "joined face");
                config.insert(d, after[i]);
            }
        }
        Ok(config)
    }

    /// Hit identities along the six directions.
    fn probe<S: SceneQuery + ?Sized>(
        &self,
        scene: &S,
        origin: &Point3,
    ) -> Result<[Option<EntityId>; 6], ClassifyError> {
        let mut hits = [None; 6];
        for d in FaceDirection::ALL {
            let Some(hit) = scene.raycast(origin, &d.vector())? else {
                continue;
            };
            if !hit.distance.is_finite() || hit.distance < -self.tolerance.linear {
                return Err(ClassifyError::InvalidHit {
                    direction: d,
                    distance: hit.distance,
                });
            }
            hits[d.index()] = hit.entity;
        }
        Ok(hits)
    }
}

/// Classify with the default tolerance.
///
/// See [`JointClassifier::classify`].
pub fn classify<S: SceneQuery + ?Sized>(
    solid: &BoxSolid,
    scope: &mut IsolationScope<'_, S>,
) -> Result<JointConfiguration, ClassifyError> {
    JointClassifier::default().classify(solid, scope)
}
