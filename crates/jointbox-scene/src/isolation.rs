//! Scoped temporary layer.

use std::ops::{Deref, DerefMut};

use crate::{LayerId, SceneError, SceneQuery};

/// A hidden scene layer that lives as long as this guard.
///
/// The guard borrows the scene mutably and derefs to it, so geometry can be
/// placed on [`IsolationScope::layer`] and queried while the layer exists.
/// Dropping the guard removes the layer; its geometry moves to the base layer.
/// Call [`IsolationScope::release`] to observe a removal failure instead of
/// having it logged.
pub struct IsolationScope<'s, S: SceneQuery + ?Sized> {
    scene: &'s mut S,
    layer: LayerId,
    released: bool,
}

impl<'s, S: SceneQuery + ?Sized> IsolationScope<'s, S> {
    /// Create a hidden layer named `name` on `scene`.
    pub fn acquire(scene: &'s mut S, name: &str) -> Result<Self, SceneError> {
        let layer = scene.create_isolated_layer(name)?;
        // Ports are asked for a hidden layer; enforce it anyway.
        if let Err(e) = scene.set_layer_visibility(layer, false) {
            if let Err(cleanup) = scene.remove_layer(layer) {
                tracing::warn!(error = %cleanup, "failed to remove isolation layer");
            }
            return Err(e);
        }
        tracing::debug!(name, "isolation layer acquired");
        Ok(Self {
            scene,
            layer,
            released: false,
        })
    }

    /// The isolation layer.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Make the isolation layer visible.
    pub fn reveal(&mut self) -> Result<(), SceneError> {
        self.scene.set_layer_visibility(self.layer, true)
    }

    /// Hide the isolation layer again.
    pub fn conceal(&mut self) -> Result<(), SceneError> {
        self.scene.set_layer_visibility(self.layer, false)
    }

    /// Remove the layer now and report the outcome.
    pub fn release(mut self) -> Result<(), SceneError> {
        self.released = true;
        self.scene.remove_layer(self.layer)
    }
}

impl<S: SceneQuery + ?Sized> Deref for IsolationScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: SceneQuery + ?Sized> DerefMut for IsolationScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: SceneQuery + ?Sized> Drop for IsolationScope<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.scene.remove_layer(self.layer) {
            tracing::warn!(error = %e, "failed to remove isolation layer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryScene, SceneMutation};
    use jointbox_math::{Point3, Vec3};
    use jointbox_primitives::build_box;

    #[test]
    fn test_layer_starts_hidden_and_is_removed_on_drop() {
        let mut scene = MemoryScene::new();
        {
            let scope = IsolationScope::acquire(&mut scene, "isolation").unwrap();
            assert_eq!(scope.layer_count(), 2);
            assert!(scope.layer_names().iter().any(|n| n == "isolation"));
            assert_eq!(scope.is_layer_visible(scope.layer()), Ok(false));
        }
        assert_eq!(scene.layer_count(), 1);
        assert!(!scene.layer_names().iter().any(|n| n == "isolation"));
    }

    /// Creates layers but refuses to change their visibility.
    struct StuckVisibility(MemoryScene);

    impl SceneQuery for StuckVisibility {
        fn raycast(
            &self,
            origin: &Point3,
            direction: &Vec3,
        ) -> Result<Option<crate::RayHit>, SceneError> {
            self.0.raycast(origin, direction)
        }

        fn create_isolated_layer(&mut self, name: &str) -> Result<LayerId, SceneError> {
            self.0.create_isolated_layer(name)
        }

        fn set_layer_visibility(&mut self, _: LayerId, _: bool) -> Result<(), SceneError> {
            Err(SceneError::Invalid("visibility is locked".into()))
        }

        fn remove_layer(&mut self, layer: LayerId) -> Result<(), SceneError> {
            self.0.remove_layer(layer)
        }
    }

    #[test]
    fn test_failed_acquire_removes_the_layer() {
        let mut scene = StuckVisibility(MemoryScene::new());
        let err = IsolationScope::acquire(&mut scene, "isolation").err();
        assert!(matches!(err, Some(SceneError::Invalid(_))));
        assert_eq!(scene.0.layer_count(), 1);
    }

    #[test]
    fn test_reveal_and_release() {
        let mut scene = MemoryScene::new();
        let mut scope = IsolationScope::acquire(&mut scene, "isolation").unwrap();
        let layer = scope.layer();
        let solid = build_box(Point3::new(2.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0)).unwrap();
        scope.add_box(Some(layer), &solid).unwrap();

        let dir = Vec3::new(1.0, 0.0, 0.0);
        assert!(scope.raycast(&Point3::origin(), &dir).unwrap().is_none());
        scope.reveal().unwrap();
        assert!(scope.raycast(&Point3::origin(), &dir).unwrap().is_some());
        scope.conceal().unwrap();
        assert!(scope.raycast(&Point3::origin(), &dir).unwrap().is_none());

        scope.release().unwrap();
        assert_eq!(scene.layer_count(), 1);
        // Geometry survives on the base layer, visible.
        assert!(scene.raycast(&Point3::origin(), &dir).unwrap().is_some());
    }

    #[test]
    fn test_release_after_external_removal_reports_error() {
        let mut scene = MemoryScene::new();
        let mut scope = IsolationScope::acquire(&mut scene, "isolation").unwrap();
        let layer = scope.layer();
        scope.remove_layer(layer).unwrap();
        assert_eq!(scope.release(), Err(SceneError::UnknownLayer));
    }

    #[test]
    fn test_early_return_cleans_up() {
        fn failing(scene: &mut MemoryScene) -> Result<(), SceneError> {
            let scope = IsolationScope::acquire(scene, "isolation")?;
            scope.raycast(&Point3::origin(), &Vec3::zeros())?;
            Ok(())
        }

        let mut scene = MemoryScene::new();
        assert!(failing(&mut scene).is_err());
        assert_eq!(scene.layer_count(), 1);
    }
}
