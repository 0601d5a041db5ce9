//! Display names for groups.

use std::collections::HashSet;

use jointbox_scene::{EntityId, SceneMutation};

/// Label used when a candidate name is blank.
pub const DEFAULT_NAME: &str = "Group";

/// Make `candidate` unique against `existing` by appending ` (n)`.
///
/// The counter starts at 1 and is always appended, so `"Wall"` becomes
/// `"Wall (1)"` even when no `"Wall"` exists. A blank candidate becomes
/// [`DEFAULT_NAME`].
pub fn unique_name(existing: &HashSet<String>, candidate: &str) -> String {
    unique_name_with(|name| existing.contains(name), candidate)
}

fn unique_name_with(is_taken: impl Fn(&str) -> bool, candidate: &str) -> String {
    let base = if candidate.trim().is_empty() {
        DEFAULT_NAME
    } else {
        candidate
    };
    let mut count: u64 = 1;
    loop {
        let name = format!("{base} ({count})");
        if !is_taken(&name) {
            return name;
        }
        count += 1;
    }
}

/// Existing groups under unique display names, in scene order.
///
/// This is the list a user picks a parent group from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupIndex {
    entries: Vec<(String, EntityId)>,
}

impl GroupIndex {
    /// Index every group in `scene` except `exclude`.
    pub fn from_scene<S: SceneMutation + ?Sized>(scene: &S, exclude: Option<EntityId>) -> Self {
        let mut index = Self::default();
        for group in scene.groups() {
            if Some(group.id) == exclude {
                continue;
            }
            let name = unique_name_with(|n| index.resolve(n).is_some(), &group.name);
            index.entries.push((name, group.id));
        }
        index
    }

    /// Display names in scene order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// The group shown as `name`.
    pub fn resolve(&self, name: &str) -> Option<EntityId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the scene has no other groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointbox_math::Point3;
    use jointbox_primitives::build_box;
    use jointbox_scene::MemoryScene;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_counter_always_appended() {
        assert_eq!(unique_name(&HashSet::new(), "Wall"), "Wall (1)");
        assert_eq!(unique_name(&set(&["Wall"]), "Wall"), "Wall (1)");
    }

    #[test]
    fn test_counter_skips_taken() {
        let existing = set(&["Wall (1)", "Wall (2)", "Wall (4)"]);
        assert_eq!(unique_name(&existing, "Wall"), "Wall (3)");
    }

    #[test]
    fn test_blank_uses_default() {
        assert_eq!(unique_name(&HashSet::new(), ""), "Group (1)");
        assert_eq!(unique_name(&set(&["Group (1)"]), "   "), "Group (2)");
    }

    #[test]
    fn test_repeated_application_yields_fresh_names() {
        let mut existing = HashSet::new();
        let mut seen = Vec::new();
        for _ in 0..20 {
            let name = unique_name(&existing, "Joint");
            assert!(!existing.contains(&name));
            existing.insert(name.clone());
            seen.push(name);
        }
        assert_eq!(seen[0], "Joint (1)");
        assert_eq!(seen[19], "Joint (20)");
    }

    #[test]
    fn test_index_disambiguates_and_excludes() {
        let mut scene = MemoryScene::new();
        let mut ids = Vec::new();
        for (i, name) in ["Wall", "Wall", "", "Floor"].iter().enumerate() {
            let x = i as f64 * 2.0;
            let solid =
                build_box(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0)).unwrap();
            let ents = scene.add_box(None, &solid).unwrap();
            scene.set_group_name(ents.group, name).unwrap();
            ids.push(ents.group);
        }

        let index = GroupIndex::from_scene(&scene, Some(ids[3]));
        assert_eq!(
            index.names().collect::<Vec<_>>(),
            vec!["Wall (1)", "Wall (2)", "Group (1)"]
        );
        assert_eq!(index.resolve("Wall (2)"), Some(ids[1]));
        assert_eq!(index.resolve("Floor (1)"), None);
        assert_eq!(index.len(), 3);
    }
}
