//! Scene graph: an arena of [`Object3D`] nodes with parent/child links,
//! plus the scene-level environment (background, fog, user data).
//!
//! Nodes are addressed by [`NodeId`]. Root-level objects have no parent;
//! their world matrix is their local matrix.

pub mod bounds;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod object;
pub mod stats;

pub use bounds::Aabb;
pub use geometry::Geometry;
pub use loader::{ObjectLoader, Project, SceneSettings, Script, ScriptMap};
use glam::{Mat4, Vec3};
pub use material::{Material, MaterialKind, Side};
pub use object::{Light, LightKind, Object3D, ObjectKind, ObjectTree, Transform};
use rustc_hash::FxHashMap;
pub use stats::ViewportStatistics;

use crate::util::color::Color;
use crate::util::id::generate_uuid;

/// Handle to a node in a [`Scene`]. Never reused within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Distance or density fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fog {
    /// Linear fog between two distances.
    Linear {
        /// Fog colour.
        color: Color,
        /// Distance where fog starts.
        near: f32,
        /// Distance where fog is opaque.
        far: f32,
    },
    /// Exponential squared fog.
    Exp2 {
        /// Fog colour.
        color: Color,
        /// Density.
        density: f32,
    },
}

struct Node {
    object: Object3D,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The editable scene.
pub struct Scene {
    /// Scene identifier.
    pub uuid: String,
    /// Scene name.
    pub name: String,
    /// Background colour overriding the theme clear colour.
    pub background: Option<Color>,
    /// Fog settings.
    pub fog: Option<Fog>,
    /// Background blur amount.
    pub background_blurriness: f32,
    /// Background brightness multiplier.
    pub background_intensity: f32,
    /// Free-form data carried through from scene JSON.
    pub user_data: serde_json::Value,
    nodes: FxHashMap<NodeId, Node>,
    children: Vec<NodeId>,
    next_id: u64,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    rendered_generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: generate_uuid(),
            name: String::new(),
            background: None,
            fog: None,
            background_blurriness: 0.0,
            background_intensity: 1.0,
            user_data: serde_json::Value::Object(serde_json::Map::new()),
            nodes: FxHashMap::default(),
            children: Vec::new(),
            next_id: 0,
            generation: 1,
            rendered_generation: 0,
        }
    }

    // -- Change tracking --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether anything changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark the current generation as uploaded.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Structure --

    /// Append `tree` to the root.
    pub fn add(&mut self, tree: impl Into<ObjectTree>) -> NodeId {
        let id = self.insert_subtree(tree.into(), None);
        self.children.push(id);
        self.invalidate();
        id
    }

    /// Insert `tree` under `parent` at `index` (clamped; `None` appends).
    /// A `None` parent inserts at the root. Returns `None` if `parent` is
    /// not in this scene.
    pub fn insert(
        &mut self,
        tree: impl Into<ObjectTree>,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Option<NodeId> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return None;
            }
        }
        let id = self.insert_subtree(tree.into(), parent);
        let siblings = match parent {
            Some(p) => &mut self.nodes.get_mut(&p)?.children,
            None => &mut self.children,
        };
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, id);
        self.invalidate();
        Some(id)
    }

    fn insert_subtree(
        &mut self,
        tree: ObjectTree,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let children = tree
            .children
            .into_iter()
            .map(|child| self.insert_subtree(child, Some(id)))
            .collect();
        let _ = self.nodes.insert(
            id,
            Node {
                object: tree.object,
                parent,
                children,
            },
        );
        id
    }

    /// Detach and return the subtree rooted at `id`.
    pub fn remove(&mut self, id: NodeId) -> Option<ObjectTree> {
        let parent = self.nodes.get(&id)?.parent;
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.retain(|&c| c != id);
                }
            }
            None => self.children.retain(|&c| c != id),
        }
        self.invalidate();
        self.take_subtree(id)
    }

    fn take_subtree(&mut self, id: NodeId) -> Option<ObjectTree> {
        let node = self.nodes.remove(&id)?;
        let children = node
            .children
            .into_iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        Some(ObjectTree {
            object: node.object,
            children,
        })
    }

    /// Remove every object. Scene-level settings are kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.invalidate();
    }

    // -- Access --

    /// Number of objects in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is part of this scene graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Read access to an object.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.nodes.get(&id).map(|n| &n.object)
    }

    /// Write access to an object. Marks the scene dirty.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        let node = self.nodes.get_mut(&id)?;
        self.generation += 1;
        Some(&mut node.object)
    }

    /// Parent of `id`; `None` for root-level objects and unknown ids.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of `id` in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Root-level objects in order.
    #[must_use]
    pub fn root_children(&self) -> &[NodeId] {
        &self.children
    }

    /// First object with the given uuid.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        let mut found = None;
        for &root in &self.children {
            self.traverse(root, &mut |id, obj| {
                if found.is_none() && obj.uuid == uuid {
                    found = Some(id);
                }
            });
        }
        found
    }

    // -- Traversal --

    /// Pre-order visit of `id` and all its descendants.
    pub fn traverse(&self, id: NodeId, f: &mut impl FnMut(NodeId, &Object3D)) {
        if let Some(node) = self.nodes.get(&id) {
            f(id, &node.object);
            for &child in &node.children {
                self.traverse(child, f);
            }
        }
    }

    /// Like [`Scene::traverse`], but a hidden node is skipped together with
    /// its whole subtree.
    pub fn traverse_visible(
        &self,
        id: NodeId,
        f: &mut impl FnMut(NodeId, &Object3D),
    ) {
        if let Some(node) = self.nodes.get(&id) {
            if !node.object.visible {
                return;
            }
            f(id, &node.object);
            for &child in &node.children {
                self.traverse_visible(child, f);
            }
        }
    }

    /// Every visible object in pre-order, starting from the root children.
    #[must_use]
    pub fn visible_objects(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.children {
            self.traverse_visible(root, &mut |id, _| out.push(id));
        }
        out
    }

    // -- Transforms --

    /// Object-to-world matrix of `id`.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.object.transform.matrix();
        match node.parent {
            Some(p) => Some(self.world_matrix(p)? * local),
            None => Some(local),
        }
    }

    /// World position of `id`.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.w_axis.truncate())
    }

    /// Exact world bounds of `id` and its descendants, from every
    /// transformed vertex.
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        self.traverse(id, &mut |child, obj| {
            if let (Some(geometry), Some(m)) =
                (obj.geometry(), self.world_matrix(child))
            {
                for p in &geometry.positions {
                    aabb.expand_by_point(m.transform_point3(*p));
                }
            }
        });
        aabb
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Quat;

    use super::*;

    fn named(name: &str) -> Object3D {
        Object3D::group().with_name(name)
    }

    fn names(scene: &Scene, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| scene.get(id).map(|o| o.name.clone()))
            .collect()
    }

    #[test]
    fn add_and_remove_subtree() {
        let mut scene = Scene::new();
        let tree =
            ObjectTree::leaf(named("parent")).with_child(named("child").into());
        let parent = scene.add(tree);
        assert_eq!(scene.len(), 2);
        let child = scene.children(parent)[0];
        assert_eq!(scene.parent(child), Some(parent));

        let removed = scene.remove(parent).unwrap();
        assert_eq!(removed.count(), 2);
        assert!(scene.is_empty());
        assert!(scene.root_children().is_empty());
        assert!(!scene.contains(child));
    }

    #[test]
    fn insert_at_index() {
        let mut scene = Scene::new();
        let group = scene.add(named("group"));
        let _ = scene.insert(named("a"), Some(group), None).unwrap();
        let _ = scene.insert(named("b"), Some(group), None).unwrap();
        let _ = scene.insert(named("first"), Some(group), Some(0)).unwrap();
        let _ = scene.insert(named("last"), Some(group), Some(99)).unwrap();
        assert_eq!(
            names(&scene, scene.children(group)),
            ["first", "a", "b", "last"]
        );
        let _ = scene.insert(named("root0"), None, Some(0)).unwrap();
        assert_eq!(names(&scene, scene.root_children()), ["root0", "group"]);
    }

    #[test]
    fn insert_under_unknown_parent_fails() {
        let mut scene = Scene::new();
        let id = scene.add(named("gone"));
        let _ = scene.remove(id);
        assert!(scene.insert(named("x"), Some(id), None).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn traverse_visible_skips_hidden_subtrees() {
        let mut scene = Scene::new();
        let mut hidden = named("hidden");
        hidden.visible = false;
        let _ = scene.add(
            ObjectTree::leaf(named("root"))
                .with_child(
                    ObjectTree::leaf(hidden)
                        .with_child(named("under hidden").into()),
                )
                .with_child(named("shown").into()),
        );
        let visible = scene.visible_objects();
        assert_eq!(names(&scene, &visible), ["root", "shown"]);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let mut parent = named("parent");
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        parent.transform.rotation =
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        parent.transform.scale = Vec3::splat(2.0);
        let child = named("child").with_position(Vec3::new(0.0, 0.0, 1.0));
        let p = scene.add(ObjectTree::leaf(parent).with_child(child.into()));
        let c = scene.children(p)[0];
        // +Z rotated 90° about Y is +X, scaled by 2, offset by parent
        let world = scene.world_position(c).unwrap();
        assert!((world - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn world_bounds_uses_transformed_vertices() {
        let mut scene = Scene::new();
        let mesh = Object3D::mesh(
            Arc::new(Geometry::unit_box()),
            Arc::new(Material::default()),
        )
        .with_position(Vec3::new(0.0, 0.5, 0.0));
        let id = scene.add(mesh);
        let bounds = scene.world_bounds(id);
        assert!((bounds.min - Vec3::new(-0.5, 0.0, -0.5)).length() < 1e-6);
        assert!((bounds.max - Vec3::new(0.5, 1.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn find_by_uuid_searches_descendants() {
        let mut scene = Scene::new();
        let mut deep = named("deep");
        deep.uuid = "deep-uuid".into();
        let root =
            scene.add(ObjectTree::leaf(named("root")).with_child(deep.into()));
        let found = scene.find_by_uuid("deep-uuid").unwrap();
        assert_eq!(scene.parent(found), Some(root));
        assert!(scene.find_by_uuid("missing").is_none());
    }

    #[test]
    fn mutation_marks_dirty() {
        let mut scene = Scene::new();
        assert!(scene.is_dirty());
        scene.mark_rendered();
        assert!(!scene.is_dirty());
        let id = scene.add(named("a"));
        assert!(scene.is_dirty());
        scene.mark_rendered();
        scene.get_mut(id).unwrap().visible = false;
        assert!(scene.is_dirty());
    }
}
