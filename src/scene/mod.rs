//! In-memory scene graph hosting everything drawn on the board.
//!
//! Nodes live in an arena keyed by [`NodeId`]. Removing a node only detaches it
//! from its parent so the history cache can put it back later; destroying a node
//! drops it and its whole subtree.

mod node;
mod surface;

use std::collections::HashMap;

use egui::Pos2;

use crate::geometry::node_contains;

pub use node::{LineCap, LineJoin, Node, NodeConfig, NodeId, NodeKind};
pub use surface::{
    Channel, KeyInput, ListenerId, PointerInput, Surface, SurfaceEvent, SurfaceHandler, WheelInput,
    LAYER_ID, ROOT_GROUP_ID,
};

#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node to the arena
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Inserts `node` and attaches it to `parent` in one step
    pub fn insert_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.insert(node);
        self.add_child(parent, id);
        id
    }

    /// Attaches `child` as the last child of `parent`, detaching it from any previous parent.
    ///
    /// Returns false if either node is unknown.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            return false;
        }
        self.remove(child);

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        true
    }

    /// Detaches a node from its parent but keeps it alive
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|node| node.parent.take()) else {
            return false;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }
        true
    }

    /// Drops a node and all of its descendants
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.remove(id);

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                pending.extend(node.children);
            }
        }
        true
    }

    /// Destroys every child of `id`, keeping the node itself
    pub fn destroy_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.destroy(child);
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Returns true if `id` is `ancestor` or one of its descendants
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// All descendants of `root` in depth-first, paint order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Descendants of `root` carrying the given name
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|node| node.has_name(name)))
            .collect()
    }

    pub fn find_one_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find_by_name(root, name).into_iter().next()
    }

    /// Descendants of `root` whose kind is `kind_name` (`"Rect"`, `"Circle"`, ...)
    pub fn find_by_kind(&self, root: NodeId, kind_name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.get(*id)
                    .is_some_and(|node| node.kind.kind_name() == kind_name)
            })
            .collect()
    }

    /// Topmost visible shape under `point`, expressed in the space of `root`
    pub fn hit_test(&self, root: NodeId, point: Pos2) -> Option<NodeId> {
        self.hit_test_in(root, point)
    }

    fn hit_test_in(&self, parent: NodeId, point: Pos2) -> Option<NodeId> {
        for child in self.children(parent).iter().rev() {
            let Some(node) = self.get(*child) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if node.kind.is_container() {
                let local = Pos2::new(
                    (point.x - node.position.x) / node.scale.x,
                    (point.y - node.position.y) / node.scale.y,
                );
                if let Some(hit) = self.hit_test_in(*child, local) {
                    return Some(hit);
                }
            } else if node_contains(node, point) {
                return Some(*child);
            }
        }
        None
    }
}
