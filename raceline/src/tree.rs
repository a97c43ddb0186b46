use std::fmt;

use anyhow::{bail, Result};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use geom::{Distance, Pt2D};

/// Nodes are identified by their insertion order, never by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(pub usize);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Node #{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeID,
    pub pos: Pt2D,
    /// Only the root has no parent.
    pub parent: Option<NodeID>,
}

/// Positions as the R-tree sees them.
#[derive(Clone, Debug)]
struct IndexedNode {
    pt: [f64; 2],
    id: NodeID,
}

impl RTreeObject for IndexedNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pt)
    }
}

impl PointDistance for IndexedNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Pt2D::new(self.pt[0], self.pt[1]).raw_dist_squared(Pt2D::new(point[0], point[1]))
    }
}

/// The arena of nodes discovered by one planning run, linked to their parents. Following parent
/// links from any node always reaches the root.
pub struct PlanningTree {
    nodes: Vec<Node>,
    // When present, mirrors every node's position. Queries through it return exactly what a
    // linear scan would.
    index: Option<RTree<IndexedNode>>,
}

impl PlanningTree {
    pub fn new(root: Pt2D, spatial_index: bool) -> PlanningTree {
        let mut tree = PlanningTree {
            nodes: Vec::new(),
            index: if spatial_index {
                Some(RTree::new())
            } else {
                None
            },
        };
        tree.push(root, None);
        tree
    }

    pub fn root(&self) -> NodeID {
        NodeID(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeID) -> &Node {
        &self.nodes[id.0]
    }

    pub fn pos(&self, id: NodeID) -> Pt2D {
        self.nodes[id.0].pos
    }

    pub fn parent(&self, id: NodeID) -> Option<NodeID> {
        self.nodes[id.0].parent
    }

    /// In insertion order
    pub fn all_nodes(&self) -> &Vec<Node> {
        &self.nodes
    }

    pub fn insert(&mut self, pos: Pt2D, parent: NodeID) -> NodeID {
        assert!(parent.0 < self.nodes.len(), "{} isn't in the tree", parent);
        self.push(pos, Some(parent))
    }

    fn push(&mut self, pos: Pt2D, parent: Option<NodeID>) -> NodeID {
        let id = NodeID(self.nodes.len());
        self.nodes.push(Node { id, pos, parent });
        if let Some(ref mut index) = self.index {
            index.insert(IndexedNode {
                pt: pos.to_array(),
                id,
            });
        }
        id
    }

    /// Reparents a node. Panics if that would detach the root or create a cycle.
    pub fn set_parent(&mut self, id: NodeID, parent: NodeID) {
        assert_ne!(id, self.root(), "The root can't have a parent");
        assert!(
            !self.is_ancestor_or_self(id, parent),
            "Making {} the parent of {} would create a cycle",
            parent,
            id
        );
        self.nodes[id.0].parent = Some(parent);
    }

    /// Is `ancestor` on the path from `id` to the root, or `id` itself?
    pub fn is_ancestor_or_self(&self, ancestor: NodeID, id: NodeID) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// The length of the path from the root to this node, recomputed by walking parent links
    /// every time. O(depth).
    pub fn cost(&self, id: NodeID) -> Distance {
        let mut cost = Distance::ZERO;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            cost += self.pos(current).dist_to(self.pos(parent));
            current = parent;
        }
        cost
    }

    /// The node closest to `pt`. Ties go to the node inserted first.
    pub fn nearest(&self, pt: Pt2D) -> NodeID {
        match self.index {
            Some(ref index) => {
                // nearest_neighbor finds some closest node; then gather everything at most that
                // far away, to settle ties the same way the linear scan does.
                let query = pt.to_array();
                let closest = match index.nearest_neighbor(&query) {
                    Some(closest) => closest,
                    None => unreachable!("the tree always has a root"),
                };
                let best_dist = closest.distance_2(&query);
                index
                    .locate_within_distance(query, best_dist)
                    .map(|node| (node.distance_2(&query), node.id))
                    .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)))
                    .map(|(_, id)| id)
                    .unwrap_or(closest.id)
            }
            None => self.nearest_by_scan(pt),
        }
    }

    fn nearest_by_scan(&self, pt: Pt2D) -> NodeID {
        let mut best = self.root();
        let mut best_dist = f64::INFINITY;
        for node in &self.nodes {
            let dist = node.pos.raw_dist_squared(pt);
            if dist < best_dist {
                best = node.id;
                best_dist = dist;
            }
        }
        best
    }

    /// Every node within `radius` of `pt` (inclusive), in insertion order.
    pub fn within_radius(&self, pt: Pt2D, radius: Distance) -> Vec<NodeID> {
        let max_dist = radius.squared();
        match self.index {
            Some(ref index) => {
                let mut ids: Vec<NodeID> = index
                    .locate_within_distance(pt.to_array(), max_dist)
                    .map(|node| node.id)
                    .collect();
                ids.sort();
                ids
            }
            None => self
                .nodes
                .iter()
                .filter(|node| node.pos.raw_dist_squared(pt) <= max_dist)
                .map(|node| node.id)
                .collect(),
        }
    }

    /// From the root to this node, inclusive.
    pub fn path_from_root(&self, id: NodeID) -> Vec<NodeID> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Checks that every node reaches the root by following at most `len` parent links, and only
    /// the root lacks a parent.
    pub fn check_invariants(&self) -> Result<()> {
        for node in &self.nodes {
            if node.id != self.root() && node.parent.is_none() {
                bail!("{} has no parent", node.id);
            }
            if node.parent == Some(node.id) {
                bail!("{} is its own parent", node.id);
            }
            let mut current = node.id;
            let mut steps = 0;
            while let Some(parent) = self.parent(current) {
                if parent.0 >= self.nodes.len() {
                    bail!("{} has a dangling parent {}", current, parent);
                }
                steps += 1;
                if steps > self.nodes.len() {
                    bail!("{} never reaches the root", node.id);
                }
                current = parent;
            }
            if current != self.root() {
                bail!("{} leads to {}, not the root", node.id, current);
            }
        }
        Ok(())
    }
}
