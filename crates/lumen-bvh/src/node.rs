//! Build-time node tree.
//!
//! Builders produce a [`NodeTree`]: an arena of nodes addressed by
//! [`NodeId`], with children always created before their parent. The tree is
//! consumed by [`crate::pack`] and never outlives a single build.

use lumen_math::Aabb;

use crate::primitive::PrimitiveRef;

/// Index of a node inside its [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the build-time tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Internal node with two children.
    Group {
        /// Exact union of the children's bounds.
        bounds: Aabb,
        /// Number of primitives in this subtree.
        count: usize,
        /// First child, packed directly after this node.
        child1: NodeId,
        /// Second child.
        child2: NodeId,
    },
    /// Leaf holding fewer than [`crate::SPLIT_LIMIT`] primitives.
    Leaf {
        /// Union of the primitives' bounds.
        bounds: Aabb,
        /// Primitives stored in this leaf.
        primitives: Vec<PrimitiveRef>,
    },
}

impl Node {
    /// Bounds of the node.
    pub fn bounds(&self) -> &Aabb {
        match self {
            Node::Group { bounds, .. } | Node::Leaf { bounds, .. } => bounds,
        }
    }

    /// Number of primitives in this subtree.
    pub fn count(&self) -> usize {
        match self {
            Node::Group { count, .. } => *count,
            Node::Leaf { primitives, .. } => primitives.len(),
        }
    }
}

/// Arena holding a complete build-time tree.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a leaf over `primitives` with the given bounds.
    pub fn push_leaf(&mut self, bounds: Aabb, primitives: Vec<PrimitiveRef>) -> NodeId {
        self.push(Node::Leaf { bounds, primitives })
    }

    /// Add a group over two existing nodes.
    pub fn push_group(&mut self, child1: NodeId, child2: NodeId) -> NodeId {
        let (a, b) = (self.node(child1), self.node(child2));
        let bounds = a.bounds().expand(b.bounds());
        let count = a.count() + b.count();
        self.push(Node::Group {
            bounds,
            count,
            child1,
            child2,
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// The root: the most recently created node.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1).map(NodeId)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Move a node out of the arena, leaving an empty leaf in its place.
    ///
    /// Used while packing so each node's primitives are released as soon as
    /// the node has been visited.
    pub fn take(&mut self, id: NodeId) -> Node {
        std::mem::replace(
            &mut self.nodes[id.0],
            Node::Leaf {
                bounds: Aabb::empty(),
                primitives: Vec::new(),
            },
        )
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
