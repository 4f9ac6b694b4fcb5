//! The chunked node pool.

use warren_core::{Node, NodeId};

/// Default chunk size: 2^18 nodes.
///
/// A country-level geolocation tree runs around 250k nodes and a city-level
/// one a few million, so one or a handful of chunks covers the common cases.
pub const DEFAULT_NODES_PER_CHUNK: u32 = 262_144;

/// Bulk allocator for tree nodes with stable index identities.
///
/// Storage is a list of fixed-capacity chunks. Allocation appends to the
/// last chunk and starts a new one when it fills; existing chunks are never
/// resized or moved, and nodes are never freed individually. Teardown drops
/// the whole pool at once.
pub struct NodeArena {
    chunks: Vec<Vec<Node>>,
    nodes_per_chunk: u32,
    len: u32,
}

impl NodeArena {
    /// Create an empty arena that grows `nodes_per_chunk` nodes at a time.
    ///
    /// `nodes_per_chunk` must be non-zero; the tree configuration validates
    /// this before construction.
    pub fn new(nodes_per_chunk: u32) -> Self {
        debug_assert!(nodes_per_chunk > 0, "chunk size must be non-zero");
        Self {
            chunks: Vec::new(),
            nodes_per_chunk,
            len: 0,
        }
    }

    /// Allocate a fresh node: both records empty, number zero.
    pub fn new_node(&mut self) -> NodeId {
        let per_chunk = self.nodes_per_chunk as usize;
        if self
            .chunks
            .last()
            .map_or(true, |chunk| chunk.len() == per_chunk)
        {
            self.chunks.push(Vec::with_capacity(per_chunk));
        }
        let chunk = self
            .chunks
            .last_mut()
            .expect("a chunk with free capacity exists after the growth check");
        chunk.push(Node::new());

        let id = NodeId(self.len);
        self.len += 1;
        id
    }

    /// Shared access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this arena.
    pub fn get(&self, id: NodeId) -> &Node {
        let per_chunk = self.nodes_per_chunk;
        &self.chunks[(id.0 / per_chunk) as usize][(id.0 % per_chunk) as usize]
    }

    /// Mutable access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this arena.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        let per_chunk = self.nodes_per_chunk;
        &mut self.chunks[(id.0 / per_chunk) as usize][(id.0 % per_chunk) as usize]
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no nodes have been allocated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks currently backing the pool.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes reserved by the chunk storage.
    pub fn memory_bytes(&self) -> usize {
        self.chunks.len() * self.nodes_per_chunk as usize * std::mem::size_of::<Node>()
    }
}
