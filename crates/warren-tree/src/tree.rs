//! The tree core: construction, mutation, lookup, aliasing, finalization.
//!
//! The structural engine behind the search-tree section of the database:
//! a binary trie over address bits whose leaf records reference interned
//! data values. Insertion order is semantically meaningful (later networks
//! override earlier ones for the addresses they cover); sibling records
//! with identical data coalesce upward; IPv4 data in a v6 tree is reachable
//! through alias edges that turn the tree into a DAG.

use warren_arena::NodeArena;
use warren_core::{
    Direction, IpVersion, KeyId, LookupError, Merger, Network, NetworkError, NodeId, Record,
};

use crate::config::{ConfigError, RecordSize, TreeConfig};
use crate::data::DataTable;
use crate::reserved::{IPV4_ALIASES, IPV4_RESERVED, IPV6_RESERVED};

/// An in-memory search tree mapping IP networks to opaque data values.
///
/// The tree owns its node arena and data table exclusively; there is no
/// internal locking and no operation suspends. Values are held for the
/// tree's lifetime and released wholesale on drop.
pub struct Tree<V> {
    pub(crate) config: TreeConfig,
    pub(crate) arena: NodeArena,
    pub(crate) data: DataTable<V>,
    pub(crate) root: NodeId,
    pub(crate) finalized: bool,
    pub(crate) node_count: u32,
    merger: Option<Box<dyn Merger<V>>>,
}

/// Point-in-time resource accounting for a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes allocated so far, reachable or not.
    pub allocated_nodes: u32,
    /// Chunks backing the node arena.
    pub arena_chunks: usize,
    /// Bytes reserved by the node arena.
    pub arena_bytes: usize,
    /// Distinct interned data keys.
    pub interned_values: usize,
    /// Reachable-node count, present once the tree is finalized.
    pub node_count: Option<u32>,
}

impl<V> Tree<V> {
    /// Build an empty tree from `config`.
    ///
    /// The root node is allocated eagerly; it is always a node identity and
    /// is never collapsed away.
    pub fn new(config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut arena = NodeArena::new(config.nodes_per_chunk);
        let root = arena.new_node();
        Ok(Self {
            config,
            arena,
            data: DataTable::new(),
            root,
            finalized: false,
            node_count: 0,
            merger: None,
        })
    }

    /// Install the merge callback used when
    /// [`merge_record_collisions`](TreeConfig::merge_record_collisions) is
    /// set. Without one, collisions fall back to plain override.
    pub fn set_merger(&mut self, merger: Box<dyn Merger<V>>) {
        self.merger = Some(merger);
    }

    /// Address family of this tree.
    pub fn ip_version(&self) -> IpVersion {
        self.config.ip_version
    }

    /// Serialized record width of this tree.
    pub fn record_size(&self) -> RecordSize {
        self.config.record_size
    }

    /// Whether node numbers are currently assigned.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of reachable nodes. Meaningful after [`finalize`](Tree::finalize).
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Resource accounting snapshot.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            allocated_nodes: self.arena.len(),
            arena_chunks: self.arena.chunk_count(),
            arena_bytes: self.arena.memory_bytes(),
            interned_values: self.data.len(),
            node_count: self.finalized.then_some(self.node_count),
        }
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Insert `text/mask_length` mapping to `value`, interned under `key`.
    ///
    /// Later insertions override earlier ones for the subset of addresses
    /// they cover. IPv4 text destined for a v6 tree is mapped under `::/96`;
    /// IPv6 text cannot enter a v4 tree.
    pub fn insert_network(
        &mut self,
        text: &str,
        mask_length: u8,
        key: &[u8],
        value: V,
    ) -> Result<(), NetworkError> {
        let network = Network::parse(text, mask_length, self.config.ip_version)?;
        self.insert_resolved(network, key, value);
        Ok(())
    }

    /// Insert a pre-parsed network. The network is re-homed into the tree's
    /// family first, with the same rules as [`insert_network`](Tree::insert_network).
    pub fn insert(&mut self, network: &Network, key: &[u8], value: V) -> Result<(), NetworkError> {
        let network = network.mapped_to(self.config.ip_version)?;
        self.insert_resolved(network, key, value);
        Ok(())
    }

    fn insert_resolved(&mut self, network: Network, key: &[u8], value: V) {
        let key = self.data.intern(key, value);
        self.insert_record(&network, Record::Data(key));
        self.finalized = false;
    }

    /// Remove `text/mask_length` if it currently resolves to any non-empty
    /// record along the matching descent; otherwise a no-op.
    ///
    /// Removal installs an `Empty` record, splitting wider data coverage as
    /// needed to punch the hole; interior nodes are not compacted. An IPv6
    /// network offered to a v4 tree is silently ignored.
    pub fn remove_network(&mut self, text: &str, mask_length: u8) -> Result<(), NetworkError> {
        let network = match Network::parse(text, mask_length, self.config.ip_version) {
            Ok(network) => network,
            Err(NetworkError::VersionMismatch) => return Ok(()),
            Err(e) => return Err(e),
        };
        self.remove_resolved(&network);
        Ok(())
    }

    /// Remove a pre-parsed network, with the same semantics as
    /// [`remove_network`](Tree::remove_network).
    pub fn remove(&mut self, network: &Network) {
        if let Ok(network) = network.mapped_to(self.config.ip_version) {
            self.remove_resolved(&network);
        }
    }

    fn remove_resolved(&mut self, network: &Network) {
        if !self.contains_resolved(network) {
            return;
        }
        self.insert_record_plain(network, Record::Empty);
        self.finalized = false;
    }

    /// Remove the built-in reserved networks for this tree's family.
    ///
    /// A v4 tree removes the IPv4 table at native masks. A v6 tree removes
    /// the IPv4 table through the v4-in-v6 mapping (mask + 96) plus the
    /// IPv6 table at native masks.
    pub fn remove_reserved_networks(&mut self) {
        for &(text, mask) in IPV4_RESERVED {
            self.remove_network(text, mask)
                .expect("reserved network tables hold valid prefixes");
        }
        if self.config.ip_version == IpVersion::V6 {
            for &(text, mask) in IPV6_RESERVED {
                self.remove_network(text, mask)
                    .expect("reserved network tables hold valid prefixes");
            }
        }
    }

    // ── Lookup ─────────────────────────────────────────────────────

    /// Look up a single address. Returns the value of the narrowest network
    /// containing it, or `None`.
    pub fn lookup(&self, text: &str) -> Result<Option<&V>, LookupError> {
        let network = Network::host(text, self.config.ip_version)?;
        let (node_id, bit) = self.descend(&network);
        let dir = Direction::from_bit(network.bit_at(bit));
        match self.arena.get(node_id).record(dir) {
            Record::Empty => Ok(None),
            Record::Data(key) => Ok(Some(self.data.value(key))),
            Record::Node(_) => Err(LookupError::UnexpectedNode { bit }),
        }
    }

    /// Whether the network currently resolves to any non-empty record along
    /// the matching descent.
    pub fn contains(&self, network: &Network) -> bool {
        match network.mapped_to(self.config.ip_version) {
            Ok(network) => self.contains_resolved(&network),
            Err(_) => false,
        }
    }

    fn contains_resolved(&self, network: &Network) -> bool {
        let (node_id, bit) = self.descend(network);
        let dir = Direction::from_bit(network.bit_at(bit));
        !self.arena.get(node_id).record(dir).is_empty()
    }

    // ── Aliasing ───────────────────────────────────────────────────

    /// Attach the v4-mapped (`::ffff:0:0/96`) and 6to4 (`2002::/16`) alias
    /// prefixes to the IPv4 root of a v6 tree.
    ///
    /// The aliases point at the *same* node as the native `::/96` subtree,
    /// turning the tree into a DAG; nothing is copied. If the tree holds no
    /// IPv4 data (the `::/96` descent bails early or lands on an empty
    /// record) this is a no-op. On a v4 tree it is always a no-op.
    pub fn alias_ipv4_networks(&mut self) {
        if self.config.ip_version == IpVersion::V4 {
            return;
        }

        let probe = Network::parse("::", 96, IpVersion::V6)
            .expect("the IPv4 root probe network is valid");
        let (node_id, bit) = self.descend(&probe);
        // Bailing out above bit 32 means no node refines the ::/96 path,
        // so there is no IPv4 data to alias.
        if bit != 32 {
            return;
        }

        let dir = Direction::from_bit(probe.bit_at(bit));
        let ipv4_root = match self.arena.get(node_id).record(dir) {
            Record::Node(id) => id,
            Record::Data(key) => {
                // The whole v4 space is a single value; give it a node so
                // the aliases have an identity to share.
                let id = self.arena.new_node();
                let node = self.arena.get_mut(id);
                node.left = Record::Data(key);
                node.right = Record::Data(key);
                self.arena.get_mut(node_id).set_record(dir, Record::Node(id));
                id
            }
            Record::Empty => return,
        };

        for &(text, mask) in IPV4_ALIASES {
            let alias = Network::parse(text, mask, IpVersion::V6)
                .expect("the alias tables hold valid prefixes");
            let alias_node = self.descend_or_create(&alias);
            let dir = Direction::from_bit(alias.bit_at(alias.last_bit()));
            self.arena
                .get_mut(alias_node)
                .set_record(dir, Record::Node(ipv4_root));
        }
        self.finalized = false;
    }

    // ── Finalization ───────────────────────────────────────────────

    /// Assign dense node numbers in traversal order. Idempotent; any
    /// mutation resets the numbering.
    ///
    /// The root is visited first and takes number `0`, which collides with
    /// the `Empty` encoding sentinel. That is safe because no record ever
    /// points back to the root.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        let order = self.reachable_nodes();
        for (number, &id) in order.iter().enumerate() {
            self.arena.get_mut(id).number = number as u32;
        }
        self.node_count = order.len() as u32;
        self.finalized = true;
    }

    // ── Descent ────────────────────────────────────────────────────

    /// Walk toward the network's final bit, allocating through non-node
    /// records, and return the node owning the final-bit record.
    ///
    /// Descending into a `Data` record splits it: the fresh node starts
    /// with *both* children carrying that data, preserving coverage of the
    /// half the descent abandons.
    pub(crate) fn descend_or_create(&mut self, network: &Network) -> NodeId {
        let mut node_id = self.root;
        let last_bit = network.last_bit();
        let mut bit = network.max_depth0();
        while bit > last_bit {
            let dir = Direction::from_bit(network.bit_at(bit));
            let next = match self.arena.get(node_id).record(dir) {
                Record::Node(id) => id,
                Record::Empty => {
                    let id = self.arena.new_node();
                    self.arena.get_mut(node_id).set_record(dir, Record::Node(id));
                    id
                }
                Record::Data(key) => {
                    let id = self.arena.new_node();
                    let node = self.arena.get_mut(id);
                    node.left = Record::Data(key);
                    node.right = Record::Data(key);
                    self.arena.get_mut(node_id).set_record(dir, Record::Node(id));
                    id
                }
            };
            node_id = next;
            bit -= 1;
        }
        node_id
    }

    /// Walk toward the network's final bit without mutating, bailing out at
    /// the first non-node record. Returns the containing node and the bit
    /// index at which the walk stopped (`last_bit` on a complete descent).
    pub(crate) fn descend(&self, network: &Network) -> (NodeId, u8) {
        let mut node_id = self.root;
        let last_bit = network.last_bit();
        let mut bit = network.max_depth0();
        while bit > last_bit {
            let dir = Direction::from_bit(network.bit_at(bit));
            match self.arena.get(node_id).record(dir) {
                Record::Node(id) => {
                    node_id = id;
                    bit -= 1;
                }
                _ => return (node_id, bit),
            }
        }
        (node_id, bit)
    }

    // ── Record installation ────────────────────────────────────────

    /// Install `new_record` for `network`, applying merge-on-collision when
    /// configured.
    fn insert_record(&mut self, network: &Network, new_record: Record) {
        let node_id = self.descend_or_create(network);
        let dir = Direction::from_bit(network.bit_at(network.last_bit()));

        let mut record = new_record;
        if let Record::Data(new_key) = new_record {
            if self.config.merge_record_collisions && self.merger.is_some() {
                let target = self.arena.get(node_id).record(dir);
                if !target.is_empty() {
                    record = self.merged_record(target, new_key);
                }
            }
        }
        self.finish_insert(node_id, dir, network, record);
    }

    /// Install a record without consulting the merger. Used for removals
    /// and for the structural parent writes of coalescence.
    fn insert_record_plain(&mut self, network: &Network, record: Record) {
        let node_id = self.descend_or_create(network);
        let dir = Direction::from_bit(network.bit_at(network.last_bit()));
        self.finish_insert(node_id, dir, network, record);
    }

    /// Coalescence check, then the local write.
    ///
    /// If the sibling record already carries the same data, the record is
    /// first inserted for the parent network, aggregating one level up
    /// (recursively). The local write still happens afterwards so the
    /// now-orphaned node keeps consistent leaves in case an ancestor was
    /// itself coalesced. Coalescence stops below the root: records living
    /// on the root node itself are never rewritten by it, which keeps the
    /// root's direct children stable.
    fn finish_insert(&mut self, node_id: NodeId, dir: Direction, network: &Network, record: Record) {
        if let Record::Data(key) = record {
            let sibling = self.arena.get(node_id).record(dir.opposite());
            if sibling == Record::Data(key) && network.mask_length() > 2 {
                self.insert_record_plain(&network.parent(), record);
            }
        }
        self.arena.get_mut(node_id).set_record(dir, record);
    }

    /// Merge `new_key`'s value into an occupied record position.
    ///
    /// `Data` positions merge pairwise through the installed callback;
    /// `Node` positions recurse into both halves so the policy applies
    /// independently at every leaf the insert covers, with the merger
    /// firing at most once per leaf. A subtree whose halves come out as the
    /// same data collapses to a single record on the way back up.
    fn merged_record(&mut self, existing: Record, new_key: KeyId) -> Record {
        match existing {
            Record::Empty => Record::Data(new_key),
            Record::Data(key) if key == new_key => existing,
            Record::Data(key) => {
                let merged = match self.merger.as_mut() {
                    Some(merger) => merger.merge(self.data.value(key), self.data.value(new_key)),
                    None => return Record::Data(new_key),
                };
                Record::Data(self.data.intern(&merged.key, merged.value))
            }
            Record::Node(id) => {
                let left = self.arena.get(id).left;
                let merged_left = self.merged_record(left, new_key);
                let right = self.arena.get(id).right;
                let merged_right = self.merged_record(right, new_key);
                if let (Record::Data(a), Record::Data(b)) = (merged_left, merged_right) {
                    if a == b {
                        return Record::Data(a);
                    }
                }
                let node = self.arena.get_mut(id);
                node.left = merged_left;
                node.right = merged_right;
                Record::Node(id)
            }
        }
    }
}
