//! Extension-point traits: the merge callback, the data-section serializer,
//! and the record visitor.
//!
//! These traits decouple the tree engine from its collaborators: the engine
//! never invents keys, never encodes data values, and never interprets what
//! a visitor does with a record. All three are synchronous; errors bubble up
//! unchanged.

use crate::error::StoreError;
use crate::net::Network;
use crate::record::Direction;

/// A merged value together with the key it should be interned under.
///
/// Keys are caller-derived (typically a content hash of the value), so the
/// merger returns both. A merged value whose key is byte-equal to an
/// existing key interns to the same identity, which makes sibling
/// coalescence apply to merge results like any other data record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Merged<V> {
    /// Key bytes for the merged value.
    pub key: Vec<u8>,
    /// The merged value itself.
    pub value: V,
}

/// Resolves a data collision during insertion.
///
/// Invoked when the tree is configured with merge-on-collision and an
/// insert lands on a position that already holds a different value. Called
/// at most once per leaf position per insert.
pub trait Merger<V> {
    /// Combine the value already in the tree with the incoming one.
    fn merge(&mut self, existing: &V, incoming: &V) -> Merged<V>;
}

impl<V, F> Merger<V> for F
where
    F: FnMut(&V, &V) -> Merged<V>,
{
    fn merge(&mut self, existing: &V, incoming: &V) -> Merged<V> {
        self(existing, incoming)
    }
}

/// Stores data values into the external data section during encoding.
///
/// The engine calls [`store_data`](Serializer::store_data) exactly once per
/// distinct data key per write and offsets the returned position past the
/// tree region and the data-section separator itself.
pub trait Serializer<V> {
    /// Store one value and return its byte offset within the data section.
    ///
    /// `root_data_type` is an opaque tag chosen by the caller of the write
    /// and passed through unchanged.
    fn store_data(&mut self, root_data_type: &str, value: &V) -> Result<u32, StoreError>;
}

/// Receives one callback per record position during iteration.
///
/// For every reachable node, the left record is reported before the right
/// one, and each node identity is reported exactly once even when aliasing
/// makes it reachable through several parents. `node_net` is the prefix of
/// the containing node; `record_net` is the half selected by `dir`.
///
/// All methods default to doing nothing, so a visitor implements only the
/// record kinds it cares about. Visitors observe the tree; they cannot
/// mutate it.
pub trait Visitor<V> {
    /// A record that delegates to a deeper node.
    fn on_node_record(
        &mut self,
        node_number: u32,
        dir: Direction,
        node_net: &Network,
        record_net: &Network,
        target_number: u32,
    ) {
        let _ = (node_number, dir, node_net, record_net, target_number);
    }

    /// A record that carries no information.
    fn on_empty_record(
        &mut self,
        node_number: u32,
        dir: Direction,
        node_net: &Network,
        record_net: &Network,
    ) {
        let _ = (node_number, dir, node_net, record_net);
    }

    /// A record that resolves the whole half-prefix to a data value.
    #[allow(clippy::too_many_arguments)]
    fn on_data_record(
        &mut self,
        node_number: u32,
        dir: Direction,
        node_net: &Network,
        record_net: &Network,
        key: &[u8],
        value: &V,
    ) {
        let _ = (node_number, dir, node_net, record_net, key, value);
    }
}
