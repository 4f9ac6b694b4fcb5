//! Chunked node storage for the warren tree.
//!
//! Nodes are allocated in fixed-size chunks and addressed by index, so a
//! [`NodeId`](warren_core::NodeId) handed out before a growth stays valid
//! afterwards. Descent writes child identities into parent records while
//! still allocating, which is exactly the situation a reallocating flat
//! buffer would break.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod pool;

pub use pool::{NodeArena, DEFAULT_NODES_PER_CHUNK};
