//! Core types and traits for the warren CIDR search-tree engine.
//!
//! This is the leaf crate with no internal warren dependencies. It defines
//! the network model (addresses as fixed-width big-endian bytes plus a
//! prefix length), the record/node data model, strongly-typed identifiers,
//! the external collaborator traits (merger, serializer, visitor), and the
//! error types shared across the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod net;
pub mod record;
pub mod traits;

// Re-export core types at crate root for convenience.
pub use error::{LookupError, NetworkError, StoreError};
pub use id::{KeyId, NodeId};
pub use net::{IpVersion, Network};
pub use record::{Direction, Node, Record};
pub use traits::{Merged, Merger, Serializer, Visitor};
