//! Warren: an in-memory CIDR search tree that serializes into the
//! search-tree section of a compact binary geolocation database.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the warren sub-crates. For most users, adding `warren` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use warren::prelude::*;
//!
//! // A serializer stub that stores values at sequential offsets.
//! struct Flat(u32);
//! impl Serializer<String> for Flat {
//!     fn store_data(&mut self, _tag: &str, _value: &String) -> Result<u32, StoreError> {
//!         let at = self.0;
//!         self.0 += 16;
//!         Ok(at)
//!     }
//! }
//!
//! let mut tree: Tree<String> = Tree::new(TreeConfig {
//!     ip_version: IpVersion::V6,
//!     ..TreeConfig::default()
//! })
//! .unwrap();
//!
//! // IPv4 networks map under ::/96 in a v6 tree.
//! tree.insert_network("81.2.69.0", 24, b"gb", "GB".into()).unwrap();
//! tree.alias_ipv4_networks();
//! assert_eq!(tree.lookup("::ffff:81.2.69.160").unwrap(), Some(&"GB".to_string()));
//!
//! let mut section = Vec::new();
//! tree.write_tree(&mut section, "map", &mut Flat(0)).unwrap();
//! assert_eq!(section.len(), tree.node_count() as usize * 7);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `warren-core` | Networks, records, IDs, traits, errors |
//! | [`arena`] | `warren-arena` | Chunked node storage |
//! | [`tree`] | `warren-tree` | The tree engine, config, encoder |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Networks, records, IDs, collaborator traits, and errors (`warren-core`).
pub use warren_core as types;

/// Chunked node storage with stable identities (`warren-arena`).
pub use warren_arena as arena;

/// The tree engine, its configuration, and the encoder (`warren-tree`).
pub use warren_tree as tree;

/// Common imports for typical warren usage.
///
/// ```rust
/// use warren::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use warren_core::{
        Direction, IpVersion, KeyId, Merged, Merger, Network, NodeId, Record, Serializer, Visitor,
    };

    // Errors
    pub use warren_core::{LookupError, NetworkError, StoreError};
    pub use warren_tree::{ConfigError, WriteError};

    // Engine
    pub use warren_tree::{RecordSize, Tree, TreeConfig, TreeStats};
}
