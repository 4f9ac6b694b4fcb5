//! The warren tree engine: build, mutate, and encode CIDR search trees.
//!
//! A [`Tree`] maps IP networks to opaque data values and serializes into
//! the fixed-layout search-tree section of a compact geolocation-style
//! binary database. Construction is single-owner and synchronous: inserts
//! override earlier coverage, identical sibling data coalesces upward, and
//! IPv4 data in a v6 tree can be aliased under the v4-mapped and 6to4
//! blocks without copying.
//!
//! # Quick start
//!
//! ```rust
//! use warren_tree::{Tree, TreeConfig, RecordSize};
//! use warren_core::IpVersion;
//!
//! let mut tree: Tree<String> = Tree::new(TreeConfig {
//!     ip_version: IpVersion::V4,
//!     record_size: RecordSize::Bits28,
//!     ..TreeConfig::default()
//! })
//! .unwrap();
//!
//! tree.insert_network("1.1.1.0", 24, b"cafe", "home".into()).unwrap();
//! assert_eq!(tree.lookup("1.1.1.1").unwrap(), Some(&"home".to_string()));
//! assert_eq!(tree.lookup("8.8.8.8").unwrap(), None);
//!
//! tree.finalize();
//! assert_eq!(tree.node_count(), 24);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod data;
mod encode;
mod reserved;
mod tree;
mod walk;

pub use config::{ConfigError, RecordSize, TreeConfig};
pub use data::DataTable;
pub use encode::{WriteError, DATA_SECTION_SEPARATOR_SIZE};
pub use tree::{Tree, TreeStats};
