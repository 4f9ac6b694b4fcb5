//! Encoding the finalized tree into the bit-packed record stream.
//!
//! Each node serializes as two record values packed at the configured
//! width. Record values are: `0` for empty, the target's node number for a
//! node record, and `data_offset + node_count + 16` for a data record,
//! where the data offset comes from the external serializer and 16 is the
//! width of the separator between the tree and data sections of the outer
//! file. The stream contains nothing else; headers and the data section
//! belong to the caller.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io::Write;

use warren_core::{KeyId, Record, Serializer, StoreError};

use crate::config::RecordSize;
use crate::tree::Tree;

/// Width of the separator between the tree and data sections, in bytes.
///
/// Data record values are offset by this plus the node count so readers can
/// tell the three value ranges apart.
pub const DATA_SECTION_SEPARATOR_SIZE: u32 = 16;

// ── WriteError ─────────────────────────────────────────────────────

/// Errors from [`Tree::write_tree`].
#[derive(Debug)]
pub enum WriteError {
    /// The output sink failed.
    Io(std::io::Error),
    /// The external serializer failed to store a value.
    Serializer(StoreError),
    /// A record value does not fit the configured record width.
    RecordOverflow {
        /// The value that overflowed.
        value: u32,
        /// The configured width.
        record_size: RecordSize,
    },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "writing tree section: {e}"),
            Self::Serializer(e) => write!(f, "{e}"),
            Self::RecordOverflow { value, record_size } => {
                write!(
                    f,
                    "record value {value} does not fit in {record_size} bits"
                )
            }
        }
    }
}

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serializer(e) => Some(e),
            Self::RecordOverflow { .. } => None,
        }
    }
}

impl From<std::io::Error> for WriteError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ── Packing ────────────────────────────────────────────────────────

/// Pack one node's `left` and `right` record values into `out` at the given
/// width, returning the number of bytes used.
///
/// With `[b0, b1, b2, b3]` the big-endian bytes of a value (`b0` most
/// significant):
///
/// * 24 bits: `L1 L2 L3 R1 R2 R3`
/// * 28 bits: `L1 L2 L3 (L0 << 4 | R0) R1 R2 R3` (the top nibbles share the
///   middle byte)
/// * 32 bits: `L0 L1 L2 L3 R0 R1 R2 R3`
///
/// Callers bound the values first; the packing itself masks nothing beyond
/// the 28-bit nibble share.
pub(crate) fn pack_records(size: RecordSize, left: u32, right: u32, out: &mut [u8; 8]) -> usize {
    let l = left.to_be_bytes();
    let r = right.to_be_bytes();
    match size {
        RecordSize::Bits24 => {
            out[..6].copy_from_slice(&[l[1], l[2], l[3], r[1], r[2], r[3]]);
            6
        }
        RecordSize::Bits28 => {
            out[..7].copy_from_slice(&[
                l[1],
                l[2],
                l[3],
                ((l[0] & 0x0F) << 4) | (r[0] & 0x0F),
                r[1],
                r[2],
                r[3],
            ]);
            7
        }
        RecordSize::Bits32 => {
            out[..4].copy_from_slice(&l);
            out[4..8].copy_from_slice(&r);
            8
        }
    }
}

// ── Tree write path ────────────────────────────────────────────────

impl<V> Tree<V> {
    /// Finalize, then encode the search-tree section into `sink`.
    ///
    /// Nodes are emitted in canonical traversal order, matching the numbers
    /// finalization assigned. Each distinct data key is stored through the
    /// serializer exactly once per write; `root_data_type` is passed through
    /// to it unchanged. A record value that does not fit the configured
    /// width fails with [`WriteError::RecordOverflow`] rather than
    /// truncating.
    pub fn write_tree(
        &mut self,
        sink: &mut dyn Write,
        root_data_type: &str,
        serializer: &mut dyn Serializer<V>,
    ) -> Result<(), WriteError> {
        self.finalize();
        let node_count = self.node_count();
        let mut offsets: HashMap<KeyId, u32> = HashMap::new();

        for id in self.reachable_nodes() {
            let node = self.arena.get(id);
            let (left_record, right_record) = (node.left, node.right);
            let left =
                self.record_value(left_record, node_count, &mut offsets, root_data_type, serializer)?;
            let right =
                self.record_value(right_record, node_count, &mut offsets, root_data_type, serializer)?;

            let mut buf = [0u8; 8];
            let len = pack_records(self.config.record_size, left, right, &mut buf);
            sink.write_all(&buf[..len])?;
        }
        Ok(())
    }

    /// The serialized value of one record.
    fn record_value(
        &self,
        record: Record,
        node_count: u32,
        offsets: &mut HashMap<KeyId, u32>,
        root_data_type: &str,
        serializer: &mut dyn Serializer<V>,
    ) -> Result<u32, WriteError> {
        let value = match record {
            Record::Empty => 0,
            Record::Node(id) => self.arena.get(id).number,
            Record::Data(key) => match offsets.get(&key) {
                Some(&value) => value,
                None => {
                    let position = serializer
                        .store_data(root_data_type, self.data.value(key))
                        .map_err(WriteError::Serializer)?;
                    let value = position + node_count + DATA_SECTION_SEPARATOR_SIZE;
                    offsets.insert(key, value);
                    value
                }
            },
        };
        if value > self.config.record_size.max_value() {
            return Err(WriteError::RecordOverflow {
                value,
                record_size: self.config.record_size,
            });
        }
        Ok(value)
    }
}
