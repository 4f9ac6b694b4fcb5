//! Tree configuration and validation.

use std::error::Error;
use std::fmt;

use warren_arena::DEFAULT_NODES_PER_CHUNK;
use warren_core::IpVersion;

// ── RecordSize ─────────────────────────────────────────────────────

/// Bit width of one child pointer in the serialized form.
///
/// Fixed at tree construction; it constrains serialization only. The width
/// governs both the packing layout and the largest representable record
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordSize {
    /// 24 bits per record, 6 bytes per node.
    Bits24,
    /// 28 bits per record, 7 bytes per node.
    Bits28,
    /// 32 bits per record, 8 bytes per node.
    Bits32,
}

impl RecordSize {
    /// Build from a raw bit count; only 24, 28, and 32 are valid.
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            24 => Ok(Self::Bits24),
            28 => Ok(Self::Bits28),
            32 => Ok(Self::Bits32),
            _ => Err(ConfigError::InvalidRecordSize { configured: bits }),
        }
    }

    /// The raw bit count.
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits24 => 24,
            Self::Bits28 => 28,
            Self::Bits32 => 32,
        }
    }

    /// Serialized bytes per node (two records).
    pub fn bytes_per_node(self) -> usize {
        match self {
            Self::Bits24 => 6,
            Self::Bits28 => 7,
            Self::Bits32 => 8,
        }
    }

    /// Largest record value the width can represent.
    pub fn max_value(self) -> u32 {
        match self {
            Self::Bits24 => (1 << 24) - 1,
            Self::Bits28 => (1 << 28) - 1,
            Self::Bits32 => u32::MAX,
        }
    }
}

impl fmt::Display for RecordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// ── TreeConfig ─────────────────────────────────────────────────────

/// Configuration for a [`Tree`](crate::Tree).
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Address family of the tree.
    pub ip_version: IpVersion,
    /// Serialized record width.
    pub record_size: RecordSize,
    /// Arena growth granularity in nodes.
    pub nodes_per_chunk: u32,
    /// Resolve data collisions through the installed merge callback instead
    /// of overwriting. Without an installed merger the flag has no effect.
    pub merge_record_collisions: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            ip_version: IpVersion::V6,
            record_size: RecordSize::Bits28,
            nodes_per_chunk: DEFAULT_NODES_PER_CHUNK,
            merge_record_collisions: false,
        }
    }
}

impl TreeConfig {
    /// Check structural invariants before a tree is built from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes_per_chunk == 0 {
            return Err(ConfigError::ZeroChunk);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`TreeConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The record width is not one of 24, 28, or 32 bits.
    InvalidRecordSize {
        /// The rejected bit count.
        configured: u8,
    },
    /// The arena chunk size is zero.
    ZeroChunk,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecordSize { configured } => {
                write!(f, "record size must be 24, 28, or 32 bits, got {configured}")
            }
            Self::ZeroChunk => write!(f, "arena chunk size must be non-zero"),
        }
    }
}

impl Error for ConfigError {}
