//! Error types shared across the warren workspace.
//!
//! Hand-rolled enums with `Display` and `std::error::Error` impls, one per
//! failure surface: network resolution, address lookup, and the external
//! serializer contract. Errors are propagated, never retried; a mutating
//! operation that fails leaves the tree in its prior state.

use std::error::Error;
use std::fmt;

/// Errors from resolving text and a mask into a [`Network`](crate::Network).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkError {
    /// The IP text was rejected by the address parser.
    ParseAddress {
        /// The offending input text.
        text: String,
    },
    /// The prefix length is outside `1..=max_depth` for the family.
    InvalidPrefixLength {
        /// The rejected mask length.
        mask_length: u8,
        /// Maximum mask length for the address family.
        max: u8,
    },
    /// An IPv6 network cannot be stored in an IPv4 tree.
    VersionMismatch,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseAddress { text } => write!(f, "bad IP address: {text}"),
            Self::InvalidPrefixLength { mask_length, max } => {
                write!(f, "prefix length {mask_length} outside 1..={max}")
            }
            Self::VersionMismatch => {
                write!(f, "cannot store an IPv6 network in an IPv4 tree")
            }
        }
    }
}

impl Error for NetworkError {}

/// Errors from a single-address lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// The address text or family was rejected.
    Network(NetworkError),
    /// Descent ended on a `Node` record at full depth. The tree is deeper
    /// than the address space, which can only mean corruption; fatal.
    UnexpectedNode {
        /// Bit index at which the node record was found.
        bit: u8,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "{e}"),
            Self::UnexpectedNode { bit } => {
                write!(f, "found a node record at full lookup depth (bit {bit})")
            }
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::UnexpectedNode { .. } => None,
        }
    }
}

impl From<NetworkError> for LookupError {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

/// Failure reported by an external [`Serializer`](crate::Serializer).
///
/// The engine propagates it unchanged inside the write-path error; it never
/// retries a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreError {
    /// Serializer-supplied description of the failure.
    pub detail: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "serializer failed to store data: {}", self.detail)
    }
}

impl Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let e = NetworkError::ParseAddress {
            text: "1.2.3".into(),
        };
        assert_eq!(e.to_string(), "bad IP address: 1.2.3");

        let e = NetworkError::InvalidPrefixLength {
            mask_length: 33,
            max: 32,
        };
        assert_eq!(e.to_string(), "prefix length 33 outside 1..=32");
    }

    #[test]
    fn lookup_error_wraps_network_error() {
        let e: LookupError = NetworkError::VersionMismatch.into();
        assert!(matches!(e, LookupError::Network(_)));
        assert!(e.source().is_some());
    }
}
