//! The network model: IP prefixes as big-endian bytes plus a mask length.
//!
//! A [`Network`] stores the address bytes exactly as they appear on the
//! wire (most significant byte first) together with the prefix length.
//! Bit indices count down from `max_depth0` at the root, so descent
//! examines the most significant bit first and works left-to-right
//! across bytes.

use std::fmt;
use std::net::IpAddr;

use smallvec::SmallVec;

use crate::error::NetworkError;
use crate::record::Direction;

/// Address family of a tree or a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IpVersion {
    /// IPv4: 4 address bytes, 32-bit depth.
    V4,
    /// IPv6: 16 address bytes, 128-bit depth.
    V6,
}

impl IpVersion {
    /// Number of address bytes for this family.
    pub fn byte_len(self) -> usize {
        match self {
            Self::V4 => 4,
            Self::V6 => 16,
        }
    }

    /// Maximum prefix length (tree depth) for this family.
    pub fn max_depth(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    /// Bit index of the root-level bit: `max_depth − 1`.
    pub fn max_depth0(self) -> u8 {
        self.max_depth() - 1
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// An IP network: address bytes plus a prefix length.
///
/// The byte storage is inline (`SmallVec<[u8; 16]>` never spills for either
/// family). A `mask_length` of zero denotes the whole address space and is
/// only produced internally (the root prefix during iteration); [`parse`]
/// rejects it.
///
/// [`parse`]: Network::parse
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Network {
    bytes: SmallVec<[u8; 16]>,
    mask_length: u8,
    version: IpVersion,
}

impl Network {
    /// Parse `text` as an IP address and build the network `text/mask_length`
    /// for a tree of the given family.
    ///
    /// IPv4 text destined for an IPv6 tree is auto-mapped into the `::/96`
    /// block: the four address bytes land at offsets 12..16 and the mask
    /// grows by 96. IPv6 text destined for an IPv4 tree is rejected with
    /// [`NetworkError::VersionMismatch`]. The mask must lie in
    /// `1..=max_depth` for the family of the *text* (so v4 text takes masks
    /// `1..=32` regardless of the tree family).
    pub fn parse(text: &str, mask_length: u8, version: IpVersion) -> Result<Self, NetworkError> {
        let addr: IpAddr = text.parse().map_err(|_| NetworkError::ParseAddress {
            text: text.to_string(),
        })?;

        match (addr, version) {
            (IpAddr::V4(v4), IpVersion::V4) => {
                check_mask(mask_length, IpVersion::V4)?;
                Ok(Self {
                    bytes: SmallVec::from_slice(&v4.octets()),
                    mask_length,
                    version: IpVersion::V4,
                })
            }
            (IpAddr::V4(v4), IpVersion::V6) => {
                check_mask(mask_length, IpVersion::V4)?;
                let mut bytes = SmallVec::from_slice(&[0u8; 16]);
                bytes[12..16].copy_from_slice(&v4.octets());
                Ok(Self {
                    bytes,
                    mask_length: mask_length + 96,
                    version: IpVersion::V6,
                })
            }
            (IpAddr::V6(v6), IpVersion::V6) => {
                check_mask(mask_length, IpVersion::V6)?;
                Ok(Self {
                    bytes: SmallVec::from_slice(&v6.octets()),
                    mask_length,
                    version: IpVersion::V6,
                })
            }
            (IpAddr::V6(_), IpVersion::V4) => Err(NetworkError::VersionMismatch),
        }
    }

    /// Parse `text` as a single host: a full-depth network for the family.
    ///
    /// This is the lookup form; v4 text in a v6 tree maps to a `/128` under
    /// `::/96`.
    pub fn host(text: &str, version: IpVersion) -> Result<Self, NetworkError> {
        let addr: IpAddr = text.parse().map_err(|_| NetworkError::ParseAddress {
            text: text.to_string(),
        })?;
        let mask = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self::parse(text, mask, version)
    }

    /// The whole address space of a family: zero bytes, mask length zero.
    ///
    /// This is the prefix of the root node during iteration; it cannot be
    /// inserted or removed.
    pub fn any(version: IpVersion) -> Self {
        Self {
            bytes: SmallVec::from_elem(0, version.byte_len()),
            mask_length: 0,
            version,
        }
    }

    /// Address family of this network.
    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// Prefix length.
    pub fn mask_length(&self) -> u8 {
        self.mask_length
    }

    /// The raw address bytes, most significant first.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit index of the root-level bit for this network's family.
    pub fn max_depth0(&self) -> u8 {
        self.version.max_depth0()
    }

    /// Bit index of the final bit covered by this prefix:
    /// `max_depth0 − (mask_length − 1)`.
    pub fn last_bit(&self) -> u8 {
        self.max_depth0() - (self.mask_length - 1)
    }

    /// Value of the address bit at `index`.
    ///
    /// `index` counts down from `max_depth0` (most significant bit) to `0`
    /// (least significant). The byte/bit arithmetic mirrors the on-wire
    /// layout: bit `b` lives in `bytes[(max_depth0 − b) >> 3]` at in-byte
    /// position `!(max_depth0 − b) & 7`.
    pub fn bit_at(&self, index: u8) -> bool {
        let d = (self.max_depth0() - index) as usize;
        self.bytes[d >> 3] & (1 << (!d & 7)) != 0
    }

    /// The enclosing prefix: same bytes, `mask_length − 1`.
    ///
    /// Callers never request the parent of a `/1` (the `/0` parent is the
    /// root node itself, not a record).
    pub fn parent(&self) -> Self {
        debug_assert!(self.mask_length > 1, "a /1 network has no parent record");
        Self {
            bytes: self.bytes.clone(),
            mask_length: self.mask_length - 1,
            version: self.version,
        }
    }

    /// Re-home this network into the given family.
    ///
    /// A network already in `version` is returned unchanged; an IPv4 network
    /// maps into the `::/96` block of a v6 tree (mask + 96); an IPv6 network
    /// cannot be narrowed to v4 and yields
    /// [`NetworkError::VersionMismatch`].
    pub fn mapped_to(&self, version: IpVersion) -> Result<Self, NetworkError> {
        match (self.version, version) {
            (IpVersion::V4, IpVersion::V4) | (IpVersion::V6, IpVersion::V6) => Ok(self.clone()),
            (IpVersion::V4, IpVersion::V6) => {
                let mut bytes = SmallVec::from_slice(&[0u8; 16]);
                bytes[12..16].copy_from_slice(&self.bytes);
                Ok(Self {
                    bytes,
                    mask_length: self.mask_length + 96,
                    version: IpVersion::V6,
                })
            }
            (IpVersion::V6, IpVersion::V4) => Err(NetworkError::VersionMismatch),
        }
    }

    /// The half of this prefix selected by `dir`: mask grows by one, and the
    /// newly covered bit is set for [`Direction::Right`].
    pub fn child(&self, dir: Direction) -> Self {
        let mut bytes = self.bytes.clone();
        if dir == Direction::Right {
            let d = self.mask_length as usize;
            bytes[d >> 3] |= 1 << (!d & 7);
        }
        Self {
            bytes,
            mask_length: self.mask_length + 1,
            version: self.version,
        }
    }
}

fn check_mask(mask_length: u8, version: IpVersion) -> Result<(), NetworkError> {
    if mask_length == 0 || mask_length > version.max_depth() {
        return Err(NetworkError::InvalidPrefixLength {
            mask_length,
            max: version.max_depth(),
        });
    }
    Ok(())
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            IpVersion::V4 => {
                let b = &self.bytes;
                write!(f, "{}.{}.{}.{}/{}", b[0], b[1], b[2], b[3], self.mask_length)
            }
            IpVersion::V6 => {
                let b = &self.bytes;
                // Networks in the ::/96 block render the embedded dotted
                // quad, matching how they are presented externally.
                if self.mask_length >= 96 && b[..12].iter().all(|&x| x == 0) {
                    write!(
                        f,
                        "::{}.{}.{}.{}/{}",
                        b[12], b[13], b[14], b[15], self.mask_length
                    )
                } else {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(b);
                    write!(
                        f,
                        "{}/{}",
                        std::net::Ipv6Addr::from(octets),
                        self.mask_length
                    )
                }
            }
        }
    }
}
