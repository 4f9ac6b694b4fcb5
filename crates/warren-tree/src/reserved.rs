//! Built-in reserved and alias prefix tables.
//!
//! The reserved lists match the IANA special-purpose registries as carried
//! by the produced database format. For an IPv6 tree the IPv4 entries are
//! removed through the v4-in-v6 mapping (mask + 96) and the IPv6 entries at
//! their native masks.

/// IPv4 networks that never carry public data.
pub(crate) const IPV4_RESERVED: &[(&str, u8)] = &[
    ("0.0.0.0", 8),
    ("10.0.0.0", 8),
    ("100.64.0.0", 10),
    ("127.0.0.0", 8),
    ("169.254.0.0", 16),
    ("172.16.0.0", 12),
    ("192.0.0.0", 29),
    ("192.0.2.0", 24),
    ("192.88.99.0", 24),
    ("192.168.0.0", 16),
    ("198.18.0.0", 15),
    ("198.51.100.0", 24),
    ("224.0.0.0", 4),
    ("240.0.0.0", 4),
];

/// IPv6 networks that never carry public data.
pub(crate) const IPV6_RESERVED: &[(&str, u8)] = &[
    ("100::", 64),
    ("2001::", 23),
    ("2001:db8::", 32),
    ("fc00::", 7),
    ("fe80::", 10),
    ("ff00::", 8),
];

/// Prefixes aliased onto the IPv4 root of a v6 tree: the v4-mapped block
/// and the 6to4 block.
pub(crate) const IPV4_ALIASES: &[(&str, u8)] = &[("::ffff:0:0", 96), ("2002::", 16)];
