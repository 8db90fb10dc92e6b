// SPDX-License-Identifier: Apache-2.0
// Copyright fwctl project authors

//! Wildcard-aware single-address values for firewall rules.

use crate::network::NetworkAddress;
use crate::range::IpRange;
#[cfg(any(test, feature = "bolero"))]
#[allow(unused_imports)] // re-export
pub use contract::*;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A single IP address as it appears in a firewall rule.
///
/// Thin wrapper around [`IpAddr`] with one extra convention: the all-zeros
/// IPv4 address is the wildcard meaning "matches any address" and is written
/// as `"*"`. The wildcard is special-cased in formatting only; for equality,
/// ordering, and hashing it is an ordinary zero-valued address.
#[must_use]
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SingleIp {
    /// inner (wrapped) std library [`IpAddr`]
    pub addr: IpAddr,
}

/// An error indicating that a byte sequence has no address interpretation.
#[derive(Debug, thiserror::Error)]
#[error("invalid address byte length {0}: expected 4 or 16 bytes")]
pub struct InvalidAddressBytes(pub usize);

/// An error which may occur when parsing a [`SingleIp`] from a string.
#[derive(Debug, thiserror::Error)]
pub enum SingleIpParseError {
    /// No accepted grammar matched the input.
    #[error("failed to parse input '{0}' as '*', an address, or a single-address range or network")]
    ParseFailure(String),
}

impl SingleIp {
    /// The wildcard address, matching any address in rule contexts.
    pub const ANY: SingleIp = SingleIp {
        addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    };
    /// The IPv4 loopback address, 127.0.0.1.
    pub const LOOPBACK: SingleIp = SingleIp {
        addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
    };
    /// The IPv4 broadcast address, 255.255.255.255.
    pub const BROADCAST: SingleIp = SingleIp {
        addr: IpAddr::V4(Ipv4Addr::BROADCAST),
    };
    /// The IPv6 loopback address, ::1.
    pub const LOOPBACK_V6: SingleIp = SingleIp {
        addr: IpAddr::V6(Ipv6Addr::LOCALHOST),
    };

    /// Returns true iff this is the wildcard address.
    #[must_use]
    pub fn is_any(&self) -> bool {
        *self == Self::ANY
    }

    /// Returns true iff this is a loopback address of either family.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        self.addr.is_loopback()
    }

    /// Returns true iff the wrapped address is IPv4.
    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    /// The wrapped address.
    #[must_use]
    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The raw network-order bytes of the address: 4 for v4, 16 for v6.
    #[must_use]
    pub fn octets(&self) -> Vec<u8> {
        match self.addr {
            IpAddr::V4(addr) => addr.octets().to_vec(),
            IpAddr::V6(addr) => addr.octets().to_vec(),
        }
    }
}

impl From<IpAddr> for SingleIp {
    fn from(value: IpAddr) -> Self {
        SingleIp { addr: value }
    }
}

impl From<SingleIp> for IpAddr {
    fn from(value: SingleIp) -> Self {
        value.addr
    }
}

impl From<Ipv4Addr> for SingleIp {
    fn from(value: Ipv4Addr) -> Self {
        SingleIp {
            addr: IpAddr::V4(value),
        }
    }
}

impl From<Ipv6Addr> for SingleIp {
    fn from(value: Ipv6Addr) -> Self {
        SingleIp {
            addr: IpAddr::V6(value),
        }
    }
}

impl AsRef<IpAddr> for SingleIp {
    fn as_ref(&self) -> &IpAddr {
        &self.addr
    }
}

impl From<[u8; 4]> for SingleIp {
    fn from(value: [u8; 4]) -> Self {
        SingleIp {
            addr: IpAddr::V4(value.into()),
        }
    }
}

impl From<[u8; 16]> for SingleIp {
    fn from(value: [u8; 16]) -> Self {
        SingleIp {
            addr: IpAddr::V6(value.into()),
        }
    }
}

impl From<u32> for SingleIp {
    fn from(value: u32) -> Self {
        SingleIp {
            addr: IpAddr::V4(Ipv4Addr::from(value)),
        }
    }
}

impl From<u128> for SingleIp {
    fn from(value: u128) -> Self {
        SingleIp {
            addr: IpAddr::V6(Ipv6Addr::from(value)),
        }
    }
}

impl TryFrom<&[u8]> for SingleIp {
    type Error = InvalidAddressBytes;

    /// Interpret a raw byte sequence as an address.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAddressBytes`] if the slice length is neither 4 nor 16.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.len() {
            4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(value);
                Ok(SingleIp::from(octets))
            }
            16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(value);
                Ok(SingleIp::from(octets))
            }
            len => Err(InvalidAddressBytes(len)),
        }
    }
}

impl PartialEq<IpAddr> for SingleIp {
    fn eq(&self, other: &IpAddr) -> bool {
        self.addr == *other
    }
}

impl PartialEq<SingleIp> for IpAddr {
    fn eq(&self, other: &SingleIp) -> bool {
        *self == other.addr
    }
}

impl Display for SingleIp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_any() {
            write!(f, "*")
        } else {
            write!(f, "{}", self.addr)
        }
    }
}

impl FromStr for SingleIp {
    type Err = SingleIpParseError;

    /// Attempt to parse a [`SingleIp`] from a string. First match wins:
    ///
    /// 1. `"*"` (after trimming) yields [`SingleIp::ANY`];
    /// 2. a plain v4/v6 address literal is wrapped as-is;
    /// 3. an [`IpRange`] literal whose start equals its end yields that one address;
    /// 4. a [`NetworkAddress`] literal whose masked range collapses to one address yields
    ///    that address.
    ///
    /// # Errors
    ///
    /// Returns [`SingleIpParseError::ParseFailure`] if no accepted grammar matches.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(SingleIp::ANY);
        }
        if let Ok(addr) = IpAddr::from_str(trimmed) {
            return Ok(SingleIp { addr });
        }
        if let Ok(range) = IpRange::from_str(trimmed) {
            if let Some(addr) = range.single_address() {
                return Ok(SingleIp { addr });
            }
        }
        if let Ok(network) = NetworkAddress::from_str(trimmed) {
            if let Some(addr) = network.single_address() {
                return Ok(SingleIp { addr });
            }
        }
        Err(SingleIpParseError::ParseFailure(s.to_string()))
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::single::SingleIp;
    use bolero::{Driver, TypeGenerator};
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    impl TypeGenerator for SingleIp {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(if driver.gen_bool(Some(0.5))? {
                SingleIp {
                    addr: IpAddr::V4(Ipv4Addr::from(driver.produce::<u32>()?)),
                }
            } else {
                SingleIp {
                    addr: IpAddr::V6(Ipv6Addr::from(driver.produce::<u128>()?)),
                }
            })
        }
    }
}
