// SPDX-License-Identifier: Apache-2.0
// Copyright fwctl project authors

//! Inclusive IP address ranges.

#[cfg(any(test, feature = "bolero"))]
#[allow(unused_imports)] // re-export
pub use contract::*;
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

/// An inclusive range of IP addresses.
///
/// Both bounds always belong to the same address family, and the start never
/// exceeds the end.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpRange {
    start: IpAddr,
    end: IpAddr,
}

/// An error indicating that an invalid address range was provided.
#[derive(Debug, thiserror::Error)]
pub enum InvalidIpRange {
    /// The range bounds belong to different address families.
    #[error("range start {0} and range end {1} belong to different address families")]
    AddressFamilyMismatch(IpAddr, IpAddr),
    /// The range end precedes the range start.
    #[error("range end {1} precedes range start {0}")]
    EndBeforeStart(IpAddr, IpAddr),
}

/// An error which may occur when parsing an [`IpRange`] from a string.
#[derive(Debug, thiserror::Error)]
pub enum IpRangeParseError {
    /// Both bounds parsed as addresses but do not form a valid range.
    #[error(transparent)]
    InvalidRange(#[from] InvalidIpRange),
    /// Failed to interpret the input as one address or a pair of addresses.
    #[error("failed to parse input '{0}' as an ip range")]
    ParseFailure(String),
}

impl IpRange {
    /// Constructor which validates the bounds provided.
    ///
    /// # Errors
    ///
    /// * Returns [`InvalidIpRange::AddressFamilyMismatch`] if `start` and `end` belong to
    ///   different address families.
    /// * Returns [`InvalidIpRange::EndBeforeStart`] if `end` precedes `start`.
    #[tracing::instrument(level = "trace")]
    pub fn try_new(start: IpAddr, end: IpAddr) -> Result<IpRange, InvalidIpRange> {
        if start.is_ipv4() != end.is_ipv4() {
            return Err(InvalidIpRange::AddressFamilyMismatch(start, end));
        }
        if start > end {
            return Err(InvalidIpRange::EndBeforeStart(start, end));
        }
        Ok(IpRange { start, end })
    }

    /// The first address in the range.
    #[must_use]
    pub const fn start(&self) -> IpAddr {
        self.start
    }

    /// The last address in the range.
    #[must_use]
    pub const fn end(&self) -> IpAddr {
        self.end
    }

    /// Returns true iff the range covers exactly one address.
    #[must_use]
    pub fn is_single_address(&self) -> bool {
        self.start == self.end
    }

    /// The single address covered by this range, if the range covers exactly one.
    #[must_use]
    pub fn single_address(&self) -> Option<IpAddr> {
        self.is_single_address().then_some(self.start)
    }

    /// Returns true iff `addr` is of the same family as the range and falls within its bounds.
    #[must_use]
    pub fn contains(&self, addr: IpAddr) -> bool {
        if addr.is_ipv4() != self.start.is_ipv4() {
            return false;
        }
        self.start <= addr && addr <= self.end
    }
}

impl From<IpAddr> for IpRange {
    fn from(value: IpAddr) -> Self {
        IpRange {
            start: value,
            end: value,
        }
    }
}

impl Display for IpRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for IpRange {
    type Err = IpRangeParseError;

    /// Attempt to parse an [`IpRange`] from a `start-end` pair or a bare
    /// address (which yields the degenerate one-address range).
    ///
    /// # Errors
    ///
    /// * Returns [`IpRangeParseError::ParseFailure`] if either bound fails to parse as an
    ///   address.
    /// * Returns [`IpRangeParseError::InvalidRange`] if both bounds parse but do not form a
    ///   valid range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('-') {
            Some((start, end)) => {
                let start = IpAddr::from_str(start.trim())
                    .map_err(|_| IpRangeParseError::ParseFailure(s.to_string()))?;
                let end = IpAddr::from_str(end.trim())
                    .map_err(|_| IpRangeParseError::ParseFailure(s.to_string()))?;
                Ok(IpRange::try_new(start, end)?)
            }
            None => IpAddr::from_str(trimmed)
                .map(IpRange::from)
                .map_err(|_| IpRangeParseError::ParseFailure(s.to_string())),
        }
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::range::IpRange;
    use bolero::{Driver, TypeGenerator};
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    impl TypeGenerator for IpRange {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(if driver.gen_bool(Some(0.5))? {
                let a = driver.produce::<u32>()?;
                let b = driver.produce::<u32>()?;
                IpRange {
                    start: IpAddr::V4(Ipv4Addr::from(a.min(b))),
                    end: IpAddr::V4(Ipv4Addr::from(a.max(b))),
                }
            } else {
                let a = driver.produce::<u128>()?;
                let b = driver.produce::<u128>()?;
                IpRange {
                    start: IpAddr::V6(Ipv6Addr::from(a.min(b))),
                    end: IpAddr::V6(Ipv6Addr::from(a.max(b))),
                }
            })
        }
    }
}
