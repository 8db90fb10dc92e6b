// SPDX-License-Identifier: Apache-2.0
// Copyright fwctl project authors

//! Address value types for firewall rule endpoints.
//!
//! A rule endpoint is one of three textual shapes: a single address (with
//! `"*"` as the wildcard meaning "any address"), an inclusive start-end
//! range, or an address qualified by a subnet mask. [`SingleIp`] is the
//! wildcard-aware single-address value; [`IpRange`] and [`NetworkAddress`]
//! are the other two shapes, which [`SingleIp`] parsing also consults to
//! accept degenerate one-address spellings of either.

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

pub mod network;
pub mod range;
pub mod single;

pub use network::NetworkAddress;
pub use range::IpRange;
pub use single::SingleIp;
