// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! IPv4/IPv6 address ranges in three interchangeable encodings:
//! [Subnet] (CIDR), [Pattern] (trailing wildcards) and [PlainRange]
//! (arbitrary start-end), with conversions, containment checks,
//! collapsing and reverse-DNS name enumeration.

mod address;
mod boundary;
mod collapsing;
mod compare;
mod pattern;
mod range;
mod strings;
mod subnet;

use serde::{Deserialize, Serialize};
use std::{error, fmt, net::IpAddr};
use strings::*;

pub use address::{address_from_bytes, parse_address, AddressExt, IpFam};
pub use boundary::{
    common_prefix_len, exact_prefix, max_address_bytes, min_address_bytes, parse_prefix,
    prefix_mask,
};
pub use collapsing::{collapse, parse_range, range_from_boundaries};
pub use compare::{AddressIter, AddressRange, IpRangeKind};
pub use pattern::Pattern;
pub use range::PlainRange;
pub use subnet::Subnet;

pub(crate) const IPV4_BITS: u8 = 32;
pub(crate) const IPV6_BITS: u8 = 128;

/// Knobs for the string parsers. The default is strict parsing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Accept octal/hex and abbreviated IPv4 literals (`0x7f.1`, `10/8`).
    pub allow_non_decimal_ipv4: bool,
}

impl ParseOptions {
    pub const STRICT: ParseOptions = ParseOptions {
        allow_non_decimal_ipv4: false,
    };
    pub const LEGACY: ParseOptions = ParseOptions {
        allow_non_decimal_ipv4: true,
    };
}

#[rustfmt::skip]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeError {
    /// malformed range string (separators, prefix field, wildcards)
    InvalidFormat(String),
    /// the address part could not be parsed
    InvalidAddress(String),
    /// prefix is wider than the address family allows
    PrefixOutOfRange { prefix: u32, max: u8 },
    RangeOrder(IpAddr, IpAddr),
    /// start and end are not the same IP family (v4 vs v6).
    Mismatch(IpAddr, IpAddr),
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::InvalidFormat(s) => {
                write!(f, "{ERR_INVALID_FMT}: '{s}'")
            }
            RangeError::InvalidAddress(s) => {
                write!(f, "{ERR_INVALID_ADDR}: '{s}'")
            }
            RangeError::PrefixOutOfRange { prefix, max } => {
                write!(f, "{ERR_PREFIX_RANGE}: {prefix} (max {max})")
            }
            RangeError::RangeOrder(beg, end) => {
                write!(f, "{ERR_RNG_ORDER} ({beg} > {end})")
            }
            RangeError::Mismatch(a, b) => {
                write!(f, "{ERR_MISMATCH}: {a} - {b}")
            }
        }
    }
}

impl error::Error for RangeError {}

/* -------------------------------------------------------------------------- */
