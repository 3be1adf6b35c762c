// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{strings::*, ParseOptions, RangeError, IPV4_BITS, IPV6_BITS};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// IP address family
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpFam {
    V4,
    V6,
}

impl IpFam {
    /// Address width in bits: 32 or 128.
    pub fn bits(self) -> u8 {
        match self {
            IpFam::V4 => IPV4_BITS,
            IpFam::V6 => IPV6_BITS,
        }
    }

    /// Address width in bytes: 4 or 16.
    pub fn byte_len(self) -> usize {
        self.bits() as usize / 8
    }

    /// Width of one wildcard unit in pattern notation (octet / hextet).
    pub fn unit_bits(self) -> u8 {
        match self {
            IpFam::V4 => 8,
            IpFam::V6 => 16,
        }
    }

    /// Number of wildcard units in a full address.
    pub fn unit_count(self) -> u8 {
        self.bits() / self.unit_bits()
    }

    /// Largest address of the family as an integer.
    pub(crate) fn max_value(self) -> u128 {
        match self {
            IpFam::V4 => u32::MAX as u128,
            IpFam::V6 => u128::MAX,
        }
    }

    pub(crate) fn arpa(self) -> &'static str {
        match self {
            IpFam::V4 => V4_ARPA,
            IpFam::V6 => V6_ARPA,
        }
    }
}

/**
Extra views on [IpAddr] needed by the range types: raw bytes, integer
value, short/long textual forms and reverse-DNS labels.
*/
pub trait AddressExt {
    fn family(&self) -> IpFam;
    /// Big-endian bytes, 4 or 16 of them.
    fn to_bytes(&self) -> Vec<u8>;
    fn to_u128(&self) -> u128;
    /// Canonical short form. IPv4-mapped IPv6 addresses stay in hex.
    fn to_short_string(&self) -> String;
    /// Zero-padded form: `010.000.000.001`, `0000:...:0001`.
    fn to_long_string(&self) -> String;
    /// Per-unit reverse-DNS labels, least significant first
    /// (octets for IPv4, nibbles for IPv6), without the arpa suffix.
    fn reverse_dns_labels(&self) -> Vec<String>;
    /// Full pointer name, e.g. `4.3.2.1.in-addr.arpa`.
    fn reverse_dns_name(&self) -> String;
    fn successor(&self) -> Option<IpAddr>;
    fn predecessor(&self) -> Option<IpAddr>;
}

impl AddressExt for IpAddr {
    fn family(&self) -> IpFam {
        match self {
            IpAddr::V4(_) => IpFam::V4,
            IpAddr::V6(_) => IpFam::V6,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            IpAddr::V4(a) => a.octets().to_vec(),
            IpAddr::V6(a) => a.octets().to_vec(),
        }
    }

    fn to_u128(&self) -> u128 {
        match self {
            IpAddr::V4(a) => u32::from(*a) as u128,
            IpAddr::V6(a) => u128::from(*a),
        }
    }

    fn to_short_string(&self) -> String {
        match self {
            IpAddr::V4(a) => a.to_string(),
            IpAddr::V6(a) => v6_short(a),
        }
    }

    fn to_long_string(&self) -> String {
        match self {
            IpAddr::V4(a) => a
                .octets()
                .iter()
                .map(|o| format!("{o:03}"))
                .collect::<Vec<String>>()
                .join("."),
            IpAddr::V6(a) => a
                .segments()
                .iter()
                .map(|s| format!("{s:04x}"))
                .collect::<Vec<String>>()
                .join(":"),
        }
    }

    fn reverse_dns_labels(&self) -> Vec<String> {
        match self {
            IpAddr::V4(a) => a.octets().iter().rev().map(|o| o.to_string()).collect(),
            IpAddr::V6(a) => a
                .octets()
                .iter()
                .rev()
                .flat_map(|b| [format!("{:x}", b & 0x0f), format!("{:x}", b >> 4)])
                .collect(),
        }
    }

    fn reverse_dns_name(&self) -> String {
        let mut labels: Vec<String> = self.reverse_dns_labels();
        labels.push(self.family().arpa().to_string());
        labels.join(".")
    }

    fn successor(&self) -> Option<IpAddr> {
        let v: u128 = self.to_u128();
        if v == self.family().max_value() {
            return None;
        }
        Some(int_to_ip(self.family(), v + 1))
    }

    fn predecessor(&self) -> Option<IpAddr> {
        let v: u128 = self.to_u128().checked_sub(1)?;
        Some(int_to_ip(self.family(), v))
    }
}

/// RFC 5952 style: longest run (first on tie) of two or more zero groups becomes `::`.
fn v6_short(a: &Ipv6Addr) -> String {
    v6_compressed(&a.segments(), 0)
}

/**
Hex groups of an IPv6 address with the last `wildcards` groups shown as `*`.

The longest run of two or more zero groups among the remaining ones is
compressed to `::`, the first one wins on a tie.
*/
pub(crate) fn v6_compressed(segs: &[u16; 8], wildcards: usize) -> String {
    let fixed: usize = segs.len().saturating_sub(wildcards);
    let (mut best_beg, mut best_len) = (0usize, 0usize);

    let mut i: usize = 0;
    while i < fixed {
        if segs[i] != 0 {
            i += 1;
            continue;
        }
        let beg: usize = i;
        while i < fixed && segs[i] == 0 {
            i += 1;
        }
        if i - beg > best_len {
            best_beg = beg;
            best_len = i - beg;
        }
    }

    let groups: Vec<String> = segs
        .iter()
        .enumerate()
        .map(|(i, g)| match i < fixed {
            true => format!("{g:x}"),
            false => STAR.to_string(),
        })
        .collect();

    if best_len < 2 {
        return groups.join(":");
    }
    format!(
        "{}::{}",
        groups[..best_beg].join(":"),
        groups[best_beg + best_len..].join(":")
    )
}

/// Rebuild an address from its big-endian bytes. Only lengths 4 and 16 are valid.
pub fn address_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    let fam: IpFam = match bytes.len() {
        n if n == IpFam::V4.byte_len() => IpFam::V4,
        n if n == IpFam::V6.byte_len() => IpFam::V6,
        _ => return None,
    };
    let v: u128 = bytes.iter().fold(0u128, |acc, b| acc << 8 | *b as u128);
    Some(int_to_ip(fam, v))
}

#[inline]
pub(crate) fn int_to_ip(fam: IpFam, v: u128) -> IpAddr {
    match fam {
        IpFam::V4 => IpAddr::V4(Ipv4Addr::from((v as u32).to_be_bytes())),
        IpFam::V6 => IpAddr::V6(Ipv6Addr::from(v.to_be_bytes())),
    }
}

/* ---------------------------------- */

/**
Parse a single IP address.

Strict mode accepts what [std::net::IpAddr] accepts, plus dotted-quad IPv4
with zero-padded octets (the output of [AddressExt::to_long_string]).

With [ParseOptions::allow_non_decimal_ipv4], IPv4 follows the classic
`inet_aton()` rules: 1-4 parts, each decimal, octal (`0` prefix) or
hex (`0x` prefix), the last part filling all remaining bytes.
*/
pub fn parse_address(text: &str, opts: ParseOptions) -> Result<IpAddr, RangeError> {
    if let Ok(ip) = text.parse::<IpAddr>() {
        return Ok(ip);
    }

    let parsed: Option<Ipv4Addr> = if text.contains(':') {
        None
    } else if opts.allow_non_decimal_ipv4 {
        parse_legacy_v4(text)
    } else {
        parse_padded_v4(text)
    };

    match parsed {
        Some(a) => Ok(IpAddr::V4(a)),
        None => {
            debug!(address = text, "rejected IP address literal");
            Err(RangeError::InvalidAddress(text.to_string()))
        }
    }
}

/// `192.168.001.010` - four decimal octets, up to three digits each.
fn parse_padded_v4(text: &str) -> Option<Ipv4Addr> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut octets: [u8; 4] = [0; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u8>().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

fn parse_legacy_v4(text: &str) -> Option<Ipv4Addr> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }

    let values: Vec<u32> = parts
        .iter()
        .map(|p| parse_legacy_part(p))
        .collect::<Option<Vec<u32>>>()?;

    let (last, leading) = values.split_last()?;
    if leading.iter().any(|&v| v > 255) {
        return None;
    }

    // the last part covers every byte not claimed by the leading parts
    let tail_bits: u32 = 8 * (4 - leading.len() as u32);
    if tail_bits < 32 && *last >= 1u32 << tail_bits {
        return None;
    }

    let mut value: u32 = *last;
    for (i, v) in leading.iter().enumerate() {
        value |= v << (24 - 8 * i as u32);
    }
    Some(Ipv4Addr::from(value))
}

fn parse_legacy_part(part: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = part.strip_prefix("0x").or(part.strip_prefix("0X")) {
        (hex, 16)
    } else if part.len() > 1 && part.starts_with('0') {
        (&part[1..], 8)
    } else {
        (part, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

/* -------------------------------------------------------------------------- */
