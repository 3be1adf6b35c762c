// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bit-level boundary arithmetic over big-endian address bytes.

use super::{strings::*, RangeError};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    // 1-9 digits keeps the value well inside u32 before the range check
    static ref PREFIX_RE: Regex = Regex::new(r"^[0-9]{1,9}$").expect("prefix regex is valid");
}

/// Byte with the top `n` bits set, `n` in `0..=8`.
#[inline]
fn high_bits(n: u32) -> u8 {
    match n {
        0 => 0,
        n => 0xFFu8 << (8 - n.min(8)),
    }
}

#[inline]
fn prefix_fits(bytes: &[u8], prefix: u32) -> bool {
    prefix as usize <= bytes.len() * 8
}

/**
Lowest address sharing the first `prefix` bits with `bytes`.

The first `prefix / 8` bytes are copied, the partially covered byte (if any)
is masked and everything after it is zeroed. Returns `None` if `prefix`
exceeds the bit width of `bytes`.
*/
pub fn min_address_bytes(bytes: &[u8], prefix: u32) -> Option<Vec<u8>> {
    if !prefix_fits(bytes, prefix) {
        return None;
    }
    let same: usize = (prefix / 8) as usize;
    let rem: u32 = prefix % 8;

    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    out.extend_from_slice(&bytes[..same]);
    if same < bytes.len() {
        out.push(if rem == 0 { 0 } else { bytes[same] & high_bits(rem) });
        out.resize(bytes.len(), 0);
    }
    Some(out)
}

/// Highest address sharing the first `prefix` bits with `bytes`. See [min_address_bytes].
pub fn max_address_bytes(bytes: &[u8], prefix: u32) -> Option<Vec<u8>> {
    let mut out: Vec<u8> = min_address_bytes(bytes, prefix)?;
    let same: usize = (prefix / 8) as usize;
    let rem: u32 = prefix % 8;

    if same < out.len() {
        // low bits of the masked byte are zero, so the add cannot carry
        out[same] = if rem == 0 { 255 } else { out[same] + (255u8 >> rem) };
        for b in out.iter_mut().skip(same + 1) {
            *b = 255;
        }
    }
    Some(out)
}

/**
Network mask of `len` bytes with the first `prefix` bits set.

Emits 255 for every whole octet of the prefix, then the partial octet,
then zero-fills.
*/
pub fn prefix_mask(len: usize, prefix: u32) -> Option<Vec<u8>> {
    if prefix as usize > len * 8 {
        return None;
    }
    let mut out: Vec<u8> = vec![255; (prefix / 8) as usize];
    if prefix % 8 != 0 {
        out.push(high_bits(prefix % 8));
    }
    out.resize(len, 0);
    Some(out)
}

/// Number of leading bits `a` and `b` have in common.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> u32 {
    let mut bits: u32 = 0;
    for (x, y) in a.iter().zip(b) {
        let diff: u8 = x ^ y;
        if diff != 0 {
            return bits + diff.leading_zeros();
        }
        bits += 8;
    }
    bits
}

/**
Inverse of the boundary functions: the prefix length `p` for which
`start..=end` is exactly one aligned block, or `None` if there is none.
*/
pub fn exact_prefix(start: &[u8], end: &[u8]) -> Option<u8> {
    if start.len() != end.len() || start.is_empty() {
        return None;
    }
    let prefix: u32 = common_prefix_len(start, end);
    let lo: Vec<u8> = min_address_bytes(start, prefix)?;
    let hi: Vec<u8> = max_address_bytes(start, prefix)?;
    if lo == start && hi == end {
        return u8::try_from(prefix).ok();
    }
    None
}

/**
Parse the prefix field of a CIDR string against an address width of `width` bits.

The field must be 1-9 decimal digits; anything else is a format error,
a value above `width` is [RangeError::PrefixOutOfRange].
*/
pub fn parse_prefix(text: &str, width: u8) -> Result<u8, RangeError> {
    if !PREFIX_RE.is_match(text) {
        debug!(prefix = text, "{ERR_CIDR_INV_PRE}");
        return Err(RangeError::InvalidFormat(text.to_string()));
    }
    let prefix: u32 = text
        .parse::<u32>()
        .map_err(|_| RangeError::InvalidFormat(text.to_string()))?;

    if prefix > width as u32 {
        debug!(prefix, width, "{ERR_PREFIX_RANGE}");
        return Err(RangeError::PrefixOutOfRange { prefix, max: width });
    }
    Ok(prefix as u8)
}

/* -------------------------------------------------------------------------- */
