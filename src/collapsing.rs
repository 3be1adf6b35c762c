// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    address::{parse_address, AddressExt, IpFam},
    compare::{AddressRange, IpRangeKind},
    pattern::Pattern,
    range::{span_to_subnets, PlainRange},
    strings::*,
    subnet::Subnet,
    ParseOptions, RangeError,
};
use std::net::IpAddr;
use tracing::debug;

/**
Parse any supported range notation:
- CIDR: `10.10.10.0/28`
- Pattern: `10.10.*.*`
- Range: `10.10.10.1-10.10.10.10` or `10.10.10.1-10`
- Single IP: `10.10.10.1` (becomes a /32 or /128 subnet)
*/
pub fn parse_range(text: &str, opts: ParseOptions) -> Result<IpRangeKind, RangeError> {
    if text.contains(SLASH) {
        return Ok(Subnet::parse(text, opts)?.into());
    }
    if text.contains(STAR) {
        return Ok(Pattern::parse(text, opts)?.into());
    }
    if text.contains(DASH) {
        return Ok(PlainRange::parse(text, opts)?.into());
    }
    let addr: IpAddr = parse_address(text, opts)?;
    Ok(Subnet::host(addr).into())
}

/**
Build the tightest encoding for the span between two addresses, given in
either order: a [Subnet] when the span is exactly one prefix block,
otherwise a [PlainRange].
*/
pub fn range_from_boundaries(a: IpAddr, b: IpAddr) -> Result<IpRangeKind, RangeError> {
    if a.family() != b.family() {
        debug!(%a, %b, "{ERR_MISMATCH}");
        return Err(RangeError::Mismatch(a, b));
    }
    let range: PlainRange = PlainRange::new(a.min(b), a.max(b))?;
    Ok(match range.as_subnet() {
        Some(subnet) => subnet.into(),
        None => range.into(),
    })
}

/// Inclusive integer span within one family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Span {
    fam: IpFam,
    beg: u128,
    end: u128,
}

impl Span {
    fn of(r: &dyn AddressRange) -> Self {
        Span {
            fam: r.family(),
            beg: r.start().to_u128(),
            end: r.end().to_u128(),
        }
    }

    fn cmp_key(&self) -> (IpFam, u128, u128) {
        (self.fam, self.beg, self.end)
    }
}

/**
Collapse a list of ranges (any encoding) into an equivalent, minimal set of subnets.
- removes redundant sub-ranges
- merges adjacent/overlapping ranges

IPv4 subnets come first, then IPv6, each in ascending order.
This does *not* enumerate IPs and hence scales to very large ranges.
*/
pub fn collapse(input: &[IpRangeKind]) -> Vec<Subnet> {
    let mut spans: Vec<Span> = input.iter().map(|r| Span::of(r)).collect();

    // 1) Sort ranges
    spans.sort_by_key(|s| s.cmp_key());

    // 2) Merge overlaps/adjacent within each family
    let merged: Vec<Span> = merge_spans(&spans);

    // 3) Convert merged ranges to minimal subnets
    let mut out: Vec<Subnet> = Vec::with_capacity(merged.len());
    for s in merged {
        out.extend(span_to_subnets(s.fam, s.beg, s.end));
    }
    out
}

/// Merge overlapping/adjacent spans within each IP family. Input must be sorted.
#[inline]
fn merge_spans(sorted: &[Span]) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::with_capacity(sorted.len());
    for s in sorted.iter().copied() {
        if let Some(last) = out.last_mut() {
            // overlap or adjacency?
            if last.fam == s.fam && s.beg <= last.end.saturating_add(1) {
                if s.end > last.end {
                    last.end = s.end;
                }
                continue;
            }
        }
        out.push(s);
    }
    out
}

/* -------------------------------------------------------------------------- */
