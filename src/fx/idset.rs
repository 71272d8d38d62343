//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Fxics.
//
// Fxics is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Fxics is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Fxics. If not, see <http://www.gnu.org/licenses/>.

//! Decoding of IDSETs and the GLOBSETs inside them.
//!
//! A GLOBSET is a little stack machine over 6-byte big-endian GLOBCNTs. The
//! stack holds the high-order bytes shared by the values that follow, so a
//! run of nearby ids only costs a byte or two each. Commands:
//!
//! - `0x01`..`0x06` (Push N): N bytes follow. If they complete a 6-byte
//!   value, that value is in the set and nothing is pushed; otherwise they are
//!   pushed as more common bytes.
//! - `0x50` (Pop): discard the most recent push.
//! - `0x42` (Bitmask): only valid with 5 common bytes. A start byte and a
//!   mask byte follow; the start value is in the set, as is `start + i + 1`
//!   for each set bit `i` of the mask.
//! - `0x52` (Range): low and high values, each as many bytes as are missing
//!   from the stack, bounding an inclusive range.
//! - `0x00` (End).
//!
//! An IDSET is a sequence of (replica, GLOBSET) pairs filling the whole blob.
//! The replica is either a 2-byte REPLID or a 16-byte REPLGUID depending on
//! which property carries it.

use std::collections::BTreeSet;
use std::fmt;

use super::stream::{FxStream, Guid};
use crate::support::error::Error;

const GLOBCNT_LEN: usize = 6;

const OP_END: u8 = 0x00;
const OP_BITMASK: u8 = 0x42;
const OP_POP: u8 = 0x50;
const OP_RANGE: u8 = 0x52;

/// An inclusive range of GLOBCNTs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobRange {
    pub low: u64,
    pub high: u64,
}

impl GlobRange {
    pub fn single(v: u64) -> Self {
        GlobRange { low: v, high: v }
    }

    pub fn contains(&self, v: u64) -> bool {
        v >= self.low && v <= self.high
    }

    pub fn len(&self) -> u64 {
        self.high - self.low + 1
    }
}

impl fmt::Display for GlobRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// A decoded GLOBSET, as the ranges in the order the commands produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobSet {
    ranges: Vec<GlobRange>,
}

fn globcnt(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

impl GlobSet {
    pub fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut ranges = Vec::new();

        loop {
            let common = stack.concat();
            match stream.read_u8()? {
                OP_END => break,

                n @ 0x01..=0x06 => {
                    let n = usize::from(n);
                    if common.len() + n > GLOBCNT_LEN {
                        return Err(Error::Malformed("GLOBSET push overflow"));
                    }

                    let pushed = stream.read_bytes(n)?;
                    if common.len() + n == GLOBCNT_LEN {
                        ranges.push(GlobRange::single(globcnt(
                            &[&common[..], &pushed[..]].concat(),
                        )));
                    } else {
                        stack.push(pushed);
                    }
                }

                OP_POP => {
                    if stack.pop().is_none() {
                        return Err(Error::Malformed("GLOBSET pop underflow"));
                    }
                }

                OP_BITMASK => {
                    if GLOBCNT_LEN - 1 != common.len() {
                        return Err(Error::Malformed(
                            "GLOBSET bitmask without 5 common bytes",
                        ));
                    }

                    let start = stream.read_u8()?;
                    let mask = stream.read_u8()?;
                    let prefix = globcnt(&common) << 8;
                    let mut values = vec![u64::from(start)];
                    for bit in 0..8u32 {
                        if 0 != mask & (1 << bit) {
                            values.push(u64::from(start) + u64::from(bit) + 1);
                        }
                    }

                    if values.iter().any(|&v| v > 0xFF) {
                        return Err(Error::Malformed(
                            "GLOBSET bitmask overflow",
                        ));
                    }

                    // Consecutive bits become one range
                    let mut run: Option<GlobRange> = None;
                    for v in values.into_iter().map(|v| prefix | v) {
                        run = match run {
                            Some(r) if r.high + 1 == v => {
                                Some(GlobRange { low: r.low, high: v })
                            }
                            Some(r) => {
                                ranges.push(r);
                                Some(GlobRange::single(v))
                            }
                            None => Some(GlobRange::single(v)),
                        };
                    }
                    ranges.extend(run);
                }

                OP_RANGE => {
                    if common.len() >= GLOBCNT_LEN {
                        return Err(Error::Malformed(
                            "GLOBSET range with full stack",
                        ));
                    }

                    let width = GLOBCNT_LEN - common.len();
                    let low = stream.read_bytes(width)?;
                    let high = stream.read_bytes(width)?;
                    let low = globcnt(&[&common[..], &low[..]].concat());
                    let high = globcnt(&[&common[..], &high[..]].concat());
                    if low > high {
                        return Err(Error::Malformed("GLOBSET inverted range"));
                    }
                    ranges.push(GlobRange { low, high });
                }

                _ => return Err(Error::Malformed("GLOBSET command")),
            }
        }

        Ok(GlobSet { ranges })
    }

    pub fn ranges(&self) -> &[GlobRange] {
        &self.ranges
    }

    pub fn contains(&self, v: u64) -> bool {
        self.ranges.iter().any(|r| r.contains(v))
    }

    /// The number of distinct values in the set.
    pub fn len(&self) -> u64 {
        self.flatten_ranges().iter().map(GlobRange::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The ranges sorted with overlapping and adjacent ones merged.
    pub fn flatten_ranges(&self) -> Vec<GlobRange> {
        let mut sorted = self.ranges.clone();
        sorted.sort_unstable();

        let mut merged: Vec<GlobRange> = Vec::with_capacity(sorted.len());
        for r in sorted {
            match merged.last_mut() {
                Some(last) if r.low <= last.high.saturating_add(1) => {
                    last.high = last.high.max(r.high);
                }
                _ => merged.push(r),
            }
        }
        merged
    }

    /// Every value in the set.
    ///
    /// This allocates per value, so it is only reasonable for sets known to
    /// be small.
    pub fn flatten(&self) -> BTreeSet<u64> {
        self.ranges.iter().flat_map(|r| r.low..=r.high).collect()
    }
}

/// How a replica is identified within an IDSET.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicaKey {
    Id(u16),
    Guid(Guid),
}

impl fmt::Display for ReplicaKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReplicaKey::Id(id) => write!(f, "{:#06X}", id),
            ReplicaKey::Guid(ref guid) => {
                for b in guid {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicaSet {
    pub replica: ReplicaKey,
    pub globset: GlobSet,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdSet {
    replicas: Vec<ReplicaSet>,
}

impl IdSet {
    /// Decode an IDSET whose replicas are identified by 2-byte REPLIDs.
    pub fn decode_replid(blob: &[u8]) -> Result<Self, Error> {
        Self::decode_with(blob, |s| s.read_u16().map(ReplicaKey::Id))
    }

    /// Decode an IDSET whose replicas are identified by REPLGUIDs.
    pub fn decode_replguid(blob: &[u8]) -> Result<Self, Error> {
        Self::decode_with(blob, |s| s.read_guid().map(ReplicaKey::Guid))
    }

    fn decode_with(
        blob: &[u8],
        read_key: impl Fn(&mut FxStream<'_>) -> Result<ReplicaKey, Error>,
    ) -> Result<Self, Error> {
        let mut stream = FxStream::new(blob);
        let mut replicas = Vec::new();
        while !stream.is_end_of_stream() {
            let replica = read_key(&mut stream)?;
            let globset = GlobSet::decode(&mut stream)?;
            replicas.push(ReplicaSet { replica, globset });
        }

        Ok(IdSet { replicas })
    }

    pub fn replicas(&self) -> &[ReplicaSet] {
        &self.replicas
    }

    pub fn replica(&self, key: ReplicaKey) -> Option<&GlobSet> {
        self.replicas
            .iter()
            .find(|r| r.replica == key)
            .map(|r| &r.globset)
    }

    pub fn contains(&self, key: ReplicaKey, globcnt: u64) -> bool {
        self.replica(key).map_or(false, |g| g.contains(globcnt))
    }

    /// Every GLOBCNT in the set, across all replicas.
    ///
    /// Like `GlobSet::flatten()`, this allocates per value.
    pub fn ids(&self) -> BTreeSet<u64> {
        self.replicas
            .iter()
            .flat_map(|r| r.globset.flatten())
            .collect()
    }

    /// The number of ids in the set, counting each replica separately.
    ///
    /// Unlike `ids()`, this never expands the ranges.
    pub fn len(&self) -> u64 {
        self.replicas.iter().map(|r| r.globset.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.iter().all(|r| r.globset.is_empty())
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn globset(data: &[u8]) -> Result<GlobSet, Error> {
        let mut s = FxStream::new(data);
        let g = GlobSet::decode(&mut s)?;
        assert!(s.is_end_of_stream());
        Ok(g)
    }

    #[test]
    fn small_replid_set() {
        let blob = [
            0x01, 0x00, // REPLID 1
            0x05, 0x00, 0x00, 0x00, 0x00, 0x00, // Push5
            0x52, 0x64, 0x65, // Range 100..101
            0x01, 0xCD, // Push1 -> 205
            0x50, // Pop
            0x00, // End
        ];
        let idset = IdSet::decode_replid(&blob).unwrap();
        assert_eq!(1, idset.replicas().len());
        assert_eq!(ReplicaKey::Id(1), idset.replicas()[0].replica);
        assert_eq!(
            vec![100u64, 101, 205],
            idset.ids().into_iter().collect::<Vec<_>>()
        );
        assert!(idset.contains(ReplicaKey::Id(1), 205));
        assert!(!idset.contains(ReplicaKey::Id(1), 102));
        assert!(!idset.contains(ReplicaKey::Id(2), 100));
    }

    #[test]
    fn len_counts_replicas_separately() {
        let blob = [
            0x01, 0x00, // REPLID 1
            0x52, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0x00, // End
            0x02, 0x00, // REPLID 2
            0x06, 0, 0, 0, 0, 0, 0x07, // Push6 -> 7
            0x00, // End
        ];
        let idset = IdSet::decode_replid(&blob).unwrap();
        assert_eq!((1u64 << 48) + 1, idset.len());
        assert_eq!(1, idset.replica(ReplicaKey::Id(2)).unwrap().len());
    }

    #[test]
    fn replguid_form() {
        let mut blob = vec![0xAA; 16];
        blob.extend_from_slice(&[0x06, 0, 0, 0, 0, 0x01, 0x00, 0x00]);
        blob.extend_from_slice(&[0xBB; 16]);
        blob.extend_from_slice(&[0x00]);

        let idset = IdSet::decode_replguid(&blob).unwrap();
        assert_eq!(2, idset.replicas().len());
        assert_eq!(
            Some(&[GlobRange::single(0x0100)][..]),
            idset.replica(ReplicaKey::Guid([0xAA; 16])).map(GlobSet::ranges)
        );
        assert!(idset
            .replica(ReplicaKey::Guid([0xBB; 16]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn bitmask() {
        // Common 0x0000_0000_01, start 0x10, bits 0, 1 and 3
        let g = globset(&[0x05, 0, 0, 0, 0, 0x01, 0x42, 0x10, 0x0B, 0x00])
            .unwrap();
        assert_eq!(
            &[
                GlobRange {
                    low: 0x110,
                    high: 0x112
                },
                GlobRange::single(0x114),
            ][..],
            g.ranges()
        );
        assert_eq!(4, g.len());
    }

    #[test]
    fn range_with_short_stack() {
        let g = globset(&[
            0x02, 0x00, 0x01, 0x52, 0, 0, 0, 1, 0, 0, 0, 3, 0x50, 0x00,
        ])
        .unwrap();
        assert_eq!(
            &[GlobRange {
                low: 0x0001_0000_0001,
                high: 0x0001_0000_0003,
            }][..],
            g.ranges()
        );
    }

    #[test]
    fn malformed_globsets() {
        assert_matches!(
            Err(Error::Malformed("GLOBSET pop underflow")),
            globset(&[0x50, 0x00])
        );
        assert_matches!(
            Err(Error::Malformed("GLOBSET push overflow")),
            globset(&[0x05, 0, 0, 0, 0, 0, 0x02, 0, 0, 0x00])
        );
        assert_matches!(
            Err(Error::Malformed("GLOBSET bitmask without 5 common bytes")),
            globset(&[0x42, 0, 0, 0x00])
        );
        assert_matches!(
            Err(Error::Malformed("GLOBSET inverted range")),
            globset(&[0x05, 0, 0, 0, 0, 0, 0x52, 9, 8, 0x00])
        );
        assert_matches!(
            Err(Error::Malformed("GLOBSET command")),
            globset(&[0x07])
        );
        assert_matches!(Err(Error::Bounds { .. }), globset(&[0x01]));
        assert_matches!(
            Err(Error::Bounds { .. }),
            IdSet::decode_replid(&[0x01])
        );
    }

    proptest! {
        #[test]
        fn flattening_has_no_duplicates(
            ranges in prop::collection::vec((0u64..1000, 0u64..20), 0..10)
        ) {
            let g = GlobSet {
                ranges: ranges.iter()
                    .map(|&(low, n)| GlobRange { low, high: low + n })
                    .collect(),
            };

            let flat = g.flatten();
            prop_assert_eq!(flat.len() as u64, g.len());
            for &(low, n) in &ranges {
                prop_assert!(flat.contains(&low));
                prop_assert!(flat.contains(&(low + n)));
            }

            let merged = g.flatten_ranges();
            for pair in merged.windows(2) {
                prop_assert!(pair[0].high + 1 < pair[1].low);
            }
        }
    }
}
