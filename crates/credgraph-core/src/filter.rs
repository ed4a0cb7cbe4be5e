//! # Filtered Timeline Cred
//!
//! Reduces a full timeline to the nodes matching a set of address prefixes,
//! reshaped from per-interval vectors into per-address score series.
//!
//! The wire form lists `(address, scores)` pairs explicitly instead of using a
//! native map, since addresses are not valid map keys in every format.

use crate::address::NodeAddress;
use crate::timeline::{Interval, IntervalCred, ensure_finite};
use crate::CredError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// PREFIX INDEX
// =============================================================================

/// Trie over address parts, answering "does any indexed prefix match?" in
/// time proportional to the candidate's length.
#[derive(Debug, Clone, Default)]
pub struct PrefixTrie {
    terminal: bool,
    children: BTreeMap<String, PrefixTrie>,
}

impl PrefixTrie {
    /// Index the given prefixes.
    #[must_use]
    pub fn new(prefixes: &[NodeAddress]) -> Self {
        let mut root = Self::default();
        for prefix in prefixes {
            let mut cursor = &mut root;
            for part in prefix.parts() {
                cursor = cursor.children.entry(part.to_owned()).or_default();
            }
            cursor.terminal = true;
        }
        root
    }

    /// True iff some indexed prefix is a component-aligned prefix of `address`.
    #[must_use]
    pub fn matches(&self, address: &NodeAddress) -> bool {
        let mut cursor = self;
        if cursor.terminal {
            return true;
        }
        for part in address.parts() {
            match cursor.children.get(part) {
                Some(next) if next.terminal => return true,
                Some(next) => cursor = next,
                None => return false,
            }
        }
        false
    }
}

// =============================================================================
// FILTERED TIMELINE CRED
// =============================================================================

/// Timeline cred restricted to a set of addresses.
///
/// Every score series has one entry per interval, in interval order.
/// Only built by [`filter_timeline_cred`] or [`from_wire`], so both
/// invariants always hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTimelineCred {
    intervals: Vec<Interval>,
    address_to_cred: BTreeMap<NodeAddress, Vec<f64>>,
}

impl FilteredTimelineCred {
    /// The intervals, unchanged from the source timeline.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Per-address score series.
    #[must_use]
    pub fn address_to_cred(&self) -> &BTreeMap<NodeAddress, Vec<f64>> {
        &self.address_to_cred
    }

    /// One address's score series.
    #[must_use]
    pub fn cred_for(&self, address: &NodeAddress) -> Option<&[f64]> {
        self.address_to_cred.get(address).map(Vec::as_slice)
    }

    /// Sum of one address's series.
    #[must_use]
    pub fn total_cred(&self, address: &NodeAddress) -> Option<f64> {
        self.address_to_cred
            .get(address)
            .map(|scores| scores.iter().sum())
    }

    /// Addresses with their totals, highest first; ties in address order.
    #[must_use]
    pub fn cred_sorted(&self) -> Vec<(&NodeAddress, f64)> {
        let mut totals: Vec<_> = self
            .address_to_cred
            .iter()
            .map(|(address, scores)| (address, scores.iter().sum::<f64>()))
            .collect();
        totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        totals
    }
}

/// Filter a full timeline down to the nodes matching `prefixes`.
///
/// `node_order[i]` owns position `i` of every score vector. A node is kept iff
/// at least one prefix matches it; the intervals are passed through unchanged.
///
/// Fails with [`CredError::ScoreVectorLength`] if any score vector's length
/// differs from `node_order.len()`, with [`CredError::DuplicateAddress`] if
/// `node_order` repeats an address, and with [`CredError::NonFiniteScore`] if
/// a kept node has a NaN or infinite score. No partial result is produced.
pub fn filter_timeline_cred(
    full_cred: &[IntervalCred],
    node_order: &[NodeAddress],
    prefixes: &[NodeAddress],
) -> Result<FilteredTimelineCred, CredError> {
    for (interval_index, ic) in full_cred.iter().enumerate() {
        if ic.cred.len() != node_order.len() {
            return Err(CredError::ScoreVectorLength {
                interval_index,
                expected: node_order.len(),
                actual: ic.cred.len(),
            });
        }
    }

    let trie = PrefixTrie::new(prefixes);
    let mut seen = BTreeSet::new();
    let mut address_to_cred = BTreeMap::new();
    for (index, address) in node_order.iter().enumerate() {
        if !seen.insert(address) {
            return Err(CredError::DuplicateAddress(address.to_string()));
        }
        if !trie.matches(address) {
            continue;
        }
        let mut series = Vec::with_capacity(full_cred.len());
        for (interval_index, ic) in full_cred.iter().enumerate() {
            // In bounds: every vector has node_order.len() entries.
            let score = ic.cred[index];
            ensure_finite(interval_index, address, score)?;
            series.push(score);
        }
        address_to_cred.insert(address.clone(), series);
    }

    Ok(FilteredTimelineCred {
        intervals: full_cred.iter().map(|ic| ic.interval).collect(),
        address_to_cred,
    })
}

// =============================================================================
// WIRE FORM
// =============================================================================

/// Serialized shape of [`FilteredTimelineCred`].
///
/// ```json
/// { "intervals": [{"start_time_ms": 0, "end_time_ms": 10}],
///   "address_to_cred": [[{"kind": "NODE", "parts": ["foo"]}, [1.0]]] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredTimelineCredWire {
    /// Intervals in order.
    pub intervals: Vec<Interval>,
    /// `(address, scores)` pairs in address order.
    pub address_to_cred: Vec<(NodeAddress, Vec<f64>)>,
}

/// Convert to the wire form.
#[must_use]
pub fn to_wire(filtered: &FilteredTimelineCred) -> FilteredTimelineCredWire {
    FilteredTimelineCredWire {
        intervals: filtered.intervals.clone(),
        address_to_cred: filtered
            .address_to_cred
            .iter()
            .map(|(address, scores)| (address.clone(), scores.clone()))
            .collect(),
    }
}

/// Rebuild from the wire form.
///
/// Rejects repeated addresses, non-finite scores and series whose length
/// differs from the interval count. Intervals are passed through as-is, mirroring
/// [`filter_timeline_cred`].
pub fn from_wire(wire: FilteredTimelineCredWire) -> Result<FilteredTimelineCred, CredError> {
    let expected = wire.intervals.len();
    let mut address_to_cred = BTreeMap::new();
    for (entry, (address, scores)) in wire.address_to_cred.into_iter().enumerate() {
        if scores.len() != expected {
            return Err(CredError::DeserializationError(format!(
                "entry {entry} ({address}) has {} scores for {expected} intervals",
                scores.len()
            )));
        }
        if address_to_cred.contains_key(&address) {
            return Err(CredError::DuplicateAddress(address.to_string()));
        }
        for (interval_index, score) in scores.iter().enumerate() {
            ensure_finite(interval_index, &address, *score)?;
        }
        address_to_cred.insert(address, scores);
    }
    Ok(FilteredTimelineCred {
        intervals: wire.intervals,
        address_to_cred,
    })
}

impl Serialize for FilteredTimelineCred {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_wire(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilteredTimelineCred {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        from_wire(FilteredTimelineCredWire::deserialize(deserializer)?)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
