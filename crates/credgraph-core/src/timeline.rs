//! # Timeline Cred
//!
//! The solver's output: for each time interval, one score per node.
//!
//! A [`TimelineCred`] fixes a node ordering once; position `i` of every score
//! vector belongs to `node_order[i]`. Intervals are half-open, increasing and
//! non-overlapping. Both invariants are checked on construction and on
//! deserialization, after which the value is immutable.

use crate::address::{EdgeAddress, NodeAddress};
use crate::filter::{FilteredTimelineCred, filter_timeline_cred};
use crate::CredError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default teleportation probability back to seed nodes.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default per-interval decay of historical cred.
pub const DEFAULT_INTERVAL_DECAY: f64 = 0.5;

// =============================================================================
// INTERVALS
// =============================================================================

/// Half-open time range `[start_time_ms, end_time_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start, in epoch milliseconds.
    pub start_time_ms: i64,
    /// Exclusive end, in epoch milliseconds.
    pub end_time_ms: i64,
}

impl Interval {
    /// Create an interval. Fails unless `start < end`.
    pub fn new(start_time_ms: i64, end_time_ms: i64) -> Result<Self, CredError> {
        if start_time_ms >= end_time_ms {
            return Err(CredError::InvalidTimeline(format!(
                "interval [{start_time_ms}, {end_time_ms}) is empty"
            )));
        }
        Ok(Self {
            start_time_ms,
            end_time_ms,
        })
    }

    /// Whether `time_ms` falls inside the interval.
    #[must_use]
    pub const fn contains(&self, time_ms: i64) -> bool {
        self.start_time_ms <= time_ms && time_ms < self.end_time_ms
    }
}

/// One interval together with its score vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalCred {
    /// The time range.
    pub interval: Interval,
    /// One score per node, in the owning timeline's node order.
    pub cred: Vec<f64>,
}

impl IntervalCred {
    /// Pair an interval with its scores.
    #[must_use]
    pub fn new(interval: Interval, cred: Vec<f64>) -> Self {
        Self { interval, cred }
    }
}

/// Check ordering and emptiness of a sequence of intervals.
fn validate_intervals<'a, I>(intervals: I) -> Result<(), CredError>
where
    I: IntoIterator<Item = &'a Interval>,
{
    let mut previous: Option<&Interval> = None;
    for (index, interval) in intervals.into_iter().enumerate() {
        if interval.start_time_ms >= interval.end_time_ms {
            return Err(CredError::InvalidTimeline(format!(
                "interval {index} is empty"
            )));
        }
        if let Some(prev) = previous
            && prev.end_time_ms > interval.start_time_ms
        {
            return Err(CredError::InvalidTimeline(format!(
                "interval {index} overlaps or precedes its predecessor"
            )));
        }
        previous = Some(interval);
    }
    Ok(())
}

/// Scores must be finite: JSON has no encoding for NaN or infinity.
pub(crate) fn ensure_finite(
    interval_index: usize,
    address: &NodeAddress,
    score: f64,
) -> Result<(), CredError> {
    if score.is_finite() {
        return Ok(());
    }
    Err(CredError::NonFiniteScore {
        interval_index,
        address: address.to_string(),
        value: score.to_string(),
    })
}

// =============================================================================
// PARAMETERS & CONFIG
// =============================================================================

/// Forward and backward weight of an edge type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    /// Weight in the src → dst direction.
    pub forwards: f64,
    /// Weight in the dst → src direction.
    pub backwards: f64,
}

impl Default for EdgeWeight {
    fn default() -> Self {
        Self {
            forwards: 1.0,
            backwards: 1.0,
        }
    }
}

/// Prefix-keyed weight overrides.
///
/// Stored as ordered pair lists: addresses are not native map keys in every
/// serialization format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Node weight multipliers, by address prefix.
    #[serde(default)]
    pub node_weights: Vec<(NodeAddress, f64)>,
    /// Edge weight multipliers, by address prefix.
    #[serde(default)]
    pub edge_weights: Vec<(EdgeAddress, EdgeWeight)>,
}

impl Weights {
    /// Product of all node weights whose prefix matches `address`.
    /// 1.0 when none match.
    #[must_use]
    pub fn node_weight(&self, address: &NodeAddress) -> f64 {
        self.node_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .map(|(_, weight)| *weight)
            .product()
    }

    /// Component-wise product of all edge weights whose prefix matches
    /// `address`.
    #[must_use]
    pub fn edge_weight(&self, address: &EdgeAddress) -> EdgeWeight {
        self.edge_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .fold(EdgeWeight::default(), |acc, (_, weight)| EdgeWeight {
                forwards: acc.forwards * weight.forwards,
                backwards: acc.backwards * weight.backwards,
            })
    }
}

/// Parameters handed to the cred solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineCredParameters {
    /// Teleportation probability back to seed nodes.
    pub alpha: f64,
    /// Per-interval decay of historical cred.
    pub interval_decay: f64,
    /// Weight overrides.
    #[serde(default)]
    pub weights: Weights,
}

impl Default for TimelineCredParameters {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            interval_decay: DEFAULT_INTERVAL_DECAY,
            weights: Weights::default(),
        }
    }
}

/// Scoring configuration handed to the cred solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredConfig {
    /// Nodes under this prefix receive (and are normalised to) the minted cred.
    pub score_node_prefix: NodeAddress,
    /// Prefixes kept when the timeline is filtered for presentation.
    pub filter_node_prefixes: Vec<NodeAddress>,
}

impl Default for CredConfig {
    fn default() -> Self {
        Self {
            score_node_prefix: NodeAddress::empty(),
            filter_node_prefixes: vec![NodeAddress::empty()],
        }
    }
}

// =============================================================================
// TIMELINE CRED
// =============================================================================

/// Serialized shape of a [`TimelineCred`], before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimelineCred {
    params: TimelineCredParameters,
    node_order: Vec<NodeAddress>,
    intervals: Vec<IntervalCred>,
}

/// Per-interval, per-node cred with a fixed node ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimelineCred", into = "RawTimelineCred")]
pub struct TimelineCred {
    params: TimelineCredParameters,
    node_order: Vec<NodeAddress>,
    intervals: Vec<IntervalCred>,
}

impl TimelineCred {
    /// Assemble and validate a timeline.
    ///
    /// Fails if intervals are empty, overlapping or out of order, if
    /// `node_order` repeats an address, if any score vector's length
    /// differs from `node_order.len()`, or if any score is NaN or infinite.
    pub fn new(
        params: TimelineCredParameters,
        node_order: Vec<NodeAddress>,
        intervals: Vec<IntervalCred>,
    ) -> Result<Self, CredError> {
        validate_intervals(intervals.iter().map(|ic| &ic.interval))?;

        let mut seen = BTreeSet::new();
        for address in &node_order {
            if !seen.insert(address) {
                return Err(CredError::DuplicateAddress(address.to_string()));
            }
        }

        for (interval_index, ic) in intervals.iter().enumerate() {
            if ic.cred.len() != node_order.len() {
                return Err(CredError::ScoreVectorLength {
                    interval_index,
                    expected: node_order.len(),
                    actual: ic.cred.len(),
                });
            }
            for (address, score) in node_order.iter().zip(&ic.cred) {
                ensure_finite(interval_index, address, *score)?;
            }
        }

        Ok(Self {
            params,
            node_order,
            intervals,
        })
    }

    /// The parameters this timeline was computed with.
    #[must_use]
    pub fn params(&self) -> &TimelineCredParameters {
        &self.params
    }

    /// The node ordering shared by every score vector.
    #[must_use]
    pub fn node_order(&self) -> &[NodeAddress] {
        &self.node_order
    }

    /// Intervals with their score vectors.
    #[must_use]
    pub fn interval_creds(&self) -> &[IntervalCred] {
        &self.intervals
    }

    /// The bare intervals, in order.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.intervals.iter().map(|ic| ic.interval)
    }

    /// Number of intervals.
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Per-interval scores of one node, or `None` if it is not in the ordering.
    #[must_use]
    pub fn cred_for(&self, address: &NodeAddress) -> Option<Vec<f64>> {
        let index = self.node_order.iter().position(|a| a == address)?;
        self.intervals
            .iter()
            .map(|ic| ic.cred.get(index).copied())
            .collect()
    }

    /// Sum of a node's scores across all intervals.
    #[must_use]
    pub fn total_cred(&self, address: &NodeAddress) -> Option<f64> {
        self.cred_for(address).map(|scores| scores.iter().sum())
    }

    /// Keep only nodes matching at least one of `prefixes`.
    pub fn filter(&self, prefixes: &[NodeAddress]) -> Result<FilteredTimelineCred, CredError> {
        filter_timeline_cred(&self.intervals, &self.node_order, prefixes)
    }
}

impl TryFrom<RawTimelineCred> for TimelineCred {
    type Error = CredError;

    fn try_from(raw: RawTimelineCred) -> Result<Self, Self::Error> {
        Self::new(raw.params, raw.node_order, raw.intervals)
    }
}

impl From<TimelineCred> for RawTimelineCred {
    fn from(tc: TimelineCred) -> Self {
        Self {
            params: tc.params,
            node_order: tc.node_order,
            intervals: tc.intervals,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
