//! # Property-Based Tests
//!
//! Laws of the address codec, graph merge, and timeline filtering.

use credgraph_core::{
    AnyAddress, EdgeAddress, Graph, Interval, IntervalCred, Kind, Node, NodeAddress,
    filter_timeline_cred, from_wire, to_wire,
};
use proptest::collection::vec;
use proptest::prelude::*;

/// Short parts over a tiny alphabet so that empty parts, shared prefixes and
/// concatenation collisions ("a","b" vs "ab") come up often.
fn parts() -> impl Strategy<Value = Vec<String>> {
    vec("[ab]{0,2}", 0..4)
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Node), Just(Kind::Edge)]
}

fn node(parts: &[String]) -> NodeAddress {
    NodeAddress::from_parts(parts).expect("valid parts")
}

// =============================================================================
// ADDRESS LAWS
// =============================================================================

proptest! {
    /// parts(make(k, p)) == p
    #[test]
    fn parts_roundtrip(k in kind(), p in parts()) {
        let address = AnyAddress::make(k, &p).expect("make");
        prop_assert_eq!(address.to_parts(), p);
        prop_assert_eq!(address.kind(), k);
    }

    /// make(Node, p) != make(Edge, p)
    #[test]
    fn kinds_are_distinct(p in parts()) {
        let n = AnyAddress::make(Kind::Node, &p).expect("make");
        let e = AnyAddress::make(Kind::Edge, &p).expect("make");
        prop_assert_ne!(n.encoded(), e.encoded());
        prop_assert_ne!(n, e);
    }

    /// Distinct part sequences give distinct addresses.
    #[test]
    fn encoding_is_injective(p in parts(), q in parts()) {
        prop_assert_eq!(node(&p) == node(&q), p == q);
    }

    /// Decoding the encoding gives back the same address.
    #[test]
    fn encoded_roundtrip(p in parts()) {
        let address = EdgeAddress::from_parts(&p).expect("make");
        let decoded = EdgeAddress::from_encoded(address.encoded(), None).expect("decode");
        prop_assert_eq!(decoded, address);
    }

    /// hasPrefix(a, a)
    #[test]
    fn prefix_is_reflexive(p in parts()) {
        let a = node(&p);
        prop_assert!(a.has_prefix(&a));
    }

    /// hasPrefix agrees with component-wise comparison of the part lists.
    #[test]
    fn prefix_matches_component_definition(p in parts(), q in parts()) {
        let expected = q.len() <= p.len() && p[..q.len()] == q[..];
        prop_assert_eq!(node(&p).has_prefix(&node(&q)), expected);
    }

    /// append(make(k, p), e1, e2) == make(k, p ++ [e1, e2])
    #[test]
    fn append_composes(p in parts(), e1 in "[ab]{0,2}", e2 in "[ab]{0,2}") {
        let appended = node(&p).append([&e1, &e2]).expect("append");
        let mut all = p.clone();
        all.push(e1);
        all.push(e2);
        prop_assert_eq!(appended, node(&all));
    }
}

// =============================================================================
// GRAPH MERGE LAWS
// =============================================================================

fn graph_from(addresses: &[Vec<String>]) -> Graph {
    let mut graph = Graph::new();
    for p in addresses {
        graph
            .add_node(Node::new(node(p), p.join("/"), None))
            .expect("consistent content");
    }
    graph
}

proptest! {
    /// Merging graphs that agree on shared content is commutative and contains
    /// every address exactly once.
    #[test]
    fn merge_of_consistent_graphs(a in vec(parts(), 0..8), b in vec(parts(), 0..8)) {
        let ga = graph_from(&a);
        let gb = graph_from(&b);
        let ab = Graph::merge([&ga, &gb]).expect("merge");
        let ba = Graph::merge([&gb, &ga]).expect("merge");
        prop_assert_eq!(&ab, &ba);
        for p in a.iter().chain(&b) {
            prop_assert!(ab.contains_node(&node(p)));
        }
        let mut unique: Vec<_> = a.iter().chain(&b).collect();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(ab.node_count(), unique.len());
    }

    /// Merging a graph with itself is the identity.
    #[test]
    fn merge_is_idempotent(a in vec(parts(), 0..8)) {
        let g = graph_from(&a);
        prop_assert_eq!(Graph::merge([&g, &g]).expect("merge"), g);
    }
}

// =============================================================================
// FILTER LAWS
// =============================================================================

fn timeline(node_count: usize, interval_count: usize) -> Vec<IntervalCred> {
    (0..interval_count)
        .map(|i| {
            let start = (i as i64) * 10;
            let scores = (0..node_count).map(|n| (n * 100 + i) as f64).collect();
            IntervalCred::new(Interval::new(start, start + 10).expect("interval"), scores)
        })
        .collect()
}

fn score() -> impl Strategy<Value = f64> {
    proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL | proptest::num::f64::ZERO
}

/// A distinct node order with arbitrary finite scores for each interval.
fn scored_timeline() -> impl Strategy<Value = (Vec<NodeAddress>, Vec<IntervalCred>)> {
    (vec(parts(), 0..10), 0usize..4).prop_flat_map(|(order, interval_count)| {
        let mut order: Vec<NodeAddress> = order.iter().map(|p| node(p)).collect();
        order.sort();
        order.dedup();
        let node_count = order.len();
        let intervals = vec(vec(score(), node_count), interval_count).prop_map(|scores| {
            scores
                .into_iter()
                .enumerate()
                .map(|(i, cred)| {
                    let start = (i as i64) * 10;
                    IntervalCred::new(Interval::new(start, start + 10).expect("interval"), cred)
                })
                .collect::<Vec<_>>()
        });
        (Just(order), intervals)
    })
}

proptest! {
    /// The trie-indexed filter agrees with the naive definition.
    #[test]
    fn filter_matches_naive(
        order in vec(parts(), 0..10),
        prefixes in vec(parts(), 0..4),
        interval_count in 0usize..4,
    ) {
        let mut order: Vec<NodeAddress> = order.iter().map(|p| node(p)).collect();
        order.sort();
        order.dedup();
        let prefixes: Vec<NodeAddress> = prefixes.iter().map(|p| node(p)).collect();
        let full = timeline(order.len(), interval_count);

        let filtered = filter_timeline_cred(&full, &order, &prefixes).expect("filter");

        let expected_intervals: Vec<_> = full.iter().map(|ic| ic.interval).collect();
        prop_assert_eq!(filtered.intervals(), &expected_intervals[..]);
        for (index, address) in order.iter().enumerate() {
            let keep = prefixes.iter().any(|p| address.has_prefix(p));
            match filtered.cred_for(address) {
                Some(series) => {
                    prop_assert!(keep);
                    let expected: Vec<f64> = full.iter().map(|ic| ic.cred[index]).collect();
                    prop_assert_eq!(series, &expected[..]);
                }
                None => prop_assert!(!keep),
            }
        }
    }

    /// fromWire(toWire(x)) == x, directly and through JSON, for any finite
    /// scores including subnormals and signed zeros.
    #[test]
    fn wire_roundtrip(
        (order, full) in scored_timeline(),
        prefixes in vec(parts(), 0..4),
    ) {
        let prefixes: Vec<NodeAddress> = prefixes.iter().map(|p| node(p)).collect();
        let filtered = filter_timeline_cred(&full, &order, &prefixes).expect("filter");

        prop_assert_eq!(&from_wire(to_wire(&filtered)).expect("from wire"), &filtered);

        let json = serde_json::to_string(&filtered).expect("serialize");
        let back: credgraph_core::FilteredTimelineCred =
            serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(back, filtered);
    }
}
