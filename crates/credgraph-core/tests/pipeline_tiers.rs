//! # Pipeline Tier Tests (T0-T3)
//!
//! Each tier builds on the previous one, from addresses to persisted
//! artifacts.
//!
//! ## Tiers
//! - T0: Address Identity
//! - T1: Graph Merge
//! - T2: Timeline Filtering
//! - T3: Artifacts

use credgraph_core::{
    AnyAddress, ArtifactFormat, CredError, Edge, EdgeAddress, FilteredTimelineCred, Graph,
    Interval, IntervalCred, Kind, Node, NodeAddress, TimelineCred, TimelineCredParameters,
    filter_timeline_cred, from_wire, to_wire,
};

fn addr(parts: &[&str]) -> NodeAddress {
    NodeAddress::from_parts(parts).expect("node address")
}

fn node(parts: &[&str]) -> Node {
    Node::new(addr(parts), parts.join("/"), None)
}

// =============================================================================
// TIER T0: ADDRESS IDENTITY
// =============================================================================

mod t0_address_identity {
    use super::*;

    /// T0.1: Prefix matching is component-aligned.
    #[test]
    fn prefix_is_component_aligned() {
        assert!(!addr(&["foobar", "baz"]).has_prefix(&addr(&["foo"])));
        assert!(addr(&["foo", "bar", "baz"]).has_prefix(&addr(&["foo", "bar"])));
        assert!(addr(&["foo"]).has_prefix(&NodeAddress::empty()));
    }

    /// T0.2: The same parts under different kinds never compare equal.
    #[test]
    fn kinds_are_disjoint() {
        let node = AnyAddress::make(Kind::Node, Vec::<String>::new()).expect("node");
        let edge = AnyAddress::make(Kind::Edge, Vec::<String>::new()).expect("edge");
        assert_ne!(node, edge);
        assert!(matches!(
            node.has_prefix(&edge),
            Err(CredError::WrongKind { .. })
        ));
    }

    /// T0.3: Serialized addresses keep their kind.
    #[test]
    fn wire_form_checks_kind() {
        let json = serde_json::to_string(&EdgeAddress::from_parts(["e"]).expect("edge"))
            .expect("serialize");
        let as_node: Result<NodeAddress, _> = serde_json::from_str(&json);
        assert!(as_node.is_err());
        let as_edge: EdgeAddress = serde_json::from_str(&json).expect("same kind");
        assert_eq!(as_edge.to_parts(), ["e"]);
    }
}

// =============================================================================
// TIER T1: GRAPH MERGE
// =============================================================================

mod t1_graph_merge {
    use super::*;

    /// T1.1: Identical entities collapse to one.
    #[test]
    fn identical_entities_merge_once() {
        let mut left = Graph::new();
        left.add_node(node(&["shared"])).expect("left");
        let mut right = Graph::new();
        right.add_node(node(&["shared"])).expect("right");
        right.add_node(node(&["other"])).expect("other");

        let merged = Graph::merge([&left, &right]).expect("merge");
        assert_eq!(merged.node_count(), 2);
        assert!(merged.contains_node(&addr(&["shared"])));
    }

    /// T1.2: Differing content at one address is a conflict.
    #[test]
    fn differing_entities_conflict() {
        let mut left = Graph::new();
        left.add_node(node(&["shared"])).expect("left");
        let mut right = Graph::new();
        right
            .add_node(Node::new(addr(&["shared"]), "changed", None))
            .expect("right");

        let result = Graph::merge([&left, &right]);
        assert!(matches!(result, Err(CredError::MergeConflict { .. })));
    }

    /// T1.3: Edges survive the merge of the graphs holding their endpoints.
    #[test]
    fn edges_follow_their_endpoints() {
        let mut left = Graph::new();
        left.add_node(node(&["a"])).expect("a");
        left.add_node(node(&["b"])).expect("b");
        left.add_edge(Edge::new(
            EdgeAddress::from_parts(["a", "b"]).expect("edge"),
            addr(&["a"]),
            addr(&["b"]),
            1,
        ))
        .expect("edge");

        let merged = Graph::merge([&left, &Graph::new()]).expect("merge");
        assert_eq!(merged.adjacent_edges(&addr(&["a"])).count(), 1);
        assert_eq!(merged.adjacent_edges(&addr(&["b"])).count(), 1);
    }
}

// =============================================================================
// TIER T2: TIMELINE FILTERING
// =============================================================================

mod t2_timeline_filtering {
    use super::*;

    fn example() -> (Vec<IntervalCred>, Vec<NodeAddress>) {
        let intervals = vec![
            IntervalCred::new(Interval::new(0, 10).expect("i0"), vec![1.0, 2.0, 3.0]),
            IntervalCred::new(Interval::new(10, 20).expect("i1"), vec![4.0, 5.0, 6.0]),
        ];
        let order = vec![addr(&["foo"]), addr(&["bar"]), addr(&["zod"])];
        (intervals, order)
    }

    /// T2.1: Only nodes under a prefix are kept, with their full series.
    #[test]
    fn keeps_matching_series() {
        let (intervals, order) = example();
        let filtered =
            filter_timeline_cred(&intervals, &order, &[addr(&["foo"]), addr(&["bar"])])
                .expect("filter");

        assert_eq!(filtered.cred_for(&addr(&["foo"])), Some(&[1.0, 4.0][..]));
        assert_eq!(filtered.cred_for(&addr(&["bar"])), Some(&[2.0, 5.0][..]));
        assert_eq!(filtered.cred_for(&addr(&["zod"])), None);
        assert_eq!(filtered.intervals().len(), 2);
    }

    /// T2.2: Filtering through a validated timeline gives the same result.
    #[test]
    fn timeline_filter_matches_free_function() {
        let (intervals, order) = example();
        let prefixes = [addr(&["zod"])];
        let direct = filter_timeline_cred(&intervals, &order, &prefixes).expect("direct");
        let timeline = TimelineCred::new(TimelineCredParameters::default(), order, intervals)
            .expect("timeline");
        assert_eq!(timeline.filter(&prefixes).expect("via timeline"), direct);
    }

    /// T2.3: A short score vector is rejected, not truncated.
    #[test]
    fn short_vector_fails_fast() {
        let (mut intervals, order) = example();
        intervals[1].cred.pop();
        let result = filter_timeline_cred(&intervals, &order, &[NodeAddress::empty()]);
        assert!(matches!(
            result,
            Err(CredError::ScoreVectorLength {
                interval_index: 1,
                expected: 3,
                actual: 2
            })
        ));
    }

    /// T2.4: The wire form is lossless.
    #[test]
    fn wire_round_trip() {
        let (intervals, order) = example();
        let filtered =
            filter_timeline_cred(&intervals, &order, &[NodeAddress::empty()]).expect("filter");
        assert_eq!(from_wire(to_wire(&filtered)).expect("from wire"), filtered);
        assert_eq!(
            from_wire(to_wire(&FilteredTimelineCred::default())).expect("empty"),
            FilteredTimelineCred::default()
        );
    }
}

// =============================================================================
// TIER T3: ARTIFACTS
// =============================================================================

mod t3_artifacts {
    use super::*;
    use credgraph_core::formats::{
        decode_graph, decode_timeline_cred, encode_graph, encode_timeline_cred,
        filtered_from_json, filtered_to_json,
    };

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(node(&["a"])).expect("a");
        graph.add_node(node(&["b"])).expect("b");
        graph
            .add_edge(Edge::new(
                EdgeAddress::from_parts(["a", "b"]).expect("edge"),
                addr(&["a"]),
                addr(&["b"]),
                7,
            ))
            .expect("edge");
        graph
    }

    /// T3.1: Graphs survive both encodings.
    #[test]
    fn graph_artifacts_round_trip() {
        let graph = sample_graph();
        for format in [ArtifactFormat::Json, ArtifactFormat::Binary] {
            let bytes = encode_graph(&graph, format).expect("encode");
            assert_eq!(decode_graph(&bytes, format).expect("decode"), graph);
        }
    }

    /// T3.2: Timelines survive both encodings.
    #[test]
    fn timeline_artifacts_round_trip() {
        let timeline = TimelineCred::new(
            TimelineCredParameters::default(),
            vec![addr(&["a"]), addr(&["b"])],
            vec![IntervalCred::new(
                Interval::new(0, 100).expect("interval"),
                vec![0.1, 0.2],
            )],
        )
        .expect("timeline");
        for format in [ArtifactFormat::Json, ArtifactFormat::Binary] {
            let bytes = encode_timeline_cred(&timeline, format).expect("encode");
            assert_eq!(decode_timeline_cred(&bytes, format).expect("decode"), timeline);
        }
    }

    /// T3.3: Binary artifacts of the wrong shape are refused.
    #[test]
    fn corrupt_binary_rejected() {
        let mut bytes = encode_graph(&sample_graph(), ArtifactFormat::Binary).expect("encode");
        bytes[0] = b'X';
        assert!(decode_graph(&bytes, ArtifactFormat::Binary).is_err());
        assert!(decode_graph(&[], ArtifactFormat::Binary).is_err());
    }

    /// T3.4: A JSON graph with a dangling edge is refused on load.
    #[test]
    fn dangling_edge_rejected_on_load() {
        let mut json: serde_json::Value = serde_json::from_slice(
            &encode_graph(&sample_graph(), ArtifactFormat::Json).expect("encode"),
        )
        .expect("json");
        let nodes = json
            .get_mut("nodes")
            .and_then(|n| n.as_array_mut())
            .expect("nodes array");
        nodes.truncate(1);
        let bytes = serde_json::to_vec(&json).expect("reencode");

        let result = decode_graph(&bytes, ArtifactFormat::Json);
        assert!(matches!(result, Err(CredError::DanglingEdge { .. })));
    }

    /// T3.5: Filtered cred JSON is lossless.
    #[test]
    fn filtered_json_round_trip() {
        let intervals = vec![IntervalCred::new(
            Interval::new(0, 10).expect("interval"),
            vec![1.0 / 3.0, 2.0],
        )];
        let order = vec![addr(&["x"]), addr(&["y"])];
        let filtered =
            filter_timeline_cred(&intervals, &order, &[addr(&["x"])]).expect("filter");
        let json = filtered_to_json(&filtered).expect("to json");
        assert_eq!(filtered_from_json(&json).expect("from json"), filtered);
    }

    /// T3.6: Artifacts written to disk read back identically.
    #[test]
    fn artifacts_survive_the_filesystem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let graph = sample_graph();
        for format in [ArtifactFormat::Json, ArtifactFormat::Binary] {
            let path = dir.path().join(format!("graph.{}", format.extension()));
            std::fs::write(&path, encode_graph(&graph, format).expect("encode")).expect("write");
            let bytes = std::fs::read(&path).expect("read");
            assert_eq!(decode_graph(&bytes, format).expect("decode"), graph);
        }
    }

    /// T3.7: A JSON graph listing a node twice is refused on load.
    #[test]
    fn repeated_node_rejected_on_load() {
        let mut json: serde_json::Value = serde_json::from_slice(
            &encode_graph(&sample_graph(), ArtifactFormat::Json).expect("encode"),
        )
        .expect("json");
        let nodes = json
            .get_mut("nodes")
            .and_then(|n| n.as_array_mut())
            .expect("nodes array");
        let first = nodes[0].clone();
        nodes.push(first);
        let bytes = serde_json::to_vec(&json).expect("reencode");

        let result = decode_graph(&bytes, ArtifactFormat::Json);
        assert!(matches!(result, Err(CredError::DuplicateAddress(_))));
    }

    /// T3.8: Non-finite scores never make it into an artifact.
    #[test]
    fn non_finite_scores_cannot_be_persisted() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = TimelineCred::new(
                TimelineCredParameters::default(),
                vec![addr(&["a"])],
                vec![IntervalCred::new(
                    Interval::new(0, 10).expect("interval"),
                    vec![bad],
                )],
            );
            assert!(matches!(result, Err(CredError::NonFiniteScore { .. })));
        }
    }
}
