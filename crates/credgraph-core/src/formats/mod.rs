//! # Formats
//!
//! Byte-level encodings of the persisted artifacts.

pub mod persistence;

pub use persistence::{
    ArtifactFormat, PersistenceHeader, decode_graph, decode_timeline_cred, encode_graph,
    encode_timeline_cred, filtered_from_json, filtered_to_json, graph_from_bytes, graph_to_bytes,
};
