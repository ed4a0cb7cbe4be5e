//! # credgraph-core
//!
//! The pure core of credgraph: content-addressed contribution graphs and the
//! timeline cred model computed over them.
//!
//! ## Layers (leaves first)
//!
//! - `address` — kind-tagged hierarchical identities with component-aligned
//!   prefix matching
//! - `graph` — nodes and edges keyed by address; conflict-checked merge
//! - `timeline` — per-interval, per-node cred from the solver
//! - `filter` — prefix filtering of a timeline and its lossless wire form
//! - `formats` — JSON and header-prefixed postcard artifacts
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no logging: the app layer owns those
//! - Every value is immutable once built and safe to share across threads
//! - Malformed input is rejected at the call that sees it

// =============================================================================
// MODULES
// =============================================================================

pub mod address;
pub mod filter;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod timeline;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use address::{
    Address, AddressKind, AnyAddress, EdgeAddress, EdgeKind, Kind, NodeAddress, NodeKind,
    WireAddress,
};
pub use filter::{
    FilteredTimelineCred, FilteredTimelineCredWire, PrefixTrie, filter_timeline_cred, from_wire,
    to_wire,
};
pub use formats::{ArtifactFormat, PersistenceHeader};
pub use graph::{Edge, Graph, Node, SerializableGraph};
pub use timeline::{
    CredConfig, EdgeWeight, Interval, IntervalCred, RawTimelineCred, TimelineCred,
    TimelineCredParameters, Weights,
};
pub use types::CredError;
