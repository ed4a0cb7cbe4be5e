//! # credgraph
//!
//! The orchestration layer on top of `credgraph-core`.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    apps/credgraph                          │
//! │                                                           │
//! │  config ──► load ──► GraphSource × N (concurrent)          │
//! │               │            │                              │
//! │               │            ▼                              │
//! │               │      Graph::merge ──► CredSolver           │
//! │               ▼                            │              │
//! │           project (directory layout) ◄─────┘              │
//! │                                                           │
//! │                   credgraph-core (THE LOGIC)              │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Sources and the solver are collaborators supplied by the caller; this
//! crate only coordinates them and persists what they produce.

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod error;
pub mod load;
pub mod plugin;
pub mod progress;
pub mod project;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use error::{BoxError, LoadError};
pub use load::{LoadOptions, LoadSummary, load};
pub use plugin::{CredSolver, Credentials, GraphSource, SourceOptions};
pub use progress::{LoggingReporter, ProgressReporter, SilentReporter};
pub use project::{ClearScope, Project, ProjectDirectory};
