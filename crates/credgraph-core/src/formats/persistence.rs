//! # Artifact Persistence
//!
//! Serialization of graphs and timelines to bytes. Pure transformations, no
//! file I/O.
//!
//! Two encodings:
//! - JSON, for artifacts meant to be read by other tools.
//! - Binary: a 5-byte header (magic + version) followed by a `postcard`
//!   payload, for compact storage.
//!
//! Every decode goes through the validating constructors, so a decoded graph
//! has no dangling edges and a decoded timeline has consistent shapes.

use crate::filter::FilteredTimelineCred;
use crate::graph::{Graph, SerializableGraph};
use crate::primitives::{self, HEADER_SIZE, MAX_ARTIFACT_SIZE};
use crate::timeline::TimelineCred;
use crate::CredError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// =============================================================================
// HEADER
// =============================================================================

/// Header for binary artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],
    /// Format version for compatibility.
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), CredError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(CredError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(CredError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CredError> {
        match bytes {
            [m0, m1, m2, m3, version, ..] => Ok(Self {
                magic: [*m0, *m1, *m2, *m3],
                version: *version,
            }),
            _ => Err(CredError::DeserializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FORMAT SELECTION
// =============================================================================

/// On-disk encoding of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// JSON text.
    #[default]
    Json,
    /// Header + postcard.
    Binary,
}

impl ArtifactFormat {
    /// File extension for this format, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "bin",
        }
    }

    /// Encode any serializable value.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CredError> {
        match self {
            Self::Json => to_json(value),
            Self::Binary => to_binary(value),
        }
    }

    /// Decode any deserializable value.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CredError> {
        match self {
            Self::Json => from_json(bytes),
            Self::Binary => from_binary(bytes),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, CredError> {
    serde_json::to_vec(value).map_err(|e| CredError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CredError> {
    serde_json::from_slice(bytes).map_err(|e| CredError::DeserializationError(e.to_string()))
}

fn to_binary<T: Serialize>(value: &T) -> Result<Vec<u8>, CredError> {
    let header = PersistenceHeader::new();
    let payload =
        postcard::to_stdvec(value).map_err(|e| CredError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Size and header are validated before the payload is touched.
fn from_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CredError> {
    if bytes.len() > MAX_ARTIFACT_SIZE {
        return Err(CredError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_ARTIFACT_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    postcard::from_bytes(payload)
        .map_err(|e| CredError::DeserializationError(format!("Failed to decode payload: {}", e)))
}

// =============================================================================
// TYPED ENTRY POINTS
// =============================================================================

/// Serialize a graph in the given format.
pub fn encode_graph(graph: &Graph, format: ArtifactFormat) -> Result<Vec<u8>, CredError> {
    format.encode(&SerializableGraph::from(graph))
}

/// Deserialize and re-validate a graph.
pub fn decode_graph(bytes: &[u8], format: ArtifactFormat) -> Result<Graph, CredError> {
    let serializable: SerializableGraph = format.decode(bytes)?;
    Graph::try_from(serializable)
}

/// Serialize a graph to header + postcard bytes.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, CredError> {
    encode_graph(graph, ArtifactFormat::Binary)
}

/// Deserialize a graph from header + postcard bytes.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, CredError> {
    decode_graph(bytes, ArtifactFormat::Binary)
}

/// Serialize a timeline in the given format.
pub fn encode_timeline_cred(cred: &TimelineCred, format: ArtifactFormat) -> Result<Vec<u8>, CredError> {
    format.encode(cred)
}

/// Deserialize and re-validate a timeline.
pub fn decode_timeline_cred(bytes: &[u8], format: ArtifactFormat) -> Result<TimelineCred, CredError> {
    format.decode(bytes)
}

/// Serialize filtered cred (always JSON, the presentation format).
pub fn filtered_to_json(filtered: &FilteredTimelineCred) -> Result<Vec<u8>, CredError> {
    to_json(filtered)
}

/// Deserialize filtered cred from JSON.
pub fn filtered_from_json(bytes: &[u8]) -> Result<FilteredTimelineCred, CredError> {
    from_json(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
