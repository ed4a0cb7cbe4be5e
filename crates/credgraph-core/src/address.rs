//! # Addresses
//!
//! Kind-tagged, hierarchical identities for graph entities.
//!
//! An address is an ordered sequence of string parts plus a kind (node or
//! edge). It is stored as a single encoded string:
//!
//! ```text
//! N \0 part \0 part \0 ...      node address
//! E \0 part \0 part \0 ...      edge address
//! ```
//!
//! Every part is terminated by the separator, so prefix tests on the encoding
//! are component-aligned: `N\0foo\0` is not a prefix of `N\0foobar\0baz\0`.
//!
//! ## Kinds
//!
//! Node and edge addresses are distinct static types ([`NodeAddress`],
//! [`EdgeAddress`]). Where the kind is only known at run time (decoded wire
//! data, user input) use [`AnyAddress`] and convert with
//! [`AnyAddress::assert_kind`], which is the one place kinds are checked.

use crate::primitives::{ADDRESS_SEPARATOR, EDGE_TAG, NODE_TAG};
use crate::CredError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

// =============================================================================
// KINDS
// =============================================================================

/// Run-time discriminant of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    /// Identifies a node.
    Node,
    /// Identifies an edge.
    Edge,
}

impl Kind {
    /// The tag character that starts every encoding of this kind.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Node => NODE_TAG,
            Self::Edge => EDGE_TAG,
        }
    }

    /// Human-readable type name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Node => "NodeAddress",
            Self::Edge => "EdgeAddress",
        }
    }

    fn from_tag(tag: char) -> Option<Self> {
        match tag {
            NODE_TAG => Some(Self::Node),
            EDGE_TAG => Some(Self::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::NodeKind {}
    impl Sealed for super::EdgeKind {}
}

/// Static marker for an address kind.
///
/// Sealed: only [`NodeKind`] and [`EdgeKind`] exist.
pub trait AddressKind:
    sealed::Sealed + Copy + Eq + Ord + Hash + Default + Send + Sync + 'static
{
    /// The run-time kind this marker stands for.
    const KIND: Kind;
}

/// Marker for node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeKind;

/// Marker for edge addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EdgeKind;

impl AddressKind for NodeKind {
    const KIND: Kind = Kind::Node;
}

impl AddressKind for EdgeKind {
    const KIND: Kind = Kind::Edge;
}

/// The single kind check. Every conversion from untyped to typed data goes
/// through here.
fn check_kind(actual: Kind, expected: Kind, label: Option<&str>) -> Result<(), CredError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CredError::WrongKind {
            expected,
            actual,
            label: label.map(str::to_owned),
        })
    }
}

// =============================================================================
// TYPED ADDRESS
// =============================================================================

/// An address of statically known kind.
///
/// Equality, ordering and hashing are structural over the encoding, which is
/// injective in (kind, parts).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address<K: AddressKind> {
    encoded: String,
    kind: PhantomData<K>,
}

/// Address of a graph node.
pub type NodeAddress = Address<NodeKind>;

/// Address of a graph edge.
pub type EdgeAddress = Address<EdgeKind>;

impl<K: AddressKind> Address<K> {
    /// Build an address from its parts.
    ///
    /// Fails if any part contains the separator byte.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, CredError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut encoded = String::with_capacity(2);
        encoded.push(K::KIND.tag());
        encoded.push(ADDRESS_SEPARATOR);
        for part in parts {
            push_part(&mut encoded, part.as_ref())?;
        }
        Ok(Self::from_encoded_unchecked(encoded))
    }

    /// The address with no parts. A prefix of every address of this kind.
    #[must_use]
    pub fn empty() -> Self {
        let mut encoded = String::with_capacity(2);
        encoded.push(K::KIND.tag());
        encoded.push(ADDRESS_SEPARATOR);
        Self::from_encoded_unchecked(encoded)
    }

    /// Decode a raw encoding, requiring it to be of kind `K`.
    ///
    /// `label` is included in the error message on a kind mismatch.
    pub fn from_encoded(raw: &str, label: Option<&str>) -> Result<Self, CredError> {
        AnyAddress::from_encoded(raw)?.assert_kind(label)
    }

    fn from_encoded_unchecked(encoded: String) -> Self {
        Self {
            encoded,
            kind: PhantomData,
        }
    }

    /// The kind of this address.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        K::KIND
    }

    /// The raw encoding. Stable; suitable as a storage key.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Borrowed view of the parts.
    #[must_use]
    pub fn parts(&self) -> Vec<&str> {
        split_parts(&self.encoded)
    }

    /// Owned copy of the parts.
    #[must_use]
    pub fn to_parts(&self) -> Vec<String> {
        self.parts().into_iter().map(str::to_owned).collect()
    }

    /// Number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.encoded
            .chars()
            .filter(|c| *c == ADDRESS_SEPARATOR)
            .count()
            .saturating_sub(1)
    }

    /// True for the address with no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new address with `extra` parts appended.
    ///
    /// Equivalent to `from_parts(self.parts() ++ extra)`.
    pub fn append<I, S>(&self, extra: I) -> Result<Self, CredError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut encoded = self.encoded.clone();
        for part in extra {
            push_part(&mut encoded, part.as_ref())?;
        }
        Ok(Self::from_encoded_unchecked(encoded))
    }

    /// True iff `prefix`'s parts equal the leading parts of `self`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &Self) -> bool {
        self.encoded.starts_with(&prefix.encoded)
    }

    /// Forget the static kind.
    #[must_use]
    pub fn into_any(self) -> AnyAddress {
        match K::KIND {
            Kind::Node => AnyAddress::Node(Address::from_encoded_unchecked(self.encoded)),
            Kind::Edge => AnyAddress::Edge(Address::from_encoded_unchecked(self.encoded)),
        }
    }
}

impl<K: AddressKind> fmt::Display for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", K::KIND.name())?;
        for (i, part) in self.parts().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{:?}", part)?;
        }
        f.write_str("]")
    }
}

impl<K: AddressKind> fmt::Debug for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn push_part(encoded: &mut String, part: &str) -> Result<(), CredError> {
    if part.contains(ADDRESS_SEPARATOR) {
        return Err(CredError::InvalidAddress(format!(
            "part {:?} contains the separator",
            part
        )));
    }
    encoded.push_str(part);
    encoded.push(ADDRESS_SEPARATOR);
    Ok(())
}

/// Split a validated encoding into parts.
fn split_parts(encoded: &str) -> Vec<&str> {
    let mut chars = encoded.chars();
    chars.next();
    chars.next();
    match chars.as_str().strip_suffix(ADDRESS_SEPARATOR) {
        Some(body) => body.split(ADDRESS_SEPARATOR).collect(),
        None => Vec::new(),
    }
}

// =============================================================================
// UNTYPED ADDRESS
// =============================================================================

/// An address whose kind is known only at run time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyAddress {
    /// A node address.
    Node(NodeAddress),
    /// An edge address.
    Edge(EdgeAddress),
}

impl AnyAddress {
    /// Build an address of the given kind from its parts.
    pub fn make<I, S>(kind: Kind, parts: I) -> Result<Self, CredError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(match kind {
            Kind::Node => Self::Node(NodeAddress::from_parts(parts)?),
            Kind::Edge => Self::Edge(EdgeAddress::from_parts(parts)?),
        })
    }

    /// Decode a raw encoding of either kind.
    ///
    /// Rejects anything that is not `<tag>\0` followed by zero or more
    /// separator-terminated parts.
    pub fn from_encoded(raw: &str) -> Result<Self, CredError> {
        let bad = || CredError::InvalidAddress(format!("{:?} is not an encoded address", raw));
        let mut chars = raw.chars();
        let kind = chars.next().and_then(Kind::from_tag).ok_or_else(bad)?;
        if chars.next() != Some(ADDRESS_SEPARATOR) {
            return Err(bad());
        }
        let body = chars.as_str();
        if !body.is_empty() && !body.ends_with(ADDRESS_SEPARATOR) {
            return Err(bad());
        }
        Ok(match kind {
            Kind::Node => Self::Node(Address::from_encoded_unchecked(raw.to_owned())),
            Kind::Edge => Self::Edge(Address::from_encoded_unchecked(raw.to_owned())),
        })
    }

    /// The kind of this address.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Node(_) => Kind::Node,
            Self::Edge(_) => Kind::Edge,
        }
    }

    /// The raw encoding.
    #[must_use]
    pub fn encoded(&self) -> &str {
        match self {
            Self::Node(a) => a.encoded(),
            Self::Edge(a) => a.encoded(),
        }
    }

    /// Owned copy of the parts.
    #[must_use]
    pub fn to_parts(&self) -> Vec<String> {
        split_parts(self.encoded())
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Append parts, requiring this address to be of kind `expected`.
    pub fn append<I, S>(&self, expected: Kind, extra: I) -> Result<Self, CredError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_kind(self.kind(), expected, None)?;
        Ok(match self {
            Self::Node(a) => Self::Node(a.append(extra)?),
            Self::Edge(a) => Self::Edge(a.append(extra)?),
        })
    }

    /// Prefix test across untyped addresses. Both must share a kind.
    pub fn has_prefix(&self, prefix: &Self) -> Result<bool, CredError> {
        check_kind(prefix.kind(), self.kind(), Some("prefix"))?;
        Ok(self.encoded().starts_with(prefix.encoded()))
    }

    /// Diagnostic rendering, requiring this address to be of kind `expected`.
    pub fn to_display_string(&self, expected: Kind) -> Result<String, CredError> {
        check_kind(self.kind(), expected, None)?;
        Ok(self.to_string())
    }

    /// Narrow to a typed address, failing with a labelled error on the
    /// wrong kind.
    pub fn assert_kind<K: AddressKind>(self, label: Option<&str>) -> Result<Address<K>, CredError> {
        check_kind(self.kind(), K::KIND, label)?;
        let encoded = match self {
            Self::Node(a) => a.encoded,
            Self::Edge(a) => a.encoded,
        };
        Ok(Address::from_encoded_unchecked(encoded))
    }
}

impl fmt::Display for AnyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(a) => fmt::Display::fmt(a, f),
            Self::Edge(a) => fmt::Display::fmt(a, f),
        }
    }
}

impl From<NodeAddress> for AnyAddress {
    fn from(address: NodeAddress) -> Self {
        Self::Node(address)
    }
}

impl From<EdgeAddress> for AnyAddress {
    fn from(address: EdgeAddress) -> Self {
        Self::Edge(address)
    }
}

// =============================================================================
// WIRE FORM
// =============================================================================

/// Self-describing serialized form of an address: its kind and its parts.
///
/// Serialization formats have no nominal types, so every decode re-checks the
/// kind against the one the reader expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAddress {
    /// Address kind.
    pub kind: Kind,
    /// Address parts, in order.
    pub parts: Vec<String>,
}

impl WireAddress {
    /// Decode into a typed address of kind `K`.
    pub fn into_address<K: AddressKind>(self, label: Option<&str>) -> Result<Address<K>, CredError> {
        check_kind(self.kind, K::KIND, label)?;
        Address::from_parts(self.parts)
    }

    /// Decode into an untyped address.
    pub fn into_any(self) -> Result<AnyAddress, CredError> {
        AnyAddress::make(self.kind, self.parts)
    }
}

impl<K: AddressKind> From<&Address<K>> for WireAddress {
    fn from(address: &Address<K>) -> Self {
        Self {
            kind: K::KIND,
            parts: address.to_parts(),
        }
    }
}

impl From<&AnyAddress> for WireAddress {
    fn from(address: &AnyAddress) -> Self {
        Self {
            kind: address.kind(),
            parts: address.to_parts(),
        }
    }
}

impl<K: AddressKind> Serialize for Address<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireAddress::from(self).serialize(serializer)
    }
}

impl<'de, K: AddressKind> Deserialize<'de> for Address<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireAddress::deserialize(deserializer)?
            .into_address(None)
            .map_err(serde::de::Error::custom)
    }
}

impl Serialize for AnyAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireAddress::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireAddress::deserialize(deserializer)?
            .into_any()
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
