//! # Primitives
//!
//! Fixed constants shared by the address codec and the artifact formats.
//! These are compiled into the binary and never change at runtime.

/// Separator between address parts, and terminator after the last one.
///
/// An encoded address is `<tag> SEP part SEP part SEP ...`, so every part is
/// followed by exactly one separator. Parts may be empty but may never contain
/// this byte.
pub const ADDRESS_SEPARATOR: char = '\0';

/// Tag byte for node addresses.
pub const NODE_TAG: char = 'N';

/// Tag byte for edge addresses.
pub const EDGE_TAG: char = 'E';

/// Magic bytes for the binary artifact header.
///
/// - File Header = Magic Bytes ("CRED") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"CRED";

/// Current binary artifact format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the binary artifact header (magic + version).
pub const HEADER_SIZE: usize = 5;

/// Maximum accepted binary artifact size (512 MiB).
///
/// Checked before any payload decoding to avoid memory exhaustion on
/// corrupted or hostile input.
pub const MAX_ARTIFACT_SIZE: usize = 512 * 1024 * 1024;
