//! Security limits for decoding untrusted input.

/// Maximum nesting depth of lists and dictionaries.
///
/// The decoder is recursive; bounding depth bounds stack use.
pub const MAX_DEPTH: usize = 512;

/// Maximum length of a single byte string (64 MiB).
pub const MAX_STRING_LEN: u64 = 64 * 1024 * 1024;

/// Size of the chunks byte string payloads are read in.
///
/// A declared length is never allocated up front; payloads grow one chunk at
/// a time so a short input with a huge length prefix fails cheaply.
pub(crate) const READ_CHUNK: usize = 64 * 1024;
