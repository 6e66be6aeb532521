//! Raw storage access for external codecs
//!
//! Codecs live outside this workspace and read dense numeric storage as a
//! flat byte buffer through this trait.

/// Trait for storage that can expose its cells as raw bytes
///
/// The byte layout is the native-endian, row-major cell buffer. No wire
/// format is implied; the consumer knows the value type and size from the
/// matrix itself.
pub trait StorageBackend {
    /// The underlying cell buffer as bytes
    fn as_bytes(&self) -> &[u8];

    /// Length of the buffer in bytes
    fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }
}
