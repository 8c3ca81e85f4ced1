//! Binary serialization trait for fixed-size records.
//!
//! Fixed-size records that do not depend on placement (index triplets,
//! index entries) implement `BinarySerializable`. The animation header is
//! placement-dependent and has its own `to_bytes`/`from_bytes` taking a
//! [`HeaderLayout`](super::HeaderLayout).

/// Trait for binary-serializable fixed-size records.
///
/// Uses `Vec<u8>` for the return type because associated const generics in
/// return types (`[u8; Self::SIZE]`) are not yet stable in Rust. Type-specific
/// `to_bytes()` methods return fixed-size arrays.
///
/// # Example
///
/// ```
/// use anim_common::formats::{BinarySerializable, IndexEntry};
///
/// let entry = IndexEntry::new(3, 0x10);
/// let bytes = entry.serialize();
/// assert_eq!(bytes, vec![0x00, 0x03, 0x00, 0x10]);
/// assert_eq!(IndexEntry::deserialize(&bytes), Some(entry));
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::IndexEntry {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::TransformIndex {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
