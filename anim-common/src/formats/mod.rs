//! Binary formats produced and consumed by the codec
//!
//! - [`animation`] - animation header, index table and value pool
//! - [`insertable`] - self-describing container for relocatable blobs
//!
//! Fixed-size records implement the [`BinarySerializable`] trait.

pub mod animation;
pub mod insertable;
mod serialization;

pub use animation::*;
pub use insertable::*;
pub use serialization::BinarySerializable;
