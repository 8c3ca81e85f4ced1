//! Value and index tables
//!
//! All channel tracks share one value pool. The index table holds one
//! `(frame_count, start_offset)` pair per channel, where `start_offset` is a
//! word index into the value pool. Channels are laid out in a fixed order:
//! root translation x/y/z, then x/y/z rotation of every animated node in
//! traversal order.

use super::track::{TrackTriplet, AXES};
use crate::error::{AnimError, Result};

/// Largest cursor that can be stored in an index entry
pub const MAX_TABLE_CURSOR: usize = u16::MAX as usize;

/// Largest number of samples a value pool may hold
pub const MAX_VALUE_COUNT: usize = MAX_TABLE_CURSOR + 1;

/// Index descriptor for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexEntry {
    /// Number of stored samples (after hold compression)
    pub frame_count: u16,
    /// Word index of the first sample in the value pool
    pub start_offset: u16,
}

impl IndexEntry {
    pub const SIZE: usize = 4;

    pub fn new(frame_count: u16, start_offset: u16) -> Self {
        Self {
            frame_count,
            start_offset,
        }
    }

    /// Byte offset of the first sample from the start of the value pool
    pub fn byte_offset(&self) -> usize {
        usize::from(self.start_offset) * 2
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.frame_count.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.start_offset.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            frame_count: u16::from_be_bytes([bytes[0], bytes[1]]),
            start_offset: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// Index entries for the x/y/z channels of one node (12 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformIndex {
    pub axes: [IndexEntry; AXES],
}

impl TransformIndex {
    pub const SIZE: usize = IndexEntry::SIZE * AXES;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, entry) in bytes.chunks_exact_mut(IndexEntry::SIZE).zip(&self.axes) {
            chunk.copy_from_slice(&entry.to_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut axes = [IndexEntry::default(); AXES];
        for (entry, chunk) in axes.iter_mut().zip(bytes.chunks_exact(IndexEntry::SIZE)) {
            *entry = IndexEntry::from_bytes(chunk)?;
        }
        Some(Self { axes })
    }
}

/// Packed index table and value pool of one animation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationTables {
    indices: Vec<IndexEntry>,
    values: Vec<u16>,
}

impl AnimationTables {
    /// Pack the root translation and node rotation tracks
    ///
    /// Fails with [`AnimError::SizeLimitExceeded`] as soon as a channel would
    /// start beyond the 16-bit cursor range, or if the finished pool holds more
    /// than [`MAX_VALUE_COUNT`] samples.
    pub fn build(root_translation: &TrackTriplet, node_rotations: &[TrackTriplet]) -> Result<Self> {
        let channel_count = AXES * (1 + node_rotations.len());
        let mut tables = Self {
            indices: Vec::with_capacity(channel_count),
            values: Vec::new(),
        };

        let channels = root_translation
            .iter()
            .chain(node_rotations.iter().flatten());
        for (channel, track) in channels.enumerate() {
            let cursor = tables.values.len();
            if cursor > MAX_TABLE_CURSOR {
                return Err(AnimError::size(format!(
                    "animation is too large: channel {} would start at value {}, past {}",
                    channel, cursor, MAX_TABLE_CURSOR
                )));
            }
            let frame_count = u16::try_from(track.len()).map_err(|_| {
                AnimError::size(format!(
                    "channel {} holds {} samples, more than a 16-bit frame count",
                    channel,
                    track.len()
                ))
            })?;
            tables
                .indices
                .push(IndexEntry::new(frame_count, cursor as u16));
            tables.values.extend_from_slice(track.samples());
        }

        if tables.values.len() > MAX_VALUE_COUNT {
            return Err(AnimError::size(format!(
                "animation is too large: {} values, limit is {}",
                tables.values.len(),
                MAX_VALUE_COUNT
            )));
        }

        Ok(tables)
    }

    pub fn indices(&self) -> &[IndexEntry] {
        &self.indices
    }

    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Number of animated nodes described (excludes the root translation)
    pub fn node_count(&self) -> usize {
        (self.indices.len() / AXES).saturating_sub(1)
    }

    /// Index table as raw shorts: `frame_count, start_offset` per channel
    pub fn index_shorts(&self) -> Vec<u16> {
        self.indices
            .iter()
            .flat_map(|e| [e.frame_count, e.start_offset])
            .collect()
    }

    pub fn indices_size(&self) -> usize {
        self.indices.len() * IndexEntry::SIZE
    }

    pub fn values_size(&self) -> usize {
        self.values.len() * 2
    }

    /// Index table bytes (big-endian)
    pub fn indices_to_bytes(&self) -> Vec<u8> {
        self.indices.iter().flat_map(|e| e.to_bytes()).collect()
    }

    /// Value pool bytes (big-endian)
    pub fn values_to_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }
}
