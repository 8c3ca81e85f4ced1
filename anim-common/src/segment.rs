//! Segmented address translation
//!
//! A segmented address is one byte of segment id followed by a 24-bit
//! big-endian offset from that segment's start. The segment map relates ids
//! to half-open intervals of the flat (ROM) address space.

use serde::{Deserialize, Serialize};

use crate::error::{AnimError, Result};

/// Largest offset representable in the 24-bit offset field
pub const MAX_SEGMENT_OFFSET: u32 = 0x00FF_FFFF;

/// One segment: id plus the flat interval `[start, end)` it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u8,
    pub start: u32,
    pub end: u32,
}

impl Segment {
    pub fn contains(&self, address: u32) -> bool {
        self.start <= address && address < self.end
    }
}

/// Segment id → address interval, in insertion order
///
/// Encoding scans segments in insertion order and uses the first interval
/// containing the address. Overlaps and gaps are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentMap {
    segments: Vec<Segment>,
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment 0 spanning the whole 24-bit space, used for nominal
    /// zero-based layouts such as insertable binaries.
    pub fn bank0() -> Self {
        let mut map = Self::new();
        map.insert(0, 0, MAX_SEGMENT_OFFSET + 1);
        map
    }

    /// Insert or replace the interval for `id`
    pub fn insert(&mut self, id: u8, start: u32, end: u32) {
        let segment = Segment { id, start, end };
        match self.segments.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = segment,
            None => self.segments.push(segment),
        }
    }

    pub fn get(&self, id: u8) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// First segment whose interval contains `address`
    pub fn segment_for(&self, address: u32) -> Result<&Segment> {
        self.segments
            .iter()
            .find(|s| s.contains(address))
            .ok_or(AnimError::AddressNotInAnySegment { address })
    }

    /// Encode a flat address as `[segment id, offset24 BE]`
    pub fn encode(&self, address: u32) -> Result<[u8; 4]> {
        let segment = self.segment_for(address)?;
        let offset = address - segment.start;
        if offset > MAX_SEGMENT_OFFSET {
            return Err(AnimError::size(format!(
                "offset {:#X} into segment {:#04X} does not fit in 24 bits",
                offset, segment.id
            )));
        }
        let [_, b1, b2, b3] = offset.to_be_bytes();
        Ok([segment.id, b1, b2, b3])
    }

    /// Decode `[segment id, offset24 BE]` to a flat address
    pub fn decode(&self, bytes: [u8; 4]) -> Result<u32> {
        let [id, b1, b2, b3] = bytes;
        let segment = self
            .get(id)
            .ok_or(AnimError::UnknownSegment { segment: id })?;
        let offset = u32::from_be_bytes([0, b1, b2, b3]);
        segment.start.checked_add(offset).ok_or_else(|| {
            AnimError::size(format!(
                "segment {:#04X} start {:#X} plus offset {:#X} overflows 32 bits",
                id, segment.start, offset
            ))
        })
    }
}

impl FromIterator<Segment> for SegmentMap {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        let mut map = Self::new();
        for segment in iter {
            map.insert(segment.id, segment.start, segment.end);
        }
        map
    }
}

/// Round `address` up to the next multiple of 8 (unchanged if aligned)
pub fn align8(address: u32) -> Result<u32> {
    address.checked_next_multiple_of(8).ok_or_else(|| {
        AnimError::size(format!("address {:#X} cannot be aligned to 8 bytes", address))
    })
}
