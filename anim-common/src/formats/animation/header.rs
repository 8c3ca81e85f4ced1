//! Animation header structure and operations

use crate::error::{AnimError, Result};
use crate::segment::SegmentMap;

/// How the two table pointers (and the size field) are laid out
#[derive(Debug, Clone, Copy)]
pub enum HeaderLayout<'a> {
    /// Segmented pointers to `start_address + offset`; trailing 6 bytes zero
    Linked { segments: &'a SegmentMap },
    /// Flat offsets from the header start, then the total size (DMA blobs)
    Relocatable,
}

impl HeaderLayout<'_> {
    pub fn is_relocatable(&self) -> bool {
        matches!(self, HeaderLayout::Relocatable)
    }

    /// Payload offsets that hold pointers needing relocation
    pub fn pointer_offsets(&self) -> &'static [u32] {
        match self {
            HeaderLayout::Linked { .. } => &[
                AnimationHeader::VALUES_PTR_OFFSET as u32,
                AnimationHeader::INDICES_PTR_OFFSET as u32,
            ],
            HeaderLayout::Relocatable => &[],
        }
    }
}

/// Animation header (26 bytes, big-endian)
///
/// Table locations are kept as offsets from the header start; the layout
/// decides how they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    /// 0 loops forever, anything else is a play count
    pub repetitions: u16,
    pub y_offset: u16,
    pub frame_start: u16,
    /// Last sampled frame (inclusive)
    pub last_frame: u16,
    /// Number of animated nodes (the index table has `node_count + 1` triplets)
    pub node_count: u16,
    pub values_offset: u32,
    pub indices_offset: u32,
    /// Header + index table + value pool, in bytes
    pub total_size: u32,
}

impl AnimationHeader {
    pub const SIZE: usize = 0x1A;
    pub const VALUES_PTR_OFFSET: usize = 0x0C;
    pub const INDICES_PTR_OFFSET: usize = 0x10;
    pub const TOTAL_SIZE_OFFSET: usize = 0x14;

    pub fn is_looping(&self) -> bool {
        self.repetitions == 0
    }

    /// Exclusive end of the frame range
    pub fn frame_end(&self) -> u32 {
        u32::from(self.last_frame) + 1
    }

    /// Write the header as if it were placed at `start_address`
    ///
    /// `start_address` only matters for the linked layout.
    pub fn to_bytes(&self, layout: HeaderLayout<'_>, start_address: u32) -> Result<[u8; Self::SIZE]> {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0x00..0x02].copy_from_slice(&self.repetitions.to_be_bytes());
        bytes[0x02..0x04].copy_from_slice(&self.y_offset.to_be_bytes());
        // 0x04..0x06 reserved
        bytes[0x06..0x08].copy_from_slice(&self.frame_start.to_be_bytes());
        bytes[0x08..0x0A].copy_from_slice(&self.last_frame.to_be_bytes());
        bytes[0x0A..0x0C].copy_from_slice(&self.node_count.to_be_bytes());

        let values = Self::VALUES_PTR_OFFSET..Self::VALUES_PTR_OFFSET + 4;
        let indices = Self::INDICES_PTR_OFFSET..Self::INDICES_PTR_OFFSET + 4;
        match layout {
            HeaderLayout::Linked { segments } => {
                let values_address = absolute(start_address, self.values_offset)?;
                let indices_address = absolute(start_address, self.indices_offset)?;
                bytes[values].copy_from_slice(&segments.encode(values_address)?);
                bytes[indices].copy_from_slice(&segments.encode(indices_address)?);
            }
            HeaderLayout::Relocatable => {
                bytes[values].copy_from_slice(&self.values_offset.to_be_bytes());
                bytes[indices].copy_from_slice(&self.indices_offset.to_be_bytes());
                bytes[Self::TOTAL_SIZE_OFFSET..Self::TOTAL_SIZE_OFFSET + 4]
                    .copy_from_slice(&self.total_size.to_be_bytes());
            }
        }
        Ok(bytes)
    }

    /// Read a header that was placed at `start_address`
    ///
    /// Linked pointers are segment-decoded and made relative to
    /// `start_address`; a table located before the header is a structural
    /// mismatch. The size field is read as stored (zero for linked headers).
    pub fn from_bytes(bytes: &[u8], layout: HeaderLayout<'_>, start_address: u32) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(AnimError::OutOfBounds {
                address: u64::from(start_address),
                len: Self::SIZE,
                size: bytes.len(),
            });
        }
        let u16_at = |at: usize| u16::from_be_bytes([bytes[at], bytes[at + 1]]);
        let raw_at = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];

        let (values_offset, indices_offset) = match layout {
            HeaderLayout::Linked { segments } => {
                let values = segments.decode(raw_at(Self::VALUES_PTR_OFFSET))?;
                let indices = segments.decode(raw_at(Self::INDICES_PTR_OFFSET))?;
                (
                    relative(values, start_address, "value table")?,
                    relative(indices, start_address, "index table")?,
                )
            }
            HeaderLayout::Relocatable => (
                u32::from_be_bytes(raw_at(Self::VALUES_PTR_OFFSET)),
                u32::from_be_bytes(raw_at(Self::INDICES_PTR_OFFSET)),
            ),
        };

        Ok(Self {
            repetitions: u16_at(0x00),
            y_offset: u16_at(0x02),
            frame_start: u16_at(0x06),
            last_frame: u16_at(0x08),
            node_count: u16_at(0x0A),
            values_offset,
            indices_offset,
            total_size: u32::from_be_bytes(raw_at(Self::TOTAL_SIZE_OFFSET)),
        })
    }
}

fn absolute(start_address: u32, offset: u32) -> Result<u32> {
    start_address.checked_add(offset).ok_or_else(|| {
        AnimError::size(format!(
            "table at {:#X} + {:#X} overflows the address space",
            start_address, offset
        ))
    })
}

fn relative(address: u32, start_address: u32, what: &str) -> Result<u32> {
    address.checked_sub(start_address).ok_or_else(|| {
        AnimError::mismatch(format!(
            "{} at {:#X} precedes the header at {:#X}",
            what, address, start_address
        ))
    })
}
