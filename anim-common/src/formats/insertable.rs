//! Insertable binary container
//!
//! A relocatable blob plus the metadata a ROM patcher needs to place it.
//!
//! # Layout
//! ```text
//! 0x00: data_type u32 BE       - payload kind (animation = 2)
//! 0x04: data_size u32 BE       - payload length in bytes
//! 0x08: start_address u32 BE   - nominal address the payload was built for
//! 0x0C: pointer_count u32 BE
//! 0x10: pointer_offsets        - pointer_count × u32 BE, payload offsets to relocate
//! ....: payload
//! ```

use std::io::Write;

use crate::error::{AnimError, Result};

/// Insertable data type of an animation payload
pub const INSERTABLE_ANIMATION: u32 = 2;

/// Metadata preceding an insertable payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertableHeader {
    pub data_type: u32,
    pub data_size: u32,
    pub start_address: u32,
    pub pointer_offsets: Vec<u32>,
}

impl InsertableHeader {
    /// Size of the fixed fields before the pointer list
    pub const FIXED_SIZE: usize = 16;

    pub fn size(&self) -> usize {
        Self::FIXED_SIZE + self.pointer_offsets.len() * 4
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        bytes.extend_from_slice(&self.data_type.to_be_bytes());
        bytes.extend_from_slice(&self.data_size.to_be_bytes());
        bytes.extend_from_slice(&self.start_address.to_be_bytes());
        bytes.extend_from_slice(&(self.pointer_offsets.len() as u32).to_be_bytes());
        for offset in &self.pointer_offsets {
            bytes.extend_from_slice(&offset.to_be_bytes());
        }
        bytes
    }

    /// Parse the header; `None` if `bytes` is too short for it
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let word = |at: usize| -> Option<u32> {
            let chunk = bytes.get(at..at + 4)?;
            Some(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        };
        let pointer_count = word(0x0C)? as usize;
        let pointer_offsets = (0..pointer_count)
            .map(|i| word(Self::FIXED_SIZE + i * 4))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            data_type: word(0x00)?,
            data_size: word(0x04)?,
            start_address: word(0x08)?,
            pointer_offsets,
        })
    }
}

/// Write a complete insertable file: header, pointer list, payload
pub fn write_insertable<W: Write>(
    w: &mut W,
    data_type: u32,
    pointer_offsets: &[u32],
    start_address: u32,
    data: &[u8],
) -> Result<()> {
    let data_size = u32::try_from(data.len())
        .map_err(|_| AnimError::size(format!("insertable payload of {} bytes", data.len())))?;
    let header = InsertableHeader {
        data_type,
        data_size,
        start_address,
        pointer_offsets: pointer_offsets.to_vec(),
    };
    w.write_all(&header.to_bytes())?;
    w.write_all(data)?;
    Ok(())
}

/// Split an insertable file into header and payload
pub fn read_insertable(bytes: &[u8]) -> Result<(InsertableHeader, &[u8])> {
    let header = InsertableHeader::from_bytes(bytes).ok_or(AnimError::OutOfBounds {
        address: 0,
        len: InsertableHeader::FIXED_SIZE,
        size: bytes.len(),
    })?;
    let start = header.size();
    let len = header.data_size as usize;
    let payload = bytes
        .get(start..start + len)
        .ok_or(AnimError::OutOfBounds {
            address: start as u64,
            len,
            size: bytes.len(),
        })?;
    for &offset in &header.pointer_offsets {
        if offset as usize + 4 > len {
            return Err(AnimError::mismatch(format!(
                "pointer offset {:#X} is outside the {}-byte payload",
                offset, len
            )));
        }
    }
    Ok((header, payload))
}
