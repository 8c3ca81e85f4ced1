//! Writing animations into a ROM image at a fixed address

use std::io::{Seek, SeekFrom, Write};
use std::ops::Range;

use anim_common::{align8, AnimError, Animation, HeaderLayout, Result, SegmentMap};
use serde::Deserialize;

/// DMA directory the animation is registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DmaTable {
    /// Start of the DMA table; entry offsets are relative to it
    pub start: u32,
    /// Address of the 8-byte `(offset, size)` entry to patch
    pub entry: u32,
}

/// How the written animation is referenced
#[derive(Debug, Clone, Copy)]
pub enum LinkTarget<'a> {
    /// Segmented pointers, plus a self-pointer after the data
    Segmented(&'a SegmentMap),
    /// Relocatable header, optionally registered in a DMA table
    Dma(Option<DmaTable>),
}

/// Where the animation ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedWrite {
    /// Bytes occupied by header and tables
    pub range: Range<u32>,
    /// Address of the segmented pointer to the header (segmented targets)
    pub pointer_address: Option<u32>,
}

/// Write `animation` into `w` within `window`
///
/// The header is placed at `align8(window.start)`. Nothing is written if the
/// data would end past `window.end` or a reference to it cannot be encoded.
pub fn write_linked<W: Write + Seek>(
    w: &mut W,
    animation: &Animation,
    window: Range<u32>,
    target: LinkTarget<'_>,
) -> Result<LinkedWrite> {
    let start = align8(window.start)?;
    let layout = match target {
        LinkTarget::Segmented(segments) => HeaderLayout::Linked { segments },
        LinkTarget::Dma(_) => HeaderLayout::Relocatable,
    };
    let data = animation.to_binary(layout, start)?;
    let len = u32::try_from(data.len())
        .map_err(|_| AnimError::SizeLimitExceeded(format!("{} bytes", data.len())))?;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= window.end)
        .ok_or_else(|| {
            AnimError::SizeLimitExceeded(format!(
                "data ends at {:#X}, past the end of the range at {:#X}",
                u64::from(start) + u64::from(len),
                window.end
            ))
        })?;

    // Every fallible encoding happens before the first byte is written
    let reference = match target {
        LinkTarget::Segmented(segments) => {
            let pointer = align8(end)?;
            Some((pointer, segments.encode(start)?.to_vec()))
        }
        LinkTarget::Dma(Some(table)) => {
            let offset = start.checked_sub(table.start).ok_or_else(|| {
                AnimError::StructuralMismatch(format!(
                    "animation at {:#X} precedes the DMA table at {:#X}",
                    start, table.start
                ))
            })?;
            let mut entry = offset.to_be_bytes().to_vec();
            entry.extend_from_slice(&len.to_be_bytes());
            Some((table.entry, entry))
        }
        LinkTarget::Dma(None) => None,
    };

    w.seek(SeekFrom::Start(u64::from(start)))?;
    w.write_all(&data)?;
    if let Some((address, bytes)) = &reference {
        w.seek(SeekFrom::Start(u64::from(*address)))?;
        w.write_all(bytes)?;
    }

    let pointer_address = match target {
        LinkTarget::Segmented(_) => reference.map(|(address, _)| address),
        LinkTarget::Dma(_) => None,
    };

    tracing::debug!(
        "Linked animation '{}' at {:#X}..{:#X}",
        animation.name(),
        start,
        end
    );

    Ok(LinkedWrite {
        range: start..end,
        pointer_address,
    })
}
