//! Insertable binary output

use std::io::Write;

use anim_common::{
    write_insertable, AnimError, Animation, HeaderLayout, Result, SegmentMap,
    INSERTABLE_ANIMATION, MAX_SEGMENT_OFFSET,
};

/// Write `animation` as an insertable file built for address 0
///
/// Linked headers use segment 0 and list their two table pointers for
/// relocation; DMA headers are already position independent.
pub fn write_insertable_animation<W: Write>(
    w: &mut W,
    animation: &Animation,
    dma: bool,
) -> Result<()> {
    let start_address = 0;
    let bank0 = SegmentMap::bank0();
    let layout = if dma {
        HeaderLayout::Relocatable
    } else {
        HeaderLayout::Linked { segments: &bank0 }
    };

    let end = u64::from(start_address) + animation.binary_size() as u64;
    if end > u64::from(MAX_SEGMENT_OFFSET) {
        return Err(AnimError::SizeLimitExceeded(format!(
            "data ends at {:#X}, past {:#X}",
            end, MAX_SEGMENT_OFFSET
        )));
    }

    let data = animation.to_binary(layout, start_address)?;
    write_insertable(
        w,
        INSERTABLE_ANIMATION,
        layout.pointer_offsets(),
        start_address,
        &data,
    )
}
