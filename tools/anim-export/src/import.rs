//! Decoding animations from ROM images and insertable files

use std::borrow::Cow;
use std::path::Path;

use anim_common::{
    read_animation, read_insertable, read_raw_channels, AnimationHeader, DecodedAnimation,
    HeaderLayout, InsertableHeader, SegmentMap, INSERTABLE_ANIMATION,
};
use anyhow::{bail, Context, Result};
use serde::Serialize;

/// Where the animation lives
#[derive(Debug, Clone, Copy)]
pub enum ImportSource<'a> {
    /// Insertable file; layout follows from its pointer list
    Insertable,
    /// Raw ROM image with the header at `address`
    Rom {
        address: u32,
        layout: HeaderLayout<'a>,
    },
}

/// Undecoded channel samples in index-table order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAnimation {
    pub repetitions: u16,
    pub y_offset: u16,
    pub frame_start: u16,
    pub last_frame: u16,
    pub node_count: u16,
    pub channels: Vec<Vec<u16>>,
}

/// Placeholder names `node_0`, `node_1`, ...
pub fn default_node_names(count: u16) -> Vec<String> {
    (0..count).map(|i| format!("node_{}", i)).collect()
}

/// Flat image plus header location and layout for `source`
struct Located<'a> {
    image: Cow<'a, [u8]>,
    address: u32,
    layout: HeaderLayout<'a>,
}

fn locate<'a>(bytes: &'a [u8], source: ImportSource<'a>, bank0: &'a SegmentMap) -> Result<Located<'a>> {
    match source {
        ImportSource::Rom { address, layout } => Ok(Located {
            image: bytes.into(),
            address,
            layout,
        }),
        ImportSource::Insertable => {
            let (header, payload) = read_insertable(bytes)?;
            if header.data_type != INSERTABLE_ANIMATION {
                bail!(
                    "Insertable holds data type {}, not an animation",
                    header.data_type
                );
            }
            let (image, layout): (Cow<'a, [u8]>, _) = if header.pointer_offsets.is_empty() {
                (payload.into(), HeaderLayout::Relocatable)
            } else if header.start_address == 0 {
                (payload.into(), HeaderLayout::Linked { segments: bank0 })
            } else {
                let image = rebase_pointers(payload, &header, bank0)?;
                (image.into(), HeaderLayout::Linked { segments: bank0 })
            };
            Ok(Located {
                image,
                address: 0,
                layout,
            })
        }
    }
}

/// Copy `payload` with its relocatable pointers moved from the nominal start
/// address to address 0
fn rebase_pointers(payload: &[u8], header: &InsertableHeader, bank0: &SegmentMap) -> Result<Vec<u8>> {
    let mut image = payload.to_vec();
    for &offset in &header.pointer_offsets {
        let slot = usize::try_from(offset)
            .ok()
            .and_then(|at| image.get_mut(at..at.checked_add(4)?))
            .with_context(|| format!("Pointer offset {:#X} is outside the payload", offset))?;
        let address = bank0.decode([slot[0], slot[1], slot[2], slot[3]])?;
        let local = address.checked_sub(header.start_address).with_context(|| {
            format!(
                "Pointer at {:#X} targets {:#X}, before the payload start {:#X}",
                offset, address, header.start_address
            )
        })?;
        slot.copy_from_slice(&bank0.encode(local)?);
    }
    Ok(image)
}

/// Decode the animation in `bytes`
///
/// Without `nodes`, placeholder names are generated from the header's node
/// count.
pub fn decode(
    bytes: &[u8],
    source: ImportSource<'_>,
    unit_scale: f32,
    nodes: Option<&[String]>,
) -> Result<DecodedAnimation> {
    let bank0 = SegmentMap::bank0();
    let located = locate(bytes, source, &bank0)?;
    let start = located.address as usize;
    let header_bytes = located
        .image
        .get(start..)
        .context("Animation address is past the end of the input")?;

    let names = match nodes {
        Some(nodes) => nodes.to_vec(),
        None => {
            let header =
                AnimationHeader::from_bytes(header_bytes, located.layout, located.address)?;
            default_node_names(header.node_count)
        }
    };

    let (_, decoded) = read_animation(
        &located.image,
        located.address,
        located.layout,
        unit_scale,
        &names,
    )?;
    tracing::info!(
        "Decoded animation: frames {}..={}, {} nodes",
        decoded.frame_start,
        decoded.last_frame,
        decoded.node_count
    );
    Ok(decoded)
}

/// Read raw channel samples without converting them
pub fn decode_raw(bytes: &[u8], source: ImportSource<'_>) -> Result<RawAnimation> {
    let bank0 = SegmentMap::bank0();
    let located = locate(bytes, source, &bank0)?;
    let (header, channels) = read_raw_channels(&located.image, located.address, located.layout)?;
    Ok(RawAnimation {
        repetitions: header.repetitions,
        y_offset: header.y_offset,
        frame_start: header.frame_start,
        last_frame: header.last_frame,
        node_count: header.node_count,
        channels,
    })
}

/// Decode `input` and write the result as JSON to `output`
pub fn import_file(
    input: &Path,
    output: &Path,
    source: ImportSource<'_>,
    unit_scale: f32,
    nodes: Option<&[String]>,
    raw: bool,
) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let text = if raw {
        let decoded = decode_raw(&bytes, source)
            .with_context(|| format!("Failed to decode animation in {:?}", input))?;
        serde_json::to_string_pretty(&decoded)?
    } else {
        let decoded = decode(&bytes, source, unit_scale, nodes)
            .with_context(|| format!("Failed to decode animation in {:?}", input))?;
        serde_json::to_string_pretty(&decoded)?
    };
    std::fs::write(output, text).with_context(|| format!("Failed to write {:?}", output))?;
    Ok(())
}
