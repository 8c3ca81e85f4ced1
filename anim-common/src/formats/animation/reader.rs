//! Decoding animations back into per-node keyframes

use serde::{Deserialize, Serialize};

use super::header::{AnimationHeader, HeaderLayout};
use super::table::TransformIndex;
use super::track::AXES;
use crate::error::{AnimError, Result};
use crate::fixed::{decode_rotation, decode_translation};

/// Decoded x/y/z keyframes of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedNode {
    pub name: String,
    /// Rotation keyframes in radians, per axis
    pub rotation: [Vec<f32>; AXES],
}

/// Result of decoding an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedAnimation {
    pub looping: bool,
    pub repetitions: u16,
    pub y_offset: u16,
    pub frame_start: u16,
    /// Last frame as stored in the header (inclusive)
    pub last_frame: u16,
    pub node_count: u16,
    /// Root translation keyframes in scene units, per axis
    pub root_translation: [Vec<f32>; AXES],
    pub nodes: Vec<DecodedNode>,
}

/// Read an animation whose header sits at `start_address` in `source`
///
/// `nodes` is the traversal order the animation was exported with; its length
/// must match the header's node count.
pub fn read_animation(
    source: &[u8],
    start_address: u32,
    layout: HeaderLayout<'_>,
    unit_scale: f32,
    nodes: &[String],
) -> Result<(AnimationHeader, DecodedAnimation)> {
    let header_bytes = slice_at(source, u64::from(start_address), AnimationHeader::SIZE)?;
    let header = AnimationHeader::from_bytes(header_bytes, layout, start_address)?;

    if usize::from(header.node_count) != nodes.len() {
        return Err(AnimError::mismatch(format!(
            "animation has {} nodes, skeleton provides {}",
            header.node_count,
            nodes.len()
        )));
    }

    let indices_start = u64::from(start_address) + u64::from(header.indices_offset);
    let values_start = u64::from(start_address) + u64::from(header.values_offset);

    let triplets = (0..=u64::from(header.node_count))
        .map(|i| read_transform_index(source, indices_start + i * TransformIndex::SIZE as u64))
        .collect::<Result<Vec<_>>>()?;
    let Some((root, rotations)) = triplets.split_first() else {
        return Err(AnimError::mismatch("index table has no root triplet"));
    };

    let root_translation = read_triplet(source, values_start, root, |raw| {
        decode_translation(raw, unit_scale)
    })?;
    let decoded_nodes = rotations
        .iter()
        .zip(nodes)
        .map(|(index, name)| {
            Ok(DecodedNode {
                name: name.clone(),
                rotation: read_triplet(source, values_start, index, decode_rotation)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let decoded = DecodedAnimation {
        looping: header.is_looping(),
        repetitions: header.repetitions,
        y_offset: header.y_offset,
        frame_start: header.frame_start,
        last_frame: header.last_frame,
        node_count: header.node_count,
        root_translation,
        nodes: decoded_nodes,
    };
    Ok((header, decoded))
}

/// Raw 16-bit samples of every channel, in index-table order
pub fn read_raw_channels(
    source: &[u8],
    start_address: u32,
    layout: HeaderLayout<'_>,
) -> Result<(AnimationHeader, Vec<Vec<u16>>)> {
    let header_bytes = slice_at(source, u64::from(start_address), AnimationHeader::SIZE)?;
    let header = AnimationHeader::from_bytes(header_bytes, layout, start_address)?;
    let indices_start = u64::from(start_address) + u64::from(header.indices_offset);
    let values_start = u64::from(start_address) + u64::from(header.values_offset);

    let mut channels = Vec::with_capacity(AXES * (usize::from(header.node_count) + 1));
    for i in 0..=u64::from(header.node_count) {
        let index = read_transform_index(source, indices_start + i * TransformIndex::SIZE as u64)?;
        for entry in index.axes {
            let start = values_start + entry.byte_offset() as u64;
            channels.push(read_samples(source, start, entry.frame_count)?);
        }
    }
    Ok((header, channels))
}

fn read_transform_index(source: &[u8], address: u64) -> Result<TransformIndex> {
    let bytes = slice_at(source, address, TransformIndex::SIZE)?;
    TransformIndex::from_bytes(bytes).ok_or(AnimError::OutOfBounds {
        address,
        len: TransformIndex::SIZE,
        size: source.len(),
    })
}

fn read_triplet(
    source: &[u8],
    values_start: u64,
    index: &TransformIndex,
    convert: impl Fn(u16) -> f32,
) -> Result<[Vec<f32>; AXES]> {
    let mut axes: [Vec<f32>; AXES] = Default::default();
    for (axis, entry) in axes.iter_mut().zip(&index.axes) {
        let start = values_start + entry.byte_offset() as u64;
        *axis = read_samples(source, start, entry.frame_count)?
            .into_iter()
            .map(&convert)
            .collect();
    }
    Ok(axes)
}

fn read_samples(source: &[u8], address: u64, count: u16) -> Result<Vec<u16>> {
    let bytes = slice_at(source, address, usize::from(count) * 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

fn slice_at(source: &[u8], address: u64, len: usize) -> Result<&[u8]> {
    let out_of_bounds = || AnimError::OutOfBounds {
        address,
        len,
        size: source.len(),
    };
    let start = usize::try_from(address).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    source.get(start..end).ok_or_else(out_of_bounds)
}
