//! Animation aggregate: header plus packed tables

use super::header::{AnimationHeader, HeaderLayout};
use super::table::AnimationTables;
use crate::error::{AnimError, Result};
use crate::pose::SampledAnimation;

/// Export-time options that end up in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Loop forever (repetitions = 0) instead of playing once
    pub looping: bool,
    /// Vertical offset applied by the engine (usually 0)
    pub y_offset: u16,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            looping: true,
            y_offset: 0,
        }
    }
}

/// A complete animation, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    name: String,
    header: AnimationHeader,
    tables: AnimationTables,
}

impl Animation {
    /// Pack sampled tracks into tables, then derive the header from the
    /// finished table sizes.
    pub fn build(
        name: impl Into<String>,
        sampled: &SampledAnimation,
        options: AnimationOptions,
    ) -> Result<Self> {
        let tables = AnimationTables::build(&sampled.root_translation, &sampled.node_rotations)?;

        let node_count = u16::try_from(sampled.node_rotations.len()).map_err(|_| {
            AnimError::size(format!(
                "{} animated nodes exceed the 16-bit node count",
                sampled.node_rotations.len()
            ))
        })?;
        if sampled.frame_end <= u32::from(sampled.frame_start) {
            return Err(AnimError::MissingInput(
                "animation has an empty frame range".to_string(),
            ));
        }
        let last_frame = u16::try_from(sampled.frame_end - 1).map_err(|_| {
            AnimError::size(format!(
                "last frame {} exceeds the 16-bit frame range",
                sampled.frame_end - 1
            ))
        })?;

        let indices_offset = AnimationHeader::SIZE;
        let values_offset = indices_offset + tables.indices_size();
        let total_size = values_offset + tables.values_size();
        let total_size = u32::try_from(total_size)
            .map_err(|_| AnimError::size(format!("animation of {} bytes", total_size)))?;

        let header = AnimationHeader {
            repetitions: if options.looping { 0 } else { 1 },
            y_offset: options.y_offset,
            frame_start: sampled.frame_start,
            last_frame,
            node_count,
            values_offset: values_offset as u32,
            indices_offset: indices_offset as u32,
            total_size,
        };

        Ok(Self {
            name: name.into(),
            header,
            tables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &AnimationHeader {
        &self.header
    }

    pub fn tables(&self) -> &AnimationTables {
        &self.tables
    }

    /// Serialized length in bytes (identical for both layouts)
    pub fn binary_size(&self) -> usize {
        self.header.total_size as usize
    }

    /// Header, index table and value pool as placed at `start_address`
    pub fn to_binary(&self, layout: HeaderLayout<'_>, start_address: u32) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.binary_size());
        data.extend_from_slice(&self.header.to_bytes(layout, start_address)?);
        data.extend(self.tables.indices_to_bytes());
        data.extend(self.tables.values_to_bytes());
        debug_assert_eq!(data.len(), self.binary_size());
        Ok(data)
    }
}
