//! Pose sequence files
//!
//! A pose file is a JSON document holding one sampled pose per frame:
//!
//! ```json
//! {
//!   "name": "walk",
//!   "frame_start": 0,
//!   "nodes": ["root", "body", "head"],
//!   "frames": [
//!     { "translation": [0.0, 1.2, 0.0], "rotations": [[0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1]] }
//!   ]
//! }
//! ```
//!
//! Rotations are `[x, y, z, w]` quaternions relative to the parent node, in
//! the same order as `nodes`.

use std::ops::Range;
use std::path::Path;

use anim_common::{AnimError, PoseSource};
use anim_common::pose::MAX_FRAME_END;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// One sampled frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Root translation in scene units
    #[serde(default)]
    pub translation: [f32; 3],
    /// One quaternion per animated node
    pub rotations: Vec<[f32; 4]>,
}

/// A sampled pose sequence loaded from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frame_start: u32,
    /// Animated nodes in traversal order
    pub nodes: Vec<String>,
    pub frames: Vec<PoseFrame>,
}

impl PoseFile {
    /// Check that the sequence is complete and fits the header's frame fields
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("Pose file lists no animated nodes");
        }
        if self.frames.is_empty() {
            bail!("Pose file has no frames");
        }
        for (index, frame) in self.frames.iter().enumerate() {
            if frame.rotations.len() != self.nodes.len() {
                bail!(
                    "Frame {} has {} rotations, expected one per node ({})",
                    self.frame_start as usize + index,
                    frame.rotations.len(),
                    self.nodes.len()
                );
            }
        }
        let frame_end = u64::from(self.frame_start) + self.frames.len() as u64;
        if frame_end > u64::from(MAX_FRAME_END) {
            bail!(
                "Frames {}..{} run past the last 16-bit frame",
                self.frame_start,
                frame_end
            );
        }
        Ok(())
    }

    /// Frame at `frame`; frames outside the sequence hold the nearest end
    fn frame_at(&self, frame: u32) -> anim_common::Result<&PoseFrame> {
        let last = self
            .frames
            .len()
            .checked_sub(1)
            .ok_or_else(|| AnimError::MissingInput("pose file has no frames".to_string()))?;
        let index = (frame.saturating_sub(self.frame_start) as usize).min(last);
        Ok(&self.frames[index])
    }
}

impl PoseSource for PoseFile {
    fn frame_range(&self) -> Range<u32> {
        self.frame_start..self.frame_start.saturating_add(self.frames.len() as u32)
    }

    fn nodes(&self) -> &[String] {
        &self.nodes
    }

    fn root_translation(&self, frame: u32) -> anim_common::Result<[f32; 3]> {
        Ok(self.frame_at(frame)?.translation)
    }

    fn node_rotation(&self, frame: u32, node: usize) -> anim_common::Result<[f32; 4]> {
        let pose = self.frame_at(frame)?;
        pose.rotations.get(node).copied().ok_or_else(|| {
            AnimError::StructuralMismatch(format!(
                "frame {} has no rotation for node {}",
                frame, node
            ))
        })
    }
}

/// Load and validate a pose file
pub fn load_pose_file(path: &Path) -> Result<PoseFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pose file: {:?}", path))?;
    let pose: PoseFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse pose file: {:?}", path))?;
    pose.validate()
        .with_context(|| format!("Invalid pose file: {:?}", path))?;
    Ok(pose)
}
