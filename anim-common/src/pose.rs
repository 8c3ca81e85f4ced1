//! Pose input: the host-facing seam for building animations
//!
//! The codec never evaluates a scene itself. A host either implements
//! [`PoseSource`] and calls [`sample_pose_source`], or drives an
//! [`AnimationRecorder`] frame by frame.

use std::ops::Range;

use glam::{EulerRot, Quat};

use crate::error::{AnimError, Result};
use crate::fixed::{encode_rotation, encode_translation};
use crate::formats::animation::{KeyframeTrack, TrackTriplet, AXES};

/// Exclusive upper bound for any frame index stored in a header
pub const MAX_FRAME_END: u32 = u16::MAX as u32 + 1;

/// A sampled skeleton pose over a frame range
pub trait PoseSource {
    /// Frames available for sampling, `[start, end)`
    fn frame_range(&self) -> Range<u32>;

    /// Animated nodes in traversal order (first entry is the root)
    fn nodes(&self) -> &[String];

    /// Root translation at `frame`, in scene units
    fn root_translation(&self, frame: u32) -> Result<[f32; 3]>;

    /// Rotation of `node` relative to its parent at `frame`, as `[x, y, z, w]`
    fn node_rotation(&self, frame: u32, node: usize) -> Result<[f32; 4]>;
}

/// Hold-compressed tracks ready for table packing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledAnimation {
    pub frame_start: u16,
    /// Exclusive end of the sampled range
    pub frame_end: u32,
    pub root_translation: TrackTriplet,
    pub node_rotations: Vec<TrackTriplet>,
}

impl SampledAnimation {
    pub fn node_count(&self) -> usize {
        self.node_rotations.len()
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_end.saturating_sub(u32::from(self.frame_start))
    }

    /// True when no channel changes over the whole range
    pub fn is_static(&self) -> bool {
        self.root_translation
            .iter()
            .chain(self.node_rotations.iter().flatten())
            .all(|track| track.len() <= 1)
    }

    pub fn value_count(&self) -> usize {
        self.root_translation
            .iter()
            .chain(self.node_rotations.iter().flatten())
            .map(KeyframeTrack::len)
            .sum()
    }
}

/// Accumulates quantized samples frame by frame
///
/// Frames must be saved in order. [`AnimationRecorder::finish`] applies hold
/// compression per axis and checks that every channel saw every frame.
#[derive(Debug, Clone)]
pub struct AnimationRecorder {
    frame_start: u16,
    unit_scale: f32,
    translation: [Vec<u16>; AXES],
    rotations: Vec<[Vec<u16>; AXES]>,
}

impl AnimationRecorder {
    pub fn new(frame_start: u16, node_count: usize, unit_scale: f32) -> Result<Self> {
        if node_count == 0 {
            return Err(AnimError::MissingInput(
                "no animated nodes to record".to_string(),
            ));
        }
        Ok(Self {
            frame_start,
            unit_scale,
            translation: Default::default(),
            rotations: vec![Default::default(); node_count],
        })
    }

    pub fn node_count(&self) -> usize {
        self.rotations.len()
    }

    /// Frames recorded so far (root translation channel)
    pub fn frames_recorded(&self) -> usize {
        self.translation[0].len()
    }

    fn check_frame_capacity(&self, recorded: usize) -> Result<()> {
        let next_end = u32::from(self.frame_start) + recorded as u32 + 1;
        if next_end > MAX_FRAME_END {
            return Err(AnimError::size(format!(
                "frame {} is past the last 16-bit frame",
                next_end - 1
            )));
        }
        Ok(())
    }

    fn encode_translation_frame(&self, translation: [f32; 3]) -> Result<[u16; AXES]> {
        let mut encoded = [0u16; AXES];
        for (slot, value) in encoded.iter_mut().zip(translation) {
            *slot = encode_translation(value, self.unit_scale)?;
        }
        Ok(encoded)
    }

    /// Append one frame of root translation (scene units)
    pub fn save_translation_frame(&mut self, translation: [f32; 3]) -> Result<()> {
        self.check_frame_capacity(self.translation[0].len())?;
        let encoded = self.encode_translation_frame(translation)?;
        for (track, value) in self.translation.iter_mut().zip(encoded) {
            track.push(value);
        }
        Ok(())
    }

    /// Append one frame of rotation for `node`
    pub fn save_rotation_frame(&mut self, node: usize, rotation: [f32; 4]) -> Result<()> {
        let node_count = self.rotations.len();
        let recorded = self
            .rotations
            .get(node)
            .map(|tracks| tracks[0].len())
            .ok_or_else(|| {
                AnimError::mismatch(format!(
                    "node {} is outside the {} recorded nodes",
                    node, node_count
                ))
            })?;
        self.check_frame_capacity(recorded)?;
        let euler = quat_to_euler_xyz(rotation)?;
        for (track, angle) in self.rotations[node].iter_mut().zip(euler) {
            track.push(encode_rotation(angle));
        }
        Ok(())
    }

    /// Append a whole frame: root translation plus one rotation per node
    ///
    /// Either the whole frame is recorded or, on error, none of it.
    pub fn record_frame(&mut self, translation: [f32; 3], rotations: &[[f32; 4]]) -> Result<()> {
        if rotations.len() != self.rotations.len() {
            return Err(AnimError::mismatch(format!(
                "frame has {} rotations, expected {}",
                rotations.len(),
                self.rotations.len()
            )));
        }
        self.check_frame_capacity(self.frames_recorded())?;
        let encoded = self.encode_translation_frame(translation)?;
        let eulers = rotations
            .iter()
            .map(|rotation| quat_to_euler_xyz(*rotation))
            .collect::<Result<Vec<_>>>()?;

        for (track, value) in self.translation.iter_mut().zip(encoded) {
            track.push(value);
        }
        for (tracks, euler) in self.rotations.iter_mut().zip(eulers) {
            for (track, angle) in tracks.iter_mut().zip(euler) {
                track.push(encode_rotation(angle));
            }
        }
        Ok(())
    }

    /// Trim trailing holds and hand over the finished tracks
    pub fn finish(self) -> Result<SampledAnimation> {
        let frames = self.frames_recorded();
        if frames == 0 {
            return Err(AnimError::MissingInput("no frames recorded".to_string()));
        }
        let uneven = self
            .translation
            .iter()
            .chain(self.rotations.iter().flatten())
            .any(|track| track.len() != frames);
        if uneven {
            return Err(AnimError::mismatch(format!(
                "not every channel was saved for all {} frames",
                frames
            )));
        }

        Ok(SampledAnimation {
            frame_start: self.frame_start,
            frame_end: u32::from(self.frame_start) + frames as u32,
            root_translation: self.translation.map(KeyframeTrack::from_samples),
            node_rotations: self
                .rotations
                .into_iter()
                .map(|axes| axes.map(KeyframeTrack::from_samples))
                .collect(),
        })
    }
}

/// Sample every frame of `source` into hold-compressed tracks
pub fn sample_pose_source<S: PoseSource + ?Sized>(
    source: &S,
    unit_scale: f32,
) -> Result<SampledAnimation> {
    sample_pose_range(source, source.frame_range(), unit_scale)
}

/// Sample `frames` of `source` (already clamped by the caller)
pub fn sample_pose_range<S: PoseSource + ?Sized>(
    source: &S,
    frames: Range<u32>,
    unit_scale: f32,
) -> Result<SampledAnimation> {
    if frames.is_empty() {
        return Err(AnimError::MissingInput(format!(
            "empty frame range {}..{}",
            frames.start, frames.end
        )));
    }
    let frame_start = u16::try_from(frames.start).map_err(|_| {
        AnimError::size(format!("frame start {} exceeds 16 bits", frames.start))
    })?;

    let mut recorder = AnimationRecorder::new(frame_start, source.nodes().len(), unit_scale)?;
    for frame in frames {
        recorder.save_translation_frame(source.root_translation(frame)?)?;
        for node in 0..recorder.node_count() {
            recorder.save_rotation_frame(node, source.node_rotation(frame, node)?)?;
        }
    }
    recorder.finish()
}

/// Clamp a requested export range into the range a source provides
///
/// The start never precedes the source's start, and at least one frame is
/// always kept.
pub fn clamp_frame_range(requested: Option<Range<u32>>, available: Range<u32>) -> Range<u32> {
    let Some(requested) = requested else {
        return available;
    };
    let start = requested.start.max(available.start);
    let end = requested.end.min(available.end).max(start.saturating_add(1));
    start..end
}

/// Convert a quaternion to XYZ Euler angles (radians, extrinsic X then Y then Z)
fn quat_to_euler_xyz(rotation: [f32; 4]) -> Result<[f32; 3]> {
    let q = Quat::from_array(rotation);
    if !q.is_finite() || q.length_squared() <= f32::EPSILON {
        return Err(AnimError::mismatch(format!(
            "rotation {:?} is not a usable quaternion",
            rotation
        )));
    }
    let (z, y, x) = q.normalize().to_euler(EulerRot::ZYX);
    Ok([x, y, z])
}
