//! Animation table codec for an N64-era 3D engine
//!
//! Converts sampled skeletal poses into the engine's compact animation
//! tables and back. This crate is shared between:
//! - `anim-export` (export/import tool)
//! - any host that samples poses through [`pose::PoseSource`]
//!
//! # Modules
//!
//! - [`fixed`] - 16-bit fixed-point rotation/translation samples
//! - [`segment`] - segmented address translation
//! - [`pose`] - pose sampling, recording and hold compression
//! - [`formats`] - header, tables, decoder and insertable container
//! - [`error`] - the codec's error type

pub mod error;
pub mod fixed;
pub mod formats;
pub mod pose;
pub mod segment;

pub use error::{AnimError, Result};

pub use fixed::{decode_rotation, decode_translation, encode_rotation, encode_translation};

pub use segment::{align8, Segment, SegmentMap, MAX_SEGMENT_OFFSET};

pub use pose::{
    clamp_frame_range, sample_pose_range, sample_pose_source, AnimationRecorder, PoseSource,
    SampledAnimation,
};

pub use formats::{
    // Animation
    read_animation,
    read_raw_channels,
    Animation,
    AnimationHeader,
    AnimationOptions,
    AnimationTables,
    DecodedAnimation,
    DecodedNode,
    HeaderLayout,
    IndexEntry,
    KeyframeTrack,
    TransformIndex,
    // Insertable container
    read_insertable,
    write_insertable,
    InsertableHeader,
    INSERTABLE_ANIMATION,
};
