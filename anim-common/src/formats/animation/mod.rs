//! Skeletal animation tables (.anim binaries)
//!
//! One animation is a header, an index table and a shared value pool.
//! Everything is big-endian.
//!
//! # Layout
//! ```text
//! Header (26 bytes):
//! 0x00: repetitions u16      - 0 loops forever, otherwise play count
//! 0x02: y_offset u16
//! 0x04: reserved u16         - 0
//! 0x06: frame_start u16
//! 0x08: last_frame u16       - exclusive frame end minus one
//! 0x0A: node_count u16       - animated nodes (root translation not counted)
//! 0x0C: values_ptr u32       - segmented address, or flat offset (relocatable)
//! 0x10: indices_ptr u32      - segmented address, or flat offset (relocatable)
//! 0x14: total_size u32       - relocatable only; linked headers keep 6 zero bytes
//! 0x18: reserved u16
//!
//! Index table ((node_count + 1) × 12 bytes):
//! per axis x/y/z: frame_count u16, start_offset u16 (word index into values)
//! first triplet is the root translation, then one rotation triplet per node
//!
//! Value pool: u16 samples, sum(frame_count) entries
//! ```

mod clip;
mod header;
mod reader;
mod table;
mod track;


pub use clip::{Animation, AnimationOptions};
pub use header::{AnimationHeader, HeaderLayout};
pub use reader::{read_animation, read_raw_channels, DecodedAnimation, DecodedNode};
pub use table::{
    AnimationTables, IndexEntry, TransformIndex, MAX_TABLE_CURSOR, MAX_VALUE_COUNT,
};
pub use track::{trim_trailing_holds, KeyframeTrack, TrackTriplet, AXES};
