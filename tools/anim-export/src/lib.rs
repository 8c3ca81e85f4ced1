//! anim-export library
//!
//! Converts sampled pose sequences into animation tables and writes them as
//! linked ROM data, insertable binaries, C sources or JSON. Also decodes
//! animations back out of ROMs and insertable files.

pub mod address;
pub mod emit;
pub mod export;
pub mod import;
pub mod manifest;
pub mod pose;

/// Default scene-unit to engine-unit scale for root translation
pub const DEFAULT_UNIT_SCALE: f32 = 100.0;

/// File extensions for emitted animations
pub const INSERTABLE_EXT: &str = "insertable";
pub const C_SOURCE_EXT: &str = "inc.c";
pub const JSON_EXT: &str = "json";
