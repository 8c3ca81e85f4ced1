//! Animation emitters
//!
//! Every emitter takes a finished [`Animation`](anim_common::Animation) and
//! produces one output form. Failures are codec errors so callers can tell
//! size-limit problems from I/O problems.

mod c_source;
mod insertable;
mod json;
mod linked;

pub use c_source::{animation_table, to_alnum, to_c, to_c_declaration};
pub use insertable::write_insertable_animation;
pub use json::{to_json, AnimationJson};
pub use linked::{write_linked, DmaTable, LinkTarget, LinkedWrite};

use serde::Deserialize;

use crate::{C_SOURCE_EXT, INSERTABLE_EXT, JSON_EXT};

/// Output form selected on the command line or in a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Self-describing relocatable container
    #[default]
    Insertable,
    /// C source declarations
    C,
    /// JSON document with the raw table bytes
    Json,
    /// Written in place into an existing ROM image
    Rom,
}

impl OutputFormat {
    /// File extension for standalone outputs (`None` for in-place ROM writes)
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Insertable => Some(INSERTABLE_EXT),
            OutputFormat::C => Some(C_SOURCE_EXT),
            OutputFormat::Json => Some(JSON_EXT),
            OutputFormat::Rom => None,
        }
    }
}
