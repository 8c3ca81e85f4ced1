//! Pose file → animation conversion and output writing

use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use anim_common::{
    clamp_frame_range, sample_pose_range, Animation, AnimationOptions, PoseSource,
};
use anyhow::{Context, Result};

use crate::emit::{self, LinkTarget, LinkedWrite};
use crate::pose::PoseFile;
use crate::DEFAULT_UNIT_SCALE;

/// Settings that shape the encoded animation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub unit_scale: f32,
    pub looping: bool,
    pub y_offset: u16,
    /// Requested `[start, end)` frames, clamped into the pose file's range
    pub frames: Option<Range<u32>>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            unit_scale: DEFAULT_UNIT_SCALE,
            looping: true,
            y_offset: 0,
            frames: None,
        }
    }
}

/// Sample `pose` and pack it into an animation named `name`
pub fn build_animation(name: &str, pose: &PoseFile, settings: &ExportSettings) -> Result<Animation> {
    let frames = clamp_frame_range(settings.frames.clone(), pose.frame_range());
    let sampled = sample_pose_range(pose, frames.clone(), settings.unit_scale)
        .with_context(|| format!("Failed to sample animation '{}'", name))?;

    if sampled.is_static() {
        tracing::warn!("Animation '{}' has no motion", name);
    }

    let options = AnimationOptions {
        looping: settings.looping,
        y_offset: settings.y_offset,
    };
    let animation = Animation::build(name, &sampled, options)
        .with_context(|| format!("Failed to encode animation '{}'", name))?;

    tracing::info!(
        "Encoded '{}': frames {}..{}, {} nodes, {} values, {} bytes",
        name,
        frames.start,
        frames.end,
        sampled.node_count(),
        sampled.value_count(),
        animation.binary_size()
    );
    Ok(animation)
}

/// Write an insertable binary file
pub fn write_insertable_file(animation: &Animation, dma: bool, output: &Path) -> Result<()> {
    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);
    emit::write_insertable_animation(&mut writer, animation, dma)
        .with_context(|| format!("Failed to write insertable: {:?}", output))?;
    writer.flush()?;
    Ok(())
}

/// Write C declarations for one animation
pub fn write_c_file(animation: &Animation, output: &Path) -> Result<()> {
    let source = emit::to_c(animation)?;
    std::fs::write(output, source)
        .with_context(|| format!("Failed to write C source: {:?}", output))?;
    Ok(())
}

/// Write the shared-animation JSON document
pub fn write_json_file(animation: &Animation, author: &str, output: &Path) -> Result<()> {
    let doc = emit::to_json(animation, animation.name(), author);
    let text = serde_json::to_string_pretty(&doc)?;
    std::fs::write(output, text)
        .with_context(|| format!("Failed to write JSON: {:?}", output))?;
    Ok(())
}

/// Write the animation into an existing ROM image in place
pub fn write_rom(
    animation: &Animation,
    rom: &Path,
    window: Range<u32>,
    target: LinkTarget<'_>,
) -> Result<LinkedWrite> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(rom)
        .with_context(|| format!("Failed to open ROM: {:?}", rom))?;
    let written = emit::write_linked(&mut file, animation, window, target)
        .with_context(|| format!("Failed to write animation '{}' into {:?}", animation.name(), rom))?;
    file.flush()?;

    match written.pointer_address {
        Some(pointer) => tracing::info!(
            "Wrote '{}' at {:#X}..{:#X}, table pointer at {:#X}",
            animation.name(),
            written.range.start,
            written.range.end,
            pointer
        ),
        None => tracing::info!(
            "Wrote '{}' at {:#X}..{:#X}",
            animation.name(),
            written.range.start,
            written.range.end
        ),
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PoseFrame;

    fn pose() -> PoseFile {
        let frame = |x: f32| PoseFrame {
            translation: [x, 0.0, 0.0],
            rotations: vec![[0.0, 0.0, 0.0, 1.0]],
        };
        PoseFile {
            name: None,
            frame_start: 0,
            nodes: vec!["root".to_string()],
            frames: vec![frame(0.0), frame(0.1), frame(0.2), frame(0.3)],
        }
    }

    #[test]
    fn test_build_with_frame_window() {
        let settings = ExportSettings {
            frames: Some(1..3),
            looping: false,
            ..Default::default()
        };
        let anim = build_animation("slide", &pose(), &settings).unwrap();
        assert_eq!(anim.header().frame_start, 1);
        assert_eq!(anim.header().last_frame, 2);
        assert_eq!(anim.header().repetitions, 1);
        assert_eq!(anim.tables().values()[..2], [10, 20]);
    }

    #[test]
    fn test_window_clamped_to_pose() {
        let settings = ExportSettings {
            frames: Some(0..100),
            ..Default::default()
        };
        let anim = build_animation("slide", &pose(), &settings).unwrap();
        assert_eq!(anim.header().last_frame, 3);
    }

    #[test]
    fn test_translation_out_of_range() {
        let mut pose = pose();
        pose.frames[2].translation[0] = 1000.0;
        let err = build_animation("far", &pose, &ExportSettings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<anim_common::AnimError>(),
            Some(anim_common::AnimError::TranslationOutOfRange { .. })
        ));
    }
}
