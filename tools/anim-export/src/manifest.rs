//! Manifest parsing and build orchestration
//!
//! Parses animations.toml and coordinates animation export.

use anim_common::{Segment, SegmentMap};
use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use serde::Deserialize;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::emit::{self, DmaTable, LinkTarget, OutputFormat};
use crate::export::{self, ExportSettings};
use crate::pose::load_pose_file;
use crate::{C_SOURCE_EXT, DEFAULT_UNIT_SCALE, INSERTABLE_EXT, JSON_EXT};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub settings: Settings,
    /// Segment table for linked ROM output
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub animations: HashMap<String, AnimationEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("anims/")
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f32,
    /// Author written into JSON output
    #[serde(default)]
    pub author: String,
    /// C name of the animation table; enables `table.inc.c` and `anim_header.h`
    #[serde(default)]
    pub table: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit_scale: default_unit_scale(),
            author: String::new(),
            table: None,
        }
    }
}

fn default_unit_scale() -> f32 {
    DEFAULT_UNIT_SCALE
}

fn default_looping() -> bool {
    true
}

/// Fully specified animation entry
#[derive(Debug, Deserialize)]
pub struct AnimationConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_looping")]
    pub looping: bool,
    #[serde(default)]
    pub y_offset: u16,
    /// Relocatable (DMA) header instead of segmented pointers
    #[serde(default)]
    pub dma: bool,
    /// `[start, end)` frames to export
    #[serde(default)]
    pub frames: Option<[u32; 2]>,
    /// ROM image to write into (`format = "rom"`)
    #[serde(default)]
    pub rom: Option<PathBuf>,
    /// `[start, end)` write window in the ROM
    #[serde(default)]
    pub range: Option<[u32; 2]>,
    #[serde(default)]
    pub dma_table: Option<DmaTable>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnimationEntry {
    Simple(PathBuf),
    Detailed(AnimationConfig),
}

impl AnimationEntry {
    pub fn path(&self) -> &Path {
        match self {
            AnimationEntry::Simple(p) => p,
            AnimationEntry::Detailed(config) => &config.path,
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            AnimationEntry::Simple(_) => OutputFormat::default(),
            AnimationEntry::Detailed(config) => config.format,
        }
    }

    pub fn dma(&self) -> bool {
        matches!(self, AnimationEntry::Detailed(config) if config.dma)
    }

    fn settings(&self, unit_scale: f32) -> ExportSettings {
        match self {
            AnimationEntry::Simple(_) => ExportSettings {
                unit_scale,
                ..Default::default()
            },
            AnimationEntry::Detailed(config) => ExportSettings {
                unit_scale,
                looping: config.looping,
                y_offset: config.y_offset,
                frames: config.frames.map(|[start, end]| start..end),
            },
        }
    }

    fn config(&self) -> Option<&AnimationConfig> {
        match self {
            AnimationEntry::Simple(_) => None,
            AnimationEntry::Detailed(config) => Some(config),
        }
    }
}

impl Manifest {
    pub fn segment_map(&self) -> SegmentMap {
        self.segments.iter().copied().collect()
    }

    /// Animation names in a stable order
    pub fn animation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

fn window(name: &str, range: [u32; 2]) -> Result<Range<u32>> {
    let [start, end] = range;
    if start >= end {
        bail!(
            "Animation '{}' range {:#X}..{:#X} is empty",
            name,
            start,
            end
        );
    }
    Ok(start..end)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    if !(manifest.settings.unit_scale.is_finite() && manifest.settings.unit_scale > 0.0) {
        bail!(
            "unit_scale must be a positive number, got {}",
            manifest.settings.unit_scale
        );
    }
    for segment in &manifest.segments {
        if segment.start >= segment.end {
            bail!("Segment {:#04X} covers an empty interval", segment.id);
        }
    }

    for name in manifest.animation_names() {
        let entry = &manifest.animations[name];
        if !entry.path().exists() {
            bail!("Animation '{}' source not found: {:?}", name, entry.path());
        }
        let Some(config) = entry.config() else {
            continue;
        };
        if let Some([start, end]) = config.frames {
            if start >= end {
                bail!("Animation '{}' frame range {}..{} is empty", name, start, end);
            }
        }
        if config.dma_table.is_some() && !config.dma {
            bail!("Animation '{}' has a dma_table but is not a DMA animation", name);
        }
        if config.format == OutputFormat::Rom {
            let Some(rom) = &config.rom else {
                bail!("Animation '{}' is written into a ROM but has no 'rom' path", name);
            };
            if !rom.exists() {
                bail!("Animation '{}' ROM not found: {:?}", name, rom);
            }
            let Some(range) = config.range else {
                bail!("Animation '{}' is written into a ROM but has no 'range'", name);
            };
            window(name, range)?;
            if !config.dma && manifest.segments.is_empty() {
                bail!(
                    "Animation '{}' uses segmented pointers but the manifest has no segments",
                    name
                );
            }
        }
    }
    Ok(())
}

/// Build all animations from a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    validate(manifest)?;

    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    let segments = manifest.segment_map();
    let mut c_exports = Vec::new();

    for name in manifest.animation_names() {
        let entry = &manifest.animations[name];
        let pose = load_pose_file(entry.path())?;
        let settings = entry.settings(manifest.settings.unit_scale);
        let animation = export::build_animation(name, &pose, &settings)?;

        match entry.format() {
            OutputFormat::Rom => {
                let config = entry
                    .config()
                    .with_context(|| format!("Animation '{}' has no ROM settings", name))?;
                let rom = config
                    .rom
                    .as_deref()
                    .with_context(|| format!("Animation '{}' has no 'rom' path", name))?;
                let range = config
                    .range
                    .with_context(|| format!("Animation '{}' has no 'range'", name))?;
                let target = if config.dma {
                    LinkTarget::Dma(config.dma_table)
                } else {
                    LinkTarget::Segmented(&segments)
                };
                export::write_rom(&animation, rom, window(name, range)?, target)?;
            }
            OutputFormat::C => {
                let file_name = format!("anim_{}.{}", emit::to_alnum(name)?, C_SOURCE_EXT);
                let output = output_dir.join(&file_name);
                tracing::info!("Writing C source: {} -> {:?}", name, output);
                export::write_c_file(&animation, &output)?;
                c_exports.push((file_name, animation.name().to_string()));
            }
            OutputFormat::Json => {
                let output = output_dir.join(format!("{}.{}", name, JSON_EXT));
                tracing::info!("Writing JSON: {} -> {:?}", name, output);
                export::write_json_file(&animation, &manifest.settings.author, &output)?;
            }
            OutputFormat::Insertable => {
                let output = output_dir.join(format!("{}.{}", name, INSERTABLE_EXT));
                tracing::info!("Writing insertable: {} -> {:?}", name, output);
                export::write_insertable_file(&animation, entry.dma(), &output)?;
            }
        }
    }

    if let Some(table) = &manifest.settings.table {
        if !c_exports.is_empty() {
            write_c_index(output_dir, table, &c_exports)?;
        }
    }

    Ok(())
}

/// Write `data.inc.c`, `table.inc.c` and `anim_header.h` for the C exports
fn write_c_index(output_dir: &Path, table: &str, exports: &[(String, String)]) -> Result<()> {
    let includes: String = exports
        .iter()
        .map(|(file, _)| format!("#include \"{}\"\n", file))
        .collect();
    let table_source = emit::animation_table(table, exports.iter().map(|(_, name)| name.as_str()))?;
    let declaration = emit::to_c_declaration(table)?;

    for (file, contents) in [
        ("data.inc.c", includes),
        ("table.inc.c", table_source),
        ("anim_header.h", declaration),
    ] {
        let path = output_dir.join(file);
        std::fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }
    tracing::info!(
        "Wrote animation table '{}' with {} entries",
        table,
        exports.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = toml::from_str(
            r#"
            [output]
            dir = "out"

            [settings]
            unit_scale = 212.77
            table = "mario_anims"

            [[segments]]
            id = 4
            start = 0x110000
            end = 0x120000

            [animations]
            idle = "idle.json"

            [animations.walk]
            path = "walk.json"
            format = "rom"
            looping = false
            rom = "game.z64"
            range = [0x11A000, 0x11C000]

            [animations.jump]
            path = "jump.json"
            format = "c"
            dma = true
            frames = [0, 12]
            dma_table = { start = 0x4EC000, entry = 0x4EC008 }
            "#,
        )
        .unwrap();

        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert_eq!(manifest.settings.table.as_deref(), Some("mario_anims"));
        assert_eq!(manifest.segment_map().encode(0x110010).unwrap(), [4, 0, 0, 0x10]);
        assert_eq!(manifest.animation_names(), vec!["idle", "jump", "walk"]);

        let idle = &manifest.animations["idle"];
        assert_eq!(idle.format(), OutputFormat::Insertable);
        assert_eq!(idle.path(), Path::new("idle.json"));
        assert!(!idle.dma());

        let walk = &manifest.animations["walk"];
        assert_eq!(walk.format(), OutputFormat::Rom);
        assert!(!walk.settings(1.0).looping);

        let jump = &manifest.animations["jump"];
        assert!(jump.dma());
        assert_eq!(jump.settings(1.0).frames, Some(0..12));
        assert_eq!(
            jump.config().and_then(|s| s.dma_table),
            Some(DmaTable {
                start: 0x4EC000,
                entry: 0x4EC008
            })
        );
    }

    #[test]
    fn test_defaults() {
        let manifest: Manifest = toml::from_str("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("anims/"));
        assert_eq!(manifest.settings.unit_scale, DEFAULT_UNIT_SCALE);
        assert!(manifest.animations.is_empty());
        validate(&manifest).unwrap();
    }

    #[test]
    fn test_validate_missing_source() {
        let manifest: Manifest =
            toml::from_str("[animations]\nghost = \"does/not/exist.json\"\n").unwrap();
        assert!(validate(&manifest).is_err());
    }

    #[test]
    fn test_validate_bad_scale() {
        let manifest: Manifest = toml::from_str("[settings]\nunit_scale = 0.0\n").unwrap();
        assert!(validate(&manifest).is_err());
    }
}
