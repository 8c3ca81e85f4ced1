//! anim-export - animation table export tool
//!
//! Converts sampled pose sequences (.json) to engine animation tables
//! (.insertable, .inc.c, .json, or in place into a ROM image) and decodes
//! them back.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ops::Range;
use std::path::PathBuf;

use anim_common::{HeaderLayout, Segment, SegmentMap};
use anim_export::address::{parse_address, parse_dma_table, parse_range, parse_segment};
use anim_export::emit::{DmaTable, LinkTarget, OutputFormat};
use anim_export::export::{self, ExportSettings};
use anim_export::import::{self, ImportSource};
use anim_export::{manifest, pose, DEFAULT_UNIT_SCALE};

#[derive(Parser)]
#[command(name = "anim-export")]
#[command(about = "Animation table export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build animations from a manifest file
    Build {
        /// Path to animations.toml manifest
        #[arg(default_value = "animations.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to animations.toml manifest
        #[arg(default_value = "animations.toml")]
        manifest: PathBuf,
    },

    /// Export a single pose file
    Export {
        /// Input pose file (.json)
        input: PathBuf,

        /// Output file (the ROM image for --format rom)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Insertable)]
        format: OutputFormat,

        /// Animation name (default: pose file name, then file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Scene units to engine units
        #[arg(long, default_value_t = DEFAULT_UNIT_SCALE)]
        unit_scale: f32,

        /// Play once instead of looping
        #[arg(long)]
        no_loop: bool,

        /// Vertical offset stored in the header
        #[arg(long, default_value_t = 0)]
        y_offset: u16,

        /// Relocatable (DMA) header
        #[arg(long)]
        dma: bool,

        /// Frames to export, START:END (clamped to the pose file)
        #[arg(long, value_parser = parse_range)]
        frames: Option<Range<u32>>,

        /// ROM write window, START:END
        #[arg(long, value_parser = parse_range)]
        range: Option<Range<u32>>,

        /// Segment for pointer encoding, ID:START:END (repeatable)
        #[arg(long = "segment", value_parser = parse_segment)]
        segments: Vec<Segment>,

        /// DMA table to register in, START:ENTRY
        #[arg(long, value_parser = parse_dma_table)]
        dma_table: Option<DmaTable>,

        /// Author for JSON output
        #[arg(long, default_value = "")]
        author: String,
    },

    /// Decode an animation to JSON
    Import {
        /// Insertable file, or ROM image with --address
        input: PathBuf,

        /// Output .json file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header address in a ROM image
        #[arg(long, value_parser = parse_address)]
        address: Option<u32>,

        /// Header in the ROM is relocatable (DMA)
        #[arg(long)]
        dma: bool,

        /// Segment for pointer decoding, ID:START:END (repeatable)
        #[arg(long = "segment", value_parser = parse_segment)]
        segments: Vec<Segment>,

        /// Scene units to engine units
        #[arg(long, default_value_t = DEFAULT_UNIT_SCALE)]
        unit_scale: f32,

        /// Node names in traversal order (comma separated)
        #[arg(long, value_delimiter = ',')]
        nodes: Vec<String>,

        /// Take node names from a pose file
        #[arg(long, conflicts_with = "nodes")]
        skeleton: Option<PathBuf>,

        /// Dump undecoded 16-bit samples
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building animations from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Export {
            input,
            output,
            format,
            name,
            unit_scale,
            no_loop,
            y_offset,
            dma,
            frames,
            range,
            segments,
            dma_table,
            author,
        } => {
            let pose = pose::load_pose_file(&input)?;
            let name = name
                .or_else(|| pose.name.clone())
                .or_else(|| {
                    input
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .map(str::to_string)
                })
                .context("Cannot derive an animation name; pass --name")?;
            let settings = ExportSettings {
                unit_scale,
                looping: !no_loop,
                y_offset,
                frames,
            };
            let animation = export::build_animation(&name, &pose, &settings)?;

            match format.extension() {
                None => {
                    let rom = output.context("--format rom needs the ROM image as --output")?;
                    let window = range.context("--format rom needs --range START:END")?;
                    let segments: SegmentMap = segments.into_iter().collect();
                    let target = if dma {
                        LinkTarget::Dma(dma_table)
                    } else {
                        if segments.is_empty() {
                            anyhow::bail!("Segmented output needs at least one --segment");
                        }
                        LinkTarget::Segmented(&segments)
                    };
                    export::write_rom(&animation, &rom, window, target)?;
                }
                Some(ext) => {
                    let output = output.unwrap_or_else(|| input.with_extension(ext));
                    tracing::info!("Exporting animation {:?} -> {:?}", input, output);
                    match format {
                        OutputFormat::C => export::write_c_file(&animation, &output)?,
                        OutputFormat::Json => export::write_json_file(&animation, &author, &output)?,
                        _ => export::write_insertable_file(&animation, dma, &output)?,
                    }
                }
            }
            tracing::info!("Done!");
        }

        Commands::Import {
            input,
            output,
            address,
            dma,
            segments,
            unit_scale,
            nodes,
            skeleton,
            raw,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("decoded.json"));
            let nodes = match skeleton {
                Some(path) => Some(pose::load_pose_file(&path)?.nodes),
                None if nodes.is_empty() => None,
                None => Some(nodes),
            };
            let segments: SegmentMap = segments.into_iter().collect();
            let source = match address {
                Some(address) => ImportSource::Rom {
                    address,
                    layout: if dma {
                        HeaderLayout::Relocatable
                    } else {
                        HeaderLayout::Linked {
                            segments: &segments,
                        }
                    },
                },
                None => ImportSource::Insertable,
            };

            tracing::info!("Importing animation {:?} -> {:?}", input, output);
            import::import_file(&input, &output, source, unit_scale, nodes.as_deref(), raw)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
