//! Command-line parsers for addresses, ranges and segments
//!
//! Numbers are decimal or `0x`-prefixed hex.

use std::ops::Range;

use anim_common::Segment;

use crate::emit::DmaTable;

/// Parse a decimal or `0x` hex number
pub fn parse_address(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

/// Parse `START:END` into a half-open range
pub fn parse_range(text: &str) -> Result<Range<u32>, String> {
    let (start, end) = text
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", text))?;
    let range = parse_address(start)?..parse_address(end)?;
    if range.is_empty() {
        return Err(format!("range '{}' is empty", text));
    }
    Ok(range)
}

/// Parse `ID:START:END` into a segment
pub fn parse_segment(text: &str) -> Result<Segment, String> {
    let mut parts = text.splitn(3, ':');
    let (Some(id), Some(start), Some(end)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected ID:START:END, got '{}'", text));
    };
    let id = parse_address(id)?;
    let id = u8::try_from(id).map_err(|_| format!("segment id {:#X} does not fit a byte", id))?;
    Ok(Segment {
        id,
        start: parse_address(start)?,
        end: parse_address(end)?,
    })
}

/// Parse `START:ENTRY` into a DMA table descriptor
pub fn parse_dma_table(text: &str) -> Result<DmaTable, String> {
    let (start, entry) = text
        .split_once(':')
        .ok_or_else(|| format!("expected START:ENTRY, got '{}'", text))?;
    Ok(DmaTable {
        start: parse_address(start)?,
        entry: parse_address(entry)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x11A000"), Ok(0x11A000));
        assert_eq!(parse_address("0X10"), Ok(16));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert_eq!(parse_address("0x0011_A000"), Ok(0x11A000));
        assert!(parse_address("0xZZ").is_err());
        assert!(parse_address("").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0x100:0x200"), Ok(0x100..0x200));
        assert!(parse_range("0x200:0x100").is_err());
        assert!(parse_range("0x200").is_err());
    }

    #[test]
    fn test_parse_segment() {
        let segment = parse_segment("0x04:0x110000:0x120000").unwrap();
        assert_eq!(segment.id, 4);
        assert_eq!(segment.start, 0x110000);
        assert_eq!(segment.end, 0x120000);
        assert!(parse_segment("0x100:0:1").is_err());
        assert!(parse_segment("4:0").is_err());
    }

    #[test]
    fn test_parse_dma_table() {
        let table = parse_dma_table("0x4EC000:0x4EC008").unwrap();
        assert_eq!(table.start, 0x4EC000);
        assert_eq!(table.entry, 0x4EC008);
    }
}
