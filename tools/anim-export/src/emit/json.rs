//! JSON output for animation sharing tools

use anim_common::Animation;
use serde::Serialize;

/// Shared-animation JSON document
///
/// `values` and `indices` hold the big-endian table bytes as `"0xNN"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationJson {
    pub name: String,
    pub author: String,
    /// `"true"` or `"false"`
    pub looping: String,
    /// Last frame minus first frame
    pub length: i64,
    pub nodes: u16,
    pub values: Vec<String>,
    pub indices: Vec<String>,
}

fn hex_bytes(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|b| format!("0x{:02X}", b)).collect()
}

/// Build the JSON document for `animation`
pub fn to_json(animation: &Animation, name: &str, author: &str) -> AnimationJson {
    let header = animation.header();
    let tables = animation.tables();
    AnimationJson {
        name: name.to_string(),
        author: author.to_string(),
        looping: header.is_looping().to_string(),
        length: i64::from(header.last_frame) - i64::from(header.frame_start),
        nodes: header.node_count,
        values: hex_bytes(&tables.values_to_bytes()),
        indices: hex_bytes(&tables.indices_to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_common::{AnimationOptions, AnimationRecorder};

    #[test]
    fn test_json_document() {
        let mut recorder = AnimationRecorder::new(3, 1, 1.0).unwrap();
        for x in [0.0, 0.5, 1.0] {
            recorder
                .record_frame([x, 0.0, 0.0], &[[0.0, 0.0, 0.0, 1.0]])
                .unwrap();
        }
        let anim = Animation::build(
            "jump",
            &recorder.finish().unwrap(),
            AnimationOptions::default(),
        )
        .unwrap();

        let doc = to_json(&anim, "Jump", "someone");
        assert_eq!(doc.looping, "true");
        assert_eq!(doc.length, 2);
        assert_eq!(doc.nodes, 1);
        // x translation 0, 1 (0.5 rounds away from zero), 1 trims to 0, 1
        assert_eq!(&doc.values[..4], &["0x00", "0x00", "0x00", "0x01"]);
        assert_eq!(doc.indices.len(), 6 * 4);
        assert_eq!(&doc.indices[..4], &["0x00", "0x02", "0x00", "0x00"]);

        let text = serde_json::to_string(&doc).unwrap();
        let keys = ["\"name\"", "\"author\"", "\"looping\"", "\"length\"", "\"nodes\"", "\"values\"", "\"indices\""];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
