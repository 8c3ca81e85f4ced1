//! Keyframe tracks and hold-frame compression

/// Number of axes per channel group (x, y, z)
pub const AXES: usize = 3;

/// Strip the trailing run of samples equal to their predecessor
///
/// Keeps one representative of the final held value. Slices of length 0 or 1
/// are returned unchanged.
pub fn trim_trailing_holds(samples: &[u16]) -> &[u16] {
    let mut last_unique = samples.len().saturating_sub(1);
    while last_unique > 0 && samples[last_unique] == samples[last_unique - 1] {
        last_unique -= 1;
    }
    &samples[..samples.len().min(last_unique + 1)]
}

/// Quantized samples for one scalar channel, hold-compressed on construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyframeTrack {
    samples: Vec<u16>,
}

impl KeyframeTrack {
    /// Build a track from per-frame samples, trimming trailing holds
    pub fn from_samples(mut samples: Vec<u16>) -> Self {
        let kept = trim_trailing_holds(&samples).len();
        samples.truncate(kept);
        Self { samples }
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// x/y/z tracks of one channel group (root translation or a node rotation)
pub type TrackTriplet = [KeyframeTrack; AXES];
