//! Proportional end1/core/end2 segmentation.

use crate::geom::{Bundle, Streamline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    End1,
    Core,
    End2,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::End1 => "end1",
            Segment::Core => "core",
            Segment::End2 => "end2",
        }
    }
}

/// Number of points taken from each end of a streamline of length `len`.
pub fn endpoint_count(len: usize, proportion: f64) -> usize {
    ((proportion * len as f64).round() as usize).max(1)
}

/// Extract one proportional segment of a reoriented streamline.
///
/// Segments partition the streamline: the two ends never overlap (the
/// second end starts no earlier than where the first one stops) and the
/// core is whatever remains in between, possibly empty.
pub fn extract_segment(sl: &[[f32; 3]], segment: Segment, proportion: f64) -> Streamline {
    let len = sl.len();
    if len == 0 {
        return Vec::new();
    }
    let n = endpoint_count(len, proportion);
    let end1_stop = n.min(len);
    let end2_start = len.saturating_sub(n).max(end1_stop);
    match segment {
        Segment::End1 => sl[..end1_stop].to_vec(),
        Segment::End2 => sl[end2_start..].to_vec(),
        Segment::Core => sl[end1_stop..end2_start].to_vec(),
    }
}

/// Split every streamline of a bundle into the three segment sub-bundles.
pub fn split_bundle(bundle: &Bundle, proportion: f64) -> (Bundle, Bundle, Bundle) {
    let collect = |segment: Segment| {
        Bundle::new(
            bundle
                .streamlines
                .iter()
                .map(|sl| extract_segment(sl, segment, proportion))
                .collect(),
        )
    };
    (collect(Segment::End1), collect(Segment::Core), collect(Segment::End2))
}
