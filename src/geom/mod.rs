//! Streamline geometry primitives.

pub mod centroid;
pub mod orient;
pub mod resample;
pub mod segment;
pub mod weights;

/// One reconstructed fiber path: an ordered polyline in world (RAS-mm) space.
pub type Streamline = Vec<[f32; 3]>;

/// All streamlines assigned to one named white-matter tract.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub streamlines: Vec<Streamline>,
}

impl Bundle {
    pub fn new(streamlines: Vec<Streamline>) -> Self {
        Self { streamlines }
    }

    pub fn len(&self) -> usize {
        self.streamlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streamlines.is_empty()
    }
}

pub(crate) fn point_distance(a: &[f32; 3], b: &[f32; 3]) -> f64 {
    let dx = (a[0] - b[0]) as f64;
    let dy = (a[1] - b[1]) as f64;
    let dz = (a[2] - b[2]) as f64;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Mean pointwise Euclidean distance between two equal-length polylines.
pub fn mean_pointwise_distance(a: &[[f32; 3]], b: &[[f32; 3]]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(pa, pb)| point_distance(pa, pb))
        .sum();
    sum / a.len() as f64
}
