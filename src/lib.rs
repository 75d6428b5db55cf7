//! tractprof: along-tract profile extraction for white-matter bundles.
//!
//! Given one subject and one atlas, the pipeline orients each tract's
//! streamlines against a cached atlas centroid, splits them into
//! end1/core/end2 segments, rasterizes segment density maps on the
//! subject's anatomical grid, and samples diffusion scalar maps along the
//! oriented bundle into fixed-length tract profiles.

pub mod cli;
pub mod cohort;
pub mod ctx;
pub mod density;
pub mod geom;
pub mod io;
pub mod pipeline;
pub mod profile;
pub mod report;
