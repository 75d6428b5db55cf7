use nalgebra::Matrix4;

use tractprof::density::density_map;
use tractprof::geom::Bundle;
use tractprof::io::volume::RefGrid;

fn unit_grid(dims: (usize, usize, usize)) -> RefGrid {
    RefGrid::from_parts(dims, (1.0, 1.0, 1.0), Matrix4::identity())
}

#[test]
fn one_streamline_marks_its_voxels_once() {
    let grid = unit_grid((10, 10, 10));
    let sl = vec![[1.0, 1.0, 1.0], [2.0, 1.0, 1.0], [3.0, 1.0, 1.0]];
    let map = density_map(&Bundle::new(vec![sl]), &grid).unwrap();
    assert_eq!(map[[1, 1, 1]], 1.0);
    assert_eq!(map[[2, 1, 1]], 1.0);
    assert_eq!(map[[3, 1, 1]], 1.0);
    assert_eq!(map[[4, 1, 1]], 0.0);
    assert_eq!(map.sum(), 3.0);
}

#[test]
fn revisited_voxel_counts_once_per_streamline() {
    let grid = unit_grid((5, 5, 5));
    // Two points of the same streamline in voxel (2,2,2).
    let sl = vec![[2.1, 2.0, 2.0], [1.9, 2.0, 2.0]];
    let map = density_map(&Bundle::new(vec![sl]), &grid).unwrap();
    assert_eq!(map[[2, 2, 2]], 1.0);
    assert_eq!(map.sum(), 1.0);
}

#[test]
fn overlapping_streamlines_accumulate() {
    let grid = unit_grid((5, 5, 5));
    let a = vec![[2.0, 2.0, 2.0]];
    let b = vec![[2.0, 2.0, 2.0], [3.0, 2.0, 2.0]];
    let map = density_map(&Bundle::new(vec![a, b]), &grid).unwrap();
    assert_eq!(map[[2, 2, 2]], 2.0);
    assert_eq!(map[[3, 2, 2]], 1.0);
}

#[test]
fn points_outside_the_grid_are_ignored() {
    let grid = unit_grid((4, 4, 4));
    let sl = vec![[-3.0, 0.0, 0.0], [9.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
    let map = density_map(&Bundle::new(vec![sl]), &grid).unwrap();
    assert_eq!(map.sum(), 1.0);
    assert_eq!(map[[1, 1, 1]], 1.0);
}

#[test]
fn affine_translation_shifts_voxel_assignment() {
    let mut affine = Matrix4::identity();
    affine[(0, 3)] = 10.0;
    let grid = RefGrid::from_parts((4, 4, 4), (1.0, 1.0, 1.0), affine);
    let sl = vec![[12.0, 1.0, 1.0]];
    let map = density_map(&Bundle::new(vec![sl]), &grid).unwrap();
    assert_eq!(map[[2, 1, 1]], 1.0);
}

#[test]
fn empty_bundle_gives_zero_map() {
    let grid = unit_grid((3, 3, 3));
    let map = density_map(&Bundle::default(), &grid).unwrap();
    assert_eq!(map.sum(), 0.0);
}
