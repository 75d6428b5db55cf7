use nalgebra::Matrix4;
use tempfile::TempDir;

use tractprof::geom::Bundle;
use tractprof::io::trk::{read_streamline_count, read_trk, write_trk};
use tractprof::io::volume::RefGrid;

fn grid() -> RefGrid {
    let mut affine = Matrix4::identity();
    affine[(0, 0)] = 2.0;
    affine[(1, 1)] = 2.0;
    affine[(2, 2)] = 2.0;
    affine[(0, 3)] = -20.0;
    affine[(1, 3)] = -24.0;
    affine[(2, 3)] = -16.0;
    RefGrid::from_parts((32, 32, 32), (2.0, 2.0, 2.0), affine)
}

fn bundle() -> Bundle {
    Bundle::new(vec![
        vec![[-10.0, -8.0, -4.0], [-8.0, -6.0, -2.0], [-6.0, -4.0, 0.0]],
        vec![[0.0, 0.0, 0.0], [2.0, 4.0, 6.0]],
    ])
}

#[test]
fn world_coordinates_survive_a_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.trk");
    let original = bundle();

    write_trk(&path, &original, &grid()).unwrap();
    let (loaded, header) = read_trk(&path).unwrap();

    assert_eq!(loaded.len(), original.len());
    assert_eq!(header.n_count, 2);
    assert_eq!(header.voxel_size, [2.0, 2.0, 2.0]);
    for (a, b) in loaded.streamlines.iter().zip(original.streamlines.iter()) {
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            for c in 0..3 {
                assert!(
                    (pa[c] - pb[c]).abs() < 1e-3,
                    "coordinate drift {} vs {}",
                    pa[c],
                    pb[c]
                );
            }
        }
    }
}

#[test]
fn empty_bundle_roundtrips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.trk");
    write_trk(&path, &Bundle::default(), &grid()).unwrap();
    let (loaded, header) = read_trk(&path).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(header.n_count, 0);
}

#[test]
fn streamline_count_reads_header_only() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.trk");
    write_trk(&path, &bundle(), &grid()).unwrap();
    assert_eq!(read_streamline_count(&path).unwrap(), 2);

    // A mangled body does not matter: the count comes out of the first
    // 1000 bytes even when full decoding would fail.
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..1002]).unwrap();
    assert!(read_trk(&path).is_err());
    assert_eq!(read_streamline_count(&path).unwrap(), 2);
}

#[test]
fn streamline_count_rejects_short_files() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("short.trk");
    std::fs::write(&path, vec![0u8; 500]).unwrap();
    assert!(read_streamline_count(&path).is_err());
}

#[test]
fn truncated_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("short.trk");
    std::fs::write(&path, b"TRACK").unwrap();
    assert!(read_trk(&path).is_err());
}

#[test]
fn wrong_magic_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.trk");
    std::fs::write(&path, vec![0u8; 1200]).unwrap();
    assert!(read_trk(&path).is_err());
}
