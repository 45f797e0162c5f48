//! A snapshot split over several container files on disk.

use std::fs::File;
use std::path::Path;

use smallvec::smallvec;
use snapfield_core::{HeaderFlags, ParticleType, RawArray, RawHeader, RawStore, StoreError};
use snapfield_store::{discover, CachedStore, ContainerWriter, FileStore};

fn header(this_file: [u64; 2]) -> RawHeader {
    RawHeader {
        num_part_this_file: smallvec![this_file[0], this_file[1]],
        num_part_total: smallvec![5, 1],
        mass_table: smallvec![0.0, 0.0],
        num_files: 2,
        time: 0.5,
        redshift: 1.0,
        box_size: 25_000.0,
        omega0: 0.3,
        omega_lambda: 0.7,
        hubble_param: 0.7,
        flags: HeaderFlags::default(),
    }
}

fn write_snapshot(dir: &Path) {
    let gas = ParticleType(0);
    let dm = ParticleType(1);

    let mut w =
        ContainerWriter::new(File::create(dir.join("snap_010.0.snap")).unwrap(), &header([3, 1]))
            .unwrap();
    w.write_dataset(gas, "Masses", &RawArray::scalar(vec![1.0, 2.0, 3.0]))
        .unwrap();
    w.write_dataset(dm, "Masses", &RawArray::scalar(vec![10.0]))
        .unwrap();
    w.finish().unwrap();

    // Second file holds no dark matter, so it stores no dm group at all.
    let mut w =
        ContainerWriter::new(File::create(dir.join("snap_010.1.snap")).unwrap(), &header([2, 0]))
            .unwrap();
    w.write_dataset(gas, "Masses", &RawArray::scalar(vec![4.0, 5.0]))
        .unwrap();
    w.finish().unwrap();
}

#[test]
fn discovered_files_concatenate_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());

    let paths = discover(dir.path().join("snap_010"), ".snap").unwrap();
    assert_eq!(paths.len(), 2);
    let store = FileStore::open(&paths).unwrap();
    assert_eq!(store.file_count(), 2);

    let parts: Vec<RawArray> = (0..store.file_count())
        .map(|f| store.read_field(f, ParticleType(0), "Masses").unwrap())
        .collect();
    let all = RawArray::concat(parts, 1).unwrap();
    assert_eq!(all.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);

    assert!(store.has_field(0, ParticleType(1), "Masses").unwrap());
    assert!(!store.has_field(1, ParticleType(1), "Masses").unwrap());
    assert!(matches!(
        store.read_field(1, ParticleType(1), "Masses"),
        Err(StoreError::MissingField { file: 1, .. })
    ));
}

#[test]
fn headers_differ_only_in_per_file_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());
    let store = FileStore::open(&discover(dir.path(), ".snap").unwrap()).unwrap();

    let headers = store.read_headers().unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].num_part_total, headers[1].num_part_total);
    let summed: u64 = headers.iter().map(|h| h.num_part_this_file[0]).sum();
    assert_eq!(summed, headers[0].num_part_total[0]);
}

#[test]
fn cache_sits_in_front_of_files() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());
    let store = CachedStore::new(FileStore::open(&discover(dir.path(), ".snap").unwrap()).unwrap());

    for _ in 0..3 {
        store.read_field(0, ParticleType(0), "Masses").unwrap();
    }
    assert_eq!(store.misses(), 1);
    assert_eq!(store.hits(), 2);

    // Deleting the files does not affect cached datasets.
    for p in store.inner().paths() {
        std::fs::remove_file(p).unwrap();
    }
    assert!(store.read_field(0, ParticleType(0), "Masses").is_ok());
    assert!(matches!(
        store.read_field(1, ParticleType(0), "Masses"),
        Err(StoreError::Io(_))
    ));
}
