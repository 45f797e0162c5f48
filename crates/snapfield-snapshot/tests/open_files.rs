//! Opening snapshots from container files on disk.

use snapfield_snapshot::{ConfigError, OpenError, OpenOptions, Snapshot};
use snapfield_test_utils::{ten_and_five, DM, GAS};

#[test]
fn prefix_expands_to_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let fx = ten_and_five();
    let written = fx.write_files(dir.path(), "snap_010").unwrap();

    let snap = Snapshot::open_with(dir.path().join("snap_010"), &fx.options()).unwrap();
    assert_eq!(snap.paths(), written.as_slice());
    assert_eq!(snap.header().file_count(), 2);
    assert_eq!(snap.header().count(GAS), 10);
    assert_eq!(snap.header().count(DM), 5);

    let mem = fx.open().unwrap();
    for key in ["m", "p", "Masses"] {
        assert_eq!(
            snap.all().get(key).unwrap().values(),
            mem.all().get(key).unwrap().values(),
            "{key}"
        );
    }
    assert_eq!(
        snap.selector("gas").unwrap().get("rho").unwrap(),
        mem.selector("gas").unwrap().get("rho").unwrap()
    );
}

#[test]
fn directory_prefix_selects_all_snap_files() {
    let dir = tempfile::tempdir().unwrap();
    let fx = ten_and_five();
    fx.write_files(dir.path(), "out").unwrap();
    std::fs::write(dir.path().join("README.txt"), b"notes").unwrap();

    let snap = Snapshot::open_with(dir.path(), &fx.options()).unwrap();
    assert_eq!(snap.paths().len(), 2);
    assert_eq!(snap.all().count(), 15);
}

#[test]
fn cached_store_returns_the_same_values() {
    let dir = tempfile::tempdir().unwrap();
    let fx = ten_and_five();
    fx.write_files(dir.path(), "snap").unwrap();

    let plain = Snapshot::open_with(dir.path().join("snap"), &fx.options()).unwrap();
    let cached = Snapshot::open_with(dir.path().join("snap"), &fx.options().cache(true)).unwrap();
    let all = cached.all();
    let first = all.get("m").unwrap();
    let again = all.get("m").unwrap();
    assert_eq!(first, again);
    assert_eq!(first.values(), plain.all().get("m").unwrap().values());
}

#[test]
fn custom_suffix_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let fx = ten_and_five();
    fx.write_files(dir.path(), "snap").unwrap();

    let err = Snapshot::open_with(dir.path().join("snap"), &fx.options().suffix(".hdf5"))
        .unwrap_err();
    assert!(matches!(err, OpenError::NoFiles { ref suffix, .. } if suffix == ".hdf5"));
    assert!(Snapshot::open_with(dir.path().join("snap"), &fx.options().suffix("snap")).is_ok());
}

#[test]
fn missing_prefix_has_no_files() {
    let dir = tempfile::tempdir().unwrap();
    match Snapshot::open(dir.path().join("nothing_here")) {
        Err(OpenError::NoFiles { prefix, suffix }) => {
            assert_eq!(prefix, dir.path().join("nothing_here"));
            assert_eq!(suffix, ".snap");
        }
        other => panic!("expected NoFiles, got {other:?}"),
    }
}

#[test]
fn suffix_with_separator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let options = OpenOptions::new().suffix("x/.snap");
    assert!(matches!(
        Snapshot::open_with(dir.path(), &options),
        Err(OpenError::Config(ConfigError::InvalidSuffix { .. }))
    ));
}

#[test]
fn garbage_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.snap"), b"definitely not a container").unwrap();
    assert!(matches!(
        Snapshot::open(dir.path().join("bad")),
        Err(OpenError::Store(_))
    ));
}
