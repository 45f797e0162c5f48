//! Refinement and set algebra on default selectors.

use snapfield_snapshot::{ParticleSelector, SelectError, Snapshot};
use snapfield_test_utils::{ten_and_five, DM, GAS};

fn open() -> Snapshot {
    ten_and_five().open().unwrap()
}

fn sel<'a>(snap: &'a Snapshot, name: &str) -> &'a ParticleSelector {
    snap.selector(name).unwrap()
}

#[test]
fn default_selectors_follow_slot_aliases() {
    let snap = open();
    let names: Vec<&str> = snap.selectors().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["gas", "dm", "all"]);
    assert_eq!(sel(&snap, "gas").count(), 10);
    assert_eq!(sel(&snap, "dm").count(), 5);
    assert_eq!(snap.all().count(), 15);
    assert_eq!(snap.pt("PartType1"), Some(DM));
    assert_eq!(snap.pt("gas"), Some(GAS));
}

#[test]
fn union_then_difference_recovers_gas() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let dm = sel(&snap, "dm");

    let both = gas.union(dm).unwrap();
    assert_eq!(both.count(), 15);
    assert_eq!(both.active_types(), vec![GAS, DM]);

    let back = both.difference(dm).unwrap();
    assert_eq!(back.count(), 10);
    assert_eq!(&back, gas);
    assert_eq!(back.mask(GAS), gas.mask(GAS));
    assert!(back.mask(DM).unwrap().none());
}

#[test]
fn refining_ten_with_three_trues() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let mut keep = vec![false; 10];
    keep[1] = true;
    keep[4] = true;
    keep[9] = true;

    let r = gas.select(&keep).unwrap();
    assert_eq!(r.count(), 3);
    assert_eq!(r.get("Masses").unwrap().values(), &[2.0, 5.0, 10.0]);

    // Refining again indexes the already-refined particles.
    let rr = r.select(&[false, true, false]).unwrap();
    assert_eq!(rr.get("m").unwrap().values(), &[5.0]);
}

#[test]
fn refinement_splits_segments_by_type() {
    let snap = open();
    let all = snap.all();
    let keep: Vec<bool> = (0..15).map(|i| i % 4 == 0).collect();
    let r = all.select(&keep).unwrap();
    assert_eq!(r.count_of(GAS), 3);
    assert_eq!(r.count_of(DM), 1);
    assert_eq!(r.get("m").unwrap().values(), &[1.0, 5.0, 9.0, 70.0]);
}

#[test]
fn refinement_length_must_match_count() {
    let snap = open();
    let err = snap.all().select(&[true; 10]).unwrap_err();
    assert_eq!(
        err,
        SelectError::ShapeMismatch {
            expected: 15,
            found: 10
        }
    );
}

#[test]
fn filter_refines_by_row_predicate() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let dense = gas.filter("rho", |row| row[0] >= 1.0).unwrap();
    assert_eq!(dense.count(), 6);
    assert_eq!(
        dense.get("m").unwrap().values(),
        &[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
    );

    // Vector rows see every component.
    let far = snap.all().filter("p", |row| row[0] >= 100.0).unwrap();
    assert_eq!(far, *sel(&snap, "dm"));
}

#[test]
fn idempotence_and_self_difference() {
    let snap = open();
    let all = snap.all();
    assert_eq!(all.union(all).unwrap(), *all);
    assert_eq!(all.intersection(all).unwrap(), *all);
    assert_eq!(all.difference(all).unwrap().count(), 0);
    assert_eq!(all.symmetric_difference(all).unwrap().count(), 0);
}

#[test]
fn intersection_and_xor_of_overlapping_selections() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let light = gas.filter("m", |r| r[0] <= 6.0).unwrap();
    let dense = gas.filter("rho", |r| r[0] >= 1.0).unwrap();

    let both = light.intersection(&dense).unwrap();
    assert_eq!(both.get("m").unwrap().values(), &[5.0, 6.0]);

    let either = light.symmetric_difference(&dense).unwrap();
    assert_eq!(either.count(), light.count() + dense.count() - 2 * both.count());
    assert_eq!(either.get("m").unwrap().values(), &[1.0, 2.0, 3.0, 4.0, 7.0, 8.0, 9.0, 10.0]);
}

#[test]
fn complement_is_all_minus_selection() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let rest = snap.complement(gas).unwrap();
    assert_eq!(rest, *sel(&snap, "dm"));
    assert_eq!(rest.union(gas).unwrap(), *snap.all());
}

#[test]
fn selectors_of_different_snapshots_do_not_mix() {
    let a = open();
    let b = open();
    assert_ne!(a.id(), b.id());
    let err = a.all().union(b.all()).unwrap_err();
    assert_eq!(
        err,
        SelectError::IncompatibleSelector {
            left: a.id(),
            right: b.id()
        }
    );
    // Same particles, different instances.
    assert_ne!(*a.all(), *b.all());
}

#[test]
fn union_keys_are_common_keys() {
    let snap = open();
    let gas = sel(&snap, "gas");
    let dm = sel(&snap, "dm");
    assert_eq!(gas.keys(), vec!["Masses", "m", "Coordinates", "p", "Density", "rho"]);

    let both = gas.union(dm).unwrap();
    let keys = both.keys();
    assert_eq!(keys, vec!["Masses", "m", "Coordinates", "p"]);
    let (gk, dk) = (gas.keys(), dm.keys());
    assert!(keys.iter().all(|k| gk.contains(k) && dk.contains(k)));
    for key in &keys {
        assert_eq!(both.get(key).unwrap().rows(), 15, "{key}");
    }
}

#[test]
fn selector_for_builds_fresh_selection() {
    let snap = open();
    let dm = snap.selector_for(&[DM]);
    assert_eq!(dm, *sel(&snap, "dm"));
    assert_eq!(dm.derived_keys().count(), 0);
}
