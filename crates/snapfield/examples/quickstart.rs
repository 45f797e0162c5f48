//! Write a two-file GIZMO snapshot, open it by prefix and query it.
//!
//! Demonstrates: write containers → open prefix → direct and derived
//! fields → custom derived field → refinement and set algebra.

use std::fs::File;

use smallvec::smallvec;
use snapfield::prelude::*;
use snapfield::store::ContainerWriter;
use snapfield::types::{HeaderFlags, RawHeader};
use tracing_subscriber::EnvFilter;

const GAS: ParticleType = ParticleType(0);
const STAR: ParticleType = ParticleType(4);

fn header(gas: u64, stars: u64) -> RawHeader {
    RawHeader {
        num_part_this_file: smallvec![gas, 0, 0, 0, stars, 0],
        num_part_total: smallvec![6, 0, 0, 0, 2, 0],
        mass_table: smallvec![0.0; 6],
        num_files: 2,
        time: 0.25,
        redshift: 3.0,
        box_size: 25_000.0,
        omega0: 0.3,
        omega_lambda: 0.7,
        hubble_param: 0.7,
        flags: HeaderFlags {
            cooling: true,
            stellar_age: true,
            metals: true,
            ..HeaderFlags::default()
        },
    }
}

fn write_file(
    path: &std::path::Path,
    gas: &[f64],
    star_sft: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let n = gas.len();
    let mut writer = ContainerWriter::new(File::create(path)?, &header(n as u64, star_sft.len() as u64))?;
    writer.write_dataset(GAS, "Masses", &RawArray::scalar(gas.to_vec()))?;
    writer.write_dataset(GAS, "ElectronAbundance", &RawArray::scalar(vec![1.1; n]))?;
    writer.write_dataset(
        GAS,
        "InternalEnergy",
        &RawArray::scalar(gas.iter().map(|m| 1e3 * m).collect()),
    )?;
    let metals: Vec<f64> = (0..n).flat_map(|_| [0.01, 0.26]).collect();
    writer.write_dataset(GAS, "Metallicity", &RawArray::new(metals, 2)?)?;
    let velocities: Vec<f64> = (0..3 * n).map(|i| (i % 7) as f64 * 10.0).collect();
    writer.write_dataset(GAS, "Velocities", &RawArray::new(velocities, 3)?)?;
    if !star_sft.is_empty() {
        writer.write_dataset(STAR, "Masses", &RawArray::scalar(vec![0.5; star_sft.len()]))?;
        writer.write_dataset(STAR, "StellarFormationTime", &RawArray::scalar(star_sft.to_vec()))?;
    }
    writer.finish()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    write_file(&dir.path().join("snap_042.0.snap"), &[1.0, 2.0, 3.0], &[0.1])?;
    write_file(&dir.path().join("snap_042.1.snap"), &[4.0, 5.0, 6.0], &[0.2])?;

    let snap = Snapshot::open(dir.path().join("snap_042"))?;
    let header = snap.header();
    println!(
        "opened {} files: z = {}, t = {:.3} Gyr",
        snap.paths().len(),
        header.redshift(),
        header.time().value()
    );
    for (name, selector) in snap.selectors() {
        println!("  {name}: {} particles, keys {:?}", selector.count(), selector.keys());
    }

    let mut gas = snap.selector("gas").unwrap().clone();
    println!("gas temperature: {:?}", gas.get("t")?.values());
    println!("stellar ages (Gyr): {:?}", snap.selector("star").unwrap().get("age")?.values());

    // Specific kinetic energy from the velocity rows.
    gas.register_field("ek", |s| {
        let v = s.get("v")?;
        let values = (0..v.rows())
            .filter_map(|i| v.row(i))
            .map(|r| 0.5 * r.iter().map(|x| x * x).sum::<f64>())
            .collect();
        let unit = s.context().units().parse("code_velocity**2")?;
        Ok(UnitArray::scalar(values, unit))
    });
    println!("kinetic energy: {:?}", gas.get("ek")?.values());

    let heavy = gas.filter("m", |row| row[0] >= 3.0)?;
    let first_half = gas.select(&[true, true, true, true, false, false])?;
    println!(
        "heavy: {}, first half: {}, overlap: {}, heavy outside first half: {}",
        heavy.count(),
        first_half.count(),
        heavy.intersection(&first_half)?.count(),
        heavy.difference(&first_half)?.count(),
    );
    println!("everything but heavy gas: {}", snap.complement(&heavy)?.count());
    Ok(())
}
