//! Survey the gas and stars of the reference profile.
//!
//! Demonstrates: open → derived fields → filter → set algebra → reduce.
//! Run with `RUST_LOG=snapfield_snapshot=debug` to see resolution logs.

use snapfield_bench::BenchProfile;
use tracing_subscriber::EnvFilter;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let snap = BenchProfile::reference().open().unwrap();
    let header = snap.header();
    println!("=== snapfield survey ===\n");
    println!(
        "z = {:.3}, a = {:.3}, t = {:.3} Gyr, {} files",
        header.redshift(),
        header.scale_factor(),
        header.time().value(),
        header.file_count(),
    );
    for (name, selector) in snap.selectors() {
        println!("  {name:>4}: {:>7} particles", selector.count());
    }

    let gas = snap.selector("gas").unwrap();
    let t = gas.get("t").unwrap();
    println!("\nmean gas temperature: {:.3e} {}", mean(t.values()), t.unit().label());

    let hot = gas.filter("t", |row| row[0] > 1e6).unwrap();
    let dense = gas.filter("rho", |row| row[0] > 0.5).unwrap();
    let hot_and_dense = hot.intersection(&dense).unwrap();
    println!(
        "hot: {}, dense: {}, both: {}, either: {}",
        hot.count(),
        dense.count(),
        hot_and_dense.count(),
        hot.union(&dense).unwrap().count(),
    );

    let star = snap.selector("star").unwrap();
    let age = star.get("age").unwrap();
    let oldest = age.values().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!("mean stellar age: {:.3} Gyr, oldest: {:.3} Gyr", mean(age.values()), oldest);

    let rest = snap.complement(&hot).unwrap();
    let m = rest.get("m").unwrap();
    println!(
        "mass outside hot gas: {:.4e} {}",
        m.values().iter().sum::<f64>(),
        m.unit().label()
    );
}
