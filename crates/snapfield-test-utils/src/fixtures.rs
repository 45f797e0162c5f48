//! Reusable derived-field fixtures.
//!
//! - [`counting_field`]: scales another key and counts its calls
//! - [`self_referential_field`]: asks for its own key
//! - [`chained_field`]: asks for another key, for building longer cycles
//! - [`wrong_length_field`]: returns one row too many

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use snapfield_snapshot::DerivedField;
use snapfield_units::{Unit, UnitArray};

/// Shared call counter.
#[derive(Clone, Debug, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// `factor * selector[source]`, bumping `counter` on every evaluation.
pub fn counting_field(counter: &CallCounter, source: &str, factor: f64) -> DerivedField {
    let counter = counter.clone();
    let source = source.to_string();
    DerivedField::new(move |sel| {
        counter.bump();
        Ok(sel.get(&source)?.scale(factor))
    })
}

/// A field registered under `key` that requests `key`.
pub fn self_referential_field(key: &str) -> DerivedField {
    chained_field(key)
}

/// A field that returns `selector[next]` unchanged.
pub fn chained_field(next: &str) -> DerivedField {
    let next = next.to_string();
    DerivedField::new(move |sel| sel.get(&next))
}

/// Zeros, one more row than the selector holds.
pub fn wrong_length_field() -> DerivedField {
    DerivedField::new(|sel| {
        Ok(UnitArray::scalar(
            vec![0.0; sel.count() + 1],
            Unit::dimensionless(),
        ))
    })
}
