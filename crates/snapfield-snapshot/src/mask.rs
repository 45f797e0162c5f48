//! Fixed-length particle bitset.

use std::fmt;

/// A boolean mask over one particle type's global index space.
///
/// The length is fixed at construction. Bits past `len` in the last word
/// are always zero, so word-wise counting and equality need no masking.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ParticleMask {
    len: usize,
    words: Vec<u64>,
}

impl ParticleMask {
    const BITS_PER_WORD: usize = 64;

    fn word_count(len: usize) -> usize {
        len.div_ceil(Self::BITS_PER_WORD)
    }

    /// All-false mask of length `len`.
    pub fn empty(len: usize) -> Self {
        Self {
            len,
            words: vec![0; Self::word_count(len)],
        }
    }

    /// All-true mask of length `len`.
    pub fn full(len: usize) -> Self {
        let mut mask = Self {
            len,
            words: vec![u64::MAX; Self::word_count(len)],
        };
        mask.clear_tail();
        mask
    }

    /// Mask from a boolean slice.
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut mask = Self::empty(bits.len());
        for (i, &b) in bits.iter().enumerate() {
            if b {
                mask.words[i / Self::BITS_PER_WORD] |= 1u64 << (i % Self::BITS_PER_WORD);
            }
        }
        mask
    }

    fn clear_tail(&mut self) {
        let rem = self.len % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Mask length (the type's global particle count).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mask has length zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Whether every bit is set.
    pub fn is_full(&self) -> bool {
        self.count() == self.len
    }

    /// Bit at `index` (false when out of range).
    pub fn get(&self, index: usize) -> bool {
        index < self.len
            && self.words[index / Self::BITS_PER_WORD] & (1u64 << (index % Self::BITS_PER_WORD))
                != 0
    }

    /// Set or clear the bit at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.len {
            return;
        }
        let bit = 1u64 << (index % Self::BITS_PER_WORD);
        let word = &mut self.words[index / Self::BITS_PER_WORD];
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(w * Self::BITS_PER_WORD + bit)
            })
        })
    }

    /// Expand to one boolean per index.
    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.len).map(|i| self.get(i)).collect()
    }

    fn combine(&self, other: &Self, f: impl Fn(u64, u64) -> u64) -> Self {
        let len = self.len.max(other.len);
        let words = (0..Self::word_count(len))
            .map(|i| {
                let a = self.words.get(i).copied().unwrap_or(0);
                let b = other.words.get(i).copied().unwrap_or(0);
                f(a, b)
            })
            .collect();
        let mut mask = Self { len, words };
        mask.clear_tail();
        mask
    }

    /// `self | other`.
    pub fn union(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a | b)
    }

    /// `self & other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & b)
    }

    /// `self & !other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & !b)
    }

    /// `self ^ other`.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a ^ b)
    }

    /// Clear the k-th set bit wherever `keep[k]` is false.
    ///
    /// `keep` is indexed over the set bits only, so its length should be
    /// [`count`](Self::count). Set bits past the end of `keep` are kept.
    pub fn refine(&self, keep: &[bool]) -> Self {
        let mut out = self.clone();
        for (k, index) in self.iter_ones().enumerate() {
            if !keep.get(k).copied().unwrap_or(true) {
                out.set(index, false);
            }
        }
        out
    }
}

impl fmt::Debug for ParticleMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleMask({}/{})", self.count(), self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_keeps_tail_clear() {
        let m = ParticleMask::full(70);
        assert_eq!(m.count(), 70);
        assert!(m.is_full());
        assert!(!m.get(70));
        assert_eq!(m, ParticleMask::from_bools(&[true; 70]));
    }

    #[test]
    fn empty_length_zero() {
        let m = ParticleMask::full(0);
        assert!(m.is_empty());
        assert!(m.is_full());
        assert!(m.none());
        assert_eq!(m.iter_ones().count(), 0);
    }

    #[test]
    fn refine_indexes_set_bits() {
        let m = ParticleMask::from_bools(&[true, false, true, true, false]);
        let r = m.refine(&[false, true, false]);
        assert_eq!(r.to_bools(), vec![false, false, true, false, false]);
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn iter_ones_crosses_words() {
        let mut m = ParticleMask::empty(200);
        for i in [0, 63, 64, 130, 199] {
            m.set(i, true);
        }
        assert_eq!(m.iter_ones().collect::<Vec<_>>(), vec![0, 63, 64, 130, 199]);
        m.set(500, true);
        assert_eq!(m.count(), 5);
    }

    #[test]
    fn debug_is_compact() {
        let m = ParticleMask::from_bools(&[true, false, true]);
        assert_eq!(format!("{m:?}"), "ParticleMask(2/3)");
    }

    fn arb_pair() -> impl Strategy<Value = (ParticleMask, ParticleMask)> {
        (0usize..300).prop_flat_map(|len| {
            (
                prop::collection::vec(any::<bool>(), len),
                prop::collection::vec(any::<bool>(), len),
            )
                .prop_map(|(a, b)| (ParticleMask::from_bools(&a), ParticleMask::from_bools(&b)))
        })
    }

    proptest! {
        #[test]
        fn inclusion_exclusion((a, b) in arb_pair()) {
            prop_assert_eq!(
                a.union(&b).count() + a.intersection(&b).count(),
                a.count() + b.count()
            );
        }

        #[test]
        fn difference_removes_overlap((a, b) in arb_pair()) {
            prop_assert_eq!(a.difference(&b).count(), a.count() - a.intersection(&b).count());
        }

        #[test]
        fn xor_is_union_minus_intersection((a, b) in arb_pair()) {
            let lhs = a.symmetric_difference(&b);
            let rhs = a.union(&b).difference(&a.intersection(&b));
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn union_idempotent((a, _b) in arb_pair()) {
            prop_assert_eq!(a.union(&a), a.clone());
            prop_assert!(a.difference(&a).none());
        }

        #[test]
        fn refine_count_matches_trues(
            bits in prop::collection::vec(any::<bool>(), 0..200),
            seed in any::<u64>(),
        ) {
            let m = ParticleMask::from_bools(&bits);
            let keep: Vec<bool> = (0..m.count()).map(|k| (seed >> (k % 64)) & 1 == 1).collect();
            let r = m.refine(&keep);
            prop_assert_eq!(r.count(), keep.iter().filter(|b| **b).count());
            prop_assert_eq!(r.difference(&m).count(), 0);
        }
    }
}
