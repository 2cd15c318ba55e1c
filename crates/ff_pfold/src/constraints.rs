//! Which position pairs may form a base pair at all.
//!
//! The relation is symmetric, so only the upper triangle is stored, in a
//! `TriangularTable`. The default rule derived from the sequence allows a
//! canonical pair (i, j) if
//!  - it encloses at least `LOOP_MIN` unpaired bases,
//!  - both positions are pairable (uppercase in the input), and
//!  - it can be part of a helix: either the enclosing pair (i-1, j+1) or
//!    the enclosed pair (i+1, j-1) is canonical as well. The enclosed
//!    pair only counts if the loop is long enough to leave room for it.
//!

use ff_energy::{is_canonical_pair, NucleotideVec, LOOP_MIN};

/// Upper-triangle storage for values indexed by `(i, j)` with `i < j`.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularTable<T> {
    n: usize,
    data: Vec<T>,
}

impl<T: Clone> TriangularTable<T> {
    pub fn new(n: usize, fill: T) -> Self {
        TriangularTable {
            n,
            data: vec![fill; n * n.saturating_sub(1) / 2],
        }
    }

    /// Side length of the (conceptual) square table.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.n, "({i}, {j}) outside the upper triangle");
        j * (j - 1) / 2 + i
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let k = self.index(i, j);
        self.data[k] = value;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairingConstraints {
    table: TriangularTable<bool>,
}

impl PairingConstraints {
    /// The default pairing rule for a sequence.
    pub fn from_sequence(seq: &NucleotideVec) -> Self {
        let n = seq.len();
        Self::from_fn(n, |i, j| {
            if j - i < LOOP_MIN + 1 || !seq.is_pairable(i) || !seq.is_pairable(j) {
                return false;
            }
            let outer = i > 0 && j < n - 1 && is_canonical_pair(seq[i - 1], seq[j + 1]);
            let inner = j - i >= LOOP_MIN + 3 && is_canonical_pair(seq[i + 1], seq[j - 1]);
            is_canonical_pair(seq[i], seq[j]) && (outer || inner)
        })
    }

    /// Build from an arbitrary predicate, evaluated for every `i < j`.
    pub fn from_fn<F>(n: usize, allowed: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut table = TriangularTable::new(n, false);
        for j in 1..n {
            for i in 0..j {
                table.set(i, j, allowed(i, j));
            }
        }
        PairingConstraints { table }
    }

    /// Disallow a pair that the rule would otherwise permit.
    pub fn forbid(&mut self, i: usize, j: usize) {
        let (i, j) = (i.min(j), i.max(j));
        if i != j && j < self.len() {
            self.table.set(i, j, false);
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Symmetric; false for `i == j` and for positions outside the sequence.
    #[inline]
    pub fn can_pair(&self, i: usize, j: usize) -> bool {
        let n = self.len();
        if i == j || i >= n || j >= n {
            return false;
        }
        if i < j { *self.table.get(i, j) } else { *self.table.get(j, i) }
    }

    /// `can_pair` for positions that may have stepped past either end.
    #[inline]
    pub(crate) fn can_pair_at(&self, i: isize, j: isize) -> bool {
        i >= 0 && j >= 0 && self.can_pair(i as usize, j as usize)
    }

    /// All allowed pairs with `i < j`, ordered by `i`, then `j`.
    pub fn allowed_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| *self.table.get(i, j))
    }
}
