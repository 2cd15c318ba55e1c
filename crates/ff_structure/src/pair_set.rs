//! Pair and PairSet definitions.
//!
//! A `Pair` is defined by two 16-bit indices (`NAIDX`) packed into a
//! 32-bit integer key (`P1KEY`) for efficient set and map storage.
//! A `PairSet` makes no nesting assumptions, so it is the natural
//! container for structures that may contain pseudoknots.
//!

use std::fmt;
use nohash_hasher::IntSet;

use crate::PairTable;
use crate::NAIDX;
use crate::P1KEY;


/// A base pair (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    /// Create a new pair (i, j). Panics in debug if i >= j.
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(i < j);
        debug_assert!(j < NAIDX::MAX);
        Pair { i, j }
    }

    pub fn i(&self) -> NAIDX {
        self.i
    }

    pub fn j(&self) -> NAIDX {
        self.j
    }

    /// True if exactly one of `other`'s bases lies inside this pair.
    pub fn crosses(&self, other: &Pair) -> bool {
        (self.i < other.i && other.i < self.j && self.j < other.j)
            || (other.i < self.i && self.i < other.j && other.j < self.j)
    }

    pub fn key(&self) -> P1KEY {
        ((self.i as P1KEY) << 16) | (self.j as P1KEY)
    }

    pub fn from_key(key: P1KEY) -> Self {
        let i = (key >> 16) as NAIDX;
        let j = (key & 0xFFFF) as NAIDX;
        debug_assert!(i < j);
        Pair { i, j }
    }
}

/// A collection of base pairs represented as compact integer keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    length: usize,
    pairs: IntSet<P1KEY>,
}

impl PairSet {
    /// Create an empty pair set for a given sequence length.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            pairs: IntSet::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Insert a new pair; returns true if it was newly inserted.
    pub fn insert(&mut self, pair: Pair) -> bool {
        debug_assert!((pair.j() as usize) < self.length);
        self.pairs.insert(pair.key())
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.contains(&pair.key())
    }

    /// Iterator over all pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.pairs.iter().map(|&k| Pair::from_key(k))
    }

    /// All pairs sorted by (i, j).
    pub fn to_vec(&self) -> Vec<Pair> {
        let mut v: Vec<_> = self.iter().collect();
        v.sort_unstable_by_key(|p| (p.i(), p.j()));
        v
    }

    /// Underlying sequence length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// All unordered combinations of crossing pairs.
    pub fn crossings(&self) -> Vec<(Pair, Pair)> {
        let pairs = self.to_vec();
        let mut result = Vec::new();
        for (a, p) in pairs.iter().enumerate() {
            for q in &pairs[a + 1..] {
                if p.crosses(q) {
                    result.push((*p, *q));
                }
            }
        }
        result
    }
}

impl From<&PairTable> for PairSet {
    fn from(pt: &PairTable) -> Self {
        let mut set = PairSet::new(pt.len());
        for (i, &j_opt) in pt.iter().enumerate() {
            let i = i as NAIDX;
            if let Some(j) = j_opt.filter(|&j| i < j) {
                set.insert(Pair::new(i, j));
            }
        }
        set
    }
}


impl fmt::Display for PairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.to_vec()
            .iter()
            .map(|p| format!("({},{})", p.i(), p.j()))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_roundtrip() {
        let p = Pair::new(1, 42);
        assert_eq!(Pair::from_key(p.key()), p);
    }

    #[test]
    fn test_crossing() {
        let a = Pair::new(0, 9);
        let b = Pair::new(4, 13);
        let c = Pair::new(2, 7);
        assert!(a.crosses(&b));
        assert!(b.crosses(&a));
        assert!(!a.crosses(&c));
        assert!(!c.crosses(&a));
    }

    #[test]
    fn test_pair_set_from_pair_table() {
        let pt = PairTable::try_from("((..[[..))..]]").unwrap();
        let ps = PairSet::from(&pt);

        assert_eq!(ps.length(), 14);
        assert_eq!(ps.len(), 4);
        assert!(ps.contains(&Pair::new(0, 9)));
        assert!(ps.contains(&Pair::new(5, 12)));
        assert!(!ps.contains(&Pair::new(0, 8)));
        assert_eq!(ps.crossings().len(), 4);
        assert_eq!(ps.crossings()[0], (Pair::new(0, 9), Pair::new(4, 13)));
    }

    #[test]
    fn test_display() {
        let pt = PairTable::try_from("((..))").unwrap();
        let ps = PairSet::from(&pt);
        assert_eq!(format!("{}", ps), "(0,5),(1,4)");
    }
}
