//! Ring buffers over anti-diagonals.
//!
//! Some helper arrays of the wavefront recurrences are only ever read a
//! few diagonals back. A `DiagonalRing<DEPTH>` keeps the last `DEPTH`
//! diagonals, one row of `n` values each, and maps diagonal `d` to row
//! `d % DEPTH`. Writing diagonal `d` therefore overwrites `d - DEPTH`.
//!

use ndarray::Array2;

use crate::free_energy::INF;

#[derive(Debug, Clone)]
pub struct DiagonalRing<const DEPTH: usize> {
    rows: Array2<f64>,
}

impl<const DEPTH: usize> DiagonalRing<DEPTH> {
    pub fn new(n: usize) -> Self {
        DiagonalRing {
            rows: Array2::from_elem((DEPTH, n), INF),
        }
    }

    /// How many diagonals are retained.
    pub const fn depth(&self) -> usize {
        DEPTH
    }

    #[inline]
    fn slot(d: usize) -> usize {
        d % DEPTH
    }

    /// Value at position `i` of diagonal `d`.
    #[inline]
    pub fn get(&self, d: usize, i: usize) -> f64 {
        self.rows[(Self::slot(d), i)]
    }

    /// Value at position `i` of diagonal `d - back`, as seen from diagonal `d`.
    #[inline]
    pub fn back(&self, d: usize, back: usize, i: usize) -> f64 {
        debug_assert!(back > 0 && back < DEPTH, "diagonal {d}-{back} is not retained");
        debug_assert!(back <= d, "diagonal {d}-{back} does not exist");
        self.get(d - back, i)
    }

    #[inline]
    pub fn set(&mut self, d: usize, i: usize, value: f64) {
        self.rows[(Self::slot(d), i)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ring_is_inf() {
        let ring: DiagonalRing<2> = DiagonalRing::new(4);
        assert_eq!(ring.depth(), 2);
        assert_eq!(ring.get(0, 3), INF);
    }

    #[test]
    fn test_retains_depth_minus_one_diagonals() {
        let mut ring: DiagonalRing<5> = DiagonalRing::new(3);
        for d in 0..12 {
            for i in 0..3 {
                ring.set(d, i, (10 * d + i) as f64);
            }
            for back in 1..5.min(d + 1) {
                assert_eq!(ring.back(d, back, 2), (10 * (d - back) + 2) as f64);
            }
        }
        // Diagonal 11 replaced diagonal 6.
        assert_eq!(ring.get(6, 0), 110.0);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_too_far_back() {
        let ring: DiagonalRing<2> = DiagonalRing::new(3);
        ring.back(5, 2, 0);
    }
}
