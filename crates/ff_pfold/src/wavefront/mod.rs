//! The wavefront fill of the partition function tables.
//!
//! Positions are treated as lying on a circle. The cell `(i, d)` refers to
//! the pair `(i, j)` with `j = (i + d + 1) mod n`: for `j > i` that is the
//! usual interior subsequence `[i, j]`, for `j < i` it is the exterior
//! fragment `[i, n) ∪ [0, j]`. Filling anti-diagonal `d` for all `i`
//! therefore yields both the inside and the outside quantities of a pair
//! in one sweep, and `V(i, j) + V(j, i) - W3(0)` is the free energy of all
//! structures containing that pair.
//!
//! Every diagonal is processed as seven consecutive sub-passes followed by
//! the update of the two boundary vectors W5 and W3. Within a sub-pass all
//! cells of the diagonal are independent: they only read earlier diagonals
//! or the current diagonal as left by an earlier sub-pass. Each sub-pass
//! is thus computed as a pure function of `&self` (optionally in parallel)
//! and the results are written back afterwards.
//!

mod closure;
mod coaxial;
mod multiloop;

use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;

use ff_energy::{Base, EnergyModel, LOOP_MIN};

use crate::config::Schedule;
use crate::constraints::{PairingConstraints, TriangularTable};
use crate::free_energy::{accumulate, INF};
use crate::rolling::DiagonalRing;

const LMIN: isize = LOOP_MIN as isize;

/// `k mod n` for `k < 2n`.
#[inline]
fn wrap(k: isize, n: isize) -> isize {
    if k >= n { k - n } else { k }
}

#[inline]
fn is_exterior(i: isize, j: isize) -> bool {
    j < i
}

#[inline]
fn is_interior(i: isize, j: isize) -> bool {
    i < j
}

#[inline]
fn at(i: isize) -> usize {
    debug_assert!(i >= 0, "negative position {i}");
    i as usize
}

/// What the fill hands over: `V` plus the boundary vectors.
///
/// `w5[k + 1]` holds W5(k) for `k` in `-1..n`, `w3[k]` holds W3(k) for
/// `k` in `0..=n`.
pub(crate) struct Tables {
    pub v: Array2<f64>,
    pub w5: Vec<f64>,
    pub w3: Vec<f64>,
}

pub(crate) struct Wavefront<'a> {
    n: usize,
    s: &'a [Base],
    bcp: &'a PairingConstraints,
    m: &'a EnergyModel,
    schedule: Schedule,
    v: Array2<f64>,
    z: Array2<f64>,
    y: Array2<f64>,
    yl: Array2<f64>,
    wq: TriangularTable<f64>,
    w: DiagonalRing<2>,
    wl: DiagonalRing<2>,
    xl: DiagonalRing<2>,
    x: DiagonalRing<5>,
    w5: Vec<f64>,
    w3: Vec<f64>,
}

impl<'a> Wavefront<'a> {
    pub fn new(
        s: &'a [Base],
        bcp: &'a PairingConstraints,
        m: &'a EnergyModel,
        schedule: Schedule,
    ) -> Self {
        let n = s.len();
        debug_assert_eq!(n, bcp.len());
        let mut w5 = vec![INF; n + 1];
        let mut w3 = vec![INF; n + 1];
        w5[0] = 0.0;
        w5[1] = 0.0;
        w3[n - 1] = 0.0;
        w3[n] = 0.0;
        Wavefront {
            n,
            s,
            bcp,
            m,
            schedule,
            v: Array2::from_elem((n, n), INF),
            z: Array2::from_elem((n, n), INF),
            y: Array2::from_elem((n, n), INF),
            yl: Array2::from_elem((n, n), INF),
            wq: TriangularTable::new(n, INF),
            w: DiagonalRing::new(n),
            wl: DiagonalRing::new(n),
            xl: DiagonalRing::new(n),
            x: DiagonalRing::new(n),
            w5,
            w3,
        }
    }

    /// Fill all diagonals and keep only what the queries need.
    pub fn fill(mut self) -> Tables {
        let n = self.n;
        info!("Filling {} diagonals for a sequence of length {n} ({:?}).", n - 1, self.schedule);
        let step = (n / 10).max(1);
        for d in 0..n - 1 {
            self.diagonal(d);
            if d % step == 0 {
                debug!("Diagonal {d}/{}: W5({d}) = {:.4}", n - 2, self.w5(d as isize));
            }
        }
        Tables { v: self.v, w5: self.w5, w3: self.w3 }
    }

    fn diagonal(&mut self, d: usize) {
        for (i, e) in self.sweep(|wf, i| wf.hairpin_stack_exterior_multibranch(d, i)) {
            let j = self.partner(d, i);
            self.v[(i, j)] = e;
        }
        for (i, e) in self.sweep(|wf, i| wf.internal_loops(d, i)) {
            let j = self.partner(d, i);
            accumulate(&mut self.v[(i, j)], e);
        }
        for (i, e) in self.sweep(|wf, i| wf.coaxial_pairs(d, i)) {
            let j = self.partner(d, i);
            accumulate(&mut self.v[(i, j)], e);
        }
        for (i, cell) in self.sweep(|wf, i| wf.single_branch(d, i)) {
            let j = self.partner(d, i);
            if let Some(wq) = cell.wq {
                self.wq.set(i, j, wq);
            }
            self.z[(i, j)] = cell.z;
            self.wl.set(d, i, cell.wl);
            self.w.set(d, i, cell.w);
        }
        for (i, e) in self.sweep(|wf, i| wf.branch_sequence(d, i)) {
            self.xl.set(d, i, e);
        }
        for (i, cell) in self.sweep(|wf, i| wf.coaxial_branches(d, i)) {
            let j = self.partner(d, i);
            if let Some(e) = cell.wq {
                let mut wq = *self.wq.get(i, j);
                accumulate(&mut wq, e);
                self.wq.set(i, j, wq);
            }
            accumulate(&mut self.z[(i, j)], cell.wcoax);
            let mut xl = self.xl.get(d, i);
            accumulate(&mut xl, cell.wcoax);
            self.xl.set(d, i, xl);
        }
        for (i, cell) in self.sweep(|wf, i| wf.multibranch_prefix(d, i)) {
            let j = self.partner(d, i);
            self.xl.set(d, i, cell.xl);
            self.x.set(d, i, cell.x);
            self.yl[(i, j)] = cell.yl;
            self.y[(i, j)] = cell.y;
        }
        self.update_boundaries(d);
    }

    /// Evaluate `kernel` for every position of the current diagonal.
    fn sweep<T, F>(&self, kernel: F) -> Vec<(usize, T)>
    where
        T: Send,
        F: Fn(&Self, usize) -> Option<T> + Sync,
    {
        match self.schedule {
            Schedule::Parallel => (0..self.n)
                .into_par_iter()
                .filter_map(|i| kernel(self, i).map(|t| (i, t)))
                .collect(),
            Schedule::Sequential => (0..self.n)
                .filter_map(|i| kernel(self, i).map(|t| (i, t)))
                .collect(),
        }
    }

    /// Extend W5 and W3 by one position each.
    fn update_boundaries(&mut self, d: usize) {
        let n = self.n;
        let mut w5 = INF;
        let mut w3 = INF;
        if d >= LOOP_MIN {
            for i in 0..=d - LOOP_MIN {
                accumulate(&mut w5, self.w5(i as isize - 1) + self.wq.get(i, d + 1));
                accumulate(&mut w3, self.w3((n - i) as isize) + self.wq.get(n - d - 2, n - i - 1));
            }
        }
        self.w5[d + 2] = self.w5[d + 1];
        accumulate(&mut self.w5[d + 2], w5);
        self.w3[n - d - 2] = self.w3[n - d - 1];
        accumulate(&mut self.w3[n - d - 2], w3);
    }

    /// The partner of `i` on diagonal `d`.
    #[inline]
    fn partner(&self, d: usize, i: usize) -> usize {
        let j = i + d + 1;
        if j >= self.n { j - self.n } else { j }
    }

    #[inline]
    fn w5(&self, k: isize) -> f64 {
        self.w5[at(k + 1)]
    }

    #[inline]
    fn w3(&self, k: isize) -> f64 {
        self.w3[at(k)]
    }

    /// `V(i, j)` if the pair is allowed.
    #[inline]
    fn pair(&self, i: isize, j: isize) -> Option<f64> {
        self.bcp.can_pair_at(i, j).then(|| self.v[(at(i), at(j))])
    }

    /// `V(i, j)` for a pair the caller has already checked.
    #[inline]
    fn v(&self, i: isize, j: isize) -> f64 {
        debug_assert!(self.bcp.can_pair_at(i, j), "V({i}, {j}) read for a forbidden pair");
        self.v[(at(i), at(j))]
    }

    #[inline]
    fn y(&self, i: isize, j: isize) -> f64 {
        self.y[(at(i), at(j))]
    }

    #[inline]
    fn yl(&self, i: isize, j: isize) -> f64 {
        self.yl[(at(i), at(j))]
    }

    #[inline]
    fn z(&self, i: isize, j: isize) -> f64 {
        self.z[(at(i), at(j))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_energy::{NucleotideVec, ParamSet};

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(3, 10), 3);
        assert_eq!(wrap(10, 10), 0);
        assert_eq!(wrap(14, 10), 4);
    }

    #[test]
    fn test_partner() {
        let seq = NucleotideVec::try_from("GGGAAACCC").unwrap();
        let bcp = PairingConstraints::from_sequence(&seq);
        let m = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();
        let wf = Wavefront::new(&seq, &bcp, &m, Schedule::Sequential);
        assert_eq!(wf.partner(0, 0), 1);
        assert_eq!(wf.partner(7, 0), 8);
        assert_eq!(wf.partner(0, 8), 0);
        assert_eq!(wf.partner(3, 6), 1);
    }

    #[test]
    fn test_boundaries_without_pairs() {
        // Nothing can pair: every W5 and W3 entry is the empty structure.
        let seq = NucleotideVec::try_from("ACGUACGA").unwrap();
        let bcp = PairingConstraints::from_sequence(&seq);
        assert_eq!(bcp.allowed_pairs().count(), 0);
        let m = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();
        let tables = Wavefront::new(&seq, &bcp, &m, Schedule::Sequential).fill();
        assert!(tables.w5.iter().all(|&e| e == 0.0));
        assert!(tables.w3.iter().all(|&e| e == 0.0));
        assert!(tables.v.iter().all(|&e| e == INF));
    }
}
