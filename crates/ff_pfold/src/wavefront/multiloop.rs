//! Helper arrays for multibranch segments.
//!
//! On the cell `(i, j)`:
//!  - `WQ` covers exactly one branch spanning `[i, j]` with any dangles,
//!    without multiloop penalties (interior cells only; feeds W5/W3),
//!  - `Z` is one branch starting at `i` and ending at `j`,
//!  - `WL` is one branch starting at `i` with unpaired bases after it,
//!  - `W` is one branch with unpaired bases on either side,
//!  - `XL` and `X` are the same for two or more branches,
//!  - `YL` and `Y` are one or more branches.
//!

use super::{at, is_exterior, is_interior, wrap, Wavefront, LMIN};
use crate::free_energy::{accumulate, combine, INF};

pub(super) struct SingleBranch {
    pub wq: Option<f64>,
    pub z: f64,
    pub wl: f64,
    pub w: f64,
}

pub(super) struct MultiBranch {
    pub xl: f64,
    pub x: f64,
    pub yl: f64,
    pub y: f64,
}

impl Wavefront<'_> {
    pub(super) fn single_branch(&self, d: usize, i: usize) -> Option<SingleBranch> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let j = wrap(i + dd + 1, n);
        if is_exterior(i, j) && i - j <= LMIN {
            return None;
        }
        let (s, m) = (self.s, self.m);
        let (iu, ju) = (at(i), at(j));
        let (b, c) = (m.multi_b(), m.multi_c());

        let mut wq = INF;
        let mut wl = INF;
        if let Some(v) = self.pair(i, j) {
            let e = v + m.terminal_penalty(s, iu, ju);
            accumulate(&mut wq, e);
            accumulate(&mut wl, e + c);
        }
        if i != n - 1 {
            if let Some(v) = self.pair(i + 1, j) {
                let e = v + m.dangle_5p(s, ju, iu + 1, iu);
                accumulate(&mut wq, e);
                accumulate(&mut wl, e + b + c);
            }
        }
        if j != 0 {
            if let Some(v) = self.pair(i, j - 1) {
                let e = v + m.dangle_3p(s, ju - 1, iu, ju);
                accumulate(&mut wq, e);
                accumulate(&mut wl, e + b + c);
            }
        }
        if i != n - 1 && j != 0 {
            if let Some(v) = self.pair(i + 1, j - 1) {
                let e = v + m.terminal_stack_multibranch(s, ju - 1, iu + 1, ju, iu);
                accumulate(&mut wq, e);
                accumulate(&mut wl, e + 2.0 * b + c);
            }
        }

        let z = wl;
        if i != n - 1 && d > 0 {
            accumulate(&mut wl, self.wl.back(d, 1, iu + 1) + b);
        }
        let mut w = wl;
        if j != 0 && d > 0 {
            accumulate(&mut w, self.w.back(d, 1, iu) + b);
        }
        Some(SingleBranch { wq: is_interior(i, j).then_some(wq), z, wl, w })
    }

    /// Two or more branches: a first branch `Z(i, k)` followed by at
    /// least one more in `YL(k+1, j)`.
    pub(super) fn branch_sequence(&self, d: usize, i: usize) -> Option<f64> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let jtmp = i + dd + 1;
        let j = wrap(jtmp, n);
        if is_exterior(i, j) && i - j <= LMIN {
            return None;
        }
        if is_interior(i, j) && dd <= 2 * LMIN + 1 {
            return Some(INF);
        }
        let mut xl = INF;
        for ktmp in i + 1..jtmp - 1 {
            if ktmp != n - 1 {
                let k = wrap(ktmp, n);
                accumulate(&mut xl, self.z(i, k) + self.yl(k + 1, j));
            }
        }
        Some(xl)
    }

    /// Extends `XL` and `X` by unpaired bases and forms `YL` and `Y`.
    pub(super) fn multibranch_prefix(&self, d: usize, i: usize) -> Option<MultiBranch> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let j = wrap(i + dd + 1, n);
        if is_exterior(i, j) && i - j <= LMIN {
            return None;
        }
        let iu = at(i);
        let b = self.m.multi_b();

        let mut xl = self.xl.get(d, iu);
        let mut x = INF;
        if dd > 2 * LMIN + 1 || is_exterior(i, j) {
            if i != n - 1 {
                accumulate(&mut xl, self.xl.back(d, 1, iu + 1) + b);
            }
            x = xl;
            if j != 0 {
                accumulate(&mut x, self.x.back(d, 1, iu) + b);
            }
        }
        Some(MultiBranch {
            xl,
            x,
            yl: combine(self.wl.get(d, iu), xl),
            y: combine(self.w.get(d, iu), x),
        })
    }
}
