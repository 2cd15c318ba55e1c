//! Coaxial stacking of a closing pair with an adjacent helix, and of two
//! adjacent helices inside a multibranch segment.

use super::{at, is_exterior, is_interior, wrap, Wavefront, LMIN};
use crate::free_energy::{accumulate, combine, INF};

/// Contribution of two stacked branches spanning `(i, j)`.
pub(super) struct CoaxialBranches {
    /// Added to `WQ(i, j)` for interior cells.
    pub wq: Option<f64>,
    /// The same, with multibranch penalties, added to `Z` and `XL`.
    pub wcoax: f64,
}

impl Wavefront<'_> {
    /// The pair on `(i, d)` stacking coaxially on a neighboring helix,
    /// either in the exterior loop or in the multibranch loop it closes.
    pub(super) fn coaxial_pairs(&self, d: usize, i: usize) -> Option<f64> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let jtmp = i + dd + 1;
        let j = wrap(jtmp, n);
        if (is_exterior(i, j) && i - j <= LMIN) || !self.bcp.can_pair_at(i, j) {
            return None;
        }
        let (s, m) = (self.s, self.m);
        let (iu, ju) = (at(i), at(j));

        let mut vij = INF;
        if is_exterior(i, j) {
            // A helix (k, j-1) ending just before j.
            for k in 0..j - LMIN {
                let ku = at(k);
                if let Some(v) = self.pair(k, j - 1) {
                    accumulate(
                        &mut vij,
                        self.w3(i + 1) + self.w5(k - 1) + m.coaxial_flush(s, ku, ju - 1, ju, iu) + v,
                    );
                }
                if j - 2 >= 0 {
                    if i < n - 1 {
                        if let Some(v) = self.pair(k, j - 2) {
                            accumulate(
                                &mut vij,
                                self.w3(i + 2) + self.w5(k - 1)
                                    + m.coaxial_mismatch2(s, ku, ju - 2, ju, iu) + v,
                            );
                        }
                    }
                    if let Some(v) = self.pair(k + 1, j - 2) {
                        accumulate(
                            &mut vij,
                            self.w3(i + 1) + self.w5(k - 1)
                                + m.coaxial_mismatch1(s, ku + 1, ju - 2, ju, iu) + v,
                        );
                    }
                }
            }
            // A helix (i+1, k) starting just after i.
            for k in i + LMIN + 1..n {
                let ku = at(k);
                if let Some(v) = self.pair(i + 1, k) {
                    accumulate(
                        &mut vij,
                        self.w3(k + 1) + self.w5(j - 1) + m.coaxial_flush(s, ju, iu, iu + 1, ku) + v,
                    );
                }
                if j > 0 {
                    if let Some(v) = self.pair(i + 2, k) {
                        accumulate(
                            &mut vij,
                            self.w3(k + 1) + self.w5(j - 2)
                                + m.coaxial_mismatch1(s, ju, iu, iu + 2, ku) + v,
                        );
                    }
                }
                if let Some(v) = self.pair(i + 2, k - 1) {
                    accumulate(
                        &mut vij,
                        self.w3(k + 1) + self.w5(j - 1)
                            + m.coaxial_mismatch2(s, ju, iu, iu + 2, ku - 1) + v,
                    );
                }
            }
        }

        if dd > 2 * LMIN + 3 && i != n - 1 && j != 0 {
            let a_2c = m.multi_a_2c();
            let a_2b_2c = m.multi_a_2b_2c();
            // First branch (i+1, k) inside the closing pair.
            for ktmp in i + 2..jtmp - 2 {
                let k = wrap(ktmp, n);
                if k == n - 1 {
                    continue;
                }
                let ku = at(k);
                if let Some(v) = self.pair(i + 1, k) {
                    accumulate(
                        &mut vij,
                        m.coaxial_flush(s, ju, iu, iu + 1, ku) + v + a_2c + self.y(k + 1, j - 1),
                    );
                }
                if ktmp + 2 < jtmp - 1 && i + 1 != n - 1 && k + 1 != n - 1 {
                    if let Some(v) = self.pair(i + 2, k) {
                        let e = v + a_2b_2c;
                        accumulate(
                            &mut vij,
                            m.coaxial_mismatch2(s, ju, iu, iu + 2, ku) + e + self.y(k + 2, j - 1),
                        );
                        if j != 1 {
                            accumulate(
                                &mut vij,
                                m.coaxial_mismatch1(s, ju, iu, iu + 2, ku) + e + self.y(k + 1, j - 2),
                            );
                        }
                    }
                }
            }
            // Last branch (k, j-1) inside the closing pair.
            for ktmp in i + 3..jtmp - 1 {
                let k = wrap(ktmp, n);
                if k == 0 {
                    continue;
                }
                let ku = at(k);
                if let Some(v) = self.pair(k, j - 1) {
                    accumulate(
                        &mut vij,
                        m.coaxial_flush(s, ku, ju - 1, ju, iu) + v + a_2c + self.y(i + 1, k - 1),
                    );
                }
                if j != 1 && ktmp > i + 3 {
                    if let Some(v) = self.pair(k, j - 2) {
                        let e = v + a_2b_2c;
                        if k != 1 {
                            accumulate(
                                &mut vij,
                                m.coaxial_mismatch1(s, ku, ju - 2, ju, iu) + e + self.y(i + 1, k - 2),
                            );
                        }
                        if i != n - 2 {
                            accumulate(
                                &mut vij,
                                m.coaxial_mismatch2(s, ku, ju - 2, ju, iu) + e + self.y(i + 2, k - 1),
                            );
                        }
                    }
                }
            }
        }
        Some(vij)
    }

    /// Two helices `(i, k)` and `(k+1, j)` (or with one mismatch between
    /// them) stacked coaxially and spanning `(i, d)`.
    pub(super) fn coaxial_branches(&self, d: usize, i: usize) -> Option<CoaxialBranches> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let jtmp = i + dd + 1;
        let j = wrap(jtmp, n);
        if (is_exterior(i, j) && i - j <= LMIN) || (is_interior(i, j) && dd <= 2 * LMIN + 1) {
            return None;
        }
        let (s, m) = (self.s, self.m);
        let (iu, ju) = (at(i), at(j));

        let mut flush = INF;
        let mut mismatch = INF;
        for ktmp in i + LMIN + 1..jtmp - LMIN - 1 {
            let k = wrap(ktmp, n);
            if k == n - 1 {
                continue;
            }
            let ku = at(k);
            if let (Some(v1), Some(v2)) = (self.pair(i, k), self.pair(k + 1, j)) {
                accumulate(&mut flush, v1 + v2 + m.coaxial_flush(s, iu, ku, ku + 1, ju));
            }
            if j == 0 || k + 1 == n - 1 {
                continue;
            }
            if i != n - 1 {
                if let (Some(v1), Some(v2)) = (self.pair(i + 1, k), self.pair(k + 2, j)) {
                    accumulate(&mut mismatch, v1 + v2 + m.coaxial_mismatch1(s, iu + 1, ku, ku + 2, ju));
                }
            }
            if let (Some(v1), Some(v2)) = (self.pair(i, k), self.pair(k + 2, j - 1)) {
                accumulate(&mut mismatch, v1 + v2 + m.coaxial_mismatch2(s, iu, ku, ku + 2, ju - 1));
            }
        }

        let (b, c) = (self.m.multi_b(), self.m.multi_c());
        Some(CoaxialBranches {
            wq: is_interior(i, j).then(|| combine(flush, mismatch)),
            wcoax: combine(flush + 2.0 * c, mismatch + 2.0 * b + 2.0 * c),
        })
    }
}
