//! Loops closed by a single pair: hairpins, stacks, bulges and interior
//! loops. On the exterior side of the circle the same closing pair either
//! faces the exterior loop or closes a multibranch loop.

use ff_energy::LOOP_MAX;

use super::{at, is_exterior, is_interior, wrap, Wavefront, LMIN};
use crate::free_energy::{accumulate, INF};

impl Wavefront<'_> {
    /// Hairpin, stack, exterior loop and (non-coaxial) multibranch
    /// closure of the pair on `(i, d)`.
    pub(super) fn hairpin_stack_exterior_multibranch(&self, d: usize, i: usize) -> Option<f64> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let j = wrap(i + dd + 1, n);
        if (is_exterior(i, j) && i - j <= LMIN) || !self.bcp.can_pair_at(i, j) {
            return None;
        }
        let (s, m) = (self.s, self.m);
        let (iu, ju) = (at(i), at(j));

        let mut vij = INF;
        if i != n - 1 && j != 0 {
            if is_interior(i, j) {
                vij = m.hairpin(s, iu, ju, d);
            }
            if self.bcp.can_pair_at(i + 1, j - 1) && !(is_interior(i, j) && dd <= LMIN - 2) {
                accumulate(&mut vij, m.stack(s, iu, ju) + self.v(i + 1, j - 1));
            }
        }

        if is_exterior(i, j) {
            accumulate(&mut vij, self.w3(i + 1) + self.w5(j - 1) + m.terminal_penalty(s, iu, ju));
            if i != n - 1 {
                accumulate(&mut vij, self.w3(i + 2) + self.w5(j - 1) + m.dangle_3p(s, iu, ju, iu + 1));
            }
            if j != 0 {
                accumulate(&mut vij, self.w3(i + 1) + self.w5(j - 2) + m.dangle_5p(s, iu, ju, ju - 1));
            }
            if i != n - 1 && j != 0 {
                accumulate(
                    &mut vij,
                    self.w3(i + 2) + self.w5(j - 2) + m.terminal_stack(s, iu, ju, iu + 1, ju - 1),
                );
            }
        }

        if dd > 2 * LMIN + 3 && i != n - 1 && j != 0 {
            let (a, b, c) = (m.multi_a(), m.multi_b(), m.multi_c());
            accumulate(&mut vij, self.x.back(d, 2, iu + 1) + m.terminal_penalty(s, iu, ju) + a + c);
            if i != n - 2 {
                accumulate(
                    &mut vij,
                    self.x.back(d, 3, iu + 2) + m.dangle_3p(s, iu, ju, iu + 1) + a + b + c,
                );
            }
            if j != 1 {
                accumulate(
                    &mut vij,
                    self.x.back(d, 3, iu + 1) + m.dangle_5p(s, iu, ju, ju - 1) + a + b + c,
                );
            }
            if i != n - 2 && j != 1 {
                accumulate(
                    &mut vij,
                    self.x.back(d, 4, iu + 2)
                        + m.terminal_stack_multibranch(s, iu, ju, iu + 1, ju - 1)
                        + a + 2.0 * b + c,
                );
            }
        }
        Some(vij)
    }

    /// Bulges and interior loops of at most `LOOP_MAX` unpaired bases
    /// closed by the pair on `(i, d)`.
    pub(super) fn internal_loops(&self, d: usize, i: usize) -> Option<f64> {
        let (n, dd) = (self.n as isize, d as isize);
        let i = i as isize;
        let j = wrap(i + dd + 1, n);
        if (is_exterior(i, j) && i - j <= LMIN)
            || (is_interior(i, j) && dd <= LMIN + 2)
            || !self.bcp.can_pair_at(i, j)
        {
            return None;
        }
        let (s, m) = (self.s, self.m);

        let mut vij = INF;
        let dmax = (LOOP_MAX as isize).min(dd - 2);
        let d1max = dmax.min(n - i - 2);
        for d1 in 0..=d1max {
            let ip = i + d1 + 1;
            let d2max = (dmax - d1).min(j - 1);
            let d2start = if d1 > 0 { 0 } else { 1 };
            for d2 in d2start..=d2max {
                let jp = j - d2 - 1;
                if self.bcp.can_pair_at(ip, jp) {
                    let e = m.internal_loop(s, at(i), at(j), at(ip), at(jp), at(d1), at(d2));
                    accumulate(&mut vij, e + self.v(ip, jp));
                }
            }
        }
        Some(vij)
    }
}
