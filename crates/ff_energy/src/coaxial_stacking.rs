//! Coaxial stacking of adjacent helices.
//!
//! Two helices closed by (i, j) and (ip, jp) may stack end to end, either
//! directly (flush) or across a single mismatched base pair formed by
//! the unpaired nucleotides next to one of them.
//!

use crate::{Base, EnergyModel};
use crate::energy_model::lookup4;

impl EnergyModel {
    /// Helices (i, j) and (ip, jp) stacked flush.
    pub fn coaxial_flush(&self, s: &[Base], i: usize, j: usize, ip: usize, jp: usize) -> f64 {
        self.terminal_penalty(s, i, j)
            + self.terminal_penalty(s, ip, jp)
            + lookup4(&self.p.coaxial, s[i], s[j], s[ip], s[jp])
    }

    /// Stack mediated by the mismatch of `j+1` and `i-1` on helix (i, j).
    pub fn coaxial_mismatch1(&self, s: &[Base], i: usize, j: usize, ip: usize, jp: usize) -> f64 {
        self.terminal_penalty(s, i, j)
            + self.terminal_penalty(s, ip, jp)
            + lookup4(&self.p.tstackcoax, s[j], s[i], s[j + 1], s[i - 1])
            + lookup4(&self.p.coaxstack, s[j + 1], s[i - 1], s[ip], s[jp])
    }

    /// Stack mediated by the mismatch of `jp+1` and `ip-1` on helix (ip, jp).
    pub fn coaxial_mismatch2(&self, s: &[Base], i: usize, j: usize, ip: usize, jp: usize) -> f64 {
        self.terminal_penalty(s, i, j)
            + self.terminal_penalty(s, ip, jp)
            + lookup4(&self.p.tstackcoax, s[jp], s[ip], s[jp + 1], s[ip - 1])
            + lookup4(&self.p.coaxstack, s[j], s[i], s[j + 1], s[jp + 1])
    }
}
