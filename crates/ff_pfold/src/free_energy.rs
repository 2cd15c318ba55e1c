//! Log-space accumulation of Boltzmann weights.
//!
//! Energies are in units of kT, so the weight of an alternative is
//! `exp(-e)`. Summing the weights of two alternatives and converting back
//! gives the soft minimum `-ln(exp(-a) + exp(-b))`.

pub use ff_energy::INF;

/// Returns `-ln(exp(-a) + exp(-b))`.
///
/// Computed relative to the smaller operand, so the exponential never
/// overflows and `combine(a, INF) == a` holds exactly.
#[inline]
pub fn combine(a: f64, b: f64) -> f64 {
    if a < b {
        a - (a - b).exp().ln_1p()
    } else if b < a {
        b - (b - a).exp().ln_1p()
    } else {
        a - std::f64::consts::LN_2
    }
}

/// `*acc = combine(*acc, e)`.
#[inline]
pub fn accumulate(acc: &mut f64, e: f64) {
    *acc = combine(*acc, e);
}
