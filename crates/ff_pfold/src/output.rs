//! Plain-text dumps of pair probabilities and structures.

use std::io::{self, Write};

use crate::PartitionFunction;

/// One row per position, values separated (and terminated) by a space.
pub fn write_probability_matrix<W: Write>(w: &mut W, pf: &PartitionFunction) -> io::Result<()> {
    let probs = pf.probability_matrix();
    for row in probs.rows() {
        for p in row {
            write!(w, "{p} ")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Allowed pairs `i < j` (1-based) with `-log10` of their probability.
pub fn write_neg_log10_probabilities<W: Write>(w: &mut W, pf: &PartitionFunction) -> io::Result<()> {
    let n = pf.len();
    writeln!(w, "{n}")?;
    writeln!(w, "{:<8}{:<8}-log10(probability)", "i", "j")?;
    for (i, j) in pf.constraints().allowed_pairs() {
        let e = pf.pair_energy(i, j) / std::f64::consts::LN_10;
        writeln!(w, "{:<8}{:<8}{e}", i + 1, j + 1)?;
    }
    Ok(())
}

/// A structure in connectivity table format.
///
/// `partner[i] == i` marks an unpaired position. Columns are the 1-based
/// index, the base, the previous and next index (0 past the ends), the
/// partner (0 if unpaired) and the index again.
pub fn write_ct<W: Write>(w: &mut W, title: &str, sequence: &str, partner: &[usize]) -> io::Result<()> {
    let n = partner.len();
    let width = (n.to_string().len() + 1).max(5);
    writeln!(w, "{n:>width$}  {title}")?;
    for (i, (c, &p)) in sequence.chars().zip(partner).enumerate() {
        let next = if i == n - 1 { 0 } else { i + 2 };
        let paired = if p == i { 0 } else { p + 1 };
        writeln!(
            w,
            "{:>width$}{c:>2}   {i:>width$}{next:>width$}{paired:>width$}{:>width$}",
            i + 1,
            i + 1,
        )?;
    }
    Ok(())
}
