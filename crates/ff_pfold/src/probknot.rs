//! ProbKnot structures: every position pairs with its most probable
//! partner if that choice is mutual. The result may contain pseudoknots.
//!
//! Structures are partner arrays where `partner[i] == i` means unpaired.

/// Pair every position with the partner of lowest pair free energy,
/// then keep only mutual choices.
///
/// `pair_energy(i, j)` must be symmetric and return a value no smaller than
/// the unpaired sentinel for pairs that cannot form.
pub fn mutual_best_pairs<F>(n: usize, unpaired: f64, pair_energy: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> f64,
{
    let mut partner: Vec<usize> = (0..n).collect();
    for (i, p) in partner.iter_mut().enumerate() {
        let mut best = unpaired;
        for j in 0..n {
            let e = pair_energy(i, j);
            if e < best {
                best = e;
                *p = j;
            }
        }
    }
    for i in 0..n {
        if partner[partner[i]] != i {
            partner[i] = i;
        }
    }
    partner
}

/// Partner-array view used while pruning: reads outside the sequence
/// yield a value no position can match.
struct Pairs<'a>(&'a mut [usize]);

impl Pairs<'_> {
    const NONE: i64 = i64::MIN;

    fn at(&self, i: i64) -> i64 {
        if i < 0 {
            return Self::NONE;
        }
        self.0.get(i as usize).map_or(Self::NONE, |&j| j as i64)
    }

    fn is_paired(&self, i: i64) -> bool {
        self.at(i) != i
    }

    fn unpair(&mut self, i: i64) {
        let j = self.0[i as usize];
        self.0[i as usize] = i as usize;
        self.0[j] = j;
    }
}

/// Remove helices with fewer than `min_helix_length` stacked pairs.
///
/// A helix is followed inward from its outermost pair. A single unpaired
/// base on either side (a bulge) does not end the helix, but it is not
/// counted either; a base paired elsewhere in such a bulge is released.
/// When a helix is too short, it is unpaired together with any helix that
/// continues outward from it.
pub fn remove_helices_shorter_than(min_helix_length: usize, partner: &mut [usize]) {
    let n = partner.len() as i64;
    let min = min_helix_length as i64;
    let mut p = Pairs(partner);

    let mut i: i64 = 0;
    while i < n - 2 {
        let mut j = p.at(i);
        if j <= i {
            i += 1;
            continue;
        }
        let mut npair = 1;
        while p.at(i + 1) == j - 1 || p.at(i + 2) == j - 1 || p.at(i + 1) == j - 2 {
            if p.at(i + 1) == j - 1 {
                // stacked
            } else if p.at(i + 2) == j - 1 {
                if p.is_paired(i + 1) {
                    p.unpair(i + 1);
                }
                i += 1;
            } else {
                j -= 1;
            }
            i += 1;
            j -= 1;
            npair += 1;
        }

        if npair < min {
            p.unpair(i);
            if i >= 2 {
                while p.at(i - 1) == j + 1 || p.at(i - 2) == j + 1 || p.at(i - 1) == j + 2 {
                    if p.at(i - 1) == j + 1 {
                        p.unpair(i - 1);
                    } else if p.at(i - 2) == j + 1 {
                        p.unpair(i - 2);
                        i -= 1;
                    } else {
                        p.unpair(i - 1);
                        j += 1;
                    }
                    i -= 1;
                    j += 1;
                }
            } else if i == 1 {
                while p.at(i - 1) == j + 1 || p.at(i - 1) == j + 2 {
                    if p.at(i - 1) != j + 1 {
                        j += 1;
                    }
                    p.unpair(i - 1);
                    i -= 1;
                    j += 1;
                }
            }
        }
        i += 1;
    }
}
