//! Nearest-neighbor parameter tables.
//!
//! `ParamSet` is a plain container of energies in kcal/mol. Every 4-d table
//! is indexed as `[outer 5' base][outer 3' base][mismatch 3' of the first
//! base][mismatch 5' of the second base]`, i.e. exactly the way the loop
//! energy functions address them. Tables are stored as `ndarray` arrays so
//! they (de)serialize with their shape attached.
//!
//! The `Default` set approximates the Turner 2004 rules. It is generated
//! from the nearest-neighbor stacks, dangles and a handful of mismatch
//! rules instead of the full published int11/int21/int22 lookup tables.

use ndarray::{Array3, Array4, Array6, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::{Base, NBASES, LOOP_MAX, INF};
use crate::{is_canonical_pair, is_weak_pair};

/// A special hairpin loop, given with its closing pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialHairpin {
    pub motif: String,
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    pub stack: Array4<f64>,
    pub coaxial: Array4<f64>,
    pub coaxstack: Array4<f64>,
    pub tstackcoax: Array4<f64>,
    pub tstack: Array4<f64>,
    pub tstackm: Array4<f64>,
    pub tstackh: Array4<f64>,
    pub tstacki: Array4<f64>,
    pub tstacki1n: Array4<f64>,
    pub tstacki23: Array4<f64>,
    pub dangle_3p: Array3<f64>,
    pub dangle_5p: Array3<f64>,
    pub int11: Array6<f64>,
    pub int21: ArrayD<f64>,
    pub int22: ArrayD<f64>,

    pub hairpin_initiation: Vec<f64>,
    pub bulge_initiation: Vec<f64>,
    pub internal_initiation: Vec<f64>,

    pub triloops: Vec<SpecialHairpin>,
    pub tetraloops: Vec<SpecialHairpin>,
    pub hexaloops: Vec<SpecialHairpin>,

    pub terminal_au_penalty: f64,
    pub large_loop_extrapolation: f64,
    pub c_hairpin_of_3: f64,
    pub c_hairpin_slope: f64,
    pub c_hairpin_intercept: f64,
    pub ggg_hairpin_bonus: f64,
    pub single_c_bulge_bonus: f64,
    pub ninio_slope: f64,
    pub ninio_max: f64,
    pub multi_a: f64,
    pub multi_b: f64,
    pub multi_c: f64,
}

impl ParamSet {
    /// A copy with every energy multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> ParamSet {
        let hp = |v: &[SpecialHairpin]| -> Vec<SpecialHairpin> {
            v.iter()
                .map(|h| SpecialHairpin { motif: h.motif.clone(), energy: h.energy * factor })
                .collect()
        };
        let vec = |v: &[f64]| -> Vec<f64> { v.iter().map(|x| x * factor).collect() };
        ParamSet {
            stack: &self.stack * factor,
            coaxial: &self.coaxial * factor,
            coaxstack: &self.coaxstack * factor,
            tstackcoax: &self.tstackcoax * factor,
            tstack: &self.tstack * factor,
            tstackm: &self.tstackm * factor,
            tstackh: &self.tstackh * factor,
            tstacki: &self.tstacki * factor,
            tstacki1n: &self.tstacki1n * factor,
            tstacki23: &self.tstacki23 * factor,
            dangle_3p: &self.dangle_3p * factor,
            dangle_5p: &self.dangle_5p * factor,
            int11: &self.int11 * factor,
            int21: &self.int21 * factor,
            int22: &self.int22 * factor,
            hairpin_initiation: vec(&self.hairpin_initiation),
            bulge_initiation: vec(&self.bulge_initiation),
            internal_initiation: vec(&self.internal_initiation),
            triloops: hp(&self.triloops),
            tetraloops: hp(&self.tetraloops),
            hexaloops: hp(&self.hexaloops),
            terminal_au_penalty: self.terminal_au_penalty * factor,
            large_loop_extrapolation: self.large_loop_extrapolation * factor,
            c_hairpin_of_3: self.c_hairpin_of_3 * factor,
            c_hairpin_slope: self.c_hairpin_slope * factor,
            c_hairpin_intercept: self.c_hairpin_intercept * factor,
            ggg_hairpin_bonus: self.ggg_hairpin_bonus * factor,
            single_c_bulge_bonus: self.single_c_bulge_bonus * factor,
            ninio_slope: self.ninio_slope * factor,
            ninio_max: self.ninio_max * factor,
            multi_a: self.multi_a * factor,
            multi_b: self.multi_b * factor,
            multi_c: self.multi_c * factor,
        }
    }
}

// 5'WX3'/3'ZY5', stored at [W][Z][X][Y] and [Y][X][Z][W].
const STACKS: &[(&str, f64)] = &[
    ("AA/UU", -0.93), ("AU/UA", -1.10), ("UA/AU", -1.33),
    ("CU/GA", -2.08), ("CA/GU", -2.11), ("GU/CA", -2.24),
    ("GA/CU", -2.35), ("CG/GC", -2.36), ("GG/CC", -3.26),
    ("GC/CG", -3.42),
    ("AG/UU", -0.55), ("AU/UG", -1.36), ("CG/GU", -1.41),
    ("CU/GG", -2.11), ("GG/CU", -1.53), ("GU/CG", -2.51),
    ("GA/UU", -1.27), ("GG/UU", -0.50), ("GU/UG", 1.29),
    ("UG/AU", -1.00), ("UG/GU", 0.30),
];

/// GU-containing stacks missing from the list above.
const DEFAULT_WOBBLE_STACK: f64 = -0.5;

// Closing pair (x, y); the dangling base is 3' of x (resp. 5' of y).
// Values are given for a dangling A, C, G, U.
const DANGLE_3P: &[(&str, [f64; NBASES])] = &[
    ("CG", [-1.1, -0.4, -1.3, -0.6]),
    ("GC", [-1.7, -0.8, -1.7, -1.2]),
    ("GU", [-0.7, -0.1, -0.7, -0.1]),
    ("UG", [-0.8, -0.5, -0.8, -0.6]),
    ("AU", [-0.7, -0.1, -0.7, -0.1]),
    ("UA", [-0.8, -0.5, -0.8, -0.6]),
];

const DANGLE_5P: &[(&str, [f64; NBASES])] = &[
    ("CG", [-0.5, -0.3, -0.2, -0.3]),
    ("GC", [-0.2, -0.3, -0.0, -0.0]),
    ("GU", [-0.3, -0.3, -0.4, -0.2]),
    ("UG", [-0.3, -0.3, -0.4, -0.2]),
    ("AU", [-0.3, -0.3, -0.4, -0.2]),
    ("UA", [-0.3, -0.3, -0.4, -0.2]),
];

const TRILOOPS: &[(&str, f64)] = &[("CAACG", 6.8), ("GUUAC", 6.9)];

const TETRALOOPS: &[(&str, f64)] = &[
    ("CAACGG", 5.5), ("CCAAGG", 3.3), ("CCACGG", 3.7), ("CCCAGG", 3.4),
    ("CCGAGG", 3.5), ("CCGCGG", 3.6), ("CCUAGG", 3.7), ("CCUCGG", 2.5),
    ("CUAAGG", 3.6), ("CUACGG", 2.8), ("CUCAGG", 3.7), ("CUCCGG", 2.7),
    ("CUGCGG", 2.8), ("CUUAGG", 3.5), ("CUUCGG", 3.7), ("CUUUGG", 3.7),
];

const HEXALOOPS: &[(&str, f64)] = &[
    ("ACAGUACU", 2.8), ("ACAGUGAU", 3.6), ("ACAGUGCU", 2.9), ("ACAGUGUU", 1.8),
];

/// 1.75 RT at 37 °C.
const EXTRAPOLATION: f64 = 1.079;

/// Base indices of a built-in table key; `/` separates strands.
fn bases(s: &str) -> Vec<usize> {
    s.chars()
        .filter(|&c| c != '/')
        .map(|c| match c {
            'A' => Base::A.idx(),
            'C' => Base::C.idx(),
            'G' => Base::G.idx(),
            'U' => Base::U.idx(),
            _ => panic!("invalid base '{c}' in built-in table key '{s}'"),
        })
        .collect()
}

fn pair_lookup(table: &[(&str, [f64; NBASES])]) -> Array3<f64> {
    let mut arr = Array3::zeros((NBASES, NBASES, NBASES));
    for (pair, values) in table {
        let p = bases(pair);
        for (k, &e) in values.iter().enumerate() {
            arr[[p[0], p[1], k]] = e;
        }
    }
    arr
}

fn stack_table() -> Array4<f64> {
    let mut arr = Array4::zeros((NBASES, NBASES, NBASES, NBASES));
    for a in Base::ALL {
        for b in Base::ALL {
            for c in Base::ALL {
                for d in Base::ALL {
                    if is_canonical_pair(a, b) && is_canonical_pair(c, d) {
                        arr[[a.idx(), b.idx(), c.idx(), d.idx()]] = DEFAULT_WOBBLE_STACK;
                    }
                }
            }
        }
    }
    for (nn, e) in STACKS {
        let s = bases(nn);
        let (w, x, z, y) = (s[0], s[1], s[2], s[3]);
        arr[[w, z, x, y]] = *e;
        arr[[y, x, z, w]] = *e;
    }
    arr
}

/// Build a loop-initiation vector from anchor points, extrapolating
/// logarithmically beyond the last anchor.
fn initiation(anchors: &[(usize, f64)]) -> Vec<f64> {
    let (first, _) = anchors[0];
    let (last, e_last) = anchors[anchors.len() - 1];
    (0..=LOOP_MAX)
        .map(|d| {
            if d < first {
                INF
            } else if d > last {
                e_last + EXTRAPOLATION * (d as f64 / last as f64).ln()
            } else {
                anchors.iter()
                    .find(|&&(k, _)| k == d)
                    .map(|&(_, e)| e)
                    .unwrap_or(e_last)
            }
        })
        .collect()
}

fn specials(list: &[(&str, f64)]) -> Vec<SpecialHairpin> {
    list.iter()
        .map(|(m, e)| SpecialHairpin { motif: m.to_string(), energy: *e })
        .collect()
}

fn weak(a: usize, b: usize) -> f64 {
    if is_weak_pair(Base::from_idx(a), Base::from_idx(b)) { 1.0 } else { 0.0 }
}

impl Default for ParamSet {
    fn default() -> Self {
        use Base::*;
        let shape4 = (NBASES, NBASES, NBASES, NBASES);
        let stack = stack_table();
        let dangle_3p = pair_lookup(DANGLE_3P);
        let dangle_5p = pair_lookup(DANGLE_5P);

        let tstack = Array4::from_shape_fn(shape4, |(a, b, k, l)| {
            dangle_3p[[a, b, k]] + dangle_5p[[a, b, l]]
        });

        let tstackh = Array4::from_shape_fn(shape4, |(a, b, k, l)| {
            let (k, l) = (Base::from_idx(k), Base::from_idx(l));
            let base = if weak(a, b) > 0.0 { -0.5 } else { -0.8 };
            let bonus = match (k, l) {
                (G, A) | (U, U) | (G, G) => -0.8,
                _ => 0.0,
            };
            base + bonus
        });

        let tstacki = Array4::from_shape_fn(shape4, |(a, b, k, l)| {
            let mismatch = match (Base::from_idx(k), Base::from_idx(l)) {
                (G, A) | (A, G) => -1.1,
                (U, U) => -0.7,
                _ => 0.0,
            };
            0.7 * weak(a, b) + mismatch
        });
        let tstacki1n = Array4::from_shape_fn(shape4, |(a, b, _, _)| 0.7 * weak(a, b));

        let coaxstack = Array4::from_shape_fn(shape4, |(_, _, c, d)| {
            if is_canonical_pair(Base::from_idx(c), Base::from_idx(d)) { -0.4 } else { 0.0 }
        });

        let internal_initiation = initiation(&[
            (2, 0.5), (3, 1.6), (4, 1.1), (5, 2.0), (6, 2.0),
            (7, 2.2), (8, 2.3), (9, 2.4), (10, 2.5),
        ]);

        // [s(i)][s(i+1)][s(i+2)][s(j-2)][s(j-1)][s(j)]
        let int11 = Array6::from_shape_fn((NBASES, NBASES, NBASES, NBASES, NBASES, NBASES),
            |(a, k, c, d, l, b)| {
                let gg = if k == G.idx() && l == G.idx() { -1.7 } else { 0.0 };
                0.5 + 0.7 * (weak(a, b) + weak(c, d)) + gg
            });

        // [s(i)][s(j)][s(i+1)][s(j-1)][s(jp+1)][s(ip)][s(jp)]
        let int21 = ArrayD::from_shape_fn(IxDyn(&[NBASES; 7]), |ix| {
            2.2 + 0.7 * (weak(ix[0], ix[1]) + weak(ix[5], ix[6]))
        });

        // [s(i)][s(ip)][s(j)][s(jp)][s(i+1)][s(i+2)][s(j-1)][s(j-2)]
        let init4 = internal_initiation[4];
        let int22 = ArrayD::from_shape_fn(IxDyn(&[NBASES; 8]), |ix| {
            init4 + tstacki[[ix[0], ix[2], ix[4], ix[6]]] + tstacki[[ix[3], ix[1], ix[7], ix[5]]]
        });

        ParamSet {
            coaxial: stack.clone(),
            stack,
            coaxstack,
            tstackcoax: tstack.clone(),
            tstackm: tstack.clone(),
            tstack,
            tstackh,
            tstacki23: tstacki.clone(),
            tstacki,
            tstacki1n,
            dangle_3p,
            dangle_5p,
            int11,
            int21,
            int22,
            hairpin_initiation: initiation(&[
                (3, 5.4), (4, 5.6), (5, 5.7), (6, 5.4), (7, 6.0), (8, 6.1), (9, 6.2),
            ]),
            bulge_initiation: initiation(&[
                (1, 3.8), (2, 2.8), (3, 3.2), (4, 3.6), (5, 4.0),
                (6, 4.4), (7, 4.6), (8, 4.7), (9, 4.8), (10, 4.9),
            ]),
            internal_initiation,
            triloops: specials(TRILOOPS),
            tetraloops: specials(TETRALOOPS),
            hexaloops: specials(HEXALOOPS),
            terminal_au_penalty: 0.45,
            large_loop_extrapolation: EXTRAPOLATION,
            c_hairpin_of_3: 1.5,
            c_hairpin_slope: 0.3,
            c_hairpin_intercept: 1.6,
            ggg_hairpin_bonus: -2.2,
            single_c_bulge_bonus: -0.9,
            ninio_slope: 0.6,
            ninio_max: 3.0,
            multi_a: 3.4,
            multi_b: 0.0,
            multi_c: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Base::*;

    fn st(p: &ParamSet, a: Base, b: Base, c: Base, d: Base) -> f64 {
        p.stack[[a.idx(), b.idx(), c.idx(), d.idx()]]
    }

    #[test]
    fn test_stack_symmetry() {
        let p = ParamSet::default();
        // 5'GG3'/3'CC5' read from either strand.
        assert_eq!(st(&p, G, C, G, C), -3.26);
        assert_eq!(st(&p, C, G, C, G), -3.26);
        // 5'GC3'/3'CG5' is self-symmetric.
        assert_eq!(st(&p, G, C, C, G), -3.42);
        for a in Base::ALL {
            for b in Base::ALL {
                for c in Base::ALL {
                    for d in Base::ALL {
                        assert_eq!(st(&p, a, b, c, d), st(&p, d, c, b, a));
                    }
                }
            }
        }
    }

    #[test]
    fn test_builtin_keys() {
        for (nn, _) in STACKS {
            assert_eq!(bases(nn).len(), 4, "{nn}");
        }
        for (pair, _) in DANGLE_3P.iter().chain(DANGLE_5P) {
            assert_eq!(bases(pair).len(), 2, "{pair}");
        }
        assert_eq!(bases("GU/CA"), vec![G.idx(), U.idx(), C.idx(), A.idx()]);
    }

    #[test]
    #[should_panic(expected = "invalid base 'T'")]
    fn test_builtin_key_typo() {
        bases("GT/CA");
    }

    #[test]
    fn test_noncanonical_stacks_are_empty() {
        let p = ParamSet::default();
        assert_eq!(st(&p, A, A, G, C), 0.0);
        assert!(st(&p, G, U, G, C) < 0.0);
    }

    #[test]
    fn test_initiation_tables() {
        let p = ParamSet::default();
        assert_eq!(p.hairpin_initiation.len(), LOOP_MAX + 1);
        assert_eq!(p.hairpin_initiation[2], INF);
        assert_eq!(p.hairpin_initiation[4], 5.6);
        // Extrapolated values grow monotonically.
        for d in 10..LOOP_MAX {
            assert!(p.hairpin_initiation[d + 1] > p.hairpin_initiation[d]);
            assert!(p.internal_initiation[d + 1] > p.internal_initiation[d]);
        }
        assert_eq!(p.bulge_initiation[1], 3.8);
    }

    #[test]
    fn test_scaled() {
        let p = ParamSet::default();
        let q = p.scaled(2.0);
        assert_eq!(q.stack[[2, 1, 2, 1]], 2.0 * p.stack[[2, 1, 2, 1]]);
        let ix: &[usize] = &[2, 2, 1, 1, 0, 0, 0, 0];
        assert_eq!(q.int22[ix], 2.0 * p.int22[ix]);
        assert_eq!(q.tetraloops[0].energy, 2.0 * p.tetraloops[0].energy);
        assert_eq!(q.multi_a, 6.8);
    }
}
