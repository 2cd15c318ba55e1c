//! The loop energy model.
//!
//! `EnergyModel` is a `ParamSet` converted into units of kT at a fixed
//! temperature, plus the lookup functions used by the folding recurrences.
//! Every lookup takes the sequence and the positions of the bases it
//! needs; callers are responsible for passing positions inside the
//! sequence.
//!

use ahash::AHashMap;
use log::debug;
use ndarray::Array4;

use crate::{Base, ParamSet, ParamError, LOOP_MAX, GAS_CONSTANT, KELVIN};
use crate::parameter_parsing::parse_motif;

#[derive(Debug, Clone)]
pub struct EnergyModel {
    pub(crate) p: ParamSet,
    rt: f64,
    special_hairpins: AHashMap<Vec<Base>, f64>,
    a_2c: f64,
    a_2b_2c: f64,
}

#[inline]
pub(crate) fn lookup4(t: &Array4<f64>, a: Base, b: Base, c: Base, d: Base) -> f64 {
    t[[a.idx(), b.idx(), c.idx(), d.idx()]]
}

impl EnergyModel {
    /// Scale `params` (kcal/mol) to kT units at `temperature` °C.
    pub fn new(params: &ParamSet, temperature: f64) -> Result<Self, ParamError> {
        params.validate()?;
        let kelvin = temperature + KELVIN;
        if kelvin <= 0.0 {
            return Err(ParamError::Temperature(temperature));
        }
        let rt = GAS_CONSTANT * kelvin;
        let p = params.scaled(1.0 / rt);

        let mut special_hairpins = AHashMap::default();
        for (len, list) in [(5, &p.triloops), (6, &p.tetraloops), (8, &p.hexaloops)] {
            for special in list {
                special_hairpins.insert(parse_motif(&special.motif, len)?, special.energy);
            }
        }
        debug!("Energy model at {temperature} °C (RT = {rt:.5} kcal/mol), {} special hairpins.",
            special_hairpins.len());

        Ok(EnergyModel {
            a_2c: p.multi_a + 2.0 * p.multi_c,
            a_2b_2c: p.multi_a + 2.0 * p.multi_b + 2.0 * p.multi_c,
            p,
            rt,
            special_hairpins,
        })
    }

    /// RT in kcal/mol; multiply a model energy by this to get kcal/mol.
    pub fn rt(&self) -> f64 {
        self.rt
    }

    /// Multibranch closing penalty.
    pub fn multi_a(&self) -> f64 {
        self.p.multi_a
    }

    /// Multibranch penalty per unpaired base.
    pub fn multi_b(&self) -> f64 {
        self.p.multi_b
    }

    /// Multibranch penalty per branching helix.
    pub fn multi_c(&self) -> f64 {
        self.p.multi_c
    }

    /// Closing penalty plus two helix penalties: a coaxial stack in a multiloop.
    pub fn multi_a_2c(&self) -> f64 {
        self.a_2c
    }

    /// As `multi_a_2c`, with the two mismatched bases of a mismatch-mediated stack.
    pub fn multi_a_2b_2c(&self) -> f64 {
        self.a_2b_2c
    }

    /// Penalty for a helix terminated by a pair containing a U.
    #[inline]
    pub fn terminal_penalty(&self, s: &[Base], i: usize, j: usize) -> f64 {
        if s[i] == Base::U || s[j] == Base::U {
            self.p.terminal_au_penalty
        } else {
            0.0
        }
    }

    /// Pair (i, j) with base `ip1` dangling on the 3' side of i.
    #[inline]
    pub fn dangle_3p(&self, s: &[Base], i: usize, j: usize, ip1: usize) -> f64 {
        self.p.dangle_3p[[s[i].idx(), s[j].idx(), s[ip1].idx()]] + self.terminal_penalty(s, i, j)
    }

    /// Pair (i, j) with base `jm1` dangling on the 5' side of j.
    #[inline]
    pub fn dangle_5p(&self, s: &[Base], i: usize, j: usize, jm1: usize) -> f64 {
        self.p.dangle_5p[[s[i].idx(), s[j].idx(), s[jm1].idx()]] + self.terminal_penalty(s, i, j)
    }

    /// Exterior-loop terminal mismatch on pair (i, j).
    #[inline]
    pub fn terminal_stack(&self, s: &[Base], i: usize, j: usize, ip1: usize, jm1: usize) -> f64 {
        lookup4(&self.p.tstack, s[i], s[j], s[ip1], s[jm1]) + self.terminal_penalty(s, i, j)
    }

    /// Multiloop terminal mismatch on pair (i, j).
    #[inline]
    pub fn terminal_stack_multibranch(&self, s: &[Base], i: usize, j: usize, ip1: usize, jm1: usize) -> f64 {
        lookup4(&self.p.tstackm, s[i], s[j], s[ip1], s[jm1]) + self.terminal_penalty(s, i, j)
    }

    /// Stacking of pair (i+1, j-1) onto (i, j).
    #[inline]
    pub fn stack(&self, s: &[Base], i: usize, j: usize) -> f64 {
        lookup4(&self.p.stack, s[i], s[j], s[i + 1], s[j - 1])
    }

    /// Hairpin loop closed by (i, j) with `d = j - i - 1` unpaired bases.
    pub fn hairpin(&self, s: &[Base], i: usize, j: usize, d: usize) -> f64 {
        debug_assert_eq!(j, i + d + 1);
        if matches!(d, 3 | 4 | 6) {
            if let Some(&e) = self.special_hairpins.get(&s[i..=j]) {
                return e;
            }
        }

        let p = &self.p;
        let mut e = if d > LOOP_MAX {
            p.hairpin_initiation[LOOP_MAX]
                + p.large_loop_extrapolation * (d as f64 / LOOP_MAX as f64).ln()
        } else {
            p.hairpin_initiation[d]
        };

        let all_c = s[i + 1..j].iter().all(|&b| b == Base::C);
        if d == 3 {
            if all_c {
                e += p.c_hairpin_of_3;
            }
            e += self.terminal_penalty(s, i, j);
        } else {
            e += lookup4(&p.tstackh, s[i], s[j], s[i + 1], s[j - 1]);
            if all_c {
                e += p.c_hairpin_slope * d as f64 + p.c_hairpin_intercept;
            }
        }

        if s[i] == Base::G && s[j] == Base::U && i > 1
            && s[i - 1] == Base::G && s[i - 2] == Base::G
        {
            e += p.ggg_hairpin_bonus;
        }
        e
    }

    /// Bulge or internal loop between the outer pair (i, j) and the inner
    /// pair (ip, jp), with `d1 = ip - i - 1` and `d2 = j - jp - 1` unpaired bases.
    #[allow(clippy::too_many_arguments)]
    pub fn internal_loop(
        &self,
        s: &[Base],
        i: usize,
        j: usize,
        ip: usize,
        jp: usize,
        d1: usize,
        d2: usize,
    ) -> f64 {
        use Base::C;
        let p = &self.p;

        if d1 == 0 || d2 == 0 {
            let mut e = p.bulge_initiation[d1 + d2];
            if d1 == 1 || d2 == 1 {
                // Single-nucleotide bulges keep the stack across them.
                e += lookup4(&p.stack, s[i], s[j], s[ip], s[jp]);
                if (d1 == 1 && s[i + 1] == C && (s[i] == C || s[i + 2] == C))
                    || (d2 == 1 && s[j - 1] == C && (s[j] == C || s[j - 2] == C))
                {
                    e += p.single_c_bulge_bonus;
                }
            } else {
                e += self.terminal_penalty(s, i, j);
                e += self.terminal_penalty(s, ip, jp);
            }
            return e;
        }

        let ix = |k: usize| s[k].idx();
        match (d1, d2) {
            (1, 1) => {
                return p.int11[[ix(i), ix(i + 1), ix(i + 2), ix(j - 2), ix(j - 1), ix(j)]];
            }
            (2, 2) => {
                let key = [ix(i), ix(ip), ix(j), ix(jp), ix(i + 1), ix(i + 2), ix(j - 1), ix(j - 2)];
                return p.int22[&key[..]];
            }
            (1, 2) => {
                let key = [ix(i), ix(j), ix(i + 1), ix(j - 1), ix(jp + 1), ix(ip), ix(jp)];
                return p.int21[&key[..]];
            }
            (2, 1) => {
                let key = [ix(jp), ix(ip), ix(jp + 1), ix(ip - 1), ix(i + 1), ix(j), ix(i)];
                return p.int21[&key[..]];
            }
            _ => (),
        }

        let mismatch = if d1 == 1 || d2 == 1 {
            &p.tstacki1n
        } else if (d1 == 2 && d2 == 3) || (d1 == 3 && d2 == 2) {
            &p.tstacki23
        } else {
            &p.tstacki
        };
        let asymmetry = (p.ninio_slope * d1.abs_diff(d2) as f64).min(p.ninio_max);
        p.internal_initiation[d1 + d2]
            + asymmetry
            + lookup4(mismatch, s[i], s[j], s[i + 1], s[j - 1])
            + lookup4(mismatch, s[jp], s[ip], s[jp + 1], s[ip - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NucleotideVec;

    fn model() -> EnergyModel {
        EnergyModel::new(&ParamSet::default(), 37.0).unwrap()
    }

    fn seq(s: &str) -> NucleotideVec {
        NucleotideVec::try_from(s).unwrap()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_units_are_kt() {
        let m = model();
        let s = seq("GGCC");
        let kcal = -3.26; // 5'GG3'/3'CC5'
        assert!(approx_eq(m.stack(&s, 0, 3) * m.rt(), kcal));
        assert!((m.rt() - 0.61633).abs() < 1e-4);
    }

    #[test]
    fn test_bad_temperature() {
        assert!(matches!(
            EnergyModel::new(&ParamSet::default(), -300.0),
            Err(ParamError::Temperature(_))
        ));
    }

    #[test]
    fn test_terminal_penalty() {
        let m = model();
        let s = seq("GACU");
        assert_eq!(m.terminal_penalty(&s, 0, 2), 0.0);
        assert!(approx_eq(m.terminal_penalty(&s, 1, 3) * m.rt(), 0.45));
    }

    #[test]
    fn test_special_tetraloop() {
        let m = model();
        // CUUCGG is tabulated, CUUCAG is not.
        let s = seq("CUUCGG");
        assert!(approx_eq(m.hairpin(&s, 0, 5, 4) * m.rt(), 3.7));
        let s = seq("CUUCAG");
        let e = m.hairpin(&s, 0, 5, 4) * m.rt();
        assert!(!approx_eq(e, 3.7));
        assert!(e > 4.0);
    }

    #[test]
    fn test_hairpin_extrapolation() {
        let m = model();
        let long: String = std::iter::once('G')
            .chain(std::iter::repeat_n('A', 40))
            .chain(std::iter::once('C'))
            .collect();
        let s = seq(&long);
        let e40 = m.hairpin(&s, 0, 41, 40);
        let short: String = std::iter::once('G')
            .chain(std::iter::repeat_n('A', 30))
            .chain(std::iter::once('C'))
            .collect();
        let s30 = seq(&short);
        let e30 = m.hairpin(&s30, 0, 31, 30);
        assert!(approx_eq(e40 - e30, m.p.large_loop_extrapolation * (40.0f64 / 30.0).ln()));
    }

    #[test]
    fn test_poly_c_triloop() {
        let m = model();
        let plain = m.hairpin(&seq("GAAAC"), 0, 4, 3);
        let poly_c = m.hairpin(&seq("GCCCC"), 0, 4, 3);
        assert!(approx_eq((poly_c - plain) * m.rt(), 1.5));
    }

    #[test]
    fn test_internal_loop_cases() {
        let m = model();
        // 1x1 loop: G(A)G ... C(A)C
        let s = seq("GAGAAAACAC");
        let e11 = m.internal_loop(&s, 0, 9, 2, 7, 1, 1);
        assert!(approx_eq(e11 * m.rt(), 0.5));

        // Bulge of size 1 keeps the stacking term.
        let s = seq("GAGAAAACC");
        let bulge = m.internal_loop(&s, 0, 8, 2, 7, 1, 0);
        let expected = 3.8 + -3.26;
        assert!(approx_eq(bulge * m.rt(), expected));

        // 3x3 loop: symmetric, no asymmetry term.
        let s = seq("GCCCGAAAACCCCC");
        let e33 = m.internal_loop(&s, 0, 13, 4, 9, 3, 3);
        assert!(approx_eq(e33 * m.rt(), 2.0));

        // 1x4 loop pays the asymmetry penalty, still below its cap.
        let s = seq("GCGAAAACCCCCC");
        let e14 = m.internal_loop(&s, 0, 12, 2, 7, 1, 4);
        assert!(approx_eq(e14 * m.rt(), 2.0 + 0.6 * 3.0));
    }

    #[test]
    fn test_special_triloop_and_hexaloop() {
        let m = model();
        assert!(approx_eq(m.hairpin(&seq("CAACG"), 0, 4, 3) * m.rt(), 6.8));
        assert!(approx_eq(m.hairpin(&seq("ACAGUACU"), 0, 7, 6) * m.rt(), 2.8));
        // Same length, not tabulated.
        let e = m.hairpin(&seq("ACAGAACU"), 0, 7, 6) * m.rt();
        assert!(!approx_eq(e, 2.8));
    }

    #[test]
    fn test_ggg_hairpin_bonus() {
        let m = model();
        // G-U closing pair preceded by GG.
        let ggg = m.hairpin(&seq("GGGAAAAU"), 2, 7, 4) * m.rt();
        let agg = m.hairpin(&seq("AGGAAAAU"), 2, 7, 4) * m.rt();
        assert!(approx_eq(agg, 5.6 - 0.5));
        assert!(approx_eq(ggg, 5.6 - 0.5 - 2.2));
        assert!(approx_eq(ggg - agg, -2.2));
    }

    #[test]
    fn test_internal_2x2() {
        let m = model();
        let s = seq("GCCGAAAACCCC");
        assert!(approx_eq(m.internal_loop(&s, 0, 11, 3, 8, 2, 2) * m.rt(), 1.1));
        // GA mismatch next to the outer pair.
        let s = seq("GGACAAAAGAAC");
        assert!(approx_eq(m.internal_loop(&s, 0, 11, 3, 8, 2, 2) * m.rt(), 0.0));
    }

    #[test]
    fn test_internal_2x1_mirrors_1x2() {
        // 1x2 loop G(A)A...U(AA)C and the same loop read from the other strand.
        let one_two = seq("GAAAAAAUAAC");
        let two_one = seq("UAACAAAAGAA");

        let m = model();
        let e12 = m.internal_loop(&one_two, 0, 10, 2, 7, 1, 2) * m.rt();
        let e21 = m.internal_loop(&two_one, 0, 10, 3, 8, 2, 1) * m.rt();
        assert!(approx_eq(e12, 2.2 + 0.7));
        assert!(approx_eq(e21, e12));

        // Both orientations read the same table entry.
        let mut p = ParamSet::default();
        let key = [Base::G, Base::C, Base::A, Base::A, Base::A, Base::A, Base::U].map(Base::idx);
        p.int21[&key[..]] = 9.9;
        let m = EnergyModel::new(&p, 37.0).unwrap();
        assert!(approx_eq(m.internal_loop(&one_two, 0, 10, 2, 7, 1, 2) * m.rt(), 9.9));
        assert!(approx_eq(m.internal_loop(&two_one, 0, 10, 3, 8, 2, 1) * m.rt(), 9.9));
    }

    #[test]
    fn test_internal_2x3_mismatch_table() {
        let s = seq("GGACAAAAGAAAC");
        let m = model();
        let e = m.internal_loop(&s, 0, 12, 3, 8, 2, 3) * m.rt();
        assert!(approx_eq(e, 2.0 + 0.6 - 1.1));

        let mut p = ParamSet::default();
        p.tstacki23.fill(-1.0);
        let m = EnergyModel::new(&p, 37.0).unwrap();
        let e = m.internal_loop(&s, 0, 12, 3, 8, 2, 3) * m.rt();
        assert!(approx_eq(e, 2.0 + 0.6 - 2.0));
        // 2x4 loops use the generic table.
        let s = seq("GGACAAAAGAAAAC");
        let e = m.internal_loop(&s, 0, 13, 3, 8, 2, 4) * m.rt();
        assert!(approx_eq(e, 2.0 + 1.2 - 1.1));
    }

    #[test]
    fn test_single_c_bulge() {
        let m = model();
        // Bulged C next to the C of the inner pair.
        let with_c = m.internal_loop(&seq("GCCAAAAGC"), 0, 8, 2, 7, 1, 0) * m.rt();
        let with_a = m.internal_loop(&seq("GACAAAAGC"), 0, 8, 2, 7, 1, 0) * m.rt();
        assert!(approx_eq(with_a, 3.8 - 3.42));
        assert!(approx_eq(with_c, 3.8 - 3.42 - 0.9));
        // Same bonus on the 3' side.
        let right = m.internal_loop(&seq("GCAAAAGCC"), 0, 8, 1, 6, 0, 1) * m.rt();
        assert!(approx_eq(right, 3.8 - 3.42 - 0.9));
    }

    #[test]
    fn test_dangles_and_terminal_stack() {
        let m = model();
        let s = seq("CAAG");
        assert!(approx_eq(m.dangle_3p(&s, 0, 3, 1) * m.rt(), -1.1));
        assert!(approx_eq(m.dangle_5p(&s, 0, 3, 2) * m.rt(), -0.5));
        assert!(approx_eq(m.terminal_stack(&s, 0, 3, 1, 2) * m.rt(), -1.6));

        // A-U closing pairs carry the terminal penalty.
        let s = seq("AAAU");
        assert!(approx_eq(m.dangle_3p(&s, 0, 3, 1) * m.rt(), -0.7 + 0.45));
        assert!(approx_eq(m.dangle_5p(&s, 0, 3, 2) * m.rt(), -0.3 + 0.45));
        assert!(approx_eq(m.terminal_stack(&s, 0, 3, 1, 2) * m.rt(), -1.0 + 0.45));
    }
}
