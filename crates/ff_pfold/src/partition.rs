use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use ff_energy::{EnergyModel, NucleotideVec, ParamSet};
use ff_structure::{PairSet, PairTable};

use crate::config::FoldConfig;
use crate::constraints::PairingConstraints;
use crate::error::{FoldError, MIN_SEQUENCE_LENGTH};
use crate::free_energy::INF;
use crate::probknot::{mutual_best_pairs, remove_helices_shorter_than};
use crate::wavefront::{Tables, Wavefront};

/// Base pair free energies of one sequence, for both orientations of
/// every allowed pair.
///
/// Energies returned by the `*_energy` queries are in units of kT.
#[derive(Debug, Clone)]
pub struct PartitionFunction {
    sequence: NucleotideVec,
    constraints: PairingConstraints,
    v: Array2<f64>,
    w5: Vec<f64>,
    w3: Vec<f64>,
    rt: f64,
}

/// A serializable copy of the tables, energies in kcal/mol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub sequence: String,
    /// `V(i, j)`, or the sentinel for pairs that cannot form.
    pub v: Array2<f64>,
    /// `W5(i)` for `i` in `-1..n`.
    pub w5: Vec<f64>,
    /// `W3(i)` for `i` in `0..=n`.
    pub w3: Vec<f64>,
}

impl PartitionFunction {
    /// Parse `sequence`, build the energy model at the configured
    /// temperature and fill the tables.
    pub fn fold(sequence: &str, params: &ParamSet, config: &FoldConfig) -> Result<Self, FoldError> {
        let sequence = NucleotideVec::try_from(sequence)?;
        let model = EnergyModel::new(params, config.temperature)?;
        Self::compute(&sequence, &model, config)
    }

    pub fn compute(
        sequence: &NucleotideVec,
        model: &EnergyModel,
        config: &FoldConfig,
    ) -> Result<Self, FoldError> {
        let constraints = PairingConstraints::from_sequence(sequence);
        Self::compute_with_constraints(sequence, constraints, model, config)
    }

    pub fn compute_with_constraints(
        sequence: &NucleotideVec,
        constraints: PairingConstraints,
        model: &EnergyModel,
        config: &FoldConfig,
    ) -> Result<Self, FoldError> {
        let n = sequence.len();
        if n < MIN_SEQUENCE_LENGTH {
            return Err(FoldError::TooShort(n));
        }
        if constraints.len() != n {
            return Err(FoldError::ConstraintLength { expected: n, found: constraints.len() });
        }
        if constraints.allowed_pairs().next().is_none() {
            warn!("No base pair is allowed in a sequence of length {n}.");
        }
        info!("Partition function for {n} nucleotides.");

        let Tables { v, w5, w3 } = Wavefront::new(sequence, &constraints, model, config.schedule).fill();
        let pf = PartitionFunction {
            sequence: sequence.clone(),
            constraints,
            v,
            w5,
            w3,
            rt: model.rt(),
        };
        info!("Ensemble free energy: {:.2} kcal/mol", pf.ensemble_energy());
        Ok(pf)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn sequence(&self) -> &NucleotideVec {
        &self.sequence
    }

    pub fn constraints(&self) -> &PairingConstraints {
        &self.constraints
    }

    /// Free energy of the whole ensemble in kcal/mol.
    pub fn ensemble_energy(&self) -> f64 {
        self.w3[0] * self.rt
    }

    /// W5(i): all structures on `[0, i]`, for `i` in `0..n`.
    pub fn w5(&self, i: usize) -> f64 {
        self.w5[i + 1]
    }

    /// W3(i): all structures on `[i, n)`, for `i` in `0..=n`.
    pub fn w3(&self, i: usize) -> f64 {
        self.w3[i]
    }

    /// `V(i, j)`: with `i < j` the pair closing `[i, j]`, with `i > j`
    /// the pair seen from outside. The sentinel for pairs that cannot form.
    pub fn raw_pair_energy(&self, i: usize, j: usize) -> f64 {
        if self.constraints.can_pair(i, j) {
            self.v[(i, j)]
        } else {
            INF
        }
    }

    /// Free energy of all structures containing (i, j), relative to the
    /// ensemble. The sentinel for pairs that cannot form.
    pub fn pair_energy(&self, i: usize, j: usize) -> f64 {
        if self.constraints.can_pair(i, j) {
            self.v[(i, j)] + self.v[(j, i)] - self.w3[0]
        } else {
            INF
        }
    }

    pub fn pair_probability(&self, i: usize, j: usize) -> f64 {
        (-self.pair_energy(i, j)).exp()
    }

    /// Pair probabilities, zero where pairing is not allowed.
    pub fn probability_matrix(&self) -> Array2<f64> {
        let n = self.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if self.constraints.can_pair(i, j) {
                self.pair_probability(i, j)
            } else {
                0.0
            }
        })
    }

    /// ProbKnot structure as a partner array (`partner[i] == i` if unpaired).
    pub fn extract_structure(&self, min_helix_length: usize) -> Vec<usize> {
        let mut partner = mutual_best_pairs(self.len(), INF, |i, j| self.pair_energy(i, j));
        if min_helix_length > 1 {
            remove_helices_shorter_than(min_helix_length, &mut partner);
        }
        partner
    }

    /// The same structure as a set of pairs.
    pub fn extract_pair_set(&self, min_helix_length: usize) -> Result<PairSet, FoldError> {
        let partner = self.extract_structure(min_helix_length);
        let table = PairTable::try_from(&partner[..])?;
        let pairs = PairSet::from(&table);
        debug!("ProbKnot structure: {} pairs, {} crossing.", table.pair_count(), pairs.crossings().len());
        Ok(pairs)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let n = self.len();
        TableSnapshot {
            sequence: self.sequence.to_string(),
            v: Array2::from_shape_fn((n, n), |(i, j)| {
                if self.constraints.can_pair(i, j) { self.v[(i, j)] * self.rt } else { INF }
            }),
            w5: self.w5.iter().map(|e| e * self.rt).collect(),
            w3: self.w3.iter().map(|e| e * self.rt).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use crate::config::Schedule;

    fn fold(seq: &str) -> PartitionFunction {
        PartitionFunction::fold(seq, &ParamSet::default(), &FoldConfig::default()).unwrap()
    }

    fn random_sequence(rng: &mut StdRng, len: usize) -> String {
        (0..len).map(|_| ['A', 'C', 'G', 'U'][rng.random_range(0..4)]).collect()
    }

    fn paired_count(partner: &[usize]) -> usize {
        partner.iter().enumerate().filter(|&(i, &j)| i != j).count()
    }

    #[test]
    fn test_rejects_short_sequence() {
        let err = PartitionFunction::fold("GGAAAC", &ParamSet::default(), &FoldConfig::default());
        assert!(matches!(err, Err(FoldError::TooShort(6))));
    }

    #[test]
    fn test_rejects_invalid_symbol() {
        let err = PartitionFunction::fold("GGGAXACCC", &ParamSet::default(), &FoldConfig::default());
        assert!(matches!(err, Err(FoldError::Sequence(_))));
    }

    #[test]
    fn test_rejects_mismatched_constraints() {
        let seq = NucleotideVec::try_from("GGGAAACCC").unwrap();
        let model = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();
        let bcp = PairingConstraints::from_fn(8, |_, _| false);
        let err = PartitionFunction::compute_with_constraints(&seq, bcp, &model, &FoldConfig::default());
        assert!(matches!(err, Err(FoldError::ConstraintLength { expected: 9, found: 8 })));
    }

    #[test]
    fn test_no_pairs_possible() {
        let pf = fold("ACGUACG");
        assert_eq!(pf.len(), 7);
        assert!(pf.probability_matrix().iter().all(|&p| p == 0.0));
        assert_eq!(pf.extract_structure(3), (0..7).collect::<Vec<_>>());
        assert_eq!(pf.ensemble_energy(), 0.0);
    }

    #[test]
    fn test_hairpin() {
        let pf = fold("GGGGGGAAAACCCCCC");
        let structure = pf.extract_structure(3);
        let db = PairTable::try_from(&structure[..]).unwrap().to_string();
        assert_eq!(db, "((((((....))))))");

        let probs = pf.probability_matrix();
        let best = probs.iter().cloned().fold(0.0, f64::max);
        assert!(best > 0.9);
        assert!(pf.ensemble_energy() < -5.0);

        let pairs = pf.extract_pair_set(3).unwrap();
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn test_forbidden_pairs_have_zero_probability() {
        let seq = NucleotideVec::try_from("GGGGGGAAAACCCCCC").unwrap();
        let model = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();
        let free = PartitionFunction::compute(&seq, &model, &FoldConfig::default()).unwrap();
        let mut bcp = PairingConstraints::from_sequence(&seq);
        bcp.forbid(0, 15);
        let pf = PartitionFunction::compute_with_constraints(&seq, bcp, &model, &FoldConfig::default()).unwrap();
        assert_eq!(pf.pair_probability(0, 15), 0.0);
        assert_eq!(pf.pair_probability(15, 0), 0.0);
        assert_eq!(pf.raw_pair_energy(0, 15), INF);
        assert_eq!(pf.raw_pair_energy(15, 0), INF);
        // Without the outer pair the stem slides to a shifted register.
        assert!(pf.pair_probability(1, 13) > free.pair_probability(1, 13));
        let probs = pf.probability_matrix();
        for i in 0..pf.len() {
            let row: f64 = probs.row(i).sum();
            assert!(row <= 1.0 + 1e-6, "row {i} sums to {row}");
        }
    }

    #[test]
    fn test_schedules_agree() {
        let seq = NucleotideVec::try_from("GGGAGCUCAGUUGGUAGAGCAGAGGACUGAAAAUCCUCGUGUCACCAGUUCAAAUCUGGUUCCUGGCA").unwrap();
        let model = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();
        let mut config = FoldConfig::default();
        config.schedule = Schedule::Sequential;
        let seq_pf = PartitionFunction::compute(&seq, &model, &config).unwrap();
        config.schedule = Schedule::Parallel;
        let par_pf = PartitionFunction::compute(&seq, &model, &config).unwrap();
        assert_eq!(seq_pf.snapshot(), par_pf.snapshot());
    }

    #[test]
    fn test_random_sequences() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let len = rng.random_range(12..48);
            let seq = random_sequence(&mut rng, len);
            let pf = fold(&seq);
            let n = pf.len();

            // Both boundary vectors end in the full ensemble.
            let (w5, w3) = (pf.w5(n - 1), pf.w3(0));
            assert!((w5 - w3).abs() < 1e-6 * (1.0 + w3.abs()), "{seq}: {w5} vs {w3}");
            assert!(w3 <= 0.0);

            let probs = pf.probability_matrix();
            for i in 0..n {
                for j in 0..n {
                    let p = probs[(i, j)];
                    assert!((0.0..=1.0 + 1e-9).contains(&p), "{seq}: P({i},{j}) = {p}");
                    assert_eq!(p, probs[(j, i)]);
                }
                let row: f64 = probs.row(i).sum();
                assert!(row <= 1.0 + 1e-6, "{seq}: row {i} sums to {row}");
            }

            assert_eq!(pf.extract_structure(3), pf.extract_structure(3));
            let mut previous = usize::MAX;
            for min in 1..=7 {
                let count = paired_count(&pf.extract_structure(min));
                assert!(count <= previous, "{seq}: min {min}");
                previous = count;
            }
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let pf = fold("GGGAAAUCCC");
        let snap = pf.snapshot();
        assert_eq!(snap.sequence, "GGGAAAUCCC");
        assert_eq!(snap.v.dim(), (10, 10));
        assert_eq!(snap.w5.len(), 11);
        assert!((snap.w3[0] - pf.ensemble_energy()).abs() < 1e-12);
        let json = serde_json::to_string(&snap).unwrap();
        let back: TableSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.v.dim(), snap.v.dim());
        assert_eq!(back.sequence, snap.sequence);
    }
}
