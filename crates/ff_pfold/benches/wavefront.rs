use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use ff_energy::{EnergyModel, NucleotideVec, ParamSet};
use ff_pfold::{FoldConfig, PartitionFunction, Schedule};

const TRNA: &str = "GCGGAUUUAGCUCAGUUGGGAGAGCGCCAGACUGAAGAUCUGGAGGUCCUGUGUUCGAUCCACAGAAUUCGCACCA";

pub fn wavefront_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("Wavefront");
    group.sample_size(20);

    let seq = NucleotideVec::try_from(TRNA).unwrap();
    let model = EnergyModel::new(&ParamSet::default(), 37.0).unwrap();

    for schedule in [Schedule::Sequential, Schedule::Parallel] {
        let config = FoldConfig { schedule, ..FoldConfig::default() };
        group.bench_function(format!("tRNA partition function ({schedule:?})"), |b| {
            b.iter(|| {
                let _ = PartitionFunction::compute(&seq, &model, &config).unwrap();
            });
        });
    }

    let pf = PartitionFunction::compute(&seq, &model, &FoldConfig::default()).unwrap();
    group.bench_function("tRNA ProbKnot structure", |b| {
        b.iter(|| {
            let _ = pf.extract_structure(3);
        });
    });
}

criterion_group!(benches, wavefront_fill);
criterion_main!(benches);
