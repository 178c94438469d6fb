//! Criterion benchmarks for scheduler settlement.
//!
//! Two benchmark groups:
//! - `standard_jobs`: many workers on root and child nodes, plain and multiplier abilities
//! - `special_churn`: workers draining special nodes that deplete and get replaced

use criterion::{Criterion, criterion_group, criterion_main};
use orefield_core::abilities::Multiplier;
use orefield_core::economy::Economy;
use orefield_core::geometry::Position;
use orefield_core::node::SpecialNodeDef;
use orefield_core::resource::ResourceKind;
use orefield_core::strategy::Ability;
use orefield_core::test_utils::*;

// ===========================================================================
// Builders
// ===========================================================================

/// `chains` parent→child chains of length 4, one worker per node.
fn build_mining_field(chains: usize) -> Economy {
    let mut eco = economy();
    for c in 0..chains {
        let nodes = build_chain(&mut eco, 4);
        for (i, node) in nodes.into_iter().enumerate() {
            let ability = if (c + i) % 2 == 0 {
                Ability::Plain
            } else {
                Ability::custom(Multiplier::new(1.5))
            };
            let w = eco.spawn_worker(Position::default(), ability);
            mine_now(&mut eco, w, node);
        }
    }
    eco
}

fn build_special_field(count: usize) -> Economy {
    let mut eco = economy();
    for i in 0..count {
        let host = eco
            .add_standard(standard(ResourceKind::Tier1, 1.0, i as f64))
            .unwrap();
        let special = eco
            .attach_special(host, SpecialNodeDef::new(0.75, 1_000.0))
            .unwrap();
        let w = eco.spawn_worker(Position::default(), Ability::Plain);
        mine_now(&mut eco, w, special);
    }
    eco
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_standard_jobs(c: &mut Criterion) {
    let mut group = c.benchmark_group("standard_jobs");
    for chains in [50, 250] {
        let mut eco = build_mining_field(chains);
        group.bench_function(format!("{}_workers", chains * 4), |b| {
            b.iter(|| eco.step());
        });
    }
    group.finish();
}

fn bench_special_churn(c: &mut Criterion) {
    c.bench_function("special_churn_500", |b| {
        b.iter_batched(
            || build_special_field(500),
            |mut eco| run_ticks(&mut eco, 20),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_standard_jobs, bench_special_churn);
criterion_main!(benches);
