use depot_rebalancer::{
    advisor,
    config::{Basis, RebalanceConfig, Strategy},
    holding::{self, Holding},
    valuation,
};

fn main() {
    divan::main()
}

fn priced_seed() -> Vec<Holding> {
    holding::seed()
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let shares = 0.5 + i as f64;
            Holding { shares, ..h }.with_price(10.0 + 7.5 * i as f64)
        })
        .collect()
}

#[divan::bench]
fn value_seed() -> valuation::Valuation {
    valuation::value(divan::black_box(&priced_seed()))
}

#[divan::bench]
fn advise_sector_fixed(bencher: divan::Bencher) {
    let valuation = valuation::value(&priced_seed());
    let config = RebalanceConfig::default();
    bencher.bench(|| advisor::advise(divan::black_box(&valuation), &config));
}

#[divan::bench]
fn advise_proportional(bencher: divan::Bencher) {
    let valuation = valuation::value(&priced_seed());
    let config = RebalanceConfig {
        strategy: Strategy::Proportional {
            basis: Basis::SectorTotal,
        },
        ..RebalanceConfig::default()
    };
    bencher.bench(|| advisor::advise(divan::black_box(&valuation), &config));
}
