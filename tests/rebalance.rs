use chrono::NaiveDate;
use depot_rebalancer::{
    Euro,
    advisor::{Action, Destination, Direction, Subject},
    config::{Basis, RebalanceConfig, Strategy},
    holding::{self, Currency, Holding, LEGACY_SECTOR},
    oracle::{FxRate, QuoteSheet},
    portfolio::PortfolioState,
    schedule::MonthlyPlan,
    store::{CsvHoldingStore, HoldingStore},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_quotes() -> QuoteSheet {
    let closes = [
        ("NVDA", 180.0),
        ("MSFT", 510.0),
        ("GOOGL", 250.0),
        ("ASML", 860.0),
        ("CRWD", 480.0),
        ("NOW", 900.0),
        ("FSLR", 210.0),
        ("NEE", 80.0),
        ("BEPC", 38.0),
        ("TSLA", 430.0),
        ("PLTR", 180.0),
        ("SMCI", 45.0),
        ("JNJ", 190.0),
        ("NVO", 55.0),
        ("AAPL", 250.0),
        ("VOW3.DE", 95.0),
    ];
    closes
        .into_iter()
        .fold(QuoteSheet::new(FxRate::new(Some(1.16))), |sheet, (t, c)| {
            sheet.with_close(t, c)
        })
}

#[test]
fn first_run_seeds_contributes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHoldingStore::new(dir.path().join("depot_data.csv"));
    let plan_path = dir.path().join("plan.yml");

    let mut state = PortfolioState::new(store.load().unwrap()).unwrap();
    assert_eq!(state.refresh_prices(&seed_quotes()), 16);

    let mut plan = MonthlyPlan::load_from_file(&plan_path).unwrap();
    let executed = state.run_contributions(&mut plan, date(2025, 11, 10));
    assert_eq!(executed, [date(2025, 11, 6)]);
    plan.save(&plan_path).unwrap();
    store.save(state.holdings()).unwrap();

    let reloaded = PortfolioState::new(store.load().unwrap()).unwrap();
    assert_eq!(reloaded, state);
    let vw = reloaded.holdings().iter().find(|h| h.is_legacy()).unwrap();
    assert_eq!(vw.shares, 57.213);
    assert!(
        reloaded
            .holdings()
            .iter()
            .filter(|h| !h.is_legacy())
            .all(|h| h.shares > 0.0)
    );

    let mut plan = MonthlyPlan::load_from_file(&plan_path).unwrap();
    let mut again = reloaded.clone();
    assert!(again.run_contributions(&mut plan, date(2025, 11, 10)).is_empty());
    assert_eq!(again, reloaded);
}

#[test]
fn market_value_is_rounded_product_everywhere() {
    let mut state = PortfolioState::new(holding::seed()).unwrap();
    state.refresh_prices(&seed_quotes());
    for (i, h) in holding::seed().iter().enumerate() {
        state.set_shares(&h.ticker, 0.137 * (i as f64 + 1.0)).unwrap();
    }
    let valuation = state.valuation();
    for vh in &valuation.holdings {
        let price = vh.holding.price.map(|p| p.0).unwrap_or(0.0);
        let expected = (vh.holding.shares * price * 100.0).round() / 100.0;
        assert_eq!(vh.market_value, Euro(expected), "{}", vh.holding.ticker);
    }
    let sum: Euro = valuation.sectors.iter().map(|s| s.market_value).sum();
    assert_eq!(sum, valuation.total);
    assert!(valuation.sector(LEGACY_SECTOR).is_none());
}

#[test]
fn unpriced_portfolio_has_no_breakdown_and_no_crash() {
    let state = PortfolioState::new(holding::seed()).unwrap();
    let snapshot = state.snapshot(&RebalanceConfig::default());
    assert_eq!(snapshot.valuation.total, Euro::ZERO);
    assert!(snapshot.valuation.allocation().is_empty());
    // Every configured sector is 50 € or more below its target.
    assert_eq!(snapshot.suggestions.len(), 6);
    assert!(
        snapshot
            .suggestions
            .iter()
            .all(|s| s.direction == Direction::Underweight)
    );
}

#[test]
fn sector_fixed_example() {
    let state = PortfolioState::new(vec![
        Holding::new("A", "A", "Tech", 50.0, 1.0, Currency::Eur).with_price(150.0),
        Holding::new("B", "B", "Tech", 50.0, 1.0, Currency::Eur).with_price(80.0),
        Holding::new("C", "C", "Health", 25.0, 1.0, Currency::Eur).with_price(45.0),
        Holding::new("D", "D", "Energy", 25.0, 1.0, Currency::Eur).with_price(95.0),
        Holding::new("VW", "VOW3.DE", LEGACY_SECTOR, 0.0, 1.0, Currency::Eur).with_price(1.0),
    ])
    .unwrap();
    let config = RebalanceConfig::from_yaml(
        "Strategy:\n  Mode: SectorFixed\n  Targets:\n    - {Sector: Tech, Value: 200}\n    - {Sector: Energy, Value: 100}\n    - {Sector: Health, Value: 50}\n",
    )
    .unwrap();
    let snapshot = state.snapshot(&config);
    assert_eq!(snapshot.suggestions.len(), 1);
    let s = &snapshot.suggestions[0];
    assert_eq!(s.subject, Subject::Sector("Tech".into()));
    assert_eq!(s.direction, Direction::Overweight);
    assert_eq!(s.magnitude.amount, Euro(30.0));
    assert_eq!(
        s.action,
        Action::Sell {
            candidate: "A".into()
        }
    );
    assert_eq!(s.destination, Some(Destination::Sector("Health".into())));
}

#[test]
fn proportional_example() {
    let state = PortfolioState::new(vec![
        Holding::new("X", "X", "Tech", 50.0, 4.0, Currency::Eur).with_price(10.0),
        Holding::new("Y", "Y", "Tech", 50.0, 6.0, Currency::Eur).with_price(10.0),
    ])
    .unwrap();
    let config = RebalanceConfig {
        strategy: Strategy::Proportional {
            basis: Basis::PortfolioTarget { total: Euro(100.0) },
        },
        ..RebalanceConfig::default()
    };
    let suggestions = state.snapshot(&config).suggestions;
    let rendered: Vec<String> = suggestions.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "X (Tech): 10.00 € too little (10.0 pp) - accumulate",
            "Y (Tech): 10.00 € too much (10.0 pp) - shift into X",
        ]
    );
}

#[test]
fn snapshot_is_repeatable() {
    let mut state = PortfolioState::new(holding::seed()).unwrap();
    state.refresh_prices(&seed_quotes());
    let config = RebalanceConfig::default();
    assert_eq!(state.snapshot(&config), state.snapshot(&config));
}
