#![deny(warnings)]

//! Headless CLI: runs an all-AI simulation for a number of quarters and
//! prints a per-quarter leaderboard.

use anyhow::{Context, Result};
use serde::Deserialize;
use sim_runtime::{snapshot, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run parameters, loadable from a YAML scenario file and overridable
/// from the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    companies: usize,
    quarters: u32,
    seed: u64,
    human_players: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            companies: 8,
            quarters: 8,
            seed: 42,
            human_players: 0,
        }
    }
}

struct Options {
    companies: Option<usize>,
    quarters: Option<u32>,
    seed: Option<u64>,
    scenario: Option<String>,
    snapshot: Option<String>,
}

fn parse_args() -> Options {
    let mut opts = Options {
        companies: None,
        quarters: None,
        seed: None,
        scenario: None,
        snapshot: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--companies" => opts.companies = it.next().and_then(|s| s.parse().ok()),
            "--quarters" => opts.quarters = it.next().and_then(|s| s.parse().ok()),
            "--seed" => opts.seed = it.next().and_then(|s| s.parse().ok()),
            "--scenario" => opts.scenario = it.next(),
            "--snapshot" => opts.snapshot = it.next(),
            _ => {}
        }
    }
    opts
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = parse_args();
    let mut scenario = match &opts.scenario {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario file {path}"))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing scenario file {path}"))?
        }
        None => Scenario::default(),
    };
    if let Some(companies) = opts.companies {
        scenario.companies = companies;
    }
    if let Some(quarters) = opts.quarters {
        scenario.quarters = quarters;
    }
    if let Some(seed) = opts.seed {
        scenario.seed = seed;
    }
    info!(?scenario, "starting simulation");

    let mut sim = Simulation::new(scenario.companies, scenario.seed)
        .with_human_players(scenario.human_players);

    for _ in 0..scenario.quarters {
        let period = sim.economy.now;
        let reports = sim.step(vec![None; scenario.companies])?;
        println!("=== Q{} Y{} ===", period.index, period.year);
        for report in &reports {
            println!(
                "{:<12} | revenue {:>12.0} | net profit {:>11.0} | cash {:>11.0} | share {:>6.2}",
                report.company,
                report.income.revenue,
                report.income.net_profit,
                report.cash_flow.closing_cash,
                report.share_price,
            );
        }
    }

    let mut standings: Vec<_> = sim
        .companies
        .iter()
        .map(|c| (c.name.clone(), c.share_price, c.net_worth(sim.economy.material_price)))
        .collect();
    standings.sort_by(|a, b| b.1.total_cmp(&a.1));
    println!("=== final standings ===");
    for (rank, (name, price, net_worth)) in standings.iter().enumerate() {
        println!(
            "{:>2}. {:<12} share {:>6.2} | net worth {:>12.0}",
            rank + 1,
            name,
            price,
            net_worth,
        );
    }

    if let Some(path) = &opts.snapshot {
        let json = snapshot::to_json(&sim)?;
        std::fs::write(path, json).with_context(|| format!("writing snapshot to {path}"))?;
        info!(path, "snapshot written");
    }

    Ok(())
}
