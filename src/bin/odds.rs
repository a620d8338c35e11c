//! Battle odds calculator
//!
//! Loads one or more TOML scenarios, evaluates them in parallel and prints the
//! outcome distribution as text or JSON.

use std::path::{Path, PathBuf};

use battle_tree::core::types::Side;
use battle_tree::{AggregateResults, Result, Scenario};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "odds")]
#[command(about = "Exact battle odds from TOML scenario files")]
struct Args {
    /// Scenario files
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Survival chance a unit must exceed to be listed as a likely survivor
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,

    /// Override the scenario's round limit
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Override the scenario's prune threshold
    #[arg(long)]
    prune: Option<f64>,
}

#[derive(Serialize)]
struct Report<'a> {
    scenario: String,
    results: &'a AggregateResults,
    attacker_value_left: f64,
    defender_value_left: f64,
    value_swing: f64,
}

fn load(path: &Path, args: &Args) -> Result<Scenario> {
    let mut scenario = Scenario::load(path)?;
    if let Some(max_rounds) = args.max_rounds {
        scenario.config = scenario.config.with_max_rounds(max_rounds);
    }
    if let Some(prune) = args.prune {
        scenario.config = scenario.config.with_prune_threshold(prune);
    }
    scenario.config.validate()?;
    Ok(scenario)
}

fn print_text(scenario: &Scenario, results: &AggregateResults, threshold: f64) {
    let (attacker_left, defender_left) = results.average_value_left(&scenario.costs, &scenario.costs);
    println!("=== {} ===", scenario.name);
    println!(
        "{} attacks {} at {}",
        scenario.battle.attacker, scenario.battle.defender, scenario.battle.location
    );
    println!(
        "  attacker wins  {:6.2}%  ({:6.2}% of decided)",
        results.attacker_win * 100.0,
        results.attacker_win_percent() * 100.0
    );
    println!(
        "  defender wins  {:6.2}%  ({:6.2}% of decided)",
        results.defender_win * 100.0,
        results.defender_win_percent() * 100.0
    );
    println!(
        "  draw           {:6.2}%  ({:6.2}% of decided)",
        results.draw * 100.0,
        results.draw_percent() * 100.0
    );
    println!("  indeterminate  {:6.2}%", results.indeterminate * 100.0);
    println!("  average rounds {:.2}", results.average_rounds);
    for side in Side::BOTH {
        let survivors: Vec<&str> = results
            .units(side)
            .iter()
            .filter(|unit| unit.chance > threshold)
            .map(|unit| unit.type_name.as_str())
            .collect();
        println!(
            "  {} expected survivors {:.2}, likely: [{}]",
            side,
            results.expected_survivors(side),
            survivors.join(", ")
        );
    }
    println!(
        "  value left {:.1} / {:.1}, swing {:+.1}",
        attacker_left,
        defender_left,
        results.value_swing(&scenario.costs, &scenario.costs)
    );
    println!(
        "  {} nodes, {} cache hits, {} loops, {} pruned in {} ms",
        results.stats.nodes_created,
        results.stats.cache_hits,
        results.stats.loops_closed,
        results.stats.pruned,
        results.time_ms
    );
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("battle_tree=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let runs: Vec<(PathBuf, Result<(Scenario, AggregateResults)>)> = args
        .scenarios
        .par_iter()
        .map(|path| {
            let outcome = load(path, &args).and_then(|scenario| {
                let results = scenario.run()?;
                Ok((scenario, results))
            });
            (path.clone(), outcome)
        })
        .collect();

    let mut failed = false;
    let mut reports = Vec::new();
    for (path, outcome) in &runs {
        match outcome {
            Ok((scenario, results)) => {
                if args.json {
                    let (attacker_value_left, defender_value_left) =
                        results.average_value_left(&scenario.costs, &scenario.costs);
                    reports.push(Report {
                        scenario: scenario.name.clone(),
                        results,
                        attacker_value_left,
                        defender_value_left,
                        value_swing: results.value_swing(&scenario.costs, &scenario.costs),
                    });
                } else {
                    print_text(scenario, results, args.threshold);
                }
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "scenario failed");
                failed = true;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode results");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
