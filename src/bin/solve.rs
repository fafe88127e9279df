//! Solve Binary
//!
//! Plans a joint policy for a benchmark Dec-POMDP at a fixed horizon.
//!
//! Methods: bfs (exhaustive), jesp (exhaustive best responses),
//! dp (dynamic-programming best responses), eval (a random policy).
//! Type "Q" + Enter to stop a running search and keep its incumbent.

use clap::Parser;
use colored::Colorize;
use decpomdp::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
enum Method {
    /// enumerate every joint policy
    Bfs,
    /// alternate exhaustive best responses
    Jesp,
    /// alternate best responses by dynamic programming
    Dp,
    /// evaluate a random joint policy
    Eval,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value = "dectiger")]
    problem: Problem,
    #[arg(long, default_value_t = 2)]
    horizon: usize,
    #[arg(long, value_enum, default_value = "bfs")]
    method: Method,
    /// independent JESP runs with consecutive seeds, best one kept
    #[arg(long, default_value_t = 1)]
    restarts: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// recompute subtrees instead of keeping a value table
    #[arg(long)]
    uncached: bool,
    /// store model tables sparsely
    #[arg(long)]
    sparse: bool,
    /// Monte Carlo runs to cross-check the exact value
    #[arg(long)]
    simulate: Option<usize>,
    /// stop searching after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// print the result as JSON
    #[arg(long)]
    json: bool,
    #[arg(long, default_value_t = 3)]
    states: usize,
    #[arg(long, default_value_t = 2)]
    agents: usize,
    #[arg(long, default_value_t = 2)]
    actions: usize,
    #[arg(long, default_value_t = 2)]
    observations: usize,
    #[arg(long, default_value_t = 0.25)]
    sparsity: Probability,
    /// fire fighting: houses in the row
    #[arg(long, default_value_t = 3)]
    houses: usize,
    /// fire fighting: fire levels per house
    #[arg(long, default_value_t = 3)]
    levels: usize,
}

#[derive(Serialize)]
struct Solution<'a> {
    problem: String,
    horizon: usize,
    method: Method,
    value: Utility,
    policy: &'a JointPolicy,
    simulation: Option<Report>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log(&format!("{}-h{}", args.problem, args.horizon));
    let cancel = match args.timeout {
        Some(secs) => Cancel::new().with_timeout(Duration::from_secs(secs)),
        None => Cancel::new(),
    };
    brb(cancel.clone());
    let storage = if args.sparse { Storage::Sparse } else { Storage::Dense };
    let shape = Shape {
        states: args.states,
        agents: args.agents,
        actions: args.actions,
        observations: args.observations,
        sparsity: args.sparsity,
    };
    let brigade = Brigade {
        agents: args.agents,
        houses: args.houses,
        levels: args.levels,
    };
    let model = args.problem.build(&shape, &brigade, storage, args.seed)?;
    let indexer = Indexer::new(&model, args.horizon)?;
    let mode = if args.uncached {
        Mode::Uncached
    } else {
        Mode::recommended(model.states(), indexer.total())
    };
    log::info!("{:<32}{}", "model", model);
    log::info!("{:<32}{} joint histories", "horizon", indexer.total());
    let (value, policy) = match args.method {
        Method::Bfs => {
            let mut planner = BruteForce::new(&model, &indexer)
                .with_mode(mode)
                .with_cancel(cancel.clone());
            planner.plan_parallel()?;
            outcome(&planner)?
        }
        Method::Jesp => restart(args.restarts, args.seed, &cancel, |seed| {
            Jesp::new(&model, &indexer, seed)
                .with_mode(mode)
                .with_cancel(cancel.clone())
        })?,
        Method::Dp => restart(args.restarts, args.seed, &cancel, |seed| {
            JespDp::new(&model, &indexer, seed)
                .with_mode(mode)
                .with_cancel(cancel.clone())
        })?,
        Method::Eval => {
            let mut policy = JointPolicy::new(&model, &indexer);
            policy.randomize(&mut SmallRng::seed_from_u64(args.seed));
            (evaluate(&model, &indexer, &policy, mode)?, policy)
        }
    };
    let simulation = args
        .simulate
        .map(|runs| Simulation::new(runs, args.seed).run(&model, &indexer, &policy))
        .transpose()?;
    if args.json {
        let solution = Solution {
            problem: args.problem.to_string(),
            horizon: args.horizon,
            method: args.method,
            value,
            policy: &policy,
            simulation,
        };
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        println!("{:<16}{}", "model".bold(), model);
        println!("{:<16}{}", "horizon".bold(), args.horizon);
        println!("{:<16}{}", "value".bold(), format!("{:.6}", value).green());
        if let Some(report) = simulation {
            println!("{:<16}{}", "simulated".bold(), report.to_string().cyan());
        }
        print!("{}", policy);
    }
    Ok(())
}

/// best outcome of `restarts` planners built with consecutive seeds
fn restart<P: Planner>(
    restarts: usize,
    seed: u64,
    cancel: &Cancel,
    build: impl Fn(u64) -> P,
) -> anyhow::Result<(Utility, JointPolicy)> {
    let mut best: Option<(Utility, JointPolicy)> = None;
    for i in 0..restarts.max(1) {
        if i > 0 && cancel.is_cancelled() {
            break;
        }
        let mut planner = build(seed + i as u64);
        planner.plan()?;
        let (value, policy) = outcome(&planner)?;
        log::info!("{:<32}{:.6}", format!("restart {}", i), value);
        if best.as_ref().is_none_or(|(incumbent, _)| value > *incumbent) {
            best = Some((value, policy));
        }
    }
    best.ok_or_else(|| anyhow::anyhow!("no restart produced a policy"))
}

fn outcome(planner: &impl Planner) -> anyhow::Result<(Utility, JointPolicy)> {
    let policy = planner
        .joint_policy()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("search stopped before evaluating any policy"))?;
    Ok((planner.expected_reward(), policy))
}
