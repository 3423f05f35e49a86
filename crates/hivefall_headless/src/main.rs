//! Headless Hivefall runner.
//!
//! Runs the engine without a front end. Reports go to stdout, logs to
//! stderr.
//!
//! # Usage
//!
//! ```bash
//! # Validate a rules overrides file and show the merged result
//! cargo run -p hivefall_headless -- validate rules/hard.ron --print
//!
//! # Play one autopilot run, save its replay and print a JSON report
//! cargo run -p hivefall_headless -- run --seed 42 --record run.replay --json
//!
//! # Balance batch
//! cargo run -p hivefall_headless -- batch --count 1000 --parallel 8 --output results/batch.json
//!
//! # Verify a recorded run
//! cargo run -p hivefall_headless -- replay run.replay
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hivefall_core::replay::Replay;
use hivefall_headless::{
    batch::{run_batch, BatchConfig},
    runner::{self, load_rules, run_game, GameConfig, DEFAULT_MAX_ACTIONS, DEFAULT_TICK_MS},
};

#[derive(Parser)]
#[command(name = "hivefall-headless")]
#[command(about = "Headless Hivefall runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a rules overrides file against the engine's preconditions
    Validate {
        /// RON overrides file
        rules: PathBuf,

        /// Print the merged rules as RON on stdout
        #[arg(long)]
        print: bool,
    },

    /// Play a single autopilot run
    Run {
        /// Engine seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// RON overrides file (defaults when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Action budget
        #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
        max_actions: u32,

        /// Milliseconds per autopilot tick
        #[arg(long, default_value_t = DEFAULT_TICK_MS)]
        tick_ms: u32,

        /// Save a replay of the run to this file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Play many autopilot runs in parallel
    Batch {
        /// Number of runs
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first run
        #[arg(long, default_value = "0")]
        seed_start: u64,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// RON overrides file (defaults when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Action budget per run
        #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
        max_actions: u32,

        /// Milliseconds per autopilot tick
        #[arg(long, default_value_t = DEFAULT_TICK_MS)]
        tick_ms: u32,

        /// Write full results as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a replay and verify it reproduces the recorded state
    Replay {
        /// Replay file
        file: PathBuf,
    },

    /// Play the same seeded run several times and compare the reports
    Verify {
        /// Engine seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of runs
        #[arg(long, default_value = "3")]
        runs: u32,

        /// RON overrides file (defaults when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries reports.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Validate { rules, print } => cmd_validate(rules, print),
        Commands::Run {
            seed,
            rules,
            max_actions,
            tick_ms,
            record,
            json,
        } => cmd_run(seed, rules, max_actions, tick_ms, record, json),
        Commands::Batch {
            count,
            seed_start,
            parallel,
            rules,
            max_actions,
            tick_ms,
            output,
        } => cmd_batch(count, seed_start, parallel, rules, max_actions, tick_ms, output),
        Commands::Replay { file } => cmd_replay(file),
        Commands::Verify { seed, runs, rules } => cmd_verify(seed, runs, rules),
    }
}

fn load_rules_or_exit(path: Option<&std::path::Path>) -> hivefall_core::rules::HivefallRules {
    match load_rules(path) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Validate a rules file
fn cmd_validate(path: PathBuf, print: bool) {
    tracing::info!("Validating rules: {}", path.display());

    match load_rules(Some(&path)) {
        Ok(rules) => {
            eprintln!("PASS: {} is valid", path.display());
            eprintln!(
                "  Board: {}x{}, max enemies: {}, weapons: {}",
                rules.board.rows,
                rules.board.cols,
                rules.spawn.max_enemies,
                rules.weapons.len()
            );
            if print {
                match ron::ser::to_string_pretty(&rules, ron::ser::PrettyConfig::default()) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("FATAL: {e}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}

/// Play one run
fn cmd_run(
    seed: u64,
    rules: Option<PathBuf>,
    max_actions: u32,
    tick_ms: u32,
    record: Option<PathBuf>,
    json: bool,
) {
    let rules = load_rules_or_exit(rules.as_deref());
    let config = GameConfig {
        seed,
        rules,
        max_actions,
        tick_ms,
        record: record.is_some(),
    };

    let outcome = match run_game(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    if let (Some(path), Some(replay)) = (&record, &outcome.replay) {
        if let Err(e) = replay.save(path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save replay");
            eprintln!("FATAL: Failed to save replay: {e}");
            std::process::exit(1);
        }
        tracing::info!("Replay saved to {}", path.display());
    }

    let report = &outcome.report;
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}", "=".repeat(50));
    println!("RUN COMPLETE (seed {})", report.seed);
    println!("{}", "=".repeat(50));
    println!("Status: {:?}", report.status);
    println!(
        "Actions: {} ({} rejected)",
        report.actions, report.rejected_actions
    );
    println!("Moves: {}", report.move_count);
    println!("Fights: {}", report.fights);
    println!(
        "Infected: {} of {} spawned",
        report.infected_count, report.spawned_total
    );
    println!("HP: {}, food: {}", report.hp, report.food);
    let weapons: Vec<&str> = report.weapons.iter().map(|w| w.as_str()).collect();
    println!("Weapons: {}", weapons.join(", "));
    println!("Final hash: {:016x}", report.final_hash);
}

/// Run batch of games for balance testing
fn cmd_batch(
    count: u32,
    seed_start: u64,
    parallel: u32,
    rules: Option<PathBuf>,
    max_actions: u32,
    tick_ms: u32,
    output: Option<PathBuf>,
) {
    let rules = load_rules_or_exit(rules.as_deref());

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        count = count,
        seed_start = seed_start,
        parallel = parallel,
        cpus_available = num_cpus,
        max_actions = max_actions,
        tick_ms = tick_ms,
        "Batch configuration"
    );

    let config = BatchConfig {
        game_count: count,
        seed_start,
        parallel_games: parallel,
        max_actions,
        tick_ms,
        rules,
    };
    let results = run_batch(config);

    if let Some(path) = &output {
        if let Err(e) = results.save(path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {e}");
            std::process::exit(1);
        }
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", summary.total_games);
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} games/sec",
        f64::from(summary.total_games) / results.duration_seconds.max(0.001)
    );
    eprintln!("\nOutcomes:");
    eprintln!("  Won: {} ({:.1}%)", summary.wins, summary.win_rate * 100.0);
    eprintln!("  Lost: {}", summary.losses);
    eprintln!("  Unfinished: {}", summary.unfinished);
    eprintln!(
        "\nAverages: {:.1} actions, {:.1} moves, {:.1} fights, {:.1} infected",
        summary.avg_actions, summary.avg_moves, summary.avg_fights, summary.avg_infected
    );

    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Game {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    if let Some(path) = &output {
        eprintln!("\nResults saved to: {}", path.display());
    }
}

/// Verify a recorded run
fn cmd_replay(file: PathBuf) {
    tracing::info!("Verifying replay: {}", file.display());

    let replay = match Replay::load(&file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  Seed: {}", replay.seed);
    eprintln!("  Actions: {}", replay.action_count());
    eprintln!("  Final moves: {}", replay.final_move_count);

    match replay.verify() {
        Ok(state) => {
            eprintln!("PASS: Replay verification successful");
            eprintln!("  Hash: {:016x}", state.state_hash());
            eprintln!("  Status: {:?}", state.status());
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}

/// Check a seeded run is reproducible
fn cmd_verify(seed: u64, runs: u32, rules: Option<PathBuf>) {
    let rules = load_rules_or_exit(rules.as_deref());
    tracing::info!("Verifying determinism: seed {} ({} runs)", seed, runs);

    let config = GameConfig::with_seed(seed).rules(rules);
    match runner::verify_determinism(&config, runs) {
        Ok(true) => eprintln!("PASS: All {runs} runs produced identical results"),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}
