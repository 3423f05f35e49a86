//! Headless Hivefall runner for balance testing and CI verification.
//!
//! Plays runs without any front end, driven by a simple built-in
//! [`autopilot`]. This enables:
//!
//! - **Rules checks**: validate a RON overrides file before shipping it
//! - **Balance batches**: play many seeded runs in parallel and compare
//!   win rates
//! - **Replay verification**: re-run a recorded action stream and check
//!   the final state hash
//!
//! # Example
//!
//! ```bash
//! # Check a rules file
//! cargo run -p hivefall_headless -- validate rules/hard.ron
//!
//! # Play one run and record it
//! cargo run -p hivefall_headless -- run --seed 42 --record run.replay
//!
//! # Balance batch
//! cargo run -p hivefall_headless -- batch --count 500 --parallel 8
//! ```

pub mod autopilot;
pub mod batch;
pub mod error;
pub mod runner;

pub use autopilot::Autopilot;
pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use error::{HeadlessError, Result};
pub use runner::{load_rules, run_game, GameConfig, GameOutcome, GameReport};
