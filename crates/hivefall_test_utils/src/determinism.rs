//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays only work if a run is a pure function of its rules, its random
//! seed and its action stream. Sources of non-determinism include:
//!
//! - **Ambient randomness**: every draw must come from the injected
//!   [`RandomSource`], never a process-global generator.
//!
//! - **Floating-point math**: probabilities are fixed-point
//!   ([`hivefall_core::math::Fixed`]); floats only appear at the RON edge.
//!
//! - **Iteration order**: weapons live in ordered maps and actors move in
//!   list order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual modules (pacing, pursuit, combat)
//! 2. **Property tests**: random action streams must still replay exactly
//! 3. **Integration tests**: full runs are reproducible and serializable

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use hivefall_core::engine::{apply_action, new_game, Action};
use hivefall_core::rng::{RandomSource, SeededRng};
use hivefall_core::rules::HivefallRules;
use hivefall_core::state::HivefallState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial scenario
/// * `step` - Function to advance the scenario by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for index in 0..steps {
            step(&mut state, index);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play `actions` from a fresh run seeded with `seed`.
#[must_use]
pub fn play_actions(rules: &HivefallRules, seed: u64, actions: &[Action]) -> Arc<HivefallState> {
    let mut rng = SeededRng::new(seed);
    actions.iter().fold(new_game(rules), |state, action| {
        apply_action(&state, action, rules, &mut rng)
    })
}

/// Play the same seeded action stream `runs` times and compare final hashes.
///
/// # Example
///
/// ```
/// use hivefall_core::engine::Action;
/// use hivefall_core::grid::Direction;
/// use hivefall_core::rules::HivefallRules;
/// use hivefall_test_utils::determinism::verify_run_determinism;
///
/// let actions = vec![Action::Move(Direction::Left); 12];
/// verify_run_determinism(&HivefallRules::default(), 7, &actions, 3).assert_deterministic();
/// ```
#[must_use]
pub fn verify_run_determinism(
    rules: &HivefallRules,
    seed: u64,
    actions: &[Action],
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        1,
        || play_actions(rules, seed, actions),
        |_, _| {},
        |state| state.state_hash(),
    )
}

/// Apply the same actions to two runs side by side, finding the first
/// action after which they differ.
///
/// Useful for debugging non-determinism, or for checking that two random
/// sources really lead to different runs.
///
/// # Returns
///
/// `None` if the runs never diverge, `Some(0)` if the starting states
/// differ, `Some(n)` if they diverge after the `n`th action.
pub fn find_first_divergence<A, B>(
    rules: &HivefallRules,
    actions: &[Action],
    rng_a: &mut A,
    rng_b: &mut B,
) -> Option<usize>
where
    A: RandomSource + ?Sized,
    B: RandomSource + ?Sized,
{
    let mut a = new_game(rules);
    let mut b = new_game(rules);
    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for (index, action) in actions.iter().enumerate() {
        a = apply_action(&a, action, rules, rng_a);
        b = apply_action(&b, action, rules, rng_b);
        if a.state_hash() != b.state_hash() {
            tracing::debug!(action = index + 1, ?action, "Runs diverged");
            return Some(index + 1);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves the state exactly.
pub fn verify_serialization_determinism(state: &HivefallState) -> bool {
    let hash_before = state.state_hash();

    let Ok(bytes) = state.serialize() else {
        return false;
    };
    let Ok(restored) = HivefallState::deserialize(&bytes) else {
        return false;
    };

    restored == *state && restored.state_hash() == hash_before
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the engine.
pub mod strategies {
    use proptest::prelude::*;

    use hivefall_core::combat::WonChoice;
    use hivefall_core::engine::Action;
    use hivefall_core::grid::Direction;
    use hivefall_core::inventory::WeaponId;

    /// Generate one of the four step directions.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    /// Generate a weapon id from the default arsenal.
    pub fn arb_weapon() -> impl Strategy<Value = WeaponId> {
        prop_oneof![
            Just(WeaponId::from("fists")),
            Just(WeaponId::from("crowbar")),
            Just(WeaponId::from("shotgun")),
            Just(WeaponId::from("taser")),
            Just(WeaponId::from("molotov")),
        ]
    }

    /// Generate an action, biased towards moves so runs make progress.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            6 => arb_direction().prop_map(Action::Move),
            1 => (1u32..20).prop_map(Action::StartFight),
            2 => Just(Action::Engage),
            1 => Just(Action::Flee),
            3 => arb_weapon().prop_map(Action::Attack),
            1 => Just(Action::UseFood),
            1 => prop_oneof![Just(WonChoice::Infect), Just(WonChoice::Harvest)]
                .prop_map(Action::ChooseWonOutcome),
            1 => Just(Action::EndFight),
            2 => (0u32..4000).prop_map(Action::Tick),
            1 => arb_weapon().prop_map(Action::GrantWeapon),
        ]
    }

    /// Generate an action stream of up to `max_len` actions.
    pub fn arb_actions(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        prop::collection::vec(arb_action(), 0..max_len)
    }

    /// Generate a seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
