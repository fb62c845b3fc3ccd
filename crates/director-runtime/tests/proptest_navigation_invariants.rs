#![forbid(unsafe_code)]

//! Property tests for timeline navigation invariants.
//!
//! Validates:
//! - Stepping back from any position restores the scene recorded there on
//!   the way forward, for randomly generated scripts.
//! - The same holds when the stage lags behind and transitions are still in
//!   flight at the next calm command.
//! - The rollback log always holds exactly the entries `0..step`.
//! - `go` lands on the target wrapped into `0..=len`.
//! - Random command sequences never push the index out of range.

use std::time::Duration;

use director_core::{AnimationParams, Attrs, Op, Script, Selector, SequenceId, Step};
use director_harness::{MemoryStage, Primitive};
use director_runtime::{Director, ManualClock, wrap_index};
use proptest::prelude::*;

// ============================================================================
// Strategy helpers
// ============================================================================

const DOTS: u64 = 3;

fn attrs_strategy() -> impl Strategy<Value = Attrs> {
    (
        -50i32..50,
        prop::option::of(prop::sample::select(vec!["a", "b", "c"])),
    )
        .prop_map(|(x, label)| {
            let attrs = Attrs::new().with("x", x);
            match label {
                Some(l) => attrs.with("label", l),
                None => attrs,
            }
        })
}

fn selector_strategy() -> impl Strategy<Value = Selector> {
    prop_oneof![
        2 => Just(Selector::parse("dot")),
        3 => (1..=DOTS).prop_map(|id| Selector::Sequence(SequenceId(id))),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => attrs_strategy().prop_map(|a| Op::add("dot", a)),
        3 => (selector_strategy(), attrs_strategy()).prop_map(|(s, a)| Op::set(s, a)),
        3 => (selector_strategy(), attrs_strategy(), 0u64..2_000)
            .prop_map(|(s, a, ms)| Op::animate(s, a, AnimationParams::millis(ms))),
        1 => (1..=DOTS).prop_map(|id| Op::remove(SequenceId(id))),
    ]
}

/// A script whose first step spawns the dots later steps address.
fn script_strategy(max_steps: usize) -> impl Strategy<Value = Script> {
    prop::collection::vec(prop::collection::vec(op_strategy(), 1..4), 1..=max_steps).prop_map(
        |steps| {
            let setup: Step = (0..DOTS)
                .map(|i| Op::add("dot", Attrs::new().with("x", i as i32)))
                .collect();
            std::iter::once(setup)
                .chain(steps.into_iter().map(Step::from))
                .collect()
        },
    )
}

#[derive(Debug, Clone)]
enum Command {
    Forward(bool),
    Back(bool),
    Go(i64),
    Pause(u64),
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => any::<bool>().prop_map(Command::Forward),
        3 => any::<bool>().prop_map(Command::Back),
        1 => (-20i64..20).prop_map(Command::Go),
        2 => (0u64..1_000).prop_map(Command::Pause),
    ]
}

fn director(script: Script) -> (Director<MemoryStage, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let d = Director::new(MemoryStage::new(), script).with_clock(clock.clone());
    (d, clock)
}

// ============================================================================
// Invariant 1: stepping back restores every recorded scene
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn back_restores_recorded_scenes(script in script_strategy(8)) {
        let (mut d, clock) = director(script);
        let mut scenes: Vec<Vec<Primitive>> = vec![d.stage().scene()];

        while !d.at_end() {
            clock.advance_ms(1_000);
            d.forward(false).unwrap();
            d.stage_mut().settle();
            scenes.push(d.stage().scene());
        }

        while d.step() > 0 {
            clock.advance_ms(1_000);
            d.back(false).unwrap();
            d.stage_mut().settle();
            prop_assert_eq!(&d.stage().scene(), &scenes[d.step()]);
        }
        prop_assert!(d.stage().is_empty());
    }
}

// ============================================================================
// Invariant 1b: same, with transitions still in flight between commands
// ============================================================================

/// The scene once every pending transition has landed.
fn settled_scene(stage: &MemoryStage) -> Vec<Primitive> {
    let mut stage = stage.clone();
    stage.settle();
    stage.scene()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn back_restores_recorded_scenes_with_lagging_stage(
        script in script_strategy(8),
        gaps in prop::collection::vec((500u64..1_500, 0u64..700), 20),
    ) {
        let (mut d, clock) = director(script);
        let mut scenes: Vec<Vec<Primitive>> = vec![settled_scene(d.stage())];
        let mut gaps = gaps.into_iter().cycle();
        let mut lag = |d: &mut Director<MemoryStage, ManualClock>| {
            if let Some((calm_ms, stage_ms)) = gaps.next() {
                clock.advance_ms(calm_ms);
                d.stage_mut().advance(Duration::from_millis(stage_ms));
            }
        };

        while !d.at_end() {
            lag(&mut d);
            d.forward(false).unwrap();
            scenes.push(settled_scene(d.stage()));
        }

        while d.step() > 0 {
            lag(&mut d);
            d.back(false).unwrap();
            prop_assert_eq!(&settled_scene(d.stage()), &scenes[d.step()]);
        }
        prop_assert!(d.stage().is_empty());
    }
}

// ============================================================================
// Invariant 2: rapid navigation reaches the same scenes
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn skipping_does_not_change_outcomes(script in script_strategy(6)) {
        let (mut calm, calm_clock) = director(script.clone());
        let (mut rapid, _rapid_clock) = director(script);

        while !calm.at_end() {
            calm_clock.advance_ms(1_000);
            calm.forward(false).unwrap();
            calm.stage_mut().settle();
            rapid.forward(false).unwrap();
            rapid.stage_mut().settle();
            prop_assert_eq!(calm.stage().scene(), rapid.stage().scene());
        }
    }
}

// ============================================================================
// Invariant 3: index and rollback log stay consistent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_commands_keep_index_and_log_consistent(
        script in script_strategy(6),
        commands in prop::collection::vec(command_strategy(), 1..40),
    ) {
        let (mut d, clock) = director(script);
        let len = d.len();

        for command in commands {
            match command {
                Command::Forward(instant) => {
                    let before = d.step();
                    d.forward(instant).unwrap();
                    prop_assert_eq!(d.step(), (before + 1).min(len));
                }
                Command::Back(instant) => {
                    let before = d.step();
                    d.back(instant).unwrap();
                    prop_assert_eq!(d.step(), before.saturating_sub(1));
                }
                Command::Go(target) => {
                    d.go(target, false).unwrap();
                    prop_assert_eq!(d.step(), wrap_index(target, len));
                }
                Command::Pause(ms) => {
                    clock.advance_ms(ms);
                    d.stage_mut().advance(Duration::from_millis(ms));
                }
            }
            prop_assert!(d.step() <= len);
            let indices: Vec<usize> = d.rollback().indices().collect();
            prop_assert_eq!(indices, (0..d.step()).collect::<Vec<_>>());
        }
    }
}

// ============================================================================
// Invariant 4: wrap_index is cyclic
// ============================================================================

proptest! {
    #[test]
    fn wrap_index_is_periodic(target in -10_000i64..10_000, len in 0usize..50) {
        let wrapped = wrap_index(target, len);
        prop_assert!(wrapped <= len);
        prop_assert_eq!(wrapped, wrap_index(target + len as i64 + 1, len));
    }
}
