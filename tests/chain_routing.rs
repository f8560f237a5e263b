//! Routing of the four operations between neighbouring layers.
//!
//! Each call must land on exactly the layer its target names and hand that
//! layer's answer back untouched.

use ondemand::{Chain, DispatchError, LayerId, LayerState, Operation, Target};
use ondemand_testing::{Journal, RecordingLayer, ScriptedLayer, dispatch_expect};
use rstest::{fixture, rstest};

struct Pair {
    chain: Chain<'static>,
    upper: LayerId,
    lower: LayerId,
    journal: Journal,
}

#[fixture]
fn pair() -> Pair {
    let journal = Journal::default();
    let mut chain = Chain::new();
    let upper = chain.add_layer(RecordingLayer::new("upper", &journal));
    let lower = chain.add_layer(RecordingLayer::new("lower", &journal));
    chain.connect(upper, lower).expect("fresh layers link");
    Pair {
        chain,
        upper,
        lower,
        journal,
    }
}

#[rstest]
#[case(Target::Next, "lower")]
#[case(Target::This, "upper")]
fn upper_routes(pair: Pair, #[case] target: Target, #[case] expected: &str) {
    dispatch_expect!(pair.chain.on_demand(pair.upper, target, &[]));
    let mut data = [0_u8; 2];
    dispatch_expect!(pair.chain.on_data_ready(pair.upper, target, &mut data));
    assert_eq!(pair.journal.labels(), [expected, expected]);
}

#[rstest]
#[case(Target::Prev, "upper")]
#[case(Target::This, "lower")]
fn lower_routes(pair: Pair, #[case] target: Target, #[case] expected: &str) {
    dispatch_expect!(pair.chain.on_demand(pair.lower, target, &[]));
    assert_eq!(pair.journal.labels(), [expected]);
}

#[rstest]
fn self_dispatch_never_leaves_the_layer(pair: Pair) {
    for id in [pair.upper, pair.lower] {
        dispatch_expect!(pair.chain.on_demand(id, Target::This, &[]));
    }
    let entries = pair.journal.entries();
    assert_eq!(entries[0].layer, pair.upper);
    assert_eq!(entries[1].layer, pair.lower);
}

#[rstest]
#[case(LayerState::Ok)]
#[case(LayerState::Full)]
#[case(LayerState::Timeout)]
#[case(LayerState::Error)]
fn answers_pass_through_unchanged(#[case] answer: LayerState) {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .layer(RecordingLayer::new("upper", &journal))
        .layer(RecordingLayer::answering("lower", answer, &journal))
        .build();
    let upper = chain.head().expect("non-empty chain");

    assert_eq!(chain.on_demand(upper, Target::Next, &[]), Ok(answer));
    assert_eq!(chain.close(upper, Target::Next), Ok(answer));
}

#[rstest]
fn boundaries_have_no_outer_neighbour(pair: Pair) {
    assert_eq!(
        pair.chain.on_demand(pair.upper, Target::Prev, &[]),
        Err(DispatchError::NoNeighbor {
            from: pair.upper,
            target: Target::Prev,
            operation: Operation::OnDemand,
        })
    );
    let mut data = [];
    assert!(matches!(
        pair.chain.on_data_ready(pair.lower, Target::Next, &mut data),
        Err(DispatchError::NoNeighbor { .. })
    ));
    assert!(pair.journal.is_empty());
}

#[rstest]
fn polling_twice_gives_the_same_answer(pair: Pair) {
    let first = pair.chain.on_demand(pair.upper, Target::Next, b"x");
    let second = pair.chain.on_demand(pair.upper, Target::Next, b"x");
    assert_eq!(first, second);
    assert_eq!(pair.chain.lifecycle(pair.lower), Some(ondemand::Lifecycle::Open));
}

/// A driver that retries on backpressure, as a transport adapter would.
fn pull_until_accepted(chain: &Chain<'_>, from: LayerId, limit: usize) -> (LayerState, usize) {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let state = dispatch_expect!(chain.on_demand(from, Target::Next, b"req"));
        if !state.is_backpressure() || attempts == limit {
            return (state, attempts);
        }
    }
}

#[test]
fn backpressure_is_left_to_the_driver() {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .layer(RecordingLayer::new("app", &journal))
        .layer(ScriptedLayer::new(
            "socket",
            [LayerState::Full, LayerState::Timeout, LayerState::Full],
            LayerState::Ok,
            &journal,
        ))
        .build();
    let app = chain.head().expect("non-empty chain");

    assert_eq!(pull_until_accepted(&chain, app, 10), (LayerState::Ok, 4));
    assert_eq!(journal.len(), 4);
}

#[test]
fn user_data_is_passed_through_untouched() {
    let settings = String::from("tenant-a");
    let journal = Journal::default();
    let mut chain: Chain<'_, String> = Chain::new();
    let with = chain.add_layer_with_data(RecordingLayer::new("with", &journal), &settings);
    let without = chain.add_layer(RecordingLayer::new("without", &journal));

    assert!(std::ptr::eq(
        chain.user_data(with).expect("attached"),
        &settings
    ));
    assert_eq!(chain.user_data(without), None);
}
