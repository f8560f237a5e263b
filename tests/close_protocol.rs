//! Teardown through `close` and `on_close`.

use ondemand::{Chain, DispatchError, LayerState, Lifecycle, Operation, Target};
use ondemand_testing::{Journal, RecordingLayer, RelayLayer, dispatch_expect};
use rstest::rstest;

fn relay_chain(journal: &Journal) -> Chain<'static> {
    Chain::builder()
        .layer(RelayLayer::new("app", journal))
        .layer(RelayLayer::new("codec", journal))
        .layer(RelayLayer::new("socket", journal))
        .build()
}

#[test]
fn paired_close_and_on_close_close_both_ends() {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .layer(RecordingLayer::new("upper", &journal))
        .layer(RecordingLayer::new("lower", &journal))
        .build();
    let upper = chain.head().expect("non-empty chain");
    let lower = chain.tail().expect("non-empty chain");

    dispatch_expect!(chain.close(upper, Target::Next));
    assert_eq!(chain.lifecycle(lower), Some(Lifecycle::Closing));
    dispatch_expect!(chain.on_close(lower, Target::Prev));

    assert_eq!(chain.lifecycle(upper), Some(Lifecycle::Closed));
    assert_eq!(chain.lifecycle(lower), Some(Lifecycle::Closed));
    assert_eq!(
        journal.calls(),
        [("lower", Operation::Close), ("upper", Operation::OnClose)]
    );
}

#[test]
fn close_from_the_top_travels_down_and_back() {
    let journal = Journal::default();
    let chain = relay_chain(&journal);
    let app = chain.head().expect("non-empty chain");

    assert_eq!(chain.close(app, Target::This), Ok(LayerState::Ok));
    assert!(chain.is_closed());
    assert_eq!(
        journal.calls(),
        [
            ("app", Operation::Close),
            ("codec", Operation::Close),
            ("socket", Operation::Close),
            ("codec", Operation::OnClose),
            ("app", Operation::OnClose),
        ]
    );
}

#[test]
fn close_from_the_bottom_travels_up() {
    let journal = Journal::default();
    let chain = relay_chain(&journal);
    let socket = chain.tail().expect("non-empty chain");

    assert_eq!(chain.close(socket, Target::This), Ok(LayerState::Ok));
    assert!(chain.is_closed());
    assert_eq!(
        journal.calls(),
        [
            ("socket", Operation::Close),
            ("codec", Operation::OnClose),
            ("app", Operation::OnClose),
        ]
    );
}

#[test]
fn on_close_targets_are_still_closing_while_they_run() {
    let journal = Journal::default();
    let chain = relay_chain(&journal);
    let app = chain.head().expect("non-empty chain");
    dispatch_expect!(chain.close(app, Target::This));

    let on_close: Vec<_> = journal
        .entries()
        .into_iter()
        .filter(|e| e.operation == Operation::OnClose)
        .collect();
    let socket = chain.tail().expect("non-empty chain");
    assert!(
        on_close
            .iter()
            .all(|e| e.lifecycle == Lifecycle::Closing)
    );
    assert_eq!(chain.lifecycle(socket), Some(Lifecycle::Closed));
}

#[rstest]
#[case(Target::This)]
#[case(Target::Next)]
fn closed_chain_refuses_further_calls(#[case] target: Target) {
    let journal = Journal::default();
    let chain = relay_chain(&journal);
    let app = chain.head().expect("non-empty chain");
    dispatch_expect!(chain.close(app, Target::This));
    journal.clear();

    assert!(matches!(
        chain.on_demand(app, target, b"late"),
        Err(DispatchError::Closed {
            operation: Operation::OnDemand,
            ..
        })
    ));
    assert!(matches!(
        chain.close(app, target),
        Err(DispatchError::Closed { .. })
    ));
    assert!(journal.is_empty());
}

#[test]
fn error_answer_leads_the_driver_into_close() {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .layer(RelayLayer::new("app", &journal))
        .layer(RecordingLayer::answering("broken", LayerState::Error, &journal))
        .build();
    let app = chain.head().expect("non-empty chain");

    let state = dispatch_expect!(chain.on_demand(app, Target::This, b"req"));
    assert!(state.is_error());

    dispatch_expect!(chain.close(app, Target::This));
    let broken = chain.tail().expect("non-empty chain");
    assert_eq!(chain.lifecycle(broken), Some(Lifecycle::Closing));
    dispatch_expect!(chain.on_close(broken, Target::Prev));
    assert!(chain.is_closed());
}
