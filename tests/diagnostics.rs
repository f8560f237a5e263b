//! Call-site recording, end to end.

use ondemand::{CallSite, Chain, ChainConfig, Diagnostics, Target};
use ondemand_testing::{Journal, RecordingLayer, RelayLayer, dispatch_expect};

fn on_line(site: Option<CallSite>, line: u32) -> bool {
    site.is_some_and(|s| s.file() == file!() && s.line() == line)
}

#[test]
fn every_site_points_at_the_calling_line() {
    let journal = Journal::default();
    let mut chain: Chain<'_> = Chain::new();

    let upper_line = line!() + 1;
    let upper = chain.add_layer(RecordingLayer::new("upper", &journal));
    let lower_line = line!() + 1;
    let lower = chain.add_layer(RecordingLayer::new("lower", &journal));
    let connect_line = line!() + 1;
    chain.connect(upper, lower).expect("fresh layers link");
    let call_line = line!() + 1;
    dispatch_expect!(chain.on_demand(upper, Target::Next, &[]));

    let up = chain.diagnostics(upper).expect("known layer");
    let down = chain.diagnostics(lower).expect("known layer");
    assert!(on_line(up.init_site, upper_line), "{up:?}");
    assert!(on_line(down.init_site, lower_line), "{down:?}");
    assert!(on_line(up.connect_site, connect_line));
    assert!(on_line(down.connect_site, connect_line));
    assert!(on_line(down.last_call_site, call_line));
    assert_eq!(up.last_call_site, None);
}

#[test]
fn last_call_site_follows_the_latest_call() {
    let journal = Journal::default();
    let mut chain: Chain<'_> = Chain::new();
    let solo = chain.add_layer(RecordingLayer::new("solo", &journal));

    dispatch_expect!(chain.on_demand(solo, Target::This, &[]));
    let close_line = line!() + 1;
    dispatch_expect!(chain.close(solo, Target::This));

    let diagnostics = chain.diagnostics(solo).expect("known layer");
    assert!(on_line(diagnostics.last_call_site, close_line));
}

#[test]
fn calls_made_by_layers_record_the_layer_code() {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .layer(RelayLayer::new("app", &journal))
        .layer(RelayLayer::new("socket", &journal))
        .build();
    let app = chain.head().expect("non-empty chain");
    let socket = chain.tail().expect("non-empty chain");

    dispatch_expect!(chain.on_demand(app, Target::This, b"req"));

    let app_site = chain
        .diagnostics(app)
        .and_then(|d| d.last_call_site)
        .expect("app was called");
    let socket_site = chain
        .diagnostics(socket)
        .and_then(|d| d.last_call_site)
        .expect("socket was called");
    assert_eq!(app_site.file(), file!());
    assert!(socket_site.file().ends_with("layers.rs"), "{socket_site}");
}

#[test]
fn builder_records_its_caller() {
    let journal = Journal::default();
    let first_line = line!() + 1;
    let chain: Chain<'_> = Chain::builder()
        .layer(RecordingLayer::new("upper", &journal))
        .layer(RecordingLayer::new("lower", &journal))
        .build();
    let lower = chain.tail().expect("non-empty chain");

    let diagnostics = chain.diagnostics(lower).expect("known layer");
    let init = diagnostics.init_site.expect("diagnostics enabled");
    assert_eq!(init.file(), file!());
    assert!((first_line..first_line + 3).contains(&init.line()), "{init}");
    assert_eq!(diagnostics.connect_site, Some(init));
}

#[test]
fn disabled_diagnostics_leave_records_empty() {
    let journal = Journal::default();
    let chain: Chain<'_> = Chain::builder()
        .config(ChainConfig::default().with_diagnostics(false))
        .layer(RecordingLayer::new("upper", &journal))
        .layer(RecordingLayer::new("lower", &journal))
        .build();
    let upper = chain.head().expect("non-empty chain");
    dispatch_expect!(chain.on_demand(upper, Target::Next, &[]));

    for id in chain.ids() {
        assert_eq!(chain.diagnostics(id), Some(Diagnostics::default()));
    }
    assert_eq!(journal.len(), 1);
}
