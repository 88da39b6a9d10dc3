use colscan_result::Error;
use colscan_scan::{ScanAdapter, ScanOptions, ScanPhase};
use colscan_test_utils::{ScriptStep, ScriptedStorage, init_tracing_for_tests};
use colscan_types::{ColumnHandle, ScalarKind, TupleDomain};

fn open(storage: &ScriptedStorage, options: ScanOptions) -> ScanAdapter {
    ScanAdapter::open(
        storage,
        "scripted",
        vec![ColumnHandle::new("id", ScalarKind::Integer, 0)],
        &TupleDomain::all(),
        options,
    )
}

#[test]
fn open_failure_leaves_scan_closed_and_recorded() {
    init_tracing_for_tests();
    let storage = ScriptedStorage::new(vec![ScriptStep::ints(&[1], false)]).fail_open("no such file");
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());

    assert_eq!(scan.phase(), ScanPhase::Closed);
    let failure = scan.failure().expect("open failure is recorded");
    assert!(matches!(failure.cause(), Error::Io(_)));
    assert!(failure.suppressed().is_none());

    assert!(scan.next_batch().is_none());
    assert_eq!(probe.opened_paths(), vec!["scripted".to_string()]);
    assert_eq!(probe.read_batch_calls(), 0);
    // Nothing was opened, so there is nothing to close.
    assert_eq!(probe.close_calls(), 0);
    assert!(scan.close().is_ok());
}

#[test]
fn read_setup_failure_closes_the_opened_reader() {
    let storage = ScriptedStorage::new(vec![ScriptStep::ints(&[1], false)]).fail_read("bad footer");
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());

    assert!(scan.is_finished());
    assert_eq!(probe.read_calls(), 1);
    assert_eq!(probe.close_calls(), 1);
    let failure = scan.take_failure().unwrap();
    assert_eq!(failure.cause().to_string(), "storage error: bad footer");
    assert!(scan.failure().is_none());
}

#[test]
fn zero_batch_size_fails_before_opening() {
    let storage = ScriptedStorage::new(vec![]);
    let probe = storage.probe();
    let scan = open(&storage, ScanOptions::default().with_batch_size(0));

    assert!(scan.is_finished());
    assert!(matches!(
        scan.failure().map(|f| f.cause()),
        Some(Error::InvalidArgumentError(_))
    ));
    assert!(probe.opened_paths().is_empty());
}

#[test]
fn pull_failure_closes_scan_and_keeps_earlier_batches() {
    let storage = ScriptedStorage::new(vec![
        ScriptStep::ints(&[1, 2], false),
        ScriptStep::Fail("disk went away".into()),
        ScriptStep::ints(&[3], false),
    ]);
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());

    assert_eq!(scan.next_batch().map(|b| b.row_count()), Some(2));
    assert!(scan.next_batch().is_none());
    assert!(scan.is_finished());
    assert_eq!(probe.close_calls(), 1);

    let failure = scan.failure().unwrap();
    assert!(failure.cause().to_string().contains("disk went away"));
    assert!(failure.suppressed().is_none());

    assert!(scan.next_batch().is_none());
    assert_eq!(probe.read_batch_calls(), 2);
    assert_eq!(scan.completed_bytes(), 16);
}

#[test]
fn close_error_during_failure_is_suppressed_once() {
    let storage = ScriptedStorage::new(vec![
        ScriptStep::ints(&[1], false),
        ScriptStep::Fail("disk went away".into()),
    ])
    .fail_close("close refused");
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());

    scan.next_batch().unwrap();
    assert!(scan.next_batch().is_none());
    assert!(scan.next_batch().is_none());
    scan.close().unwrap();

    assert_eq!(probe.close_calls(), 1);
    let failure = scan.failure().unwrap();
    assert!(failure.cause().to_string().contains("disk went away"));
    assert_eq!(
        failure.suppressed().map(|e| e.to_string()),
        Some("storage error: close refused".to_string())
    );
    assert!(failure.to_string().contains("suppressed"));
}

#[test]
fn identical_close_error_is_not_attached_to_itself() {
    let storage = ScriptedStorage::new(vec![]).fail_read("boom").fail_close("boom");
    let scan = open(&storage, ScanOptions::default());

    let failure = scan.failure().unwrap();
    assert_eq!(failure.cause().to_string(), "storage error: boom");
    assert!(failure.suppressed().is_none());
}

#[test]
fn close_error_at_normal_end_is_recorded() {
    let storage = ScriptedStorage::new(vec![ScriptStep::empty(true)]).fail_close("close refused");
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());

    assert!(scan.next_batch().is_none());
    assert!(scan.is_finished());
    assert_eq!(probe.close_calls(), 1);
    let failure = scan.failure().unwrap();
    assert_eq!(failure.cause().to_string(), "storage error: close refused");
}

#[test]
fn explicit_close_error_is_returned_once() {
    let storage = ScriptedStorage::new(vec![ScriptStep::ints(&[1], false)]).fail_close("close refused");
    let probe = storage.probe();
    let mut scan = open(&storage, ScanOptions::default());
    scan.next_batch().unwrap();

    assert!(scan.close().is_err());
    assert!(scan.is_finished());
    assert!(scan.close().is_ok());
    assert_eq!(probe.close_calls(), 1);
}

#[test]
fn close_with_suppression_wraps_a_caller_error() {
    let storage = ScriptedStorage::new(vec![ScriptStep::ints(&[1], false)]).fail_close("close refused");
    let mut scan = open(&storage, ScanOptions::default());
    scan.next_batch().unwrap();

    let failure = scan.close_with_suppression(Error::Internal("consumer gave up".into()));
    assert!(matches!(failure.cause(), Error::Internal(_)));
    assert!(failure.suppressed().is_some());
    assert!(matches!(failure.into_cause(), Error::Internal(_)));
    assert!(scan.is_finished());
}

#[test]
fn failure_keeps_only_the_first_distinct_secondary_error() {
    let mut failure = colscan_scan::ScanFailure::new(Error::storage("disk went away"));
    failure.suppress(Error::storage("disk went away"));
    assert!(failure.suppressed().is_none());

    failure.suppress(Error::storage("close refused"));
    failure.suppress(Error::storage("release refused"));
    assert_eq!(
        failure.suppressed().map(|e| e.to_string()),
        Some("storage error: close refused".to_string())
    );
}
