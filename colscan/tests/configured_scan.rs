use arrow::util::pretty::pretty_format_batches;
use colscan::storage::{MemStorage, MemTable};
use colscan::{ColumnHandle, ColumnVector, Domain, ScalarKind, ScanConfig, ScanPhase, TupleDomain};
use colscan_test_utils::{ScriptStep, ScriptedStorage, init_tracing_for_tests};

fn people() -> (MemStorage, Vec<ColumnHandle>) {
    let columns = vec![
        ColumnHandle::new("id", ScalarKind::Integer, 0),
        ColumnHandle::new("name", ScalarKind::Text, 1),
        ColumnHandle::new("active", ScalarKind::Boolean, 2),
    ];
    let table = MemTable::new(
        columns.clone(),
        vec![
            ColumnVector::Long(vec![1, 2, 3, 4, 5]),
            ColumnVector::text(["ann", "ben", "cal", "dee", "eve"]),
            ColumnVector::Long(vec![1, 0, 1, 1, 0]),
        ],
    )
    .unwrap();
    let storage = MemStorage::new();
    storage.insert_table("mem://warehouse/people", table);
    (storage, columns)
}

#[test]
fn scan_uses_batch_size_and_endpoint_from_config_file() {
    init_tracing_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colscan.toml");
    std::fs::write(
        &path,
        r#"
[storage]
endpoint = "mem://warehouse/"

[scan]
batch_size = 2
skip_corrupt_records = true
tolerant_schema_evolution = true
"#,
    )
    .unwrap();
    let config = ScanConfig::from_file(&path).unwrap();
    let (storage, columns) = people();

    let constraint = TupleDomain::all().with_domain(columns[0].clone(), Domain::range(2, 5));
    let mut scan = colscan::open_scan(&storage, "people", columns, &constraint, &config);
    assert_eq!(scan.path(), "mem://warehouse/people");

    let batches: Vec<_> = scan.by_ref().collect();
    assert_eq!(
        batches.iter().map(|b| b.row_count()).collect::<Vec<_>>(),
        vec![2, 2]
    );
    assert!(scan.failure().is_none());
    assert_eq!(scan.phase(), ScanPhase::Closed);
    assert_eq!(scan.metrics().rows_decoded, 4);

    let record_batches = batches
        .iter()
        .map(|b| b.to_record_batch())
        .collect::<colscan::Result<Vec<_>>>()
        .unwrap();
    let table = pretty_format_batches(&record_batches).unwrap().to_string();
    assert!(table.contains("ben"));
    assert!(table.contains("eve"));
    assert!(!table.contains("ann"));
}

#[test]
fn missing_table_is_reported_through_the_failure() {
    let (storage, columns) = people();
    let scan = colscan::open_scan(
        &storage,
        "mem://nobody",
        columns,
        &TupleDomain::all(),
        &ScanConfig::default(),
    );
    assert!(scan.is_finished());
    assert!(matches!(
        scan.failure().map(|f| f.cause()),
        Some(colscan::Error::NotFound(_))
    ));
}

#[test]
fn scripted_storage_works_through_the_umbrella_api() {
    let storage = ScriptedStorage::new(vec![ScriptStep::ints(&[7, 8], true)]);
    let probe = storage.probe();
    let scan = colscan::open_scan(
        &storage,
        "t",
        vec![ColumnHandle::new("n", ScalarKind::Integer, 0)],
        &TupleDomain::all(),
        &ScanConfig::default(),
    );
    assert_eq!(scan.count(), 1);
    let options = probe.last_options().unwrap();
    assert_eq!(options.included_columns().to_vec(), vec!["n".to_string()]);
    assert!(options.predicate().is_accept_all());
    assert!(options.skips_corrupt_records());
    assert!(options.is_tolerant_schema_evolution());
}
