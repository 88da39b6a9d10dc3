use arrow::buffer::Buffer;
use colscan_result::Error;
use colscan_storage::{
    ColumnReference, MemStorage, MemTable, PredicateDescription, ReadOptions, StorageOpener,
    StorageReader,
};
use colscan_types::{ColumnHandle, ColumnVector, Domain, ScalarKind};

fn age() -> ColumnHandle {
    ColumnHandle::new("age", ScalarKind::Integer, 0)
}

fn name() -> ColumnHandle {
    ColumnHandle::new("name", ScalarKind::Text, 1)
}

fn storage() -> MemStorage {
    let storage = MemStorage::new();
    storage.insert_table(
        "people",
        MemTable::new(
            vec![age(), name()],
            vec![
                ColumnVector::Long(vec![12, 18, 40, 65, 90]),
                ColumnVector::text(["kid", "teen", "adult", "senior", "elder"]),
            ],
        )
        .unwrap(),
    );
    storage
}

#[test]
fn predicate_is_applied_before_batches_are_cut() {
    let storage = storage();
    let mut reader = storage.open("people").unwrap();
    let predicate = PredicateDescription::new(vec![ColumnReference::new(
        age(),
        Domain::range(18, 65),
    )]);
    let mut records = reader
        .read(&ReadOptions::new(vec!["name".into()], predicate))
        .unwrap();

    let first = records.read_batch(2).unwrap();
    assert_eq!(first.row_count, 2);
    assert!(!first.end_of_file);
    let names = first.projected_column(0).unwrap();
    assert_eq!(names.text_at(0), Some("teen"));
    assert_eq!(names.text_at(1), Some("adult"));

    let second = records.read_batch(2).unwrap();
    assert_eq!(second.row_count, 1);
    assert!(second.end_of_file);

    let third = records.read_batch(2).unwrap();
    assert_eq!(third.row_count, 0);
    assert!(third.end_of_file);
}

#[test]
fn completed_bytes_never_decrease() {
    let storage = storage();
    let mut reader = storage.open("people").unwrap();
    let mut records = reader
        .read(&ReadOptions::new(
            vec!["age".into(), "name".into()],
            PredicateDescription::accept_all(),
        ))
        .unwrap();
    let mut last = records.completed_bytes();
    for _ in 0..5 {
        records.read_batch(2).unwrap();
        let now = records.completed_bytes();
        assert!(now >= last);
        last = now;
    }
    assert_eq!(last, 5 * 8 + "kidteenadultseniorelder".len() as u64);
}

#[test]
fn unknown_column_depends_on_schema_tolerance() {
    let storage = storage();
    let mut reader = storage.open("people").unwrap();
    let strict = ReadOptions::new(
        vec!["age".into(), "email".into()],
        PredicateDescription::accept_all(),
    );
    let err = reader.read(&strict).err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));

    let tolerant = strict.clone().tolerant_schema_evolution(true);
    let batch = reader.read(&tolerant).unwrap().read_batch(10).unwrap();
    assert_eq!(batch.row_count, 5);
    assert!(matches!(
        batch.projected_column(1),
        Some(ColumnVector::Missing { len: 5 })
    ));
}

#[test]
fn corrupt_text_rows_are_skipped_on_request() {
    let storage = MemStorage::new();
    storage.insert_table(
        "bad",
        MemTable::new(
            vec![name()],
            vec![ColumnVector::Bytes {
                buffer: Buffer::from_vec(vec![b'o', b'k', 0xff, 0xfe]),
                slices: vec![(0, 2), (2, 2)],
            }],
        )
        .unwrap(),
    );
    let mut reader = storage.open("bad").unwrap();
    let opts = ReadOptions::new(vec!["name".into()], PredicateDescription::accept_all());

    let kept = reader.read(&opts).unwrap().read_batch(10).unwrap();
    assert_eq!(kept.row_count, 2);

    let skipped = reader
        .read(&opts.clone().skip_corrupt_records(true))
        .unwrap()
        .read_batch(10)
        .unwrap();
    assert_eq!(skipped.row_count, 1);
    assert_eq!(skipped.projected_column(0).unwrap().text_at(0), Some("ok"));
}

#[test]
fn missing_path_is_not_found() {
    let err = storage().open("nope").err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn closed_reader_refuses_reads() {
    let storage = storage();
    let mut reader = storage.open("people").unwrap();
    reader.close().unwrap();
    let opts = ReadOptions::new(vec!["age".into()], PredicateDescription::accept_all());
    assert!(matches!(reader.read(&opts), Err(Error::Storage(_))));
}

#[test]
fn unbounded_batch_size_drains_then_stays_at_end() {
    let storage = storage();
    let mut reader = storage.open("people").unwrap();
    let opts = ReadOptions::new(vec!["age".into()], PredicateDescription::accept_all());
    let mut records = reader.read(&opts).unwrap();

    let all = records.read_batch(usize::MAX).unwrap();
    assert_eq!(all.row_count, 5);
    assert!(all.end_of_file);

    let after = records.read_batch(usize::MAX).unwrap();
    assert_eq!(after.row_count, 0);
    assert!(after.end_of_file);
}
