//! End-to-end scenarios

use std::io::Write;

use scanlab_core::experiments::{self, Record};
use scanlab_core::predicate::{select_less_than_branching, select_less_than_branchless};
use scanlab_core::scan::sum_linear;
use scanlab_core::transform::{copy, TransformStrategy, UnrollFactor};
use scanlab_core::{
    advise_sequential, checksum, AdviceOutcome, Backing, Buffer, Error, ExperimentConfig,
    SelectionVector,
};

fn column_file(values: &[i32]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for v in values {
        file.write_all(&v.to_le_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_selection_over_small_column() {
    let column = Buffer::from_vec(vec![3i32, 1, 4, 1, 5, 9, 2, 6]);
    let mut branching = SelectionVector::with_capacity(column.len());
    let mut branchless = SelectionVector::with_capacity(column.len());

    let a = select_less_than_branching(&column, 4, &mut branching);
    let b = select_less_than_branchless(&column, 4, &mut branchless);

    assert_eq!(a.count, 4);
    assert_eq!(b.count, 4);
    assert_eq!(branching.selected(), branchless.selected());
    let qualifying: Vec<i32> = branchless.selected().iter().map(|&i| column[i]).collect();
    assert_eq!(qualifying, vec![3, 1, 1, 2]);
    assert_eq!(a.selectivity(), 0.5);
}

#[test]
fn test_fixed_unroll_truncates_where_duff_does_not() {
    let from = Buffer::<i32>::filled_with(255, |i| i as i32 + 1).unwrap();
    let mut reference = vec![0i32; 255];
    let mut unrolled = vec![0i32; 255];
    let mut duff = vec![0i32; 255];

    copy(&from, &mut reference, TransformStrategy::Scalar);
    copy(&from, &mut unrolled, TransformStrategy::Unrolled(UnrollFactor::Eight));
    copy(&from, &mut duff, TransformStrategy::Duff(UnrollFactor::Eight));

    assert_eq!(duff, reference);
    assert_ne!(unrolled, reference);
    assert_eq!(&unrolled[..248], &reference[..248]);
    assert!(unrolled[248..].iter().all(|&v| v == 0));
    assert_eq!(TransformStrategy::Unrolled(UnrollFactor::Eight).covered(255), 248);
}

#[test]
fn test_mapped_column_checksum() {
    let values = [7i32, -2, 1_000_000, 35];
    let file = column_file(&values);
    assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 16);

    let column = Buffer::<i32>::map_file(file.path()).unwrap();
    assert_eq!(column.backing(), Backing::MappedReadonlyFile);
    assert_eq!(column.len(), 4);
    assert_eq!(column.byte_len(), 16);
    assert_eq!(column.as_slice(), &values);
    assert_eq!(sum_linear(&column), 7 - 2 + 1_000_000 + 35);
    assert_eq!(checksum(&column), sum_linear(&column));
}

#[test]
fn test_mapped_column_little_endian_layout() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]).unwrap();
    file.flush().unwrap();
    let column = Buffer::<i32>::map_file(file.path()).unwrap();
    assert_eq!(column.as_slice(), &[1, 256]);
}

#[test]
fn test_same_file_as_bytes_and_wide_elements() {
    let file = column_file(&[1, 2, 3, 4]);
    let bytes = Buffer::<u8>::map_file(file.path()).unwrap();
    let wide = Buffer::<i64>::map_file(file.path()).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(wide.len(), 2);
    assert_eq!(sum_linear(&bytes), 10);
    assert_eq!(wide[0], 1 | (2 << 32));
}

#[cfg(unix)]
#[test]
fn test_advice_does_not_change_scan() {
    let file = column_file(&(0..4096).collect::<Vec<i32>>());
    let column = Buffer::<i32>::map_file(file.path()).unwrap();
    let before = sum_linear(&column);
    assert!(matches!(advise_sequential(&column), AdviceOutcome::Applied));
    assert_eq!(sum_linear(&column), before);
}

#[test]
fn test_column_dump_rows_and_limit() {
    let file = column_file(&[10, 20, 30, 40]);
    let records = experiments::column_dump(file.path(), Some(2)).unwrap();
    assert_eq!(records.len(), 3);
    match (&records[0], &records[1], &records[2]) {
        (Record::Row(a), Record::Row(b), Record::Measurement(m)) => {
            assert_eq!((a.row, a.value), (0, 10));
            assert_eq!((b.row, b.value), (1, 20));
            assert_eq!(m.checksum, 100);
        }
        other => panic!("unexpected records {:?}", other),
    }
}

#[test]
fn test_madvise_scan_reports_byte_sum() {
    let file = column_file(&[0x0101_0101; 4]);
    for advise in [false, true] {
        let records = experiments::madvise_scan(file.path(), advise).unwrap();
        match &records[..] {
            [Record::Measurement(m)] => assert_eq!(m.checksum, 16),
            other => panic!("unexpected records {:?}", other),
        }
    }
}

#[test]
fn test_missing_column_is_open_failure() {
    let err = experiments::column_dump(std::path::Path::new("/no/such/331.tail"), None).unwrap_err();
    assert!(matches!(err, Error::OpenFailure { .. }));
}

#[test]
fn test_records_serialize_with_kind_tag() {
    let config = ExperimentConfig { duff_elements: 9, ..Default::default() };
    let records = experiments::duff(&config).unwrap();
    let line = serde_json::to_string(&records[1]).unwrap();
    assert!(line.starts_with(r#"{"kind":"measurement","label":"duff x8""#), "{}", line);
}
