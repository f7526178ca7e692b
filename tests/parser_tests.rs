use gate_heap_report::parser::{extract_memlog_lines, read_memory_log, write_memory_log};
use gate_heap_report::utils::error::LoadError;

#[test]
fn test_columns_in_any_order() {
    let csv = "\
event,min_free_heap,timestamp,largest_free_block,free_heap,total_allocated_bytes,notes
Before WiFi init,100000,1000,80000,100000,20000,cold boot
";
    let log = read_memory_log(csv.as_bytes()).unwrap();

    assert_eq!(log.len(), 1);
    let row = &log.rows[0];
    assert_eq!(row.event, "Before WiFi init");
    assert_eq!(row.timestamp, 1000);
    assert_eq!(row.free_heap, 100000);
    assert_eq!(row.largest_free_block, 80000);
}

#[test]
fn test_missing_column_is_rejected() {
    let csv = "timestamp,event,free_heap\n1000,Before WiFi init,100000\n";

    match read_memory_log(csv.as_bytes()) {
        Err(LoadError::MissingColumn(_)) => {}
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_non_numeric_cell_is_rejected() {
    let csv = "\
timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap
1000,Before WiFi init,lots,20000,80000,100000
";

    match read_memory_log(csv.as_bytes()) {
        Err(LoadError::InvalidValue { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "free_heap");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_counter_beyond_32_bits_is_rejected() {
    let csv = "\
timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap
1,Boot,18446744073709551615,1,1,1
";

    match read_memory_log(csv.as_bytes()) {
        Err(LoadError::InvalidValue { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "free_heap");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }

    let at_limit = "\
timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap
1,Boot,4294967295,4294967295,1,1
";
    let log = read_memory_log(at_limit.as_bytes()).unwrap();
    assert_eq!(log.rows[0].free_heap, u32::MAX as u64);
}

#[test]
fn test_oversized_memlog_field_is_skipped() {
    let serial = "MEMLOG,1000,Boot,4294967296,1,1,1,1\n";
    let extraction = extract_memlog_lines(serial.as_bytes()).unwrap();

    assert!(extraction.rows.is_empty());
    assert_eq!(extraction.skipped, 1);
}

#[test]
fn test_fragmentation_bounds() {
    let csv = "\
timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap
1000,a,100000,20000,80000,100000
2000,b,50000,70000,0,50000
3000,c,0,120000,0,0
";
    let log = read_memory_log(csv.as_bytes()).unwrap();

    let first = log.rows[0].fragmentation_percent().unwrap();
    assert!(first <= 100.0);
    assert_eq!(log.rows[1].fragmentation_percent(), Some(100.0));
    assert_eq!(log.rows[2].fragmentation_percent(), None);

    let avg = log.average_fragmentation().unwrap();
    assert!((avg - 60.0).abs() < 1e-9);
}

#[test]
fn test_serial_capture_to_log() {
    let serial = "\
I (100) boot: ESP-IDF v5.1
MEMLOG,1000,Before WiFi init,100000,99000,20000,100000,80000
[12:00:01] MEMLOG,2000,After WiFi init,95000,94000,25000,95000,70000
MEMLOG,3000,truncated line
";
    let extraction = extract_memlog_lines(serial.as_bytes()).unwrap();
    assert_eq!(extraction.rows.len(), 2);
    assert_eq!(extraction.skipped, 1);

    let mut buffer = Vec::new();
    write_memory_log(&extraction.rows, &mut buffer).unwrap();
    let log = read_memory_log(buffer.as_slice()).unwrap();

    assert_eq!(log.rows, extraction.rows);
    assert_eq!(log.rows[1].min_free_heap, 94000);
    assert_eq!(log.rows[1].total_allocated_bytes, 25000);
}
