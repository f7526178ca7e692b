use gate_heap_report::aggregator::{
    analyze, gate_operations, memory_impact_by_operation, summarize_fragmentation,
    summarize_initialization, summarize_operations, EventPhase,
};
use gate_heap_report::parser::{read_memory_log, MemoryLog};
use gate_heap_report::utils::error::AnalysisError;
use pretty_assertions::assert_eq;

const GATE_LOG: &str = "\
timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap
1000,Before WiFi init,100000,20000,80000,100000
2000,After WiFi init,95000,25000,70000,95000
3000,Before Servo init,95000,25000,70000,95000
4000,After Servo init,94000,26000,69000,94000
5000,Before MQTT init,94000,26000,69000,94000
6000,After MQTT init,90000,30000,60000,90000
7000,Before open entry gate,90000,30000,60000,89000
8000,After open entry gate,89000,31000,59000,89000
9000,Before close entry gate,89500,30500,59500,88500
10000,After close entry gate,89200,30800,59200,88500
";

fn gate_log() -> MemoryLog {
    read_memory_log(GATE_LOG.as_bytes()).unwrap()
}

#[test]
fn test_event_phase_parse() {
    assert_eq!(
        EventPhase::parse("Before open entry gate"),
        Some((EventPhase::Before, "open entry gate"))
    );
    assert_eq!(EventPhase::parse("Boot complete"), None);
}

#[test]
fn test_gate_operations_memory_used() {
    let ops = gate_operations(&gate_log());

    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].operation_number, 1);
    assert_eq!(ops[0].memory_used, 1000);
    assert_eq!(ops[0].allocation_increase, 1000);
    assert_eq!(ops[1].memory_used, 300);
    assert_eq!(ops[1].allocation_increase, 300);
}

#[test]
fn test_initialization_summary() {
    let rows = summarize_initialization(&gate_log()).unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.operation.as_str()).collect();
    assert_eq!(names, vec!["WiFi Init", "Servo Init", "MQTT Init", "Total System Init"]);

    assert_eq!(rows[0].before, 100000);
    assert_eq!(rows[0].after, 95000);
    assert_eq!(rows[0].delta, 5000);
    assert!((rows[0].percent_of_initial - 5.0).abs() < 1e-9);

    assert_eq!(rows[3].delta, 10000);
    assert!((rows[3].percent_of_initial - 10.0).abs() < 1e-9);
}

#[test]
fn test_initialization_summary_missing_label() {
    let log = read_memory_log(
        "timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap\n\
         1000,Before WiFi init,100000,20000,80000,100000\n"
            .as_bytes(),
    )
    .unwrap();

    match summarize_initialization(&log) {
        Err(AnalysisError::MissingEvent(label)) => assert_eq!(label, "After WiFi init"),
        other => panic!("expected MissingEvent, got {:?}", other),
    }
}

#[test]
fn test_operation_summary_average_row() {
    let rows = summarize_operations(&gate_operations(&gate_log()));

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].operation, "Average");
    assert!((rows[2].memory_used - 650.0).abs() < 1e-9);
    assert!((rows[2].free_heap_before - 89750.0).abs() < 1e-9);
}

#[test]
fn test_fragmentation_summary_stages() {
    let rows = summarize_fragmentation(&gate_log());

    let stages: Vec<&str> = rows.iter().map(|r| r.stage.as_str()).collect();
    assert_eq!(
        stages,
        vec!["Before WiFi init", "After WiFi init", "After MQTT init", "During Operations"]
    );

    let during = &rows[3];
    assert!((during.free_heap - 89425.0).abs() < 1e-9);
    assert!((during.largest_free_block - 59425.0).abs() < 1e-9);
    assert!(during.fragmentation_index.is_some());
}

#[test]
fn test_memory_impact_sorted_descending() {
    let impacts = memory_impact_by_operation(&gate_log());

    assert_eq!(impacts[0].operation, "WiFi init");
    assert!((impacts[0].impact - 5000.0).abs() < 1e-9);
    assert!(impacts.windows(2).all(|w| w[0].impact >= w[1].impact));
}

#[test]
fn test_analyze_distribution() {
    let report = analyze(&gate_log()).unwrap();
    let distribution = report.distribution.unwrap();

    assert_eq!(distribution.allocated, 30000);
    assert_eq!(distribution.free, 90000);
    assert!((distribution.allocated_percent() - 25.0).abs() < 1e-9);
}
