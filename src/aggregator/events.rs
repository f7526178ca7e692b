//! Classify log rows by their event label.
//!
//! Labels follow the firmware convention `"<Before|After> <operation>"`,
//! e.g. `"Before WiFi init"` or `"After close entry gate"`.

use crate::parser::{MeasurementRow, MemoryLog};
use crate::utils::config::{GATE_EVENT_PHRASES, INIT_SUBSYSTEMS};
use log::{debug, warn};

/// Which side of an operation a row was sampled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPhase {
    Before,
    After,
}

impl EventPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPhase::Before => "Before",
            EventPhase::After => "After",
        }
    }

    /// Split `"Before WiFi init"` into `(Before, "WiFi init")`
    ///
    /// Returns `None` for labels that do not start with a phase word or have
    /// nothing after it.
    pub fn parse(event: &str) -> Option<(EventPhase, &str)> {
        [EventPhase::Before, EventPhase::After]
            .into_iter()
            .find_map(|phase| {
                event
                    .strip_prefix(phase.as_str())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| (phase, name))
            })
    }

    /// Locate the first phase word anywhere in the label
    ///
    /// `"Gate: After open entry gate"` gives `(After, "open entry gate")`.
    /// Returns `None` when no phase word is present or nothing follows it.
    pub fn find(event: &str) -> Option<(EventPhase, &str)> {
        [EventPhase::Before, EventPhase::After]
            .into_iter()
            .filter_map(|phase| event.find(phase.as_str()).map(|idx| (idx, phase)))
            .min_by_key(|(idx, _)| *idx)
            .and_then(|(idx, phase)| {
                let name = event[idx + phase.as_str().len()..].trim();
                (!name.is_empty()).then_some((phase, name))
            })
    }
}

/// True for exactly `"{Before|After} {WiFi|MQTT|Servo} init"`
pub fn is_init_event(event: &str) -> bool {
    match EventPhase::parse(event) {
        Some((_, operation)) => operation
            .strip_suffix(" init")
            .is_some_and(|subsystem| INIT_SUBSYSTEMS.contains(&subsystem)),
        None => false,
    }
}

/// True for rows bracketing an entry-gate open or close
pub fn is_gate_event(event: &str) -> bool {
    GATE_EVENT_PHRASES.iter().any(|phrase| event.contains(phrase))
}

/// Rows recorded around subsystem initialization
///
/// **Public** - used for timeline annotations
pub fn init_events(log: &MemoryLog) -> Vec<&MeasurementRow> {
    log.rows.iter().filter(|row| is_init_event(&row.event)).collect()
}

/// Rows recorded around gate actuation, in log order
pub fn gate_events(log: &MemoryLog) -> Vec<&MeasurementRow> {
    log.rows.iter().filter(|row| is_gate_event(&row.event)).collect()
}

/// Gate rows paired positionally as (before, after)
///
/// **Public** - main entry point for pairing
///
/// The n-th "Before" row is matched with the n-th "After" row. Pairing is
/// truncated to the shorter side; unmatched trailing rows are dropped.
pub fn pair_gate_events<'a>(
    gate_rows: &[&'a MeasurementRow],
) -> Vec<(&'a MeasurementRow, &'a MeasurementRow)> {
    let before: Vec<&MeasurementRow> = gate_rows
        .iter()
        .copied()
        .filter(|row| row.event.contains(EventPhase::Before.as_str()))
        .collect();
    let after: Vec<&MeasurementRow> = gate_rows
        .iter()
        .copied()
        .filter(|row| row.event.contains(EventPhase::After.as_str()))
        .collect();

    if before.len() != after.len() {
        warn!(
            "Unbalanced gate events ({} before, {} after); pairing first {}",
            before.len(),
            after.len(),
            before.len().min(after.len())
        );
    }

    let pairs: Vec<_> = before.into_iter().zip(after).collect();
    debug!("Paired {} gate operations", pairs.len());
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_phase_mid_label() {
        assert_eq!(
            EventPhase::find("Gate: After open entry gate"),
            Some((EventPhase::After, "open entry gate"))
        );
        assert_eq!(
            EventPhase::find("Before WiFi init"),
            Some((EventPhase::Before, "WiFi init"))
        );
        assert_eq!(EventPhase::find("Boot After"), None);
        assert_eq!(EventPhase::find("Boot complete"), None);
    }

    fn row(event: &str, free: u64) -> MeasurementRow {
        MeasurementRow {
            timestamp: 0,
            event: event.to_string(),
            free_heap: free,
            total_allocated_bytes: 0,
            largest_free_block: 0,
            min_free_heap: 0,
        }
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!(
            EventPhase::parse("Before WiFi init"),
            Some((EventPhase::Before, "WiFi init"))
        );
        assert_eq!(
            EventPhase::parse("After close entry gate"),
            Some((EventPhase::After, "close entry gate"))
        );
        assert_eq!(EventPhase::parse("Boot"), None);
        assert_eq!(EventPhase::parse("After"), None);
    }

    #[test]
    fn test_init_filter_is_exact() {
        assert!(is_init_event("Before WiFi init"));
        assert!(is_init_event("After MQTT init"));
        assert!(is_init_event("After Servo init"));

        assert!(!is_init_event("Before open entry gate"));
        assert!(!is_init_event("Before NVS init"));
        assert!(!is_init_event("Before WiFi init done"));
        assert!(!is_init_event("WiFi init"));
    }

    #[test]
    fn test_gate_filter() {
        assert!(is_gate_event("Before open entry gate"));
        assert!(is_gate_event("After close entry gate"));
        assert!(!is_gate_event("After close exit gate"));
        assert!(!is_gate_event("Before MQTT init"));
    }

    #[test]
    fn test_pairing_is_positional() {
        let rows = vec![
            row("Before open entry gate", 100),
            row("Before open entry gate", 90),
            row("After close entry gate", 95),
            row("After close entry gate", 85),
        ];
        let refs: Vec<&MeasurementRow> = rows.iter().collect();

        let pairs = pair_gate_events(&refs);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.free_heap, 100);
        assert_eq!(pairs[0].1.free_heap, 95);
        assert_eq!(pairs[1].0.free_heap, 90);
        assert_eq!(pairs[1].1.free_heap, 85);
    }

    #[test]
    fn test_pairing_truncates_to_shorter_side() {
        let mut rows: Vec<MeasurementRow> =
            (0..5).map(|i| row("Before open entry gate", 100 + i)).collect();
        rows.extend((0..3).map(|i| row("After close entry gate", 50 + i)));
        let refs: Vec<&MeasurementRow> = rows.iter().collect();

        let pairs = pair_gate_events(&refs);

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2].0.free_heap, 102);
        assert_eq!(pairs[2].1.free_heap, 52);
    }
}
