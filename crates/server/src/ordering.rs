use std::cmp::Ordering;

use shared::domain::EventRecord;

/// Most recent first. Records with the same timestamp compare equal.
pub fn newest_first(a: &EventRecord, b: &EventRecord) -> Ordering {
    b.timestamp.cmp(&a.timestamp)
}

/// Sorts records for display regardless of the order the store returned them in.
/// The sort is stable, so equal timestamps keep their relative order.
pub fn order_for_display(records: &mut [EventRecord]) {
    records.sort_by(newest_first);
}

#[cfg(test)]
#[path = "tests/ordering_tests.rs"]
mod tests;
