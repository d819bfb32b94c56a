//! Position allocation for ordered record kinds.
//!
//! # Responsibility
//! - Compute the order key for an appended record.
//!
//! # Invariants
//! - Appending is the only automatic allocation path; it is one past every
//!   existing value at the instant the current maximum was read.

/// Returns the order key for a record appended after `current_max`.
///
/// An empty kind (no existing records) starts at `1.0`; otherwise the new
/// key is `max + 1.0`. Uniqueness holds only while the read of the maximum
/// and the subsequent insert are serialized by the storage layer.
pub fn next_position(current_max: Option<f64>) -> f64 {
    match current_max {
        Some(max) => max + 1.0,
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::next_position;

    #[test]
    fn empty_kind_starts_at_one() {
        assert_eq!(next_position(None), 1.0);
    }

    #[test]
    fn appends_are_strictly_increasing_by_one() {
        let mut max = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            let next = next_position(max);
            seen.push(next);
            max = Some(next);
        }
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn appending_after_a_reordered_key_stays_past_the_maximum() {
        // Client-reordered rows can sit at fractional keys; the allocator
        // only ever extends past the current maximum.
        assert_eq!(next_position(Some(2.5)), 3.5);
    }
}
