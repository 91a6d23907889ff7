//! Prober shard assignment.
//!
//! Every health check receives a random id once, at creation. A prober
//! worker `i` out of `n` owns the enabled checks whose random id satisfies
//! `random_id % n == i`, so a fixed `n` partitions the checks with no
//! coordination. Changing `n` reshuffles ownership.

use rand::Rng;

use crate::error::CoreError;

/// Exclusive upper bound of the generated random ids.
pub const RANDOM_ID_RANGE: i32 = 100_000;

/// Draw a uniformly random shard id in `[0, RANDOM_ID_RANGE)`.
pub fn new_random_id() -> i32 {
    rand::rng().random_range(0..RANDOM_ID_RANGE)
}

/// Reject a prober index that cannot own anything.
pub fn validate_prober(prober: u32, total_probers: u32) -> Result<(), CoreError> {
    if total_probers == 0 {
        return Err(CoreError::BadRequest(
            "the number of probers must be greater than 0".to_string(),
        ));
    }
    if prober >= total_probers {
        return Err(CoreError::BadRequest(format!(
            "prober index {prober} out of range (total probers: {total_probers})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_stay_in_range() {
        for _ in 0..1_000 {
            let id = new_random_id();
            assert!((0..RANDOM_ID_RANGE).contains(&id));
        }
    }

    #[test]
    fn prober_index_validation() {
        assert!(validate_prober(0, 1).is_ok());
        assert!(validate_prober(2, 3).is_ok());
        assert!(validate_prober(3, 3).is_err());
        assert!(validate_prober(0, 0).is_err());
    }
}
