use std::cmp;
use std::sync::atomic::{AtomicU64, Ordering};

/// An atomic, budgeted counter handing out exclusive batches of sample slots
/// to any number of threads. Reaching zero is permanent and is the
/// cooperative stop signal for parallel sample generation: no barrier or
/// broadcast is needed.
pub struct SampleCounter {
    remaining: AtomicU64,
}

impl SampleCounter {
    pub fn new(budget: u64) -> SampleCounter {
        SampleCounter {
            remaining: AtomicU64::new(budget),
        }
    }

    /// Atomically grant up to `requested` sample slots, returning how many
    /// were actually granted. Never blocks; returns 0 forever once the budget
    /// is exhausted.
    pub fn reserve(&self, requested: u64) -> u64 {
        if requested == 0 {
            return 0;
        }
        let mut remaining = self.remaining.load(Ordering::Acquire);
        loop {
            if remaining == 0 {
                return 0;
            }
            let granted = cmp::min(requested, remaining);
            match self.remaining.compare_exchange_weak(remaining,
                                                       remaining - granted,
                                                       Ordering::AcqRel,
                                                       Ordering::Acquire) {
                Ok(_) => return granted,
                Err(actual) => remaining = actual,
            }
        }
    }

    /// Number of sample slots not yet handed out.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_are_capped_by_the_budget() {
        let counter = SampleCounter::new(100);
        assert_eq!(counter.reserve(30), 30);
        assert_eq!(counter.reserve(30), 30);
        assert_eq!(counter.reserve(30), 30);
        // Only 10 left.
        assert_eq!(counter.reserve(30), 10);
        assert_eq!(counter.remaining(), 0);
    }

    #[test]
    fn exhaustion_is_terminal() {
        let counter = SampleCounter::new(5);
        assert_eq!(counter.reserve(5), 5);
        for _ in 0..10 {
            assert_eq!(counter.reserve(1), 0);
        }
    }

    #[test]
    fn zero_request_is_a_no_op() {
        let counter = SampleCounter::new(10);
        assert_eq!(counter.reserve(0), 0);
        assert_eq!(counter.remaining(), 10);
    }
}
