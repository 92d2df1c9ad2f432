//! Submission rate limiting
//!
//! One bucket for the whole process, shared by the edit and suggestion
//! endpoints. It is not partitioned by client, so a single noisy visitor can
//! exhaust the allowance for everyone.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Admission check for a submission
pub trait RateLimit: Send + Sync {
    /// Take one token if available
    fn try_acquire(&self) -> bool;
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket with continuous refill
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Full bucket of `capacity` tokens, refilled to full over `interval`
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self::new_at(capacity, interval, Instant::now())
    }

    /// Same as [`TokenBucket::new`] with an explicit starting clock
    pub fn new_at(capacity: u32, interval: Duration, now: Instant) -> Self {
        let capacity = f64::from(capacity.max(1));
        let secs = interval.as_secs_f64().max(f64::EPSILON);
        Self {
            capacity,
            refill_rate: capacity / secs,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: now,
            }),
        }
    }

    /// Take one token at time `now`.
    ///
    /// Times earlier than the last refill add nothing.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
            state.last_refill = now;
        }

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available, without refilling
    pub fn available(&self) -> f64 {
        match self.state.lock() {
            Ok(guard) => guard.tokens,
            Err(poisoned) => poisoned.into_inner().tokens,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }
}

impl RateLimit for TokenBucket {
    fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_then_reject() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(7, Duration::from_secs(60), start);
        for _ in 0..7 {
            assert!(bucket.try_acquire_at(start));
        }
        assert!(!bucket.try_acquire_at(start));
        assert!(!bucket.try_acquire_at(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_refills_after_interval() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(3, Duration::from_secs(60), start);
        for _ in 0..3 {
            assert!(bucket.try_acquire_at(start));
        }
        assert!(!bucket.try_acquire_at(start));

        let later = start + Duration::from_secs(60);
        for _ in 0..3 {
            assert!(bucket.try_acquire_at(later));
        }
        assert!(!bucket.try_acquire_at(later));
    }

    #[test]
    fn test_partial_refill() {
        let start = Instant::now();
        // one token every 10 seconds
        let bucket = TokenBucket::new_at(6, Duration::from_secs(60), start);
        for _ in 0..6 {
            bucket.try_acquire_at(start);
        }
        assert!(!bucket.try_acquire_at(start + Duration::from_secs(5)));
        assert!(bucket.try_acquire_at(start + Duration::from_secs(11)));
        assert!(!bucket.try_acquire_at(start + Duration::from_secs(11)));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(2, Duration::from_secs(1), start);
        let later = start + Duration::from_secs(3600);
        assert!(bucket.try_acquire_at(later));
        assert!(bucket.try_acquire_at(later));
        assert!(!bucket.try_acquire_at(later));
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let start = Instant::now() + Duration::from_secs(10);
        let bucket = TokenBucket::new_at(1, Duration::from_secs(60), start);
        assert!(bucket.try_acquire_at(start));
        assert!(!bucket.try_acquire_at(start - Duration::from_secs(5)));
        assert_eq!(bucket.available(), 0.0);
    }
}
