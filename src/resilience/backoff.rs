//! Exponential backoff.

use std::time::Duration;

/// Calculate the exponential backoff delay for a retry attempt.
///
/// Attempts are counted from 1: base, 2x base, 4x base, ...
/// No jitter; at the default 2000ms base the sequence is 2s, 4s, 8s.
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    Duration::from_millis(base_ms.saturating_mul(exponential_base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_per_attempt() {
        assert_eq!(calculate_backoff(1, 2000), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(2, 2000), Duration::from_millis(4000));
        assert_eq!(calculate_backoff(3, 2000), Duration::from_millis(8000));
    }

    #[test]
    fn attempt_zero_is_immediate() {
        assert_eq!(calculate_backoff(0, 2000), Duration::from_millis(0));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let d = calculate_backoff(u32::MAX, u64::MAX);
        assert_eq!(d, Duration::from_millis(u64::MAX));
    }
}
