//! Exponential backoff with jitter for receipt polling.

use rand::Rng;
use std::time::Duration;

/// Delay before poll number `attempt` (1-based).
///
/// Doubles from `base_ms`, caps at `max_ms`, then adds up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_waits_base() {
        let delay = calculate_backoff(1, 500, 4000).as_millis();
        assert!((500..550).contains(&delay));
    }

    #[test]
    fn test_doubles_then_caps() {
        let third = calculate_backoff(3, 500, 4000).as_millis();
        assert!((2000..2200).contains(&third));

        let capped = calculate_backoff(30, 500, 4000).as_millis();
        assert!((4000..4400).contains(&capped));
    }

    #[test]
    fn test_attempt_zero_is_immediate() {
        assert_eq!(calculate_backoff(0, 500, 4000), Duration::ZERO);
    }
}
