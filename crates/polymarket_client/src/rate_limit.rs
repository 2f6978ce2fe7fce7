//! Read rate limiter for the Gamma API.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Token bucket shared by every clone of the client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    read_limiter: Arc<GovLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
}

impl RateLimiter {
    /// A zero rate is treated as one read per second.
    pub fn per_second(reads_per_sec: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(reads_per_sec).unwrap_or(NonZeroU32::MIN));

        Self {
            read_limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a read slot is available.
    pub async fn wait_read(&self) {
        self.read_limiter.until_ready().await;
    }

    /// Try to acquire a read slot without waiting. Returns true if acquired.
    pub fn try_read(&self) -> bool {
        self.read_limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_bounded() {
        let limiter = RateLimiter::per_second(3);
        assert!(limiter.try_read());
        assert!(limiter.try_read());
        assert!(limiter.try_read());
        assert!(!limiter.try_read());
    }

    #[test]
    fn test_zero_rate_still_allows_one() {
        let limiter = RateLimiter::per_second(0);
        assert!(limiter.try_read());
        assert!(!limiter.try_read());
    }

    #[test]
    fn test_clones_share_bucket() {
        let a = RateLimiter::per_second(1);
        let b = a.clone();
        assert!(a.try_read());
        assert!(!b.try_read());
    }
}
