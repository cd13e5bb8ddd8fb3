use leaky_bucket::RateLimiter as InnerRateLimiter;
use std::{sync::OnceLock, time::Duration};

pub(super) struct RateLimiter {
    pub(super) hypixel: InnerRateLimiter,
    pub(super) mojang: InnerRateLimiter,
}
static RATELIMITER: OnceLock<RateLimiter> = OnceLock::new();

// Hypixel keys allow 300 requests per 5 minutes, Mojang 600 per 10 minutes.
pub(super) fn ratelimiter() -> &'static RateLimiter {
    RATELIMITER.get_or_init(|| RateLimiter {
        hypixel: InnerRateLimiter::builder()
            .interval(Duration::from_millis(1000))
            .refill(1)
            .max(10)
            .initial(10)
            .build(),
        mojang: InnerRateLimiter::builder()
            .interval(Duration::from_millis(1000))
            .refill(1)
            .max(20)
            .initial(20)
            .build(),
    })
}
