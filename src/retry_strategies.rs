use std::{sync::OnceLock, time::Duration};

use backon::FibonacciBuilder;

static API_RETRY_STRATEGY: OnceLock<FibonacciBuilder> = OnceLock::new();

pub fn api_retry_strategy() -> &'static FibonacciBuilder {
    API_RETRY_STRATEGY.get_or_init(|| {
        FibonacciBuilder::default()
            .with_jitter()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(10))
            .with_max_times(6)
    })
}

static DISCORD_RETRY_STRATEGY: OnceLock<FibonacciBuilder> = OnceLock::new();

pub fn discord_retry_strategy() -> &'static FibonacciBuilder {
    DISCORD_RETRY_STRATEGY.get_or_init(|| {
        FibonacciBuilder::default()
            .with_jitter()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(500))
            .with_max_times(5)
    })
}
