use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared_config::SchedulingConfig;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary. Filter with `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
            ))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub struct TestConfig {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 17,
        }
    }
}

impl TestConfig {
    pub fn short_day() -> Self {
        Self {
            start_hour: 9,
            end_hour: 12,
        }
    }

    pub fn to_scheduling_config(&self) -> SchedulingConfig {
        SchedulingConfig::new(self.start_hour, self.end_hour)
            .expect("test working hours must form a valid window")
    }
}
