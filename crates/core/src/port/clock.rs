// Clock Port (for testability)

use chrono::{DateTime, Utc};

/// Wall-clock interface (allows manual clocks in tests)
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// System clock (production)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub mod mocks {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;

    /// Manually advanced clock for deterministic tests
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = *now + delta;
        }

        pub fn set(&self, at: DateTime<Utc>) {
            *self.now.lock().unwrap() = at;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
