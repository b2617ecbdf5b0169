//! Time source for lifecycle stamps

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[cfg(test)]
pub struct FixedClock {
    value: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self {
            value: std::sync::Mutex::new(value),
        }
    }

    pub fn set(&self, value: DateTime<Utc>) {
        *self.value.lock().unwrap() = value;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut value = self.value.lock().unwrap();
        *value += by;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.value.lock().unwrap()
    }
}
