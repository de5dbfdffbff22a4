use dashmap::DashMap;
use qa_errors::AppError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_ACTIONS_PER_MINUTE: u32 = 30;
pub const DEFAULT_ACTIONS_PER_HOUR: u32 = 300;
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct ActionRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl ActionRecord {
    fn starting_at(now: Instant) -> Self {
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Per-user limiter for write actions (votes, accepts, new answers).
#[derive(Clone)]
pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    actions: Arc<DashMap<Uuid, ActionRecord>>,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            actions: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn check(&self, user_id: Uuid) -> Result<(), AppError> {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: Uuid, now: Instant) -> Result<(), AppError> {
        self.maybe_cleanup(now);

        let mut record = self
            .actions
            .entry(user_id)
            .or_insert_with(|| ActionRecord::starting_at(now));

        if now.duration_since(record.minute_start) >= Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) >= Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.per_minute {
            let wait_secs = 60 - now.duration_since(record.minute_start).as_secs().min(60);
            tracing::warn!(%user_id, "Per-minute action limit reached");
            return Err(AppError::RateLimited(wait_secs));
        }

        if record.hour_count >= self.per_hour {
            let wait_secs = 3600 - now.duration_since(record.hour_start).as_secs().min(3600);
            tracing::warn!(%user_id, "Per-hour action limit reached");
            return Err(AppError::RateLimited(wait_secs));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self, now: Instant) {
        let mut last_cleanup = self
            .last_cleanup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if now.duration_since(*last_cleanup) > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            if let Some(cutoff) = now.checked_sub(Duration::from_secs(3600)) {
                self.actions.retain(|_, v| v.hour_start > cutoff);
            }
            *last_cleanup = now;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIONS_PER_MINUTE, DEFAULT_ACTIONS_PER_HOUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_limit() {
        let limiter = RateLimiter::new(2, 100);
        let user = Uuid::new_v4();
        let now = Instant::now();

        assert!(limiter.check_at(user, now).is_ok());
        assert!(limiter.check_at(user, now).is_ok());
        assert!(matches!(
            limiter.check_at(user, now),
            Err(AppError::RateLimited(_))
        ));

        // Other users are unaffected
        assert!(limiter.check_at(Uuid::new_v4(), now).is_ok());
    }

    #[test]
    fn test_minute_window_resets() {
        let limiter = RateLimiter::new(1, 100);
        let user = Uuid::new_v4();
        let now = Instant::now();

        assert!(limiter.check_at(user, now).is_ok());
        assert!(limiter.check_at(user, now).is_err());
        assert!(limiter.check_at(user, now + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn test_windows_reset_on_the_boundary() {
        let limiter = RateLimiter::new(1, 100);
        let user = Uuid::new_v4();
        let now = Instant::now();

        assert!(limiter.check_at(user, now).is_ok());
        assert_eq!(
            limiter.check_at(user, now + Duration::from_secs(59)),
            Err(AppError::RateLimited(1))
        );
        assert!(limiter.check_at(user, now + Duration::from_secs(60)).is_ok());

        let limiter = RateLimiter::new(100, 1);
        assert!(limiter.check_at(user, now).is_ok());
        assert_eq!(
            limiter.check_at(user, now + Duration::from_secs(3599)),
            Err(AppError::RateLimited(1))
        );
        assert!(limiter.check_at(user, now + Duration::from_secs(3600)).is_ok());
    }

    #[test]
    fn test_hour_limit() {
        let limiter = RateLimiter::new(100, 3);
        let user = Uuid::new_v4();
        let now = Instant::now();

        for i in 0..3 {
            assert!(limiter.check_at(user, now + Duration::from_secs(i * 61)).is_ok());
        }
        assert!(matches!(
            limiter.check_at(user, now + Duration::from_secs(300)),
            Err(AppError::RateLimited(_))
        ));
    }
}
