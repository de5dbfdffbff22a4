mod in_flight;
mod input_sanitizer;
mod rate_limiter;

pub use in_flight::{InFlight, InFlightGuard, InFlightKey};
pub use input_sanitizer::InputSanitizer;
pub use rate_limiter::{RateLimiter, DEFAULT_ACTIONS_PER_HOUR, DEFAULT_ACTIONS_PER_MINUTE};
