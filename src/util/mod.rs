use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

mod pii;
pub(crate) use pii::Pii;

/// An instant in the distant future, used when no timeout is scheduled.
pub(crate) fn not_happening() -> Instant {
    const YEARS_100: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);
    static FUTURE: Lazy<Instant> = Lazy::new(|| Instant::now() + YEARS_100);
    *FUTURE
}
