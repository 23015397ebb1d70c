//! PII-safe wrapper for values ending up in logs.
//!
//! Candidate addresses and ICE credentials identify a user's network. When the
//! `pii` feature is enabled, any value wrapped in `Pii` is displayed as
//! `{REDACTED}`. Without the feature the inner value is shown as normal.
//!
//! Use it for debug, info, warn and error logs. Trace logs are expected to be
//! disabled in production and may show raw values.

use core::fmt;
use core::ops::Deref;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pii<T>(pub T);

impl<T: fmt::Display> fmt::Display for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "pii")]
        {
            write!(f, "{{REDACTED}}")
        }
        #[cfg(not(feature = "pii"))]
        {
            write!(f, "{}", self.0)
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "pii")]
        {
            write!(f, "{{REDACTED}}")
        }
        #[cfg(not(feature = "pii"))]
        {
            write!(f, "{:?}", self.0)
        }
    }
}

impl<T> Deref for Pii<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
