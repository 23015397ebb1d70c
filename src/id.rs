use std::fmt;
use std::ops::Deref;

macro_rules! num_id {
    ($id:ident, $t:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $id($t);

        impl Deref for $id {
            type Target = $t;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$t> for $id {
            fn from(v: $t) -> Self {
                $id(v)
            }
        }

        impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

num_id!(SessionId, u64, "Identifier of a signaling session.");
num_id!(Ssrc, u32, "Synchronization source of a media stream.");

impl SessionId {
    /// Max 2^62 - 1: https://bugzilla.mozilla.org/show_bug.cgi?id=861895
    const MAX: u64 = 2_u64.pow(62) - 1;

    /// Creates a new random session id.
    pub fn new() -> Self {
        SessionId(fastrand::u64(1..=Self::MAX))
    }
}

impl Ssrc {
    /// Creates a new random (non-zero) SSRC.
    pub fn new() -> Self {
        Ssrc(fastrand::u32(1..))
    }
}
