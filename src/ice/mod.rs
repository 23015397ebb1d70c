//! ICE candidate handling.
//!
//! Local candidates are aggregated to exactly one per transport channel. Remote
//! candidates are split per media kind and handed to the transport proxies.

mod candidate;
pub use candidate::{Candidate, CandidateKind, Protocol};
pub use candidate::{CHANNEL_RTCP, CHANNEL_RTP, CHANNEL_VIDEO_RTCP, CHANNEL_VIDEO_RTP};

mod local;
pub(crate) use local::LocalCandidates;
pub use local::MAX_LOCAL_CANDIDATES;

mod remote;
pub(crate) use remote::{deliver_remote, partition_remote};
